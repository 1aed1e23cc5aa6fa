// [libs/core/hashdb/src/metrics.rs]
// =================================================================
// APARATO: VAULT METRICS
// RESPONSABILIDAD: CONTADORES DE CONSULTA SIN BLOQUEO
// =================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Contadores de la bóveda: consultas atendidas y huellas comprometidas.
///
/// La emisión es fire-and-forget con orden relajado; ninguna consulta
/// se bloquea jamás por la instrumentación.
#[derive(Debug, Default)]
pub struct VaultMetrics {
    checked_count: AtomicU64,
    compromised_count: AtomicU64,
}

impl VaultMetrics {
    pub(crate) fn record_checked(&self) {
        self.checked_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_compromised(&self) {
        self.compromised_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Instantánea consistente-a-grandes-rasgos de los contadores.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            checked_count: self.checked_count.load(Ordering::Relaxed),
            compromised_count: self.compromised_count.load(Ordering::Relaxed),
        }
    }
}

/// Valores de los contadores en un instante, listos para serializar.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsSnapshot {
    /// Consultas atendidas por la bóveda.
    pub checked_count: u64,
    /// Consultas que resolvieron a un recuento positivo.
    pub compromised_count: u64,
}
