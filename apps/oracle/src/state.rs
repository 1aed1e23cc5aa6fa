// [apps/oracle/src/state.rs]
/*!
 * =================================================================
 * APARATO: ORACLE OPERATIONAL NEXUS
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L3)
 * RESPONSABILIDAD: ESTADO COMPARTIDO E INSTRUMENTACIÓN DEL SERVICIO
 * =================================================================
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use centinela_core_hashdb::{CorpusVault, MetricsSnapshot};
use centinela_domain_passwords::PasswordsService;

/// Identidad nominal del servicio reportada por '/status'.
pub const SERVICE_NAME: &str = "centinela-oracle";

type VaultMetricsFn = dyn Fn() -> MetricsSnapshot + Send + Sync;

/// Estado compartido entre todos los handlers del Oráculo.
#[derive(Clone)]
pub struct AppState {
    /// Capacidad de consulta inyectada; la bóveda real en producción.
    pub passwords: Arc<dyn PasswordsService>,
    /// Identidad, arranque e instrumentación del servicio.
    pub nexus: Arc<OperationalNexus>,
}

impl AppState {
    /// Compone el estado desde una capacidad de consulta arbitraria.
    pub fn new(passwords: Arc<dyn PasswordsService>, nexus: OperationalNexus) -> Self {
        Self {
            passwords,
            nexus: Arc::new(nexus),
        }
    }

    /// Compone el estado de producción sobre la bóveda cristalizada.
    ///
    /// La bóveda llega compartida: el shell conserva su propia referencia
    /// para reclamarla y cerrarla ordenadamente tras el apagado.
    #[must_use]
    pub fn for_vault(vault: Arc<CorpusVault>) -> Self {
        let shard_count = vault.manifest().shard_count;
        let corpus_count = vault.manifest().count;
        let metrics_vault = Arc::clone(&vault);
        let nexus = OperationalNexus::new(shard_count, corpus_count, move || {
            metrics_vault.metrics().snapshot()
        });
        Self::new(vault, nexus)
    }
}

/// Placa de identidad e instrumentación del proceso.
pub struct OperationalNexus {
    /// Fragmentación de la base servida.
    pub shard_count: usize,
    /// Entradas totales del censo servido.
    pub corpus_count: u64,
    started_at: Instant,
    pageview_count: AtomicU64,
    vault_metrics: Box<VaultMetricsFn>,
}

impl OperationalNexus {
    /// Construye el nexo con el origen de los contadores de la bóveda.
    pub fn new<F>(shard_count: usize, corpus_count: u64, vault_metrics: F) -> Self
    where
        F: Fn() -> MetricsSnapshot + Send + Sync + 'static,
    {
        Self {
            shard_count,
            corpus_count,
            started_at: Instant::now(),
            pageview_count: AtomicU64::new(0),
            vault_metrics: Box::new(vault_metrics),
        }
    }

    /// Registro fire-and-forget de una petición atendida.
    pub fn record_pageview(&self) {
        self.pageview_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Peticiones atendidas desde el arranque.
    #[must_use]
    pub fn pageviews(&self) -> u64 {
        self.pageview_count.load(Ordering::Relaxed)
    }

    /// Segundos transcurridos desde el arranque del proceso.
    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Instantánea de los contadores de la bóveda subyacente.
    #[must_use]
    pub fn vault_snapshot(&self) -> MetricsSnapshot {
        (self.vault_metrics)()
    }
}
