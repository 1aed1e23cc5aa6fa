// [libs/core/hashdb/src/lib.rs]

#![deny(missing_docs)]

/*!
 * =================================================================
 * APARATO: HASHDB STRATUM ROOT
 * CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
 * RESPONSABILIDAD: BASE DE DATOS FRAGMENTADA DEL CENSO COMPROMETIDO
 *
 * La crate cristaliza el volcado HIBP (cientos de millones de huellas
 * SHA-1 ordenadas con su recuento) en una base binaria de solo
 * lectura, y la sirve con un número acotado de lecturas físicas por
 * consulta: el prefijo de 24 bits direcciona un par de cursores del
 * índice y el byte alto elige el único shard a barrer.
 * =================================================================
 */

/// Catálogo de fallos de la bóveda y del indexador.
pub mod errors;
/// Motor de ingesta de doble pasada.
pub mod indexer;
/// Constantes y aritmética del formato en disco.
pub mod layout;
/// Manifiesto 'db.json' y esquemas de recuento.
pub mod manifest;
/// Contadores de consulta sin bloqueo.
pub mod metrics;
/// Servicio de consulta con lecturas posicionales.
pub mod vault;

pub use crate::errors::HashdbError;
pub use crate::indexer::{
    IndexOptions, IndexPhase, IndexProgress, IndexSummary, IndexingPipeline,
};
pub use crate::manifest::{CorpusManifest, CountEncoding};
pub use crate::metrics::{MetricsSnapshot, VaultMetrics};
pub use crate::vault::CorpusVault;
