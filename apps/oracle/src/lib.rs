// [apps/oracle/src/lib.rs]

#![deny(missing_docs)]

/*!
 * =================================================================
 * APARATO: ORACLE SERVICE LIBRARY
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L3)
 * RESPONSABILIDAD: SUPERFICIE HTTP DEL CENSO COMPROMETIDO
 *
 * El Oráculo responde una sola pregunta: dada una huella SHA-1,
 * cuántas veces apareció en filtraciones públicas. La bóveda resuelve
 * cada consulta con dos lecturas posicionales; este estrato solo
 * traduce HTTP al contrato del dominio y expone la instrumentación.
 * =================================================================
 */

/// Traducción HTTP del contrato del dominio.
pub mod handlers;
/// Topología de rutas y capas transversales.
pub mod routes;
/// Estado compartido e instrumentación.
pub mod state;

pub use crate::routes::create_router;
pub use crate::state::{AppState, OperationalNexus};
