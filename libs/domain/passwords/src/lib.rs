// [libs/domain/passwords/src/lib.rs]

#![deny(missing_docs)]

/*!
 * =================================================================
 * APARATO: PASSWORDS DOMAIN CONTRACT
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FRONTERA DE CAPACIDAD DEL SERVICIO DE CONSULTA
 *
 * Este estrato define la única capacidad que el dominio expone a los
 * consumidores: dada una huella SHA-1 de 20 bytes, responder cuántas
 * veces apareció en filtraciones públicas. Cero significa ausente.
 *
 * El contrato es síncrono: una consulta real son dos lecturas
 * posicionales acotadas, y los llamadores asíncronos la envuelven en
 * 'spawn_blocking', donde se resuelve también la cancelación.
 * =================================================================
 */

/// Huella SHA-1 y su análisis desde texto hexadecimal.
pub mod digest;
/// Doble de prueba con función de consulta inyectable.
pub mod mock;

pub use crate::digest::{DigestParseError, Sha1Digest};

use thiserror::Error;

/// Fallo al resolver una consulta contra el censo.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// La capa de almacenamiento subyacente no pudo completar la lectura.
    #[error("consulta del censo fallida: {0}")]
    Lookup(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ServiceError {
    /// Envuelve un fallo de la capa de almacenamiento en el contrato.
    pub fn lookup<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Lookup(Box::new(source))
    }
}

/// Capacidad de consulta sobre el censo de contraseñas comprometidas.
///
/// Las implementaciones deben ser seguras bajo concurrencia arbitraria
/// de lectores: el contrato toma '&self' y no admite escritores.
pub trait PasswordsService: Send + Sync {
    /// Retorna el recuento de apariciones de la huella, o 0 si no consta.
    fn is_password_compromised(&self, sum: &Sha1Digest) -> Result<u64, ServiceError>;
}
