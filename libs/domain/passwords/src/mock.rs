// [libs/domain/passwords/src/mock.rs]
/*!
 * =================================================================
 * APARATO: PASSWORDS SERVICE TEST DOUBLE
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: SUSTITUTO INYECTABLE DEL SERVICIO DE CONSULTA
 *
 * Permite a los estratos superiores (API, CLI) certificar su lógica
 * sin cristalizar una base de datos real: la función inyectada decide
 * la respuesta de cada consulta.
 * =================================================================
 */

use crate::{PasswordsService, ServiceError, Sha1Digest};

type LookupFn = dyn Fn(&Sha1Digest) -> Result<u64, ServiceError> + Send + Sync;

/// Implementación del servicio con comportamiento inyectado.
pub struct MockService {
    is_password_compromised_fn: Box<LookupFn>,
}

impl MockService {
    /// Construye el doble con la función que atenderá cada consulta.
    pub fn new<F>(is_password_compromised_fn: F) -> Self
    where
        F: Fn(&Sha1Digest) -> Result<u64, ServiceError> + Send + Sync + 'static,
    {
        Self {
            is_password_compromised_fn: Box::new(is_password_compromised_fn),
        }
    }
}

impl PasswordsService for MockService {
    fn is_password_compromised(&self, sum: &Sha1Digest) -> Result<u64, ServiceError> {
        (self.is_password_compromised_fn)(sum)
    }
}
