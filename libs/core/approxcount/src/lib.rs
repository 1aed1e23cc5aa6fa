// [libs/core/approxcount/src/lib.rs]

#![deny(missing_docs)]

/*!
 * =================================================================
 * APARATO: APPROXIMATE COUNT CODEC
 * CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
 * RESPONSABILIDAD: COMPRESIÓN LOGARÍTMICA DE RECUENTOS A 1 BYTE
 *
 * El recuento de ocurrencias de un hash comprometido es un dato
 * consultivo: al operador le interesa el orden de magnitud, no el
 * valor exacto. Este códec proyecta el rango [1, max] sobre un solo
 * byte mediante la escala 'c = 255 / ln(max)', reduciendo cada
 * entrada del censo en 3 bytes frente a la codificación exacta.
 *
 * # Mathematical Proof (Error Bound):
 * El error relativo de ida y vuelta queda acotado por el paso de la
 * retícula logarítmica, 'exp(1/(2c)) - 1'. Para max <= 2^32 esto se
 * traduce en un error típico inferior al 2%; para max cercano a 2^64
 * la saturación ocurre en 18446744073709524992.
 * =================================================================
 */

use thiserror::Error;

/// Catálogo de fallos en la construcción del códec.
#[derive(Error, Debug)]
pub enum EncoderError {
    /// El valor máximo representable debe ser al menos 1.
    #[error("valor máximo inválido {0}")]
    InvalidMax(u64),
}

/// Códec de recuentos con precisión degradada logarítmicamente.
///
/// El códec se parametriza con el valor máximo observado en el censo y
/// siempre arranca desde cero. El valor mínimo codificable es 1.
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    max: u64,
    c: f64,
}

impl Encoder {
    /// Construye un códec capaz de representar valores en `[1, max]`.
    ///
    /// # Errors:
    /// Retorna [`EncoderError::InvalidMax`] si `max < 1`.
    pub fn new(max: u64) -> Result<Self, EncoderError> {
        if max < 1 {
            return Err(EncoderError::InvalidMax(max));
        }
        Ok(Self {
            max,
            c: 255.0 / (max as f64).ln(),
        })
    }

    /**
     * Proyecta un valor sobre la retícula logarítmica de 1 byte.
     *
     * # Panics:
     * Con `value` fuera de `[1, max]`. Es una violación de contrato del
     * llamador: el códec prefiere abortar antes que emitir un byte que
     * decodificaría a un recuento incorrecto.
     */
    #[must_use]
    pub fn encode(&self, value: u64) -> u8 {
        if value > self.max || value < 1 {
            panic!("overflow");
        }
        ((value as f64).ln() * self.c).round() as u8
    }

    /// Reconstruye el recuento aproximado desde su byte codificado.
    #[must_use]
    pub fn decode(&self, encoded: u8) -> u64 {
        (f64::from(encoded) / self.c).exp().round() as u64
    }

    /// Valor máximo que este códec puede representar.
    #[must_use]
    pub fn max(&self) -> u64 {
        self.max
    }
}
