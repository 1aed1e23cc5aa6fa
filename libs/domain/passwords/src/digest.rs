// [libs/domain/passwords/src/digest.rs]
/*!
 * =================================================================
 * APARATO: SHA-1 DIGEST MODEL
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: REPRESENTACIÓN NOMINAL DE LA HUELLA DE 160 BITS
 * =================================================================
 */

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longitud en bytes de una huella SHA-1.
pub const DIGEST_SIZE: usize = 20;

/// Fallos de análisis de una huella desde su forma hexadecimal.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DigestParseError {
    /// La representación textual no mide exactamente 40 caracteres.
    #[error("longitud de huella inválida: {0} caracteres, se esperaban 40")]
    InvalidLength(usize),
    /// La representación textual contiene caracteres fuera de [0-9a-fA-F].
    #[error("huella hexadecimal inválida")]
    InvalidHex,
}

/// Huella SHA-1 de 20 bytes, la única clase de hash que admite el censo.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha1Digest([u8; DIGEST_SIZE]);

impl Sha1Digest {
    /// Construye la huella desde sus 20 bytes crudos.
    #[must_use]
    pub const fn new(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Acceso a los 20 bytes crudos de la huella.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }
}

impl From<[u8; DIGEST_SIZE]> for Sha1Digest {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Sha1Digest {
    type Err = DigestParseError;

    /// Analiza las 40 cifras hexadecimales, mayúsculas o minúsculas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != DIGEST_SIZE * 2 {
            return Err(DigestParseError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; DIGEST_SIZE];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| DigestParseError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Sha1Digest {
    // La forma de depuración coincide con la forma canónica hexadecimal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha1Digest({self})")
    }
}
