// [libs/core/hashdb/src/manifest.rs]
/*!
 * =================================================================
 * APARATO: CORPUS MANIFEST MODEL
 * CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
 * RESPONSABILIDAD: CONTRATO DE INTEGRIDAD DE LA BASE DE DATOS
 *
 * El manifiesto 'db.json' es la cabecera legible de la base de datos:
 * se escribe antes que cualquier archivo binario para que una base
 * parcial sea detectable, y se valida íntegramente antes de abrir
 * cualquier archivo binario para consulta.
 * =================================================================
 */

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::HashdbError;
use crate::layout::{is_shard_count_valid, MANIFEST_FILENAME, SUPPORTED_HASH, VERSION};

/// Esquema de codificación de recuentos elegido al indexar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountEncoding {
    /// 4 bytes big-endian por entrada, recuento exacto.
    #[default]
    Exact,
    /// 1 byte por entrada, aproximación logarítmica (~2% de error).
    Approx,
    /// 0 bytes por entrada; todo hash presente cuenta como 1.
    None,
}

impl CountEncoding {
    /// Ancho en bytes del recuento codificado por entrada.
    #[must_use]
    pub fn encoded_size(self) -> u64 {
        match self {
            Self::Exact => 4,
            Self::Approx => 1,
            Self::None => 0,
        }
    }

    /// Token del decodificador que el manifiesto persiste.
    #[must_use]
    pub fn decoder_token(self) -> &'static str {
        match self {
            Self::Exact => "big32",
            Self::Approx => "approx8",
            Self::None => "none",
        }
    }

    /// Resuelve el esquema desde el token persistido en el manifiesto.
    ///
    /// # Errors:
    /// [`HashdbError::UnknownCountDecoder`] ante un token desconocido.
    pub fn from_decoder_token(token: &str) -> Result<Self, HashdbError> {
        match token {
            "big32" => Ok(Self::Exact),
            "approx8" => Ok(Self::Approx),
            "none" => Ok(Self::None),
            other => Err(HashdbError::UnknownCountDecoder(other.to_string())),
        }
    }
}

/// Descriptor estructurado de la base de datos, persistido como JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusManifest {
    /// Versión del formato en disco.
    pub version: u32,
    /// Identificador del algoritmo de hash ("sha1").
    pub hash: String,
    /// Total de entradas almacenadas en los archivos de shard.
    pub count: u64,
    /// Umbral de recuento aplicado durante la indexación.
    pub min_hash_count: u64,
    /// Máximo recuento observado entre las filas que superaron el umbral.
    pub max_hash_count: u64,
    /// Fragmentación de la base de datos.
    pub shard_count: usize,
    /// Token del decodificador de recuentos por entrada.
    pub count_decoder: String,
}

impl CorpusManifest {
    /// Lee y valida el manifiesto del directorio de la base de datos.
    pub fn load(dir: &Path) -> Result<Self, HashdbError> {
        let path = dir.join(MANIFEST_FILENAME);
        let raw = fs::read(&path).map_err(|e| HashdbError::io(path.display().to_string(), e))?;
        let manifest: Self = serde_json::from_slice(&raw)
            .map_err(|e| HashdbError::ManifestUnreadable(path.clone(), e))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Persiste el manifiesto como JSON legible en el directorio dado.
    pub fn store(&self, dir: &Path) -> Result<(), HashdbError> {
        let path = dir.join(MANIFEST_FILENAME);
        let body = serde_json::to_vec_pretty(self)
            .map_err(|e| HashdbError::ManifestUnreadable(path.clone(), e))?;
        fs::write(&path, body).map_err(|e| HashdbError::io(path.display().to_string(), e))
    }

    /**
     * Rechaza manifiestos que este código no puede servir con garantías:
     * versión futura, hash ajeno, fragmentación fuera del conjunto
     * admitido o token de decodificador desconocido.
     */
    pub fn validate(&self) -> Result<(), HashdbError> {
        if self.version > VERSION {
            return Err(HashdbError::UnsupportedVersion(self.version));
        }
        if self.hash != SUPPORTED_HASH {
            return Err(HashdbError::UnsupportedHash(self.hash.clone()));
        }
        if !is_shard_count_valid(self.shard_count) {
            return Err(HashdbError::InvalidShardCount(self.shard_count));
        }
        CountEncoding::from_decoder_token(&self.count_decoder)?;
        Ok(())
    }

    /// Esquema de recuentos declarado por el manifiesto ya validado.
    pub fn count_encoding(&self) -> Result<CountEncoding, HashdbError> {
        CountEncoding::from_decoder_token(&self.count_decoder)
    }
}
