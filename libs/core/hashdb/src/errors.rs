// [libs/core/hashdb/src/errors.rs]
// =================================================================
// APARATO: HASHDB ERRORS
// RESPONSABILIDAD: CATÁLOGO DE FALLOS DE LA BÓVEDA Y DEL INDEXADOR
// =================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Catálogo de fallos de la base de datos fragmentada.
///
/// Distingue cuatro familias: configuración rechazada antes de tocar el
/// disco, formato de entrada malformado durante la ingesta, corrupción
/// detectada al consultar y fallos físicos de E/S con identidad de
/// archivo.
#[derive(Error, Debug)]
pub enum HashdbError {
    /// El directorio de salida ya existe; el indexador nunca sobrescribe.
    #[error("el directorio de la base de datos {0} ya existe")]
    OutputDirExists(PathBuf),

    /// El archivo de entrada no pudo abrirse.
    #[error("el archivo de entrada {0} no existe")]
    InputFileNotFound(PathBuf),

    /// La fragmentación solicitada no pertenece al conjunto admitido.
    #[error("recuento de shards inválido: {0}")]
    InvalidShardCount(usize),

    /// La versión del manifiesto supera la que este código sabe leer.
    #[error("versión de datos no soportada: {0}")]
    UnsupportedVersion(u32),

    /// El manifiesto declara un algoritmo de hash desconocido.
    #[error("algoritmo de hash no soportado: {0}")]
    UnsupportedHash(String),

    /// El manifiesto declara un decodificador de recuentos desconocido.
    #[error("decodificador de recuentos inválido: {0}")]
    UnknownCountDecoder(String),

    /// El manifiesto no pudo deserializarse.
    #[error("manifiesto {0} ilegible: {1}")]
    ManifestUnreadable(PathBuf, #[source] serde_json::Error),

    /// Una línea del censo no respeta el formato `<40 hex>:<recuento>`.
    #[error("línea {line}: registro malformado ({reason})")]
    MalformedRow {
        /// Número de línea (base 1) del registro ofensor.
        line: u64,
        /// Descripción del defecto concreto.
        reason: String,
    },

    /// El censo de entrada no está ordenado por hash.
    #[error("línea {line}: el censo no está ordenado por hash ({current} tras {previous})")]
    NotSorted {
        /// Número de línea (base 1) del registro ofensor.
        line: u64,
        /// Prefijo hexadecimal del registro anterior.
        previous: String,
        /// Prefijo hexadecimal del registro ofensor.
        current: String,
    },

    /// Una partición retrocedió dentro del mismo shard durante la emisión.
    #[error("línea {line}: la partición {current} no sucede a la partición {previous}")]
    PartitionRegression {
        /// Número de línea (base 1) del registro ofensor.
        line: u64,
        /// Partición del registro anterior.
        previous: u32,
        /// Partición del registro ofensor.
        current: u32,
    },

    /// Lectura corta o desplazamiento más allá del final de un archivo.
    #[error("corrupción en {file} en el desplazamiento {offset}: {details}")]
    Corruption {
        /// Archivo de la base de datos afectado.
        file: String,
        /// Desplazamiento en bytes de la lectura fallida.
        offset: u64,
        /// Descripción del defecto observado.
        details: String,
    },

    /// Fallo físico de entrada/salida con identidad de archivo.
    #[error("e/s sobre {file}: {source}")]
    Io {
        /// Archivo sobre el que falló la operación.
        file: String,
        /// Fallo subyacente del sistema operativo.
        #[source]
        source: std::io::Error,
    },

    /// El códec de recuentos aproximados rechazó su parametrización.
    #[error(transparent)]
    Codec(#[from] centinela_core_approxcount::EncoderError),
}

impl HashdbError {
    /// Ata un fallo de E/S a la identidad del archivo afectado.
    pub fn io(file: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            file: file.into(),
            source,
        }
    }

    /// Construye un fallo de corrupción con coordenadas físicas.
    pub fn corruption(file: impl Into<String>, offset: u64, details: impl Into<String>) -> Self {
        Self::Corruption {
            file: file.into(),
            offset,
            details: details.into(),
        }
    }
}
