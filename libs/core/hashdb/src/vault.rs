// [libs/core/hashdb/src/vault.rs]
/*!
 * =================================================================
 * APARATO: CORPUS LOOKUP VAULT
 * CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
 * RESPONSABILIDAD: CONSULTA ACOTADA SOBRE LA BASE FRAGMENTADA
 *
 * Cada consulta ejecuta exactamente una lectura posicional de 8 bytes
 * sobre el índice (el par de cursores de la partición) y un barrido
 * corto sobre un único archivo de shard. Las lecturas llevan su propio
 * desplazamiento ('read_exact_at'): no hay cursor compartido ni
 * cerrojo alguno entre lectores concurrentes.
 * =================================================================
 */

use std::fs::File;
use std::io::ErrorKind;
use std::os::unix::fs::FileExt;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, instrument, warn};

use centinela_core_approxcount::Encoder;
use centinela_domain_passwords::{PasswordsService, ServiceError, Sha1Digest};

use crate::errors::HashdbError;
use crate::layout::{
    partition_of, shard_filename, shard_of, CURSOR_ENCODED_SIZE, HASH_REMAINDER_SIZE,
    INDEX_FILENAME, INDEX_READ_SIZE, PARTITION_SIZE,
};
use crate::manifest::{CorpusManifest, CountEncoding};
use crate::metrics::VaultMetrics;

/// Cota del buffer de barrido sobre un archivo de shard.
const MAX_READER_BUFFER_SIZE: u64 = 4096;

/// Servicio de consulta sobre una base de datos cristalizada.
///
/// Se abre en modo solo-lectura y su contenido es inmutable durante toda
/// la vida del servicio. El apagado ordenado pasa por [`CorpusVault::close`],
/// que agrega y reporta los fallos de cierre; soltar el valor sin más
/// libera los descriptores en silencio.
#[derive(Debug)]
pub struct CorpusVault {
    manifest: CorpusManifest,
    index: File,
    index_identity: String,
    shards: Vec<File>,
    shard_identities: Vec<String>,
    count_decoder: CountDecoder,
    count_encoded_size: u64,
    metrics: VaultMetrics,
}

impl CorpusVault {
    /**
     * Abre la base de datos de un directorio y valida su manifiesto.
     *
     * Si algún archivo falla al abrirse, los descriptores ya adquiridos
     * se liberan antes de retornar.
     *
     * # Errors:
     * Manifiesto ausente, ilegible o rechazado; archivos de índice o de
     * shard inaccesibles.
     */
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, HashdbError> {
        let directory = directory.as_ref();
        let manifest = CorpusManifest::load(directory)?;
        let count_encoding = manifest.count_encoding()?;

        let count_decoder = match count_encoding {
            CountEncoding::Exact => CountDecoder::Big32,
            CountEncoding::Approx => CountDecoder::Approx8(Encoder::new(manifest.max_hash_count)?),
            CountEncoding::None => CountDecoder::None,
        };

        let index_path = directory.join(INDEX_FILENAME);
        let index_identity = index_path.display().to_string();
        let index = open_read_only(&index_path)?;

        let mut shards = Vec::with_capacity(manifest.shard_count);
        let mut shard_identities = Vec::with_capacity(manifest.shard_count);
        for shard in 0..manifest.shard_count {
            let path = directory.join(shard_filename(shard, manifest.shard_count));
            shards.push(open_read_only(&path)?);
            shard_identities.push(path.display().to_string());
        }

        debug!(
            shard_count = manifest.shard_count,
            count = manifest.count,
            decoder = %manifest.count_decoder,
            "🗄️  [VAULT]: Database opened"
        );

        Ok(Self {
            count_encoded_size: count_encoding.encoded_size(),
            manifest,
            index,
            index_identity,
            shards,
            shard_identities,
            count_decoder,
            metrics: VaultMetrics::default(),
        })
    }

    /**
     * Resuelve el recuento de apariciones de una huella; 0 si no consta.
     *
     * Garantías físicas: una lectura de 8 bytes sobre el índice y, solo
     * si la partición tiene candidatos, un barrido de a lo sumo
     * `entry_end - entry_start` entradas sobre un único shard.
     */
    #[instrument(level = "trace", skip_all)]
    pub fn lookup(&self, sum: &Sha1Digest) -> Result<u64, HashdbError> {
        self.metrics.record_checked();

        let bytes = sum.as_bytes();
        let shard = shard_of(bytes[0], self.manifest.shard_count);
        let partition = u64::from(partition_of(bytes));

        // El término '+ shard' salta los centinelas de los shards previos.
        let index_offset = (partition + shard as u64) * CURSOR_ENCODED_SIZE;
        let mut cursor_pair = [0u8; INDEX_READ_SIZE];
        self.index
            .read_exact_at(&mut cursor_pair, index_offset)
            .map_err(|e| self.read_failure(&self.index_identity, index_offset, e))?;

        let entry_start = u64::from(BigEndian::read_u32(&cursor_pair[..4]));
        let entry_end = u64::from(BigEndian::read_u32(&cursor_pair[4..]));
        if entry_start >= entry_end {
            return Ok(0);
        }

        let entry_width = HASH_REMAINDER_SIZE as u64 + self.count_encoded_size;
        let mut offset = entry_start * entry_width;
        let end_offset = entry_end * entry_width;

        let entries_per_chunk = (MAX_READER_BUFFER_SIZE / entry_width).max(1);
        let chunk_size = (entries_per_chunk * entry_width).min(end_offset - offset);
        let mut buffer = vec![0u8; chunk_size as usize];

        let shard_file = &self.shards[shard];
        let wanted_remainder = &bytes[PARTITION_SIZE..];

        while offset < end_offset {
            let take = chunk_size.min(end_offset - offset) as usize;
            let chunk = &mut buffer[..take];
            shard_file
                .read_exact_at(chunk, offset)
                .map_err(|e| self.read_failure(&self.shard_identities[shard], offset, e))?;

            for entry in chunk.chunks_exact(entry_width as usize) {
                if &entry[..HASH_REMAINDER_SIZE] == wanted_remainder {
                    let count = self.count_decoder.decode(&entry[HASH_REMAINDER_SIZE..]);
                    self.metrics.record_compromised();
                    return Ok(count);
                }
            }
            offset += take as u64;
        }

        Ok(0)
    }

    /**
     * Cierra la bóveda liberando todos los descriptores abiertos.
     *
     * Cada archivo (los shards en orden y después el índice) se
     * sincroniza para aflorar los fallos que el sistema de archivos
     * tuviera pendientes antes de liberar su descriptor. Los fallos se
     * agregan: todos se reportan por el suscriptor de trazas y el
     * primero se retorna al llamador.
     */
    pub fn close(self) -> Result<(), HashdbError> {
        let mut first_failure: Option<HashdbError> = None;
        let mut register = |failure: HashdbError| {
            warn!("⚠️  [VAULT]: Close failure: {failure}");
            if first_failure.is_none() {
                first_failure = Some(failure);
            }
        };

        for (shard, file) in self.shards.iter().enumerate() {
            if let Err(e) = file.sync_all() {
                register(HashdbError::io(self.shard_identities[shard].as_str(), e));
            }
        }
        if let Err(e) = self.index.sync_all() {
            register(HashdbError::io(self.index_identity.as_str(), e));
        }

        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    /// Manifiesto validado de la base abierta.
    #[must_use]
    pub fn manifest(&self) -> &CorpusManifest {
        &self.manifest
    }

    /// Contadores de consulta de la bóveda.
    #[must_use]
    pub fn metrics(&self) -> &VaultMetrics {
        &self.metrics
    }

    fn read_failure(&self, identity: &str, offset: u64, source: std::io::Error) -> HashdbError {
        if source.kind() == ErrorKind::UnexpectedEof {
            HashdbError::corruption(identity, offset, "lectura corta en desplazamiento esperado")
        } else {
            HashdbError::io(identity, source)
        }
    }
}

impl PasswordsService for CorpusVault {
    fn is_password_compromised(&self, sum: &Sha1Digest) -> Result<u64, ServiceError> {
        self.lookup(sum).map_err(ServiceError::lookup)
    }
}

fn open_read_only(path: &Path) -> Result<File, HashdbError> {
    File::open(path).map_err(|e| HashdbError::io(path.display().to_string(), e))
}

/// Decodificador de recuentos construido desde el token del manifiesto.
#[derive(Debug)]
enum CountDecoder {
    Big32,
    Approx8(Encoder),
    None,
}

impl CountDecoder {
    fn decode(&self, bytes: &[u8]) -> u64 {
        match self {
            Self::Big32 => u64::from(BigEndian::read_u32(bytes)),
            Self::Approx8(encoder) => encoder.decode(bytes[0]),
            Self::None => 1,
        }
    }
}
