// [libs/core/hashdb/src/indexer.rs]
/*!
 * =================================================================
 * APARATO: CORPUS INDEXING PIPELINE
 * CLASIFICACIÓN: ETL ENGINE (ESTRATO L1)
 * RESPONSABILIDAD: CRISTALIZACIÓN DEL CENSO TEXTUAL EN BASE BINARIA
 *
 * El indexador recorre el volcado textual dos veces. La primera pasada
 * audita el orden y levanta las estadísticas que parametrizan el
 * manifiesto y el códec de recuentos; la segunda emite el índice de
 * particiones y los archivos de shard en un único flujo monótono, sin
 * retener hashes en memoria.
 *
 * Disciplina de emisión del índice: por cada shard en orden ascendente
 * se escribe un centinela a cero y después un cursor por cada
 * partición de su rango, valga `cursor(q) =` entradas del shard con
 * partición `<= q`. Un shard sin filas, intermedio o final, se emite
 * igualmente completo, de modo que el direccionamiento `(p + s) × 4`
 * de la bóveda es exacto para cualquier fragmentación.
 * =================================================================
 */

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use tracing::{info, instrument};

use centinela_core_approxcount::Encoder;

use crate::errors::HashdbError;
use crate::layout::{
    estimated_db_size, format_bytes, is_shard_count_valid, partition_from_prefix,
    partitions_per_shard, shard_filename, shard_of, DEFAULT_SHARD_COUNT, HASH_REMAINDER_SIZE,
    INDEX_FILENAME, PARTITION_SIZE, SUPPORTED_HASH, VERSION,
};
use crate::manifest::{CorpusManifest, CountEncoding};

/// Cadencia máxima de los reportes al sumidero de progreso.
const PROGRESS_REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Capacidad de los buffers de lectura y escritura del pipeline.
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Pasada del pipeline que origina un reporte de progreso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPhase {
    /// Primera pasada: auditoría de orden y estadísticas.
    Analysis,
    /// Segunda pasada: emisión del índice y los shards.
    Crystallization,
}

/// Instantánea de avance entregada al sumidero de progreso.
#[derive(Debug, Clone, Copy)]
pub struct IndexProgress {
    /// Pasada en curso.
    pub phase: IndexPhase,
    /// Líneas del censo procesadas en la pasada.
    pub lines: u64,
    /// Bytes de entrada consumidos en la pasada.
    pub bytes_read: u64,
    /// Tamaño total del censo de entrada.
    pub bytes_total: u64,
}

/// Parámetros opcionales de la indexación.
#[derive(Debug, Clone, Copy)]
pub struct IndexOptions {
    /// Umbral: las filas con recuento inferior no se almacenan.
    pub min_hash_count: u64,
    /// Fragmentación del censo; debe pertenecer al conjunto admitido.
    pub shard_count: usize,
    /// Esquema de codificación de recuentos por entrada.
    pub counting: CountEncoding,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            min_hash_count: 1,
            shard_count: DEFAULT_SHARD_COUNT,
            counting: CountEncoding::default(),
        }
    }
}

/// Resultado de una indexación completada.
#[derive(Debug, Clone, Copy)]
pub struct IndexSummary {
    /// Entradas almacenadas en los archivos de shard.
    pub saved: u64,
    /// Máximo recuento observado entre las filas almacenadas.
    pub max_hash_count: u64,
    /// Estimación del tamaño de la base de datos emitida.
    pub estimated_db_size: u64,
}

/// Motor de ingesta del censo textual.
pub struct IndexingPipeline {
    input_path: PathBuf,
    output_directory: PathBuf,
    options: IndexOptions,
    progress_sink: Option<Box<dyn FnMut(&IndexProgress) + Send>>,
}

impl IndexingPipeline {
    /// Construye el pipeline sobre el censo de origen y el directorio destino.
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_directory: impl Into<PathBuf>,
        options: IndexOptions,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_directory: output_directory.into(),
            options,
            progress_sink: None,
        }
    }

    /// Registra el receptor de reportes periódicos de avance.
    #[must_use]
    pub fn with_progress_sink<F>(mut self, sink: F) -> Self
    where
        F: FnMut(&IndexProgress) + Send + 'static,
    {
        self.progress_sink = Some(Box::new(sink));
        self
    }

    /**
     * Ejecuta las dos pasadas y cristaliza la base de datos.
     *
     * El manifiesto se escribe antes que cualquier archivo binario para
     * que una base parcial sea detectable. Ante cualquier fallo el
     * directorio queda tal cual para inspección; el llamador decide su
     * eliminación.
     *
     * # Errors:
     * Directorio de salida preexistente, censo ausente o malformado,
     * censo desordenado, o cualquier fallo físico de E/S.
     */
    #[instrument(name = "index_corpus", skip_all)]
    pub fn execute(self) -> Result<IndexSummary, HashdbError> {
        let Self {
            input_path,
            output_directory,
            options,
            progress_sink,
        } = self;

        let min_hash_count = options.min_hash_count.max(1);
        let shard_count = options.shard_count;
        if !is_shard_count_valid(shard_count) {
            return Err(HashdbError::InvalidShardCount(shard_count));
        }
        if output_directory.exists() {
            return Err(HashdbError::OutputDirExists(output_directory));
        }

        let input_identity = input_path.display().to_string();
        let input_file = File::open(&input_path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                HashdbError::InputFileNotFound(input_path.clone())
            } else {
                HashdbError::io(&input_identity, e)
            }
        })?;
        let bytes_total = input_file
            .metadata()
            .map_err(|e| HashdbError::io(&input_identity, e))?
            .len();

        let mut throttle = ProgressThrottle {
            sink: progress_sink,
            last_report: Instant::now(),
            bytes_total,
        };

        // --- PASADA 1: AUDITORÍA Y ESTADÍSTICAS ---
        info!("🗺️  [ANALYSIS]: Auditing corpus {input_identity}");
        let statistics = analyze_corpus(
            &input_file,
            &input_identity,
            min_hash_count,
            &mut throttle,
        )?;
        info!(
            total_hashes = statistics.saved,
            max_hash_count = statistics.max_hash_count,
            "📊 [ANALYSIS]: Corpus audited"
        );

        let count_encoder = CountEncoder::for_encoding(options.counting, statistics.max_hash_count)?;

        let manifest = CorpusManifest {
            version: VERSION,
            hash: SUPPORTED_HASH.to_string(),
            count: statistics.saved,
            min_hash_count,
            max_hash_count: statistics.max_hash_count,
            shard_count,
            count_decoder: options.counting.decoder_token().to_string(),
        };

        // --- PASADA 2: EMISIÓN ---
        let estimated = estimated_db_size(
            statistics.saved,
            shard_count,
            options.counting.encoded_size(),
        );
        info!(
            directory = %output_directory.display(),
            estimated_size = %format_bytes(estimated),
            "💾 [CRYSTALLIZATION]: Emitting database"
        );

        fs::create_dir_all(&output_directory)
            .map_err(|e| HashdbError::io(output_directory.display().to_string(), e))?;
        manifest.store(&output_directory)?;

        (&input_file)
            .seek(SeekFrom::Start(0))
            .map_err(|e| HashdbError::io(&input_identity, e))?;

        let saved = emit_database(
            &input_file,
            &input_identity,
            &output_directory,
            min_hash_count,
            shard_count,
            &count_encoder,
            &mut throttle,
        )?;

        info!(saved, "✅ [CRYSTALLIZATION]: Database sealed");

        Ok(IndexSummary {
            saved,
            max_hash_count: statistics.max_hash_count,
            estimated_db_size: estimated,
        })
    }
}

struct CorpusStatistics {
    saved: u64,
    max_hash_count: u64,
}

/// Primera pasada: orden estricto por hash, recuento de filas que superan
/// el umbral y máximo recuento entre ellas.
fn analyze_corpus(
    input_file: &File,
    input_identity: &str,
    min_hash_count: u64,
    throttle: &mut ProgressThrottle,
) -> Result<CorpusStatistics, HashdbError> {
    let mut reader = BufReader::with_capacity(STREAM_BUFFER_SIZE, input_file);
    let mut line = String::new();
    let mut previous_prefix = String::new();
    let mut line_no = 0u64;
    let mut bytes_read = 0u64;
    let mut saved = 0u64;
    let mut max_hash_count = 0u64;

    loop {
        line.clear();
        let consumed = reader
            .read_line(&mut line)
            .map_err(|e| HashdbError::io(input_identity, e))?;
        if consumed == 0 {
            break;
        }
        bytes_read += consumed as u64;
        line_no += 1;

        let row = line.trim_end_matches('\n').trim_end_matches('\r');
        let (hash_hex, count) = split_row(row, line_no)?;

        if hash_hex < previous_prefix.as_str() {
            return Err(HashdbError::NotSorted {
                line: line_no,
                previous: previous_prefix,
                current: hash_hex.to_string(),
            });
        }
        previous_prefix.clear();
        previous_prefix.push_str(hash_hex);

        if count >= min_hash_count {
            saved += 1;
            if count > max_hash_count {
                max_hash_count = count;
            }
        }

        throttle.tick(IndexPhase::Analysis, line_no, bytes_read);
    }

    Ok(CorpusStatistics {
        saved,
        max_hash_count,
    })
}

/// Segunda pasada: flujo monótono de cursores más entradas por shard.
fn emit_database(
    input_file: &File,
    input_identity: &str,
    output_directory: &Path,
    min_hash_count: u64,
    shard_count: usize,
    count_encoder: &CountEncoder,
    throttle: &mut ProgressThrottle,
) -> Result<u64, HashdbError> {
    let index_path = output_directory.join(INDEX_FILENAME);
    let index_identity = index_path.display().to_string();
    let mut index_writer = BufWriter::with_capacity(
        STREAM_BUFFER_SIZE,
        File::create(&index_path).map_err(|e| HashdbError::io(&index_identity, e))?,
    );

    let mut shard_identities = Vec::with_capacity(shard_count);
    let mut shard_writers = Vec::with_capacity(shard_count);
    for shard in 0..shard_count {
        let path = output_directory.join(shard_filename(shard, shard_count));
        let identity = path.display().to_string();
        let file = File::create(&path).map_err(|e| HashdbError::io(&identity, e))?;
        shard_identities.push(identity);
        shard_writers.push(BufWriter::with_capacity(STREAM_BUFFER_SIZE, file));
    }

    let pps = partitions_per_shard(shard_count);
    let mut reader = BufReader::with_capacity(STREAM_BUFFER_SIZE, input_file);
    let mut line = String::new();
    let mut line_no = 0u64;
    let mut bytes_read = 0u64;
    let mut saved = 0u64;

    let mut current_shard = 0usize;
    let mut next_partition = 0u32;
    let mut hash_file_index = 0u32;
    let mut count_buf = Vec::with_capacity(4);

    // Centinela inicial del shard 0.
    write_cursor(&mut index_writer, 0, &index_identity)?;

    loop {
        line.clear();
        let consumed = reader
            .read_line(&mut line)
            .map_err(|e| HashdbError::io(input_identity, e))?;
        if consumed == 0 {
            break;
        }
        bytes_read += consumed as u64;
        line_no += 1;

        let row = line.trim_end_matches('\n').trim_end_matches('\r');
        let (hash_hex, count) = split_row(row, line_no)?;

        let hash_bytes = hash_hex.as_bytes();
        let mut prefix = [0u8; PARTITION_SIZE];
        hex::decode_to_slice(&hash_bytes[..PARTITION_SIZE * 2], &mut prefix).map_err(|_| {
            HashdbError::MalformedRow {
                line: line_no,
                reason: "prefijo no hexadecimal".to_string(),
            }
        })?;
        let partition = partition_from_prefix(&prefix);
        let shard = shard_of(prefix[0], shard_count);

        // El orden textual de la pasada 1 no cubre entradas con casing
        // mixto cuya forma binaria retrocede; aquí se rechaza.
        if shard < current_shard || (shard == current_shard && partition < next_partition) {
            return Err(HashdbError::PartitionRegression {
                line: line_no,
                previous: next_partition,
                current: partition,
            });
        }

        while current_shard < shard {
            let shard_end = (current_shard as u32 + 1) * pps;
            fill_cursor_run(
                &mut index_writer,
                hash_file_index,
                next_partition,
                shard_end,
                &index_identity,
            )?;
            current_shard += 1;
            write_cursor(&mut index_writer, 0, &index_identity)?;
            hash_file_index = 0;
            next_partition = current_shard as u32 * pps;
        }

        fill_cursor_run(
            &mut index_writer,
            hash_file_index,
            next_partition,
            partition,
            &index_identity,
        )?;
        next_partition = partition;

        if count >= min_hash_count {
            let mut remainder = [0u8; HASH_REMAINDER_SIZE];
            hex::decode_to_slice(&hash_bytes[PARTITION_SIZE * 2..], &mut remainder).map_err(
                |_| HashdbError::MalformedRow {
                    line: line_no,
                    reason: "hash no hexadecimal".to_string(),
                },
            )?;
            count_encoder.encode_into(count, &mut count_buf);
            let writer = &mut shard_writers[shard];
            writer
                .write_all(&remainder)
                .map_err(|e| HashdbError::io(&shard_identities[shard], e))?;
            writer
                .write_all(&count_buf)
                .map_err(|e| HashdbError::io(&shard_identities[shard], e))?;
            saved += 1;
            hash_file_index += 1;
        }

        throttle.tick(IndexPhase::Crystallization, line_no, bytes_read);
    }

    // Cierre del shard en curso y pre-emisión de los shards restantes,
    // vacíos incluidos: cada uno recibe su centinela y su corrida íntegra.
    loop {
        let shard_end = (current_shard as u32 + 1) * pps;
        fill_cursor_run(
            &mut index_writer,
            hash_file_index,
            next_partition,
            shard_end,
            &index_identity,
        )?;
        if current_shard + 1 == shard_count {
            break;
        }
        current_shard += 1;
        write_cursor(&mut index_writer, 0, &index_identity)?;
        hash_file_index = 0;
        next_partition = current_shard as u32 * pps;
    }

    index_writer
        .flush()
        .map_err(|e| HashdbError::io(&index_identity, e))?;
    for (shard, writer) in shard_writers.iter_mut().enumerate() {
        writer
            .flush()
            .map_err(|e| HashdbError::io(&shard_identities[shard], e))?;
    }

    Ok(saved)
}

/// Separa una fila `<40 hex>:<recuento>` ya despojada del salto de línea.
fn split_row(row: &str, line_no: u64) -> Result<(&str, u64), HashdbError> {
    let malformed = |reason: String| HashdbError::MalformedRow {
        line: line_no,
        reason,
    };
    let (hash_hex, separator, count_text) = match (row.get(..40), row.get(40..41), row.get(41..)) {
        (Some(hash), Some(sep), Some(count)) => (hash, sep, count),
        _ => {
            return Err(malformed(format!(
                "se esperaban 40 cifras hexadecimales, ':' y un recuento; la fila mide {} bytes",
                row.len()
            )))
        }
    };
    if separator != ":" {
        return Err(malformed(format!("separador '{separator}' en lugar de ':'")));
    }
    let count = count_text
        .parse::<u64>()
        .map_err(|e| malformed(format!("recuento ilegible: {e}")))?;
    Ok((hash_hex, count))
}

fn write_cursor(
    writer: &mut BufWriter<File>,
    value: u32,
    identity: &str,
) -> Result<(), HashdbError> {
    writer
        .write_u32::<BigEndian>(value)
        .map_err(|e| HashdbError::io(identity, e))
}

/// Emite `cursor = value` para cada partición de `[from, to)`.
fn fill_cursor_run(
    writer: &mut BufWriter<File>,
    value: u32,
    from: u32,
    to: u32,
    identity: &str,
) -> Result<(), HashdbError> {
    let mut encoded = [0u8; 4];
    BigEndian::write_u32(&mut encoded, value);
    for _ in from..to {
        writer
            .write_all(&encoded)
            .map_err(|e| HashdbError::io(identity, e))?;
    }
    Ok(())
}

/// Codificador de recuentos seleccionado para la emisión.
enum CountEncoder {
    Exact,
    Approx(Encoder),
    None,
}

impl CountEncoder {
    fn for_encoding(counting: CountEncoding, max_hash_count: u64) -> Result<Self, HashdbError> {
        Ok(match counting {
            CountEncoding::Exact => Self::Exact,
            CountEncoding::Approx => Self::Approx(Encoder::new(max_hash_count)?),
            CountEncoding::None => Self::None,
        })
    }

    fn encode_into(&self, count: u64, out: &mut Vec<u8>) {
        out.clear();
        match self {
            Self::Exact => {
                let mut encoded = [0u8; 4];
                BigEndian::write_u32(&mut encoded, count as u32);
                out.extend_from_slice(&encoded);
            }
            Self::Approx(encoder) => out.push(encoder.encode(count)),
            Self::None => {}
        }
    }
}

struct ProgressThrottle {
    sink: Option<Box<dyn FnMut(&IndexProgress) + Send>>,
    last_report: Instant,
    bytes_total: u64,
}

impl ProgressThrottle {
    fn tick(&mut self, phase: IndexPhase, lines: u64, bytes_read: u64) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if self.last_report.elapsed() < PROGRESS_REPORT_INTERVAL {
            return;
        }
        self.last_report = Instant::now();
        sink(&IndexProgress {
            phase,
            lines,
            bytes_read,
            bytes_total: self.bytes_total,
        });
    }
}
