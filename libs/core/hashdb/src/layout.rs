// [libs/core/hashdb/src/layout.rs]
/*!
 * =================================================================
 * APARATO: BINARY LAYOUT AUTHORITY
 * CLASIFICACIÓN: CORE INFRASTRUCTURE (ESTRATO L1)
 * RESPONSABILIDAD: CONSTANTES Y ARITMÉTICA DEL FORMATO EN DISCO
 *
 * La geometría del formato es bit-exacta y toda la crate deriva de
 * este módulo: prefijo de partición de 24 bits, resto de 17 bytes,
 * cursores big-endian de 4 bytes y fragmentación por el byte alto.
 * =================================================================
 */

use centinela_domain_passwords::digest::DIGEST_SIZE;

/// Versión del formato en disco que esta revisión sabe leer y escribir.
pub const VERSION: u32 = 1;

/// Identificador del único algoritmo de hash admitido.
pub const SUPPORTED_HASH: &str = "sha1";

/// Fragmentación por defecto del censo.
pub const DEFAULT_SHARD_COUNT: usize = 32;

/// Cota superior de la fragmentación (un shard por valor del byte alto).
pub const MAX_SHARD_COUNT: usize = 256;

/// Bytes del prefijo de partición (u24).
pub const PARTITION_SIZE: usize = 3;

/// Bytes de un cursor del índice (u32 big-endian).
pub const CURSOR_ENCODED_SIZE: u64 = 4;

/// Bytes leídos del índice por consulta: el par (inicio, fin).
pub const INDEX_READ_SIZE: usize = (CURSOR_ENCODED_SIZE * 2) as usize;

/// Bytes del resto de hash almacenado por entrada.
pub const HASH_REMAINDER_SIZE: usize = DIGEST_SIZE - PARTITION_SIZE;

/// Cantidad total de particiones direccionables (2^24).
pub const PARTITION_COUNT: u32 = 1 << 24;

/// Mayor prefijo de partición representable.
pub const MAX_UINT24: u32 = PARTITION_COUNT - 1;

/// Nombre del manifiesto de la base de datos.
pub const MANIFEST_FILENAME: &str = "db.json";

/// Nombre del archivo de índice de particiones.
pub const INDEX_FILENAME: &str = "index.db";

/// Recuentos de shards admitidos: potencias de dos hasta 256.
pub const VALID_SHARD_COUNTS: [usize; 9] = [1, 2, 4, 8, 16, 32, 64, 128, 256];

/// Certifica que la fragmentación solicitada pertenece al conjunto admitido.
#[must_use]
pub fn is_shard_count_valid(shard_count: usize) -> bool {
    VALID_SHARD_COUNTS.contains(&shard_count)
}

/// Particiones que posee cada shard: `2^24 / S`.
#[must_use]
pub fn partitions_per_shard(shard_count: usize) -> u32 {
    PARTITION_COUNT / shard_count as u32
}

/// Shard propietario de una huella, decidido por su byte alto.
#[must_use]
pub fn shard_of(first_byte: u8, shard_count: usize) -> usize {
    usize::from(first_byte) / (MAX_SHARD_COUNT / shard_count)
}

/// Prefijo de partición: los 3 primeros bytes como u24 big-endian.
#[must_use]
pub fn partition_of(sum: &[u8; DIGEST_SIZE]) -> u32 {
    u32::from(sum[0]) << 16 | u32::from(sum[1]) << 8 | u32::from(sum[2])
}

/// Decodifica un prefijo de partición desde sus 3 bytes crudos.
#[must_use]
pub fn partition_from_prefix(prefix: &[u8; PARTITION_SIZE]) -> u32 {
    u32::from(prefix[0]) << 16 | u32::from(prefix[1]) << 8 | u32::from(prefix[2])
}

/**
 * Nombre del archivo de hashes de un shard.
 *
 * Con un único shard el archivo es 'hashes.db'. Con varios, el índice
 * del shard se expresa en base 36 y se rellena con '0' hasta 2 cifras
 * solo cuando la fragmentación supera 36 archivos.
 */
#[must_use]
pub fn shard_filename(shard: usize, shard_count: usize) -> String {
    if shard_count == 1 {
        return "hashes.db".to_string();
    }
    let mut name = base36(shard);
    if shard_count > 36 && name.len() == 1 {
        name.insert(0, '0');
    }
    format!("hashes-{name}.db")
}

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn base36(mut value: usize) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(2);
    while value > 0 {
        digits.push(BASE36_DIGITS[value % 36] as char);
        value /= 36;
    }
    digits.iter().rev().collect()
}

/// Tamaño exacto del archivo de índice para una fragmentación dada.
///
/// Un centinela por shard más un cursor por partición: `(2^24 + S) × 4`.
#[must_use]
pub fn index_file_size(shard_count: usize) -> u64 {
    (u64::from(PARTITION_COUNT) + shard_count as u64) * CURSOR_ENCODED_SIZE
}

/// Estimación del tamaño total de la base de datos en disco.
#[must_use]
pub fn estimated_db_size(count: u64, shard_count: usize, count_encoded_size: u64) -> u64 {
    let entry_width = HASH_REMAINDER_SIZE as u64 + count_encoded_size;
    index_file_size(shard_count) + entry_width * count
}

/// Formato humano de bytes para la telemetría del operador.
#[must_use]
pub fn format_bytes(value: u64) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];
    if value < 1024 {
        return format!("{value} bytes");
    }
    let mut divisor = 1024u64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < divisor * 1024 {
            return format!("{:.2} {unit}", value as f64 / divisor as f64);
        }
        divisor *= 1024;
    }
    format!("{:.2} GiB", value as f64 / divisor as f64)
}
