// [tests/mirror/libs/core/hashdb/pipeline_roundtrip.test.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE ROUNDTRIP AUDIT
 * CLASIFICACIÓN: PROVING GROUNDS // ESTRATO L1-HASHDB
 * RESPONSABILIDAD: VIAJE COMPLETO CENSO -> BASE -> CONSULTA
 *
 * Certifica, sobre un censo determinista, que toda fila presente
 * resuelve a su recuento bajo cada esquema de codificación y cada
 * fragmentación admitida, que el umbral excluye, y que las huellas
 * ausentes (esquinas del espacio y cruces de filas vecinas) resuelven
 * a cero.
 * =================================================================
 */

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sha1::{Digest, Sha1};
use tempfile::TempDir;

use centinela_core_hashdb::layout::{index_file_size, INDEX_FILENAME, VALID_SHARD_COUNTS};
use centinela_core_hashdb::{CorpusVault, CountEncoding, IndexOptions, IndexingPipeline};
use centinela_domain_passwords::Sha1Digest;

const CORPUS_ROWS: usize = 240;

/// Censo determinista: huellas SHA-1 reales ordenadas por su forma
/// hexadecimal, con recuentos que recorren varios órdenes de magnitud.
fn deterministic_corpus() -> Vec<(String, u64)> {
    let mut rows: Vec<(String, u64)> = (0..CORPUS_ROWS)
        .map(|seed| {
            let digest = Sha1::digest(format!("centinela-{seed}").as_bytes());
            let count = (seed as u64 * 31) % 997 + 1;
            (hex::encode_upper(digest), count)
        })
        .collect();
    rows.sort();
    rows
}

fn write_corpus(directory: &Path, rows: &[(String, u64)]) -> PathBuf {
    let path = directory.join("pwned-passwords-sha1-ordered-by-hash.txt");
    let body: String = rows
        .iter()
        .map(|(hash, count)| format!("{hash}:{count}\n"))
        .collect();
    fs::write(&path, body).expect("IO_FAULT: escritura del censo de prueba");
    path
}

fn digest_of(hex40: &str) -> Sha1Digest {
    Sha1Digest::from_str(hex40).expect("huella de prueba ilegible")
}

/// Ejecuta el viaje completo para un juego de opciones.
fn certify_roundtrip(options: IndexOptions) {
    let rows = deterministic_corpus();
    let workspace = TempDir::new().expect("IO_FAULT: sandbox efímero");
    let input = write_corpus(workspace.path(), &rows);
    let db_dir = workspace.path().join("db");

    let summary = IndexingPipeline::new(&input, &db_dir, options)
        .execute()
        .expect("PIPELINE_FAULT: la cristalización colapsó");

    let min = options.min_hash_count.max(1);
    let expected_saved = rows.iter().filter(|(_, count)| *count >= min).count() as u64;
    assert_eq!(summary.saved, expected_saved, "entradas almacenadas");

    // Geometría exacta del índice: un centinela por shard más un cursor
    // por partición, sin relleno alguno.
    let index_len = fs::metadata(db_dir.join(INDEX_FILENAME))
        .expect("IO_FAULT: metadata del índice")
        .len();
    assert_eq!(index_len, index_file_size(options.shard_count));

    let vault = CorpusVault::open(&db_dir).expect("VAULT_FAULT: apertura rechazada");

    // 1. Toda fila del censo responde su recuento (o el efecto del umbral).
    for (hash, count) in &rows {
        let got = vault.lookup(&digest_of(hash)).expect("consulta fallida");
        let mut want = *count;
        if matches!(options.counting, CountEncoding::None) {
            want = 1;
        }
        if *count < min {
            want = 0;
        }
        match options.counting {
            CountEncoding::Exact | CountEncoding::None => {
                assert_eq!(got, want, "hash {hash}: recuento exacto");
            }
            CountEncoding::Approx => {
                let tolerance = (want as f64 / 25.0).round() as u64;
                assert!(
                    got >= want.saturating_sub(tolerance) && got <= want + tolerance,
                    "hash {hash}: {got} fuera de [{}, {}]",
                    want.saturating_sub(tolerance),
                    want + tolerance
                );
            }
        }
    }

    // 2. Las esquinas del espacio de hashes resuelven a cero.
    let present: HashSet<&str> = rows.iter().map(|(hash, _)| hash.as_str()).collect();
    for corner in [
        "0000000000000000000000000000000000000000",
        "7890ABCDEF0123456789ABCDEF0123456789ABCD",
        "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
    ] {
        if present.contains(corner) {
            continue;
        }
        assert_eq!(
            vault.lookup(&digest_of(corner)).expect("consulta fallida"),
            0,
            "esquina {corner}"
        );
    }

    // 3. Cruces de filas vecinas: prefijo de una con resto de la otra.
    for window in rows.windows(2) {
        let (previous, current) = (&window[0].0, &window[1].0);
        for cross in [
            format!("{}{}", &previous[..6], &current[6..]),
            format!("{}{}", &current[..6], &previous[6..]),
        ] {
            if present.contains(cross.as_str()) {
                continue;
            }
            assert_eq!(
                vault.lookup(&digest_of(&cross)).expect("consulta fallida"),
                0,
                "cruce {cross}"
            );
        }
    }

    // 4. El cierre ordenado libera todos los descriptores sin fallos.
    vault
        .close()
        .expect("VAULT_FAULT: cierre con fallos agregados");
}

#[test]
fn certify_default_options() {
    certify_roundtrip(IndexOptions::default());
}

#[test]
fn certify_min_hash_count_filter() {
    certify_roundtrip(IndexOptions {
        min_hash_count: 10,
        ..IndexOptions::default()
    });
}

#[test]
fn certify_every_shard_count() {
    for shard_count in VALID_SHARD_COUNTS {
        certify_roundtrip(IndexOptions {
            shard_count,
            ..IndexOptions::default()
        });
    }
}

#[test]
fn certify_approximate_counting() {
    certify_roundtrip(IndexOptions {
        counting: CountEncoding::Approx,
        ..IndexOptions::default()
    });
}

#[test]
fn certify_no_counting() {
    certify_roundtrip(IndexOptions {
        counting: CountEncoding::None,
        ..IndexOptions::default()
    });
}

#[test]
fn certify_combined_options() {
    certify_roundtrip(IndexOptions {
        min_hash_count: 5,
        shard_count: 8,
        counting: CountEncoding::Approx,
    });
}

#[test]
fn certify_single_row_database() {
    let workspace = TempDir::new().expect("IO_FAULT: sandbox efímero");
    let input = workspace.path().join("census.txt");
    fs::write(&input, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA:3\n")
        .expect("IO_FAULT: censo mínimo");
    let db_dir = workspace.path().join("db");

    let summary = IndexingPipeline::new(&input, &db_dir, IndexOptions::default())
        .execute()
        .expect("PIPELINE_FAULT");
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.max_hash_count, 3);

    let vault = CorpusVault::open(&db_dir).expect("VAULT_FAULT");
    assert_eq!(vault.lookup(&Sha1Digest::new([0xAA; 20])).unwrap(), 3);
    assert_eq!(vault.lookup(&Sha1Digest::new([0x00; 20])).unwrap(), 0);
    vault.close().expect("VAULT_FAULT: cierre limpio");
}

#[test]
fn certify_threshold_scenario() {
    // Dos filas con recuentos 1 y 10 bajo umbral 5: solo la segunda
    // queda alcanzable, la primera responde ausencia.
    let workspace = TempDir::new().expect("IO_FAULT: sandbox efímero");
    let input = workspace.path().join("census.txt");
    fs::write(
        &input,
        "1111111111111111111111111111111111111111:1\n\
         2222222222222222222222222222222222222222:10\n",
    )
    .expect("IO_FAULT: censo mínimo");
    let db_dir = workspace.path().join("db");

    let summary = IndexingPipeline::new(
        &input,
        &db_dir,
        IndexOptions {
            min_hash_count: 5,
            ..IndexOptions::default()
        },
    )
    .execute()
    .expect("PIPELINE_FAULT");
    assert_eq!(summary.saved, 1);

    let vault = CorpusVault::open(&db_dir).expect("VAULT_FAULT");
    assert_eq!(vault.lookup(&Sha1Digest::new([0x11; 20])).unwrap(), 0);
    assert_eq!(vault.lookup(&Sha1Digest::new([0x22; 20])).unwrap(), 10);
}

#[test]
fn certify_approx_scenario_tolerance() {
    // Recuento 1000 bajo 'approx': la respuesta cae en [960, 1040].
    let workspace = TempDir::new().expect("IO_FAULT: sandbox efímero");
    let input = workspace.path().join("census.txt");
    fs::write(&input, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA:1000\n")
        .expect("IO_FAULT: censo mínimo");
    let db_dir = workspace.path().join("db");

    IndexingPipeline::new(
        &input,
        &db_dir,
        IndexOptions {
            counting: CountEncoding::Approx,
            ..IndexOptions::default()
        },
    )
    .execute()
    .expect("PIPELINE_FAULT");

    let vault = CorpusVault::open(&db_dir).expect("VAULT_FAULT");
    let got = vault.lookup(&Sha1Digest::new([0xAA; 20])).unwrap();
    assert!((960..=1040).contains(&got), "aproximación fuera de banda: {got}");
}
