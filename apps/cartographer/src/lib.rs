// [apps/cartographer/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CARTOGRAPHER COMMAND LIBRARY
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L6)
 * RESPONSABILIDAD: ORQUESTACIÓN DE LA INDEXACIÓN DESDE EL CLI
 *
 * Traduce los argumentos del operador al motor de indexación del
 * núcleo y proyecta el sumidero de progreso sobre una barra indicatif
 * con dos fases: análisis del censo y cristalización de la base.
 * =================================================================
 */

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use centinela_core_hashdb::layout::format_bytes;
use centinela_core_hashdb::{
    CountEncoding, IndexOptions, IndexPhase, IndexProgress, IndexSummary, IndexingPipeline,
};

/// Argumentos de la cartografía del censo comprometido.
#[derive(Parser, Debug)]
#[command(
    name = "cartographer",
    version,
    about = "El Cartógrafo: cristaliza el volcado HIBP ordenado por hash en una base de datos binaria fragmentada."
)]
pub struct CartographerCommand {
    /// Ruta del volcado textual `<40 hex>:<recuento>` ordenado por hash.
    pub input_file: PathBuf,

    /// Directorio destino de la base de datos; no debe existir.
    pub output_directory: PathBuf,

    /// Omite las filas con recuento inferior a este umbral.
    #[arg(long, default_value_t = 1)]
    pub min_hash_count: u64,

    /// Fragmentación del censo. Valores admitidos: 1, 2, 4, 8, 16, 32, 64, 128, 256.
    #[arg(long, default_value_t = 32)]
    pub shard_count: usize,

    /// Esquema de almacenamiento de recuentos por entrada.
    #[arg(long, value_enum, default_value_t = HashCountingArgument::Exact)]
    pub hash_counting: HashCountingArgument,

    /// Silencia la barra de progreso del operador.
    #[arg(long, short)]
    pub quiet: bool,
}

/// Esquemas de recuento expuestos al operador.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashCountingArgument {
    /// Recuento exacto: 4 bytes por entrada.
    Exact,
    /// Aproximación logarítmica: 1 byte por entrada.
    Approx,
    /// Sin recuento: toda huella presente responde 1.
    None,
}

impl From<HashCountingArgument> for CountEncoding {
    fn from(argument: HashCountingArgument) -> Self {
        match argument {
            HashCountingArgument::Exact => Self::Exact,
            HashCountingArgument::Approx => Self::Approx,
            HashCountingArgument::None => Self::None,
        }
    }
}

/// Ejecuta la cartografía completa y reporta el resumen al operador.
pub fn run(command: CartographerCommand) -> Result<IndexSummary> {
    let options = IndexOptions {
        min_hash_count: command.min_hash_count,
        shard_count: command.shard_count,
        counting: command.hash_counting.into(),
    };

    let mut pipeline = IndexingPipeline::new(
        &command.input_file,
        &command.output_directory,
        options,
    );

    let progress_bar = if command.quiet {
        None
    } else {
        Some(operator_progress_bar()?)
    };
    if let Some(bar) = progress_bar.clone() {
        pipeline = pipeline.with_progress_sink(move |progress: &IndexProgress| {
            bar.set_length(progress.bytes_total);
            bar.set_position(progress.bytes_read);
            bar.set_message(match progress.phase {
                IndexPhase::Analysis => "analizando censo",
                IndexPhase::Crystallization => "cristalizando base",
            });
        });
    }

    let summary = pipeline.execute().with_context(|| {
        format!(
            "cartografía de {} hacia {}",
            command.input_file.display(),
            command.output_directory.display()
        )
    })?;

    if let Some(bar) = progress_bar {
        bar.finish_and_clear();
    }

    info!(
        saved = summary.saved,
        max_hash_count = summary.max_hash_count,
        estimated_size = %format_bytes(summary.estimated_db_size),
        "🏁 [CARTOGRAPHER]: Census crystallized"
    );

    Ok(summary)
}

fn operator_progress_bar() -> Result<ProgressBar> {
    let style = ProgressStyle::with_template(
        "{spinner} {msg} {bytes}/{total_bytes} ({percent}%, eta {eta})",
    )
    .context("plantilla de progreso inválida")?;
    Ok(ProgressBar::new(0).with_style(style))
}
