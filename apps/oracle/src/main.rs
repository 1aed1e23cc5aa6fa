// [apps/oracle/src/main.rs]
/*!
 * =================================================================
 * APARATO: ORACLE SHELL
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: IGNICIÓN DE LA BÓVEDA Y DEL SERVIDOR HTTP
 * =================================================================
 */

use std::net::SocketAddr;
use std::path::PathBuf;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use centinela_core_hashdb::CorpusVault;
use centinela_oracle::{create_router, AppState};
use centinela_shared_vigia::init_tracing;

/// Configuración del proceso, vía argumentos o entorno.
#[derive(Parser, Debug)]
#[command(
    name = "oracle",
    version,
    about = "El Oráculo: API HTTP de consulta del censo de contraseñas comprometidas."
)]
struct OracleConfiguration {
    /// Dirección de escucha del servicio HTTP.
    #[arg(long, env = "CENTINELA_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Directorio de la base de datos cristalizada por el Cartógrafo.
    #[arg(long, env = "CENTINELA_PASSWORDS_DB")]
    passwords_db: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("centinela_oracle");

    let configuration = OracleConfiguration::parse();

    info!(
        database = %configuration.passwords_db.display(),
        "🗄️  [ORACLE]: Opening corpus vault"
    );
    let vault = Arc::new(CorpusVault::open(&configuration.passwords_db).with_context(|| {
        format!(
            "apertura de la base de datos {}",
            configuration.passwords_db.display()
        )
    })?);
    let state = AppState::for_vault(Arc::clone(&vault));

    let listener = tokio::net::TcpListener::bind(configuration.listen)
        .await
        .with_context(|| format!("escucha en {}", configuration.listen))?;

    info!(listen = %configuration.listen, "🚀 [ORACLE]: Service online");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("servidor HTTP")?;

    // Con el servidor caído la referencia del estado ya se soltó; la
    // bóveda vuelve a ser exclusiva y se cierra agregando sus fallos.
    match Arc::try_unwrap(vault) {
        Ok(vault) => vault.close().context("cierre de la bóveda")?,
        Err(_) => warn!("⚠️  [ORACLE]: Vault still shared at shutdown; handles released on last drop"),
    }

    info!("🛑 [ORACLE]: Shutdown complete, handles released");
    Ok(())
}

/// Resuelve cuando el operador solicita el apagado (ctrl-c / SIGINT).
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("📴 [ORACLE]: Shutdown signal received");
    }
}
