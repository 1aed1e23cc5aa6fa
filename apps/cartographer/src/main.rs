// [apps/cartographer/src/main.rs]
/*!
 * =================================================================
 * APARATO: CARTOGRAPHER SHELL
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: IGNICIÓN DEL MOTOR DE INDEXACIÓN
 * =================================================================
 */

use clap::Parser;
use tracing::error;

use centinela_cartographer_lib::{run, CartographerCommand};
use centinela_shared_vigia::init_tracing;

fn main() {
    init_tracing("centinela_cartographer");

    let command = CartographerCommand::parse();
    if let Err(failure) = run(command) {
        error!("❌ [CARTOGRAPHER]: {failure:#}");
        std::process::exit(2);
    }
}
