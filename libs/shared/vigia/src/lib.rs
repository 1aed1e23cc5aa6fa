// [libs/shared/vigia/src/lib.rs]

#![deny(missing_docs)]

/*!
 * =================================================================
 * APARATO: VIGÍA OBSERVER
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: TRAZADO ESTRUCTURADO Y CAPTURA DE PÁNICOS
 *
 * Punto único de ignición de la observabilidad para los binarios del
 * monorepo. En compilación de desarrollo emite trazas compactas y
 * legibles; en producción emite JSON plano apto para ingesta. El hook
 * de pánico reporta las coordenadas del colapso a través del propio
 * suscriptor antes de la defunción del proceso.
 * =================================================================
 */

use std::panic;

use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/**
 * Inicializa el suscriptor global de trazas y el escudo de pánicos.
 *
 * El filtro respeta `RUST_LOG` cuando está definido; en su ausencia
 * prioriza el dominio propio y silencia el ruido de la infraestructura
 * HTTP (tower, hyper).
 *
 * # Panics:
 * Si otro suscriptor global ya fue instalado en el runtime.
 */
pub fn init_tracing(service_identifier: &str) {
    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{default_level},tower_http=warn,hyper=warn"
        ))
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    install_panic_shield(service_identifier);
}

/// Redirige cualquier pánico hacia el suscriptor ya instalado.
fn install_panic_shield(service_identifier: &str) {
    let service = service_identifier.to_string();
    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "ubicación desconocida".to_string());

        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| {
                panic_info
                    .payload()
                    .downcast_ref::<String>()
                    .map(String::as_str)
            })
            .unwrap_or("payload no textual");

        error!(
            service = %service,
            location = %location,
            "💀 [PANIC_SHIELD]: {payload}"
        );
    }));
}
