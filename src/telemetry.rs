//! # Logging
//! src/telemetry.rs
//!
//! Inicializa el subscriber global de `tracing`. El nivel se controla con
//! `RUST_LOG` (por defecto `info`).

use tracing_subscriber::EnvFilter;

/// Instala el subscriber de formato en consola.
///
/// Es seguro llamarla más de una vez: si ya hay un subscriber global
/// instalado (por ejemplo en tests), la llamada no hace nada.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}
