//! # Hash Server - Entry Point
//! src/main.rs
//!
//! Arranca el listener en un thread aparte y deja al hilo principal
//! esperando la señal de apagado. Al recibirla se rechazan las peticiones
//! nuevas y se espera a que terminen las ya admitidas.

use hash_server::config::Config;
use hash_server::error::{Result, ServerError};
use hash_server::server::{wait_for_termination, Server};
use hash_server::telemetry::init_tracing;
use std::process::ExitCode;
use std::thread;

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal error");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Config::new();
    config.validate().map_err(ServerError::InvalidConfig)?;
    config.print_summary();

    let server = Server::bind(config)?;
    let context = server.context().clone();

    thread::Builder::new()
        .name("acceptor".to_string())
        .spawn(move || {
            if let Err(e) = server.run() {
                tracing::error!(error = %e, "accept loop stopped");
            }
        })?;

    let signal = wait_for_termination()?;
    tracing::info!(
        signal = signal.as_str(),
        pending_jobs = context.dispatcher.pending(),
        "shutting down, waiting for in-flight requests"
    );
    context.shutdown.drain();

    let stats = context.stats.snapshot();
    tracing::info!(
        total = stats.total,
        average_ms = stats.average,
        pending_jobs = context.dispatcher.pending(),
        "shutdown complete"
    );

    Ok(())
}
