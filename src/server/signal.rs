//! # Señales de Terminación
//! src/server/signal.rs
//!
//! Espera SIGINT (Ctrl+C) o SIGTERM. El resto del servidor usa threads del
//! sistema; aquí solo se levanta un runtime de tokio de un hilo para
//! esperar la señal y se descarta al recibirla.

use crate::error::{Result, ServerError};
use tokio::signal;

/// Señal que disparó el apagado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl TerminationSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationSignal::Interrupt => "SIGINT",
            TerminationSignal::Terminate => "SIGTERM",
        }
    }
}

/// Bloquea el hilo actual hasta recibir SIGINT o SIGTERM
///
/// # Errores
///
/// `ServerError::Signal` si no se pudo instalar el handler de señales.
pub fn wait_for_termination() -> Result<TerminationSignal> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(termination_signal())
}

async fn termination_signal() -> Result<TerminationSignal> {
    #[cfg(unix)]
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(|e| ServerError::Signal(format!("failed to install SIGTERM handler: {}", e)))?;

    #[cfg(unix)]
    let terminate = async move {
        terminate.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = signal::ctrl_c() => {
            result.map_err(|e| ServerError::Signal(format!("failed to listen for Ctrl+C: {}", e)))?;
            tracing::info!("received Ctrl+C signal");
            Ok(TerminationSignal::Interrupt)
        }
        () = terminate => {
            tracing::info!("received SIGTERM signal");
            Ok(TerminationSignal::Terminate)
        }
    }
}
