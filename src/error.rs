//! # Errores del Servidor
//! src/error.rs
//!
//! Errores de arranque y transporte. Los errores de cliente (400, 404, 503)
//! no pasan por aquí: los handlers los convierten directamente en `Response`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    /// No se pudo abrir el listener (fatal al arrancar)
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No se pudo instalar el handler de señales
    #[error("signal handling failed: {0}")]
    Signal(String),
}
