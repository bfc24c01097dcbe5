//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! - `tcp`: listener, un thread por conexión, lectura del request y
//!   rechazo con 503 durante el drenado
//! - `signal`: espera de SIGINT/SIGTERM para iniciar el apagado

pub mod signal;
pub mod tcp;

pub use signal::{wait_for_termination, TerminationSignal};
pub use tcp::Server;
