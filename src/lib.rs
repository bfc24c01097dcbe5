//! # Hash Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 concurrente que calcula digests SHA-512 (codificados
//! en base64) de forma diferida, expone estadísticas de latencia y se
//! apaga de forma ordenada.
//!
//! ## Arquitectura
//!
//! - `http`: parsing de requests y construcción de responses
//! - `server`: listener TCP, un thread por conexión y señales de apagado
//! - `router`: enrutamiento de paths a handlers
//! - `jobs`: ids, trabajo diferido, store de resultados y digest
//! - `metrics`: agregador de estadísticas y endpoint `/stats`
//! - `shutdown`: estado de drenado y contador de trabajo en curso
//! - `context`: estado compartido que reciben los handlers
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use hash_server::config::Config;
//! use hash_server::server::Server;
//!
//! let server = Server::bind(Config::default()).unwrap();
//! server.run().unwrap();
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod jobs;
pub mod metrics;
pub mod router;
pub mod server;
pub mod shutdown;
pub mod telemetry;
