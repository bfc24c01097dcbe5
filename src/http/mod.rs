//! # Módulo HTTP
//!
//! Implementa el protocolo HTTP/1.0 desde cero, sin usar librerías de
//! alto nivel. Incluye:
//!
//! - Parsing de requests (request line, headers y body de formularios)
//! - Construcción de responses
//! - Manejo de status codes
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/plain; charset=utf-8\r\n
//! Content-Length: 1\r\n
//! Connection: close\r\n
//! \r\n
//! 1
//! ```

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
