//! # Función de Digest
//! src/jobs/digest.rs
//!
//! El cálculo del digest es intercambiable: el dispatcher solo conoce el
//! trait `Digester`. La implementación por defecto es SHA-512 codificado
//! en base64 estándar (con padding).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha512};

/// Función pura `bytes -> string imprimible`
///
/// Debe ser determinista y total: el dispatcher no tiene camino de error
/// para un digest fallido.
pub trait Digester: Send + Sync + 'static {
    fn digest(&self, value: &[u8]) -> String;
}

/// SHA-512 + base64 estándar
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Base64;

impl Digester for Sha512Base64 {
    fn digest(&self, value: &[u8]) -> String {
        let hash = Sha512::digest(value);
        STANDARD.encode(hash)
    }
}

impl<F> Digester for F
where
    F: Fn(&[u8]) -> String + Send + Sync + 'static,
{
    fn digest(&self, value: &[u8]) -> String {
        self(value)
    }
}
