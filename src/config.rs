//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de hashing con soporte para argumentos CLI
//! y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./hash_server --port 8080 --hash-delay-ms 5000 --io-timeout-secs 10
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 DRAIN_PENDING_JOBS=true ./hash_server
//! ```

use clap::Parser;
use std::time::Duration;

/// Configuración del servidor de hashing
#[derive(Debug, Clone, Parser)]
#[command(name = "hash_server")]
#[command(about = "Servidor HTTP de hashing asíncrono con estadísticas y apagado ordenado")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    // === Jobs ===

    /// Retardo artificial antes de calcular cada digest (milisegundos)
    #[arg(long = "hash-delay-ms", default_value = "5000", env = "HASH_DELAY_MS")]
    pub hash_delay_ms: u64,

    // === Conexiones ===

    /// Timeout de lectura y escritura por conexión (segundos)
    #[arg(long = "io-timeout-secs", default_value = "10", env = "IO_TIMEOUT_SECS")]
    pub io_timeout_secs: u64,

    // === Apagado ===

    /// Si está activo, el drenado también espera a los digests pendientes
    #[arg(long = "drain-pending-jobs", env = "DRAIN_PENDING_JOBS")]
    pub drain_pending_jobs: bool,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use hash_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Retardo artificial de cada job como `Duration`
    pub fn hash_delay(&self) -> Duration {
        Duration::from_millis(self.hash_delay_ms)
    }

    /// Timeout de I/O por conexión como `Duration`
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }

        // Un timeout de 0 deshabilita el timeout en std::net, lo que
        // podría bloquear el drenado para siempre
        if self.io_timeout_secs == 0 {
            return Err("IO timeout must be > 0".to_string());
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn print_summary(&self) {
        tracing::info!(
            address = %self.address(),
            hash_delay_ms = self.hash_delay_ms,
            io_timeout_secs = self.io_timeout_secs,
            drain_pending_jobs = self.drain_pending_jobs,
            "server configuration"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            hash_delay_ms: 5_000,
            io_timeout_secs: 10,
            drain_pending_jobs: false,
        }
    }
}
