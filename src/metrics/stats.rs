//! # Estadísticas de Hashing
//! src/metrics/stats.rs
//!
//! Contador de digests completados y latencia media (ms) de las
//! peticiones de hashing.

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// Copia inmutable de las estadísticas en un instante
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Digests completados
    pub total: u64,

    /// Latencia media en milisegundos
    pub average: f64,
}

impl StatsSnapshot {
    /// Siguiente snapshot tras observar `latency_ms`
    ///
    /// Usa `(avg * (n - 1) + l) / n`, que es la fórmula con la que se
    /// generaron los fixtures existentes.
    pub fn next(&self, latency_ms: f64) -> Self {
        let total = self.total + 1;
        let n = total as f64;
        let average = (self.average * (n - 1.0) + latency_ms) / n;
        Self { total, average }
    }
}

/// Agregador thread-safe
///
/// Leer, calcular y publicar ocurre bajo el mismo lock: dos `record`
/// concurrentes nunca pierden una actualización y `snapshot` nunca mezcla
/// un `total` nuevo con un `average` viejo.
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    current: Arc<Mutex<StatsSnapshot>>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una latencia y devuelve el snapshot publicado
    pub fn record(&self, latency_ms: f64) -> StatsSnapshot {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = current.next(latency_ms);
        *current
    }

    /// Snapshot consistente del estado actual
    pub fn snapshot(&self) -> StatsSnapshot {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
