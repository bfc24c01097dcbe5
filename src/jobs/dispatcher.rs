//! # Dispatcher de Jobs
//! src/jobs/dispatcher.rs
//!
//! Asigna ids con un contador atómico y lanza el trabajo diferido de cada
//! job en su propio thread:
//!
//! ```text
//! submit ──► id = counter + 1 ──► spawn ──► (caller recibe id)
//!                                   │
//!                                   └─► sleep(delay) ─► digest ─► store.put ─► stats.record
//! ```

use crate::jobs::digest::Digester;
use crate::jobs::store::{JobId, JobStore};
use crate::metrics::StatsAggregator;
use crate::shutdown::ShutdownCoordinator;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Valor vacío: no se asigna id
    #[error("a value must be submitted")]
    EmptyValue,

    /// El sistema operativo no pudo crear el thread del job
    #[error("failed to schedule job {id}: {source}")]
    Spawn {
        id: JobId,
        #[source]
        source: std::io::Error,
    },
}

/// Dispatcher de jobs de hashing
#[derive(Clone)]
pub struct JobDispatcher {
    /// Último id asignado (0 = ninguno todavía)
    last_id: Arc<AtomicI64>,

    /// Jobs programados que aún no guardaron su resultado
    pending: Arc<AtomicUsize>,

    store: JobStore,
    stats: StatsAggregator,
    digester: Arc<dyn Digester>,

    /// Retardo artificial antes de calcular el digest
    delay: Duration,

    /// Si está presente, cada job pendiente cuenta como trabajo en curso
    /// para el drenado
    drain_tracker: Option<ShutdownCoordinator>,
}

impl JobDispatcher {
    pub fn new(
        store: JobStore,
        stats: StatsAggregator,
        digester: Arc<dyn Digester>,
        delay: Duration,
    ) -> Self {
        Self {
            last_id: Arc::new(AtomicI64::new(0)),
            pending: Arc::new(AtomicUsize::new(0)),
            store,
            stats,
            digester,
            delay,
            drain_tracker: None,
        }
    }

    /// Hace que el drenado espere también a los jobs pendientes
    pub fn with_drain_tracking(mut self, shutdown: ShutdownCoordinator) -> Self {
        self.drain_tracker = Some(shutdown);
        self
    }

    /// Encola un valor y retorna su id sin esperar al digest
    ///
    /// `received_at` marca cuándo llegó la petición; la latencia que se
    /// registra en las estadísticas va desde ahí hasta justo antes de
    /// programar el trabajo diferido (no incluye el retardo artificial).
    ///
    /// # Errores
    ///
    /// - `SubmitError::EmptyValue` si `value` está vacío (el contador no avanza)
    /// - `SubmitError::Spawn` si no se pudo crear el thread
    pub fn submit(&self, value: &[u8], received_at: Instant) -> Result<JobId, SubmitError> {
        if value.is_empty() {
            return Err(SubmitError::EmptyValue);
        }

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let value = value.to_vec();
        let value_len = value.len();
        let guard = self.drain_tracker.as_ref().map(ShutdownCoordinator::track);

        let store = self.store.clone();
        let stats = self.stats.clone();
        let digester = Arc::clone(&self.digester);
        let pending = Arc::clone(&self.pending);
        let delay = self.delay;

        pending.fetch_add(1, Ordering::SeqCst);
        let latency_ms = received_at.elapsed().as_nanos() as f64 / 1e6;

        let spawned = thread::Builder::new()
            .name(format!("hash-job-{}", id))
            .spawn(move || {
                let _guard = guard;

                thread::sleep(delay);
                let digest = digester.digest(&value);

                if let Err(e) = store.put(id, digest) {
                    // Los ids son únicos: esto solo pasa si hay un bug
                    tracing::error!(job_id = id, error = %e, "discarding duplicate job result");
                } else {
                    let snapshot = stats.record(latency_ms);
                    tracing::info!(
                        job_id = id,
                        latency_ms,
                        total = snapshot.total,
                        average_ms = snapshot.average,
                        "job completed"
                    );
                }

                pending.fetch_sub(1, Ordering::SeqCst);
            });

        match spawned {
            Ok(_) => {
                tracing::debug!(job_id = id, value_len, "job scheduled");
                Ok(id)
            }
            Err(source) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                tracing::error!(job_id = id, error = %source, "failed to schedule job");
                Err(SubmitError::Spawn { id, source })
            }
        }
    }

    /// Último id asignado (0 si no se ha encolado nada)
    pub fn last_id(&self) -> JobId {
        self.last_id.load(Ordering::SeqCst)
    }

    /// Jobs programados cuyo resultado todavía no está en el store
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
