//! # Apagado Ordenado
//! src/shutdown.rs
//!
//! Máquina de estados `Accepting -> Draining`. Al pasar a `Draining` las
//! peticiones nuevas se rechazan con 503 y el hilo de apagado espera a que
//! el contador de peticiones en curso llegue a cero.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Inner {
    draining: AtomicBool,
    in_flight: Mutex<usize>,
    drained: Condvar,
}

/// Coordinador de apagado compartido por el servidor y el dispatcher
#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    inner: Arc<Inner>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` una vez recibida la señal de apagado
    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::SeqCst)
    }

    /// Pasa a `Draining`. Solo la primera llamada retorna `true`.
    pub fn begin_drain(&self) -> bool {
        !self.inner.draining.swap(true, Ordering::SeqCst)
    }

    /// Registra una unidad de trabajo en curso
    ///
    /// El contador baja cuando el guard se destruye, incluso si el hilo
    /// que lo posee termina con error o panic.
    pub fn track(&self) -> InFlightGuard {
        let mut count = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        InFlightGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Unidades de trabajo en curso
    pub fn in_flight(&self) -> usize {
        *self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bloquea hasta que no quede trabajo en curso
    pub fn wait_drained(&self) {
        let count = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let _count = self
            .inner
            .drained
            .wait_while(count, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Igual que `wait_drained` pero con límite de tiempo
    ///
    /// Retorna `true` si el contador llegó a cero antes del timeout.
    pub fn wait_drained_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .inner
                .drained
                .wait_timeout(count, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            count = guard;
        }
        true
    }

    /// Protocolo completo: rechazar nuevas peticiones y esperar a las admitidas
    pub fn drain(&self) {
        if self.begin_drain() {
            tracing::info!(in_flight = self.in_flight(), "draining in-flight work");
        }
        self.wait_drained();
    }
}

/// Guard RAII de una unidad de trabajo en curso
#[derive(Debug)]
pub struct InFlightGuard {
    inner: Arc<Inner>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut count = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.inner.drained.notify_all();
        }
    }
}
