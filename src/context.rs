//! # Contexto de la Aplicación
//! src/context.rs
//!
//! Objeto de servicio que se construye una vez al arrancar y se pasa por
//! referencia a cada handler. Agrupa todo el estado compartido: no hay
//! singletons globales.

use crate::config::Config;
use crate::jobs::{Digester, JobDispatcher, JobStore, Sha512Base64};
use crate::metrics::StatsAggregator;
use crate::shutdown::ShutdownCoordinator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub store: JobStore,
    pub stats: StatsAggregator,
    pub dispatcher: JobDispatcher,
    pub shutdown: ShutdownCoordinator,
}

impl AppContext {
    /// Contexto con el digest por defecto (SHA-512 + base64)
    pub fn new(config: &Config) -> Self {
        Self::with_digester(config, Arc::new(Sha512Base64))
    }

    /// Contexto con una función de digest arbitraria
    pub fn with_digester(config: &Config, digester: Arc<dyn Digester>) -> Self {
        let store = JobStore::new();
        let stats = StatsAggregator::new();
        let shutdown = ShutdownCoordinator::new();

        let mut dispatcher =
            JobDispatcher::new(store.clone(), stats.clone(), digester, config.hash_delay());
        if config.drain_pending_jobs {
            dispatcher = dispatcher.with_drain_tracking(shutdown.clone());
        }

        Self {
            store,
            stats,
            dispatcher,
            shutdown,
        }
    }
}
