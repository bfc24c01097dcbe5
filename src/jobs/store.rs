//! # Almacén de Resultados
//! src/jobs/store.rs
//!
//! Mapa concurrente `JobId -> digest`. Cada clave se escribe una sola vez;
//! la presencia de la clave es la señal de que el job terminó.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Identificador de job: único, creciente, empieza en 1
pub type JobId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Segundo intento de escribir el mismo id
    #[error("job {0} already has a result")]
    AlreadyPresent(JobId),
}

/// Almacén write-once de resultados
///
/// Muchos lectores concurrentes, escrituras ocasionales. El valor se
/// inserta completo bajo el lock de escritura, así que un lector nunca ve
/// un resultado a medias.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    results: Arc<RwLock<HashMap<JobId, String>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta el resultado de `id`
    ///
    /// # Errores
    ///
    /// `StoreError::AlreadyPresent` si el id ya tenía resultado; el valor
    /// existente no se modifica.
    pub fn put(&self, id: JobId, digest: String) -> Result<(), StoreError> {
        let mut results = self.results.write().unwrap_or_else(PoisonError::into_inner);
        match results.entry(id) {
            Entry::Occupied(_) => Err(StoreError::AlreadyPresent(id)),
            Entry::Vacant(slot) => {
                slot.insert(digest);
                Ok(())
            }
        }
    }

    /// Lee el resultado de `id`
    ///
    /// `None` tanto si el id no existe como si el job sigue pendiente.
    pub fn get(&self, id: JobId) -> Option<String> {
        let results = self.results.read().unwrap_or_else(PoisonError::into_inner);
        results.get(&id).cloned()
    }

    /// Número de resultados almacenados
    pub fn len(&self) -> usize {
        self.results.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
