//! # Sistema de Jobs
//!
//! Hashing asíncrono: el cliente recibe un id al instante y consulta el
//! resultado más tarde.
//!
//! ## Endpoints
//!
//! - `POST /hash` (form `password=VALOR`) - Encolar job, retorna el id
//! - `GET /hash/{id}` - Obtener el digest (404 mientras esté pendiente)

pub mod digest;
pub mod dispatcher;
pub mod handlers;
pub mod store;

pub use digest::{Digester, Sha512Base64};
pub use dispatcher::{JobDispatcher, SubmitError};
pub use store::{JobId, JobStore, StoreError};
