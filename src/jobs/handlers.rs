//! # Handlers HTTP para Jobs
//! src/jobs/handlers.rs
//!
//! - `POST /hash` (form `password=VALOR`) → id del job
//! - `GET /hash/{id}` → digest, cuando ya está calculado

use crate::context::AppContext;
use crate::http::{Method, Request, Response, StatusCode};
use crate::jobs::dispatcher::SubmitError;
use crate::jobs::store::JobId;
use std::time::Instant;

/// Nombre del campo de formulario con el valor a hashear
pub const VALUE_FIELD: &str = "password";

const HASH_PREFIX: &str = "/hash";

/// Error al extraer el id de `/hash/{id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobIdError {
    Missing,
    Invalid(String),
}

/// Handler para `/hash` y `/hash/...`
///
/// Solo GET y POST; cualquier otro método recibe 405.
pub fn hash_handler(req: &Request, ctx: &AppContext) -> Response {
    match req.method() {
        Method::POST => submit_handler(req, ctx),
        Method::GET => result_handler(req, ctx),
        _ => Response::method_not_allowed(
            &["GET", "POST"],
            "Only POST and GET requests are supported.",
        ),
    }
}

/// Encola un valor y responde de inmediato con el id asignado
///
/// # Ejemplo de response
/// ```text
/// HTTP/1.0 200 OK
///
/// 1
/// ```
pub fn submit_handler(req: &Request, ctx: &AppContext) -> Response {
    let received_at = Instant::now();

    let value = match req.form_value(VALUE_FIELD) {
        Some(v) if !v.is_empty() => v,
        _ => return Response::error(StatusCode::BadRequest, "A value must be submitted."),
    };

    match ctx.dispatcher.submit(&value, received_at) {
        Ok(job_id) => {
            tracing::info!(job_id, "hash job submitted");
            Response::text(StatusCode::Ok, &job_id.to_string())
        }
        Err(SubmitError::EmptyValue) => {
            Response::error(StatusCode::BadRequest, "A value must be submitted.")
        }
        Err(e @ SubmitError::Spawn { .. }) => {
            tracing::error!(error = %e, "unable to schedule hash job");
            Response::error(StatusCode::InternalServerError, "Unable to schedule the hash job.")
        }
    }
}

/// Retorna el digest del job `/hash/{id}`
///
/// 404 tanto si el id nunca existió como si el job sigue pendiente.
pub fn result_handler(req: &Request, ctx: &AppContext) -> Response {
    let job_id = match parse_job_id(req.path()) {
        Ok(id) => id,
        Err(JobIdError::Missing) => {
            return Response::error(StatusCode::BadRequest, "No job id specified.");
        }
        Err(JobIdError::Invalid(raw)) => {
            tracing::debug!(raw = %raw, "unparseable job id");
            return Response::error(StatusCode::BadRequest, "Unable to process the supplied job id.");
        }
    };

    match ctx.store.get(job_id) {
        Some(digest) => Response::text(StatusCode::Ok, &digest),
        None => Response::error(StatusCode::NotFound, "Unable to find the specified job id."),
    }
}

/// Extrae el id del segmento que sigue a `/hash/`
///
/// Los segmentos adicionales (`/hash/12/extra`) se ignoran.
///
/// # Ejemplo
/// ```
/// use hash_server::jobs::handlers::{parse_job_id, JobIdError};
///
/// assert_eq!(parse_job_id("/hash/42"), Ok(42));
/// assert_eq!(parse_job_id("/hash/"), Err(JobIdError::Missing));
/// ```
pub fn parse_job_id(path: &str) -> Result<JobId, JobIdError> {
    let segment = path
        .strip_prefix(HASH_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(|rest| rest.split('/').next())
        .unwrap_or("");

    if segment.is_empty() {
        return Err(JobIdError::Missing);
    }

    segment
        .parse::<JobId>()
        .map_err(|_| JobIdError::Invalid(segment.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Duration;

    fn context(delay_ms: u64) -> AppContext {
        let mut config = Config::default();
        config.hash_delay_ms = delay_ms;
        AppContext::new(&config)
    }

    fn post_form(body: &str) -> Request {
        let raw = format!(
            "POST /hash HTTP/1.0\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        Request::parse(raw.as_bytes()).unwrap()
    }

    fn get(path: &str) -> Request {
        Request::parse(format!("GET {} HTTP/1.0\r\n\r\n", path).as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_job_id() {
        assert_eq!(parse_job_id("/hash/1"), Ok(1));
        assert_eq!(parse_job_id("/hash/12/extra"), Ok(12));
        assert_eq!(parse_job_id("/hash/-3"), Ok(-3));
        assert_eq!(parse_job_id("/hash"), Err(JobIdError::Missing));
        assert_eq!(parse_job_id("/hash//"), Err(JobIdError::Missing));
        assert_eq!(parse_job_id("/hash/abc"), Err(JobIdError::Invalid("abc".to_string())));
    }

    #[test]
    fn test_submit_returns_sequential_ids() {
        let ctx = context(1);

        for expected in 1..=10 {
            let response = hash_handler(&post_form(&format!("password=value{}", expected)), &ctx);
            assert_eq!(response.status(), StatusCode::Ok);
            assert_eq!(response.body_text(), expected.to_string());
        }
    }

    #[test]
    fn test_submit_missing_value() {
        let ctx = context(1);

        for body in ["", "password=", "other=1"] {
            let response = hash_handler(&post_form(body), &ctx);
            assert_eq!(response.status(), StatusCode::BadRequest);
            assert_eq!(response.body_text(), "A value must be submitted.");
        }
        assert_eq!(ctx.dispatcher.last_id(), 0);
    }

    #[test]
    fn test_get_without_id() {
        let ctx = context(1);

        for path in ["/hash", "/hash/"] {
            let response = hash_handler(&get(path), &ctx);
            assert_eq!(response.status(), StatusCode::BadRequest);
            assert_eq!(response.body_text(), "No job id specified.");
        }
    }

    #[test]
    fn test_get_non_numeric_id() {
        let response = hash_handler(&get("/hash/abc"), &context(1));

        assert_eq!(response.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_get_unknown_id() {
        let response = hash_handler(&get("/hash/999999"), &context(1));

        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_get_stored_digest() {
        let ctx = context(1);
        ctx.store.put(5, "stored-digest".to_string()).unwrap();

        let response = hash_handler(&get("/hash/5"), &ctx);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body_text(), "stored-digest");
    }

    #[test]
    fn test_pending_job_is_not_found_then_visible() {
        let ctx = context(300);
        let id = hash_handler(&post_form("password=angryMonkey"), &ctx).body_text();
        let path = format!("/hash/{}", id);

        assert_eq!(hash_handler(&get(&path), &ctx).status(), StatusCode::NotFound);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut response = hash_handler(&get(&path), &ctx);
        while response.status() != StatusCode::Ok && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
            response = hash_handler(&get(&path), &ctx);
        }

        assert_eq!(
            response.body_text(),
            "ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A+gf7Q=="
        );
        // Lecturas repetidas devuelven el mismo digest
        assert_eq!(hash_handler(&get(&path), &ctx).body_text(), response.body_text());
    }

    #[test]
    fn test_submitted_bytes_are_hashed_verbatim() {
        let ctx = context(1);
        let id = hash_handler(&post_form("password=%FF%FE"), &ctx).body_text();
        let path = format!("/hash/{}", id);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut response = hash_handler(&get(&path), &ctx);
        while response.status() != StatusCode::Ok && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            response = hash_handler(&get(&path), &ctx);
        }

        assert_eq!(
            response.body_text(),
            "mMX1bz3jQGkME55Y632sERl58NTf/pxLJP+ElRD0tv+p/WCMCj3prDyf0hkPDvr3FTCQYUkPl1Wpv98cVMoNhA=="
        );
    }

    #[test]
    fn test_percent_encoded_job_id() {
        let ctx = context(1);
        ctx.store.put(1, "first".to_string()).unwrap();

        let response = hash_handler(&get("/hash/%31"), &ctx);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body_text(), "first");
    }

    #[test]
    fn test_other_methods_not_allowed() {
        let ctx = context(1);

        for method in ["PUT", "DELETE", "HEAD", "PATCH"] {
            let raw = format!("{} /hash HTTP/1.0\r\n\r\n", method);
            let response = hash_handler(&Request::parse(raw.as_bytes()).unwrap(), &ctx);
            assert_eq!(response.status(), StatusCode::MethodNotAllowed, "method {}", method);
        }
    }
}
