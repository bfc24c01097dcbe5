//! # Handler de Estadísticas
//! src/metrics/handlers.rs
//!
//! `GET /stats` → `{"total": N, "average": F}`

use crate::context::AppContext;
use crate::http::{Method, Request, Response, StatusCode};

/// Handler para `/stats`
pub fn stats_handler(req: &Request, ctx: &AppContext) -> Response {
    if req.method() != Method::GET {
        return Response::method_not_allowed(&["GET"], "Only GET requests are supported.");
    }

    match serde_json::to_string(&ctx.stats.snapshot()) {
        Ok(body) => Response::json(&body),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize stats");
            Response::error(StatusCode::InternalServerError, "Unable to generate stats.")
        }
    }
}
