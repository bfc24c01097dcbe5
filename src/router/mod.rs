//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea paths HTTP a handlers.
//!
//! ```text
//! Request → Router → Handler(&Request, &Context) → Response
//! ```
//!
//! Una ruta registrada como `/hash` atiende `/hash` y cualquier path bajo
//! `/hash/`. Si ninguna ruta coincide se retorna 404 Not Found.

use crate::http::{Request, Response, StatusCode};

/// Tipo de función handler
///
/// Recibe el request y el contexto compartido de la aplicación
pub type Handler<C> = fn(&Request, &C) -> Response;

/// Router que mapea prefijos de path a handlers
pub struct Router<C> {
    routes: Vec<(String, Handler<C>)>,
}

impl<C> Router<C> {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use hash_server::router::Router;
    /// use hash_server::http::{Request, Response, StatusCode};
    ///
    /// fn hello_handler(_req: &Request, _ctx: &()) -> Response {
    ///     Response::text(StatusCode::Ok, "hello")
    /// }
    ///
    /// let mut router: Router<()> = Router::new();
    /// router.register("/hello", hello_handler);
    ///
    /// let request = Request::parse(b"GET /hello/world HTTP/1.0\r\n\r\n").unwrap();
    /// assert_eq!(router.route(&request, &()).status(), StatusCode::Ok);
    /// ```
    pub fn register(&mut self, path: &str, handler: Handler<C>) {
        self.routes.push((path.trim_end_matches('/').to_string(), handler));
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, request: &Request, ctx: &C) -> Response {
        let path = request.path();

        let mut response = match self.find(path) {
            Some(handler) => handler(request, ctx),
            None => Response::error(StatusCode::NotFound, "404 page not found"),
        };

        Self::add_common_headers(&mut response);
        response
    }

    fn find(&self, path: &str) -> Option<Handler<C>> {
        self.routes
            .iter()
            .find(|(route, _)| {
                path == route
                    || path
                        .strip_prefix(route.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .map(|(_, handler)| *handler)
    }

    /// Headers comunes a todas las respuestas, pasen o no por un handler
    pub fn add_common_headers(response: &mut Response) {
        response.add_header("Server", "hash_server/0.1");
        response.add_header("Connection", "close");
    }
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}
