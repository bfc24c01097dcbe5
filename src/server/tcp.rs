//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor que maneja múltiples conexiones simultáneas usando threads.
//! Cada conexión se procesa en su propio thread y cuenta como trabajo en
//! curso para el apagado ordenado desde que se acepta hasta que se cierra.

use crate::config::Config;
use crate::context::AppContext;
use crate::error::{Result, ServerError};
use crate::http::request::{declared_content_length, header_end};
use crate::http::{Request, Response, StatusCode};
use crate::jobs::handlers::hash_handler;
use crate::metrics::handlers::stats_handler;
use crate::router::Router;
use crate::shutdown::InFlightGuard;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Tamaño máximo de la sección de headers
const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Tamaño máximo del body (los valores a hashear son pequeños)
const MAX_BODY_BYTES: usize = 1024 * 1024;

const READ_CHUNK: usize = 8192;

/// Router con los endpoints del servicio
pub fn build_router() -> Router<AppContext> {
    let mut router = Router::new();
    router.register("/hash", hash_handler);
    router.register("/stats", stats_handler);
    router
}

/// Servidor HTTP concurrente
pub struct Server {
    config: Config,
    listener: TcpListener,
    router: Arc<Router<AppContext>>,
    context: AppContext,
}

impl Server {
    /// Abre el listener con un contexto nuevo
    ///
    /// # Errores
    ///
    /// `ServerError::Bind` si no se puede escuchar en la dirección
    pub fn bind(config: Config) -> Result<Self> {
        let context = AppContext::new(&config);
        Self::bind_with(config, context, build_router())
    }

    /// Abre el listener con un contexto y un router ya construidos
    pub fn bind_with(config: Config, context: AppContext, router: Router<AppContext>) -> Result<Self> {
        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        Ok(Self {
            config,
            listener,
            router: Arc::new(router),
            context,
        })
    }

    /// Dirección real de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Loop de aceptación: un thread por conexión
    ///
    /// Bloquea indefinidamente; el proceso termina cuando el hilo principal
    /// completa el drenado.
    pub fn run(self) -> Result<()> {
        tracing::info!(address = %self.local_addr()?, "server listening");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.spawn_connection(stream),
                Err(e) => tracing::warn!(error = %e, "failed to accept connection"),
            }
        }

        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream) {
        // El guard se toma antes de lanzar el thread: una conexión aceptada
        // cuenta para el drenado aunque todavía no haya leído nada
        let guard = self.context.shutdown.track();
        let router = Arc::clone(&self.router);
        let context = self.context.clone();
        let io_timeout = self.config.io_timeout();

        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        tracing::debug!(peer = %peer, "connection accepted");

        let spawned = thread::Builder::new()
            .name("http-conn".to_string())
            .spawn(move || {
                if let Err(e) = handle_connection(stream, &router, &context, io_timeout, guard) {
                    tracing::warn!(peer = %peer, error = %e, "connection error");
                }
            });

        if let Err(e) = spawned {
            tracing::error!(error = %e, "failed to spawn connection thread");
        }
    }
}

/// Atiende una conexión: lee un request, responde y cierra
///
/// El `InFlightGuard` se libera al salir, incluido el camino de error.
pub fn handle_connection(
    mut stream: TcpStream,
    router: &Router<AppContext>,
    context: &AppContext,
    io_timeout: Duration,
    _guard: InFlightGuard,
) -> io::Result<()> {
    let start = Instant::now();
    stream.set_read_timeout(Some(io_timeout))?;
    stream.set_write_timeout(Some(io_timeout))?;

    let raw = match read_request(&mut stream) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!("connection closed before sending a request");
            return Ok(());
        }
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            tracing::debug!(error = %e, "rejecting oversized request");
            stream.write_all(&oversized_response(context).to_bytes())?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let (response, target) = process_request(router, context, &raw);

    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    tracing::info!(
        request = %target,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "request handled"
    );

    Ok(())
}

/// Convierte bytes crudos en una respuesta
///
/// Primero se consulta el estado de apagado: si el servidor está
/// drenando, todo request recibe 503 sin hacer ningún otro trabajo.
/// Retorna también `"METHOD /path"` para los logs.
pub fn process_request(
    router: &Router<AppContext>,
    context: &AppContext,
    raw: &[u8],
) -> (Response, String) {
    if context.shutdown.is_draining() {
        return (stopping_response(), "-".to_string());
    }

    match Request::parse(raw) {
        Ok(request) => {
            let target = format!("{} {}", request.method().as_str(), request.path());
            (router.route(&request, context), target)
        }
        Err(e) => {
            tracing::debug!(error = %e, "malformed request");
            let mut response = Response::error(StatusCode::BadRequest, &format!("Invalid request: {}", e));
            Router::<AppContext>::add_common_headers(&mut response);
            (response, "-".to_string())
        }
    }
}

/// Respuesta a un request que excede los límites de lectura
///
/// Durante el drenado se responde 503 como a cualquier otro request.
fn oversized_response(context: &AppContext) -> Response {
    if context.shutdown.is_draining() {
        return stopping_response();
    }

    let mut response = Response::error(StatusCode::BadRequest, "Request too large.");
    Router::<AppContext>::add_common_headers(&mut response);
    response
}

fn stopping_response() -> Response {
    let mut response = Response::error(StatusCode::ServiceUnavailable, "Server is stopping.");
    Router::<AppContext>::add_common_headers(&mut response);
    response
}

/// Lee un request completo: headers hasta `\r\n\r\n` y luego el body
/// indicado por `Content-Length`
///
/// Retorna `Ok(None)` si el peer cerró sin enviar datos y un error
/// `InvalidData` si el request excede los límites.
fn read_request(stream: &mut impl Read) -> io::Result<Option<Vec<u8>>> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    let body_start = loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            // Request truncado: se lo pasamos al parser tal cual
            return Ok(Some(buffer));
        }
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(end) = header_end(&buffer) {
            break end;
        }
        if buffer.len() > MAX_HEADER_BYTES {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "headers too large"));
        }
    };

    let content_length = declared_content_length(&buffer[..body_start]);
    if content_length > MAX_BODY_BYTES {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "body too large"));
    }

    let wanted = body_start + content_length;
    while buffer.len() < wanted {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    buffer.truncate(wanted.min(buffer.len()));

    Ok(Some(buffer))
}
