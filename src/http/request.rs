//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser HTTP/1.0 (acepta también la request line de HTTP/1.1).
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /hash HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Type: application/x-www-form-urlencoded\r\n
//! Content-Length: 20\r\n
//! \r\n
//! password=angryMonkey
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path?query HTTP/1.x`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: bytes restantes (formularios en POST)

use percent_encoding::{percent_decode, percent_decode_str};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separador entre headers y body
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Content-Type de los formularios que acepta `form_value`
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Métodos HTTP reconocidos por el parser
///
/// El parser reconoce todos los métodos estándar para que los handlers
/// puedan responder 405 en vez de 400 a los que no soportan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    CONNECT,
    TRACE,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
            Method::CONNECT => "CONNECT",
            Method::TRACE => "TRACE",
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    /// Los métodos distinguen mayúsculas: `get` no es válido
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        const ALL: [Method; 9] = [
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
            Method::CONNECT,
            Method::TRACE,
        ];

        ALL.into_iter()
            .find(|method| method.as_str() == token)
            .ok_or_else(|| ParseError::UnsupportedMethod(token.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path ya decodificado (ej: "/hash/42")
    path: String,

    /// Query string cruda, sin el `?`
    query: String,

    /// Headers HTTP tal como llegaron
    headers: HashMap<String, String>,

    /// Body crudo del request
    body: Vec<u8>,
}

/// Motivo por el que un request no pudo interpretarse
///
/// Todos terminan en un 400 para el cliente.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("request line is missing")]
    IncompleteRequest,

    /// La request line no tiene la forma `METHOD TARGET VERSION`
    #[error("malformed request line")]
    InvalidRequestLine,

    #[error("unknown method {0:?}")]
    UnsupportedMethod(String),

    #[error("unsupported protocol version {0:?}")]
    InvalidHttpVersion(String),

    /// Línea de header sin `:`
    #[error("malformed header line {0:?}")]
    InvalidHeader(String),

    /// Buffer vacío o solo con espacios
    #[error("no request received")]
    EmptyRequest,
}

/// Busca el fin de los headers en un buffer
///
/// Retorna el índice del primer byte del body si el buffer ya contiene
/// la línea vacía que cierra los headers.
pub fn header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
        .map(|pos| pos + HEADER_TERMINATOR.len())
}

/// `Content-Length` declarado en la sección de headers
///
/// Se usa antes de parsear el request para saber cuántos bytes de body
/// leer del socket. Retorna 0 si el header falta o no es un número.
pub fn declared_content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("Content-Length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Busca `name` en pares `clave=valor` x-www-form-urlencoded
///
/// El valor se decodifica a bytes sin exigir UTF-8: `%FF` produce el byte
/// 0xFF. Si la clave aparece varias veces gana la primera.
fn urlencoded_value(input: &[u8], name: &str) -> Option<Vec<u8>> {
    input
        .split(|&b| b == b'&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.iter().position(|&b| b == b'=') {
            Some(eq) => (&pair[..eq], &pair[eq + 1..]),
            None => (pair, &[][..]),
        })
        .find(|(key, _)| decode_form_component(key) == name.as_bytes())
        .map(|(_, value)| decode_form_component(value))
}

/// `+` es espacio; luego se resuelven los `%XX`
fn decode_form_component(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&spaced).collect()
}

impl Request {
    /// Parsea un request HTTP desde bytes
    ///
    /// # Argumentos
    ///
    /// * `buffer` - Buffer conteniendo el request completo (headers + body)
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use hash_server::http::Request;
    ///
    /// let raw = b"GET /hash/10 HTTP/1.0\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/hash/10");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        // Sin línea vacía tratamos todo el buffer como headers
        let (head, body) = match header_end(buffer) {
            Some(end) => (&buffer[..end - HEADER_TERMINATOR.len()], &buffer[end..]),
            None => (buffer, &[][..]),
        };

        let head_str = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;

        let mut lines = head_str.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::IncompleteRequest)?;

        // 1. Request line
        let (method, path, query) = Self::parse_request_line(request_line)?;

        // 2. Headers
        let headers = Self::parse_headers(lines)?;

        Ok(Request {
            method,
            path,
            query,
            headers,
            body: body.to_vec(),
        })
    }

    /// Parsea la request line
    ///
    /// Formato: `GET /path?query HTTP/1.0`. Solo se valida la versión; no
    /// se guarda porque todas las respuestas son HTTP/1.0.
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let &[method, target, version] = parts.as_slice() else {
            return Err(ParseError::InvalidRequestLine);
        };

        let method: Method = method.parse()?;

        if !matches!(version, "HTTP/1.0" | "HTTP/1.1") {
            return Err(ParseError::InvalidHttpVersion(version.to_string()));
        }

        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let path = percent_decode_str(path).decode_utf8_lossy().into_owned();

        Ok((method, path, query.to_string()))
    }

    /// Parsea los headers HTTP
    ///
    /// Cada header tiene formato: "Name: Value"
    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.insert(name.trim().to_string(), value.trim().to_string());
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Path sin query string
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene un header específico (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body crudo (vacío si no hubo)
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Obtiene un campo de formulario como bytes decodificados
    ///
    /// En POST, PUT y PATCH se busca primero en el body cuando el
    /// Content-Type es `application/x-www-form-urlencoded`; si no aparece
    /// se busca en la query string.
    ///
    /// # Ejemplo
    /// ```
    /// use hash_server::http::Request;
    ///
    /// let raw = b"POST /hash HTTP/1.0\r\n\
    ///     Content-Type: application/x-www-form-urlencoded\r\n\r\n\
    ///     password=angry%20Monkey";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.form_value("password").as_deref(), Some(&b"angry Monkey"[..]));
    /// ```
    pub fn form_value(&self, name: &str) -> Option<Vec<u8>> {
        let body_value = if self.has_form_body() {
            urlencoded_value(&self.body, name)
        } else {
            None
        };

        body_value.or_else(|| urlencoded_value(self.query.as_bytes(), name))
    }

    fn has_form_body(&self) -> bool {
        let body_method = matches!(self.method, Method::POST | Method::PUT | Method::PATCH);
        let form_type = self
            .header("Content-Type")
            .map(|ct| {
                ct.split(';')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .eq_ignore_ascii_case(FORM_CONTENT_TYPE)
            })
            .unwrap_or(false);

        body_method && form_type
    }
}
