//! Tests de integración para el servidor de hashing
//! tests/integration_test.rs
//!
//! Cada test levanta su propio servidor en un puerto efímero con un
//! retardo de hashing corto y habla HTTP/1.0 crudo sobre `TcpStream`.

use hash_server::config::Config;
use hash_server::context::AppContext;
use hash_server::server::Server;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

const ANGRY_MONKEY_DIGEST: &str =
    "ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A+gf7Q==";

struct TestServer {
    addr: SocketAddr,
    context: AppContext,
}

fn start_server(hash_delay_ms: u64, drain_pending_jobs: bool) -> TestServer {
    let mut config = Config::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.hash_delay_ms = hash_delay_ms;
    config.io_timeout_secs = 5;
    config.drain_pending_jobs = drain_pending_jobs;

    let server = Server::bind(config).expect("bind test server");
    let addr = server.local_addr().expect("local addr");
    let context = server.context().clone();

    thread::spawn(move || server.run());

    TestServer { addr, context }
}

/// Helper: envía un request crudo y retorna (status, body)
fn send_raw(addr: SocketAddr, raw: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(raw.as_bytes()).unwrap();
    stream.flush().unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    parse_response(&response)
}

fn parse_response(response: &str) -> (u16, String) {
    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    (status, body)
}

fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    send_raw(addr, &format!("GET {} HTTP/1.0\r\n\r\n", path))
}

fn post_form(addr: SocketAddr, body: &str) -> (u16, String) {
    send_raw(
        addr,
        &format!(
            "POST /hash HTTP/1.0\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        ),
    )
}

fn wait_for_digest(addr: SocketAddr, id: &str) -> String {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let (status, body) = get(addr, &format!("/hash/{}", id));
        if status == 200 {
            return body;
        }
        assert_eq!(status, 404, "unexpected status while pending: {}", body);
        assert!(Instant::now() < deadline, "job {} never completed", id);
        thread::sleep(Duration::from_millis(25));
    }
}

#[test]
fn test_hash_round_trip() {
    let server = start_server(200, false);

    let (status, id) = post_form(server.addr, "password=angryMonkey");
    assert_eq!(status, 200);
    assert_eq!(id, "1");

    // Antes del retardo el job no es visible
    let (status, _) = get(server.addr, "/hash/1");
    assert_eq!(status, 404);

    assert_eq!(wait_for_digest(server.addr, &id), ANGRY_MONKEY_DIGEST);
}

#[test]
fn test_sequential_ids() {
    let server = start_server(10, false);

    for expected in 1..=10 {
        let (status, id) = post_form(server.addr, &format!("password=value{}", expected));
        assert_eq!(status, 200);
        assert_eq!(id, expected.to_string());
    }
}

#[test]
fn test_concurrent_submissions_get_distinct_ids() {
    let server = start_server(10, false);
    let addr = server.addr;

    let handles: Vec<_> = (0..20)
        .map(|i| thread::spawn(move || post_form(addr, &format!("password=c{}", i)).1))
        .collect();

    let mut ids: Vec<i64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().parse().unwrap())
        .collect();
    ids.sort_unstable();

    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
}

#[test]
fn test_form_value_is_url_decoded() {
    let server = start_server(10, false);

    let (_, id) = post_form(server.addr, "password=two+words");

    assert_eq!(
        wait_for_digest(server.addr, &id),
        "rbeOtyY+z9LrVIi2SX/tw4jmeucGQ80oUx1v0gz+8FpP0Jw21auG5p4yJL721e+vj3/dcQIDt0C9+H3fKu8SVA=="
    );
}

#[test]
fn test_non_utf8_value_is_hashed_as_sent() {
    let server = start_server(10, false);

    let (status, id) = post_form(server.addr, "password=%FF%FE");
    assert_eq!(status, 200);

    assert_eq!(
        wait_for_digest(server.addr, &id),
        "mMX1bz3jQGkME55Y632sERl58NTf/pxLJP+ElRD0tv+p/WCMCj3prDyf0hkPDvr3FTCQYUkPl1Wpv98cVMoNhA=="
    );
}

#[test]
fn test_percent_encoded_job_id() {
    let server = start_server(10, false);

    let (_, id) = post_form(server.addr, "password=angryMonkey");
    assert_eq!(id, "1");
    wait_for_digest(server.addr, &id);

    let (status, body) = get(server.addr, "/hash/%31");
    assert_eq!(status, 200);
    assert_eq!(body, ANGRY_MONKEY_DIGEST);
}

#[test]
fn test_bad_requests() {
    let server = start_server(10, false);

    let (status, body) = post_form(server.addr, "password=");
    assert_eq!(status, 400);
    assert_eq!(body, "A value must be submitted.");

    let (status, body) = get(server.addr, "/hash/abc");
    assert_eq!(status, 400);
    assert_eq!(body, "Unable to process the supplied job id.");

    let (status, body) = get(server.addr, "/hash/");
    assert_eq!(status, 400);
    assert_eq!(body, "No job id specified.");

    let (status, _) = get(server.addr, "/hash/999999");
    assert_eq!(status, 404);

    let (status, _) = get(server.addr, "/nowhere");
    assert_eq!(status, 404);

    // Ningún rechazo consumió un id
    assert_eq!(server.context.dispatcher.last_id(), 0);
}

#[test]
fn test_methods_not_allowed() {
    let server = start_server(10, false);

    let (status, _) = send_raw(server.addr, "DELETE /hash/1 HTTP/1.0\r\n\r\n");
    assert_eq!(status, 405);

    let (status, body) = send_raw(server.addr, "POST /stats HTTP/1.0\r\n\r\n");
    assert_eq!(status, 405);
    assert_eq!(body, "Only GET requests are supported.");
}

#[test]
fn test_stats_after_jobs() {
    let server = start_server(50, false);

    let (status, body) = get(server.addr, "/stats");
    assert_eq!(status, 200);
    let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["average"], 0.0);

    let ids: Vec<String> = (0..3)
        .map(|i| post_form(server.addr, &format!("password=s{}", i)).1)
        .collect();
    for id in &ids {
        wait_for_digest(server.addr, id);
    }

    // El digest se guarda justo antes de registrar la estadística
    let deadline = Instant::now() + Duration::from_secs(5);
    let stats = loop {
        let (_, body) = get(server.addr, "/stats/");
        let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
        if stats["total"] == 3 || Instant::now() > deadline {
            break stats;
        }
        thread::sleep(Duration::from_millis(10));
    };

    assert_eq!(stats["total"], 3);
    let average = stats["average"].as_f64().unwrap();
    assert!(average >= 0.0);
    assert!(average < 50.0, "latency must not include the hash delay: {}", average);
}

#[test]
fn test_draining_rejects_new_requests() {
    let server = start_server(10, false);

    assert_eq!(post_form(server.addr, "password=before").0, 200);

    assert!(server.context.shutdown.begin_drain());

    let (status, body) = post_form(server.addr, "password=after");
    assert_eq!(status, 503);
    assert_eq!(body, "Server is stopping.");
    assert_eq!(get(server.addr, "/stats").0, 503);
    assert_eq!(get(server.addr, "/unknown").0, 503);

    assert_eq!(server.context.dispatcher.last_id(), 1);
}

#[test]
fn test_drain_waits_for_open_connections() {
    let server = start_server(10, false);

    // Conexión aceptada que todavía no envió su request
    let mut stream = TcpStream::connect(server.addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while server.context.shutdown.in_flight() == 0 {
        assert!(Instant::now() < deadline, "connection was never accepted");
        thread::sleep(Duration::from_millis(5));
    }

    server.context.shutdown.begin_drain();
    assert!(!server.context.shutdown.wait_drained_timeout(Duration::from_millis(100)));

    // La conexión se aceptó antes del cambio, pero su request llega después
    stream.write_all(b"GET /stats HTTP/1.0\r\n\r\n").unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();

    let (status, body) = parse_response(&response);
    assert_eq!(status, 503);
    assert_eq!(body, "Server is stopping.");
    assert!(server.context.shutdown.wait_drained_timeout(Duration::from_secs(5)));
}

#[test]
fn test_drain_can_wait_for_pending_jobs() {
    let server = start_server(300, true);

    let (_, id) = post_form(server.addr, "password=angryMonkey");
    let id: i64 = id.parse().unwrap();

    server.context.shutdown.begin_drain();

    assert!(server.context.shutdown.wait_drained_timeout(Duration::from_secs(5)));
    assert_eq!(server.context.store.get(id).as_deref(), Some(ANGRY_MONKEY_DIGEST));
    assert_eq!(server.context.dispatcher.pending(), 0);
}
