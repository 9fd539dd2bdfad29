use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use strikemetric_core::{
    AveragingPolicy, ApiConfig, ComboTag, Dashboard, FetchError, HttpPunchClient, PunchRecord,
    PunchSource, PunchType,
};

/// Enkel engangs-server: svarer på én forespørsel og returnerer request-teksten.
fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream);
        let mut request = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = v.trim().parse().unwrap_or(0);
            }
            let end = line == "\r\n";
            request.push_str(&line);
            if end {
                break;
            }
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).ok();
        request.push_str(&String::from_utf8_lossy(&body));

        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).ok();
        stream.flush().ok();
        request
    });

    (format!("http://{addr}/api/v1"), handle)
}

fn client(base_url: String) -> HttpPunchClient {
    client_with_timeout(base_url, Some(Duration::from_secs(5)))
}

fn client_with_timeout(base_url: String, timeout: Option<Duration>) -> HttpPunchClient {
    HttpPunchClient::new(ApiConfig { base_url, timeout, averaging: AveragingPolicy::ZeroFill })
}

/// Leser forespørselshodet, så kjører `then` på strømmen i stedet for å svare.
fn accept_then<F>(then: F) -> (String, JoinHandle<()>)
where
    F: FnOnce(std::net::TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream);
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                break;
            }
        }
        then(reader.into_inner());
    });
    (format!("http://{addr}/api/v1"), handle)
}

#[test]
fn http_401_gives_login_message() {
    let (url, server) = serve_once("401 Unauthorized", r#"{"detail":"Not authenticated"}"#);
    let mut dashboard = Dashboard::new(client(url), AveragingPolicy::ZeroFill);
    let state = dashboard.load();
    assert_eq!(
        state.error.as_deref(),
        Some("Please log in to view punch analysis data")
    );
    assert!(!state.is_loading);
    let request = server.join().unwrap();
    assert!(request.starts_with("GET /api/v1/punch-analysis "), "{request}");
}

#[test]
fn http_status_mapping() {
    for (status, expected) in [
        ("404 Not Found", FetchError::NotFound),
        ("403 Forbidden", FetchError::Forbidden),
        ("500 Internal Server Error", FetchError::Failed(500)),
    ] {
        let (url, server) = serve_once(status, "{}");
        let err = client(url).fetch_punches().unwrap_err();
        assert_eq!(err, expected);
        server.join().unwrap();
    }
}

#[test]
fn closed_port_is_unreachable() {
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let err = client(format!("http://127.0.0.1:{port}/api/v1")).fetch_punches().unwrap_err();
    assert_eq!(err, FetchError::Unreachable);
    assert_eq!(
        err.to_string(),
        "Unable to connect to the server. Please check if the backend is running."
    );
}

#[test]
fn ok_response_feeds_dashboard() {
    let body = r#"[
        {"id": 1, "user_id": 3, "punch_type": "jab", "speed": 10, "force": 20, "accuracy": 90, "timestamp": "2024-06-01T09:00:00"},
        {"id": 2, "user_id": 3, "punch_type": "cross", "timestamp": "2024-06-01T09:00:02"},
        {"id": 3, "user_id": 3, "speed": 4, "timestamp": "2024-06-01T09:00:04"}
    ]"#;
    let (url, server) = serve_once("200 OK", body);
    let mut dashboard = Dashboard::new(client(url), AveragingPolicy::ZeroFill);
    let state = dashboard.load();
    assert!(state.error.is_none());
    assert_eq!(state.records.len(), 2);
    assert_eq!(state.rejected, 1);
    assert_eq!(state.stats.total_punches, 2);
    assert!((state.stats.average_speed - 5.0).abs() < 1e-12);
    assert!((state.stats.average_accuracy - 45.0).abs() < 1e-12);
    server.join().unwrap();
}

#[test]
fn submit_batch_posts_camel_case_records() {
    let (url, server) = serve_once("201 Created", "[]");
    let records: Vec<PunchRecord> = [PunchType::Jab, PunchType::Cross]
        .iter()
        .enumerate()
        .map(|(i, t)| PunchRecord {
            athlete_id: 1,
            session_id: 2,
            punch_type: *t,
            speed: 0.0,
            force: 0.0,
            accuracy: 0.0,
            notes: None,
            combo: Some(ComboTag { combo_id: "combo-1".into(), sequence: i as u32 + 1 }),
        })
        .collect();

    client(url).submit_batch(&records).unwrap();
    let request = server.join().unwrap();
    assert!(request.starts_with("POST /api/v1/punch-analysis/batch "), "{request}");
    assert!(request.contains(r#""punchType":"cross""#));
    assert!(request.contains(r#""comboId":"combo-1""#));
}

#[test]
fn submit_failure_maps_status() {
    let (url, server) = serve_once("403 Forbidden", "{}");
    let record = PunchRecord {
        athlete_id: 1,
        session_id: 2,
        punch_type: PunchType::Hook,
        speed: 7.0,
        force: 300.0,
        accuracy: 60.0,
        notes: Some("late".into()),
        combo: None,
    };
    assert_eq!(client(url).submit_punch(&record), Err(FetchError::Forbidden));
    server.join().unwrap();
}

#[test]
fn dropped_connection_is_unreachable() {
    let (url, server) = accept_then(drop);
    let mut dashboard = Dashboard::new(client(url), AveragingPolicy::ZeroFill);
    let state = dashboard.load();
    assert_eq!(
        state.error.as_deref(),
        Some("Unable to connect to the server. Please check if the backend is running.")
    );
    server.join().unwrap();
}

#[test]
fn stalled_server_times_out_as_unreachable() {
    let (url, server) = accept_then(|stream| {
        thread::sleep(Duration::from_millis(800));
        drop(stream);
    });
    let err = client_with_timeout(url, Some(Duration::from_millis(200)))
        .fetch_punches()
        .unwrap_err();
    assert_eq!(err, FetchError::Unreachable);
    server.join().unwrap();
}

#[test]
fn body_over_ten_megabytes_is_loaded() {
    let record = r#"{"id":1,"user_id":3,"punch_type":"hook","speed":8.25,"force":512.5,"accuracy":77.5,"notes":"steady pressure on the lead side","timestamp":"2024-06-01T09:00:00Z"}"#;
    let n = 11 * 1024 * 1024 / record.len() + 1;
    let mut body = String::with_capacity(n * (record.len() + 1) + 2);
    body.push('[');
    for i in 0..n {
        if i > 0 {
            body.push(',');
        }
        body.push_str(record);
    }
    body.push(']');
    assert!(body.len() > 10 * 1024 * 1024);

    let (url, server) = serve_once("200 OK", &body);
    let out = client_with_timeout(url, None).fetch_punches().unwrap();
    assert_eq!(out.records.len(), n);
    assert!(out.rejected.is_empty());
    server.join().unwrap();
}
