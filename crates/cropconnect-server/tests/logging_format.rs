// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cropconnect_core::SystemClock;
use cropconnect_lifecycle::{ContractLifecycleManager, LifecyclePolicy};
use cropconnect_server::{build_router, ApiConfig, AppState, SessionSigner};
use cropconnect_store::SqliteStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn json_lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().expect("lock output").clone();
        String::from_utf8(bytes)
            .expect("utf8 log output")
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("json log line"))
            .collect()
    }
}

#[test]
fn structured_logging_format_is_valid_json() {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(
            contract_id = "c-123",
            from = "PENDING",
            to = "ACCEPTED",
            "contract status changed"
        );
    });

    let lines = sink.json_lines();
    let parsed = lines.first().expect("log line");
    assert_eq!(parsed.get("level").and_then(|v| v.as_str()), Some("INFO"));
    let fields = parsed.get("fields").expect("fields object");
    assert_eq!(
        fields.get("contract_id").and_then(|v| v.as_str()),
        Some("c-123")
    );
    assert_eq!(
        fields.get("message").and_then(|v| v.as_str()),
        Some("contract status changed")
    );
}

#[tokio::test]
async fn request_spans_carry_the_request_id() {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = SqliteStore::open_in_memory().expect("in-memory store");
    let manager = ContractLifecycleManager::new(
        Arc::new(store),
        Arc::new(SystemClock),
        LifecyclePolicy::default(),
    );
    let state = AppState::new(
        manager,
        SessionSigner::new(b"log-secret", Duration::from_secs(60)),
        Arc::new(SystemClock),
        ApiConfig::default(),
    );
    state.ready.store(true, Ordering::Relaxed);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let req = format!(
        "GET /healthz HTTP/1.1\r\nHost: {addr}\r\nx-request-id: req-log-1\r\nConnection: close\r\n\r\n"
    );
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("read response");

    let lines = sink.json_lines();
    let finished = lines
        .iter()
        .find(|line| {
            line.pointer("/fields/message").and_then(|v| v.as_str()) == Some("request finished")
        })
        .expect("request finished event");
    assert_eq!(finished.pointer("/fields/status"), Some(&serde_json::json!(200)));
    assert_eq!(
        finished.pointer("/span/request_id").and_then(|v| v.as_str()),
        Some("req-log-1")
    );
    assert_eq!(
        finished.pointer("/span/route").and_then(|v| v.as_str()),
        Some("/healthz")
    );
}
