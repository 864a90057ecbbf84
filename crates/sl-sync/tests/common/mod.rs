#![allow(dead_code)]

use sl_core::http::HttpLimits;
use sl_sync::{ListingView, MirrorSnapshot};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio::net::TcpListener;

pub const TIMEOUT: Duration = Duration::from_secs(10);

/// Starts `sl-api` on an ephemeral port over a fresh in-memory database and
/// returns its `/api` base URL.
pub async fn spawn_api() -> String {
    let pool = sl_core::db::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let router = sl_api::app(pool, None, &HttpLimits::default())
        .await
        .expect("api router");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = sl_core::server::serve_listener(listener, router).await;
    });
    format!("http://{addr}/api")
}

/// Base URL of a port nothing listens on.
pub async fn dead_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api")
}

#[derive(Default)]
pub struct CapturingView {
    renders: Mutex<Vec<Vec<String>>>,
}

impl CapturingView {
    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    pub fn last(&self) -> Vec<String> {
        self.renders.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl ListingView for CapturingView {
    fn render(&self, snapshot: &MirrorSnapshot) {
        let numbers = snapshot.keys().map(|number| number.to_string()).collect();
        self.renders.lock().unwrap().push(numbers);
    }
}
