//! In-memory [`HttpClient`] for tests.

use super::client::HttpClient;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Serves canned responses keyed by full request URL.
///
/// Each URL holds a queue; the last queued response is repeated once the
/// queue is drained. Unknown URLs answer 404.
#[derive(Default)]
pub(crate) struct FakeClient {
    routes: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    requests: Mutex<Vec<reqwest::Request>>,
}

impl FakeClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(self, url: &str, status: u16, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    /// URLs requested so far, in order.
    pub(crate) fn requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url().to_string())
            .collect()
    }

    /// Value of `header` on the most recent request.
    pub(crate) fn last_header(&self, header: &str) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|r| r.headers().get(header))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let url = req.url().to_string();
        self.requests.lock().unwrap().push(req);

        let (status, body) = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&url) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) => queue.front().cloned().unwrap(),
                None => (404, String::new()),
            }
        };

        let resp = http::Response::builder()
            .status(status)
            .body(body)
            .unwrap();
        Ok(reqwest::Response::from(resp))
    }
}
