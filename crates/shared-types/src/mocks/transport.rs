//! URL-routed fake HTTP layer.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::TransportError;
use crate::transport::{HttpResponse, HttpTransport};

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// `GET` or `POST`.
    pub method: &'static str,
    /// Full URL.
    pub url: String,
    /// Body (empty for `GET`).
    pub body: String,
    /// Extra headers passed by the caller.
    pub headers: Vec<(String, String)>,
}

type Handler = Arc<dyn Fn(&RecordedRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

enum Route {
    Queue(VecDeque<Result<HttpResponse, TransportError>>),
    Handler(Handler),
}

/// In-memory [`HttpTransport`].
///
/// Each URL is answered from a queue (the last entry repeats forever) or by
/// a handler closure. Unrouted URLs fail with a connection error.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    recorded: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Empty transport; every URL is unreachable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `status` and `body`.
    pub fn route(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.route_sequence(url, vec![Ok(HttpResponse::new(status, body))]);
    }

    /// Answer `url` from `responses` in order, repeating the last one.
    pub fn route_sequence(
        &self,
        url: impl Into<String>,
        responses: Vec<Result<HttpResponse, TransportError>>,
    ) {
        self.routes
            .lock()
            .insert(url.into(), Route::Queue(responses.into()));
    }

    /// Answer `url` with a closure over the recorded request.
    pub fn route_handler<F>(&self, url: impl Into<String>, handler: F)
    where
        F: Fn(&RecordedRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .insert(url.into(), Route::Handler(Arc::new(handler)));
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().clone()
    }

    /// Requests sent to `url`.
    pub fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        self.recorded
            .lock()
            .iter()
            .filter(|r| r.url == url)
            .cloned()
            .collect()
    }

    fn dispatch(&self, request: RecordedRequest) -> Result<HttpResponse, TransportError> {
        self.recorded.lock().push(request.clone());

        // Handlers run outside the routes lock so they may call back into the mock.
        let handler = {
            let mut routes = self.routes.lock();
            match routes.get_mut(&request.url) {
                None => {
                    return Err(TransportError::Connection(format!(
                        "Cannot connect to {}",
                        request.url
                    )))
                }
                Some(Route::Queue(queue)) => {
                    return match queue.len() {
                        0 => Err(TransportError::Connection(request.url.clone())),
                        1 => queue[0].clone(),
                        _ => queue
                            .pop_front()
                            .unwrap_or_else(|| Err(TransportError::Connection(request.url.clone()))),
                    };
                }
                Some(Route::Handler(handler)) => Arc::clone(handler),
            }
        };
        handler(&request)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.dispatch(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            body: String::new(),
            headers: Vec::new(),
        })
    }

    async fn post_json(
        &self,
        url: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        self.dispatch(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            body: body.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }
}
