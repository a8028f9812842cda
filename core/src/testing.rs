//! Scripted `HttpSend` fake shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, HttpSend};

/// Answers requests with queued bodies, in order, and records each request.
#[derive(Default)]
pub(crate) struct ScriptedSender {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedSender {
    pub(crate) fn new(bodies: &[&str]) -> Arc<Self> {
        let sender = Self::default();
        for body in bodies {
            sender.push_body(body);
        }
        Arc::new(sender)
    }

    pub(crate) fn push_body(&self, body: &str) {
        self.replies.lock().unwrap().push_back(Ok(HttpResponse {
            status: 200,
            body: body.to_string(),
        }));
    }

    pub(crate) fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(TransportError(message.to_string())));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl HttpSend for ScriptedSender {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for {} {}", request.method, request.url))
    }
}
