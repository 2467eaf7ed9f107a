//! JSON request collaborator used by the contact form and "load more".
//!
//! The transport itself is out of scope for this crate; behaviors talk to a
//! `Transport` and decode the shared response envelope. `CannedTransport`
//! serves fixed responses by URL and backs both the tests and the preview.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::REQUEST_TIMEOUT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AjaxRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub timeout: Duration,
}

impl AjaxRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AjaxResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

impl AjaxResponse {
    pub fn from_json(body: &str) -> Result<Self, AjaxError> {
        Ok(serde_json::from_str(body)?)
    }
}

#[derive(Debug, Error)]
pub enum AjaxError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP error {status}")]
    Status { status: u16 },
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no route for {method} {url}")]
    NoRoute { method: Method, url: String },
}

impl AjaxError {
    /// Text suitable for showing next to the control that made the request.
    pub fn user_message(&self) -> String {
        match self {
            AjaxError::Timeout(_) => "The request timed out. Please try again.".to_string(),
            AjaxError::Status { status } => {
                format!("Something went wrong (HTTP {status}). Please try again later.")
            }
            AjaxError::Decode(_) => "The server sent an unexpected response.".to_string(),
            AjaxError::NoRoute { .. } => "Could not reach the server.".to_string(),
        }
    }
}

pub trait Transport {
    fn send(&mut self, request: &AjaxRequest) -> Result<AjaxResponse, AjaxError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, request: &AjaxRequest) -> Result<AjaxResponse, AjaxError> {
        (**self).send(request)
    }
}

#[derive(Debug)]
enum Canned {
    Body(String),
    Status(u16),
    Timeout,
}

/// Serves queued responses per URL and records every request it sees.
#[derive(Debug, Default)]
pub struct CannedTransport {
    routes: HashMap<String, VecDeque<Canned>>,
    requests: Vec<AjaxRequest>,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, url: &str, canned: Canned) {
        self.routes
            .entry(url.to_string())
            .or_default()
            .push_back(canned);
    }

    /// Queue a raw JSON body for `url`.
    pub fn respond_json(&mut self, url: &str, body: impl Into<String>) {
        self.push(url, Canned::Body(body.into()));
    }

    pub fn respond(&mut self, url: &str, response: &AjaxResponse) {
        // serializing a plain struct of strings and bools cannot fail
        let body = serde_json::to_string(response).unwrap_or_default();
        self.push(url, Canned::Body(body));
    }

    pub fn respond_status(&mut self, url: &str, status: u16) {
        self.push(url, Canned::Status(status));
    }

    pub fn respond_timeout(&mut self, url: &str) {
        self.push(url, Canned::Timeout);
    }

    pub fn requests(&self) -> &[AjaxRequest] {
        &self.requests
    }
}

impl Transport for CannedTransport {
    fn send(&mut self, request: &AjaxRequest) -> Result<AjaxResponse, AjaxError> {
        self.requests.push(request.clone());
        let next = self
            .routes
            .get_mut(&request.url)
            .and_then(|queue| queue.pop_front());
        match next {
            Some(Canned::Body(body)) => AjaxResponse::from_json(&body),
            Some(Canned::Status(status)) => Err(AjaxError::Status { status }),
            Some(Canned::Timeout) => Err(AjaxError::Timeout(request.timeout)),
            None => Err(AjaxError::NoRoute {
                method: request.method,
                url: request.url.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_fields_are_optional() {
        let r = AjaxResponse::from_json(r#"{"success":true,"html":"<p>x</p>"}"#).unwrap();
        assert!(r.success);
        assert_eq!(r.html.as_deref(), Some("<p>x</p>"));
        assert_eq!(r.has_more, None);

        let r = AjaxResponse::from_json(r#"{"success":false,"error":"nope"}"#).unwrap();
        assert_eq!(r.error.as_deref(), Some("nope"));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(
            AjaxResponse::from_json("<html>"),
            Err(AjaxError::Decode(_))
        ));
    }

    #[test]
    fn canned_transport_serves_in_order_and_records() {
        let mut t = CannedTransport::new();
        t.respond_json("/a", r#"{"success":true}"#);
        t.respond_status("/a", 500);
        assert!(t.send(&AjaxRequest::get("/a")).unwrap().success);
        let err = t.send(&AjaxRequest::get("/a")).unwrap_err();
        assert!(matches!(err, AjaxError::Status { status: 500 }));
        assert!(err.user_message().contains("500"));
        assert!(matches!(
            t.send(&AjaxRequest::get("/a")),
            Err(AjaxError::NoRoute { .. })
        ));
        assert_eq!(t.requests().len(), 3);
    }

    #[test]
    fn timeout_reports_the_request_timeout() {
        let mut t = CannedTransport::new();
        t.respond_timeout("/slow");
        let req = AjaxRequest::get("/slow").with_timeout(Duration::from_secs(3));
        match t.send(&req) {
            Err(AjaxError::Timeout(d)) => assert_eq!(d, Duration::from_secs(3)),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
