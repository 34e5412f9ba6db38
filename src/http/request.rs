//! Reusable benchmark request.
//!
//! # Responsibilities
//! - Hold method, path and an optional query string
//! - Allow the path and method to be rewritten in place between dispatches
//!
//! # Design Decisions
//! - The query string survives `set`, mirroring a client that keeps its
//!   query while walking different paths
//! - Rewriting reuses the existing buffer; it only grows, never shrinks

use crate::fixtures::Method;

/// A single request object reused across every dispatch of a measurement.
#[derive(Debug, Clone)]
pub struct BenchRequest {
    method: Method,
    /// Request target: path, optionally followed by `?query`.
    target: String,
    path_len: usize,
    query: String,
}

impl BenchRequest {
    /// Create a request for `method` and `path` without a query string.
    pub fn new(method: Method, path: &str) -> Self {
        let mut request = Self {
            method,
            target: String::with_capacity(path.len()),
            path_len: 0,
            query: String::new(),
        };
        request.set(method, path);
        request
    }

    /// Attach a query string (without the leading `?`).
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        let method = self.method;
        let path = self.path().to_string();
        self.set(method, &path);
        self
    }

    /// Rewrite method and path in place, keeping the query string.
    pub fn set(&mut self, method: Method, path: &str) {
        self.method = method;
        self.target.clear();
        self.target.push_str(path);
        self.path_len = path.len();
        if !self.query.is_empty() {
            self.target.push('?');
            self.target.push_str(&self.query);
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.target[..self.path_len]
    }

    pub fn query(&self) -> Option<&str> {
        (!self.query.is_empty()).then_some(self.query.as_str())
    }

    /// Path plus query, as it would appear on the request line.
    pub fn target(&self) -> &str {
        &self.target
    }
}
