//! Discard-only response sink.
//!
//! # Responsibilities
//! - Record which route acknowledged the request
//! - Accept body writes without I/O
//! - Optionally capture parameter values for correctness checks
//!
//! # Design Decisions
//! - Capture is off in timed regions; when off, observing a parameter
//!   touches the value but never allocates

use std::hint::black_box;
use std::io;

/// Reusable response target handed to every dispatch.
#[derive(Debug, Default)]
pub struct ResponseSink {
    status: u16,
    route: Option<usize>,
    params_seen: usize,
    body_bytes: u64,
    captured: Option<Vec<(String, String)>>,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that keeps owned copies of every observed parameter.
    pub fn capturing() -> Self {
        Self {
            captured: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn set_capture(&mut self, enabled: bool) {
        self.captured = enabled.then(Vec::new);
    }

    /// Forget the previous dispatch. Keeps the capture buffer's capacity.
    pub fn reset(&mut self) {
        self.status = 0;
        self.route = None;
        self.params_seen = 0;
        if let Some(captured) = &mut self.captured {
            captured.clear();
        }
    }

    /// Mark the request as handled by `route`.
    pub fn acknowledge(&mut self, route: usize) {
        self.status = 200;
        self.route = Some(route);
    }

    /// Called by handlers once per path parameter.
    pub fn observe_param(&mut self, name: &str, value: &str) {
        self.params_seen += 1;
        black_box((name, value));
        if let Some(captured) = &mut self.captured {
            captured.push((name.to_string(), value.to_string()));
        }
    }

    /// Count parameters an engine read on its own side of the boundary.
    pub fn note_params(&mut self, count: usize) {
        self.params_seen += count;
    }

    pub fn is_capturing(&self) -> bool {
        self.captured.is_some()
    }

    pub fn write_body(&mut self, bytes: &[u8]) {
        self.body_bytes += bytes.len() as u64;
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn route(&self) -> Option<usize> {
        self.route
    }

    pub fn params_seen(&self) -> usize {
        self.params_seen
    }

    /// Total body bytes written since creation.
    pub fn body_bytes(&self) -> u64 {
        self.body_bytes
    }

    /// Parameters captured by the last dispatch; empty when capture is off.
    pub fn captured(&self) -> &[(String, String)] {
        self.captured.as_deref().unwrap_or(&[])
    }
}

impl io::Write for ResponseSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_body(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_acknowledge_and_reset() {
        let mut sink = ResponseSink::new();
        sink.acknowledge(7);
        sink.observe_param("name", "gordon");
        assert_eq!(sink.status(), 200);
        assert_eq!(sink.route(), Some(7));
        assert_eq!(sink.params_seen(), 1);
        assert!(sink.captured().is_empty());

        sink.reset();
        assert_eq!(sink.status(), 0);
        assert_eq!(sink.route(), None);
        assert_eq!(sink.params_seen(), 0);
    }

    #[test]
    fn test_capture_mode() {
        let mut sink = ResponseSink::capturing();
        sink.observe_param("owner", "julienschmidt");
        sink.observe_param("repo", "httprouter");
        assert_eq!(
            sink.captured(),
            &[
                ("owner".to_string(), "julienschmidt".to_string()),
                ("repo".to_string(), "httprouter".to_string()),
            ]
        );

        sink.reset();
        assert!(sink.captured().is_empty());

        sink.set_capture(false);
        assert!(!sink.is_capturing());
        sink.observe_param("x", "y");
        sink.note_params(2);
        assert!(sink.captured().is_empty());
        assert_eq!(sink.params_seen(), 3);
    }

    #[test]
    fn test_writes_are_discarded() {
        let mut sink = ResponseSink::new();
        sink.write_all(b"hello").unwrap();
        sink.write_body(b"ok");
        sink.flush().unwrap();
        assert_eq!(sink.body_bytes(), 7);
    }
}
