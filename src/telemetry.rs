//! Telemetry utilities for request timing and tracing spans.

use std::time::Instant;

/// Guard for timing request handling and recording metrics.
///
/// Records latency when dropped.
pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    /// Start timing a request.
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_request(self.endpoint, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for a detection request.
    pub fn detection(check: &str, player_id: &str) -> Span {
        info_span!("detection", check = %check, player_id = %player_id)
    }

    /// Span for a console command.
    pub fn console(command: &str) -> Span {
        info_span!("console", command = %command)
    }

    /// Span for a policy read or update.
    pub fn config(endpoint: &str) -> Span {
        info_span!("config", endpoint = %endpoint)
    }
}
