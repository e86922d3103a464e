//! Prometheus metrics collection for acwarden.
//!
//! Exposed at `GET /metrics` when `server.metrics` is enabled.
//!
//! - `acwarden_detections_total{check, verdict}` - Detection outcomes
//! - `acwarden_bans_recorded_total` - Ban records written
//! - `acwarden_webhook_failures_total` - Failed webhook deliveries
//! - `acwarden_console_commands_total{command}` - Console commands by name
//! - `acwarden_request_duration_seconds{endpoint}` - Request latency
//! - `acwarden_api_errors_total{endpoint, error}` - Handler errors by kind

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Detection outcomes by check (device, player, vpn) and verdict.
pub static DETECTIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Ban records successfully written.
pub static BANS_RECORDED: OnceLock<IntCounter> = OnceLock::new();

/// Webhook deliveries that failed or returned a non-2xx status.
pub static WEBHOOK_FAILURES: OnceLock<IntCounter> = OnceLock::new();

/// Console commands by name.
pub static CONSOLE_COMMANDS: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler errors by endpoint and error code.
pub static API_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Request latency by endpoint.
pub static REQUEST_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Called once at startup. Metrics recorded before `init` are dropped.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(DETECTIONS, IntCounterVec::new(Opts::new("acwarden_detections_total", "Detection outcomes by check and verdict"), &["check", "verdict"]));
    register!(BANS_RECORDED, IntCounter::new("acwarden_bans_recorded_total", "Ban records written"));
    register!(WEBHOOK_FAILURES, IntCounter::new("acwarden_webhook_failures_total", "Failed webhook deliveries"));
    register!(CONSOLE_COMMANDS, IntCounterVec::new(Opts::new("acwarden_console_commands_total", "Console commands by name"), &["command"]));
    register!(API_ERRORS, IntCounterVec::new(Opts::new("acwarden_api_errors_total", "Handler errors by endpoint and kind"), &["endpoint", "error"]));
    register!(REQUEST_LATENCY, HistogramVec::new(
        HistogramOpts::new("acwarden_request_duration_seconds", "Request latency by endpoint")
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["endpoint"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record a detection outcome.
#[inline]
pub fn record_detection(check: &str, detected: bool) {
    if let Some(c) = DETECTIONS.get() {
        let verdict = if detected { "detected" } else { "clean" };
        c.with_label_values(&[check, verdict]).inc();
    }
}

/// Record a written ban.
#[inline]
pub fn record_ban() {
    if let Some(c) = BANS_RECORDED.get() {
        c.inc();
    }
}

/// Record a failed webhook delivery.
#[inline]
pub fn record_webhook_failure() {
    if let Some(c) = WEBHOOK_FAILURES.get() {
        c.inc();
    }
}

/// Record a console command.
#[inline]
pub fn record_console_command(command: &str) {
    if let Some(c) = CONSOLE_COMMANDS.get() {
        c.with_label_values(&[command]).inc();
    }
}

/// Record a handler error.
#[inline]
pub fn record_api_error(endpoint: &str, error: &str) {
    if let Some(c) = API_ERRORS.get() {
        c.with_label_values(&[endpoint, error]).inc();
    }
}

/// Record request latency.
#[inline]
pub fn record_request(endpoint: &str, duration_secs: f64) {
    if let Some(h) = REQUEST_LATENCY.get() {
        h.with_label_values(&[endpoint]).observe(duration_secs);
    }
}
