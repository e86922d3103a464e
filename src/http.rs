//! HTTP server: cloud-script endpoints, admin API and Prometheus metrics.

use crate::handlers::{accounts, config, console, detect};
use crate::notify::Notifier;
use crate::store::PolicyStore;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tracing::info;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: PolicyStore,
    pub notifier: Notifier,
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Build the router. `/metrics` is mounted only when `metrics` is set.
pub fn router(state: AppState, metrics: bool) -> Router {
    let app = Router::new()
        .route("/AntiCheat/Config", get(config::get_config).post(config::post_config))
        .route("/AntiCheat/DetectHeadset", post(detect::detect_headset))
        .route("/AntiCheat/DetectPlayer", post(detect::detect_player))
        .route("/AntiCheat/DetectVpn", post(detect::detect_vpn))
        .route(
            "/AntiCheat/BannedAccounts",
            get(accounts::banned_accounts).post(accounts::banned_accounts),
        )
        .route(
            "/AntiCheat/AllowedAccounts",
            get(accounts::allowed_accounts).post(accounts::allowed_accounts),
        )
        .route("/api/config/update", post(config::update_config))
        .route("/api/console/command", post(console::console_command))
        .with_state(state);

    if metrics {
        app.route("/metrics", get(metrics_handler))
    } else {
        app
    }
}

/// Serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::state;

    async fn spawn(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_metrics_route_is_optional() {
        let (state, _dir) = state();
        let client = reqwest::Client::new();

        let addr = spawn(router(state.clone(), false)).await;
        let response = client.get(format!("http://{}/metrics", addr)).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 404);

        let addr = spawn(router(state, true)).await;
        let response = client.get(format!("http://{}/metrics", addr)).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_malformed_detection_body_uses_envelope() {
        let (state, _dir) = state();
        let addr = spawn(router(state, false)).await;

        let response = reqwest::Client::new()
            .post(format!("http://{}/AntiCheat/DetectVpn", addr))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let value: serde_json::Value = response.json().await.unwrap();
        assert_eq!(value["ResultCode"], 1);
        assert_eq!(value["Message"], "Internal error during VPN detection.");
    }

    #[tokio::test]
    async fn test_listings_accept_get_and_post() {
        let (state, _dir) = state();
        let addr = spawn(router(state, false)).await;
        let client = reqwest::Client::new();

        for path in ["/AntiCheat/BannedAccounts", "/AntiCheat/AllowedAccounts"] {
            let url = format!("http://{}{}", addr, path);
            assert_eq!(client.get(&url).send().await.unwrap().status().as_u16(), 200);
            assert_eq!(client.post(&url).send().await.unwrap().status().as_u16(), 200);
        }
    }
}
