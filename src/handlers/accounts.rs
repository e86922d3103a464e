//! Ban and allow-list listings.

use super::CloudResponse;
use crate::http::AppState;
use crate::store::{AllowRecord, BanListing};
use crate::telemetry::RequestTimer;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct Accounts<T: Serialize> {
    pub accounts: Vec<T>,
    pub count: usize,
}

impl<T: Serialize> Accounts<T> {
    fn new(accounts: Vec<T>) -> Self {
        let count = accounts.len();
        Self { accounts, count }
    }
}

/// GET|POST /AntiCheat/BannedAccounts
pub async fn banned_accounts(State(state): State<AppState>) -> Response {
    let _timer = RequestTimer::new("banned_accounts");
    let listings: Vec<BanListing> = state
        .store
        .list_bans()
        .await
        .iter()
        .map(|record| record.listing())
        .collect();
    debug!(count = listings.len(), "Listing banned accounts");
    CloudResponse::ok("Banned accounts retrieved successfully", Accounts::new(listings)).into_response()
}

/// GET|POST /AntiCheat/AllowedAccounts
pub async fn allowed_accounts(State(state): State<AppState>) -> Response {
    let _timer = RequestTimer::new("allowed_accounts");
    let records: Vec<AllowRecord> = state.store.list_allowed().await;
    debug!(count = records.len(), "Listing allowed accounts");
    CloudResponse::ok("Allowed accounts retrieved successfully", Accounts::new(records)).into_response()
}
