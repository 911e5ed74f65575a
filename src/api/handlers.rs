use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use super::dto::{BalanceResponse, HealthResponse, RedeemRequest, RewardRequest, UserResponse};
use super::error::ApiError;
use crate::application::LedgerService;
use crate::domain::redemption_description;

/// GET / - Health check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "active".to_string(),
        message: "GreenReward API is running".to_string(),
    })
}

/// GET /users/:username - Balance and recent activity
pub async fn get_user(
    State(service): State<Arc<LedgerService>>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let summary = service.account_summary(&username).await?;
    Ok(Json(summary.into()))
}

/// POST /reward - Collector awards points for a waste scan
pub async fn reward_points(
    State(service): State<Arc<LedgerService>>,
    payload: Result<Json<RewardRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let Json(request) = payload?;

    let new_balance = service
        .credit(&request.resident_name, request.amount, &request.description)
        .await?;

    Ok(Json(BalanceResponse {
        message: "Points rewarded".to_string(),
        new_balance,
    }))
}

/// POST /redeem - Resident spends points at a shop
pub async fn redeem_points(
    State(service): State<Arc<LedgerService>>,
    payload: Result<Json<RedeemRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let Json(request) = payload?;

    let new_balance = service
        .debit(
            &request.resident_name,
            request.amount,
            &redemption_description(&request.shop_name),
        )
        .await?;

    Ok(Json(BalanceResponse {
        message: "Redemption successful".to_string(),
        new_balance,
    }))
}
