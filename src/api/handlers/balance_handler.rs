//! Balance handlers: credit, debit and lookups for the calling user.

use axum::{
    extract::{Extension, Form, Json, State},
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::WithRejection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Balance, BalanceChange};
use crate::errors::{AppError, AppResult};
use crate::types::ApiResponse;

/// Credit request (JSON)
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddBalanceRequest {
    /// Amount to add; must be greater than zero
    #[schema(value_type = f64, example = 150000.0)]
    pub amount: Decimal,
}

/// Debit request (form-encoded)
#[derive(Debug, Deserialize, ToSchema)]
pub struct TakeBalanceForm {
    /// Amount to take; must be greater than zero
    #[schema(value_type = f64, example = 50000.0)]
    pub amount: Decimal,
}

/// Identity of the authenticated caller
#[derive(Debug, Serialize, ToSchema)]
pub struct WhoAmI {
    pub user_id: Uuid,
}

/// Create balance routes (all require authentication)
pub fn balance_routes() -> Router<AppState> {
    Router::new()
        .route("/secure-route", get(secure_route))
        .route("/balance", get(get_balance))
        .route("/add-balance", put(add_balance))
        .route("/take-balance", post(take_balance))
}

/// Echo the authenticated caller
#[utoipa::path(
    get,
    path = "/secure-route",
    tag = "Balance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Authenticated caller", body = WhoAmI),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn secure_route(
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResponse<WhoAmI> {
    ApiResponse::success(WhoAmI {
        user_id: current_user.id,
    })
}

/// Current balance of the caller
#[utoipa::path(
    get,
    path = "/balance",
    tag = "Balance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's balance", body = Balance),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No balance yet")
    )
)]
pub async fn get_balance(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Balance>> {
    let balance = state.balance_service.get_balance(current_user.id).await?;
    Ok(ApiResponse::success(balance))
}

/// Credit the caller's balance
#[utoipa::path(
    put,
    path = "/add-balance",
    tag = "Balance",
    security(("bearer_auth" = [])),
    request_body = AddBalanceRequest,
    responses(
        (status = 200, description = "Balance credited", body = BalanceChange),
        (status = 400, description = "Invalid amount or body"),
        (status = 401, description = "Unauthorized or unknown user")
    )
)]
pub async fn add_balance(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<AddBalanceRequest>, AppError>,
) -> AppResult<ApiResponse<BalanceChange>> {
    let change = state
        .balance_service
        .credit(current_user.id, payload.amount)
        .await?;

    Ok(ApiResponse::success(change))
}

/// Debit the caller's balance
#[utoipa::path(
    post,
    path = "/take-balance",
    tag = "Balance",
    security(("bearer_auth" = [])),
    request_body(content = TakeBalanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Balance debited", body = BalanceChange),
        (status = 400, description = "Invalid amount or form"),
        (status = 401, description = "Unauthorized or unknown user"),
        (status = 404, description = "No balance to debit")
    )
)]
pub async fn take_balance(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    WithRejection(Form(form), _): WithRejection<Form<TakeBalanceForm>, AppError>,
) -> AppResult<ApiResponse<BalanceChange>> {
    let change = state
        .balance_service
        .debit(current_user.id, form.amount)
        .await?;

    Ok(ApiResponse::success(change))
}
