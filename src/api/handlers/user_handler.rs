//! User handlers: the public listing and tier-gated deletion.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{delete, get},
    Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{AccountSummary, DeletionReceipt, SortOrder};
use crate::errors::{AppError, AppResult};
use crate::types::ApiResponse;

/// Listing query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// `asc` or `desc`; anything else leaves the listing unsorted
    pub sort_amount: Option<String>,
}

/// Public routes
pub fn listing_routes() -> Router<AppState> {
    Router::new().route("/list-user", get(list_users))
}

/// Routes that require authentication
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/delete-user/:id", delete(delete_user))
}

/// List every user with their balance amount
#[utoipa::path(
    get,
    path = "/list-user",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "All users with their amounts", body = Vec<AccountSummary>)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Vec<AccountSummary>>> {
    let order = SortOrder::from_token(query.sort_amount.as_deref());
    let accounts = state.user_service.list_users(order).await?;

    let meta = json!({
        "count": accounts.len(),
        "sort_amount": order.as_token(),
    });

    Ok(ApiResponse::with_meta(accounts, meta))
}

/// Delete a user ranked strictly below the caller
#[utoipa::path(
    delete,
    path = "/delete-user/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = DeletionReceipt),
        (status = 400, description = "Malformed user id"),
        (status = 401, description = "Unauthorized or unknown caller"),
        (status = 403, description = "Self-deletion or insufficient tier"),
        (status = 404, description = "Target user not found")
    )
)]
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<ApiResponse<DeletionReceipt>> {
    let receipt = state.user_service.delete_user(current_user.id, id).await?;
    Ok(ApiResponse::success(receipt))
}
