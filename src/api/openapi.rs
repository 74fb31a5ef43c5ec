//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, balance_handler, user_handler};
use crate::domain::{AccountSummary, Balance, BalanceChange, DeletionReceipt, UserResponse};
use crate::services::TokenResponse;

/// OpenAPI documentation for the digi-wallet service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Digi Wallet",
        version = "0.1.0",
        description = "User balances with tier levels derived from the amount held"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        // Balance endpoints
        balance_handler::secure_route,
        balance_handler::get_balance,
        balance_handler::add_balance,
        balance_handler::take_balance,
        // User endpoints
        user_handler::list_users,
        user_handler::delete_user,
    ),
    components(
        schemas(
            // Domain types
            UserResponse,
            Balance,
            BalanceChange,
            AccountSummary,
            DeletionReceipt,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            // Balance handler types
            balance_handler::AddBalanceRequest,
            balance_handler::TakeBalanceForm,
            balance_handler::WhoAmI,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User registration and login"),
        (name = "Balance", description = "Credits, debits and balance lookups"),
        (name = "Users", description = "User listing and tier-gated deletion")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/register",
            "/login",
            "/secure-route",
            "/balance",
            "/add-balance",
            "/take-balance",
            "/list-user",
            "/delete-user/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
