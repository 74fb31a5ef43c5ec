//! HTTP request handlers.

pub mod auth_handler;
pub mod balance_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use balance_handler::balance_routes;
pub use user_handler::{listing_routes, user_routes};
