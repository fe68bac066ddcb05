use crate::state::AppState;
use axum::Router;

mod dto;
pub mod email;
pub mod handlers;
pub mod messages;
mod password;
pub mod repo;
mod repo_types;
pub mod services;
mod validation;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
