pub mod auth;
pub mod games;
pub mod health;
pub mod questions;
pub mod response;
pub mod users;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::get_current_user))
        .route("/games", post(games::create))
        .route("/games/{id}", get(games::show))
        .route("/games/{id}/answer", put(games::answer))
        .route("/games/{id}/take_money", put(games::take_money))
        .route("/games/{id}/help", put(games::help))
        .route("/users", get(users::index))
        .route("/users/{id}", get(users::show))
        .route("/questions", post(questions::import))
}
