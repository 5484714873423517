use crate::{auth, error::AppError, models::User, AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// JWT for the `Authorization: Bearer` header
    pub access_token: String,
    pub user: User,
}

/// Create a player and sign them in
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let is_admin = state.config.is_admin_name(&payload.name);
    let user = state.store.create_user(&payload.name, is_admin).await?;

    let security = &state.config.security;
    let access_token = auth::generate_token(
        user.id,
        &user.name,
        &security.jwt_secret,
        security.token_ttl_hours,
    )
    .map_err(|e| {
        tracing::error!("Failed to generate JWT token: {}", e);
        AppError::Internal("could not issue token".to_string())
    })?;

    tracing::info!("Registered user {} (ID: {})", user.name, user.id);
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse { access_token, user }),
    ))
}

/// Get current authenticated user
pub async fn get_current_user(
    user: auth::AuthenticatedUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<User>, AppError> {
    let db_user = state
        .store
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("User not found in database: {}", user.user_id);
            AppError::NotFound(format!("user {}", user.user_id))
        })?;

    Ok(Json(db_user))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_register_then_me() {
        let app = TestApp::new().await;

        let response = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"name": "Vadim"})),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["user"]["name"], "Vadim");
        assert_eq!(response.body["user"]["balance"], 0);
        assert_eq!(response.body["user"]["is_admin"], false);
        let token = response.body["access_token"].as_str().unwrap().to_string();

        let me = app
            .send(Method::GET, "/api/auth/me", Some(&token), None)
            .await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body["name"], "Vadim");
    }

    #[tokio::test]
    async fn test_register_admin_name() {
        let app = TestApp::new().await;
        let response = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"name": "admin"})),
            )
            .await;

        assert_eq!(response.body["user"]["is_admin"], true);
    }

    #[tokio::test]
    async fn test_register_blank_name() {
        let app = TestApp::new().await;
        let response = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"name": "  "})),
            )
            .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.body["errors"],
            json!([{"field": "name", "message": "can't be blank"}])
        );
    }

    #[tokio::test]
    async fn test_me_without_token() {
        let app = TestApp::new().await;
        let response = app.send(Method::GET, "/api/auth/me", None, None).await;

        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location.as_deref(), Some("/users/sign_in"));
    }
}
