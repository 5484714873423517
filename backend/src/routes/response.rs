use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, StoreError},
    routes::games::GameView,
};

pub const ROOT_PATH: &str = "/";
pub const SIGN_IN_PATH: &str = "/users/sign_in";

pub fn game_path(game_id: Uuid) -> String {
    format!("/games/{}", game_id)
}

pub fn user_path(user_id: i64) -> String {
    format!("/users/{}", user_id)
}

/// One-shot message shown on the page a redirect leads to.
/// Serialised as an object with a single key, e.g. `{"alert": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flash {
    Notice(String),
    Alert(String),
    Warning(String),
    Info(String),
}

/// `302 Found` with a `Location` header and a JSON body describing where to go next
#[derive(Debug, Serialize)]
pub struct Redirect {
    pub redirect_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<GameView>,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            redirect_to: path.into(),
            flash: None,
            game: None,
        }
    }

    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }

    pub fn with_game(mut self, game: GameView) -> Self {
        self.game = Some(game);
        self
    }
}

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        (
            StatusCode::FOUND,
            [(header::LOCATION, self.redirect_to.clone())],
            Json(self),
        )
            .into_response()
    }
}

/// Why a game action did not complete normally
#[derive(Debug)]
pub enum Rejection {
    Redirect(Redirect),
    Error(AppError),
}

impl From<Redirect> for Rejection {
    fn from(redirect: Redirect) -> Self {
        Rejection::Redirect(redirect)
    }
}

impl From<AppError> for Rejection {
    fn from(error: AppError) -> Self {
        Rejection::Error(error)
    }
}

impl From<StoreError> for Rejection {
    fn from(error: StoreError) -> Self {
        Rejection::Error(error.into())
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::Redirect(redirect) => redirect.into_response(),
            Rejection::Error(error) => error.into_response(),
        }
    }
}
