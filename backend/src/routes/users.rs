use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Game, GameStatus, UserSummary},
    AppState,
};

/// How many players the leaderboard shows
const LEADERBOARD_SIZE: i64 = 100;

/// A past or running game on a profile page
#[derive(Debug, Serialize)]
pub struct GameSummary {
    pub id: Uuid,
    pub status: GameStatus,
    pub current_level: i32,
    pub prize: i64,
    pub fifty_fifty_used: bool,
    pub audience_help_used: bool,
    pub friend_call_used: bool,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<Game> for GameSummary {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            status: game.status(),
            current_level: game.current_level,
            prize: game.prize,
            fifty_fifty_used: game.fifty_fifty_used,
            audience_help_used: game.audience_help_used,
            friend_call_used: game.friend_call_used,
            created_at: game.created_at,
            finished_at: game.finished_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserSummary,
    pub games: Vec<GameSummary>,
}

/// Leaderboard, richest first
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = state.store.list_users_by_balance(LEADERBOARD_SIZE).await?;
    Ok(Json(users.iter().map(|u| u.to_summary()).collect()))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserProfile>, AppError> {
    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;
    let games = state.store.list_games_for_user(user_id).await?;

    Ok(Json(UserProfile {
        user: user.to_summary(),
        games: games.into_iter().map(GameSummary::from).collect(),
    }))
}
