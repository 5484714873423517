use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{sign_in_redirect, AuthenticatedUser},
    error::{AppError, GameError, StoreError},
    game::{
        create_game_for_user,
        rules::{format_prize, prize_for_level},
        AnswerOutcome, GameSession,
    },
    models::{AnswerKey, GameQuestion, GameStatus, HelpHash, HelpKind},
    routes::response::{game_path, user_path, Flash, Redirect, Rejection, ROOT_PATH},
    AppState,
};

const HELP_USED: &str = "You used a hint";
const HELP_REFUSED: &str = "You cannot use this hint";

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub letter: String,
}

#[derive(Debug, Deserialize)]
pub struct HelpRequest {
    pub help_type: String,
}

/// Question as the player sees it
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub level: i32,
    pub text: String,
    pub variants: BTreeMap<AnswerKey, String>,
    pub help_hash: HelpHash,
}

impl From<&GameQuestion> for QuestionView {
    fn from(question: &GameQuestion) -> Self {
        Self {
            level: question.level(),
            text: question.text().to_string(),
            variants: question
                .variants()
                .into_iter()
                .map(|(key, text)| (key, text.to_string()))
                .collect(),
            help_hash: question.help_hash.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameView {
    pub id: Uuid,
    pub user_id: i64,
    pub status: GameStatus,
    pub current_level: i32,
    pub prize: i64,
    /// What taking the money now would pay
    pub current_prize: i64,
    pub fifty_fifty_used: bool,
    pub audience_help_used: bool,
    pub friend_call_used: bool,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Answer to the last question the player got right
    pub last_correct_answer: Option<String>,
    /// Only present while the game is in progress
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
}

impl From<&GameSession> for GameView {
    fn from(session: &GameSession) -> Self {
        let game = &session.game;
        let question = if game.status().is_terminal() {
            None
        } else {
            session.current_game_question().map(QuestionView::from)
        };

        Self {
            id: game.id,
            user_id: game.user_id,
            status: game.status(),
            current_level: game.current_level,
            prize: game.prize,
            current_prize: prize_for_level(game.previous_level()),
            fifty_fifty_used: game.fifty_fifty_used,
            audience_help_used: game.audience_help_used,
            friend_call_used: game.friend_call_used,
            created_at: game.created_at,
            finished_at: game.finished_at,
            last_correct_answer: session
                .previous_game_question()
                .map(|q| q.correct_answer().to_string()),
            question,
        }
    }
}

fn finished_redirect(user_id: i64, game_id: Uuid) -> Redirect {
    Redirect::to(user_path(user_id)).with_flash(Flash::Alert(format!(
        "Game {} is already finished",
        game_id
    )))
}

/// Redirect for a rejected game action, or an error for anything unexpected
fn game_rejection(user_id: i64, game_id: Uuid, error: GameError) -> Rejection {
    match error {
        GameError::Finished => finished_redirect(user_id, game_id).into(),
        GameError::HelpAlreadyUsed(_) | GameError::UnknownHelp(_) => Redirect::to(game_path(game_id))
            .with_flash(Flash::Alert(HELP_REFUSED.to_string()))
            .into(),
        GameError::UnknownAnswer(letter) => Redirect::to(game_path(game_id))
            .with_flash(Flash::Alert(format!("Unknown answer letter {:?}", letter)))
            .into(),
        other => AppError::Store(StoreError::Game(other)).into(),
    }
}

/// Load a game owned by the caller
async fn open_game(
    state: &AppState,
    user: &AuthenticatedUser,
    game_id: Uuid,
) -> Result<GameSession, Rejection> {
    match state.store.find_user_game(user.user_id, game_id).await? {
        Some(session) => Ok(session),
        None => {
            tracing::warn!("User {} asked for game {} they do not own", user.user_id, game_id);
            Err(Redirect::to(ROOT_PATH)
                .with_flash(Flash::Alert("This game is not yours".to_string()))
                .into())
        }
    }
}

async fn open_unfinished_game(
    state: &AppState,
    user: &AuthenticatedUser,
    game_id: Uuid,
) -> Result<GameSession, Rejection> {
    let session = open_game(state, user, game_id).await?;
    if session.is_finished() {
        return Err(finished_redirect(user.user_id, game_id).into());
    }
    Ok(session)
}

async fn save(state: &AppState, session: &GameSession) -> Result<(), Rejection> {
    match state.store.save_game(session).await {
        Ok(()) => Ok(()),
        // Another request finished this game first
        Err(StoreError::StaleGame(game_id)) => {
            Err(finished_redirect(session.game.user_id, game_id).into())
        }
        Err(e) => {
            tracing::error!("Failed to save game {}: {}", session.id(), e);
            Err(e.into())
        }
    }
}

/// Current question of an unfinished game
pub async fn show(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameView>, Rejection> {
    let session = open_unfinished_game(&state, &user, game_id).await?;
    Ok(Json(GameView::from(&session)))
}

pub async fn create(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
) -> Result<Redirect, Rejection> {
    let Some(player) = state.store.get_user(user.user_id).await? else {
        tracing::warn!("Token for unknown user {}", user.user_id);
        return Err(sign_in_redirect().into());
    };

    match create_game_for_user(state.store.as_ref(), &player, Utc::now()).await {
        Ok(session) => Ok(Redirect::to(game_path(session.id()))
            .with_flash(Flash::Notice(format!(
                "New game started at {}",
                session.game.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            )))
            .with_game(GameView::from(&session))),
        Err(StoreError::Game(GameError::ActiveGameExists(active))) => {
            Ok(Redirect::to(game_path(active)).with_flash(Flash::Alert(
                "You have an unfinished game".to_string(),
            )))
        }
        // The conflicting game finished before it could be looked up
        Err(StoreError::StaleGame(_)) => Ok(Redirect::to(ROOT_PATH).with_flash(Flash::Alert(
            "Your previous game has just finished, please try again".to_string(),
        ))),
        Err(StoreError::Game(e)) => {
            tracing::warn!("Could not start a game for user {}: {}", player.id, e);
            Ok(Redirect::to(ROOT_PATH)
                .with_flash(Flash::Alert(format!("Could not start a game: {}", e))))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn answer(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Redirect, Rejection> {
    let mut session = open_unfinished_game(&state, &user, game_id).await?;

    let key = payload
        .letter
        .parse::<AnswerKey>()
        .map_err(|e| game_rejection(user.user_id, game_id, e))?;
    let correct_answer = session
        .current_game_question()
        .map(|q| q.correct_answer().to_string())
        .unwrap_or_default();

    let outcome = session
        .answer_current_question(key, Utc::now())
        .map_err(|e| game_rejection(user.user_id, game_id, e))?;
    save(&state, &session).await?;

    let prize = format_prize(session.game.prize);
    let redirect = match outcome {
        AnswerOutcome::Correct => Redirect::to(game_path(game_id)),
        AnswerOutcome::Won => Redirect::to(user_path(user.user_id)).with_flash(Flash::Notice(
            format!("Congratulations! You won the game, your prize is {}", prize),
        )),
        AnswerOutcome::Wrong | AnswerOutcome::TimedOut => Redirect::to(user_path(user.user_id))
            .with_flash(Flash::Alert(format!(
                "Correct answer: {}. Game over, your prize is {}",
                correct_answer, prize
            ))),
    };
    Ok(redirect.with_game(GameView::from(&session)))
}

pub async fn take_money(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<Uuid>,
) -> Result<Redirect, Rejection> {
    let mut session = open_unfinished_game(&state, &user, game_id).await?;

    let prize = session
        .take_money(Utc::now())
        .map_err(|e| game_rejection(user.user_id, game_id, e))?;
    save(&state, &session).await?;

    Ok(Redirect::to(user_path(user.user_id))
        .with_flash(Flash::Warning(format!(
            "Game over, your prize is {}",
            format_prize(prize)
        )))
        .with_game(GameView::from(&session)))
}

pub async fn help(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<HelpRequest>,
) -> Result<Redirect, Rejection> {
    let mut session = open_unfinished_game(&state, &user, game_id).await?;

    let kind = payload
        .help_type
        .parse::<HelpKind>()
        .map_err(|e| game_rejection(user.user_id, game_id, e))?;
    let used = {
        let mut rng = rand::rng();
        session.use_help(kind, &mut rng)
    };
    used.map_err(|e| game_rejection(user.user_id, game_id, e))?;
    save(&state, &session).await?;

    Ok(Redirect::to(game_path(game_id))
        .with_flash(Flash::Info(HELP_USED.to_string()))
        .with_game(GameView::from(&session)))
}
