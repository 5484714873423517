use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{queries, Store},
    error::{GameError, StoreError, ValidationErrors},
    game::GameSession,
    models::{Game, NewQuestion, Question, User},
};

/// Store backed by Postgres
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// The game a user already has running; without one the conflicting game
/// finished in the meantime and this insert is stale
fn active_game_conflict(active: Option<Uuid>, game_id: Uuid) -> StoreError {
    match active {
        Some(active) => GameError::ActiveGameExists(active).into(),
        None => StoreError::StaleGame(game_id),
    }
}

fn text_taken() -> StoreError {
    let mut errors = ValidationErrors::new();
    errors.add("text", "has already been taken");
    errors.into()
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, name: &str, is_admin: bool) -> Result<User, StoreError> {
        User::validate_name(name)?;
        Ok(queries::create_user(&self.pool, name.trim(), is_admin).await?)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(queries::get_user(&self.pool, user_id).await?)
    }

    async fn list_users_by_balance(&self, limit: i64) -> Result<Vec<User>, StoreError> {
        Ok(queries::list_users_by_balance(&self.pool, limit).await?)
    }

    async fn create_question(&self, question: &NewQuestion) -> Result<Question, StoreError> {
        question.validate()?;
        if queries::question_text_taken(&self.pool, &question.text).await? {
            return Err(text_taken());
        }

        match queries::create_question(&self.pool, question).await {
            Ok(stored) => Ok(stored),
            // Lost a race with a concurrent import of the same text
            Err(e) if is_unique_violation(&e) => Err(text_taken()),
            Err(e) => Err(e.into()),
        }
    }

    async fn random_question(&self, level: i32) -> Result<Option<Question>, StoreError> {
        Ok(queries::random_question(&self.pool, level).await?)
    }

    async fn count_questions(&self) -> Result<i64, StoreError> {
        Ok(queries::count_questions(&self.pool).await?)
    }

    async fn active_game_id(&self, user_id: i64) -> Result<Option<Uuid>, StoreError> {
        Ok(queries::active_game_id(&self.pool, user_id).await?)
    }

    async fn insert_game(&self, session: &GameSession) -> Result<GameSession, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Err(e) = queries::insert_game(&mut tx, &session.game).await {
            if is_unique_violation(&e) {
                drop(tx);
                let active = queries::active_game_id(&self.pool, session.game.user_id).await?;
                return Err(active_game_conflict(active, session.id()));
            }
            return Err(e.into());
        }

        let mut stored = session.clone();
        for question in &mut stored.questions {
            question.id = queries::insert_game_question(&mut tx, question).await?;
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn find_user_game(
        &self,
        user_id: i64,
        game_id: Uuid,
    ) -> Result<Option<GameSession>, StoreError> {
        Ok(queries::find_user_game(&self.pool, user_id, game_id).await?)
    }

    async fn list_games_for_user(&self, user_id: i64) -> Result<Vec<Game>, StoreError> {
        Ok(queries::list_games_for_user(&self.pool, user_id).await?)
    }

    async fn count_games(&self) -> Result<i64, StoreError> {
        Ok(queries::count_games(&self.pool).await?)
    }

    async fn save_game(&self, session: &GameSession) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        if !queries::update_unfinished_game(&mut tx, &session.game).await? {
            tracing::warn!("Game {} was already finished, skipping save", session.id());
            return Err(StoreError::StaleGame(session.id()));
        }

        for question in session.questions.iter().filter(|q| !q.help_hash.is_empty()) {
            queries::update_help_hash(&mut tx, question.id, &question.help_hash).await?;
        }

        if session.is_finished() && session.game.prize > 0 {
            queries::credit_user_balance(&mut tx, session.game.user_id, session.game.prize)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
