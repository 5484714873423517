use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::StoreError,
    game::GameSession,
    models::{Game, NewQuestion, Question, User},
};

/// Persistence used by the HTTP layer and the game factory
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, name: &str, is_admin: bool) -> Result<User, StoreError>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    /// Users with the highest balance first
    async fn list_users_by_balance(&self, limit: i64) -> Result<Vec<User>, StoreError>;

    /// Validates the question, including uniqueness of its text, and stores it
    async fn create_question(&self, question: &NewQuestion) -> Result<Question, StoreError>;

    /// A random question of the given level, if any exists
    async fn random_question(&self, level: i32) -> Result<Option<Question>, StoreError>;

    async fn count_questions(&self) -> Result<i64, StoreError>;

    /// Id of the user's unfinished game
    async fn active_game_id(&self, user_id: i64) -> Result<Option<Uuid>, StoreError>;

    /// Stores a new game with its questions in one step and returns it with
    /// ids assigned. Fails with `GameError::ActiveGameExists` when the user
    /// already has an unfinished game, or `StoreError::StaleGame` when the
    /// conflicting game finished before it could be looked up.
    async fn insert_game(&self, session: &GameSession) -> Result<GameSession, StoreError>;

    /// A game only if it belongs to the given user
    async fn find_user_game(
        &self,
        user_id: i64,
        game_id: Uuid,
    ) -> Result<Option<GameSession>, StoreError>;

    /// Newest first
    async fn list_games_for_user(&self, user_id: i64) -> Result<Vec<Game>, StoreError>;

    async fn count_games(&self) -> Result<i64, StoreError>;

    /// Persists progress of an unfinished game. When the game has just
    /// finished its prize is credited to the owner's balance. Fails with
    /// `StoreError::StaleGame` if the stored game was already finished.
    async fn save_game(&self, session: &GameSession) -> Result<(), StoreError>;
}
