use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use rand::seq::IndexedRandom;
use uuid::Uuid;

use crate::{
    db::Store,
    error::{GameError, StoreError, ValidationErrors},
    game::GameSession,
    models::{Game, NewQuestion, Question, User},
};

/// Store kept in process memory, used when no database is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_user_id: AtomicI64,
    next_question_id: AtomicI64,
    next_game_question_id: AtomicI64,
    users: DashMap<i64, User>,
    questions: DashMap<i64, Question>,
    /// Index from question text to question id for uniqueness checks
    question_texts: DashMap<String, i64>,
    games: DashMap<Uuid, GameSession>,
    /// Index from user id to that user's unfinished game
    active_games: DashMap<i64, Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn pick_random_question(&self, level: i32) -> Option<Question> {
        let candidates: Vec<i64> = self
            .questions
            .iter()
            .filter(|q| q.level == level)
            .map(|q| q.id)
            .collect();
        let id = *candidates.choose(&mut rand::rng())?;
        self.questions.get(&id).map(|q| q.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, name: &str, is_admin: bool) -> Result<User, StoreError> {
        User::validate_name(name)?;

        let user = User {
            id: Self::next_id(&self.next_user_id),
            name: name.trim().to_string(),
            balance: 0,
            is_admin,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }

    async fn list_users_by_balance(&self, limit: i64) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| b.balance.cmp(&a.balance).then(a.id.cmp(&b.id)));
        users.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(users)
    }

    async fn create_question(&self, question: &NewQuestion) -> Result<Question, StoreError> {
        question.validate()?;

        match self.question_texts.entry(question.text.clone()) {
            Entry::Occupied(_) => {
                let mut errors = ValidationErrors::new();
                errors.add("text", "has already been taken");
                Err(errors.into())
            }
            Entry::Vacant(entry) => {
                let stored = Question {
                    id: Self::next_id(&self.next_question_id),
                    text: question.text.clone(),
                    level: question.level,
                    answer1: question.answer1.clone(),
                    answer2: question.answer2.clone(),
                    answer3: question.answer3.clone(),
                    answer4: question.answer4.clone(),
                };
                self.questions.insert(stored.id, stored.clone());
                entry.insert(stored.id);
                Ok(stored)
            }
        }
    }

    async fn random_question(&self, level: i32) -> Result<Option<Question>, StoreError> {
        Ok(self.pick_random_question(level))
    }

    async fn count_questions(&self) -> Result<i64, StoreError> {
        Ok(self.questions.len() as i64)
    }

    async fn active_game_id(&self, user_id: i64) -> Result<Option<Uuid>, StoreError> {
        Ok(self.active_games.get(&user_id).map(|id| *id))
    }

    async fn insert_game(&self, session: &GameSession) -> Result<GameSession, StoreError> {
        let user_id = session.game.user_id;
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::UserNotFound(user_id));
        }

        match self.active_games.entry(user_id) {
            Entry::Occupied(entry) => Err(GameError::ActiveGameExists(*entry.get()).into()),
            Entry::Vacant(entry) => {
                let mut stored = session.clone();
                for question in &mut stored.questions {
                    question.id = Self::next_id(&self.next_game_question_id);
                }
                self.games.insert(stored.id(), stored.clone());
                entry.insert(stored.id());
                Ok(stored)
            }
        }
    }

    async fn find_user_game(
        &self,
        user_id: i64,
        game_id: Uuid,
    ) -> Result<Option<GameSession>, StoreError> {
        Ok(self
            .games
            .get(&game_id)
            .filter(|session| session.game.user_id == user_id)
            .map(|session| session.clone()))
    }

    async fn list_games_for_user(&self, user_id: i64) -> Result<Vec<Game>, StoreError> {
        let mut games: Vec<Game> = self
            .games
            .iter()
            .filter(|session| session.game.user_id == user_id)
            .map(|session| session.game.clone())
            .collect();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(games)
    }

    async fn count_games(&self) -> Result<i64, StoreError> {
        Ok(self.games.len() as i64)
    }

    async fn save_game(&self, session: &GameSession) -> Result<(), StoreError> {
        let game_id = session.id();
        {
            let mut stored = self
                .games
                .get_mut(&game_id)
                .ok_or(StoreError::StaleGame(game_id))?;
            if stored.is_finished() {
                return Err(StoreError::StaleGame(game_id));
            }
            *stored = session.clone();
        }

        if session.is_finished() {
            let user_id = session.game.user_id;
            self.active_games.remove(&user_id);
            if let Some(mut user) = self.users.get_mut(&user_id) {
                user.balance += session.game.prize;
            }
        }
        Ok(())
    }
}
