use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    game::rules::time_limit,
    models::{game_question::HelpKind, question::MAX_LEVEL},
};

/// Status of a game, derived from its fields and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
    Fail,
    Timeout,
    Money,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub id: Uuid,
    pub user_id: i64,
    /// Level of the question being played; `MAX_LEVEL + 1` once the game is won
    pub current_level: i32,
    pub is_failed: bool,
    pub prize: i64,
    pub fifty_fifty_used: bool,
    pub audience_help_used: bool,
    pub friend_call_used: bool,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Game {
    pub fn new(user_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            current_level: 0,
            is_failed: false,
            prize: 0,
            fifty_fifty_used: false,
            audience_help_used: false,
            friend_call_used: false,
            created_at: now,
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn status(&self) -> GameStatus {
        let Some(finished_at) = self.finished_at else {
            return GameStatus::InProgress;
        };

        if self.is_failed {
            if finished_at - self.created_at > time_limit() {
                GameStatus::Timeout
            } else {
                GameStatus::Fail
            }
        } else if self.current_level > MAX_LEVEL {
            GameStatus::Won
        } else {
            GameStatus::Money
        }
    }

    /// Highest level answered correctly, -1 when none
    pub fn previous_level(&self) -> i32 {
        self.current_level - 1
    }

    pub fn help_used(&self, kind: HelpKind) -> bool {
        match kind {
            HelpKind::FiftyFifty => self.fifty_fifty_used,
            HelpKind::AudienceHelp => self.audience_help_used,
            HelpKind::FriendCall => self.friend_call_used,
        }
    }

    pub(crate) fn mark_help_used(&mut self, kind: HelpKind) {
        match kind {
            HelpKind::FiftyFifty => self.fifty_fifty_used = true,
            HelpKind::AudienceHelp => self.audience_help_used = true,
            HelpKind::FriendCall => self.friend_call_used = true,
        }
    }
}
