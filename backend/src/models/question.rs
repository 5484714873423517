use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ValidationErrors;

/// Highest question level; answering it correctly wins the game
pub const MAX_LEVEL: i32 = 14;
/// Every game draws one question for each of these levels
pub const QUESTION_LEVELS: RangeInclusive<i32> = 0..=MAX_LEVEL;
/// `answer1` always holds the correct answer
pub const CORRECT_SLOT: i16 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub level: i32,
    pub answer1: String,
    pub answer2: String,
    pub answer3: String,
    pub answer4: String,
}

impl Question {
    /// Answer text stored in the given slot (1..=4)
    pub fn answer(&self, slot: i16) -> Option<&str> {
        match slot {
            1 => Some(&self.answer1),
            2 => Some(&self.answer2),
            3 => Some(&self.answer3),
            4 => Some(&self.answer4),
            _ => None,
        }
    }
}

/// A question that has not been stored yet
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub text: String,
    pub level: i32,
    pub answer1: String,
    pub answer2: String,
    pub answer3: String,
    pub answer4: String,
}

impl NewQuestion {
    /// Build a question from its answers; the first one is the correct answer
    pub fn from_answers(text: impl Into<String>, level: i32, answers: [String; 4]) -> Self {
        let [answer1, answer2, answer3, answer4] = answers;
        Self {
            text: text.into(),
            level,
            answer1,
            answer2,
            answer3,
            answer4,
        }
    }

    /// Checks everything except uniqueness of `text`, which the store enforces
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.text.trim().is_empty() {
            errors.add("text", "can't be blank");
        }
        if !QUESTION_LEVELS.contains(&self.level) {
            errors.add("level", "is not included in the list");
        }
        for (field, answer) in [
            ("answer1", &self.answer1),
            ("answer2", &self.answer2),
            ("answer3", &self.answer3),
            ("answer4", &self.answer4),
        ] {
            if answer.trim().is_empty() {
                errors.add(field, "can't be blank");
            }
        }

        errors.into_result()
    }
}
