use chrono::{DateTime, Utc};
use rand::{seq::SliceRandom, Rng};
use uuid::Uuid;

use crate::{
    error::GameError,
    game::rules::{prize_for_level, time_limit},
    models::{
        AnswerKey, Game, GameQuestion, GameStatus, HelpKind, Question, MAX_LEVEL, QUESTION_LEVELS,
    },
};

/// What happened to an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Moved on to the next level
    Correct,
    /// Last level answered, top prize taken
    Won,
    Wrong,
    /// Time limit already exceeded; the answer was not checked
    TimedOut,
}

impl AnswerOutcome {
    pub fn is_correct(self) -> bool {
        matches!(self, AnswerOutcome::Correct | AnswerOutcome::Won)
    }
}

/// A game together with its questions ordered by level
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub game: Game,
    pub questions: Vec<GameQuestion>,
}

impl GameSession {
    /// Start a game from one question per level, shuffling each question's
    /// answers under the letters a..d
    pub fn start(
        user_id: i64,
        mut questions: Vec<Question>,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Result<Self, GameError> {
        questions.retain(|q| QUESTION_LEVELS.contains(&q.level));
        questions.sort_by_key(|q| q.level);
        questions.dedup_by_key(|q| q.level);
        for level in QUESTION_LEVELS {
            if !questions.iter().any(|q| q.level == level) {
                return Err(GameError::MissingQuestion(level));
            }
        }

        let game = Game::new(user_id, now);
        let questions = questions
            .into_iter()
            .map(|question| {
                let mut slots: [i16; 4] = [1, 2, 3, 4];
                slots.shuffle(rng);
                GameQuestion::new(game.id, question, slots)
            })
            .collect();

        Ok(Self { game, questions })
    }

    pub fn id(&self) -> Uuid {
        self.game.id
    }

    pub fn status(&self) -> GameStatus {
        self.game.status()
    }

    pub fn is_finished(&self) -> bool {
        self.game.is_finished()
    }

    pub fn current_level(&self) -> i32 {
        self.game.current_level
    }

    pub fn previous_level(&self) -> i32 {
        self.game.previous_level()
    }

    pub fn current_game_question(&self) -> Option<&GameQuestion> {
        self.question_at(self.game.current_level)
    }

    pub fn previous_game_question(&self) -> Option<&GameQuestion> {
        self.question_at(self.game.previous_level())
    }

    fn question_at(&self, level: i32) -> Option<&GameQuestion> {
        self.questions.iter().find(|q| q.level() == level)
    }

    fn current_game_question_mut(&mut self) -> Option<&mut GameQuestion> {
        let level = self.game.current_level;
        self.questions.iter_mut().find(|q| q.level() == level)
    }

    pub fn answer_current_question(
        &mut self,
        key: AnswerKey,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        if self.time_out(now) {
            return Ok(AnswerOutcome::TimedOut);
        }

        let correct = self
            .current_game_question()
            .ok_or(GameError::MissingQuestion(self.game.current_level))?
            .answer_correct(key);

        if !correct {
            self.finish(prize_for_level(self.previous_level()), true, now);
            return Ok(AnswerOutcome::Wrong);
        }

        self.game.current_level += 1;
        if self.previous_level() == MAX_LEVEL {
            self.finish(prize_for_level(MAX_LEVEL), false, now);
            Ok(AnswerOutcome::Won)
        } else {
            Ok(AnswerOutcome::Correct)
        }
    }

    /// Stop playing and keep the prize of the last answered level.
    /// Returns the prize the game finished with.
    pub fn take_money(&mut self, now: DateTime<Utc>) -> Result<i64, GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        if !self.time_out(now) {
            self.finish(prize_for_level(self.previous_level()), false, now);
        }
        Ok(self.game.prize)
    }

    pub fn use_help(&mut self, kind: HelpKind, rng: &mut impl Rng) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        if self.game.help_used(kind) {
            return Err(GameError::HelpAlreadyUsed(kind));
        }

        let level = self.game.current_level;
        let question = self
            .current_game_question_mut()
            .ok_or(GameError::MissingQuestion(level))?;
        if question.help_hash.contains(kind) {
            return Err(GameError::HelpAlreadyUsed(kind));
        }
        match kind {
            HelpKind::FiftyFifty => question.add_fifty_fifty(rng),
            HelpKind::AudienceHelp => question.add_audience_help(rng),
            HelpKind::FriendCall => question.add_friend_call(rng),
        }
        self.game.mark_help_used(kind);

        tracing::debug!("Game {} used {} at level {}", self.game.id, kind, level);
        Ok(())
    }

    /// Fails the game when the time limit has passed
    fn time_out(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.game.created_at > time_limit() {
            self.finish(prize_for_level(self.previous_level()), true, now);
            true
        } else {
            false
        }
    }

    fn finish(&mut self, prize: i64, failed: bool, now: DateTime<Utc>) {
        self.game.prize = prize;
        self.game.is_failed = failed;
        self.game.finished_at = Some(now);

        tracing::info!(
            "Game {} finished with status {:?} at level {}, prize {}",
            self.game.id,
            self.game.status(),
            self.game.current_level,
            prize
        );
    }
}
