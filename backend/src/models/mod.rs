pub mod game;
pub mod game_question;
pub mod question;
pub mod user;

pub use game::{Game, GameStatus};
pub use game_question::{is_slot_permutation, AnswerKey, GameQuestion, HelpHash, HelpKind};
pub use question::{NewQuestion, Question, CORRECT_SLOT, MAX_LEVEL, QUESTION_LEVELS};
pub use user::{User, UserSummary};
