// Game engine modules

pub mod factory;
pub mod help;
pub mod rules;
pub mod session;

pub use factory::create_game_for_user;
pub use help::HelpGenerator;
pub use session::{AnswerOutcome, GameSession};
