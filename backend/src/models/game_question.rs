use std::{collections::BTreeMap, fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::GameError,
    game::HelpGenerator,
    models::question::{Question, CORRECT_SLOT},
};

/// Letter a player picks an answer by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    pub const ALL: [AnswerKey; 4] = [AnswerKey::A, AnswerKey::B, AnswerKey::C, AnswerKey::D];

    pub fn index(self) -> usize {
        match self {
            AnswerKey::A => 0,
            AnswerKey::B => 1,
            AnswerKey::C => 2,
            AnswerKey::D => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerKey::A => "a",
            AnswerKey::B => "b",
            AnswerKey::C => "c",
            AnswerKey::D => "d",
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerKey {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(AnswerKey::A),
            "b" => Ok(AnswerKey::B),
            "c" => Ok(AnswerKey::C),
            "d" => Ok(AnswerKey::D),
            _ => Err(GameError::UnknownAnswer(s.to_string())),
        }
    }
}

/// One-time aids available in every game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelpKind {
    FiftyFifty,
    AudienceHelp,
    FriendCall,
}

impl HelpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HelpKind::FiftyFifty => "fifty_fifty",
            HelpKind::AudienceHelp => "audience_help",
            HelpKind::FriendCall => "friend_call",
        }
    }
}

impl fmt::Display for HelpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HelpKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fifty_fifty" => Ok(HelpKind::FiftyFifty),
            "audience_help" => Ok(HelpKind::AudienceHelp),
            "friend_call" => Ok(HelpKind::FriendCall),
            _ => Err(GameError::UnknownHelp(s.to_string())),
        }
    }
}

/// Results revealed by the hints used on a question.
/// Stored as a JSON object; unused kinds are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpHash {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fifty_fifty: Option<[AnswerKey; 2]>,
    /// Percentage of the audience voting for each letter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_help: Option<BTreeMap<AnswerKey, u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friend_call: Option<String>,
}

impl HelpHash {
    pub fn is_empty(&self) -> bool {
        self.fifty_fifty.is_none() && self.audience_help.is_none() && self.friend_call.is_none()
    }

    pub fn contains(&self, kind: HelpKind) -> bool {
        match kind {
            HelpKind::FiftyFifty => self.fifty_fifty.is_some(),
            HelpKind::AudienceHelp => self.audience_help.is_some(),
            HelpKind::FriendCall => self.friend_call.is_some(),
        }
    }

    /// Letters still in play after fifty-fifty removed two of them
    pub fn remaining_keys(&self) -> Vec<AnswerKey> {
        match self.fifty_fifty {
            Some(pair) => pair.to_vec(),
            None => AnswerKey::ALL.to_vec(),
        }
    }
}

/// A question placed in a game at its level, with the letters shuffled
#[derive(Debug, Clone, PartialEq)]
pub struct GameQuestion {
    pub id: i64,
    pub game_id: Uuid,
    pub question: Question,
    /// Answer slot shown under letters a, b, c and d
    pub slots: [i16; 4],
    pub help_hash: HelpHash,
}

/// True when `slots` holds each of 1..=4 exactly once
pub fn is_slot_permutation(slots: &[i16; 4]) -> bool {
    let mut sorted = *slots;
    sorted.sort_unstable();
    sorted == [1, 2, 3, 4]
}

impl GameQuestion {
    pub fn new(game_id: Uuid, question: Question, slots: [i16; 4]) -> Self {
        Self {
            id: 0,
            game_id,
            question,
            slots,
            help_hash: HelpHash::default(),
        }
    }

    pub fn level(&self) -> i32 {
        self.question.level
    }

    pub fn text(&self) -> &str {
        &self.question.text
    }

    pub fn slot(&self, key: AnswerKey) -> i16 {
        self.slots[key.index()]
    }

    /// Answer text shown under each letter
    pub fn variants(&self) -> BTreeMap<AnswerKey, &str> {
        AnswerKey::ALL
            .into_iter()
            .filter_map(|key| self.question.answer(self.slot(key)).map(|text| (key, text)))
            .collect()
    }

    pub fn answer_correct(&self, key: AnswerKey) -> bool {
        self.slot(key) == CORRECT_SLOT
    }

    pub fn correct_answer_key(&self) -> AnswerKey {
        // Slots are a permutation of 1..=4, so exactly one letter matches
        AnswerKey::ALL
            .into_iter()
            .find(|key| self.answer_correct(*key))
            .unwrap_or(AnswerKey::A)
    }

    pub fn correct_answer(&self) -> &str {
        &self.question.answer1
    }

    pub fn add_fifty_fifty(&mut self, rng: &mut impl Rng) {
        let pair = HelpGenerator::fifty_fifty(self.correct_answer_key(), rng);
        self.help_hash.fifty_fifty = Some(pair);
    }

    pub fn add_audience_help(&mut self, rng: &mut impl Rng) {
        let keys = self.help_hash.remaining_keys();
        let distribution =
            HelpGenerator::audience_distribution(&keys, self.correct_answer_key(), rng);
        self.help_hash.audience_help = Some(distribution);
    }

    pub fn add_friend_call(&mut self, rng: &mut impl Rng) {
        let keys = self.help_hash.remaining_keys();
        let message = HelpGenerator::friend_call(&keys, self.correct_answer_key(), rng);
        self.help_hash.friend_call = Some(message);
    }
}
