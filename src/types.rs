//! Core lesson types.
//!
//! The serialized shape (`{"topic", "items": [{"id", "type", "content"}]}`)
//! is shared by the library store and backup files.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of flashcards a lesson asks for.
pub const FLASHCARD_COUNT: usize = 3;
/// Number of quizzes a lesson asks for.
pub const QUIZ_COUNT: usize = 2;
/// Number of scrambles a lesson asks for.
pub const SCRAMBLE_COUNT: usize = 1;
/// Options every quiz is expected to carry.
pub const QUIZ_OPTION_COUNT: usize = 4;

const ITEM_ID_LEN: usize = 9;
const ITEM_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Exercise kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameType {
    Flashcard,
    Quiz,
    Scramble,
}

impl GameType {
    pub const ALL: [GameType; 3] = [GameType::Flashcard, GameType::Quiz, GameType::Scramble];

    /// Upper-case wire tag (`FLASHCARD`, `QUIZ`, `SCRAMBLE`).
    pub fn as_tag(&self) -> &'static str {
        match self {
            GameType::Flashcard => "FLASHCARD",
            GameType::Quiz => "QUIZ",
            GameType::Scramble => "SCRAMBLE",
        }
    }

    /// Key of the nested payload in a model response (`flashcard`, `quiz`, `scramble`).
    pub fn payload_key(&self) -> &'static str {
        match self {
            GameType::Flashcard => "flashcard",
            GameType::Quiz => "quiz",
            GameType::Scramble => "scramble",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_tag() == tag)
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardContent {
    pub italian: String,
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_hint: Option<String>,
    pub example_sentence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizContent {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

impl QuizContent {
    /// The option `correct_answer_index` points at, if it is in range.
    pub fn correct_option(&self) -> Option<&str> {
        self.options
            .get(self.correct_answer_index)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrambleContent {
    /// Grammatically correct target sentence
    pub sentence: String,
    /// Tokens of `sentence` in shuffled order
    pub words: Vec<String>,
}

/// Payload of a game item; the variant determines the item's [`GameType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameContent {
    Flashcard(FlashcardContent),
    Quiz(QuizContent),
    Scramble(ScrambleContent),
}

impl GameContent {
    pub fn game_type(&self) -> GameType {
        match self {
            GameContent::Flashcard(_) => GameType::Flashcard,
            GameContent::Quiz(_) => GameType::Quiz,
            GameContent::Scramble(_) => GameType::Scramble,
        }
    }

    /// Decode a payload for the given tag.
    pub fn from_value(
        game_type: GameType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match game_type {
            GameType::Flashcard => GameContent::Flashcard(serde_json::from_value(value)?),
            GameType::Quiz => GameContent::Quiz(serde_json::from_value(value)?),
            GameType::Scramble => GameContent::Scramble(serde_json::from_value(value)?),
        })
    }

    fn to_value(&self) -> serde_json::Value {
        let encoded = match self {
            GameContent::Flashcard(c) => serde_json::to_value(c),
            GameContent::Quiz(c) => serde_json::to_value(c),
            GameContent::Scramble(c) => serde_json::to_value(c),
        };
        // Plain derived structs of strings and numbers always encode.
        encoded.unwrap_or(serde_json::Value::Null)
    }
}

/// One exercise unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameItem", into = "RawGameItem")]
pub struct GameItem {
    pub id: String,
    pub content: GameContent,
}

impl GameItem {
    /// Create an item with a freshly generated id.
    pub fn new(content: GameContent) -> Self {
        Self {
            id: generate_item_id(),
            content,
        }
    }

    pub fn game_type(&self) -> GameType {
        self.content.game_type()
    }
}

#[derive(Serialize, Deserialize)]
struct RawGameItem {
    id: String,
    #[serde(rename = "type")]
    game_type: GameType,
    content: serde_json::Value,
}

impl TryFrom<RawGameItem> for GameItem {
    type Error = String;

    fn try_from(raw: RawGameItem) -> Result<Self, Self::Error> {
        let content = GameContent::from_value(raw.game_type, raw.content)
            .map_err(|e| format!("invalid {} content: {}", raw.game_type, e))?;
        Ok(GameItem {
            id: raw.id,
            content,
        })
    }
}

impl From<GameItem> for RawGameItem {
    fn from(item: GameItem) -> Self {
        RawGameItem {
            id: item.id,
            game_type: item.content.game_type(),
            content: item.content.to_value(),
        }
    }
}

/// One generated set of exercises for a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPlan {
    pub topic: String,
    pub items: Vec<GameItem>,
}

/// Model-output quality problem found in a lesson. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityIssue {
    QuizOptionCount { item_id: String, count: usize },
    QuizAnswerOutOfRange { item_id: String, index: usize },
    ScrambleWordsMismatch { item_id: String },
    Composition {
        flashcards: usize,
        quizzes: usize,
        scrambles: usize,
    },
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityIssue::QuizOptionCount { item_id, count } => write!(
                f,
                "quiz {} has {} options (expected {})",
                item_id, count, QUIZ_OPTION_COUNT
            ),
            QualityIssue::QuizAnswerOutOfRange { item_id, index } => {
                write!(f, "quiz {} answer index {} is out of range", item_id, index)
            }
            QualityIssue::ScrambleWordsMismatch { item_id } => {
                write!(f, "scramble {} words do not rebuild its sentence", item_id)
            }
            QualityIssue::Composition {
                flashcards,
                quizzes,
                scrambles,
            } => write!(
                f,
                "lesson has {}/{}/{} flashcard/quiz/scramble items (expected {}/{}/{})",
                flashcards,
                quizzes,
                scrambles,
                FLASHCARD_COUNT,
                QUIZ_COUNT,
                SCRAMBLE_COUNT
            ),
        }
    }
}

impl LessonPlan {
    pub fn new(topic: impl Into<String>, items: Vec<GameItem>) -> Self {
        Self {
            topic: topic.into(),
            items,
        }
    }

    /// Count of items of one kind.
    pub fn count_of(&self, game_type: GameType) -> usize {
        self.items
            .iter()
            .filter(|item| item.game_type() == game_type)
            .count()
    }

    /// Report quality problems in model output without rejecting the lesson.
    pub fn quality_issues(&self) -> Vec<QualityIssue> {
        let mut issues = Vec::new();

        for item in &self.items {
            match &item.content {
                GameContent::Quiz(quiz) => {
                    if quiz.options.len() != QUIZ_OPTION_COUNT {
                        issues.push(QualityIssue::QuizOptionCount {
                            item_id: item.id.clone(),
                            count: quiz.options.len(),
                        });
                    }
                    if quiz.correct_answer_index >= quiz.options.len() {
                        issues.push(QualityIssue::QuizAnswerOutOfRange {
                            item_id: item.id.clone(),
                            index: quiz.correct_answer_index,
                        });
                    }
                }
                GameContent::Scramble(scramble) => {
                    let rebuilt = scramble.words.join(" ");
                    let mut expected: Vec<char> = crate::exercise::normalize_sentence(&scramble.sentence)
                        .chars()
                        .collect();
                    let mut actual: Vec<char> =
                        crate::exercise::normalize_sentence(&rebuilt).chars().collect();
                    expected.sort_unstable();
                    actual.sort_unstable();
                    if expected != actual {
                        issues.push(QualityIssue::ScrambleWordsMismatch {
                            item_id: item.id.clone(),
                        });
                    }
                }
                GameContent::Flashcard(_) => {}
            }
        }

        let flashcards = self.count_of(GameType::Flashcard);
        let quizzes = self.count_of(GameType::Quiz);
        let scrambles = self.count_of(GameType::Scramble);
        if (flashcards, quizzes, scrambles) != (FLASHCARD_COUNT, QUIZ_COUNT, SCRAMBLE_COUNT) {
            issues.push(QualityIssue::Composition {
                flashcards,
                quizzes,
                scrambles,
            });
        }

        issues
    }
}

/// Random 9-character base-36 identifier for list identity.
pub fn generate_item_id() -> String {
    let mut rng = rand::rng();
    (0..ITEM_ID_LEN)
        .map(|_| ITEM_ID_ALPHABET[rng.random_range(0..ITEM_ID_ALPHABET.len())] as char)
        .collect()
}
