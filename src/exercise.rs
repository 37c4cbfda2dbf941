//! Exercise mechanics: quiz answers, flashcard faces and the scramble word bank.

use crate::types::{FlashcardContent, QuizContent, ScrambleContent};
use rand::seq::SliceRandom;
use unicode_normalization::UnicodeNormalization;

const SENTENCE_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

/// Canonical form for comparing scramble answers.
///
/// NFC-normalized, lower-cased, without `.,!?;:` and with all whitespace
/// removed, so "l' albero" and "l'albero" compare equal.
pub fn normalize_sentence(text: &str) -> String {
    let stripped: String = text
        .nfc()
        .flat_map(char::to_lowercase)
        .filter(|c| !SENTENCE_PUNCTUATION.contains(c) && !c.is_whitespace())
        .collect();
    // removing whitespace can leave a combining mark next to a new base
    stripped.nfc().collect()
}

/// Whether an assembled answer matches the target sentence.
pub fn sentences_match(answer: &str, target: &str) -> bool {
    normalize_sentence(answer) == normalize_sentence(target)
}

/// Outcome of answering a quiz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizFeedback {
    pub selected: usize,
    pub correct: bool,
    /// Text of the correct option, when the index is in range
    pub correct_option: Option<String>,
}

/// A quiz in play. The first selection locks the answer.
#[derive(Debug, Clone)]
pub struct QuizAttempt<'a> {
    quiz: &'a QuizContent,
    selected: Option<usize>,
}

impl<'a> QuizAttempt<'a> {
    pub fn new(quiz: &'a QuizContent) -> Self {
        Self {
            quiz,
            selected: None,
        }
    }

    /// Select an option. Later selections return the locked feedback unchanged.
    pub fn select(&mut self, index: usize) -> QuizFeedback {
        let selected = *self.selected.get_or_insert(index);
        QuizFeedback {
            selected,
            correct: selected == self.quiz.correct_answer_index,
            correct_option: self.quiz.correct_option().map(str::to_string),
        }
    }

    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }
}

/// Front and back of a flashcard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardFaces {
    pub front: String,
    pub back: String,
}

pub fn flashcard_faces(card: &FlashcardContent) -> FlashcardFaces {
    let front = format!("{}  {}", card.emoji, card.italian);
    let back = match card.native_hint.as_deref().filter(|h| !h.trim().is_empty()) {
        Some(hint) => format!("({})\n\"{}\"", hint, card.example_sentence),
        None => format!("\"{}\"", card.example_sentence),
    };
    FlashcardFaces { front, back }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrambleStatus {
    Playing,
    Correct,
    Wrong,
}

/// A word token with a stable identity, so duplicate words stay distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordToken {
    pub id: usize,
    pub word: String,
}

/// Word bank and answer line for a scramble exercise
#[derive(Debug, Clone)]
pub struct ScrambleBoard {
    sentence: String,
    words: Vec<String>,
    available: Vec<WordToken>,
    answer: Vec<WordToken>,
    status: ScrambleStatus,
}

impl ScrambleBoard {
    /// Board with the word bank shuffled.
    pub fn new(content: &ScrambleContent) -> Self {
        let mut board = Self::unshuffled(content);
        board.available.shuffle(&mut rand::rng());
        board
    }

    /// Board with the word bank in the order the words were given.
    pub fn unshuffled(content: &ScrambleContent) -> Self {
        Self {
            sentence: content.sentence.clone(),
            words: content.words.clone(),
            available: tokens(&content.words),
            answer: Vec::new(),
            status: ScrambleStatus::Playing,
        }
    }

    pub fn available(&self) -> &[WordToken] {
        &self.available
    }

    pub fn answer(&self) -> &[WordToken] {
        &self.answer
    }

    pub fn status(&self) -> ScrambleStatus {
        self.status
    }

    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// Answer line as text.
    pub fn answer_text(&self) -> String {
        self.answer
            .iter()
            .map(|t| t.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Move a token from the bank to the end of the answer line.
    pub fn pick(&mut self, token_id: usize) -> bool {
        if self.status != ScrambleStatus::Playing {
            return false;
        }
        match self.available.iter().position(|t| t.id == token_id) {
            Some(pos) => {
                let token = self.available.remove(pos);
                self.answer.push(token);
                true
            }
            None => false,
        }
    }

    /// Return the token at `position` of the answer line to the bank.
    pub fn remove(&mut self, position: usize) -> bool {
        if self.status != ScrambleStatus::Playing || position >= self.answer.len() {
            return false;
        }
        let token = self.answer.remove(position);
        self.available.push(token);
        true
    }

    /// Checking is allowed once every word is on the answer line.
    pub fn can_check(&self) -> bool {
        self.status == ScrambleStatus::Playing && self.available.is_empty()
    }

    pub fn check(&mut self) -> ScrambleStatus {
        if !self.can_check() {
            return self.status;
        }
        self.status = if sentences_match(&self.answer_text(), &self.sentence) {
            ScrambleStatus::Correct
        } else {
            ScrambleStatus::Wrong
        };
        self.status
    }

    /// Put every word back in the bank, reshuffled.
    pub fn reset(&mut self) {
        self.available = tokens(&self.words);
        self.available.shuffle(&mut rand::rng());
        self.answer.clear();
        self.status = ScrambleStatus::Playing;
    }
}

fn tokens(words: &[String]) -> Vec<WordToken> {
    words
        .iter()
        .enumerate()
        .map(|(id, word)| WordToken {
            id,
            word: word.clone(),
        })
        .collect()
}
