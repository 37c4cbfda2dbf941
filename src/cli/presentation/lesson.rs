//! Lesson presentation: printed lessons and the player's per-exercise text.

use super::shared::{format_section_heading, to_pretty_json};
use crate::error::ApiError;
use crate::exercise::{flashcard_faces, QuizFeedback, ScrambleStatus};
use crate::types::{FlashcardContent, GameContent, GameType, LessonPlan};
use owo_colors::OwoColorize;

pub fn game_type_label(game_type: GameType) -> &'static str {
    match game_type {
        GameType::Flashcard => "Flashcard",
        GameType::Quiz => "Quiz",
        GameType::Scramble => "Riordina la frase",
    }
}

pub fn format_progress(cursor: usize, total: usize) -> String {
    format!("Esercizio {}/{}", (cursor + 1).min(total), total)
}

pub fn format_flashcard_front(card: &FlashcardContent) -> String {
    flashcard_faces(card).front
}

pub fn format_flashcard_back(card: &FlashcardContent) -> String {
    flashcard_faces(card).back
}

pub fn format_quiz_feedback(feedback: &QuizFeedback) -> String {
    if feedback.correct {
        format!("{}", "✓ Giusto!".green().bold())
    } else {
        match &feedback.correct_option {
            Some(option) => format!(
                "{} La risposta giusta è: {}",
                "✗ Sbagliato.".red().bold(),
                option
            ),
            None => format!("{}", "✗ Sbagliato.".red().bold()),
        }
    }
}

pub fn format_scramble_result(status: ScrambleStatus, sentence: &str) -> String {
    match status {
        ScrambleStatus::Correct => format!("{} {}", "✓ Perfetto!".green().bold(), sentence),
        ScrambleStatus::Wrong => format!("{}", "✗ Non è giusto, riprova.".red().bold()),
        ScrambleStatus::Playing => String::new(),
    }
}

/// Whole lesson as text, answers included.
pub fn format_lesson_text(plan: &LessonPlan) -> String {
    let mut out = format!(
        "{}\n",
        format_section_heading(&format!("Lezione: {}", plan.topic))
    );
    for (index, item) in plan.items.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {}\n",
            index + 1,
            game_type_label(item.game_type()).bold()
        ));
        match &item.content {
            GameContent::Flashcard(card) => {
                let faces = flashcard_faces(card);
                out.push_str(&format!("   {}\n", faces.front));
                for line in faces.back.lines() {
                    out.push_str(&format!("   {}\n", line));
                }
            }
            GameContent::Quiz(quiz) => {
                out.push_str(&format!("   {}\n", quiz.question));
                for (i, option) in quiz.options.iter().enumerate() {
                    let marker = if i == quiz.correct_answer_index { "✓" } else { " " };
                    out.push_str(&format!("   {} {}) {}\n", marker, option_letter(i), option));
                }
            }
            GameContent::Scramble(scramble) => {
                out.push_str(&format!("   [{}]\n", scramble.words.join("] [")));
                out.push_str(&format!("   → {}\n", scramble.sentence));
            }
        }
    }

    let issues = plan.quality_issues();
    if !issues.is_empty() {
        out.push_str(&format!("\n{}\n", "Avvisi:".yellow()));
        for issue in issues {
            out.push_str(&format!("  - {}\n", issue));
        }
    }
    out
}

pub fn format_lesson_json(plan: &LessonPlan) -> Result<String, ApiError> {
    to_pretty_json(plan)
}

fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
