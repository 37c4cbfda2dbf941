//! Library presentation: listing table and import report.

use super::lesson::game_type_label;
use super::shared::to_pretty_json;
use crate::error::ApiError;
use crate::library::ImportOutcome;
use crate::types::{GameType, LessonPlan};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde_json::json;

pub fn format_library_list_text(lessons: &[LessonPlan]) -> String {
    if lessons.is_empty() {
        return "La libreria è vuota. Crea una lezione con `itafacile generate <argomento>`."
            .to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    let mut header = vec!["#".to_string(), "Argomento".to_string()];
    header.extend(GameType::ALL.iter().map(|t| game_type_label(*t).to_string()));
    table.set_header(header);
    for (index, lesson) in lessons.iter().enumerate() {
        let mut row = vec![(index + 1).to_string(), lesson.topic.clone()];
        row.extend(GameType::ALL.iter().map(|t| lesson.count_of(*t).to_string()));
        table.add_row(row);
    }
    table.to_string()
}

pub fn format_library_list_json(lessons: &[LessonPlan]) -> Result<String, ApiError> {
    let rows: Vec<serde_json::Value> = lessons
        .iter()
        .map(|lesson| {
            json!({
                "topic": lesson.topic,
                "items": lesson.items.len(),
                "flashcards": lesson.count_of(GameType::Flashcard),
                "quizzes": lesson.count_of(GameType::Quiz),
                "scrambles": lesson.count_of(GameType::Scramble),
            })
        })
        .collect();
    to_pretty_json(&rows)
}

pub fn format_import_outcome(outcome: &ImportOutcome) -> String {
    let mut out = format!("Importate {} nuove lezioni.", outcome.added);
    if outcome.skipped_duplicates > 0 {
        out.push_str(&format!(
            "\n  {} già presenti, ignorate.",
            outcome.skipped_duplicates
        ));
    }
    if outcome.skipped_invalid > 0 {
        out.push_str(&format!(
            "\n  {} elementi non validi, ignorati.",
            outcome.skipped_invalid
        ));
    }
    if outcome.truncated > 0 {
        out.push_str(&format!(
            "\n  {} escluse per il limite della libreria.",
            outcome.truncated
        ));
    }
    out
}
