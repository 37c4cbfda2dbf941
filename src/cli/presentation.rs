//! CLI presentation: text and json formatters per command family.

mod lesson;
mod library;
mod shared;

pub use lesson::{
    format_flashcard_back, format_flashcard_front, format_lesson_json, format_lesson_text,
    format_progress, format_quiz_feedback, format_scramble_result, game_type_label,
};
pub use library::{
    format_import_outcome, format_library_list_json, format_library_list_text,
};
pub use shared::{format_key_status, format_section_heading, to_pretty_json};
