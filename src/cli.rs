//! CLI domain: parse, route, help, output, presentation and the interactive player.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod player;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, KeyCommands, LibraryCommands};
pub use player::{PlayStats, Player, Prompter, TerminalPrompter};
pub use presentation::{
    format_import_outcome, format_key_status, format_lesson_json, format_lesson_text,
    format_library_list_json, format_library_list_text,
};
pub use route::{RunContext, STORE_DIR_NAME};
