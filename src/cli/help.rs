//! CLI command-name contract for logging and routing.

use crate::cli::parse::{Commands, ConfigCommands, KeyCommands, LibraryCommands};

/// Command name string for log records (e.g. "generate", "library.import").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Generate { .. } => "generate".to_string(),
        Commands::Play { .. } => "play".to_string(),
        Commands::Library { command } => format!("library.{}", library_command_name(command)),
        Commands::Key { command } => format!("key.{}", key_command_name(command)),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
        Commands::Share { .. } => "share".to_string(),
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Show => "show",
        ConfigCommands::Init { .. } => "init",
    }
}

pub fn library_command_name(command: &LibraryCommands) -> &'static str {
    match command {
        LibraryCommands::List { .. } => "list",
        LibraryCommands::Show { .. } => "show",
        LibraryCommands::Delete { .. } => "delete",
        LibraryCommands::Export { .. } => "export",
        LibraryCommands::Import { .. } => "import",
    }
}

pub fn key_command_name(command: &KeyCommands) -> &'static str {
    match command {
        KeyCommands::Set { .. } => "set",
        KeyCommands::Clear => "clear",
        KeyCommands::Status { .. } => "status",
    }
}
