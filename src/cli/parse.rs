//! CLI parse: clap types for itafacile. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// itafacile - AI-generated Italian mini-lessons for L2 learners
#[derive(Parser, Debug)]
#[command(name = "itafacile")]
#[command(about = "Generate and play short Italian lessons: flashcards, quizzes and sentence scrambles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config file)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the lesson library and stored key
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a lesson for a topic and print it
    Generate {
        /// Lesson topic, e.g. "la frutta"
        topic: String,
        /// Do not save the lesson in the library
        #[arg(long)]
        no_save: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Play a lesson interactively
    Play {
        /// Topic to generate and play (prompted when omitted)
        topic: Option<String>,
        /// Shared link (`...?topic=...&autoplay=true`) to start from
        #[arg(long, conflicts_with = "topic")]
        link: Option<String>,
        /// Pick a saved lesson instead of generating one
        #[arg(long, conflicts_with_all = ["topic", "link"])]
        from_library: bool,
    },
    /// Manage saved lessons
    Library {
        #[command(subcommand)]
        command: LibraryCommands,
    },
    /// Manage the Gemini API key
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print a link that opens and starts the lesson for a topic
    Share {
        /// Lesson topic
        topic: String,
        /// Base URL the link points at
        #[arg(long, default_value = crate::session::DEFAULT_SHARE_BASE_URL)]
        base_url: String,
        /// Wrap the link in a Google Classroom share URL
        #[arg(long)]
        classroom: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum LibraryCommands {
    /// List saved lessons, most recent first
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Show the exercises of a saved lesson
    Show {
        /// Topic (case-insensitive)
        topic: String,
    },
    /// Delete a saved lesson
    Delete {
        /// Topic (case-insensitive)
        topic: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Write the library to a JSON backup file
    Export {
        /// Backup file path
        #[arg(long, short, default_value = crate::library::DEFAULT_BACKUP_FILE)]
        output: PathBuf,
    },
    /// Merge lessons from a JSON backup file
    Import {
        /// Backup file path
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// Save the API key (prompted when omitted; empty clears it)
    Set {
        value: Option<String>,
    },
    /// Forget the saved API key
    Clear,
    /// Show which key would be used
    Status {
        /// Call the provider to verify the key and the configured models
        #[arg(long)]
        check: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Write a configuration file with the default values
    Init {
        /// Target file (defaults to the global config file)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
