//! Integration tests for the itafacile lesson generator

mod cli_commands;
mod library_backup;
mod logging_default;
mod playback;
