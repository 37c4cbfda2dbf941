//! Itafacile: Italian L2 Mini-Lessons
//!
//! Generates short Italian lessons (flashcards, quizzes, sentence scrambles)
//! for a topic through a generative model, keeps a local library of them and
//! plays them back one exercise at a time.

pub mod cli;
pub mod config;
pub mod error;
pub mod exercise;
pub mod generation;
pub mod library;
pub mod logging;
pub mod provider;
pub mod session;
pub mod types;
