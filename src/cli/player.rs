//! Interactive player: walks a [`PlaybackSession`] one exercise at a time.
//!
//! Prompts go through [`Prompter`] so the flow can be driven by a script in tests.

use crate::cli::presentation::{
    format_flashcard_back, format_flashcard_front, format_progress, format_quiz_feedback,
    format_scramble_result, format_section_heading, game_type_label,
};
use crate::error::ApiError;
use crate::exercise::{QuizAttempt, ScrambleBoard, ScrambleStatus};
use crate::session::{PlaybackSession, PlaybackState};
use crate::types::{FlashcardContent, GameContent, QuizContent, ScrambleContent};
use tracing::debug;

/// Terminal interaction used by the player
pub trait Prompter {
    /// Pick one of `items`. `None` means the user backed out (Esc / q).
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>, ApiError>;

    fn input(&mut self, prompt: &str) -> Result<String, ApiError>;

    /// Like `input`, without echoing what is typed.
    fn secret(&mut self, prompt: &str) -> Result<String, ApiError>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ApiError>;

    fn say(&mut self, text: &str);
}

fn input_error(e: dialoguer::Error) -> ApiError {
    ApiError::ConfigError(format!("Failed to get user input: {}", e))
}

/// [`Prompter`] backed by `dialoguer` on the current terminal
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>, ApiError> {
        let mut select = dialoguer::Select::new();
        if !prompt.is_empty() {
            select = select.with_prompt(prompt);
        }
        select
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(input_error)
    }

    fn input(&mut self, prompt: &str) -> Result<String, ApiError> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)
    }

    fn secret(&mut self, prompt: &str) -> Result<String, ApiError> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(input_error)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ApiError> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(input_error)
    }

    fn say(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Results of one played lesson
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayStats {
    pub completed: bool,
    pub flashcards_seen: usize,
    pub quizzes_correct: usize,
    pub quizzes_total: usize,
    pub scrambles_solved: usize,
    pub scrambles_total: usize,
}

impl PlayStats {
    pub fn summary(&self) -> String {
        format!(
            "Quiz: {}/{} · Frasi: {}/{} · Flashcard viste: {}",
            self.quizzes_correct,
            self.quizzes_total,
            self.scrambles_solved,
            self.scrambles_total,
            self.flashcards_seen
        )
    }
}

enum Step {
    Next,
    Quit,
}

const NEXT: &str = "Avanti →";
const QUIT: &str = "Esci";

pub struct Player<'p, P: Prompter> {
    prompter: &'p mut P,
}

impl<'p, P: Prompter> Player<'p, P> {
    pub fn new(prompter: &'p mut P) -> Self {
        Self { prompter }
    }

    /// Play from the current item until the lesson completes or the user quits.
    pub fn play(&mut self, session: &mut PlaybackSession) -> Result<PlayStats, ApiError> {
        let mut stats = PlayStats::default();
        if let PlaybackState::Playing { plan, .. } = session.state() {
            self.prompter
                .say(&format_section_heading(&format!("Lezione: {}", plan.topic)));
        }

        loop {
            let Some((cursor, total)) = session.progress() else {
                break;
            };
            let Some(item) = session.current_item().cloned() else {
                stats.completed = matches!(session.state(), PlaybackState::Complete { .. });
                break;
            };
            debug!(item_id = %item.id, cursor, total, "Playing item");
            self.prompter.say(&format!(
                "\n{} · {}",
                format_progress(cursor, total),
                game_type_label(item.game_type())
            ));

            let step = match &item.content {
                GameContent::Flashcard(card) => {
                    stats.flashcards_seen += 1;
                    self.flashcard(card)?
                }
                GameContent::Quiz(quiz) => {
                    stats.quizzes_total += 1;
                    let (correct, step) = self.quiz(quiz)?;
                    stats.quizzes_correct += usize::from(correct);
                    step
                }
                GameContent::Scramble(scramble) => {
                    stats.scrambles_total += 1;
                    let (solved, step) = self.scramble(scramble)?;
                    stats.scrambles_solved += usize::from(solved);
                    step
                }
            };

            match step {
                Step::Next => session.advance(),
                Step::Quit => break,
            }
        }
        Ok(stats)
    }

    fn next_or_quit(&mut self) -> Result<Step, ApiError> {
        let choice = self
            .prompter
            .select("", &[NEXT.to_string(), QUIT.to_string()])?;
        Ok(match choice {
            Some(0) => Step::Next,
            _ => Step::Quit,
        })
    }

    fn flashcard(&mut self, card: &FlashcardContent) -> Result<Step, ApiError> {
        self.prompter.say(&format_flashcard_front(card));
        let choice = self.prompter.select(
            "",
            &["Gira la carta".to_string(), NEXT.to_string(), QUIT.to_string()],
        )?;
        match choice {
            Some(0) => {
                self.prompter.say(&format_flashcard_back(card));
                self.next_or_quit()
            }
            Some(1) => Ok(Step::Next),
            _ => Ok(Step::Quit),
        }
    }

    fn quiz(&mut self, quiz: &QuizContent) -> Result<(bool, Step), ApiError> {
        if quiz.options.is_empty() {
            debug!(question = %quiz.question, "Quiz without options, skipping");
            self.prompter.say(&format!(
                "{}\nQuesto quiz non ha opzioni di risposta.",
                quiz.question
            ));
            return Ok((false, self.next_or_quit()?));
        }
        let Some(choice) = self.prompter.select(&quiz.question, &quiz.options)? else {
            return Ok((false, Step::Quit));
        };
        let mut attempt = QuizAttempt::new(quiz);
        let feedback = attempt.select(choice);
        self.prompter.say(&format_quiz_feedback(&feedback));
        Ok((feedback.correct, self.next_or_quit()?))
    }

    fn scramble(&mut self, content: &ScrambleContent) -> Result<(bool, Step), ApiError> {
        let mut board = ScrambleBoard::new(content);
        loop {
            match board.status() {
                ScrambleStatus::Correct => {
                    self.prompter
                        .say(&format_scramble_result(ScrambleStatus::Correct, board.sentence()));
                    return Ok((true, self.next_or_quit()?));
                }
                ScrambleStatus::Wrong => {
                    self.prompter
                        .say(&format_scramble_result(ScrambleStatus::Wrong, board.sentence()));
                    let choice = self.prompter.select(
                        "",
                        &["Riprova".to_string(), NEXT.to_string(), QUIT.to_string()],
                    )?;
                    match choice {
                        Some(0) => board.reset(),
                        Some(1) => return Ok((false, Step::Next)),
                        _ => return Ok((false, Step::Quit)),
                    }
                }
                ScrambleStatus::Playing => {
                    let answer = board.answer_text();
                    self.prompter.say(&format!(
                        "Frase: {}",
                        if answer.is_empty() { "…" } else { answer.as_str() }
                    ));

                    let mut items: Vec<String> =
                        board.available().iter().map(|t| t.word.clone()).collect();
                    let words = items.len();
                    let can_undo = !board.answer().is_empty();
                    if can_undo {
                        items.push("⌫ Togli l'ultima parola".to_string());
                    }
                    if board.can_check() {
                        items.push("Controlla".to_string());
                    }

                    let Some(choice) = self.prompter.select("Scegli la parola", &items)? else {
                        return Ok((false, Step::Quit));
                    };
                    if choice < words {
                        let id = board.available()[choice].id;
                        board.pick(id);
                    } else if can_undo && choice == words {
                        board.remove(board.answer().len() - 1);
                    } else {
                        board.check();
                    }
                }
            }
        }
    }
}
