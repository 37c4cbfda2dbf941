//! CLI parsing and command routing against an in-memory store and a fake provider.

use super::test_utils::{sample_plan, LESSON_JSON};
use async_trait::async_trait;
use clap::Parser;
use itafacile::cli::{map_error, Cli, Commands, Prompter, RunContext};
use itafacile::config::{ConfigLoader, ItafacileConfig};
use itafacile::error::ApiError;
use itafacile::library::MemoryKvStore;
use itafacile::provider::{
    CompletionRequest, CompletionResponse, ModelProviderClient, ProviderFactory, TokenUsage,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Provider answering every request with the same lesson.
#[derive(Clone, Default)]
struct FakeProvider {
    requested_models: Arc<Mutex<Vec<String>>>,
    keys: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ModelProviderClient for FakeProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ApiError> {
        self.requested_models.lock().unwrap().push(request.model.clone());
        Ok(CompletionResponse {
            content: LESSON_JSON.to_string(),
            model: request.model,
            usage: TokenUsage::default(),
            finish_reason: Some("STOP".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn list_models(&self) -> Result<Vec<String>, ApiError> {
        Ok(vec!["gemini-2.5-flash".to_string()])
    }
}

impl ProviderFactory for FakeProvider {
    fn create_client(&self, api_key: &str) -> Result<Arc<dyn ModelProviderClient>, ApiError> {
        self.keys.lock().unwrap().push(api_key.to_string());
        Ok(Arc::new(self.clone()))
    }
}

/// Prompter answering from queues; selections are matched by item text.
#[derive(Default)]
struct QueuedPrompter {
    selections: VecDeque<String>,
    inputs: VecDeque<String>,
    confirms: VecDeque<bool>,
    said: Vec<String>,
}

impl QueuedPrompter {
    fn selecting(choices: &[&str]) -> Self {
        Self {
            selections: choices.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl Prompter for QueuedPrompter {
    fn select(&mut self, _prompt: &str, items: &[String]) -> Result<Option<usize>, ApiError> {
        let Some(wanted) = self.selections.pop_front() else {
            return Ok(None);
        };
        Ok(items.iter().position(|item| *item == wanted))
    }

    fn input(&mut self, _prompt: &str) -> Result<String, ApiError> {
        Ok(self.inputs.pop_front().unwrap_or_default())
    }

    fn secret(&mut self, prompt: &str) -> Result<String, ApiError> {
        self.input(prompt)
    }

    fn confirm(&mut self, _prompt: &str, default: bool) -> Result<bool, ApiError> {
        Ok(self.confirms.pop_front().unwrap_or(default))
    }

    fn say(&mut self, text: &str) {
        self.said.push(text.to_string());
    }
}

struct Harness {
    context: RunContext,
    provider: FakeProvider,
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::default();
        let context = RunContext::from_parts(
            ItafacileConfig::default(),
            dir.path().to_path_buf(),
            Arc::new(MemoryKvStore::new()),
            Arc::new(provider.clone()),
        );
        Self {
            context,
            provider,
            dir,
        }
    }

    /// Harness with a stored key, so generation never depends on the environment.
    fn with_key() -> Self {
        let harness = Self::new();
        harness.run(&["key", "set", "test-key-1234"]).unwrap();
        harness
    }

    fn run(&self, args: &[&str]) -> Result<String, ApiError> {
        self.run_with(args, &mut QueuedPrompter::default())
    }

    fn run_with(&self, args: &[&str], prompter: &mut QueuedPrompter) -> Result<String, ApiError> {
        let mut argv = vec!["itafacile"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        self.context.execute_with(&cli.command, prompter)
    }

    fn topics(&self) -> Vec<String> {
        self.context
            .library()
            .list()
            .unwrap()
            .into_iter()
            .map(|lesson| lesson.topic)
            .collect()
    }
}

#[test]
fn parses_global_flags_and_play_variants() {
    let cli = Cli::try_parse_from([
        "itafacile",
        "--data-dir",
        "/tmp/lezioni",
        "--verbose",
        "play",
        "--link",
        "itafacile://play?topic=Cibo&autoplay=true",
    ])
    .unwrap();
    assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/lezioni")));
    assert!(cli.verbose);
    match cli.command {
        Commands::Play {
            topic,
            link,
            from_library,
        } => {
            assert!(topic.is_none());
            assert!(link.unwrap().contains("topic=Cibo"));
            assert!(!from_library);
        }
        other => panic!("expected play, got {:?}", other),
    }

    assert!(Cli::try_parse_from(["itafacile", "play", "Cibo", "--link", "x"]).is_err());
    assert!(Cli::try_parse_from(["itafacile", "play", "Cibo", "--from-library"]).is_err());
}

#[test]
fn export_defaults_to_backup_file_name() {
    let cli = Cli::try_parse_from(["itafacile", "library", "export"]).unwrap();
    match &cli.command {
        Commands::Library { .. } => {}
        other => panic!("expected library, got {:?}", other),
    }
    let debug = format!("{:?}", cli.command);
    assert!(debug.contains("itafacile-backup.json"));
}

#[test]
fn generate_saves_unless_told_not_to() {
    let harness = Harness::with_key();

    let text = harness.run(&["generate", "La frutta"]).unwrap();
    assert!(text.contains("La frutta"));
    assert!(text.contains("mela"));
    assert_eq!(harness.topics(), vec!["La frutta"]);

    harness.run(&["generate", "--no-save", "Il mare"]).unwrap();
    assert_eq!(harness.topics(), vec!["La frutta"]);

    assert_eq!(
        *harness.provider.keys.lock().unwrap(),
        vec!["test-key-1234", "test-key-1234"]
    );
    assert_eq!(
        *harness.provider.requested_models.lock().unwrap(),
        vec!["gemini-2.5-flash", "gemini-2.5-flash"]
    );
}

#[test]
fn generate_json_output() {
    let harness = Harness::with_key();
    let json = harness
        .run(&["generate", "--format", "json", "La frutta"])
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["topic"], "La frutta");
    assert_eq!(value["items"].as_array().unwrap().len(), 6);
}

#[test]
fn unknown_format_is_rejected_at_parse_time() {
    assert!(Cli::try_parse_from(["itafacile", "generate", "Cibo", "--format", "yaml"]).is_err());
    assert!(Cli::try_parse_from(["itafacile", "library", "list", "--format", "yaml"]).is_err());
}

#[test]
fn unknown_format_makes_no_request_and_saves_nothing() {
    let harness = Harness::with_key();
    let command = Commands::Generate {
        topic: "Cibo".to_string(),
        no_save: false,
        format: "yaml".to_string(),
    };

    let err = harness
        .context
        .execute_with(&command, &mut QueuedPrompter::default())
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(harness.provider.requested_models.lock().unwrap().is_empty());
    assert!(harness.topics().is_empty());
}

#[test]
fn blank_topic_is_rejected_before_generation() {
    let harness = Harness::with_key();
    let err = harness.run(&["generate", "   "]).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(harness.provider.requested_models.lock().unwrap().is_empty());
}

#[test]
fn library_list_show_and_delete() {
    let harness = Harness::new();
    harness.context.library().save(&sample_plan("Animali")).unwrap();
    harness.context.library().save(&sample_plan("Cibo")).unwrap();

    let list = harness.run(&["library", "list"]).unwrap();
    assert!(list.find("Cibo").unwrap() < list.find("Animali").unwrap());

    let json = harness.run(&["library", "list", "--format", "json"]).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(rows[0]["topic"], "Cibo");
    assert_eq!(rows[0]["quizzes"], 1);

    let shown = harness.run(&["library", "show", "animali"]).unwrap();
    assert!(shown.contains("Il cane corre."));

    // declined confirmation keeps the lesson
    let mut prompter = QueuedPrompter::default();
    prompter.confirms.push_back(false);
    let declined = harness
        .run_with(&["library", "delete", "cibo"], &mut prompter)
        .unwrap();
    assert!(declined.contains("annullata"));
    assert_eq!(harness.topics(), vec!["Cibo", "Animali"]);

    let deleted = harness.run(&["library", "delete", "CIBO", "--force"]).unwrap();
    assert!(deleted.contains("Cibo"));
    assert_eq!(harness.topics(), vec!["Animali"]);
}

#[test]
fn missing_lesson_maps_to_friendly_message() {
    let harness = Harness::new();
    let err = harness.run(&["library", "show", "Nessuno"]).unwrap_err();
    assert_eq!(map_error(&err), "Nessuna lezione salvata per \"Nessuno\".");
}

#[test]
fn export_and_import_through_cli() {
    let source = Harness::new();
    source.context.library().save(&sample_plan("Animali")).unwrap();
    source.context.library().save(&sample_plan("Cibo")).unwrap();
    let backup = source.dir.path().join("backup.json");

    let exported = source
        .run(&["library", "export", "-o", backup.to_str().unwrap()])
        .unwrap();
    assert!(exported.starts_with("Esportate 2 lezioni"));

    let target = Harness::new();
    target.context.library().save(&sample_plan("animali")).unwrap();
    let report = target
        .run(&["library", "import", backup.to_str().unwrap()])
        .unwrap();
    assert!(report.starts_with("Importate 1 nuove lezioni."));
    assert!(report.contains("1 già presenti"));
    assert_eq!(target.topics(), vec!["animali", "Cibo"]);
}

#[test]
fn key_set_status_and_clear() {
    let harness = Harness::new();

    let saved = harness.run(&["key", "set", "AIzaSyExample1234"]).unwrap();
    assert_eq!(saved, "Chiave API salvata (****1234).");
    assert_eq!(
        harness.context.credentials().get().unwrap().as_deref(),
        Some("AIzaSyExample1234")
    );

    let status = harness.run(&["key", "status"]).unwrap();
    assert!(status.contains("****1234"));
    assert!(!status.contains("AIzaSy"));

    let checked = harness.run(&["key", "status", "--check"]).unwrap();
    assert!(checked.contains("Connessione: OK"));
    assert!(checked.contains("Modello 'gemini-2.5-flash' disponibile"));
    assert!(checked.contains("Modello 'gemini-2.5-flash-lite' disponibile"));

    harness.run(&["key", "clear"]).unwrap();
    assert_eq!(harness.context.credentials().get().unwrap(), None);
}

#[test]
fn key_set_prompts_for_hidden_value() {
    let harness = Harness::new();
    let mut prompter = QueuedPrompter::default();
    prompter.inputs.push_back("  secret-5678  ".to_string());

    let saved = harness.run_with(&["key", "set"], &mut prompter).unwrap();
    assert_eq!(saved, "Chiave API salvata (****5678).");
    assert_eq!(
        harness.context.credentials().get().unwrap().as_deref(),
        Some("secret-5678")
    );
}

#[test]
fn share_prints_autoplay_links() {
    let harness = Harness::new();
    assert_eq!(
        harness.run(&["share", "Il mare"]).unwrap(),
        "itafacile://play?topic=Il%20mare&autoplay=true"
    );

    let classroom = harness
        .run(&["share", "--classroom", "--base-url", "https://app.example.com/", "Il mare"])
        .unwrap();
    assert!(classroom.starts_with("https://classroom.google.com/share?url=https%3A%2F%2Fapp.example.com"));
}

#[test]
fn config_show_prints_effective_toml() {
    let harness = Harness::new();
    let shown = harness.run(&["config", "show"]).unwrap();
    let parsed: ItafacileConfig = toml::from_str(&shown).unwrap();
    assert_eq!(parsed, ItafacileConfig::default());
    assert!(shown.contains("primary_model = \"gemini-2.5-flash\""));
}

#[test]
fn config_init_writes_loadable_defaults_once() {
    let harness = Harness::new();
    let target = harness.dir.path().join("conf").join("config.toml");
    let target_arg = target.to_str().unwrap();

    let written = harness
        .run(&["config", "init", "--output", target_arg])
        .unwrap();
    assert!(written.contains("config.toml"));
    assert_eq!(
        ConfigLoader::load_from_file(&target).unwrap(),
        ItafacileConfig::default()
    );

    let err = harness
        .run(&["config", "init", "--output", target_arg])
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
    harness
        .run(&["config", "init", "--output", target_arg, "--force"])
        .unwrap();
}

#[test]
fn play_generates_saves_and_completes_a_lesson() {
    let harness = Harness::with_key();
    let mut prompter = QueuedPrompter::selecting(&[
        "Gira la carta",
        "Avanti →",
        "Avanti →",
        "Avanti →",
        "la mela",
        "Avanti →",
        "blu",
        "Avanti →",
        "L'albero",
        "è",
        "verde.",
        "Controlla",
        "Avanti →",
    ]);
    prompter.confirms.push_back(false);

    let farewell = harness
        .run_with(&["play", "La frutta"], &mut prompter)
        .unwrap();

    assert_eq!(farewell, "Bravo! Lezione completata. A presto!");
    assert_eq!(harness.topics(), vec!["La frutta"]);
    assert!(prompter.said.iter().any(|line| line.contains("Quiz: 1/2")));
    assert!(prompter.said.iter().any(|line| line.contains("La mela è rossa.")));
}

#[test]
fn play_from_link_uses_link_topic() {
    let harness = Harness::with_key();
    let mut prompter = QueuedPrompter::selecting(&["Esci"]);

    let farewell = harness
        .run_with(
            &["play", "--link", "itafacile://play?topic=Il+bosco&autoplay=true"],
            &mut prompter,
        )
        .unwrap();

    assert_eq!(farewell, "A presto!");
    assert_eq!(harness.topics(), vec!["Il bosco"]);
}

#[test]
fn play_from_empty_library_ends_quietly() {
    let harness = Harness::new();
    let mut prompter = QueuedPrompter::default();

    let farewell = harness
        .run_with(&["play", "--from-library"], &mut prompter)
        .unwrap();

    assert_eq!(farewell, "A presto!");
    assert!(prompter.said.iter().any(|line| line.contains("vuota")));
}

#[test]
fn play_rejects_link_without_topic() {
    let harness = Harness::new();
    let err = harness
        .run(&["play", "--link", "itafacile://play?autoplay=true"])
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
