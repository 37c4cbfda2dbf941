//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::{Commands, ConfigCommands, KeyCommands, LibraryCommands};
use crate::cli::player::{PlayStats, Player, Prompter, TerminalPrompter};
use crate::cli::presentation::{
    format_import_outcome, format_key_status, format_lesson_json, format_lesson_text,
    format_library_list_json, format_library_list_text,
};
use crate::config::{global_config_path, ConfigLoader, ItafacileConfig};
use crate::error::{ApiError, GenerationError, GenerationErrorKind, LibraryError};
use crate::generation::credential::mask_credential;
use crate::generation::{classify_api_error, AttemptPlan, CredentialChain, LessonGenerator};
use crate::library::{CredentialStore, KvStore, Library, SledKvStore};
use crate::provider::{GeminiProviderFactory, ProviderFactory};
use crate::session::{
    classroom_share_url, share_url, DeepLink, PlaybackSession, PlaybackState,
};
use crate::types::LessonPlan;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Directory under the data dir holding the sled database
pub const STORE_DIR_NAME: &str = "store";

/// Runtime context for CLI execution: configuration, persistence and the provider factory.
pub struct RunContext {
    config: ItafacileConfig,
    data_dir: PathBuf,
    library: Library,
    credentials: CredentialStore,
    factory: Arc<dyn ProviderFactory>,
}

impl RunContext {
    /// Load configuration and open the store under the resolved data directory.
    pub fn new(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load_with(config_path.as_deref())?;
        let data_dir = config.resolve_data_dir(data_dir.as_deref())?;
        let store = Arc::new(SledKvStore::open(data_dir.join(STORE_DIR_NAME))?);
        let factory = Arc::new(GeminiProviderFactory::new(config.provider.clone()));
        info!(data_dir = %data_dir.display(), "Opened lesson store");
        Ok(Self::from_parts(config, data_dir, store, factory))
    }

    /// Assemble a context from already-built parts.
    pub fn from_parts(
        config: ItafacileConfig,
        data_dir: PathBuf,
        store: Arc<dyn KvStore>,
        factory: Arc<dyn ProviderFactory>,
    ) -> Self {
        let library = Library::new(Arc::clone(&store), config.library.clone());
        let credentials = CredentialStore::new(store);
        Self {
            config,
            data_dir,
            library,
            credentials,
            factory,
        }
    }

    pub fn config(&self) -> &ItafacileConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Execute a CLI command via the single route table, prompting on the terminal.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        self.execute_with(command, &mut TerminalPrompter)
    }

    /// Execute a CLI command with the given prompter.
    pub fn execute_with<P: Prompter>(
        &self,
        command: &Commands,
        prompter: &mut P,
    ) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        info!(command = %name, "Executing command");
        let result = self.execute_inner(command, prompter);
        match &result {
            Ok(_) => info!(
                command = %name,
                duration_ms = started.elapsed().as_millis() as u64,
                "Command finished"
            ),
            Err(e) => warn!(command = %name, error = %e, "Command failed"),
        }
        result
    }

    fn execute_inner<P: Prompter>(
        &self,
        command: &Commands,
        prompter: &mut P,
    ) -> Result<String, ApiError> {
        match command {
            Commands::Generate {
                topic,
                no_save,
                format,
            } => self.handle_generate(topic, *no_save, format),
            Commands::Play {
                topic,
                link,
                from_library,
            } => self.handle_play(topic.as_deref(), link.as_deref(), *from_library, prompter),
            Commands::Library { command } => self.handle_library_command(command, prompter),
            Commands::Key { command } => self.handle_key_command(command, prompter),
            Commands::Config { command } => self.handle_config_command(command),
            Commands::Share {
                topic,
                base_url,
                classroom,
            } => handle_share(topic, base_url, *classroom),
        }
    }

    fn generator(&self) -> Result<LessonGenerator, ApiError> {
        let credentials = CredentialChain::from_environment(&self.credentials)?;
        Ok(LessonGenerator::new(
            credentials,
            Arc::clone(&self.factory),
            AttemptPlan::from_config(&self.config.provider),
        )
        .with_options(self.config.provider.default_options.clone()))
    }

    /// Generate a lesson on a private runtime. Nothing is saved.
    pub fn generate_lesson(&self, topic: &str) -> Result<LessonPlan, ApiError> {
        let generator = self.generator()?;
        block_on(generator.generate(topic))?.map_err(ApiError::from)
    }

    fn handle_generate(&self, topic: &str, no_save: bool, format: &str) -> Result<String, ApiError> {
        let topic = require_topic(topic)?;
        let format = OutputFormat::parse(format)?;
        let plan = self.generate_lesson(topic)?;
        if !no_save {
            self.library.save(&plan)?;
        }
        match format {
            OutputFormat::Json => format_lesson_json(&plan),
            OutputFormat::Text => Ok(format_lesson_text(&plan)),
        }
    }

    fn handle_play<P: Prompter>(
        &self,
        topic: Option<&str>,
        link: Option<&str>,
        from_library: bool,
        prompter: &mut P,
    ) -> Result<String, ApiError> {
        let mut session = match link {
            Some(url) => {
                let link = DeepLink::parse(url).ok_or_else(|| {
                    ApiError::InvalidInput(
                        "Link non valido: manca il parametro topic.".to_string(),
                    )
                })?;
                PlaybackSession::with_deep_link(link)
            }
            None => PlaybackSession::new(),
        };
        let mut pending_topic = topic.map(str::to_string);
        let mut last_stats: Option<PlayStats> = None;

        loop {
            if from_library {
                if !self.pick_from_library(&mut session, prompter)? {
                    break;
                }
            } else if !self.prepare_generated(&mut session, pending_topic.take(), prompter)? {
                break;
            }

            if !matches!(session.state(), PlaybackState::Playing { .. }) {
                continue;
            }
            let stats = Player::new(prompter).play(&mut session)?;
            prompter.say(&format!("\n{}", stats.summary()));
            let completed = stats.completed;
            last_stats = Some(stats);
            if !completed || !prompter.confirm("Un'altra lezione?", false)? {
                break;
            }
            session.restart();
        }

        Ok(match last_stats {
            Some(stats) if stats.completed => "Bravo! Lezione completata. A presto!".to_string(),
            _ => "A presto!".to_string(),
        })
    }

    /// Load a saved lesson chosen by the user. `false` when there is nothing to play.
    fn pick_from_library<P: Prompter>(
        &self,
        session: &mut PlaybackSession,
        prompter: &mut P,
    ) -> Result<bool, ApiError> {
        let mut lessons = self.library.list()?;
        if lessons.is_empty() {
            prompter.say("La libreria è vuota.");
            return Ok(false);
        }
        let topics: Vec<String> = lessons.iter().map(|l| l.topic.clone()).collect();
        match prompter.select("Scegli una lezione", &topics)? {
            Some(index) if index < lessons.len() => {
                session.load(lessons.swap_remove(index));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Resolve a topic (deep link, argument or prompt) and generate its lesson.
    /// `false` when the user gives up.
    fn prepare_generated<P: Prompter>(
        &self,
        session: &mut PlaybackSession,
        argument: Option<String>,
        prompter: &mut P,
    ) -> Result<bool, ApiError> {
        let topic = match session.take_autoplay().map(|link| link.topic).or(argument) {
            Some(topic) => topic,
            None => {
                let remembered = session.topic().to_string();
                let prompt = if remembered.is_empty() {
                    "Tema della lezione".to_string()
                } else {
                    format!("Tema della lezione [{}]", remembered)
                };
                let typed = prompter.input(&prompt)?;
                if typed.trim().is_empty() {
                    remembered
                } else {
                    typed
                }
            }
        };
        if topic.trim().is_empty() {
            return Ok(false);
        }

        session
            .begin_generation(&topic)
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        prompter.say(&format!("Sto preparando la lezione su \"{}\"…", topic.trim()));

        let result = self.generate_lesson(&topic).map_err(into_generation_error);
        if let Ok(plan) = &result {
            if let Err(e) = self.library.save(plan) {
                warn!(topic = %plan.topic, error = %e, "Failed to save generated lesson");
            }
        }
        session.finish_generation(result);

        if let PlaybackState::Failed { message } = session.state() {
            prompter.say(message);
            return prompter.confirm("Vuoi riprovare?", true);
        }
        Ok(true)
    }

    fn handle_library_command<P: Prompter>(
        &self,
        command: &LibraryCommands,
        prompter: &mut P,
    ) -> Result<String, ApiError> {
        match command {
            LibraryCommands::List { format } => {
                let format = OutputFormat::parse(format)?;
                let lessons = self.library.list()?;
                match format {
                    OutputFormat::Json => format_library_list_json(&lessons),
                    OutputFormat::Text => Ok(format_library_list_text(&lessons)),
                }
            }
            LibraryCommands::Show { topic } => {
                let lesson = self.find_lesson(topic)?;
                Ok(format_lesson_text(&lesson))
            }
            LibraryCommands::Delete { topic, force } => {
                let lesson = self.find_lesson(topic)?;
                if !force {
                    let confirmed = prompter
                        .confirm(&format!("Eliminare la lezione \"{}\"?", lesson.topic), false)?;
                    if !confirmed {
                        return Ok("Eliminazione annullata.".to_string());
                    }
                }
                self.library.delete(&lesson.topic)?;
                Ok(format!("Lezione eliminata: {}", lesson.topic))
            }
            LibraryCommands::Export { output } => {
                let count = self.library.export_to_file(output)?;
                Ok(format!(
                    "Esportate {} lezioni in {}",
                    count,
                    output.display()
                ))
            }
            LibraryCommands::Import { file } => {
                let outcome = self.library.import_from_file(file)?;
                Ok(format_import_outcome(&outcome))
            }
        }
    }

    fn find_lesson(&self, topic: &str) -> Result<LessonPlan, ApiError> {
        self.library
            .find(topic)?
            .ok_or_else(|| LibraryError::NotFound(topic.trim().to_string()).into())
    }

    fn handle_key_command<P: Prompter>(
        &self,
        command: &KeyCommands,
        prompter: &mut P,
    ) -> Result<String, ApiError> {
        match command {
            KeyCommands::Set { value } => {
                let value = match value {
                    Some(value) => value.clone(),
                    None => prompter.secret("Chiave API Gemini")?,
                };
                self.credentials.set(&value)?;
                if value.trim().is_empty() {
                    Ok("Chiave API rimossa.".to_string())
                } else {
                    Ok(format!("Chiave API salvata ({}).", mask_credential(value.trim())))
                }
            }
            KeyCommands::Clear => {
                self.credentials.clear()?;
                Ok("Chiave API rimossa.".to_string())
            }
            KeyCommands::Status { check } => self.handle_key_status(*check),
        }
    }

    fn handle_key_status(&self, check: bool) -> Result<String, ApiError> {
        let resolved = CredentialChain::from_environment(&self.credentials)?
            .resolve()
            .ok();
        let mut checks = Vec::new();

        if let (true, Some(credential)) = (check, resolved.as_ref()) {
            let client = self.factory.create_client(&credential.value)?;
            match block_on(client.list_models())? {
                Ok(models) => {
                    checks.push(("Connessione: OK".to_string(), true));
                    for model in AttemptPlan::from_config(&self.config.provider).models() {
                        checks.push((
                            format!("Modello '{}' disponibile", model),
                            models.iter().any(|m| m == model),
                        ));
                    }
                }
                Err(e) => {
                    checks.push((
                        format!("Connessione: {}", classify_api_error(&e).user_message()),
                        false,
                    ));
                }
            }
        }

        Ok(format_key_status(resolved.as_ref(), &checks))
    }

    fn handle_config_command(&self, command: &ConfigCommands) -> Result<String, ApiError> {
        match command {
            ConfigCommands::Show => render_config(&self.config),
            ConfigCommands::Init { output, force } => {
                let path = match output {
                    Some(path) => path.clone(),
                    None => global_config_path().ok_or_else(|| {
                        ApiError::ConfigError(
                            "Could not determine the config directory (is HOME set?); pass --output"
                                .to_string(),
                        )
                    })?,
                };
                write_default_config(&path, *force)?;
                Ok(format!("Configurazione scritta in {}", path.display()))
            }
        }
    }
}

fn render_config(config: &ItafacileConfig) -> Result<String, ApiError> {
    toml::to_string_pretty(config)
        .map_err(|e| ApiError::ConfigError(format!("Failed to serialize configuration: {}", e)))
}

/// Write the default configuration to `path`. An existing file is kept unless `force`.
fn write_default_config(path: &Path, force: bool) -> Result<(), ApiError> {
    if path.exists() && !force {
        return Err(ApiError::ConfigError(format!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }
    let content = render_config(&ItafacileConfig::default())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    std::fs::write(path, content).map_err(|e| {
        ApiError::ConfigError(format!(
            "Failed to write config file {}: {}",
            path.display(),
            e
        ))
    })?;
    info!(config_path = %path.display(), "Default configuration written");
    Ok(())
}

fn handle_share(topic: &str, base_url: &str, classroom: bool) -> Result<String, ApiError> {
    let topic = require_topic(topic)?;
    Ok(if classroom {
        classroom_share_url(base_url, topic)
    } else {
        share_url(base_url, topic)
    })
}

fn require_topic(topic: &str) -> Result<&str, ApiError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(ApiError::InvalidInput(
            "Il tema della lezione non può essere vuoto.".to_string(),
        ));
    }
    Ok(topic)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(format: &str) -> Result<Self, ApiError> {
        match format {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ApiError::InvalidInput(format!(
                "Invalid format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

fn into_generation_error(err: ApiError) -> GenerationError {
    match err {
        ApiError::GenerationFailed(inner) => inner,
        other => classify_api_error(&other),
    }
}

/// Drive a future to completion on a fresh runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, ApiError> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        ApiError::GenerationFailed(GenerationError::new(
            GenerationErrorKind::Unknown,
            format!("Failed to create runtime: {}", e),
        ))
    })?;
    Ok(rt.block_on(future))
}
