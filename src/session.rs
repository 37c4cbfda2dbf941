//! Playback session state and deep links.
//!
//! A session walks one lesson plan item by item. It refuses a second
//! generation while one is in flight and forgets a consumed deep link on
//! restart so it is not replayed.

use crate::error::GenerationError;
use crate::types::{GameItem, LessonPlan};
use tracing::debug;
use url::Url;

pub const CLASSROOM_SHARE_BASE: &str = "https://classroom.google.com/share";

/// Link target understood by `itafacile play --link`
pub const DEFAULT_SHARE_BASE_URL: &str = "itafacile://play";

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Playing { plan: LessonPlan, cursor: usize },
    Complete { plan: LessonPlan },
    Failed { message: String },
}

/// Topic and autoplay flag carried by a shared link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    pub topic: String,
    pub autoplay: bool,
}

impl DeepLink {
    /// Parse a full URL or a bare query string (`topic=...&autoplay=true`).
    ///
    /// Returns `None` when no non-empty topic is present.
    pub fn parse(url_or_query: &str) -> Option<Self> {
        let input = url_or_query.trim();
        let url = Url::parse(input)
            .or_else(|_| {
                Url::parse(&format!(
                    "https://example.com?{}",
                    input.trim_start_matches('?')
                ))
            })
            .ok()?;

        let mut topic = None;
        let mut autoplay = false;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "topic" if topic.is_none() => topic = Some(value.into_owned()),
                "autoplay" => autoplay = value == "true",
                _ => {}
            }
        }

        let topic = topic?.trim().to_string();
        if topic.is_empty() {
            return None;
        }
        Some(Self { topic, autoplay })
    }
}

/// Link that opens the lesson for `topic` and starts it immediately.
pub fn share_url(base: &str, topic: &str) -> String {
    let base = base.trim_end_matches(['?', '&']);
    let separator = if base.contains('?') { '&' } else { '?' };
    format!(
        "{}{}topic={}&autoplay=true",
        base,
        separator,
        urlencoding::encode(topic.trim())
    )
}

/// Google Classroom share link wrapping [`share_url`].
pub fn classroom_share_url(base: &str, topic: &str) -> String {
    format!(
        "{}?url={}",
        CLASSROOM_SHARE_BASE,
        urlencoding::encode(&share_url(base, topic))
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginError {
    AlreadyLoading,
    EmptyTopic,
}

impl std::fmt::Display for BeginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeginError::AlreadyLoading => write!(f, "a lesson is already being generated"),
            BeginError::EmptyTopic => write!(f, "topic is empty"),
        }
    }
}

impl std::error::Error for BeginError {}

#[derive(Debug, Clone)]
pub struct PlaybackSession {
    topic: String,
    state: PlaybackState,
    deep_link: Option<DeepLink>,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self {
            topic: String::new(),
            state: PlaybackState::Idle,
            deep_link: None,
        }
    }

    /// Session seeded from a deep link; the link topic becomes the topic input.
    pub fn with_deep_link(link: DeepLink) -> Self {
        Self {
            topic: link.topic.clone(),
            state: PlaybackState::Idle,
            deep_link: Some(link),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub fn deep_link(&self) -> Option<&DeepLink> {
        self.deep_link.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PlaybackState::Loading)
    }

    /// Take the pending link if it asks for autoplay. A link is handed out once.
    pub fn take_autoplay(&mut self) -> Option<DeepLink> {
        match &self.deep_link {
            Some(link) if link.autoplay => self.deep_link.take(),
            _ => None,
        }
    }

    /// Enter `Loading` for `topic`, dropping any previous plan or error.
    pub fn begin_generation(&mut self, topic: &str) -> Result<(), BeginError> {
        if self.is_loading() {
            return Err(BeginError::AlreadyLoading);
        }
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(BeginError::EmptyTopic);
        }
        self.topic = topic.to_string();
        self.state = PlaybackState::Loading;
        debug!(topic = %self.topic, "Generation started");
        Ok(())
    }

    pub fn finish_generation(&mut self, result: Result<LessonPlan, GenerationError>) {
        self.state = match result {
            Ok(plan) => PlaybackState::Playing { plan, cursor: 0 },
            Err(err) => PlaybackState::Failed {
                message: err.user_message().to_string(),
            },
        };
    }

    /// Play a lesson taken from the library.
    pub fn load(&mut self, plan: LessonPlan) {
        self.topic = plan.topic.clone();
        self.state = PlaybackState::Playing { plan, cursor: 0 };
    }

    pub fn current_item(&self) -> Option<&GameItem> {
        match &self.state {
            PlaybackState::Playing { plan, cursor } => plan.items.get(*cursor),
            _ => None,
        }
    }

    /// `(cursor, total)` while playing; a completed plan reports `(total, total)`.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match &self.state {
            PlaybackState::Playing { plan, cursor } => Some((*cursor, plan.items.len())),
            PlaybackState::Complete { plan } => Some((plan.items.len(), plan.items.len())),
            _ => None,
        }
    }

    /// Move to the next item, or to `Complete` past the last one.
    pub fn advance(&mut self) {
        let state = std::mem::replace(&mut self.state, PlaybackState::Idle);
        self.state = match state {
            PlaybackState::Playing { plan, cursor } if cursor + 1 < plan.items.len() => {
                PlaybackState::Playing {
                    plan,
                    cursor: cursor + 1,
                }
            }
            PlaybackState::Playing { plan, .. } => PlaybackState::Complete { plan },
            other => other,
        };
    }

    /// Back to a blank session. The deep link is scrubbed too.
    pub fn restart(&mut self) {
        self.topic.clear();
        self.state = PlaybackState::Idle;
        self.deep_link = None;
    }
}
