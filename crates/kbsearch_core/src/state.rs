use crate::conversation::ConversationLog;
use crate::history::{HistoryCache, HISTORY_CAP};
use crate::latest::LatestWins;
use crate::messages::Locale;
use crate::preview::PreviewController;
use crate::session::{SessionController, DEFAULT_TOP_K};
use crate::view_model::SessionViewModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub locale: Locale,
    pub top_k: usize,
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            top_k: DEFAULT_TOP_K,
            history_limit: HISTORY_CAP,
        }
    }
}

/// Known filter values offered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Facets {
    pub applications: Vec<String>,
    pub issues: Vec<String>,
    pub ingredients: Vec<String>,
}

/// Everything one search session owns. Mutated only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    config: SessionConfig,
    pub(crate) session: SessionController,
    pub(crate) history: HistoryCache,
    pub(crate) preview: PreviewController,
    pub(crate) facets: Facets,
    pub(crate) facet_refresh: LatestWins,
    pub(crate) pending_input: String,
    pub(crate) signed_out: bool,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            session: SessionController::new(config.top_k),
            config: SessionConfig {
                history_limit: config.history_limit.clamp(1, HISTORY_CAP),
                ..config
            },
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn locale(&self) -> Locale {
        self.config.locale
    }

    pub fn conversation(&self) -> &ConversationLog {
        self.session.log()
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn preview(&self) -> &PreviewController {
        &self.preview
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn is_signed_out(&self) -> bool {
        self.signed_out
    }

    pub fn view(&self) -> SessionViewModel {
        SessionViewModel::build(self)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
