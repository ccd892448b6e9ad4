//! Search session core: pure state machine and view-model helpers.
mod conversation;
mod effect;
mod history;
mod latest;
mod messages;
mod msg;
mod preview;
mod session;
mod state;
mod update;
mod view_model;

pub use conversation::{
    ClassificationTags, ConversationEntry, ConversationLog, DocumentId, EntryId, ResultItem, Role,
    SearchFailure, SearchFailureKind, SearchReply, SourceDetails,
};
pub use effect::Effect;
pub use history::{HistoryCache, HistoryEntry, HISTORY_CAP};
pub use latest::{LatestWins, RequestToken};
pub use messages::Locale;
pub use msg::Msg;
pub use preview::{
    FailureCause, PreviewController, PreviewFailure, PreviewFailureKind, PreviewRelease,
    PreviewState,
};
pub use session::{
    FilterField, SearchFilters, SearchRequest, SearchTicket, SessionController, DEFAULT_TOP_K,
    DISPLAY_RESULTS,
};
pub use state::{Facets, SessionConfig, SessionState};
pub use update::update;
pub use view_model::{EntryView, HistoryRowView, PreviewView, ResultRowView, SessionViewModel};
