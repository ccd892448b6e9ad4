//! Single active document preview, acquired through a short-lived URL.

use url::Url;

use crate::conversation::DocumentId;
use crate::latest::{LatestWins, RequestToken};
use crate::messages::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewFailureKind {
    /// Upload still running, queued, or processing failed.
    NotReady,
    /// Document deleted or never existed.
    NotFound,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    Status(u16),
    Timeout,
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewFailure {
    pub kind: PreviewFailureKind,
    pub cause: FailureCause,
    pub detail: Option<String>,
}

impl PreviewFailure {
    /// Classify an error response from the download-url endpoint.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        let kind = match status {
            400 => PreviewFailureKind::NotReady,
            404 => PreviewFailureKind::NotFound,
            _ => PreviewFailureKind::Unknown,
        };
        Self {
            kind,
            cause: FailureCause::Status(status),
            detail: detail.filter(|text| !text.trim().is_empty()),
        }
    }

    pub fn timed_out() -> Self {
        Self {
            kind: PreviewFailureKind::Unknown,
            cause: FailureCause::Timeout,
            detail: None,
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            kind: PreviewFailureKind::Unknown,
            cause: FailureCause::Transport,
            detail: Some(detail.into()),
        }
    }

    /// Text shown to the user. Backend detail is only surfaced for
    /// failures outside the two known categories.
    pub fn reason(&self, locale: Locale) -> String {
        match self.kind {
            PreviewFailureKind::NotReady => locale.preview_not_ready().to_string(),
            PreviewFailureKind::NotFound => locale.preview_not_found().to_string(),
            PreviewFailureKind::Unknown => match (&self.detail, self.cause) {
                (Some(detail), FailureCause::Status(_)) => detail.clone(),
                (_, FailureCause::Timeout) => locale.preview_timed_out().to_string(),
                _ => locale.preview_generic().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Loading {
        token: RequestToken,
        document_id: DocumentId,
        filename: String,
    },
    Ready {
        token: RequestToken,
        url: Url,
        filename: String,
    },
    Failed {
        token: RequestToken,
        filename: String,
        reason: String,
        failure: PreviewFailure,
    },
}

impl PreviewState {
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            PreviewState::Idle => None,
            PreviewState::Loading { token, .. }
            | PreviewState::Ready { token, .. }
            | PreviewState::Failed { token, .. } => Some(*token),
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            PreviewState::Idle => None,
            PreviewState::Loading { filename, .. }
            | PreviewState::Ready { filename, .. }
            | PreviewState::Failed { filename, .. } => Some(filename),
        }
    }
}

/// What the driver must do about the request a transition left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewRelease {
    /// A request was still in flight; stop waiting for it.
    Cancel(RequestToken),
    /// A resolved preview held a resource that must be dropped.
    Release(RequestToken),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewController {
    state: PreviewState,
    tokens: LatestWins,
}

impl PreviewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Start a new acquisition from any state. The new request supersedes
    /// whatever was pending or resolved.
    pub(crate) fn acquire(
        &mut self,
        document_id: DocumentId,
        filename: String,
    ) -> (RequestToken, Option<PreviewRelease>) {
        let released = self.leave_current();
        let token = self.tokens.issue();
        self.state = PreviewState::Loading {
            token,
            document_id,
            filename,
        };
        (token, released)
    }

    /// Apply a response. Returns `false` when the response is stale, in
    /// which case nothing changed.
    pub(crate) fn resolve(
        &mut self,
        token: RequestToken,
        result: Result<Url, PreviewFailure>,
        locale: Locale,
    ) -> bool {
        let filename = match &self.state {
            PreviewState::Loading {
                token: current,
                filename,
                ..
            } if *current == token => filename.clone(),
            _ => return false,
        };
        if !self.tokens.settle(token) {
            return false;
        }

        self.state = match result {
            Ok(url) => PreviewState::Ready {
                token,
                url,
                filename,
            },
            Err(failure) => PreviewState::Failed {
                token,
                filename,
                reason: failure.reason(locale),
                failure,
            },
        };
        true
    }

    /// Return to `Idle` from any state, independent of tokens.
    pub(crate) fn close(&mut self) -> Option<PreviewRelease> {
        let released = self.leave_current();
        self.state = PreviewState::Idle;
        released
    }

    fn leave_current(&mut self) -> Option<PreviewRelease> {
        self.tokens.invalidate();
        match &self.state {
            PreviewState::Loading { token, .. } => Some(PreviewRelease::Cancel(*token)),
            PreviewState::Ready { token, .. } => Some(PreviewRelease::Release(*token)),
            PreviewState::Idle | PreviewState::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::{
        PreviewController, PreviewFailure, PreviewFailureKind, PreviewRelease, PreviewState,
    };
    use crate::messages::Locale;

    fn url(name: &str) -> Url {
        Url::parse(&format!("https://blob.example.com/{name}?sig=abc")).unwrap()
    }

    #[test]
    fn classifies_status_codes() {
        assert_eq!(
            PreviewFailure::from_status(400, Some("processing".into())).kind,
            PreviewFailureKind::NotReady
        );
        assert_eq!(
            PreviewFailure::from_status(404, None).kind,
            PreviewFailureKind::NotFound
        );
        assert_eq!(
            PreviewFailure::from_status(500, None).kind,
            PreviewFailureKind::Unknown
        );
    }

    #[test]
    fn unknown_reason_prefers_backend_detail() {
        let with_detail = PreviewFailure::from_status(500, Some("storage offline".into()));
        assert_eq!(with_detail.reason(Locale::English), "storage offline");

        let without = PreviewFailure::from_status(502, Some("  ".into()));
        assert_eq!(
            without.reason(Locale::English),
            Locale::English.preview_generic()
        );

        let not_ready = PreviewFailure::from_status(400, Some("processing".into()));
        assert_eq!(
            not_ready.reason(Locale::English),
            Locale::English.preview_not_ready()
        );
    }

    #[test]
    fn later_acquire_wins_regardless_of_arrival_order() {
        let mut preview = PreviewController::new();
        let (first, _) = preview.acquire(42, "a.xlsx".into());
        let (second, released) = preview.acquire(43, "b.xlsx".into());
        assert_eq!(released, Some(PreviewRelease::Cancel(first)));

        assert!(preview.resolve(second, Ok(url("b")), Locale::English));
        assert!(!preview.resolve(first, Ok(url("a")), Locale::English));

        match preview.state() {
            PreviewState::Ready { filename, .. } => assert_eq!(filename, "b.xlsx"),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn close_releases_ready_preview_and_ignores_late_replies() {
        let mut preview = PreviewController::new();
        let (token, _) = preview.acquire(1, "a.docx".into());
        preview.resolve(token, Ok(url("a")), Locale::English);

        assert_eq!(preview.close(), Some(PreviewRelease::Release(token)));
        assert_eq!(preview.state(), &PreviewState::Idle);
        assert_eq!(preview.close(), None);
    }

    #[test]
    fn close_mid_loading_cancels_and_discards_reply() {
        let mut preview = PreviewController::new();
        let (token, _) = preview.acquire(1, "a.docx".into());

        assert_eq!(preview.close(), Some(PreviewRelease::Cancel(token)));
        assert!(!preview.resolve(token, Ok(url("a")), Locale::English));
        assert_eq!(preview.state(), &PreviewState::Idle);
    }
}
