use kbsearch_core::{
    update, Effect, Locale, Msg, PreviewFailure, PreviewFailureKind, PreviewState, PreviewView,
    RequestToken, SessionConfig, SessionState,
};
use url::Url;

fn english() -> SessionState {
    SessionState::with_config(SessionConfig {
        locale: Locale::English,
        ..SessionConfig::default()
    })
}

fn request(state: SessionState, document_id: u64, filename: &str) -> (SessionState, Vec<Effect>) {
    update(
        state,
        Msg::PreviewRequested {
            document_id,
            filename: filename.into(),
        },
    )
}

fn fetch_token(effects: &[Effect]) -> RequestToken {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchPreviewUrl { token, .. } => Some(*token),
            _ => None,
        })
        .expect("fetch effect")
}

fn blob(name: &str) -> Url {
    Url::parse(&format!("https://blob.example.com/docs/{name}?sv=2024&sig=x")).unwrap()
}

#[test]
fn acquire_moves_to_loading_and_fetches() {
    let (state, effects) = request(english(), 42, "a.xlsx");
    let token = fetch_token(&effects);

    assert_eq!(
        effects,
        vec![Effect::FetchPreviewUrl {
            token,
            document_id: 42
        }]
    );
    assert_eq!(
        state.preview().state(),
        &PreviewState::Loading {
            token,
            document_id: 42,
            filename: "a.xlsx".into()
        }
    );
}

#[test]
fn latest_acquire_wins_in_either_arrival_order() {
    for older_first in [true, false] {
        let (state, first) = request(english(), 42, "a.xlsx");
        let (state, second) = request(state, 43, "b.xlsx");
        let old = fetch_token(&first);
        let new = fetch_token(&second);
        assert!(second.contains(&Effect::CancelPreview { token: old }));

        let replies = if older_first {
            [(old, blob("a")), (new, blob("b"))]
        } else {
            [(new, blob("b")), (old, blob("a"))]
        };
        let mut state = state;
        for (token, url) in replies {
            state = update(
                state,
                Msg::PreviewResolved {
                    token,
                    result: Ok(url),
                },
            )
            .0;
        }

        match state.preview().state() {
            PreviewState::Ready {
                token, filename, url, ..
            } => {
                assert_eq!(*token, new);
                assert_eq!(filename, "b.xlsx");
                assert_eq!(url, &blob("b"));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }
}

#[test]
fn processing_document_fails_as_not_ready() {
    let (state, effects) = request(english(), 7, "trial.xlsx");
    let token = fetch_token(&effects);

    let (state, _) = update(
        state,
        Msg::PreviewResolved {
            token,
            result: Err(PreviewFailure::from_status(
                400,
                Some("File is being processed.".into()),
            )),
        },
    );

    match state.preview().state() {
        PreviewState::Failed {
            failure, reason, ..
        } => {
            assert_eq!(failure.kind, PreviewFailureKind::NotReady);
            assert_eq!(reason, Locale::English.preview_not_ready());
        }
        other => panic!("unexpected state {other:?}"),
    }
}

#[test]
fn missing_document_fails_as_not_found() {
    let (state, effects) = request(english(), 7, "gone.xlsx");
    let (state, _) = update(
        state,
        Msg::PreviewResolved {
            token: fetch_token(&effects),
            result: Err(PreviewFailure::from_status(404, None)),
        },
    );
    assert_eq!(
        state.view().preview,
        PreviewView::Failed {
            filename: "gone.xlsx".into(),
            reason: Locale::English.preview_not_found().into(),
        }
    );
}

#[test]
fn close_from_every_state_yields_idle_without_touching_log() {
    let loading = request(english(), 1, "a.xlsx").0;

    let (ready, effects) = request(english(), 1, "a.xlsx");
    let ready = update(
        ready,
        Msg::PreviewResolved {
            token: fetch_token(&effects),
            result: Ok(blob("a")),
        },
    )
    .0;

    let (failed, effects) = request(english(), 1, "a.xlsx");
    let failed = update(
        failed,
        Msg::PreviewResolved {
            token: fetch_token(&effects),
            result: Err(PreviewFailure::from_status(500, None)),
        },
    )
    .0;

    for state in [english(), loading, ready, failed] {
        let log_before = state.conversation().clone();
        let (state, _) = update(state, Msg::PreviewClosed);
        assert_eq!(state.preview().state(), &PreviewState::Idle);
        assert_eq!(state.conversation(), &log_before);
    }
}

#[test]
fn close_emits_release_for_held_resources() {
    let (state, effects) = request(english(), 1, "a.xlsx");
    let token = fetch_token(&effects);
    let (_, effects) = update(state.clone(), Msg::PreviewClosed);
    assert_eq!(effects, vec![Effect::CancelPreview { token }]);

    let (state, _) = update(
        state,
        Msg::PreviewResolved {
            token,
            result: Ok(blob("a")),
        },
    );
    let (state, effects) = update(state, Msg::PreviewClosed);
    assert_eq!(effects, vec![Effect::ReleasePreview { token }]);

    // A reply arriving after close is stale.
    let (state, _) = update(
        state,
        Msg::PreviewResolved {
            token,
            result: Ok(blob("a")),
        },
    );
    assert_eq!(state.preview().state(), &PreviewState::Idle);
}

#[test]
fn timeout_resolves_to_failed() {
    let (state, effects) = request(english(), 3, "slow.docx");
    let (state, _) = update(
        state,
        Msg::PreviewResolved {
            token: fetch_token(&effects),
            result: Err(PreviewFailure::timed_out()),
        },
    );
    match state.view().preview {
        PreviewView::Failed { reason, .. } => {
            assert_eq!(reason, Locale::English.preview_timed_out())
        }
        other => panic!("unexpected preview {other:?}"),
    }
}

#[test]
fn authorization_failure_returns_to_login_once() {
    let (state, effects) = update(english(), Msg::AuthorizationFailed);
    assert_eq!(effects, vec![Effect::ReturnToLogin]);
    assert!(state.is_signed_out());

    let (state, effects) = update(state, Msg::AuthorizationFailed);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::SignedIn);
    assert!(!state.is_signed_out());
    assert_eq!(effects.len(), 2);
}
