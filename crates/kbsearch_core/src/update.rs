use kb_logging::{kb_debug, kb_info, kb_warn};

use crate::preview::{PreviewRelease, PreviewState};
use crate::{Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionStarted | Msg::SignedIn => {
            if state.signed_out {
                state.signed_out = false;
                state.mark_dirty();
            }
            vec![refresh_history(&mut state), load_facets(&mut state)]
        }
        Msg::InputChanged(text) => {
            if state.pending_input != text {
                state.pending_input = text;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::QuerySubmitted => {
            let input = state.pending_input.clone();
            match state.session.submit_query(&input) {
                Some(request) => {
                    state.pending_input.clear();
                    state.mark_dirty();
                    vec![Effect::Search(request)]
                }
                None => Vec::new(),
            }
        }
        Msg::SearchCompleted { ticket, result } => {
            let locale = state.locale();
            match state.session.complete(ticket, result, locale) {
                Some(succeeded) => {
                    state.mark_dirty();
                    if succeeded {
                        vec![refresh_history(&mut state)]
                    } else {
                        Vec::new()
                    }
                }
                None => Vec::new(),
            }
        }
        Msg::HistoryLoaded { token, result } => {
            let applied = match result {
                Ok(rows) => state.history.apply_refresh(token, rows),
                Err(reason) => {
                    if state.history.abandon_refresh(token) {
                        kb_warn!("History refresh {} failed: {}", token, reason);
                    }
                    false
                }
            };
            if applied {
                state.mark_dirty();
            } else {
                kb_debug!("History refresh {} not applied", token);
            }
            Vec::new()
        }
        Msg::HistorySelected { index } => {
            if let Some(query) = state.history.query_at(index).map(ToOwned::to_owned) {
                state.pending_input = query;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ExampleSelected { index } => {
            if let Some(example) = state.locale().example_queries().get(index) {
                state.pending_input = (*example).to_string();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FilterChanged { field, value } => {
            state.session.set_filter(field, value);
            state.mark_dirty();
            Vec::new()
        }
        Msg::FacetsLoaded { token, result } => {
            if state.facet_refresh.settle(token) {
                match result {
                    Ok(facets) => {
                        state.facets = facets;
                        state.mark_dirty();
                    }
                    Err(reason) => kb_warn!("Facet load {} failed: {}", token, reason),
                }
            }
            Vec::new()
        }
        Msg::PreviewRequested {
            document_id,
            filename,
        } => {
            let (token, released) = state.preview.acquire(document_id, filename);
            kb_info!("Preview {} requested document_id={}", token, document_id);
            state.mark_dirty();
            let mut effects = Vec::with_capacity(2);
            effects.extend(released.map(release_effect));
            effects.push(Effect::FetchPreviewUrl { token, document_id });
            effects
        }
        Msg::PreviewResolved { token, result } => {
            let locale = state.locale();
            if state.preview.resolve(token, result, locale) {
                state.mark_dirty();
            } else {
                kb_debug!("Discarding stale preview response {}", token);
            }
            Vec::new()
        }
        Msg::PreviewClosed => {
            if state.preview.state() != &PreviewState::Idle {
                state.mark_dirty();
            }
            let released = state.preview.close();
            released.map(release_effect).into_iter().collect()
        }
        Msg::AuthorizationFailed => {
            if state.signed_out {
                Vec::new()
            } else {
                kb_warn!("Authorization failed; returning to sign-in");
                state.signed_out = true;
                state.mark_dirty();
                vec![Effect::ReturnToLogin]
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn refresh_history(state: &mut SessionState) -> Effect {
    Effect::RefreshHistory {
        token: state.history.begin_refresh(),
        limit: state.config().history_limit,
    }
}

fn load_facets(state: &mut SessionState) -> Effect {
    Effect::LoadFacets {
        token: state.facet_refresh.issue(),
    }
}

fn release_effect(release: PreviewRelease) -> Effect {
    match release {
        PreviewRelease::Cancel(token) => Effect::CancelPreview { token },
        PreviewRelease::Release(token) => Effect::ReleasePreview { token },
    }
}
