use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use kb_logging::{kb_debug, kb_info, kb_trace, kb_warn};
use kbsearch_core::{
    update, Effect, Msg, PreviewFailure, RequestToken, SearchFailure, SearchFailureKind,
    SearchRequest, SessionState, SessionViewModel,
};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::convert::{preview_failure, search_failure};
use crate::gateway::{DocumentGateway, SearchGateway};
use crate::GatewayError;

#[derive(Debug, Clone)]
pub struct DriverSettings {
    /// Upper bound on waiting for a preview URL.
    pub preview_timeout: Duration,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            preview_timeout: Duration::from_secs(20),
        }
    }
}

/// Owns one session, executes its effects against the gateways and feeds
/// every completion back through [`update`] one message at a time.
///
/// Gateway calls run as tokio tasks; their results only reach the state
/// through the driver's inbox, so state is never mutated concurrently.
pub struct SessionDriver {
    state: SessionState,
    search: Arc<dyn SearchGateway>,
    documents: Arc<dyn DocumentGateway>,
    settings: DriverSettings,
    msg_tx: mpsc::UnboundedSender<Msg>,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    previews: HashMap<RequestToken, AbortHandle>,
    outstanding: usize,
    seq: u64,
}

impl SessionDriver {
    pub fn new(
        state: SessionState,
        search: Arc<dyn SearchGateway>,
        documents: Arc<dyn DocumentGateway>,
        settings: DriverSettings,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            state,
            search,
            documents,
            settings,
            msg_tx,
            msg_rx,
            previews: HashMap::new(),
            outstanding: 0,
            seq: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> SessionViewModel {
        self.state.view()
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    /// Gateway requests started but not yet reported back.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Apply one message. Effects the driver cannot carry out itself
    /// (currently only [`Effect::ReturnToLogin`]) are handed back.
    pub fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        self.seq += 1;
        kb_logging::set_dispatch_seq(self.seq);
        kb_trace!("Dispatch {:?}", msg);

        if is_completion(&msg) {
            self.outstanding = self.outstanding.saturating_sub(1);
        }
        if let Msg::PreviewResolved { token, .. } = &msg {
            self.previews.remove(token);
        }

        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        let mut unhandled = Vec::new();
        for effect in effects {
            if let Some(effect) = self.run_effect(effect) {
                unhandled.push(effect);
            }
        }
        kb_logging::set_dispatch_seq(0);
        unhandled
    }

    /// Wait for the next gateway completion and apply it. Returns `None`
    /// when nothing is outstanding.
    pub async fn next(&mut self) -> Option<Vec<Effect>> {
        if self.outstanding == 0 {
            return None;
        }
        let msg = self.msg_rx.recv().await?;
        Some(self.dispatch(msg))
    }

    /// Apply every completion that has already arrived, without waiting.
    pub fn drain(&mut self) -> Vec<Effect> {
        let mut unhandled = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            unhandled.extend(self.dispatch(msg));
        }
        unhandled
    }

    /// Keep applying completions until no request is outstanding.
    pub async fn run_until_idle(&mut self) -> Vec<Effect> {
        let mut unhandled = Vec::new();
        while let Some(effects) = self.next().await {
            unhandled.extend(effects);
        }
        unhandled.extend(self.drain());
        unhandled
    }

    fn run_effect(&mut self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::Search(request) => {
                self.spawn_search(request);
                None
            }
            Effect::RefreshHistory { token, limit } => {
                let gateway = self.search.clone();
                let guard = self.completion(Msg::HistoryLoaded {
                    token,
                    result: Err("request dropped".into()),
                });
                tokio::spawn(async move {
                    let result = gateway.history(limit).await;
                    guard.auth_check(&result);
                    guard.complete(Msg::HistoryLoaded {
                        token,
                        result: result.map_err(|err| err.to_string()),
                    });
                });
                None
            }
            Effect::LoadFacets { token } => {
                let gateway = self.search.clone();
                let guard = self.completion(Msg::FacetsLoaded {
                    token,
                    result: Err("request dropped".into()),
                });
                tokio::spawn(async move {
                    let result = gateway.facets().await;
                    guard.auth_check(&result);
                    guard.complete(Msg::FacetsLoaded {
                        token,
                        result: result.map_err(|err| err.to_string()),
                    });
                });
                None
            }
            Effect::FetchPreviewUrl { token, document_id } => {
                let gateway = self.documents.clone();
                let timeout = self.settings.preview_timeout;
                let guard = self.completion(Msg::PreviewResolved {
                    token,
                    result: Err(PreviewFailure::transport("request dropped")),
                });
                let handle = tokio::spawn(async move {
                    let result =
                        match tokio::time::timeout(timeout, gateway.download_url(document_id))
                            .await
                        {
                            Ok(result) => {
                                guard.auth_check(&result);
                                result.map_err(|err| preview_failure(&err))
                            }
                            Err(_) => {
                                kb_warn!("Preview {} timed out after {:?}", token, timeout);
                                Err(PreviewFailure::timed_out())
                            }
                        };
                    guard.complete(Msg::PreviewResolved { token, result });
                });
                self.previews.insert(token, handle.abort_handle());
                None
            }
            Effect::CancelPreview { token } => {
                if let Some(handle) = self.previews.remove(&token) {
                    kb_debug!("Aborting superseded preview {}", token);
                    handle.abort();
                }
                None
            }
            Effect::ReleasePreview { token } => {
                self.previews.remove(&token);
                kb_debug!("Released preview {}", token);
                None
            }
            Effect::ReturnToLogin => Some(Effect::ReturnToLogin),
        }
    }

    fn spawn_search(&mut self, request: SearchRequest) {
        let gateway = self.search.clone();
        let ticket = request.ticket;
        let guard = self.completion(Msg::SearchCompleted {
            ticket,
            result: Err(SearchFailure::new(SearchFailureKind::Cancelled, None)),
        });
        kb_info!("Search {} sent top_k={}", ticket, request.top_k);
        tokio::spawn(async move {
            let result = gateway.search(&request).await;
            guard.auth_check(&result);
            guard.complete(Msg::SearchCompleted {
                ticket,
                result: result.map_err(|err| search_failure(&err)),
            });
        });
    }

    fn completion(&mut self, fallback: Msg) -> CompletionGuard {
        self.outstanding += 1;
        CompletionGuard {
            tx: self.msg_tx.clone(),
            fallback: Some(fallback),
        }
    }
}

fn is_completion(msg: &Msg) -> bool {
    matches!(
        msg,
        Msg::SearchCompleted { .. }
            | Msg::HistoryLoaded { .. }
            | Msg::FacetsLoaded { .. }
            | Msg::PreviewResolved { .. }
    )
}

/// Guarantees exactly one completion message per started request, even
/// when the task is aborted or panics before reporting.
struct CompletionGuard {
    tx: mpsc::UnboundedSender<Msg>,
    fallback: Option<Msg>,
}

impl CompletionGuard {
    fn auth_check<T>(&self, result: &Result<T, GatewayError>) {
        if matches!(result, Err(err) if err.is_unauthorized()) {
            let _ = self.tx.send(Msg::AuthorizationFailed);
        }
    }

    fn complete(mut self, msg: Msg) {
        self.fallback = None;
        let _ = self.tx.send(msg);
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(msg) = self.fallback.take() {
            let _ = self.tx.send(msg);
        }
    }
}
