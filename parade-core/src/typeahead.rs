//! Debounced location suggestions.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::{api::ParadeApi, config::TypeaheadConfig, model::LocationSuggestion};

/// Single-shot timer that restarts on every `schedule`. Only the most
/// recently scheduled job can run; dropping the debouncer cancels it.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Must be called inside a tokio runtime.
    pub fn schedule<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Let the pending job run to completion without keeping a handle to it.
    pub fn detach(&mut self) {
        self.pending = None;
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionBatch {
    pub query: String,
    pub suggestions: Vec<LocationSuggestion>,
}

/// Feeds keystrokes to a debounced location search. Results arrive on the
/// receiver returned by `new`.
#[derive(Debug)]
pub struct LocationSuggester<A> {
    api: Arc<A>,
    debouncer: Debouncer,
    min_chars: usize,
    results: mpsc::UnboundedSender<SuggestionBatch>,
}

impl<A: ParadeApi + 'static> LocationSuggester<A> {
    pub fn new(
        api: Arc<A>,
        settings: &TypeaheadConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SuggestionBatch>) {
        let (results, rx) = mpsc::unbounded_channel();
        let suggester = Self {
            api,
            debouncer: Debouncer::new(settings.debounce()),
            min_chars: settings.min_chars,
            results,
        };
        (suggester, rx)
    }

    /// Returns whether a lookup is now scheduled. Short inputs cancel any
    /// pending lookup.
    pub fn on_input(&mut self, text: &str) -> bool {
        let query = text.trim().to_string();
        if query.chars().count() < self.min_chars {
            self.debouncer.cancel();
            return false;
        }

        let api = Arc::clone(&self.api);
        let results = self.results.clone();
        self.debouncer.schedule(async move {
            debug!(%query, "looking up location suggestions");
            match api.search_locations(&query).await {
                Ok(suggestions) => {
                    // Receiver gone means nobody is listening any more.
                    let _ = results.send(SuggestionBatch { query, suggestions });
                }
                Err(err) => warn!(%query, error = %format!("{err:#}"), "location search failed"),
            }
        });
        true
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Stop taking input; a lookup already scheduled still delivers.
    pub fn finish(mut self) {
        self.debouncer.detach();
    }
}
