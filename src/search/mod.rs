//! Merges local library matches with remote YouTube results.
//!
//! Local matches are ready as soon as [`SearchAggregator::search`] returns.
//! The remote half runs on its own task and is observed through
//! [`SearchSession`].

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    common::{errors::SearchError, types::SharedRw},
    library::LocalTrack,
    protocol::tracks::{PlaybackReference, TrackCandidate},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Searching,
    Done,
    NoResults,
    Failed(String),
}

impl SearchState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Searching)
    }
}

/// Local track lookup.
pub trait TrackStore: Send + Sync {
    fn search(&self, query: &str) -> Vec<LocalTrack>;
}

/// Remote catalogue search.
#[async_trait]
pub trait RemoteSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<TrackCandidate>, SearchError>;
}

pub struct SearchAggregator {
    local: Arc<dyn TrackStore>,
    remote: Arc<dyn RemoteSearch>,
}

impl SearchAggregator {
    pub fn new(local: Arc<dyn TrackStore>, remote: Arc<dyn RemoteSearch>) -> Self {
        Self { local, remote }
    }

    /// Starts a search. Must be called from within a tokio runtime.
    pub fn search(&self, query: &str) -> SearchSession {
        let query = query.trim().to_string();

        if query.is_empty() {
            let (_, state) = watch::channel(SearchState::Done);
            return SearchSession {
                query,
                local: Vec::new(),
                remote: Arc::new(RwLock::new(Vec::new())),
                state,
                task: None,
            };
        }

        let local: Vec<TrackCandidate> = self
            .local
            .search(&query)
            .into_iter()
            .map(LocalTrack::into_candidate)
            .collect();
        tracing::debug!("Search \"{}\": {} local matches", query, local.len());

        let remote_results: SharedRw<Vec<TrackCandidate>> = Arc::new(RwLock::new(Vec::new()));
        let (tx, state) = watch::channel(SearchState::Searching);

        let task = tokio::spawn({
            let remote = self.remote.clone();
            let sink = remote_results.clone();
            let query = query.clone();
            let mut seen: HashSet<PlaybackReference> =
                local.iter().map(|t| t.playback_reference.clone()).collect();
            let has_local = !local.is_empty();

            async move {
                let state = match remote.search(&query).await {
                    Ok(results) => {
                        let fresh: Vec<TrackCandidate> = results
                            .into_iter()
                            .filter(|t| seen.insert(t.playback_reference.clone()))
                            .collect();
                        let added = fresh.len();
                        sink.write().extend(fresh);

                        tracing::debug!("Search \"{}\": {} remote results", query, added);
                        if added == 0 && !has_local {
                            SearchState::NoResults
                        } else {
                            SearchState::Done
                        }
                    }
                    Err(SearchError::NoResults(_)) if !has_local => SearchState::NoResults,
                    Err(e) if has_local => {
                        tracing::warn!("Remote search failed, keeping local results: {}", e);
                        SearchState::Done
                    }
                    Err(e) => {
                        tracing::warn!("Remote search failed: {}", e);
                        SearchState::Failed(e.to_string())
                    }
                };
                let _ = tx.send(state);
            }
        });

        SearchSession {
            query,
            local,
            remote: remote_results,
            state,
            task: Some(task),
        }
    }

    pub async fn search_all(&self, query: &str) -> Result<Vec<TrackCandidate>, SearchError> {
        self.search(query).finish().await
    }
}

/// One in-flight search. Dropping it cancels the remote half.
pub struct SearchSession {
    query: String,
    local: Vec<TrackCandidate>,
    remote: SharedRw<Vec<TrackCandidate>>,
    state: watch::Receiver<SearchState>,
    task: Option<JoinHandle<()>>,
}

impl SearchSession {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn local_results(&self) -> &[TrackCandidate] {
        &self.local
    }

    /// Snapshot of the remote results received so far.
    pub fn remote_results(&self) -> Vec<TrackCandidate> {
        self.remote.read().clone()
    }

    /// Local results followed by the remote results received so far.
    pub fn results(&self) -> Vec<TrackCandidate> {
        let remote = self.remote.read();
        self.local.iter().chain(remote.iter()).cloned().collect()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    /// Waits until the remote half has settled.
    pub async fn wait(&mut self) -> SearchState {
        match self.state.wait_for(SearchState::is_finished).await {
            Ok(state) => (*state).clone(),
            Err(_) => SearchState::Failed("search task ended unexpectedly".to_string()),
        }
    }

    pub async fn finish(mut self) -> Result<Vec<TrackCandidate>, SearchError> {
        match self.wait().await {
            SearchState::NoResults => Err(SearchError::NoResults(self.query.clone())),
            SearchState::Failed(reason) => Err(SearchError::Failed {
                query: self.query.clone(),
                reason,
            }),
            SearchState::Done | SearchState::Searching => Ok(self.results()),
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use tokio::sync::{Notify, oneshot};

    use super::*;
    use crate::library::InMemoryTrackStore;

    fn local_track(title: &str, uri: &str) -> LocalTrack {
        LocalTrack {
            title: title.to_string(),
            artist: "Local Artist".to_string(),
            album: "Local Album".to_string(),
            duration_ms: 180000,
            uri: uri.to_string(),
            cover_art_uri: None,
        }
    }

    fn store() -> Arc<InMemoryTrackStore> {
        Arc::new(InMemoryTrackStore::new(vec![
            local_track("abc song", "file:///music/1.mp3"),
            local_track("The ABC", "file:///music/2.mp3"),
            local_track("Unrelated", "file:///music/3.mp3"),
        ]))
    }

    fn online(id: &str) -> TrackCandidate {
        TrackCandidate::online(id, format!("Video {}", id), "Channel", 1000, None)
    }

    enum Outcome {
        Results(Vec<TrackCandidate>),
        Fail,
    }

    struct FakeRemote {
        outcome: Outcome,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl FakeRemote {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                gate: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn gated(outcome: Outcome, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                gate: Some(gate),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RemoteSearch for FakeRemote {
        async fn search(&self, query: &str) -> Result<Vec<TrackCandidate>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.outcome {
                Outcome::Results(results) => Ok(results.clone()),
                Outcome::Fail => Err(SearchError::Failed {
                    query: query.to_string(),
                    reason: "network down".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_local_results() {
        let aggregator = SearchAggregator::new(store(), FakeRemote::new(Outcome::Fail));

        let mut session = aggregator.search("abc");
        assert_eq!(session.wait().await, SearchState::Done);

        let results = session.finish().await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|t| !t.playback_reference.is_online()));
    }

    #[tokio::test]
    async fn test_local_first_then_deduplicated_remote() {
        let remote = FakeRemote::new(Outcome::Results(vec![
            online("aaa"),
            online("bbb"),
            online("aaa"),
            TrackCandidate {
                playback_reference: PlaybackReference::Url("file:///music/1.mp3".into()),
                ..online("ignored")
            },
        ]));
        let aggregator = SearchAggregator::new(store(), remote);

        let results = aggregator.search_all("ABC").await.unwrap();
        let refs: Vec<&str> = results.iter().map(|t| t.playback_reference.as_str()).collect();
        assert_eq!(
            refs,
            vec!["file:///music/1.mp3", "file:///music/2.mp3", "aaa", "bbb"]
        );
    }

    #[tokio::test]
    async fn test_no_results_and_failed_states() {
        let aggregator = SearchAggregator::new(store(), FakeRemote::new(Outcome::Results(vec![])));
        assert_eq!(
            aggregator.search_all("zzz").await,
            Err(SearchError::NoResults("zzz".into()))
        );

        let aggregator = SearchAggregator::new(store(), FakeRemote::new(Outcome::Fail));
        let mut session = aggregator.search("zzz");
        assert!(matches!(session.wait().await, SearchState::Failed(reason) if reason.contains("network down")));
        assert!(matches!(
            session.finish().await,
            Err(SearchError::Failed { query, .. }) if query == "zzz"
        ));
    }

    #[tokio::test]
    async fn test_local_results_available_before_remote() {
        let gate = Arc::new(Notify::new());
        let aggregator = SearchAggregator::new(
            store(),
            FakeRemote::gated(Outcome::Results(vec![online("remote1")]), gate.clone()),
        );

        let session = aggregator.search("abc");
        assert_eq!(session.local_results().len(), 2);
        assert_eq!(session.state(), SearchState::Searching);
        assert!(session.remote_results().is_empty());

        gate.notify_one();
        let results = session.finish().await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].playback_reference.as_str(), "remote1");
    }

    #[tokio::test]
    async fn test_blank_query_skips_remote() {
        let remote = FakeRemote::new(Outcome::Results(vec![online("x")]));
        let aggregator = SearchAggregator::new(store(), remote.clone());

        let session = aggregator.search("   ");
        assert_eq!(session.state(), SearchState::Done);
        assert_eq!(session.finish().await, Ok(vec![]));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    struct DropSignal(Option<oneshot::Sender<()>>);

    impl Drop for DropSignal {
        fn drop(&mut self) {
            if let Some(tx) = self.0.take() {
                let _ = tx.send(());
            }
        }
    }

    struct HangingRemote {
        signal: parking_lot::Mutex<Option<oneshot::Sender<()>>>,
        started: Arc<Notify>,
    }

    #[async_trait]
    impl RemoteSearch for HangingRemote {
        async fn search(&self, _query: &str) -> Result<Vec<TrackCandidate>, SearchError> {
            let _guard = DropSignal(self.signal.lock().take());
            self.started.notify_one();
            futures::future::pending::<()>().await;
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_dropping_session_cancels_remote() {
        let (tx, rx) = oneshot::channel();
        let started = Arc::new(Notify::new());
        let remote = Arc::new(HangingRemote {
            signal: parking_lot::Mutex::new(Some(tx)),
            started: started.clone(),
        });
        let aggregator = SearchAggregator::new(store(), remote);

        let session = aggregator.search("abc");
        started.notified().await;
        drop(session);

        tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .expect("remote search was not cancelled")
            .unwrap();
    }
}
