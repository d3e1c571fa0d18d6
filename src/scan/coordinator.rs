// src/scan/coordinator.rs
// =============================================================================
// This module runs the scan: one worker per wordlist chunk.
//
// How it works:
// 1. The wordlist is split into contiguous chunks (see partition.rs)
// 2. Every non-empty chunk gets its own tokio task (a "worker")
// 3. A worker walks its words in order, expands each word into candidate
//    URLs, probes them one by one and records hits in the ResultStore
// 4. After every request the worker sleeps for the configured delay
// 5. The coordinator waits for every worker, then takes the snapshot
//
// Cancellation is cooperative: workers check the flag before each word and
// before each candidate. A request that is already in flight is allowed to
// finish (bounded by the request timeout), but no retry of it is started
// once the flag is up. Hits collected before the cancellation are kept.
//
// Lifecycle: Coordinator::new() (idle) -> run() (running) -> ScanReport
// with status Completed or Cancelled. run() consumes the coordinator, so a
// scan cannot be started twice.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::cancel::CancellationFlag;
use super::partition::{candidates, partition};
use super::store::ResultStore;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::probe::{FailureKind, Hit, ProbeOutcome, Prober};

/// Receives live notifications from the workers.
///
/// Both callbacks run synchronously on the worker that produced the event.
pub trait ScanObserver: Send + Sync {
    /// Called once per URL, right after it was inserted into the store
    fn on_hit(&self, hit: &Hit);

    /// Called once per failed candidate (after retries, never per attempt)
    fn on_failure(&self, url: &str, failure: &FailureKind);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Every worker went through its whole chunk
    Completed,
    /// The cancellation flag was raised before all work was done
    Cancelled,
}

/// Final outcome of a scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub status: ScanStatus,
    /// Hits in discovery order
    pub hits: Vec<Hit>,
}

// Per-worker pacing: sleep `delay` after every request.
//
// Each worker has its own limiter, so the aggregate rate is roughly
// threads / delay requests per second.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    delay: Duration,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn wait(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

// State shared by every worker of one scan
struct Shared {
    base_url: String,
    extensions: Vec<String>,
    prober: Prober,
    limiter: RateLimiter,
    store: ResultStore,
    cancel: CancellationFlag,
    observer: Arc<dyn ScanObserver>,
}

pub struct Coordinator {
    threads: usize,
    shared: Arc<Shared>,
}

impl Coordinator {
    /// Prepares a scan. Fails only on fatal configuration problems
    /// (invalid config, unusable HTTP client, output file that cannot be
    /// opened); nothing has been sent yet when this returns.
    pub fn new(
        config: ScanConfig,
        cancel: CancellationFlag,
        observer: Arc<dyn ScanObserver>,
    ) -> Result<Self, ScanError> {
        config.validate()?;

        let prober = Prober::new(config.timeout, config.retry.clone(), config.policy.clone())?;
        let store = match &config.output {
            Some(path) => ResultStore::append_to(path)?,
            None => ResultStore::new(),
        };

        Ok(Self {
            threads: config.threads,
            shared: Arc::new(Shared {
                base_url: config.base_url,
                extensions: config.extensions,
                prober,
                limiter: RateLimiter::new(config.delay),
                store,
                cancel,
                observer,
            }),
        })
    }

    /// Runs the scan to completion or cancellation and returns what was found
    pub async fn run(self, words: Vec<String>) -> ScanReport {
        let total_words = words.len();
        let chunks = partition(words, self.threads);
        info!(words = total_words, workers = chunks.len(), "scan running");

        let handles: Vec<_> = chunks
            .into_iter()
            .enumerate()
            .map(|(id, chunk)| tokio::spawn(worker(id, chunk, Arc::clone(&self.shared))))
            .collect();

        for result in join_all(handles).await {
            if let Err(e) = result {
                error!(error = %e, "worker task failed");
            }
        }

        let status = if self.shared.cancel.is_cancelled() {
            ScanStatus::Cancelled
        } else {
            ScanStatus::Completed
        };
        let hits = self.shared.store.snapshot();
        info!(?status, hits = hits.len(), "scan finished");

        ScanReport { status, hits }
    }
}

async fn worker(id: usize, chunk: Vec<String>, shared: Arc<Shared>) {
    debug!(worker = id, words = chunk.len(), "worker started");

    'words: for word in &chunk {
        if shared.cancel.is_cancelled() {
            break;
        }

        for url in candidates(&shared.base_url, word, &shared.extensions) {
            if shared.cancel.is_cancelled() {
                break 'words;
            }

            match shared.prober.probe(&url, &shared.cancel).await {
                ProbeOutcome::Hit(hit) => {
                    if shared.store.try_insert(hit.clone()) {
                        shared.observer.on_hit(&hit);
                    }
                }
                ProbeOutcome::Miss { status } => debug!(url = %url, status, "miss"),
                ProbeOutcome::Failure(failure) => shared.observer.on_failure(&url, &failure),
            }

            shared.limiter.wait().await;
        }
    }

    debug!(worker = id, cancelled = shared.cancel.is_cancelled(), "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{RetryPolicy, ScanPolicy};
    use std::sync::Mutex;
    use std::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct Recorder {
        hits: Mutex<Vec<Hit>>,
        failures: Mutex<Vec<(String, FailureKind)>>,
        cancel_on_hit: Option<CancellationFlag>,
    }

    impl ScanObserver for Recorder {
        fn on_hit(&self, hit: &Hit) {
            self.hits.lock().unwrap().push(hit.clone());
            if let Some(flag) = &self.cancel_on_hit {
                flag.cancel();
            }
        }

        fn on_failure(&self, url: &str, failure: &FailureKind) {
            self.failures
                .lock()
                .unwrap()
                .push((url.to_string(), failure.clone()));
        }
    }

    fn test_config(server: &MockServer) -> ScanConfig {
        let mut config = ScanConfig::new(&server.uri()).unwrap();
        config.delay = Duration::ZERO;
        config.timeout = Duration::from_secs(5);
        config.retry = RetryPolicy {
            backoff_base: Duration::from_millis(5),
            ..RetryPolicy::default()
        };
        config
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    async fn mount_ok(server: &MockServer, p: &str, expected: u64) {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(expected)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_extensions_expand_each_word() {
        let server = MockServer::start().await;
        mount_ok(&server, "/admin.php", 1).await;
        mount_ok(&server, "/login.php", 1).await;

        let mut config = test_config(&server);
        config.extensions = vec![".php".to_string()];
        let recorder = Arc::new(Recorder::default());

        let report = Coordinator::new(config, CancellationFlag::new(), recorder.clone())
            .unwrap()
            .run(words(&["admin", "login"]))
            .await;

        assert_eq!(report.status, ScanStatus::Completed);
        assert_eq!(report.hits.len(), 2);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
        assert_eq!(recorder.hits.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_no_extensions_probe_bare_words() {
        let server = MockServer::start().await;
        mount_ok(&server, "/admin", 1).await;
        mount_ok(&server, "/login", 1).await;

        let recorder = Arc::new(Recorder::default());
        let report = Coordinator::new(test_config(&server), CancellationFlag::new(), recorder)
            .unwrap()
            .run(words(&["admin", "login"]))
            .await;

        let mut urls: Vec<String> = report.hits.into_iter().map(|h| h.url).collect();
        urls.sort();
        assert_eq!(
            urls,
            vec![format!("{}/admin", server.uri()), format!("{}/login", server.uri())]
        );
    }

    #[tokio::test]
    async fn test_only_policy_hits_are_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut config = test_config(&server);
        config.policy = ScanPolicy::new([200, 301], [404]).unwrap();

        let report = Coordinator::new(config, CancellationFlag::new(), Arc::new(Recorder::default()))
            .unwrap()
            .run(words(&["old", "gone", "nothing"]))
            .await;

        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].status, 301);
    }

    #[tokio::test]
    async fn test_same_url_from_two_workers_recorded_once() {
        let server = MockServer::start().await;
        mount_ok(&server, "/admin", 2).await;

        let mut config = test_config(&server);
        config.threads = 2;
        let recorder = Arc::new(Recorder::default());

        let report = Coordinator::new(config, CancellationFlag::new(), recorder.clone())
            .unwrap()
            .run(words(&["admin", "admin"]))
            .await;

        assert_eq!(report.hits.len(), 1);
        assert_eq!(recorder.hits.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_sends_nothing() {
        let server = MockServer::start().await;
        mount_ok(&server, "/admin", 0).await;

        let cancel = CancellationFlag::new();
        cancel.cancel();

        let report = Coordinator::new(test_config(&server), cancel, Arc::new(Recorder::default()))
            .unwrap()
            .run(words(&["admin", "login", "backup"]))
            .await;

        assert_eq!(report.status, ScanStatus::Cancelled);
        assert!(report.hits.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_scan_keeps_collected_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut config = test_config(&server);
        config.threads = 1;
        let cancel = CancellationFlag::new();
        let recorder = Arc::new(Recorder {
            cancel_on_hit: Some(cancel.clone()),
            ..Recorder::default()
        });

        let report = Coordinator::new(config, cancel, recorder)
            .unwrap()
            .run(words(&["a", "b", "c", "d"]))
            .await;

        assert_eq!(report.status, ScanStatus::Cancelled);
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].url, format!("{}/a", server.uri()));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_backoff_stops_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut config = test_config(&server);
        config.threads = 1;
        config.retry.backoff_base = Duration::from_millis(200);
        let cancel = CancellationFlag::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let report = Coordinator::new(config, cancel, Arc::new(Recorder::default()))
            .unwrap()
            .run(words(&["admin", "login"]))
            .await;

        assert_eq!(report.status, ScanStatus::Cancelled);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_failures_reported_once_and_scan_continues() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .expect(4)
            .mount(&server)
            .await;
        mount_ok(&server, "/fine", 1).await;

        let mut config = test_config(&server);
        config.threads = 1;
        let recorder = Arc::new(Recorder::default());

        let report = Coordinator::new(config, CancellationFlag::new(), recorder.clone())
            .unwrap()
            .run(words(&["broken", "fine"]))
            .await;

        assert_eq!(report.status, ScanStatus::Completed);
        assert_eq!(report.hits.len(), 1);

        let failures = recorder.failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, format!("{}/broken", server.uri()));
        assert!(matches!(failures[0].1, FailureKind::Request(_)));
    }

    #[tokio::test]
    async fn test_output_file_written_incrementally() {
        let server = MockServer::start().await;
        mount_ok(&server, "/admin", 1).await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("found.txt");
        let mut config = test_config(&server);
        config.output = Some(output.clone());

        Coordinator::new(config, CancellationFlag::new(), Arc::new(Recorder::default()))
            .unwrap()
            .run(words(&["admin", "nothing"]))
            .await;

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, format!("{}/admin\n", server.uri()));
    }

    #[tokio::test]
    async fn test_delay_applies_after_every_request() {
        let server = MockServer::start().await;

        let mut config = test_config(&server);
        config.threads = 1;
        config.delay = Duration::from_millis(50);

        let started = Instant::now();
        Coordinator::new(config, CancellationFlag::new(), Arc::new(Recorder::default()))
            .unwrap()
            .run(words(&["a", "b", "c"]))
            .await;

        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_empty_wordlist_completes() {
        let server = MockServer::start().await;
        let report = Coordinator::new(
            test_config(&server),
            CancellationFlag::new(),
            Arc::new(Recorder::default()),
        )
        .unwrap()
        .run(Vec::new())
        .await;

        assert_eq!(report.status, ScanStatus::Completed);
        assert!(report.hits.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected_before_scan() {
        let mut config = ScanConfig::new("http://127.0.0.1:9").unwrap();
        config.threads = 0;
        let result = Coordinator::new(config, CancellationFlag::new(), Arc::new(Recorder::default()));
        assert!(matches!(result, Err(ScanError::InvalidConfig(_))));
    }
}
