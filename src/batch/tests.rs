use super::*;
use crate::error::{Error, ResolutionError, SubprocessError};
use crate::types::{BatchResult, Outcome, RetrievalRequest};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Strategy double: fails URLs containing "fail", hangs on URLs containing
/// "hang", succeeds otherwise; records when each call happened.
struct ScriptedStrategy {
    kind: StrategyKind,
    pacing: Option<Duration>,
    calls: Mutex<Vec<(String, Instant)>>,
    cancel_on_call: Option<CancellationToken>,
}

impl ScriptedStrategy {
    fn api(pacing: Duration) -> Self {
        Self {
            kind: StrategyKind::Api,
            pacing: Some(pacing),
            calls: Mutex::new(Vec::new()),
            cancel_on_call: None,
        }
    }

    fn tool() -> Self {
        Self {
            kind: StrategyKind::YtDlp,
            pacing: None,
            calls: Mutex::new(Vec::new()),
            cancel_on_call: None,
        }
    }

    fn called_urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(u, _)| u.clone())
            .collect()
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl RetrievalStrategy for ScriptedStrategy {
    async fn resolve(&self, request: &RetrievalRequest) -> crate::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((request.url().to_string(), Instant::now()));
        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }

        let url = request.url();
        if url.contains("hang") {
            std::future::pending::<()>().await;
        }
        if url.contains("fail-api") {
            return Err(ResolutionError::Api {
                code: Some(1),
                message: "rate limited".into(),
            }
            .into());
        }
        if url.contains("fail-tool") {
            return Err(SubprocessError::Failed {
                code: Some(1),
                output: "ERROR: Unsupported URL".into(),
            }
            .into());
        }
        let id = url.rsplit('/').next().unwrap_or("x");
        Ok(format!("{id}.mp4"))
    }

    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn pacing_delay(&self) -> Option<Duration> {
        self.pacing
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.download.item_timeout = None;
    config
}

fn downloader(strategy: Arc<ScriptedStrategy>) -> BatchDownloader {
    BatchDownloader::with_strategy(test_config(), strategy)
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn scenario_drops_non_url_token_and_dispatches_two() {
    let strategy = Arc::new(ScriptedStrategy::api(Duration::from_millis(1100)));
    let batch = downloader(strategy.clone());

    let result = batch
        .run("https://tiktok.com/@a/video/1 not-a-url https://tiktok.com/@a/video/2")
        .await
        .unwrap();

    assert_eq!(
        strategy.called_urls(),
        vec![
            "https://tiktok.com/@a/video/1",
            "https://tiktok.com/@a/video/2"
        ]
    );
    assert_eq!(result.success_count, 2);
    assert_eq!(result.fail_count, 0);
}

#[tokio::test(start_paused = true)]
async fn item_failure_does_not_abort_the_batch() {
    let strategy = Arc::new(ScriptedStrategy::api(Duration::from_millis(1100)));
    let batch = downloader(strategy.clone());

    let result = batch
        .run(
            "https://tiktok.com/@a/video/1\n\
             https://tiktok.com/@a/fail-api/2\n\
             https://tiktok.com/@a/video/3",
        )
        .await
        .unwrap();

    assert_eq!(strategy.called_urls().len(), 3);
    assert_eq!(result.success_count, 2);
    assert_eq!(result.fail_count, 1);
    assert_eq!(result.total(), 3);
    assert_eq!(
        result.items[1].outcome,
        Outcome::Failure {
            reason: "rate limited".into()
        }
    );
    assert_eq!(result.failed_urls(), vec!["https://tiktok.com/@a/fail-api/2"]);
}

#[tokio::test(start_paused = true)]
async fn subprocess_failure_is_recorded_with_captured_text() {
    let strategy = Arc::new(ScriptedStrategy::tool());
    let batch = downloader(strategy);

    let result = batch
        .run("https://tiktok.com/@a/fail-tool/1")
        .await
        .unwrap();

    assert_eq!(result.fail_count, 1);
    match &result.items[0].outcome {
        Outcome::Failure { reason } => assert!(reason.contains("ERROR: Unsupported URL")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn counts_always_sum_to_validated_urls() {
    let inputs = [
        "https://tiktok.com/1",
        "https://tiktok.com/fail-api/1 https://tiktok.com/fail-tool/2",
        "junk https://tiktok.com/1 https://tiktok.com/fail-api/2 more-junk https://tiktok.com/3",
    ];
    for raw in inputs {
        let strategy = Arc::new(ScriptedStrategy::api(Duration::from_millis(10)));
        let batch = downloader(strategy);
        let validated = parse_urls(raw, "tiktok.com").unwrap().len();

        let result = batch.run(raw).await.unwrap();

        assert_eq!(result.success_count + result.fail_count, validated, "{raw:?}");
        assert_eq!(result.items.len(), validated, "{raw:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn api_strategy_is_paced_between_items_but_not_after_the_last() {
    let pacing = Duration::from_millis(1100);
    let strategy = Arc::new(ScriptedStrategy::api(pacing));
    let batch = downloader(strategy.clone());
    let start = Instant::now();

    let _ = batch
        .run("https://tiktok.com/1 https://tiktok.com/2 https://tiktok.com/3")
        .await
        .unwrap();
    let elapsed = start.elapsed();

    let times = strategy.call_times();
    assert_eq!(times.len(), 3);
    assert!(times[1] - times[0] >= pacing);
    assert!(times[2] - times[1] >= pacing);
    assert!(elapsed >= pacing * 2);
    assert!(elapsed < pacing * 3, "no pause after the last item: {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn tool_strategy_is_not_paced() {
    let strategy = Arc::new(ScriptedStrategy::tool());
    let batch = downloader(strategy.clone());
    let mut rx = batch.subscribe();

    let _ = batch
        .run("https://tiktok.com/1 https://tiktok.com/2 https://tiktok.com/3")
        .await
        .unwrap();

    let times = strategy.call_times();
    assert_eq!(times[2] - times[0], Duration::ZERO);
    assert!(
        !drain(&mut rx)
            .iter()
            .any(|e| matches!(e, Event::Pacing { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn validation_failure_dispatches_nothing_and_emits_nothing() {
    let strategy = Arc::new(ScriptedStrategy::api(Duration::from_millis(1100)));
    let batch = downloader(strategy.clone());
    let mut rx = batch.subscribe();

    for raw in ["", "   \n", "no urls here at all"] {
        let err = batch.run(raw).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{raw:?}: {err:?}");
    }

    assert!(strategy.called_urls().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn hanging_item_times_out_and_batch_continues() {
    let strategy = Arc::new(ScriptedStrategy::tool());
    let mut config = test_config();
    config.download.item_timeout = Some(Duration::from_secs(5));
    let batch = BatchDownloader::with_strategy(config, strategy.clone());

    let result = batch
        .run("https://tiktok.com/hang/1 https://tiktok.com/2")
        .await
        .unwrap();

    assert_eq!(result.fail_count, 1);
    assert_eq!(result.success_count, 1);
    assert_eq!(
        result.items[0].outcome,
        Outcome::Failure {
            reason: "timed out after 5s".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_before_next_dispatch() {
    let batch_token = CancellationToken::new();
    let strategy = Arc::new(ScriptedStrategy {
        cancel_on_call: Some(batch_token.clone()),
        ..ScriptedStrategy::api(Duration::from_secs(60))
    });
    let mut batch = downloader(strategy.clone());
    batch.cancel_token = batch_token;
    let mut rx = batch.subscribe();
    let start = Instant::now();

    let result = batch
        .run("https://tiktok.com/1 https://tiktok.com/2 https://tiktok.com/3")
        .await
        .unwrap();

    assert_eq!(strategy.called_urls(), vec!["https://tiktok.com/1"]);
    assert_eq!(result.total(), 1);
    assert!(start.elapsed() < Duration::from_secs(60), "pacing must be cut short");
    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, Event::BatchCancelled { dispatched: 1 }))
    );
}

#[tokio::test(start_paused = true)]
async fn events_follow_dispatch_order() {
    let strategy = Arc::new(ScriptedStrategy::api(Duration::from_millis(1100)));
    let batch = downloader(strategy);
    let mut rx = batch.subscribe();

    let result = batch
        .run("https://tiktok.com/1 https://tiktok.com/fail-api/2")
        .await
        .unwrap();

    let events = drain(&mut rx);
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| match e {
            Event::BatchStarted { .. } => "started",
            Event::ItemStarted { .. } => "item",
            Event::ItemSucceeded { .. } => "ok",
            Event::ItemFailed { .. } => "failed",
            Event::Pacing { .. } => "pacing",
            Event::BatchCancelled { .. } => "cancelled",
            Event::BatchFinished { .. } => "finished",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["started", "item", "ok", "pacing", "item", "failed", "finished"]
    );

    match events.last() {
        Some(Event::BatchFinished { result: reported }) => assert_eq!(reported, &result),
        other => panic!("expected BatchFinished, got {other:?}"),
    }
    match &events[0] {
        Event::BatchStarted { total, strategy } => {
            assert_eq!(*total, 2);
            assert_eq!(*strategy, StrategyKind::Api);
        }
        other => panic!("expected BatchStarted, got {other:?}"),
    }
}

#[tokio::test]
async fn new_creates_download_directory_with_parents() {
    let temp = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.download.download_dir = temp.path().join("Downloads").join("tiktok videos");

    let batch = BatchDownloader::new(config, StrategyKind::Api).await.unwrap();

    assert!(batch.config().download_dir().is_dir());
    assert_eq!(batch.strategy_kind(), StrategyKind::Api);
}

#[tokio::test]
async fn new_rejects_invalid_config() {
    let mut config = Config::default();
    config.download.url_filter = String::new();

    let result = BatchDownloader::new(config, StrategyKind::Api).await;

    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn empty_batch_result_is_all_succeeded() {
    let result = BatchResult::default();
    assert!(result.all_succeeded());
    assert_eq!(result.total(), 0);
}
