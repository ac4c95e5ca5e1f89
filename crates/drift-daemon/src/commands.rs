//! Command implementations for the drift daemon.
//!
//! Handles:
//! - check: run the local drift heuristic and print the assessment
//! - suggest: ask the configured LLM for a title
//! - replay: push recorded events through the worker pool
//! - config: print the effective settings

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use drift_detect::DriftDetector;
use drift_llm::{build_llm_client, LlmClient, TitleSuggester};
use drift_types::{RawTopicTitleEvent, Settings};
use drift_worker::{
    ContextStore, InMemoryStore, LogSink, NotificationSink, PipelineMetricsSnapshot,
    SuggestionPipeline, WorkerPool,
};

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(log_level) = log_level {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber, writing to stderr.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Build the title suggester from settings around `client`.
pub fn build_suggester(settings: &Settings, client: Arc<dyn LlmClient>) -> TitleSuggester {
    TitleSuggester::new(client, &settings.llm.model, settings.suggestion.clone())
}

/// Build a pipeline from settings and collaborators.
pub fn build_pipeline(
    settings: &Settings,
    store: Arc<dyn ContextStore>,
    sink: Arc<dyn NotificationSink>,
    client: Arc<dyn LlmClient>,
) -> SuggestionPipeline {
    SuggestionPipeline::new(
        store,
        sink,
        DriftDetector::new(settings.drift.clone()),
        build_suggester(settings, client),
    )
}

/// Run the drift heuristic and write the assessment as JSON.
pub fn handle_check(
    settings: &Settings,
    title: &str,
    message: &str,
    history: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let detector = DriftDetector::new(settings.drift.clone());
    let assessment = detector.evaluate(title, history, message);
    serde_json::to_writer_pretty(&mut *out, &assessment)?;
    writeln!(out)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SuggestOutput<'a> {
    current_topic: &'a str,
    suggested_topic: Option<String>,
}

/// Ask the configured LLM for a title and write the result as JSON.
///
/// A missing suggestion is reported as `null`, never as an error.
pub async fn handle_suggest(
    settings: &Settings,
    title: &str,
    messages: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let client = build_llm_client(&settings.llm).context("Failed to build LLM client")?;
    let result = build_suggester(settings, client).suggest(title, messages).await;

    let output = SuggestOutput {
        current_topic: title,
        suggested_topic: result.into_title(),
    };
    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out)?;
    Ok(())
}

/// Replay events through the worker pool.
///
/// Notifications go to stdout as JSON lines; the metrics summary goes to
/// stderr. Ctrl-C cancels the workers after their in-flight events.
pub async fn handle_replay(
    mut settings: Settings,
    store_path: &Path,
    events_path: Option<&Path>,
    concurrency: Option<usize>,
) -> Result<()> {
    if let Some(concurrency) = concurrency {
        settings.worker.concurrency = concurrency;
    }
    settings.validate()?;

    let store = InMemoryStore::from_json_file(store_path)
        .with_context(|| format!("Failed to load store fixture {}", store_path.display()))?;
    info!(
        path = %store_path.display(),
        messages = store.message_count(),
        "Loaded store fixture"
    );

    let client = build_llm_client(&settings.llm).context("Failed to build LLM client")?;
    let sink = Arc::new(LogSink::stdout());

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping workers");
            ctrl_c.cancel();
        }
    });

    let snapshot = match events_path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open events file {}", path.display()))?;
            replay_events(&settings, Arc::new(store), sink, client, BufReader::new(file), cancel)
                .await?
        }
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            replay_events(&settings, Arc::new(store), sink, client, stdin, cancel).await?
        }
    };

    let summary = serde_json::to_string(&snapshot)?;
    eprintln!("{summary}");
    Ok(())
}

/// Feed JSON-lines `events` through a worker pool and wait for it to drain.
///
/// Blank lines are ignored; lines that are not JSON are logged and skipped.
pub async fn replay_events<R>(
    settings: &Settings,
    store: Arc<dyn ContextStore>,
    sink: Arc<dyn NotificationSink>,
    client: Arc<dyn LlmClient>,
    events: R,
    cancel: CancellationToken,
) -> Result<PipelineMetricsSnapshot>
where
    R: AsyncBufRead + Unpin,
{
    let pipeline = Arc::new(build_pipeline(settings, store, sink, client));
    let (queue, pool) = WorkerPool::start(pipeline.clone(), &settings.worker, cancel.clone());

    let mut lines = events.lines();
    let mut line_no = 0usize;
    loop {
        // Idle input must not outlive cancellation
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = lines.next_line() => next.context("Failed to read events")?,
        };
        let Some(line) = next else { break };
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        match RawTopicTitleEvent::from_json(&line) {
            Ok(event) => {
                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    sent = queue.send(event) => sent,
                };
                if sent.is_err() {
                    warn!(line = line_no, "Workers stopped, ending replay");
                    break;
                }
            }
            Err(e) => warn!(line = line_no, error = %e, "Skipping malformed event"),
        }
    }

    drop(queue);
    pool.join().await;

    let snapshot = pipeline.metrics().snapshot();
    info!(
        received = snapshot.received,
        suggested = snapshot.suggested,
        no_drift = snapshot.no_drift,
        rejected = snapshot.total_rejected(),
        panicked = snapshot.panicked,
        "Replay complete"
    );
    Ok(snapshot)
}

/// Write the effective settings as TOML with secrets redacted.
pub fn handle_config(settings: &Settings, out: &mut impl Write) -> Result<()> {
    let rendered =
        toml::to_string_pretty(&settings.redacted()).context("Failed to render configuration")?;
    out.write_all(rendered.as_bytes())?;
    Ok(())
}
