#![allow(dead_code)]

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use connectors::file::csv::{source::CsvRecordSource, writer::read_audit_log};
use engine_config::settings::Settings;
use chrono::Utc;
use engine_core::{
    connectors::{scorer::HttpScorer, sink::memory::MemorySink},
    metrics::Metrics,
};
use engine_processing::scorer::RetryingScorer;
use engine_runtime::{
    error::RuntimeError,
    execution::{
        offload::OffloadRun,
        scoring::ScoringRun,
        summary::{OffloadSummary, RunSummary},
    },
};
use model::{core::value::Value, records::audit::AuditLog};
use serde_json::{Value as JsonValue, json};
use std::{
    fs,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Header and rows of a small loan performance file.
pub const PERF_HEADER: &str = "BAD,LOAN,MORTDUE,VALUE,JOB";

/// Probability pair the fake model returns for a loan amount, as
/// `[[p0, ...], [p1, ...]]`. Amounts divisible by three are confidently
/// good, remainder one is bad, remainder two is a coin flip.
pub fn model_result(loan: i64) -> JsonValue {
    match loan.rem_euclid(3) {
        0 => json!([[0.9, 0.1], [0.1, 0.9]]),
        1 => json!([[0.2, 0.8], [0.8, 0.2]]),
        _ => json!([[0.5, 0.5], [0.5, 0.5]]),
    }
}

#[derive(Default)]
struct ModelState {
    requests: AtomicUsize,
    examples: AtomicUsize,
    fail_status: Option<u16>,
    cancel_after: Option<(usize, CancellationToken)>,
}

/// In-process stand-in for the deployed model, scoring by the `LOAN` predictor.
pub struct ModelServer {
    port: u16,
    state: Arc<ModelState>,
}

impl ModelServer {
    pub async fn start() -> Self {
        Self::spawn(ModelState::default()).await
    }

    /// Every request is answered with `status` and an error body.
    pub async fn failing(status: u16) -> Self {
        Self::spawn(ModelState {
            fail_status: Some(status),
            ..Default::default()
        })
        .await
    }

    /// Cancels `token` once `after` requests have been answered.
    pub async fn cancelling(after: usize, token: CancellationToken) -> Self {
        Self::spawn(ModelState {
            cancel_after: Some((after, token)),
            ..Default::default()
        })
        .await
    }

    async fn spawn(state: ModelState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/score", post(score_examples))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind model server");
        let port = listener.local_addr().expect("local addr").port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("model server");
        });

        Self { port, state }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn examples(&self) -> usize {
        self.state.examples.load(Ordering::SeqCst)
    }
}

async fn score_examples(
    State(state): State<Arc<ModelState>>,
    Json(body): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
    let served = state.requests.fetch_add(1, Ordering::SeqCst) + 1;

    if let Some(status) = state.fail_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({ "error": "model unavailable" })));
    }

    let examples = body["examples"].as_array().cloned().unwrap_or_default();
    state.examples.fetch_add(examples.len(), Ordering::SeqCst);
    let results: Vec<JsonValue> = examples
        .iter()
        .map(|e| model_result(e["LOAN"].as_i64().unwrap_or_default()))
        .collect();

    debug!(request = served, examples = results.len(), "Model request answered");

    if let Some((after, token)) = &state.cancel_after
        && served >= *after
    {
        token.cancel();
    }

    (StatusCode::OK, Json(json!({ "results": results })))
}

/// Port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

/// Temporary input directory and log location for one test.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("data")).expect("create data dir");
        Self { dir }
    }

    /// Writes an input file with the standard header; `rows` are CSV lines.
    pub fn input(&self, name: &str, rows: &[&str]) -> &Self {
        let mut contents = format!("{PERF_HEADER}\n");
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        fs::write(self.dir.path().join("data").join(name), contents).expect("write input");
        self
    }

    /// Leaves a log from an earlier run in place, as if not yet offloaded.
    pub fn pending_log(&self, contents: &str) {
        let path = self.log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create log dir");
        }
        fs::write(path, contents).expect("write pending log");
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("audit").join("log.csv")
    }

    /// Settings pointing at a model on `port`. `table` lines land in the
    /// `[table]` section.
    pub fn settings(&self, port: u16, table: &str) -> Settings {
        let toml = format!(
            r#"
[model_endpoint]
host = "127.0.0.1"
port = {port}
path = "score"
timeout_secs = 5

[variables]
target = "BAD"
inputs = ["LOAN", "MORTDUE", "VALUE", "JOB"]
outputs = ["P_BAD0", "P_BAD1", "EM_PROBABILITY", "EM_CLASSIFICATION"]

[data]
input_dir = '{}'
log_path = '{}'

[retry]
max_attempts = 2
base_delay_ms = 0
max_delay_ms = 0

[table]
prefix = "perf"
time_label = {{ fixed = "2021Q" }}
{table}
"#,
            self.dir.path().join("data").display(),
            self.log_path().display(),
        );
        Settings::from_toml_str(&toml).expect("settings")
    }

    pub fn read_log(&self) -> AuditLog {
        read_audit_log(&CsvRecordSource::default(), &self.log_path(), None).expect("read log")
    }
}

/// Runs a scoring pass the way the `score` command wires it.
pub async fn score(
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<RunSummary, RuntimeError> {
    let metrics = Metrics::new();
    let http = HttpScorer::new(settings.model_endpoint.to_http_endpoint())
        .map_err(|e| RuntimeError::Initialization(e.to_string()))?;
    let scorer = RetryingScorer::new(http, settings.retry.to_policy(), metrics.clone());
    ScoringRun::new(settings, Arc::new(scorer), metrics)?
        .run(cancel)
        .await
}

/// Runs an offload into `sink` the way the `offload` command wires it.
pub async fn offload(
    settings: &Settings,
    sink: &MemorySink,
) -> Result<OffloadSummary, RuntimeError> {
    OffloadRun::new(settings, Arc::new(sink.clone()), Metrics::new(), Utc::now())?
        .run(&CancellationToken::new())
        .await
}

pub fn column(log: &AuditLog, name: &str) -> Vec<Value> {
    log.records
        .iter()
        .map(|r| r.get(name).cloned().unwrap_or(Value::Null))
        .collect()
}
