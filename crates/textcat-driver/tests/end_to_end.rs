//! Driver flows against a live in-process textcat server

use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

use textcat_classifiers::TrainingConfig;
use textcat_core::{ModelStore, ScoringRequest, StoredModel, TrainingRequest};
use textcat_driver::cli::{ScoreArgs, TrainArgs};
use textcat_driver::run::{INVALID_SELECTION, NO_MODELS};
use textcat_driver::{
    run_score, run_train, DriverError, ModelSelector, Outcome, PromptSelector, ServiceClient,
};
use textcat_server::{create_router, AppState, ServerConfig};

async fn start_server(storage: &Path) -> String {
    let config = ServerConfig {
        storage_dir: storage.to_path_buf(),
        training: TrainingConfig {
            epochs: 1,
            buckets: 2_000,
            dim: 8,
            ..Default::default()
        },
        ..Default::default()
    };
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = create_router(AppState::new(config, handle).unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn write_jsonl(path: &Path, records: impl Iterator<Item = serde_json::Value>) {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path).unwrap());
    for record in records {
        writeln!(file, "{record}").unwrap();
    }
}

/// Local stand-ins for the news and encyclopedia corpora plus a datasets file
fn write_datasets(dir: &Path, rows: usize) -> std::path::PathBuf {
    let news = dir.join("ccnews.jsonl");
    let wiki = dir.join("wikipedia.jsonl");

    write_jsonl(
        &news,
        (0..rows).flat_map(|i| {
            [
                json!({"language": "de", "plain_text": format!("Aktien steigen {i}")}),
                json!({
                    "language": "en",
                    "plain_text": format!("Stock  markets rallied\u{a0}as investors cheered earnings {}", i % 50),
                }),
            ]
        }),
    );
    write_jsonl(
        &wiki,
        (0..rows).map(|i| {
            json!({
                "title": format!("River {i}"),
                "text": format!("The river is a tributary flowing through the valley basin {}", i % 50),
            })
        }),
    );

    let config = dir.join("datasets_config.yaml");
    std::fs::write(
        &config,
        format!(
            "datasets:\n  ccnews:\n    source: {}\n    split: train\n    streaming: true\n  wikipedia:\n    source: {}\n    split: train\n",
            news.display(),
            wiki.display()
        ),
    )
    .unwrap();
    config
}

fn train_args(server: &str, datasets_config: &Path, count: usize) -> TrainArgs {
    TrainArgs::try_parse_from([
        "textcat-train",
        count.to_string().as_str(),
        "--server",
        server,
        "--datasets-config",
        datasets_config.to_str().unwrap(),
    ])
    .unwrap()
}

fn score_args(server: &str, datasets_config: &Path, models_dir: &Path) -> ScoreArgs {
    ScoreArgs::try_parse_from([
        "textcat-score",
        "--server",
        server,
        "--datasets-config",
        datasets_config.to_str().unwrap(),
        "--models-dir",
        models_dir.to_str().unwrap(),
    ])
    .unwrap()
}

fn pick(index: usize) -> impl FnMut(&[StoredModel]) -> Option<usize> {
    move |_: &[StoredModel]| Some(index)
}

#[tokio::test]
async fn test_train_then_score_round_trip() {
    let dir = TempDir::new().unwrap();
    let storage = dir.path().join("models");
    let server = start_server(&storage).await;
    let datasets_config = write_datasets(dir.path(), 20_000);

    let mut out: Vec<u8> = Vec::new();
    let outcome = run_train(&train_args(&server, &datasets_config, 20_000), &mut out)
        .await
        .unwrap();
    let printed = String::from_utf8(out).unwrap();
    assert_eq!(outcome, Outcome::Success, "{printed}");
    assert!(printed.starts_with("Extracting 20000 positive samples from CCNews..."));

    let models = ModelStore::at(&storage).list().unwrap();
    assert_eq!(models.len(), 1);
    assert!(printed.contains(&models[0].identifier));

    let mut out: Vec<u8> = Vec::new();
    let outcome = run_score(
        &score_args(&server, &datasets_config, &storage),
        &mut pick(0),
        &mut out,
    )
    .await
    .unwrap();
    let printed = String::from_utf8(out).unwrap();
    assert_eq!(outcome, Outcome::Success, "{printed}");

    assert!(printed.contains(&format!("1. {}", models[0].file_name)));
    let lines: Vec<&str> = printed.lines().filter(|l| l.starts_with("Document ")).collect();
    assert_eq!(lines.len(), 10);
    for (i, line) in lines.iter().enumerate() {
        let expected = if i < 5 { "__label__positive" } else { "__label__negative" };
        assert!(
            line.starts_with(&format!("Document {}: {expected} -> ", i + 1)),
            "{line}"
        );
    }
    // samples are echoed up to 50 characters
    assert!(lines[0].ends_with(" : Stock markets rallied as investors cheered earning"));
    assert!(lines[5].ends_with(" : The river is a tributary flowing through the valle"));
}

#[tokio::test]
async fn test_score_without_models() {
    let dir = TempDir::new().unwrap();
    let datasets_config = write_datasets(dir.path(), 5);
    let args = score_args("http://127.0.0.1:9", &datasets_config, &dir.path().join("empty"));

    let mut out: Vec<u8> = Vec::new();
    let mut never_asked = |_: &[StoredModel]| -> Option<usize> { panic!("no models to pick from") };
    let outcome = run_score(&args, &mut never_asked, &mut out).await.unwrap();

    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(String::from_utf8(out).unwrap(), format!("{NO_MODELS}\n"));
}

#[tokio::test]
async fn test_score_rejects_out_of_range_selection() {
    let dir = TempDir::new().unwrap();
    let datasets_config = write_datasets(dir.path(), 5);
    let models_dir = dir.path().join("models");
    let store = ModelStore::open(&models_dir).unwrap();
    std::fs::write(store.model_path("only"), b"x").unwrap();
    let args = score_args("http://127.0.0.1:9", &datasets_config, &models_dir);

    for selector in [
        &mut pick(1) as &mut dyn ModelSelector,
        &mut PromptSelector::new("0\n".as_bytes(), std::io::sink()),
        &mut PromptSelector::new("first\n".as_bytes(), std::io::sink()),
    ] {
        let mut out: Vec<u8> = Vec::new();
        let outcome = run_score(&args, selector, &mut out).await.unwrap();
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("Available models:\n1. model_only.bin\n{INVALID_SELECTION}\n")
        );
    }
}

#[tokio::test]
async fn test_score_reports_server_error() {
    let dir = TempDir::new().unwrap();
    let server = start_server(&dir.path().join("server-models")).await;
    let datasets_config = write_datasets(dir.path(), 5);

    // known locally but never trained by this server
    let models_dir = dir.path().join("local-models");
    let store = ModelStore::open(&models_dir).unwrap();
    std::fs::write(store.model_path("stale"), b"x").unwrap();

    let mut out: Vec<u8> = Vec::new();
    let outcome = run_score(
        &score_args(&server, &datasets_config, &models_dir),
        &mut pick(0),
        &mut out,
    )
    .await
    .unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert_eq!(outcome, Outcome::Failure);
    assert!(printed.contains("Error: 500\n"), "{printed}");
    assert!(printed.contains("Specified model not found."));
    assert!(!printed.contains("Received scores:"));
}

#[tokio::test]
async fn test_train_reports_rejection() {
    let dir = TempDir::new().unwrap();
    let server = start_server(&dir.path().join("models")).await;
    let datasets_config = write_datasets(dir.path(), 5);

    let mut out: Vec<u8> = Vec::new();
    let outcome = run_train(&train_args(&server, &datasets_config, 5), &mut out)
        .await
        .unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert_eq!(outcome, Outcome::Failure);
    assert!(printed.contains("\nError: 400\n"), "{printed}");
    assert!(printed.contains("Minimum 20,000 positive samples required."));
}

#[tokio::test]
async fn test_missing_dataset_key_is_an_error() {
    let dir = TempDir::new().unwrap();
    let datasets_config = dir.path().join("datasets_config.yaml");
    std::fs::write(&datasets_config, "datasets: {}\n").unwrap();

    let args = train_args("http://127.0.0.1:9", &datasets_config, 1);
    let err = run_train(&args, &mut Vec::<u8>::new()).await.unwrap_err();
    assert!(matches!(err, DriverError::Core(textcat_core::Error::Config(_))));
}

#[tokio::test]
async fn test_rejections_come_back_as_service_errors() {
    let dir = TempDir::new().unwrap();
    let server = start_server(&dir.path().join("models")).await;
    let client = ServiceClient::new(reqwest::Client::new(), format!("{server}/"));

    let err = client
        .train(&TrainingRequest::new(vec!["too few".into()], vec![]))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_REQUEST));
    match err {
        DriverError::Service { body, .. } => {
            assert!(body.contains("Minimum 20,000 positive samples required."))
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = client
        .score(&ScoringRequest {
            samples_to_score: vec!["anything".into()],
            model_identifier: "missing".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ServiceClient::new(reqwest::Client::new(), format!("http://{addr}"));
    let err = client
        .score(&ScoringRequest {
            samples_to_score: vec![],
            model_identifier: "x".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::Http(_)));
}
