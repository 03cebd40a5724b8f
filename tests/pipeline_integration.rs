//! End-to-end analysis through the service with a real HTTP client

mod support;

use dockerfile_ai::config::AnalyzerConfig;
use dockerfile_ai::inference::OllamaClient;
use dockerfile_ai::{AnalysisService, AnalyzeOptions, AnalyzerError, CollectingSink, InferenceError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use support::{FakeOllama, Reply, INPUT_DOCKERFILE, REVIEW, REVIEW_DOCKERFILE};
use tempfile::TempDir;

fn service(server: &FakeOllama, out: &Path) -> AnalysisService {
    let mut config = AnalyzerConfig::default();
    config.output.output_dir = Some(out.to_path_buf());
    let client = OllamaClient::new(server.endpoint(), Duration::from_secs(10)).unwrap();
    AnalysisService::new(Arc::new(client), config)
}

fn input(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("Dockerfile");
    fs::write(&path, INPUT_DOCKERFILE).unwrap();
    path
}

fn files_in(dir: &Path) -> Vec<String> {
    match fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect();
            names.sort();
            names
        }
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn test_review_is_streamed_split_and_saved() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let server = FakeOllama::start(&["qwen2.5-coder:7b"]);
    server.push(Reply::streamed(REVIEW));
    let service = service(&server, &out);
    let mut sink = CollectingSink::default();

    let outcome = service
        .analyze_file(&input(&dir), &AnalyzeOptions::default(), &mut sink)
        .await
        .unwrap();

    assert!(sink.finished);
    assert_eq!(sink.chunks.concat(), REVIEW);
    assert_eq!(outcome.model, "qwen2.5-coder:7b");
    assert_eq!(outcome.result.corrected_dockerfile.as_deref(), Some(REVIEW_DOCKERFILE));
    assert!(outcome.result.narrative.contains("not pinned"));
    assert!(!outcome.result.narrative.contains("```"));

    let saved = outcome.saved.unwrap();
    let analysis_name = saved.analysis.file_name().unwrap().to_string_lossy().to_string();
    assert!(analysis_name.starts_with("Dockerfile_"));
    assert!(analysis_name.ends_with("_analysis.md"));
    assert_eq!(
        fs::read_to_string(saved.corrected.as_ref().unwrap()).unwrap(),
        REVIEW_DOCKERFILE
    );

    // The prompt embeds the input verbatim
    let prompt = server.generate_bodies()[0]["prompt"].as_str().unwrap().to_string();
    assert!(prompt.contains(INPUT_DOCKERFILE.trim_end()));
}

#[tokio::test]
async fn test_response_without_dockerfile_saves_analysis_only() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let server = FakeOllama::start(&["qwen2.5-coder:7b"]);
    server.push(Reply::streamed(
        "The file looks fine.\n\n```bash\ndocker build .\n```\n",
    ));

    let outcome = service(&server, &out)
        .analyze_file(&input(&dir), &AnalyzeOptions::default(), &mut CollectingSink::default())
        .await
        .unwrap();

    assert!(outcome.result.corrected_dockerfile.is_none());
    assert_eq!(files_in(&out.join("analysis")).len(), 1);
    assert!(files_in(&out.join("dockerfiles")).is_empty());
}

#[tokio::test]
async fn test_interrupted_stream_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let server = FakeOllama::start(&["qwen2.5-coder:7b"]);
    server.push(Reply::Truncated(vec!["## Issues\n".to_string(), "1. ".to_string()]));

    let err = service(&server, &out)
        .analyze_file(&input(&dir), &AnalyzeOptions::default(), &mut CollectingSink::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AnalyzerError::Inference(InferenceError::IncompleteStream { .. })
    ));
    assert!(files_in(&out.join("analysis")).is_empty());
    assert!(files_in(&out.join("dockerfiles")).is_empty());
}

#[tokio::test]
async fn test_save_disabled_and_model_override() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let server = FakeOllama::start(&["llama3.1:8b"]);
    server.push(Reply::streamed(REVIEW));
    let options = AnalyzeOptions {
        model: Some("llama3.1:8b".to_string()),
        prompt_version: Some("basic".to_string()),
        save: Some(false),
    };

    let outcome = service(&server, &out)
        .analyze_file(&input(&dir), &options, &mut CollectingSink::default())
        .await
        .unwrap();

    assert!(outcome.saved.is_none());
    assert!(!out.exists());
    assert_eq!(server.generate_bodies()[0]["model"], "llama3.1:8b");
}

#[tokio::test]
async fn test_saved_results_can_be_listed_and_read_back() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let server = FakeOllama::start(&["qwen2.5-coder:7b"]);
    server.push(Reply::streamed(REVIEW));
    let service = service(&server, &out);

    let outcome = service
        .analyze_file(&input(&dir), &AnalyzeOptions::default(), &mut CollectingSink::default())
        .await
        .unwrap();

    let listing = service.list_saved().unwrap();
    assert_eq!(listing.analyses.len(), 1);
    assert_eq!(listing.corrected_dockerfiles.len(), 1);

    let name = &listing.corrected_dockerfiles[0].name;
    let fetched = service.get_saved(name).unwrap();
    let on_disk = fs::read_to_string(outcome.saved.unwrap().corrected.unwrap()).unwrap();
    assert_eq!(fetched.content, on_disk);
}
