//! End-to-end pipeline tests with in-process fakes for every remote service

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use papercast_cli::Pipeline;
use papercast_core::{DigestConfig, Error, NewsLog, PaperId, PaperRecord, PaperSource, ProcessedIdStore};
use papercast_llm::providers::ProviderTrait;
use papercast_llm::{GenerateRequest, GenerateResponse, LLMConfig, LLMError, Localizer};
use papercast_spk::{SpeechConfig, SpeechError, SpeechSynthesizer, TtsEngineTrait, VoiceConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

fn paper(topic: &str, id: &str, title: &str) -> PaperRecord {
    PaperRecord {
        query: topic.to_string(),
        id: PaperId::new(id),
        url: format!("http://arxiv.org/abs/{}", id),
        title: title.to_string(),
        summary: format!("We study {} in depth.", title),
        authors: vec!["Doe, J.".to_string()],
        published_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
    }
}

/// Serves canned results per topic; topics without an entry fail.
struct CannedSource {
    results: HashMap<String, Vec<PaperRecord>>,
    searches: Mutex<Vec<String>>,
}

impl CannedSource {
    fn new(results: Vec<(&str, Vec<PaperRecord>)>) -> Arc<Self> {
        Arc::new(Self {
            results: results.into_iter().map(|(t, p)| (t.to_string(), p)).collect(),
            searches: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl PaperSource for CannedSource {
    async fn search(&self, topic: &str, _max_results: usize) -> papercast_core::Result<Vec<PaperRecord>> {
        self.searches.lock().push(topic.to_string());
        self.results
            .get(topic)
            .cloned()
            .ok_or_else(|| Error::Source(format!("no results for {}", topic)))
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Answers every prompt with a fixed translation unless the prompt contains
/// one of the `fail_on` fragments.
struct EchoProvider {
    fail_on: Vec<String>,
}

impl EchoProvider {
    fn new(fail_on: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            fail_on: fail_on.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[async_trait]
impl ProviderTrait for EchoProvider {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn has_api_key(&self) -> bool {
        true
    }

    fn set_api_key(&mut self, _key: String) {}

    async fn generate(&self, request: GenerateRequest) -> papercast_llm::Result<GenerateResponse> {
        if self.fail_on.iter().any(|f| request.prompt.contains(f.as_str())) {
            return Err(LLMError::Provider("quota exceeded".to_string()));
        }
        let content = if request.prompt.contains("Title:") {
            "「中文標題」"
        } else {
            "中文摘要"
        };
        Ok(GenerateResponse {
            content: content.to_string(),
            model: "echo".to_string(),
            usage: None,
            finish_reason: Some("STOP".to_string()),
        })
    }

    fn available_models(&self) -> Vec<String> {
        vec!["echo".to_string()]
    }
}

struct FakeEngine {
    fail: bool,
    texts: Mutex<Vec<String>>,
}

impl FakeEngine {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self { fail, texts: Mutex::new(Vec::new()) })
    }
}

#[async_trait]
impl TtsEngineTrait for FakeEngine {
    async fn synthesize(&self, text: &str, _config: &VoiceConfig) -> Result<Bytes, SpeechError> {
        self.texts.lock().push(text.to_string());
        if self.fail {
            return Err(SpeechError::Api("speech service down".to_string()));
        }
        Ok(Bytes::from_static(b"ID3fake"))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn digest(dir: &Path, topics: &[&str]) -> DigestConfig {
    DigestConfig {
        topics: topics.iter().map(|t| t.to_string()).collect(),
        news_path: dir.join("news.jsonl"),
        processed_ids_path: dir.join("processed_ids.txt"),
        audio_dir: dir.join("audios"),
        ..DigestConfig::default()
    }
}

fn pipeline(
    digest: DigestConfig,
    source: Arc<CannedSource>,
    provider: Arc<EchoProvider>,
    engine: Option<Arc<FakeEngine>>,
) -> Pipeline {
    let localizer = Localizer::new(provider, LLMConfig::default());
    let speech = engine.map(|e| SpeechSynthesizer::with_engine(SpeechConfig::default(), e));
    Pipeline::new(digest, source, localizer, speech)
}

fn raw_lines(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn test_first_run_logs_one_paper_per_topic() {
    let dir = tempfile::tempdir().unwrap();
    let source = CannedSource::new(vec![
        ("AI", vec![paper("AI", "2401.00001v1", "A Study of X"), paper("AI", "2401.00002v1", "Another")]),
        ("Diffusion Model", vec![paper("Diffusion Model", "2401.00003v1", "Diffusing")]),
    ]);
    let engine = FakeEngine::new(false);
    let config = digest(dir.path(), &["AI", "Diffusion Model"]);
    let p = pipeline(config.clone(), source.clone(), EchoProvider::new(&[]), Some(engine.clone()));

    let summary = p.run().await.unwrap();
    assert_eq!(summary.papers_fetched, 2);
    assert_eq!(summary.papers_logged, 2);
    assert_eq!(summary.audio_failures, 0);
    assert_eq!(*source.searches.lock(), vec!["AI", "Diffusion Model"]);

    let records = NewsLog::new(&config.news_path).read_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].paper.id, PaperId::new("2401.00001v1"));
    assert_eq!(records[0].title_zh, "中文標題");
    assert_eq!(records[0].summary_zh, "中文摘要");
    assert_eq!(records[1].paper.query, "Diffusion Model");

    let clip = config.audio_dir.join("2401.00001v1.mp3");
    assert_eq!(std::fs::read(&clip).unwrap(), b"ID3fake");
    assert_eq!(records[0].audio, Some(clip.to_string_lossy().into_owned()));
    assert_eq!(engine.texts.lock()[0], "中文標題\n中文摘要");

    let ids = ProcessedIdStore::new(&config.processed_ids_path).load().unwrap();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&PaperId::new("2401.00003v1")));
    assert!(!ids.contains(&PaperId::new("2401.00002v1")));
}

#[tokio::test]
async fn test_second_run_takes_next_unseen_paper() {
    let dir = tempfile::tempdir().unwrap();
    let source = CannedSource::new(vec![(
        "AI",
        vec![paper("AI", "2401.00001v1", "First"), paper("AI", "2401.00002v1", "Second")],
    )]);
    let config = digest(dir.path(), &["AI"]);
    let p = pipeline(config.clone(), source, EchoProvider::new(&[]), Some(FakeEngine::new(false)));

    p.run().await.unwrap();
    p.run().await.unwrap();
    let third = p.run().await.unwrap();

    let records = NewsLog::new(&config.news_path).read_all().unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.paper.id.as_str()).collect();
    assert_eq!(ids, vec!["2401.00001v1", "2401.00002v1"]);
    assert_eq!(third.papers_fetched, 0);
    assert_eq!(third.papers_logged, 0);
}

#[tokio::test]
async fn test_no_new_results_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let config = digest(dir.path(), &["AI"]);
    ProcessedIdStore::new(&config.processed_ids_path)
        .save(&[PaperId::new("2401.00001")].into_iter().collect())
        .unwrap();
    let source = CannedSource::new(vec![("AI", vec![paper("AI", "2401.00001", "Seen")])]);
    let p = pipeline(config.clone(), source, EchoProvider::new(&[]), Some(FakeEngine::new(false)));

    let summary = p.run().await.unwrap();
    assert_eq!(summary.papers_fetched, 0);
    assert!(!config.news_path.exists());
    assert_eq!(
        std::fs::read_to_string(&config.processed_ids_path).unwrap(),
        "2401.00001"
    );
    assert!(config.audio_dir.is_dir());
}

#[tokio::test]
async fn test_title_translation_failure_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let config = digest(dir.path(), &["AI"]);
    let source = CannedSource::new(vec![("AI", vec![paper("AI", "2401.00001v1", "A Study of X")])]);
    let p = pipeline(
        config.clone(),
        source,
        EchoProvider::new(&["Title: A Study of X"]),
        Some(FakeEngine::new(false)),
    );

    let summary = p.run().await.unwrap();
    assert_eq!(summary.translation_fallbacks, 1);

    let records = NewsLog::new(&config.news_path).read_all().unwrap();
    assert_eq!(records[0].title_zh, "[translated] A Study of X");
    assert_eq!(records[0].summary_zh, "中文摘要");
    assert!(records[0].audio.is_some());
}

#[tokio::test]
async fn test_abstract_translation_failure_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let config = digest(dir.path(), &["AI"]);
    let source = CannedSource::new(vec![("AI", vec![paper("AI", "2401.00001v1", "A Study of X")])]);
    let p = pipeline(config.clone(), source, EchoProvider::new(&["Abstract:"]), Some(FakeEngine::new(false)));

    p.run().await.unwrap();

    let records = NewsLog::new(&config.news_path).read_all().unwrap();
    assert_eq!(records[0].title_zh, "中文標題");
    assert!(records[0].summary_zh.starts_with("[summary] "));
    assert!(records[0].summary_zh.contains("We study A Study of X"));
}

#[tokio::test]
async fn test_synthesis_failure_logs_null_audio() {
    let dir = tempfile::tempdir().unwrap();
    let config = digest(dir.path(), &["AI"]);
    let source = CannedSource::new(vec![("AI", vec![paper("AI", "2401.00001v1", "A Study of X")])]);
    let p = pipeline(config.clone(), source, EchoProvider::new(&[]), Some(FakeEngine::new(true)));

    let summary = p.run().await.unwrap();
    assert_eq!(summary.audio_failures, 1);
    assert_eq!(summary.papers_logged, 1);

    let lines = raw_lines(&config.news_path);
    assert_eq!(lines.len(), 1);
    assert!(lines[0]["audio"].is_null());
    assert_eq!(lines[0]["id"], "2401.00001v1");
    assert_eq!(lines[0]["title_zh"], "中文標題");
    assert!(!config.audio_dir.join("2401.00001v1.mp3").exists());
}

#[tokio::test]
async fn test_speech_disabled_logs_null_audio() {
    let dir = tempfile::tempdir().unwrap();
    let config = digest(dir.path(), &["AI"]);
    let source = CannedSource::new(vec![("AI", vec![paper("AI", "2401.00001v1", "A Study of X")])]);
    let p = pipeline(config.clone(), source, EchoProvider::new(&[]), None);

    let summary = p.run().await.unwrap();
    assert_eq!(summary.audio_failures, 0);

    let lines = raw_lines(&config.news_path);
    assert!(lines[0]["audio"].is_null());
}

#[tokio::test]
async fn test_failed_topic_does_not_stop_others() {
    let dir = tempfile::tempdir().unwrap();
    let config = digest(dir.path(), &["Broken", "AI"]);
    let source = CannedSource::new(vec![("AI", vec![paper("AI", "2401.00001v1", "A Study of X")])]);
    let p = pipeline(config.clone(), source.clone(), EchoProvider::new(&[]), Some(FakeEngine::new(false)));

    let summary = p.run().await.unwrap();
    assert_eq!(summary.topics_failed, 1);
    assert_eq!(summary.papers_logged, 1);
    assert_eq!(*source.searches.lock(), vec!["Broken", "AI"]);

    let ids = ProcessedIdStore::new(&config.processed_ids_path).load().unwrap();
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn test_unwritable_id_set_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let mut config = digest(dir.path(), &["AI"]);
    config.processed_ids_path = blocker.join("processed_ids.txt");
    let source = CannedSource::new(vec![("AI", vec![paper("AI", "2401.00001v1", "A Study of X")])]);
    let p = pipeline(config.clone(), source, EchoProvider::new(&[]), Some(FakeEngine::new(false)));

    assert!(p.run().await.is_err());
    assert!(!config.news_path.exists());
}

#[tokio::test]
async fn test_identifier_with_slash_is_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let config = digest(dir.path(), &["AI"]);
    let source = CannedSource::new(vec![("AI", vec![paper("AI", "cs/0112017v1", "Old Style Id")])]);
    let p = pipeline(config.clone(), source, EchoProvider::new(&[]), Some(FakeEngine::new(false)));

    p.run().await.unwrap();

    assert!(config.audio_dir.join("cs_0112017v1.mp3").exists());
    let records = NewsLog::new(&config.news_path).read_all().unwrap();
    assert_eq!(records[0].paper.id.as_str(), "cs/0112017v1");
}
