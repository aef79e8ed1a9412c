//! One digest run: fetch unseen papers per topic, localize each, synthesize
//! a clip, append the record to the news log.
//!
//! Every stage except the id-set and log writes degrades per item instead of
//! aborting the run. Stages are injected so tests can run without a network.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use papercast_core::{
    fetch_new_papers, DigestConfig, FetchOutcome, LocalizedPaperRecord, NewsLog, PaperRecord,
    PaperSource, ProcessedIdStore,
};
use papercast_llm::Localizer;
use papercast_spk::SpeechSynthesizer;
use std::sync::Arc;
use tracing::{info, warn};

/// Counters reported at the end of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub topics_failed: usize,
    pub papers_fetched: usize,
    pub papers_logged: usize,
    pub translation_fallbacks: usize,
    pub audio_failures: usize,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            started_at: Local::now(),
            topics_failed: 0,
            papers_fetched: 0,
            papers_logged: 0,
            translation_fallbacks: 0,
            audio_failures: 0,
        }
    }
}

pub struct Pipeline {
    digest: DigestConfig,
    source: Arc<dyn PaperSource>,
    localizer: Localizer,
    speech: Option<SpeechSynthesizer>,
    ids: ProcessedIdStore,
    news: NewsLog,
}

impl Pipeline {
    /// `speech` is `None` when synthesis is disabled; records then carry no audio.
    pub fn new(
        digest: DigestConfig,
        source: Arc<dyn PaperSource>,
        localizer: Localizer,
        speech: Option<SpeechSynthesizer>,
    ) -> Self {
        let ids = ProcessedIdStore::new(digest.processed_ids_path.clone());
        let news = NewsLog::new(digest.news_path.clone());
        Self {
            digest,
            source,
            localizer,
            speech,
            ids,
            news,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::new();

        tokio::fs::create_dir_all(&self.digest.audio_dir)
            .await
            .with_context(|| format!("Failed to create audio directory {}", self.digest.audio_dir.display()))?;

        let papers = self.fetch_all(&mut summary).await?;
        summary.papers_fetched = papers.len();

        if papers.is_empty() {
            info!("📭 No new papers today");
            return Ok(summary);
        }

        info!("📚 {} new paper(s) to process", papers.len());
        for paper in papers {
            let record = self.process(paper, &mut summary).await;
            self.news
                .append(&record)
                .with_context(|| format!("Failed to append {} to {}", record.paper.id, self.news.path().display()))?;
            summary.papers_logged += 1;
            info!("📝 Logged {}", record.paper.id);
        }

        Ok(summary)
    }

    /// Query each topic in order. The id-set is saved after every topic,
    /// failed ones included, so a crash later in the run never refetches.
    async fn fetch_all(&self, summary: &mut RunSummary) -> Result<Vec<PaperRecord>> {
        let mut ids = self
            .ids
            .load()
            .with_context(|| format!("Failed to load {}", self.ids.path().display()))?;

        let mut papers = Vec::new();
        for topic in &self.digest.topics {
            info!("🔍 Searching '{}'", topic);
            let outcome = fetch_new_papers(
                self.source.as_ref(),
                topic,
                self.digest.max_results,
                self.digest.per_topic_limit,
                &mut ids,
            )
            .await;

            if let FetchOutcome::Failed(reason) = &outcome {
                warn!("⚠️  Topic '{}' skipped: {}", topic, reason);
                summary.topics_failed += 1;
            }
            papers.extend(outcome.into_papers());

            self.ids
                .save(&ids)
                .with_context(|| format!("Failed to save {}", self.ids.path().display()))?;
        }

        Ok(papers)
    }

    async fn process(&self, paper: PaperRecord, summary: &mut RunSummary) -> LocalizedPaperRecord {
        info!("🌐 Localizing {}: {}", paper.id, paper.title);
        let text = self.localizer.localize(&paper.title, &paper.summary).await;
        summary.translation_fallbacks +=
            usize::from(text.title_zh.is_fallback()) + usize::from(text.summary_zh.is_fallback());

        let audio_path = paper.audio_path(&self.digest.audio_dir);
        let audio = match &self.speech {
            Some(speech) => {
                if speech.save_audio(&text.speech_text(), &audio_path).await {
                    info!("🔊 Audio saved to {}", audio_path.display());
                    Some(audio_path.as_path())
                } else {
                    summary.audio_failures += 1;
                    None
                }
            }
            None => None,
        };

        LocalizedPaperRecord::new(
            paper,
            text.title_zh.into_text(),
            text.summary_zh.into_text(),
            audio,
        )
    }
}
