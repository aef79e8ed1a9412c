pub mod types;
pub mod error;
pub mod config;
pub mod dedup;
pub mod fetcher;
pub mod news_log;

pub use error::{Error, Result};
pub use types::{PaperId, PaperRecord, LocalizedPaperRecord};
pub use config::DigestConfig;
pub use dedup::{ProcessedIdStore, ProcessedIds};
pub use fetcher::{ArxivClient, FetchOutcome, PaperSource, fetch_new_papers};
pub use news_log::NewsLog;
