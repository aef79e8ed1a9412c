pub mod config;
pub mod error;
pub mod providers;
pub mod localize;


pub use config::*;
pub use error::*;
pub use providers::Provider;
pub use providers::google::GoogleProvider;
pub use localize::{Localizer, LocalizedText, Translation};
