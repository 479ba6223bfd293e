pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{RecsError, RecsResult};
pub use types::{ItemId, Lookup, RequestStats, SimilarItems, UserId};
