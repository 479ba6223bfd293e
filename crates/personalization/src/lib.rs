//! Recommendation stores (similarity table, personal and popularity
//! rankings) and the composer that blends them into ranked lists.

pub mod blend;
pub mod composer;
pub mod offline;
pub mod similarity;
pub mod snapshot;
pub mod sources;

pub use composer::Composer;
pub use offline::OfflineStore;
pub use similarity::SimilarityStore;
pub use sources::{EventSource, OfflineSource, SimilaritySource};
