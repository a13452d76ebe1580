pub mod analysis;
pub mod bootstrap;
pub mod manual_entry;
pub mod persistence_gateway;
pub mod pipeline;

pub use persistence_gateway::{IdAllocator, PersistenceGateway, WriteOutcome};
pub use pipeline::{RunScope, RunSummary, SentimentPipeline};
