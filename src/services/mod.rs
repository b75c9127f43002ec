pub mod enrichment;
pub mod providers;
pub mod recommendations;

pub use enrichment::{BatchSettings, EnrichmentService, Enrichments};
pub use providers::{MetadataProvider, TmdbProvider};
pub use recommendations::RecommendationClient;
