pub mod accumulator;
pub mod content_gate;
pub mod discovery;
pub mod error;
pub mod placeholder;
pub mod preferences;
pub mod query_builder;

#[cfg(test)]
pub(crate) mod testing;

pub use accumulator::{ResultAccumulator, SearchSession};
pub use content_gate::{
    is_sensitive, visibility_decision, ContentGate, RevealLedger, RevealResponse, Visibility,
};
pub use discovery::{CategoryListing, CategorySort, DiscoveryService, DiscoverySection, WithFallback};
pub use error::{DiscoveryError, PreferenceError};
pub use preferences::{PreferenceStore, Preferences};
pub use query_builder::{fetch_page, SearchQueryBuilder};
