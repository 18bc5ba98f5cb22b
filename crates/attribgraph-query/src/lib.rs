//! Analytic questions over a normalized attribution graph.
//!
//! This is intentionally **not** a general query language: a free-text
//! question is matched against a short, ordered list of templates
//! ([`intent`]) and the matching template runs one fixed aggregation
//! ([`evaluate`]). Anything unrecognized degrades to a guidance message.

pub mod aggregate;
pub mod countries;
pub mod evaluate;
pub mod intent;

pub use aggregate::RankedEntry;
pub use countries::CountryTable;
pub use evaluate::{evaluate, QueryEvaluator, QueryResult, SponsoredActor, GUIDANCE_MESSAGE};
pub use intent::{Intent, IntentClassifier};
