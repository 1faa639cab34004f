//! Recommendation engine for ao3recs.
//!
//! Describes a seed work, then runs the recommendation strategies over the
//! archive's listings, emitting each new work to a [`RecommendationSink`].

pub mod extract;
pub mod recommender;
pub mod sink;
pub mod strategies;
pub mod walker;

#[cfg(test)]
mod testing;

pub use extract::extract_work;
pub use recommender::{Recommender, RunReport};
pub use sink::RecommendationSink;
