//! Where recommendations go as soon as they are found.

use ao3recs_shared::Recommendation;

/// Receives each recommendation the moment a strategy finds it.
pub trait RecommendationSink {
    fn emit(&mut self, recommendation: Recommendation);
}

impl RecommendationSink for Vec<Recommendation> {
    fn emit(&mut self, recommendation: Recommendation) {
        self.push(recommendation);
    }
}

impl<S: RecommendationSink + ?Sized> RecommendationSink for &mut S {
    fn emit(&mut self, recommendation: Recommendation) {
        (**self).emit(recommendation);
    }
}
