pub mod posters;
pub mod providers;
pub mod recommendations;

pub use posters::{PosterResolver, PosterSettings};
pub use recommendations::{RecommendationService, RECOMMENDATION_COUNT};
