use crate::services::{
    CatalogService, RatingService, RecommendationService, UserService, ViewResolver,
};

/// Shared application state: the service layer handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub ratings: RatingService,
    pub users: UserService,
    pub recommendations: RecommendationService,
    pub views: ViewResolver,
}
