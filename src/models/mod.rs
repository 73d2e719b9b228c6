mod movie;
mod rating;
mod recommendation;
mod user;

pub use movie::{Genre, Movie, MovieUpdate, NewMovie, ScoreUpdate};
pub use rating::{NewRating, Rating, RatingAverage, RatingUpdate, Score};
pub use recommendation::{Recommendation, RecommendedMovie};
pub use user::{NewUser, Role, RoleCount, User, UserUpdate};
