use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Five-level ordinal score attached to a rating
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    OneStar,
    TwoStars,
    ThreeStars,
    FourStars,
    FiveStars,
}

impl Score {
    /// Numeric value used for averaging
    pub fn value(&self) -> u8 {
        match self {
            Score::OneStar => 1,
            Score::TwoStars => 2,
            Score::ThreeStars => 3,
            Score::FourStars => 4,
            Score::FiveStars => 5,
        }
    }
}

impl TryFrom<u8> for Score {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Score::OneStar),
            2 => Ok(Score::TwoStars),
            3 => Ok(Score::ThreeStars),
            4 => Ok(Score::FourStars),
            5 => Ok(Score::FiveStars),
            other => Err(AppError::InvalidInput(format!(
                "Score must be between 1 and 5, got {}",
                other
            ))),
        }
    }
}

/// A single user's score for a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub score: Score,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(new: NewRating) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            movie_id: new.movie_id,
            score: new.score,
            comment: new.comment,
            created_at: Utc::now(),
        }
    }

    /// Applies a partial update; a score change must be re-aggregated
    pub fn apply(&mut self, update: RatingUpdate) {
        if let Some(score) = update.score {
            self.score = score;
        }
        if let Some(comment) = update.comment {
            self.comment = Some(comment);
        }
    }
}

/// Fields accepted when a user submits a rating
#[derive(Debug, Clone, Deserialize)]
pub struct NewRating {
    pub movie_id: Uuid,
    pub user_id: Uuid,
    pub score: Score,
    pub comment: Option<String>,
}

/// Partial rating update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingUpdate {
    pub score: Option<Score>,
    pub comment: Option<String>,
}

/// Result of one aggregation run for a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingAverage {
    pub movie_id: Uuid,
    pub average_score: f64,
}
