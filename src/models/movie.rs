use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Genre taxonomy for catalog entries
///
/// User preference tags are free-form strings; they are matched against
/// genres by parsing them with [`Genre::from_str`], which is
/// case-insensitive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Action,
    Animation,
    Comedy,
    Drama,
    Horror,
    SciFi,
    Romance,
}

impl Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Genre::Action => "ACTION",
            Genre::Animation => "ANIMATION",
            Genre::Comedy => "COMEDY",
            Genre::Drama => "DRAMA",
            Genre::Horror => "HORROR",
            Genre::SciFi => "SCI_FI",
            Genre::Romance => "ROMANCE",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Genre {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTION" => Ok(Genre::Action),
            "ANIMATION" => Ok(Genre::Animation),
            "COMEDY" => Ok(Genre::Comedy),
            "DRAMA" => Ok(Genre::Drama),
            "HORROR" => Ok(Genre::Horror),
            "SCI_FI" | "SCIFI" => Ok(Genre::SciFi),
            "ROMANCE" => Ok(Genre::Romance),
            other => Err(AppError::InvalidInput(format!("Unknown genre: {}", other))),
        }
    }
}

/// A catalog entry and its derived average score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub genre: Genre,
    pub release_year: i32,
    pub description: String,
    /// Derived from ratings; only the aggregation push writes it
    pub rating_average: Option<f64>,
}

impl Movie {
    /// Creates a catalog entry; the average stays at zero until ratings arrive
    pub fn new(new: NewMovie) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            genre: new.genre,
            release_year: new.release_year,
            description: new.description,
            rating_average: Some(0.0),
        }
    }

    /// Applies a partial update; the derived average is not reachable here
    pub fn apply(&mut self, update: MovieUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(genre) = update.genre {
            self.genre = genre;
        }
        if let Some(release_year) = update.release_year {
            self.release_year = release_year;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
    }
}

/// Fields accepted when creating a catalog entry
#[derive(Debug, Clone, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub genre: Genre,
    pub release_year: i32,
    pub description: String,
}

/// Partial catalog update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub genre: Option<Genre>,
    pub release_year: Option<i32>,
    pub description: Option<String>,
}

/// Score push payload from the aggregation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub movie_id: Uuid,
    pub rating_average: f64,
}
