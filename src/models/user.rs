use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(AppError::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

/// An account with its declared genre preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Free-form tags matched against catalog genres
    pub preferences: Vec<String>,
    pub role: Role,
}

impl User {
    pub fn new(new: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: new.email,
            preferences: new.preferences,
            role: new.role,
        }
    }

    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
    }
}

/// Fields accepted when creating an account
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub preferences: Vec<String>,
    pub role: Role,
}

/// Partial account update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub preferences: Option<Vec<String>>,
    pub role: Option<Role>,
}

/// How many accounts hold a given role
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoleCount {
    pub role: Role,
    pub amount: usize,
}
