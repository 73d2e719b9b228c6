use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::cached;
use crate::db::{Cache, CacheKey, CacheNamespace, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{Genre, NewUser, Role, RoleCount, User, UserUpdate};
use crate::services::invalidation::{Invalidation, InvalidationCoordinator};

/// Account CRUD and the role / preference query surface.
///
/// Preference tags are free-form strings; they are validated against the
/// genre taxonomy before any write happens, so stored tags always parse.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    cache: Cache,
    invalidation: InvalidationCoordinator,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, cache: Cache, invalidation: InvalidationCoordinator) -> Self {
        Self {
            store,
            cache,
            invalidation,
        }
    }

    pub async fn create_users(&self, users: Vec<NewUser>) -> AppResult<Vec<User>> {
        if users.is_empty() {
            return Err(AppError::InvalidInput(
                "The user list cannot be empty".to_string(),
            ));
        }

        for user in &users {
            validate_preferences(&user.preferences)?;
        }

        let users = users.into_iter().map(User::new).collect();
        let created = self.store.insert_many(users).await?;

        self.invalidation
            .apply(Invalidation::UserWrite { user_id: None })
            .await;

        tracing::info!(count = created.len(), "Created users");
        Ok(created)
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> AppResult<User> {
        let key = CacheKey::keyed(CacheNamespace::UserById, user_id);
        cached!(self.cache, key, async { self.store.get_by_id(user_id).await })
    }

    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        let key = CacheKey::whole(CacheNamespace::AllUsers);
        cached!(self.cache, key, async { self.store.get_all().await })
    }

    pub async fn update_user(&self, user_id: Uuid, update: UserUpdate) -> AppResult<User> {
        if let Some(preferences) = &update.preferences {
            validate_preferences(preferences)?;
        }

        let mut user = self.store.get_by_id(user_id).await?;
        user.apply(update);
        let saved = self.store.update(user).await?;

        self.invalidation
            .apply(Invalidation::UserWrite {
                user_id: Some(user_id),
            })
            .await;

        Ok(saved)
    }

    pub async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        self.store.get_by_id(user_id).await?;
        self.store.delete(user_id).await?;

        self.invalidation
            .apply(Invalidation::UserWrite {
                user_id: Some(user_id),
            })
            .await;

        Ok(())
    }

    /// Accounts holding the role; an empty result is a not-found
    pub async fn find_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let key = CacheKey::keyed(CacheNamespace::UsersByRole, role);
        let result: AppResult<Vec<User>> = cached!(self.cache, key, async {
            let users: Vec<User> = self
                .store
                .get_all()
                .await?
                .into_iter()
                .filter(|user| user.role == role)
                .collect();
            Ok::<_, AppError>(users)
        });
        let users: Vec<User> = result?;

        if users.is_empty() {
            return Err(AppError::NotFound(format!(
                "No users found with role {}",
                role
            )));
        }
        Ok(users)
    }

    /// Accounts whose preference list shares at least one tag with the query
    pub async fn find_by_preferences(&self, tags: Vec<String>) -> AppResult<Vec<User>> {
        validate_preferences(&tags)?;

        let wanted: HashSet<String> = tags.iter().map(|t| t.to_ascii_uppercase()).collect();
        let mut sorted: Vec<String> = wanted.iter().cloned().collect();
        sorted.sort();
        let key = CacheKey::keyed(CacheNamespace::UsersByPreference, sorted.join(","));

        cached!(self.cache, key, async {
            let users: Vec<User> = self
                .store
                .get_all()
                .await?
                .into_iter()
                .filter(|user| {
                    user.preferences
                        .iter()
                        .any(|tag| wanted.contains(&tag.to_ascii_uppercase()))
                })
                .collect();
            Ok::<_, AppError>(users)
        })
    }

    /// How many accounts hold each role; roles with no accounts are omitted
    pub async fn count_by_role(&self) -> AppResult<Vec<RoleCount>> {
        let users = self.store.get_all().await?;

        let counts = [Role::Admin, Role::User]
            .into_iter()
            .map(|role| RoleCount {
                role,
                amount: users.iter().filter(|user| user.role == role).count(),
            })
            .filter(|count| count.amount > 0)
            .collect();

        Ok(counts)
    }
}

/// Rejects preference tags that do not name a genre
fn validate_preferences(tags: &[String]) -> AppResult<()> {
    for tag in tags {
        tag.parse::<Genre>()?;
    }
    Ok(())
}
