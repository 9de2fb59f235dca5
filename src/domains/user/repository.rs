use crate::domains::core::repository::FindById;
use crate::domains::user::types::{NewUser, User, UserRow};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, query_scalar, SqlitePool};
use uuid::Uuid;

/// User repository trait
#[async_trait]
pub trait UserRepository: FindById<User> + Send + Sync {
    async fn create(&self, new_user: &NewUser) -> DomainResult<User>;

    async fn find_all(&self) -> DomainResult<Vec<User>>;

    /// Ids from `ids` that do not belong to any user.
    async fn find_missing_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Uuid>>;
}

/// SQLite implementation of UserRepository
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FindById<User> for SqliteUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<User> {
        let row = query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("User".to_string(), id))?;

        row.into_entity()
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, new_user: &NewUser) -> DomainResult<User> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        query(
            "INSERT INTO users (id, name, email, role, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(id.to_string())
        .bind(new_user.name.trim())
        .bind(new_user.email.trim().to_lowercase())
        .bind(new_user.role.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_id(id).await
    }

    async fn find_all(&self) -> DomainResult<Vec<User>> {
        let rows = query_as::<_, UserRow>("SELECT * FROM users ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        rows.into_iter().map(UserRow::into_entity).collect()
    }

    async fn find_missing_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Uuid>> {
        let mut missing = Vec::new();
        for id in ids {
            let exists: bool = query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
                .bind(id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;
            if !exists {
                missing.push(*id);
            }
        }
        Ok(missing)
    }
}
