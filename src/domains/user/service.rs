use crate::auth::AuthContext;
use crate::domains::user::repository::UserRepository;
use crate::domains::user::types::{NewUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::types::Permission;
use crate::validation::Validate;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining user service operations
#[async_trait]
pub trait UserService: Send + Sync {
    async fn create_user(&self, user: NewUser, auth: &AuthContext) -> ServiceResult<User>;

    /// Get a user by ID. Users may always read their own record.
    async fn get_user(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<User>;

    async fn get_all_users(&self, auth: &AuthContext) -> ServiceResult<Vec<User>>;
}

/// Implementation of the user service
#[derive(Clone)]
pub struct UserServiceImpl {
    user_repo: Arc<dyn UserRepository>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn create_user(&self, user: NewUser, auth: &AuthContext) -> ServiceResult<User> {
        auth.authorize(Permission::ManageUsers)?;
        user.validate()?;

        let created = self.user_repo.create(&user).await?;
        info!("Created user {} with role {}", created.id, created.role.as_str());
        Ok(created)
    }

    async fn get_user(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<User> {
        if id != auth.user_id {
            auth.authorize(Permission::ManageUsers)?;
        }
        self.user_repo.find_by_id(id).await.map_err(ServiceError::Domain)
    }

    async fn get_all_users(&self, auth: &AuthContext) -> ServiceResult<Vec<User>> {
        auth.authorize(Permission::ManageUsers)?;
        self.user_repo.find_all().await.map_err(ServiceError::Domain)
    }
}
