use uuid::Uuid;
use crate::types::{UserRole, Permission};
use crate::errors::ServiceError;

/// Represents the authentication context for the current operation
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The ID of the authenticated user
    pub user_id: Uuid,

    /// The role of the authenticated user
    pub role: UserRole,
}

impl AuthContext {
    /// Create a new authentication context
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Create a new authentication context for internal system operations
    pub fn internal_system_context() -> Self {
        Self {
            user_id: Uuid::nil(),
            role: UserRole::Admin,
        }
    }

    /// Check if user has a specific permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    /// Authorize a specific permission, returning an error if not allowed
    pub fn authorize(&self, permission: Permission) -> Result<(), ServiceError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "User does not have permission: {:?}",
                permission
            )))
        }
    }

    /// The user id that reads must be restricted to, for session-scoped roles.
    pub fn trainer_scope(&self) -> Option<Uuid> {
        if self.role.is_session_scoped() {
            Some(self.user_id)
        } else {
            None
        }
    }

    /// Session-scoped users may only touch sessions they are assigned to.
    pub fn authorize_session_assignment(&self, trainer_ids: &[Uuid]) -> Result<(), ServiceError> {
        match self.trainer_scope() {
            Some(user_id) if !trainer_ids.contains(&user_id) => Err(ServiceError::PermissionDenied(
                "Trainers may only access sessions they are assigned to".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
