use serde::{Deserialize, Serialize};

// --- User Role Definition ---

/// UserRole enum for authorization in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Trainer,
}

// --- Permission Enum Definition ---

/// Permission enum representing individual permissions in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // User management
    ManageUsers,

    // Contact directory
    ViewContacts,
    EditContacts,

    // Event permissions
    ViewEvents,
    EditEvents,
    CreateEvents,
    DeleteEvents,
    CloneEvents,
    ExportEvents,

    // Module permissions
    ViewModules,
    EditModules,

    // Session permissions
    ViewSessions,
    EditSessions,
    CreateSessions,
    DeleteSessions,

    // Participant permissions
    ViewParticipants,
    EditParticipants,
    CreateParticipants,
    DeleteParticipants,
}

// --- UserRole Implementation ---

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Trainer => "trainer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "manager" => Some(UserRole::Manager),
            "trainer" => Some(UserRole::Trainer),
            _ => None,
        }
    }

    /// Check if the role grants a specific permission.
    ///
    /// Trainer permissions are further narrowed to assigned sessions by the
    /// session and event services.
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::Manager => !matches!(permission, Permission::ManageUsers),
            UserRole::Trainer => matches!(
                permission,
                Permission::ViewEvents
                    | Permission::ExportEvents
                    | Permission::ViewModules
                    | Permission::ViewSessions
                    | Permission::EditSessions
                    | Permission::ViewParticipants
                    | Permission::ViewContacts
            ),
        }
    }

    pub fn has_permissions(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(*p))
    }

    /// Whether reads and writes must be restricted to the user's assigned sessions.
    pub fn is_session_scoped(&self) -> bool {
        matches!(self, UserRole::Trainer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        for role in [UserRole::Admin, UserRole::Manager, UserRole::Trainer] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str("field"), None);
    }

    #[test]
    fn test_manager_cannot_manage_users() {
        assert!(UserRole::Manager.has_permission(Permission::CloneEvents));
        assert!(!UserRole::Manager.has_permission(Permission::ManageUsers));
        assert!(UserRole::Admin.has_permission(Permission::ManageUsers));
    }

    #[test]
    fn test_trainer_permissions() {
        let trainer = UserRole::Trainer;
        assert!(trainer.has_permissions(&[Permission::ViewSessions, Permission::EditSessions]));
        assert!(!trainer.has_permission(Permission::CreateSessions));
        assert!(!trainer.has_permission(Permission::CloneEvents));
        assert!(!trainer.has_permission(Permission::EditEvents));
        assert!(trainer.is_session_scoped());
        assert!(!UserRole::Manager.is_session_scoped());
    }
}
