use async_trait::async_trait;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};

use crate::database::MongoDB;

/// Capability tags checked against a (user, project) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ResetPassword,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ResetPassword => "reset_password",
        }
    }
}

/// Deployment edition, selected once at startup from the environment.
///
/// The enterprise edition gates admin actions behind project permissions;
/// the OSS edition runs with the granting no-op checker instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edition {
    Oss,
    Ee,
}

impl Edition {
    pub fn from_env() -> Self {
        match std::env::var("EDITION").as_deref() {
            Ok("ee") | Ok("EE") => Edition::Ee,
            _ => Edition::Oss,
        }
    }

    pub fn is_gated(&self) -> bool {
        matches!(self, Edition::Ee)
    }
}

/// Yes/no authority for admin capabilities. Rule evaluation lives outside
/// this service; implementations only surface the decision.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn check_action_access(
        &self,
        user_id: &str,
        project_id: &str,
        permission: Permission,
    ) -> Result<bool, String>;
}

/// Non-gated strategy: every action is granted without consulting anything.
pub struct NoopPermissionChecker;

#[async_trait]
impl PermissionChecker for NoopPermissionChecker {
    async fn check_action_access(
        &self,
        _user_id: &str,
        _project_id: &str,
        _permission: Permission,
    ) -> Result<bool, String> {
        Ok(true)
    }
}

/// Project membership document consumed by the gated checker.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectMembership {
    pub user_id: String,
    pub project_id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl ProjectMembership {
    /// Owners hold every capability; everyone else needs an explicit grant.
    pub fn grants(&self, permission: Permission) -> bool {
        if self.role.as_deref() == Some("owner") {
            return true;
        }
        self.permissions.iter().any(|p| p == permission.as_str())
    }
}

/// Gated strategy: resolves the acting user's membership in the project and
/// reads the capability grant off it. No membership means no access.
pub struct MongoPermissionChecker {
    db: MongoDB,
}

impl MongoPermissionChecker {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PermissionChecker for MongoPermissionChecker {
    async fn check_action_access(
        &self,
        user_id: &str,
        project_id: &str,
        permission: Permission,
    ) -> Result<bool, String> {
        let collection = self
            .db
            .collection::<ProjectMembership>("project_memberships");

        let filter = doc! {
            "user_id": user_id,
            "project_id": project_id,
        };

        let membership = collection
            .find_one(filter)
            .await
            .map_err(|e| format!("Database error: {}", e))?;

        Ok(membership
            .map(|m| m.grants(permission))
            .unwrap_or(false))
    }
}
