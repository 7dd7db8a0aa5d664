pub mod permission_service;
pub mod reset_link_service;
pub mod user_service;

pub use permission_service::*;
pub use reset_link_service::*;
pub use user_service::*;

use std::sync::Arc;

/// Collaborators the handlers consume, behind their trait seams so the gated
/// and non-gated editions (and tests) can swap strategies.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub reset_links: Arc<dyn ResetLinkService>,
}
