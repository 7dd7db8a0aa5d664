use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Profile Service API",
        version = "1.0.0",
        description = "User profile and password-reset endpoints of the platform. \n\n**Authentication:** All profile endpoints require JWT Bearer token authentication.\n\n**Features:**\n- Partial user-profile representation (unset fields omitted)\n- Permission-gated password-reset link generation\n- Health monitoring",
        contact(
            name = "Platform Team",
            email = "support@user-platform.dev"
        )
    ),
    paths(
        // Profile endpoints
        crate::api::profile::user_profile,
        crate::api::profile::reset_user_password,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::user::UserProfile,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Profile", description = "Authenticated user profile and admin password-reset endpoints."),
        (name = "Health", description = "Health check endpoint for monitoring service status."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build()
                ),
            );
        }
    }
}
