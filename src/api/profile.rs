use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    middleware::auth::RequestContext,
    models::UserProfile,
    services::{AppState, Permission},
};

pub const ACCESS_DENIED_DETAIL: &str =
    "You do not have access to perform this action. Please contact your organization admin.";

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    operation_id = "fetch_user_profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Partial user profile, unset fields omitted", body = UserProfile),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn user_profile(
    ctx: web::ReqData<RequestContext>,
    state: web::Data<AppState>,
) -> HttpResponse {
    log::info!("👤 GET /profile - user: {}", ctx.user_id);

    let user = match state.users.get_user_with_id(&ctx.user_id).await {
        Ok(user) => user,
        Err(e) => {
            log::error!("❌ Failed to load user {}: {}", ctx.user_id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }));
        }
    };

    // The uid came from a verified token, so the auth layer already vouched
    // for this record. A miss means the store and the token issuer disagree;
    // that is an invariant violation, not a recoverable request error.
    let user =
        user.expect("User not found. Please ensure that the user_id is specified correctly.");

    HttpResponse::Ok().json(UserProfile::from_record(&user))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ResetPasswordQuery {
    /// Target user to generate the reset link for
    pub user_id: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/profile/reset-password",
    operation_id = "reset_user_password",
    tag = "Profile",
    params(ResetPasswordQuery),
    responses(
        (status = 200, description = "Opaque reset-link payload from the auth provider"),
        (status = 403, description = "Acting user lacks the reset-password capability"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reset_user_password(
    ctx: web::ReqData<RequestContext>,
    state: web::Data<AppState>,
    query: web::Query<ResetPasswordQuery>,
) -> HttpResponse {
    log::info!(
        "🔑 POST /profile/reset-password - target: {}, acting: {}",
        query.user_id,
        ctx.user_id
    );

    match state
        .permissions
        .check_action_access(&ctx.user_id, &ctx.project_id, Permission::ResetPassword)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            // Denial is a normal outcome, reported by status code only
            log::warn!(
                "⚠️ Reset denied for {} in project {}",
                ctx.user_id,
                ctx.project_id
            );
            return HttpResponse::Forbidden().json(serde_json::json!({
                "detail": ACCESS_DENIED_DETAIL
            }));
        }
        Err(e) => {
            log::error!("❌ Permission check failed: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }));
        }
    }

    match state
        .reset_links
        .generate_user_password_reset_link(&query.user_id, &ctx.user_id)
        .await
    {
        Ok(payload) => {
            log::info!("✅ Reset link generated for {}", query.user_id);
            HttpResponse::Ok().json(payload)
        }
        Err(e) => {
            log::error!("❌ Reset link generation failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRecord;
    use crate::services::{NoopPermissionChecker, PermissionChecker, ResetLinkService, UserStore};
    use actix_web::dev::Service as _;
    use actix_web::{test, App, HttpMessage};
    use async_trait::async_trait;
    use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct FakeUserStore {
        users: HashMap<String, UserRecord>,
    }

    #[async_trait]
    impl UserStore for FakeUserStore {
        async fn get_user_with_id(&self, user_id: &str) -> Result<Option<UserRecord>, String> {
            Ok(self.users.get(user_id).cloned())
        }
    }

    struct StaticPermissionChecker {
        allow: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PermissionChecker for StaticPermissionChecker {
        async fn check_action_access(
            &self,
            _user_id: &str,
            _project_id: &str,
            _permission: Permission,
        ) -> Result<bool, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.allow)
        }
    }

    struct RecordingResetLinkService {
        calls: Mutex<Vec<(String, String)>>,
        payload: serde_json::Value,
        fail: bool,
    }

    impl RecordingResetLinkService {
        fn ok(payload: serde_json::Value) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                payload,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                payload: serde_json::Value::Null,
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ResetLinkService for RecordingResetLinkService {
        async fn generate_user_password_reset_link(
            &self,
            user_id: &str,
            admin_user_id: &str,
        ) -> Result<serde_json::Value, String> {
            self.calls
                .lock()
                .unwrap()
                .push((user_id.to_string(), admin_user_id.to_string()));
            if self.fail {
                return Err("Auth provider error: 502 Bad Gateway".to_string());
            }
            Ok(self.payload.clone())
        }
    }

    fn admin_record() -> UserRecord {
        UserRecord {
            id: Some(ObjectId::new()),
            uid: "admin-uid".to_string(),
            email: "admin@example.com".to_string(),
            username: "admin".to_string(),
            created_at: Some(BsonDateTime::from_millis(1_700_000_000_000)),
            updated_at: None,
        }
    }

    fn state_with(
        users: Vec<UserRecord>,
        permissions: Arc<dyn PermissionChecker>,
        reset_links: Arc<RecordingResetLinkService>,
    ) -> web::Data<AppState> {
        let users = FakeUserStore {
            users: users.into_iter().map(|u| (u.uid.clone(), u)).collect(),
        };
        web::Data::new(AppState {
            users: Arc::new(users),
            permissions,
            reset_links,
        })
    }

    /// Builds the profile routes with a pre-resolved identity, the way the
    /// auth middleware would populate it in production.
    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .wrap_fn(|req, srv| {
                        req.extensions_mut().insert(RequestContext {
                            user_id: "admin-uid".to_string(),
                            project_id: "project-1".to_string(),
                        });
                        srv.call(req)
                    })
                    .route("/", web::get().to(user_profile))
                    .route("/reset-password", web::post().to(reset_user_password)),
            )
        };
    }

    #[actix_web::test]
    async fn profile_returns_only_set_fields_as_strings() {
        let links = Arc::new(RecordingResetLinkService::ok(serde_json::json!({})));
        let state = state_with(
            vec![admin_record()],
            Arc::new(NoopPermissionChecker),
            links,
        );
        let app = test_app!(state).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let fields = body.as_object().unwrap();
        assert!(fields["id"].is_string());
        assert_eq!(fields["uid"], "admin-uid");
        assert_eq!(fields["email"], "admin@example.com");
        assert_eq!(fields["username"], "admin");
        assert!(fields["created_at"].is_string());
        // Never explicitly set, so absent rather than null
        assert!(!fields.contains_key("updated_at"));
    }

    #[actix_web::test]
    async fn profile_is_idempotent_without_writes() {
        let links = Arc::new(RecordingResetLinkService::ok(serde_json::json!({})));
        let state = state_with(
            vec![admin_record()],
            Arc::new(NoopPermissionChecker),
            links,
        );
        let app = test_app!(state).await;

        let first: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        let second: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(first, second);
    }

    #[actix_web::test]
    #[should_panic(expected = "User not found")]
    async fn profile_for_unknown_identity_is_fatal() {
        let links = Arc::new(RecordingResetLinkService::ok(serde_json::json!({})));
        let state = state_with(vec![], Arc::new(NoopPermissionChecker), links);
        let app = test_app!(state).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let _ = test::call_service(&app, req).await;
    }

    #[actix_web::test]
    async fn gated_denial_is_403_and_never_generates_link() {
        let links = Arc::new(RecordingResetLinkService::ok(serde_json::json!({})));
        let checker = Arc::new(StaticPermissionChecker {
            allow: false,
            calls: AtomicUsize::new(0),
        });
        let state = state_with(vec![admin_record()], checker.clone(), links.clone());
        let app = test_app!(state).await;

        let req = test::TestRequest::post()
            .uri("/reset-password?user_id=target-uid")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), actix_web::http::StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(
            body,
            serde_json::json!({
                "detail": "You do not have access to perform this action. Please contact your organization admin."
            })
        );
        assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
        assert!(links.calls.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn gated_grant_delegates_exactly_once_and_passes_payload_through() {
        let payload = serde_json::json!({
            "reset_link": "https://auth.example.com/reset?token=abc123",
            "expires_in": 3600
        });
        let links = Arc::new(RecordingResetLinkService::ok(payload.clone()));
        let checker = Arc::new(StaticPermissionChecker {
            allow: true,
            calls: AtomicUsize::new(0),
        });
        let state = state_with(vec![admin_record()], checker, links.clone());
        let app = test_app!(state).await;

        let req = test::TestRequest::post()
            .uri("/reset-password?user_id=target-uid")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, payload);
        let calls = links.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![("target-uid".to_string(), "admin-uid".to_string())]
        );
    }

    #[actix_web::test]
    async fn non_gated_mode_always_attempts_link_generation() {
        let links = Arc::new(RecordingResetLinkService::ok(serde_json::json!({
            "reset_link": "https://auth.example.com/reset?token=xyz"
        })));
        let state = state_with(
            vec![admin_record()],
            Arc::new(NoopPermissionChecker),
            links.clone(),
        );
        let app = test_app!(state).await;

        let req = test::TestRequest::post()
            .uri("/reset-password?user_id=target-uid")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), actix_web::http::StatusCode::OK);
        assert_eq!(links.calls.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn downstream_failure_maps_to_generic_server_error() {
        let links = Arc::new(RecordingResetLinkService::failing());
        let state = state_with(
            vec![admin_record()],
            Arc::new(NoopPermissionChecker),
            links,
        );
        let app = test_app!(state).await;

        let req = test::TestRequest::post()
            .uri("/reset-password?user_id=target-uid")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(
            res.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
