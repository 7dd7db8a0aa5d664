use async_trait::async_trait;

/// Reset-link generation lives in the external auth provider; this service
/// only delegates and passes the payload through unmodified.
#[async_trait]
pub trait ResetLinkService: Send + Sync {
    async fn generate_user_password_reset_link(
        &self,
        user_id: &str,
        admin_user_id: &str,
    ) -> Result<serde_json::Value, String>;
}

pub struct HttpResetLinkService {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpResetLinkService {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl ResetLinkService for HttpResetLinkService {
    async fn generate_user_password_reset_link(
        &self,
        user_id: &str,
        admin_user_id: &str,
    ) -> Result<serde_json::Value, String> {
        let url = format!("{}/user/password/reset/link", self.base_url);

        log::info!(
            "🔗 Requesting reset link for {} (requested by {})",
            user_id,
            admin_user_id
        );

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&serde_json::json!({
                "user_id": user_id,
                "admin_user_id": admin_user_id,
            }))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| format!("Failed to reach auth provider: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Auth provider error: {}", response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse auth provider response: {}", e))
    }
}
