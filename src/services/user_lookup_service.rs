use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::ServiceError;
use crate::models::lookup::{LookupOutcome, LookupRequest};
use crate::models::profile::Profile;

/// HTTP client for the user lookup and repository service.
pub struct UserLookupService {
    pub base_url: String,
    pub client: Client,
}

impl UserLookupService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent("repo-browser")
            .timeout(timeout)
            .build()?;
        Ok(UserLookupService {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Looks up `username`. A 404, or a success answer whose body is `null`,
    /// means the user does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, username: &str) -> Result<LookupOutcome, ServiceError> {
        let url = format!("{}/", self.base_url);
        log::info!("Looking up user {:?} at {}...", username, url);

        let response = self
            .client
            .post(url)
            .json(&LookupRequest {
                username: username.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(LookupOutcome::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        let contents = response.text().await?;
        let profile: Option<Profile> = serde_json::from_str(&contents)?;
        Ok(profile.into())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_repo(&self, id: i64) -> Result<(), ServiceError> {
        let url = format!("{}/{}", self.base_url, id);
        log::info!("Deleting repository {} at {}...", id, url);

        let response = self.client.delete(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }
        Ok(())
    }
}
