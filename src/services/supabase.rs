use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::models::domain::{NewOrganizationRow, Organization};

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Supabase credentials are not configured")]
    NotConfigured,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Supabase API client
///
/// Handles all communication with the Supabase backend including:
/// - Fetching and inserting organization rows over PostgREST
/// - Deleting organizations
/// - Triggering account activation emails through GoTrue
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    fn ensure_configured(&self) -> Result<(), SupabaseError> {
        if self.base_url.trim().is_empty() || self.api_key.trim().is_empty() {
            return Err(SupabaseError::NotConfigured);
        }
        Ok(())
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Fetch every organization, ordered by name
    pub async fn list_organizations(&self) -> Result<Vec<Organization>, SupabaseError> {
        self.ensure_configured()?;

        let url = format!(
            "{}/rest/v1/organizations?select=*&order=name.asc",
            self.base_url.trim_end_matches('/')
        );

        tracing::debug!("Fetching organizations from: {}", url);

        let response = self.with_auth(self.client.get(&url)).send().await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to fetch organizations: {}",
                response.status()
            )));
        }

        let organizations: Vec<Organization> = response.json().await?;

        tracing::debug!("Fetched {} organizations", organizations.len());

        Ok(organizations)
    }

    /// Fetch a single organization by id
    pub async fn get_organization(&self, id: &str) -> Result<Organization, SupabaseError> {
        self.ensure_configured()?;

        let url = format!(
            "{}/rest/v1/organizations?id=eq.{}&select=*",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(id)
        );

        let response = self.with_auth(self.client.get(&url)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to fetch organization {}: {} - {}", id, status, body);
            return Err(SupabaseError::ApiError(format!(
                "Failed to fetch organization: {}",
                status
            )));
        }

        let rows: Vec<Organization> = response.json().await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("Organization {} not found", id)))
    }

    /// Insert a new organization row and return the stored record
    pub async fn insert_organization(
        &self,
        row: &NewOrganizationRow,
    ) -> Result<Organization, SupabaseError> {
        self.ensure_configured()?;

        let url = format!(
            "{}/rest/v1/organizations",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .with_auth(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to insert organization: {} - {}", status, body);
            return Err(SupabaseError::ApiError(format!(
                "Failed to insert organization: {}",
                status
            )));
        }

        let rows: Vec<Organization> = response.json().await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| SupabaseError::InvalidResponse("Insert returned no rows".into()))
    }

    /// Delete an organization by id
    pub async fn delete_organization(&self, id: &str) -> Result<(), SupabaseError> {
        self.ensure_configured()?;

        let url = format!(
            "{}/rest/v1/organizations?id=eq.{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(id)
        );

        // return=representation so a miss is distinguishable from a delete
        let response = self
            .with_auth(self.client.delete(&url))
            .header("Prefer", "return=representation")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to delete organization: {}",
                response.status()
            )));
        }

        let rows: Vec<serde_json::Value> = response.json().await?;
        if rows.is_empty() {
            return Err(SupabaseError::NotFound(format!(
                "Organization {} not found",
                id
            )));
        }

        tracing::debug!("Deleted organization {}", id);

        Ok(())
    }

    /// Lightweight reachability probe used by the health endpoint
    pub async fn health_check(&self) -> Result<bool, SupabaseError> {
        self.ensure_configured()?;

        let url = format!(
            "{}/rest/v1/organizations?select=id&limit=1",
            self.base_url.trim_end_matches('/')
        );

        let response = self.with_auth(self.client.get(&url)).send().await?;

        Ok(response.status().is_success())
    }

    /// Send a password-setup email through GoTrue's recover endpoint
    ///
    /// Activation and password reset share the same flow: the address
    /// receives a link that lands on the password setup page.
    pub async fn send_activation_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), SupabaseError> {
        self.ensure_configured()?;

        let mut url = format!("{}/auth/v1/recover", self.base_url.trim_end_matches('/'));
        if let Some(redirect) = redirect_to {
            url.push_str("?redirect_to=");
            url.push_str(&urlencoding::encode(redirect));
        }

        let payload = serde_json::json!({ "email": email });

        let response = self
            .with_auth(self.client.post(&url))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to send activation email: {} - {}", status, body);
            return Err(SupabaseError::ApiError(format!(
                "Failed to send activation email: {}",
                status
            )));
        }

        tracing::info!("Activation email queued for {}", email);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supabase_client_creation() {
        let client = SupabaseClient::new(
            "https://project.supabase.test".to_string(),
            "service_key".to_string(),
        );

        assert_eq!(client.base_url, "https://project.supabase.test");
        assert!(client.ensure_configured().is_ok());
    }

    #[test]
    fn test_missing_credentials_detected() {
        let client = SupabaseClient::new(String::new(), "key".to_string());
        assert!(matches!(
            client.ensure_configured(),
            Err(SupabaseError::NotConfigured)
        ));

        let client = SupabaseClient::new("https://project.supabase.test".to_string(), "  ".to_string());
        assert!(matches!(
            client.ensure_configured(),
            Err(SupabaseError::NotConfigured)
        ));
    }
}
