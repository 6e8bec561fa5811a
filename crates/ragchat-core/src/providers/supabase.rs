//! Supabase auth and the `roles` / `profiles` tables via PostgREST.
//!
//! All calls use the service-role key, so row-level security does not apply.

use async_trait::async_trait;
use ragchat_types::{AuthenticatedUser, CreditRecord};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::error::ProviderError;

use super::{endpoint, CreditLedger, IdentityProvider};

const ROLES_TABLE: &str = "roles";
const PROFILES_TABLE: &str = "profiles";
/// Application role given to lazily created users.
const DEFAULT_APP_ROLE: &str = "user";

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    config: SupabaseConfig,
}

#[derive(Serialize)]
struct NewRole<'a> {
    user_id: &'a str,
    role: &'a str,
    chats_left: i64,
}

#[derive(Serialize)]
struct NewProfile<'a> {
    user_id: &'a str,
    username: Option<&'a str>,
}

impl SupabaseClient {
    pub fn new(client: reqwest::Client, config: SupabaseConfig) -> Self {
        Self { client, config }
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.config.url.is_empty() {
            return Err(ProviderError::NotConfigured("SUPABASE_URL"));
        }
        if self.config.service_key.is_empty() {
            return Err(ProviderError::NotConfigured("SUPABASE_SERVICE_ROLE_KEY"));
        }
        Ok(())
    }

    /// `{url}/rest/v1/{table}` with an optional `user_id=eq.{id}` filter.
    fn table_url(&self, table: &str, user_id: Option<&str>) -> Result<Url, ProviderError> {
        let raw = endpoint(&self.config.url, &format!("rest/v1/{table}"));
        let mut url = Url::parse(&raw).map_err(|e| ProviderError::InvalidUrl {
            url: raw.clone(),
            message: e.to_string(),
        })?;
        if let Some(id) = user_id {
            url.query_pairs_mut().append_pair("user_id", &format!("eq.{id}"));
        }
        Ok(url)
    }

    fn rest(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    async fn insert<T: Serialize + ?Sized>(&self, table: &str, row: &T) -> Result<(), ProviderError> {
        let resp = self
            .rest(reqwest::Method::POST, self.table_url(table, None)?)
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ProviderError::from_response("Supabase", resp).await);
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn get_user(&self, token: &str) -> Result<Option<AuthenticatedUser>, ProviderError> {
        self.ensure_configured()?;

        let resp = self
            .client
            .get(endpoint(&self.config.url, "auth/v1/user"))
            .header("apikey", &self.config.service_key)
            .bearer_auth(token)
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(Some(resp.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(ProviderError::from_response("Supabase", resp).await),
        }
    }
}

#[async_trait]
impl CreditLedger for SupabaseClient {
    async fn find(&self, user_id: &str) -> Result<Option<CreditRecord>, ProviderError> {
        self.ensure_configured()?;

        let mut url = self.table_url(ROLES_TABLE, Some(user_id))?;
        url.query_pairs_mut().append_pair("select", "*");

        let resp = self.rest(reqwest::Method::GET, url).send().await?;
        if !resp.status().is_success() {
            return Err(ProviderError::from_response("Supabase", resp).await);
        }

        let rows: Vec<CreditRecord> = resp.json().await?;
        debug!(user_id, rows = rows.len(), "credit lookup");
        Ok(rows.into_iter().next())
    }

    async fn set_chats_left(&self, user_id: &str, chats_left: i64) -> Result<(), ProviderError> {
        self.ensure_configured()?;

        let resp = self
            .rest(reqwest::Method::PATCH, self.table_url(ROLES_TABLE, Some(user_id))?)
            .header("Prefer", "return=minimal")
            .json(&json!({ "chats_left": chats_left }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ProviderError::from_response("Supabase", resp).await);
        }
        Ok(())
    }

    async fn create_user(&self, user: &AuthenticatedUser) -> Result<(), ProviderError> {
        self.ensure_configured()?;

        self.insert(
            ROLES_TABLE,
            &NewRole { user_id: &user.id, role: DEFAULT_APP_ROLE, chats_left: 0 },
        )
        .await?;
        self.insert(
            PROFILES_TABLE,
            &NewProfile { user_id: &user.id, username: user.email.as_deref() },
        )
        .await
    }
}
