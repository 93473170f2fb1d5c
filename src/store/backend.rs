// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend API client.
//!
//! One authenticated HTTPS JSON client implements every remote
//! capability: profiles and credits, the story store, signed-URL
//! object storage, and the story-generation function. All transport
//! and status errors are classified into [`AppError`] here; nothing
//! above this layer sees a raw `reqwest` error.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{GeneratedStory, Profile, ProfilePatch, Story};
use crate::store::traits::{
    CreditDecision, GenerationBackend, GenerationPayload, ObjectStore, ProfileStore, StoryStore,
};

/// Backend API client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    image_bucket: String,
}

impl BackendClient {
    /// Create a new client from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.backend_url.clone(),
            api_key: config.backend_api_key.clone(),
            image_bucket: config.image_bucket.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Classify a non-success response into the error taxonomy.
    async fn classify_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 {
            return AppError::AuthRequired;
        }
        if status.as_u16() == 403 {
            if body.contains(AppError::NO_CREDITS_MARKER) {
                return AppError::NoCreditsLeft;
            }
            return AppError::SubscriptionRequired(body);
        }
        if status.as_u16() == 409 {
            return AppError::Conflict(body);
        }
        if status.as_u16() == 400 {
            // Server validation messages are user-appropriate
            return AppError::BadRequest(body);
        }
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "Backend server error");
            return AppError::Transient(format!("HTTP {}: {}", status, body));
        }

        AppError::Backend(format!("HTTP {}: {}", status, body))
    }

    /// Check response status and return an error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::classify_error(response).await)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JSON parse error: {}", e)))
    }

    fn transport(e: reqwest::Error) -> AppError {
        AppError::Transient(e.to_string())
    }
}

#[async_trait]
impl ProfileStore for BackendClient {
    async fn get_profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<Profile>, AppError> {
        let url = self.url(&format!("/v1/profiles/{}", urlencoding::encode(user_id)));
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Self::transport)?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        self.check_response_json(response).await.map(Some)
    }

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: &str,
        patch: &ProfilePatch,
    ) -> Result<Profile, AppError> {
        let url = self.url(&format!("/v1/profiles/{}", urlencoding::encode(user_id)));
        let response = self
            .http
            .patch(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(patch)
            .send()
            .await
            .map_err(Self::transport)?;

        self.check_response_json(response).await
    }

    async fn check_and_decrement(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<CreditDecision, AppError> {
        let url = self.url("/v1/functions/check-credit");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await
            .map_err(Self::transport)?;

        match self.check_response(response).await {
            Ok(()) => Ok(CreditDecision::Allowed),
            Err(AppError::NoCreditsLeft) => Ok(CreditDecision::Denied),
            Err(e) => Err(e),
        }
    }

    async fn refresh_recharge(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Profile, AppError> {
        let url = self.url("/v1/functions/refresh-recharge");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await
            .map_err(Self::transport)?;

        self.check_response_json(response).await
    }

    async fn grant_reward(&self, access_token: &str, user_id: &str) -> Result<Profile, AppError> {
        let url = self.url("/v1/functions/reward-credit");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await
            .map_err(Self::transport)?;

        self.check_response_json(response).await
    }

    async fn delete_user_data(&self, access_token: &str, user_id: &str) -> Result<usize, AppError> {
        let url = self.url(&format!("/v1/profiles/{}", urlencoding::encode(user_id)));
        let response = self
            .http
            .delete(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Self::transport)?;

        #[derive(Deserialize)]
        struct DeleteResponse {
            deleted: usize,
        }

        let body: DeleteResponse = self.check_response_json(response).await?;
        tracing::info!(user_id, deleted = body.deleted, "User data deletion complete");
        Ok(body.deleted)
    }
}

#[async_trait]
impl StoryStore for BackendClient {
    async fn save_story(
        &self,
        access_token: &str,
        user_id: &str,
        story: &Story,
    ) -> Result<String, AppError> {
        let url = self.url("/v1/stories");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({
                "user_id": user_id,
                "title": story.title,
                "content": story.content,
                "words": story.words,
                "created_at": story.created_at,
            }))
            .send()
            .await
            .map_err(Self::transport)?;

        #[derive(Deserialize)]
        struct SaveResponse {
            id: String,
        }

        let body: SaveResponse = self.check_response_json(response).await?;
        Ok(body.id)
    }

    async fn list_stories(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<Story>, AppError> {
        let url = self.url("/v1/stories");
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .query(&[("user_id", user_id), ("order", "created_at.desc")])
            .send()
            .await
            .map_err(Self::transport)?;

        self.check_response_json(response).await
    }

    async fn record_image(
        &self,
        access_token: &str,
        user_id: &str,
        story_id: &str,
        image_path: &str,
    ) -> Result<(), AppError> {
        let url = self.url("/v1/story-images");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({
                "story_id": story_id,
                "user_id": user_id,
                "image_path": image_path,
            }))
            .send()
            .await
            .map_err(Self::transport)?;

        self.check_response(response).await
    }
}

#[async_trait]
impl ObjectStore for BackendClient {
    async fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Storage(format!(
                "image download failed: HTTP {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn upload(
        &self,
        access_token: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), AppError> {
        // Two-step signed upload: request a signed URL, then PUT the
        // bytes against it.
        let sign_url = self.url(&format!("/v1/storage/{}/sign-upload", self.image_bucket));
        let response = self
            .http
            .post(&sign_url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "path": key }))
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        #[derive(Deserialize)]
        struct SignedUpload {
            signed_url: String,
            token: String,
        }

        let signed: SignedUpload = self.check_response_json(response).await.map_err(|e| {
            AppError::Storage(format!("signed upload URL request failed: {}", e))
        })?;

        let response = self
            .http
            .put(&signed.signed_url)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .bearer_auth(&signed.token)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "upload failed: HTTP {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl GenerationBackend for BackendClient {
    async fn generate(
        &self,
        access_token: &str,
        payload: &GenerationPayload,
    ) -> Result<GeneratedStory, AppError> {
        let url = self.url("/v1/functions/generate-story");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await
            .map_err(Self::transport)?;

        self.check_response_json(response).await
    }
}
