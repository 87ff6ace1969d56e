use serde::de::IgnoredAny;
use staybook_core::{ApiResult, Id, User, UserDraft};

use crate::client::{ApiClient, RequestOptions};

/// `/users` endpoints (admin only on the backend)
pub struct Users<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn users(&self) -> Users<'_> {
        Users { client: self }
    }
}

impl Users<'_> {
    pub async fn list(&self) -> ApiResult<Vec<User>> {
        self.client.request_json("/users", RequestOptions::get()).await
    }

    pub async fn get(&self, id: Id) -> ApiResult<User> {
        self.client
            .request_json(&format!("/users/{}", id), RequestOptions::get())
            .await
    }

    pub async fn create(&self, draft: &UserDraft) -> ApiResult<Option<User>> {
        self.client
            .request_optional("/users", RequestOptions::post(draft)?)
            .await
    }

    pub async fn update(&self, id: Id, draft: &UserDraft) -> ApiResult<Option<User>> {
        self.client
            .request_optional(&format!("/users/{}", id), RequestOptions::put(draft)?)
            .await
    }

    pub async fn delete(&self, id: Id) -> ApiResult<()> {
        let _: IgnoredAny = self
            .client
            .request_json(&format!("/users/{}", id), RequestOptions::delete())
            .await?;
        Ok(())
    }
}
