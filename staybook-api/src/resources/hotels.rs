use serde::de::IgnoredAny;
use serde_json::Value;
use staybook_core::{ApiResult, Hotel, HotelDraft, HotelSearch, Id};

use crate::client::{ApiClient, RequestOptions};

/// `/hotels` endpoints
pub struct Hotels<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn hotels(&self) -> Hotels<'_> {
        Hotels { client: self }
    }
}

impl Hotels<'_> {
    pub async fn list(&self) -> ApiResult<Vec<Hotel>> {
        self.client.request_json("/hotels", RequestOptions::get()).await
    }

    pub async fn get(&self, id: Id) -> ApiResult<Hotel> {
        self.client
            .request_json(&format!("/hotels/{}", id), RequestOptions::get())
            .await
    }

    pub async fn create(&self, draft: &HotelDraft) -> ApiResult<Option<Hotel>> {
        self.client
            .request_optional("/hotels", RequestOptions::post(draft)?)
            .await
    }

    pub async fn update(&self, id: Id, draft: &HotelDraft) -> ApiResult<Option<Hotel>> {
        self.client
            .request_optional(&format!("/hotels/{}", id), RequestOptions::put(draft)?)
            .await
    }

    pub async fn delete(&self, id: Id) -> ApiResult<()> {
        let _: IgnoredAny = self
            .client
            .request_json(&format!("/hotels/{}", id), RequestOptions::delete())
            .await?;
        Ok(())
    }

    /// Hotels owned or managed by the current user
    pub async fn mine(&self) -> ApiResult<Vec<Hotel>> {
        self.client
            .request_json("/hotels/my", RequestOptions::get())
            .await
    }

    pub async fn by_owner(&self, owner_id: Id) -> ApiResult<Vec<Hotel>> {
        self.client
            .request_json(&format!("/hotels/owner/{}", owner_id), RequestOptions::get())
            .await
    }

    pub async fn search(&self, search: &HotelSearch) -> ApiResult<Vec<Hotel>> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(search.query_pairs())
            .finish();

        let path = if query.is_empty() {
            "/hotels/search".to_string()
        } else {
            format!("/hotels/search?{}", query)
        };

        self.client.request_json(&path, RequestOptions::get()).await
    }

    /// Destination summaries shown on the home page; the shape is owned by
    /// the backend and passed through untouched
    pub async fn popular_destinations(&self) -> ApiResult<Vec<Value>> {
        self.client
            .request_json("/hotels/popular-destinations", RequestOptions::get())
            .await
    }
}
