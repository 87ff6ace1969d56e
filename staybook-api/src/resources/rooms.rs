use serde::de::IgnoredAny;
use staybook_core::{ApiResult, Id, Room, RoomDraft};

use crate::client::{ApiClient, RequestOptions};

/// `/rooms` endpoints
pub struct Rooms<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn rooms(&self) -> Rooms<'_> {
        Rooms { client: self }
    }
}

impl Rooms<'_> {
    pub async fn list(&self) -> ApiResult<Vec<Room>> {
        self.client.request_json("/rooms", RequestOptions::get()).await
    }

    pub async fn get(&self, id: Id) -> ApiResult<Room> {
        self.client
            .request_json(&format!("/rooms/{}", id), RequestOptions::get())
            .await
    }

    pub async fn by_hotel(&self, hotel_id: Id) -> ApiResult<Vec<Room>> {
        self.client
            .request_json(&format!("/rooms/hotel/{}", hotel_id), RequestOptions::get())
            .await
    }

    pub async fn create(&self, draft: &RoomDraft) -> ApiResult<Option<Room>> {
        self.client
            .request_optional("/rooms", RequestOptions::post(draft)?)
            .await
    }

    pub async fn update(&self, id: Id, draft: &RoomDraft) -> ApiResult<Option<Room>> {
        self.client
            .request_optional(&format!("/rooms/{}", id), RequestOptions::put(draft)?)
            .await
    }

    pub async fn delete(&self, id: Id) -> ApiResult<()> {
        let _: IgnoredAny = self
            .client
            .request_json(&format!("/rooms/{}", id), RequestOptions::delete())
            .await?;
        Ok(())
    }
}
