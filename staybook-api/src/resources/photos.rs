use serde::de::IgnoredAny;
use staybook_core::{ApiResult, Id, Photo, UploadFile};

use crate::client::{ApiClient, RequestOptions, DEFAULT_UPLOAD_FIELD};

/// `/photos` endpoints
pub struct Photos<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn photos(&self) -> Photos<'_> {
        Photos { client: self }
    }
}

impl Photos<'_> {
    /// Replace the current user's avatar
    pub async fn upload_user(&self, file: UploadFile) -> ApiResult<Option<Photo>> {
        self.client
            .upload_optional("/photos/user", file, DEFAULT_UPLOAD_FIELD)
            .await
    }

    pub async fn upload_hotel(&self, hotel_id: Id, file: UploadFile) -> ApiResult<Option<Photo>> {
        self.client
            .upload_optional(&format!("/photos/hotel/{}", hotel_id), file, DEFAULT_UPLOAD_FIELD)
            .await
    }

    pub async fn upload_room(&self, room_id: Id, file: UploadFile) -> ApiResult<Option<Photo>> {
        self.client
            .upload_optional(&format!("/photos/room/{}", room_id), file, DEFAULT_UPLOAD_FIELD)
            .await
    }

    pub async fn for_hotel(&self, hotel_id: Id) -> ApiResult<Vec<Photo>> {
        self.client
            .request_json(&format!("/photos/hotel/{}", hotel_id), RequestOptions::get())
            .await
    }

    pub async fn for_room(&self, room_id: Id) -> ApiResult<Vec<Photo>> {
        self.client
            .request_json(&format!("/photos/room/{}", room_id), RequestOptions::get())
            .await
    }

    pub async fn delete(&self, photo_id: Id) -> ApiResult<()> {
        let _: IgnoredAny = self
            .client
            .request_json(&format!("/photos/{}", photo_id), RequestOptions::delete())
            .await?;
        Ok(())
    }
}
