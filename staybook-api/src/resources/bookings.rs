use serde::de::IgnoredAny;
use serde_json::json;
use staybook_core::{ApiResult, Booking, BookingDraft, BookingStatus, Id};

use crate::client::{ApiClient, RequestOptions};

/// `/bookings` endpoints
pub struct Bookings<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn bookings(&self) -> Bookings<'_> {
        Bookings { client: self }
    }
}

impl Bookings<'_> {
    pub async fn list(&self) -> ApiResult<Vec<Booking>> {
        self.client
            .request_json("/bookings", RequestOptions::get())
            .await
    }

    pub async fn get(&self, id: Id) -> ApiResult<Booking> {
        self.client
            .request_json(&format!("/bookings/{}", id), RequestOptions::get())
            .await
    }

    /// Bookings made by the current user
    pub async fn mine(&self) -> ApiResult<Vec<Booking>> {
        self.client
            .request_json("/bookings/my", RequestOptions::get())
            .await
    }

    pub async fn by_room(&self, room_id: Id) -> ApiResult<Vec<Booking>> {
        self.client
            .request_json(&format!("/bookings/room/{}", room_id), RequestOptions::get())
            .await
    }

    pub async fn by_user(&self, user_id: Id) -> ApiResult<Vec<Booking>> {
        self.client
            .request_json(&format!("/bookings/user/{}", user_id), RequestOptions::get())
            .await
    }

    pub async fn create(&self, draft: &BookingDraft) -> ApiResult<Option<Booking>> {
        self.client
            .request_optional("/bookings", RequestOptions::post(draft)?)
            .await
    }

    pub async fn update(&self, id: Id, draft: &BookingDraft) -> ApiResult<Option<Booking>> {
        self.client
            .request_optional(&format!("/bookings/{}", id), RequestOptions::put(draft)?)
            .await
    }

    /// Mark a booking cancelled; the record is kept
    pub async fn cancel(&self, id: Id) -> ApiResult<Option<Booking>> {
        let body = json!({ "status": BookingStatus::Cancelled });
        self.client
            .request_optional(
                &format!("/bookings/{}", id),
                RequestOptions::new(reqwest::Method::PUT).with_body(body),
            )
            .await
    }

    pub async fn delete(&self, id: Id) -> ApiResult<()> {
        let _: IgnoredAny = self
            .client
            .request_json(&format!("/bookings/{}", id), RequestOptions::delete())
            .await?;
        Ok(())
    }
}
