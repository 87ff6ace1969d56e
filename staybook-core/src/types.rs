//! Core data type definitions
//!
//! Everything here mirrors the backend's camelCase JSON. Optional members are
//! tolerated as missing so older or partial payloads still decode.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type Id = i64;

/// Closed set of user roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    HotelOwner,
    Manager,
    Client,
    Guest,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::HotelOwner,
        Role::Manager,
        Role::Client,
        Role::Guest,
    ];

    /// Roles allowed into the back office
    pub const BACK_OFFICE: [Role; 3] = [Role::Admin, Role::HotelOwner, Role::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::HotelOwner => "hotel_owner",
            Role::Manager => "manager",
            Role::Client => "client",
            Role::Guest => "guest",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "hotel_owner" => Ok(Role::HotelOwner),
            "manager" => Ok(Role::Manager),
            "client" => Ok(Role::Client),
            "guest" => Ok(Role::Guest),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// The authenticated identity as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub photo_id: Option<Id>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial user fields, merged into a held [`User`]
///
/// Deserializes from a full or partial user payload, so a saved profile
/// response can be applied directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_id: Option<Id>,
}

impl User {
    /// Overwrite the fields present in `patch`, leaving the rest untouched
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(login) = patch.login {
            self.login = login;
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(photo_id) = patch.photo_id {
            self.photo_id = Some(photo_id);
        }
    }
}

impl From<&User> for UserPatch {
    fn from(user: &User) -> Self {
        Self {
            login: Some(user.login.clone()),
            email: user.email.clone(),
            role: Some(user.role),
            photo_id: user.photo_id,
        }
    }
}

/// Login form payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Registration form payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub login: String,
    pub email: String,
    pub password: String,
}

/// Body returned by `/auth/login` and `/auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Admin-side user create/update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Only sent when set; omitted on update to keep the current password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Owner summary embedded in hotel payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Id,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Id,
    pub url: String,
    #[serde(default)]
    pub hotel_id: Option<Id>,
    #[serde(default)]
    pub room_id: Option<Id>,
    #[serde(default)]
    pub user_id: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub describe: Option<String>,
    #[serde(default, deserialize_with = "lenient_number::optional_decimal")]
    pub rate: Option<f64>,
    #[serde(default)]
    pub owner_id: Option<Id>,
    #[serde(default)]
    pub owner: Option<UserSummary>,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub describe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

/// Query parameters for `/hotels/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearch {
    pub city: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<u32>,
}

impl HotelSearch {
    /// Present parameters as `(name, value)` pairs in wire order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(city) = self.city.as_deref().filter(|city| !city.is_empty()) {
            pairs.push(("city", city.to_string()));
        }
        if let Some(check_in) = self.check_in {
            pairs.push(("checkIn", check_in.to_string()));
        }
        if let Some(check_out) = self.check_out {
            pairs.push(("checkOut", check_out.to_string()));
        }
        if let Some(guests) = self.guests {
            pairs.push(("guests", guests.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Id,
    pub hotel_id: Id,
    #[serde(deserialize_with = "lenient_number::integer")]
    pub number: i64,
    #[serde(default, rename = "type")]
    pub room_type: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number::optional_decimal")]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_free: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Id,
    pub room_id: Id,
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub date_in_room: NaiveDate,
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub date_out_room: NaiveDate,
    #[serde(default, deserialize_with = "lenient_number::optional_decimal")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub room: Option<Room>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_in_room: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_out_room: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
}

impl BookingDraft {
    /// A new pending booking for `room_id`
    pub fn new(room_id: Id, date_in_room: NaiveDate, date_out_room: NaiveDate) -> Self {
        Self {
            room_id: Some(room_id),
            date_in_room: Some(date_in_room),
            date_out_room: Some(date_out_room),
            status: Some(BookingStatus::Pending),
            ..Default::default()
        }
    }

    /// Number of nights between check-in and check-out, if both are set
    pub fn nights(&self) -> Option<i64> {
        match (self.date_in_room, self.date_out_room) {
            (Some(check_in), Some(check_out)) if check_out > check_in => {
                Some((check_out - check_in).num_days())
            }
            _ => None,
        }
    }
}

/// Booking dates arrive either as `YYYY-MM-DD` or as full RFC 3339 timestamps
mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|timestamp| timestamp.date_naive())
            .map_err(|e| D::Error::custom(format!("invalid date '{}': {}", raw, e)))
    }
}

/// Numeric members the backend sends either as JSON numbers or as strings
/// (`101`, `"101"`, `"80.50"`)
mod lenient_number {
    use serde::{de::Error, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Integer(value) => Ok(value),
            Raw::Float(value) if value.fract() == 0.0 => Ok(value as i64),
            Raw::Float(value) => Err(D::Error::custom(format!(
                "expected an integer, got {}",
                value
            ))),
            Raw::Text(raw) => raw
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid integer '{}'", raw))),
        }
    }

    pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Integer(value)) => Ok(Some(value as f64)),
            Some(Raw::Float(value)) => Ok(Some(value)),
            Some(Raw::Text(raw)) if raw.trim().is_empty() => Ok(None),
            Some(Raw::Text(raw)) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid number '{}'", raw))),
        }
    }
}

/// File content submitted through a multipart upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl UploadFile {
    pub fn new<S: Into<String>>(file_name: S, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mime_type: None,
        }
    }

    pub fn with_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_round_trips_through_wire_names() {
        for role in Role::ALL {
            let encoded = serde_json::to_value(role).unwrap();
            assert_eq!(encoded, json!(role.as_str()));
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn user_decodes_minimal_payload() {
        let user: User =
            serde_json::from_value(json!({ "id": 1, "login": "alice", "role": "client" })).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.role, Role::Client);
        assert_eq!(user.email, None);
        assert_eq!(user.photo_id, None);
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut user: User = serde_json::from_value(json!({
            "id": 7,
            "login": "bob",
            "email": "bob@example.com",
            "role": "client",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        let patch: UserPatch = serde_json::from_value(json!({ "photoId": 12 })).unwrap();
        user.apply(patch);

        assert_eq!(user.photo_id, Some(12));
        assert_eq!(user.login, "bob");
        assert_eq!(user.email.as_deref(), Some("bob@example.com"));
        assert!(user.created_at.is_some());
    }

    #[test]
    fn user_draft_omits_unset_password() {
        let draft = UserDraft {
            login: Some("carol".to_string()),
            role: Some(Role::Manager),
            ..Default::default()
        };
        let encoded = serde_json::to_value(&draft).unwrap();
        assert_eq!(encoded, json!({ "login": "carol", "role": "manager" }));
    }

    #[test]
    fn search_skips_empty_parameters() {
        let search = HotelSearch {
            city: Some(String::new()),
            check_in: NaiveDate::from_ymd_opt(2025, 7, 1),
            guests: Some(2),
            ..Default::default()
        };
        assert_eq!(
            search.query_pairs(),
            vec![("checkIn", "2025-07-01".to_string()), ("guests", "2".to_string())]
        );
    }

    #[test]
    fn booking_accepts_timestamps_for_dates() {
        let booking: Booking = serde_json::from_value(json!({
            "id": 4,
            "roomId": 9,
            "dateInRoom": "2025-07-01T00:00:00.000Z",
            "dateOutRoom": "2025-07-03",
            "status": "confirmed"
        }))
        .unwrap();
        assert_eq!(booking.date_in_room, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(booking.date_out_room, NaiveDate::from_ymd_opt(2025, 7, 3).unwrap());
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert!(!booking.is_paid);
    }

    #[test]
    fn room_number_accepts_integers_and_strings() {
        let room: Room = serde_json::from_value(json!({
            "id": 7,
            "hotelId": 3,
            "number": 101,
            "price": 80,
            "isFree": true
        }))
        .unwrap();
        assert_eq!(room.number, 101);
        assert_eq!(room.price, Some(80.0));

        let legacy: Room = serde_json::from_value(json!({
            "id": 8,
            "hotelId": 3,
            "number": "102",
            "price": "95.50"
        }))
        .unwrap();
        assert_eq!(legacy.number, 102);
        assert_eq!(legacy.price, Some(95.5));

        let lettered = json!({ "id": 9, "hotelId": 3, "number": "A1" });
        assert!(serde_json::from_value::<Room>(lettered).is_err());
    }

    #[test]
    fn booking_amount_accepts_decimal_strings() {
        let booking: Booking = serde_json::from_value(json!({
            "id": 4,
            "roomId": 9,
            "dateInRoom": "2025-07-01",
            "dateOutRoom": "2025-07-03",
            "amount": "240.00",
            "room": { "id": 9, "hotelId": 3, "number": 12 }
        }))
        .unwrap();
        assert_eq!(booking.amount, Some(240.0));
        assert_eq!(booking.room.map(|room| room.number), Some(12));

        let unpriced: Booking = serde_json::from_value(json!({
            "id": 5,
            "roomId": 9,
            "dateInRoom": "2025-07-01",
            "dateOutRoom": "2025-07-03",
            "amount": null
        }))
        .unwrap();
        assert_eq!(unpriced.amount, None);
    }

    #[test]
    fn room_draft_sends_integer_number() {
        let draft = RoomDraft {
            hotel_id: Some(3),
            number: Some(102),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({ "hotelId": 3, "number": 102 })
        );
    }

    #[test]
    fn booking_draft_counts_nights() {
        let draft = BookingDraft::new(
            3,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
        );
        assert_eq!(draft.nights(), Some(3));
        assert_eq!(
            serde_json::to_value(&draft).unwrap()["status"],
            json!("pending")
        );

        let reversed = BookingDraft {
            date_in_room: draft.date_out_room,
            date_out_room: draft.date_in_room,
            ..draft
        };
        assert_eq!(reversed.nights(), None);
    }
}
