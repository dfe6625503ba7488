// src/models/shop.rs

use std::sync::LazyLock;

use chrono::{DateTime, NaiveTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    models::{auth::UserSummary, pagination::PageInfo},
    services::open_window::{is_open_now, parse_clock_time, truncate_to_minute, validate_clock_time},
};

// Maps the shop_category enum in Postgres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "shop_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShopCategory {
    Food,
    Medical,
    Other,
}

// Shop row joined with its owner's name and email
#[derive(Debug, Clone, FromRow)]
pub struct ShopRecord {
    pub id: Uuid,
    pub name: String,
    pub category: ShopCategory,
    pub owner_id: Uuid,
    pub address: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub is_approved: bool,
    pub is_active: bool,
    pub description: String,
    pub phone: String,
    pub rating: Decimal,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_name: String,
    pub owner_email: String,
}

impl ShopRecord {
    // Derived at read time, never stored
    pub fn is_open_at(&self, now: NaiveTime) -> bool {
        is_open_now(self.open_time, self.close_time, self.is_active, self.is_approved, now)
    }

    pub fn location(&self) -> Location {
        Location {
            address: self.address.clone(),
            city: self.city.clone(),
            coordinates: Coordinates { lat: self.latitude, lng: self.longitude },
        }
    }

    pub fn owner(&self) -> UserSummary {
        UserSummary {
            id: self.owner_id,
            name: self.owner_name.clone(),
            email: self.owner_email.clone(),
        }
    }

    pub fn to_view(&self, now: NaiveTime) -> ShopView {
        ShopView {
            id: self.id,
            name: self.name.clone(),
            category: self.category,
            location: self.location(),
            open_time: self.open_time,
            close_time: self.close_time,
            description: self.description.clone(),
            phone: self.phone.clone(),
            rating: self.rating,
            review_count: self.review_count,
            owner: self.owner(),
            is_open_now: self.is_open_at(now),
            is_approved: self.is_approved,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // Only used for shops already known to be open
    pub fn to_open_view(&self) -> OpenShopView {
        OpenShopView {
            id: self.id,
            name: self.name.clone(),
            category: self.category,
            location: self.location(),
            open_time: self.open_time,
            close_time: self.close_time,
            description: self.description.clone(),
            phone: self.phone.clone(),
            rating: self.rating,
            review_count: self.review_count,
            owner: self.owner(),
            is_open_now: true,
        }
    }

    pub fn to_status_view(&self) -> ShopStatusView {
        ShopStatusView {
            id: self.id,
            name: self.name.clone(),
            is_active: self.is_active,
            updated_at: self.updated_at,
        }
    }
}

// Times go over the wire as "HH:MM"
mod hhmm {
    use chrono::NaiveTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }
}

// ---
// Response views
// ---

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct Location {
    #[schema(example = "123 Main Street")]
    pub address: String,
    #[schema(example = "New York")]
    pub city: String,
    pub coordinates: Coordinates,
}

// Entry of the public "open now" listing
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenShopView {
    pub id: Uuid,
    pub name: String,
    pub category: ShopCategory,
    pub location: Location,
    #[serde(serialize_with = "hhmm::serialize")]
    #[schema(value_type = String, example = "18:00")]
    pub open_time: NaiveTime,
    #[serde(serialize_with = "hhmm::serialize")]
    #[schema(value_type = String, example = "02:00")]
    pub close_time: NaiveTime,
    pub description: String,
    pub phone: String,
    #[schema(value_type = f64)]
    pub rating: Decimal,
    pub review_count: i32,
    pub owner: UserSummary,
    pub is_open_now: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopView {
    pub id: Uuid,
    pub name: String,
    pub category: ShopCategory,
    pub location: Location,
    #[serde(serialize_with = "hhmm::serialize")]
    #[schema(value_type = String, example = "18:00")]
    pub open_time: NaiveTime,
    #[serde(serialize_with = "hhmm::serialize")]
    #[schema(value_type = String, example = "02:00")]
    pub close_time: NaiveTime,
    pub description: String,
    pub phone: String,
    #[schema(value_type = f64)]
    pub rating: Decimal,
    pub review_count: i32,
    pub owner: UserSummary,
    pub is_open_now: bool,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopStatusView {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopData {
    pub shop: ShopView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopStatusData {
    pub shop: ShopStatusView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopListData {
    pub shops: Vec<ShopView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PagedShopListData {
    pub shops: Vec<ShopView>,
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OpenShopsData {
    pub shops: Vec<OpenShopView>,
    pub pagination: PageInfo,
}

// ---
// Create / update payload
// ---

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("This field is required".into()));
    }
    Ok(())
}

fn validate_shop_name(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if !(2..=100).contains(&len) {
        return Err(ValidationError::new("length")
            .with_message("Shop name must be between 2 and 100 characters".into()));
    }
    Ok(())
}

// Optional leading '+', no leading zero, at most 16 digits. Empty means no phone.
pub(crate) static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+?[1-9][0-9]{0,15})?$").expect("Invalid regex"));

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CoordinatesPayload {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    #[schema(example = 40.7128)]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    #[schema(example = -74.006)]
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LocationPayload {
    #[validate(custom(function = "validate_not_blank", message = "Address is required"))]
    pub address: String,

    #[validate(custom(function = "validate_not_blank", message = "City is required"))]
    pub city: String,

    #[validate(nested)]
    pub coordinates: CoordinatesPayload,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopPayload {
    #[validate(custom(function = "validate_shop_name"))]
    #[schema(example = "Late Night Pizza")]
    pub name: String,

    pub category: ShopCategory,

    #[validate(nested)]
    pub location: LocationPayload,

    #[validate(custom(function = "validate_clock_time", message = "Opening time must be in HH:MM format"))]
    #[schema(example = "18:00")]
    pub open_time: String,

    #[validate(custom(function = "validate_clock_time", message = "Closing time must be in HH:MM format"))]
    #[schema(example = "02:00")]
    pub close_time: String,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,

    #[validate(regex(path = *PHONE_RE, message = "Please provide a valid phone number"))]
    #[schema(example = "+1234567890")]
    pub phone: Option<String>,
}

// Validated, normalized shop fields ready for storage
#[derive(Debug, Clone, PartialEq)]
pub struct ShopFields {
    pub name: String,
    pub category: ShopCategory,
    pub address: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub description: String,
    pub phone: String,
}

impl TryFrom<ShopPayload> for ShopFields {
    type Error = AppError;

    fn try_from(payload: ShopPayload) -> Result<Self, Self::Error> {
        payload.validate()?;

        let open_time = parse_clock_time(&payload.open_time)
            .map_err(|e| AppError::InvalidQuery(format!("openTime: {e}")))?;
        let close_time = parse_clock_time(&payload.close_time)
            .map_err(|e| AppError::InvalidQuery(format!("closeTime: {e}")))?;

        Ok(Self {
            name: payload.name.trim().to_string(),
            category: payload.category,
            address: payload.location.address.trim().to_string(),
            city: payload.location.city.trim().to_string(),
            latitude: payload.location.coordinates.lat,
            longitude: payload.location.coordinates.lng,
            open_time,
            close_time,
            description: payload.description.unwrap_or_default(),
            phone: payload.phone.unwrap_or_default(),
        })
    }
}

// ---
// Listing filters
// ---

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OpenShopsQuery {
    pub category: Option<ShopCategory>,
    /// Case-insensitive substring of the city
    pub city: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShopStatusFilter {
    Approved,
    Pending,
    Active,
    Inactive,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminShopsQuery {
    pub status: Option<ShopStatusFilter>,
    pub category: Option<ShopCategory>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// Storage-level filter; every set field is ANDed
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ShopFilter {
    pub category: Option<ShopCategory>,
    pub city_contains: Option<String>,
    pub is_active: Option<bool>,
    pub is_approved: Option<bool>,
    /// Keep only shops whose hours contain this minute.
    pub open_at: Option<NaiveTime>,
}

impl ShopFilter {
    /// Public directory: visibility flags are forced on and cannot be overridden.
    pub fn public(category: Option<ShopCategory>, city: Option<&str>) -> Self {
        Self {
            category,
            city_contains: city.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string),
            is_active: Some(true),
            is_approved: Some(true),
            open_at: None,
        }
    }

    pub fn only_open_at(self, now: NaiveTime) -> Self {
        Self { open_at: Some(truncate_to_minute(now)), ..self }
    }

    pub fn admin(status: Option<ShopStatusFilter>, category: Option<ShopCategory>) -> Self {
        let mut filter = Self { category, ..Self::default() };
        match status {
            Some(ShopStatusFilter::Approved) => filter.is_approved = Some(true),
            Some(ShopStatusFilter::Pending) => filter.is_approved = Some(false),
            Some(ShopStatusFilter::Active) => filter.is_active = Some(true),
            Some(ShopStatusFilter::Inactive) => filter.is_active = Some(false),
            None => {}
        }
        filter
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::open_window::parse_clock_time;

    pub(crate) fn record(name: &str, open: &str, close: &str) -> ShopRecord {
        let now = Utc::now();
        ShopRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            category: ShopCategory::Food,
            owner_id: Uuid::new_v4(),
            address: "123 Main Street".into(),
            city: "New York".into(),
            latitude: 40.7128,
            longitude: -74.006,
            open_time: parse_clock_time(open).unwrap(),
            close_time: parse_clock_time(close).unwrap(),
            is_approved: true,
            is_active: true,
            description: String::new(),
            phone: String::new(),
            rating: Decimal::ZERO,
            review_count: 0,
            created_at: now,
            updated_at: now,
            owner_name: "John Poster".into(),
            owner_email: "john@nightmate.com".into(),
        }
    }

    fn payload() -> ShopPayload {
        serde_json::from_value(serde_json::json!({
            "name": "  Late Night Pizza ",
            "category": "food",
            "location": {
                "address": "123 Main Street",
                "city": " New York ",
                "coordinates": { "lat": 40.7128, "lng": -74.006 }
            },
            "openTime": "18:00",
            "closeTime": "2:00",
            "phone": "+1234567890"
        }))
        .unwrap()
    }

    #[test]
    fn payload_is_normalized_into_fields() {
        let fields = ShopFields::try_from(payload()).unwrap();
        assert_eq!(fields.name, "Late Night Pizza");
        assert_eq!(fields.city, "New York");
        assert_eq!(fields.close_time, parse_clock_time("02:00").unwrap());
        assert_eq!(fields.description, "");
        assert_eq!(fields.phone, "+1234567890");
    }

    #[test]
    fn payload_rejects_bad_times_coordinates_and_phone() {
        let mut p = payload();
        p.open_time = "25:00".into();
        p.location.coordinates.lat = 91.0;
        p.phone = Some("0123".into());

        let Err(AppError::ValidationError(errors)) = ShopFields::try_from(p) else {
            panic!("expected validation error");
        };
        let fields: Vec<String> = crate::common::error::collect_field_errors(&errors)
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields.len(), 3);
        assert!(fields.contains(&"location.coordinates.lat".to_string()));
        assert!(fields.contains(&"phone".to_string()));
        assert!(fields.iter().any(|f| f.starts_with("open")));
    }

    #[test]
    fn blank_city_and_short_name_are_rejected() {
        let mut p = payload();
        p.name = " a ".into();
        p.location.city = "   ".into();
        assert!(ShopFields::try_from(p).is_err());
    }

    #[test]
    fn unknown_category_fails_to_deserialize() {
        let raw = serde_json::json!({
            "name": "xyz", "category": "bar",
            "location": { "address": "a", "city": "b", "coordinates": { "lat": 0, "lng": 0 } },
            "openTime": "10:00", "closeTime": "11:00"
        });
        assert!(serde_json::from_value::<ShopPayload>(raw).is_err());
    }

    #[test]
    fn phone_rules() {
        for ok in ["", "+1234567890", "5551234", "1234567890123456"] {
            assert!(PHONE_RE.is_match(ok), "{ok:?} should be accepted");
        }
        for bad in ["+", "0551234", "555-1234", "12345678901234567", "+ 1", "١٢٣"] {
            assert!(!PHONE_RE.is_match(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn public_filter_always_requires_visibility() {
        let filter = ShopFilter::public(Some(ShopCategory::Medical), Some("  york "));
        assert_eq!(filter.is_active, Some(true));
        assert_eq!(filter.is_approved, Some(true));
        assert_eq!(filter.city_contains.as_deref(), Some("york"));

        assert_eq!(ShopFilter::public(None, Some("  ")).city_contains, None);
        assert_eq!(filter.open_at, None);
    }

    #[test]
    fn open_filter_compares_whole_minutes() {
        let now = NaiveTime::from_hms_opt(23, 59, 42).unwrap();
        let filter = ShopFilter::public(None, None).only_open_at(now);
        assert_eq!(filter.open_at, Some(parse_clock_time("23:59").unwrap()));
        assert_eq!(filter.is_active, Some(true));
    }

    #[test]
    fn admin_status_filter_maps_to_flags() {
        assert_eq!(ShopFilter::admin(Some(ShopStatusFilter::Pending), None).is_approved, Some(false));
        assert_eq!(ShopFilter::admin(Some(ShopStatusFilter::Inactive), None).is_active, Some(false));
        assert_eq!(ShopFilter::admin(None, None), ShopFilter::default());
    }

    #[test]
    fn views_render_times_as_hhmm_and_open_flag() {
        let shop = record("Late Night Pizza", "18:00", "02:00");
        let json = serde_json::to_value(shop.to_view(parse_clock_time("23:00").unwrap())).unwrap();
        assert_eq!(json["openTime"], "18:00");
        assert_eq!(json["closeTime"], "02:00");
        assert_eq!(json["isOpenNow"], true);
        assert_eq!(json["location"]["coordinates"]["lat"], 40.7128);
        assert_eq!(json["owner"]["name"], "John Poster");

        let closed = serde_json::to_value(shop.to_view(parse_clock_time("12:00").unwrap())).unwrap();
        assert_eq!(closed["isOpenNow"], false);
    }

    #[test]
    fn hidden_shop_is_never_open() {
        let mut shop = record("Hidden", "00:00", "23:59");
        shop.is_active = false;
        assert!(!shop.is_open_at(parse_clock_time("12:00").unwrap()));
    }
}
