//! Property listing models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A property listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Property {
    pub id: Uuid,

    /// Owning seller
    pub seller_id: Uuid,

    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,

    /// Price in whole currency units
    pub price: i64,

    pub number_of_rooms: i32,

    /// Size in square meters
    pub size_sqm: f64,

    pub property_type: PropertyType,

    /// Listings can be taken off the market without deleting them.
    pub is_available: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
    Villa,
    Land,
    Commercial,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Villa => "villa",
            PropertyType::Land => "land",
            PropertyType::Commercial => "commercial",
        }
    }
}

/// A photo attached to a listing. The `image` field is a storage key;
/// clients receive presigned URLs.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PropertyImage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub image: String,
    pub is_primary: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// A wishlist entry — (user, property) pairs are unique.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WishlistEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create listing request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,

    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: String,

    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    pub city: String,

    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,

    #[validate(range(min = 1, max = 100, message = "Room count must be 1-100"))]
    pub number_of_rooms: i32,

    #[validate(range(min = 1.0, message = "Size must be positive"))]
    pub size_sqm: f64,

    pub property_type: PropertyType,

    pub is_available: Option<bool>,
}

/// Update listing request — all fields optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePropertyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(min = 1))]
    pub description: Option<String>,

    #[validate(length(min = 1))]
    pub address: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,

    #[validate(range(min = 0))]
    pub price: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub number_of_rooms: Option<i32>,

    #[validate(range(min = 1.0))]
    pub size_sqm: Option<f64>,

    pub property_type: Option<PropertyType>,

    pub is_available: Option<bool>,
}

/// Listing representation for API responses.
#[derive(Debug, Serialize)]
pub struct PropertyResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub price: i64,
    pub number_of_rooms: i32,
    pub size_sqm: f64,
    pub property_type: PropertyType,
    pub is_available: bool,
    pub seller_id: Uuid,
    /// Seller's username, resolved at query time
    pub seller_name: Option<String>,
    pub images: Vec<PropertyImageResponse>,
    /// Whether the requesting user has wishlisted this listing.
    /// `None` for unauthenticated requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_wishlist: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyResponse {
    /// Build a response from a row; images and wishlist state are attached
    /// by the caller.
    pub fn from_property(p: Property, seller_name: Option<String>) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            address: p.address,
            city: p.city,
            price: p.price,
            number_of_rooms: p.number_of_rooms,
            size_sqm: p.size_sqm,
            property_type: p.property_type,
            is_available: p.is_available,
            seller_id: p.seller_id,
            seller_name,
            images: Vec::new(),
            in_wishlist: None,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Photo representation for API responses — `url` is presigned.
#[derive(Debug, Serialize)]
pub struct PropertyImageResponse {
    pub id: Uuid,
    pub url: String,
    pub is_primary: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// Bulk action over listings (admin).
#[derive(Debug, Deserialize)]
pub struct BulkPropertyActionRequest {
    pub property_ids: Vec<Uuid>,
    pub action: BulkPropertyAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkPropertyAction {
    Activate,
    Deactivate,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PropertyType::Apartment).unwrap(),
            "\"apartment\""
        );
    }

    #[test]
    fn create_request_rejects_negative_price() {
        let req = CreatePropertyRequest {
            name: "Sunny flat".into(),
            description: "Bright two-room apartment".into(),
            address: "Hauptstr. 1".into(),
            city: "Berlin".into(),
            price: -5,
            number_of_rooms: 2,
            size_sqm: 54.0,
            property_type: PropertyType::Apartment,
            is_available: None,
        };
        assert!(validator::Validate::validate(&req).is_err());
    }
}
