use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

/// Parking record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Parking {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: String,             // free text, only used for ordering
    pub map_url: Option<String>,
}

/// Every field of a parking except the store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingDraft {
    pub name: String,
    pub city: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: String,
    pub map_url: Option<String>,
}

/// Case-insensitive substring filter on city, address, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParkingFilter {
    City(String),
    Address(String),
    CityAndAddress { city: String, address: String },
}

impl ParkingFilter {
    /// Picks the filter from the non-empty inputs. Both empty is a caller error.
    pub fn from_inputs(city: &str, address: &str) -> Result<Self, AppError> {
        match (city.is_empty(), address.is_empty()) {
            (false, false) => Ok(Self::CityAndAddress {
                city: city.to_string(),
                address: address.to_string(),
            }),
            (false, true) => Ok(Self::City(city.to_string())),
            (true, false) => Ok(Self::Address(address.to_string())),
            (true, true) => Err(AppError::InvalidArguments),
        }
    }

    pub fn city(&self) -> Option<&str> {
        match self {
            Self::City(city) | Self::CityAndAddress { city, .. } => Some(city),
            Self::Address(_) => None,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Address(address) | Self::CityAndAddress { address, .. } => Some(address),
            Self::City(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Name ascending.
    Name,
    /// Rating descending, compared as text.
    Rating,
}

impl SortKey {
    /// `None` and `"name"` sort by name; anything else sorts by rating.
    pub fn parse(sort: Option<&str>) -> Self {
        match sort {
            None | Some("name") => Self::Name,
            Some(_) => Self::Rating,
        }
    }
}
