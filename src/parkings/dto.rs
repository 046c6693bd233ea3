use serde::{Deserialize, Serialize};

use super::repo_types::{Parking, ParkingDraft, SortKey};
use super::services::NearbyParking;
use crate::geo::Coordinates;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    #[serde(default)]
    pub coordinates: String, // "<lat> <lon>"
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub sorted_by: SortKey,
    pub parkings: Vec<Parking>,
}

#[derive(Debug, Serialize)]
pub struct NearbyItem {
    #[serde(flatten)]
    pub parking: Parking,
    pub distance_km: f64,
}

impl From<NearbyParking> for NearbyItem {
    fn from(n: NearbyParking) -> Self {
        Self {
            parking: n.parking,
            distance_km: n.distance_km,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub sorted_by: &'static str,
    pub parkings: Vec<NearbyItem>,
}

/// Body of create and edit requests.
#[derive(Debug, Deserialize)]
pub struct ParkingRequest {
    pub name: String,
    pub city: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub rating: String,
    pub map_url: Option<String>,
}

impl ParkingRequest {
    pub fn into_draft(self) -> Result<ParkingDraft, &'static str> {
        let name = self.name.trim();
        let city = self.city.trim();
        let address = self.address.trim();
        if name.is_empty() || city.is_empty() || address.is_empty() {
            return Err("name, city and address are required");
        }
        if !Coordinates::is_valid(self.latitude, self.longitude) {
            return Err("latitude must be within [-90, 90] and longitude within [-180, 180]");
        }
        Ok(ParkingDraft {
            name: name.to_string(),
            city: city.to_string(),
            address: address.to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            rating: self.rating.trim().to_string(),
            map_url: self.map_url.filter(|u| !u.trim().is_empty()),
        })
    }
}
