use tracing::{debug, info};
use uuid::Uuid;

use super::repo::ParkingStore;
use super::repo_types::{Parking, ParkingDraft, ParkingFilter, SortKey};
use crate::error::AppError;
use crate::geo::distance_km;

/// Radius of the proximity search, in kilometres (exclusive).
pub const NEARBY_RADIUS_KM: f64 = 3.0;

/// A proximity hit together with its distance from the query point.
#[derive(Debug, Clone)]
pub struct NearbyParking {
    pub parking: Parking,
    pub distance_km: f64,
}

pub async fn find_all(store: &dyn ParkingStore) -> Result<Vec<Parking>, AppError> {
    store.find_all().await
}

pub async fn find_by_id(store: &dyn ParkingStore, id: Uuid) -> Result<Option<Parking>, AppError> {
    store.find_by_id(id).await
}

pub async fn delete_by_id(store: &dyn ParkingStore, id: Uuid) -> Result<(), AppError> {
    let removed = store.delete(id).await?;
    if removed {
        info!(%id, "parking deleted");
    } else {
        debug!(%id, "delete of missing parking ignored");
    }
    Ok(())
}

/// Text search on city and/or address.
///
/// Empty strings switch a filter off; at least one filter must be set or this
/// fails with [`AppError::InvalidArguments`]. `sort` defaults to `"name"`.
pub async fn find_all_by_city_or_address_sorted(
    store: &dyn ParkingStore,
    city: &str,
    address: &str,
    sort: Option<&str>,
) -> Result<Vec<Parking>, AppError> {
    let filter = ParkingFilter::from_inputs(city, address)?;
    let sort = SortKey::parse(sort);
    let rows = store.search(&filter, sort).await?;
    debug!(?filter, ?sort, hits = rows.len(), "parking search");
    Ok(rows)
}

/// Parkings strictly closer than [`NEARBY_RADIUS_KM`] to the point, nearest first.
///
/// Equal distances keep the store's order.
pub async fn find_by_current_address(
    store: &dyn ParkingStore,
    latitude: f64,
    longitude: f64,
) -> Result<Vec<NearbyParking>, AppError> {
    let mut hits: Vec<NearbyParking> = store
        .find_all()
        .await?
        .into_iter()
        .map(|parking| NearbyParking {
            distance_km: distance_km(parking.latitude, parking.longitude, latitude, longitude),
            parking,
        })
        .filter(|n| n.distance_km < NEARBY_RADIUS_KM)
        .collect();
    hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    debug!(latitude, longitude, hits = hits.len(), "nearby search");
    Ok(hits)
}

pub async fn save(store: &dyn ParkingStore, draft: ParkingDraft) -> Result<Parking, AppError> {
    let parking = store.insert(draft).await?;
    info!(id = %parking.id, name = %parking.name, "parking created");
    Ok(parking)
}

pub async fn edit(
    store: &dyn ParkingStore,
    id: Uuid,
    draft: ParkingDraft,
) -> Result<Parking, AppError> {
    let parking = store
        .update(id, draft)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Parking with id: {id}")))?;
    info!(%id, "parking updated");
    Ok(parking)
}
