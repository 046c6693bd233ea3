use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{
    dto::{NearbyQuery, NearbyResponse, ParkingRequest, SearchRequest, SearchResponse},
    repo_types::{Parking, SortKey},
    services,
};
use crate::{
    auth::extractors::AdminUser,
    error::{reject, AppError},
    geo::Coordinates,
    state::AppState,
};

pub const EMPTY_SEARCH_MESSAGE: &str =
    "You must fill at least one field in order to search by city/address";

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/parkings", get(list_parkings))
        .route("/parkings/search", post(search_parkings))
        .route("/parkings/nearby", get(nearby_parkings))
        .route("/parkings/:id", get(get_parking))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/parkings", post(create_parking))
        .route("/parkings/:id", axum::routing::put(update_parking).delete(delete_parking))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_parkings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Parking>>, (StatusCode, String)> {
    let rows = services::find_all(state.parkings.as_ref())
        .await
        .map_err(reject)?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_parking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Parking>, (StatusCode, String)> {
    match services::find_by_id(state.parkings.as_ref(), id).await {
        Ok(Some(parking)) => Ok(Json(parking)),
        Ok(None) => Err(reject(AppError::NotFound(format!("Parking with id: {id}")))),
        Err(e) => Err(reject(e)),
    }
}

/// POST /parkings/search { city?, address?, sort? }
#[instrument(skip(state))]
pub async fn search_parkings(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let city = body.city.trim();
    let address = body.address.trim();
    if city.is_empty() && address.is_empty() {
        warn!("search without city or address");
        return Err((StatusCode::BAD_REQUEST, EMPTY_SEARCH_MESSAGE.into()));
    }

    // only an absent sort falls back to name; "" sorts by rating
    let sort = body.sort.as_deref();
    let parkings = services::find_all_by_city_or_address_sorted(
        state.parkings.as_ref(),
        city,
        address,
        sort,
    )
    .await
    .map_err(reject)?;

    Ok(Json(SearchResponse {
        sorted_by: SortKey::parse(sort),
        parkings,
    }))
}

/// GET /parkings/nearby?coordinates=<lat> <lon>
#[instrument(skip(state))]
pub async fn nearby_parkings(
    State(state): State<AppState>,
    Query(q): Query<NearbyQuery>,
) -> Result<Json<NearbyResponse>, (StatusCode, String)> {
    let coords: Coordinates = q.coordinates.parse().map_err(|e| {
        warn!(error = %e, coordinates = %q.coordinates, "bad coordinates");
        (StatusCode::BAD_REQUEST, format!("{e}"))
    })?;

    let hits = services::find_by_current_address(
        state.parkings.as_ref(),
        coords.latitude,
        coords.longitude,
    )
    .await
    .map_err(reject)?;

    Ok(Json(NearbyResponse {
        sorted_by: "distance",
        parkings: hits.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state, body))]
pub async fn create_parking(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(body): Json<ParkingRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Parking>), (StatusCode, String)> {
    let draft = body.into_draft().map_err(bad_request)?;
    let parking = services::save(state.parkings.as_ref(), draft)
        .await
        .map_err(reject)?;

    let location = format!("/api/v1/parkings/{}", parking.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(parking)))
}

#[instrument(skip(state, body))]
pub async fn update_parking(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ParkingRequest>,
) -> Result<Json<Parking>, (StatusCode, String)> {
    let draft = body.into_draft().map_err(bad_request)?;
    let parking = services::edit(state.parkings.as_ref(), id, draft)
        .await
        .map_err(reject)?;
    Ok(Json(parking))
}

#[instrument(skip(state))]
pub async fn delete_parking(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::delete_by_id(state.parkings.as_ref(), id)
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

fn bad_request(msg: &'static str) -> (StatusCode, String) {
    warn!(%msg, "invalid parking payload");
    (StatusCode::BAD_REQUEST, msg.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        auth::extractors::AuthUser,
        parkings::{memory::MemoryParkingStore, repo_types::ParkingDraft},
        users::{memory::MemoryUserStore, repo_types::Role},
    };

    fn draft(name: &str, city: &str, address: &str, lat: f64, lon: f64) -> ParkingDraft {
        ParkingDraft {
            name: name.into(),
            city: city.into(),
            address: address.into(),
            latitude: lat,
            longitude: lon,
            rating: "4".into(),
            map_url: None,
        }
    }

    fn state_with(store: Arc<MemoryParkingStore>) -> AppState {
        AppState::fake_with(store, Arc::new(MemoryUserStore::default()))
    }

    fn admin() -> AdminUser {
        AdminUser(AuthUser {
            username: "admin".into(),
            role: Role::Admin,
        })
    }

    fn body(name: &str) -> ParkingRequest {
        ParkingRequest {
            name: name.into(),
            city: "Skopje".into(),
            address: "Kej 13 Noemvri".into(),
            latitude: 41.9950,
            longitude: 21.4300,
            rating: "4.0".into(),
            map_url: None,
        }
    }

    #[tokio::test]
    async fn empty_search_is_rejected_before_the_service() {
        let store = Arc::new(MemoryParkingStore::default());
        let state = state_with(store.clone());
        let err = search_parkings(
            State(state),
            Json(SearchRequest {
                city: "  ".into(),
                address: String::new(),
                sort: Some("name".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err, (StatusCode::BAD_REQUEST, EMPTY_SEARCH_MESSAGE.to_string()));
        assert_eq!(store.searches(), 0);
    }

    #[tokio::test]
    async fn search_by_city_sorted_by_name() {
        let store = Arc::new(MemoryParkingStore::with([
            draft("Zeta", "Rome", "Via A", 41.9, 12.5),
            draft("Alpha", "rome", "Via B", 41.9, 12.5),
            draft("Beta", "Milan", "Via C", 45.4, 9.2),
        ]));
        let state = state_with(store.clone());
        let Json(res) = search_parkings(
            State(state),
            Json(SearchRequest {
                city: " ROME ".into(),
                address: String::new(),
                sort: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(res.sorted_by, SortKey::Name);
        let names: Vec<&str> = res.parkings.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Zeta"]);
        assert_eq!(store.searches(), 1);
    }

    #[tokio::test]
    async fn blank_sort_orders_by_rating() {
        let mut low = draft("A", "Rome", "Via A", 41.9, 12.5);
        low.rating = "1".into();
        let mut high = draft("B", "Rome", "Via B", 41.9, 12.5);
        high.rating = "5".into();
        let state = state_with(Arc::new(MemoryParkingStore::with([low, high])));

        let Json(res) = search_parkings(
            State(state),
            Json(SearchRequest {
                city: "rome".into(),
                address: String::new(),
                sort: Some(String::new()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(res.sorted_by, SortKey::Rating);
        let names: Vec<&str> = res.parkings.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[tokio::test]
    async fn nearby_parses_coordinates() {
        let store = Arc::new(MemoryParkingStore::with([
            draft("Near", "Skopje", "Centar", 41.9965, 21.4310),
            draft("Far", "Ohrid", "Kej", 41.1172, 20.8016),
        ]));
        let state = state_with(store);
        let Json(res) = nearby_parkings(
            State(state.clone()),
            Query(NearbyQuery {
                coordinates: "41.9961 21.4316".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(res.sorted_by, "distance");
        assert_eq!(res.parkings.len(), 1);
        assert_eq!(res.parkings[0].parking.name, "Near");
        assert!(res.parkings[0].distance_km < 0.1);

        let err = nearby_parkings(
            State(state),
            Query(NearbyQuery {
                coordinates: String::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_crud_cycle() {
        let store = Arc::new(MemoryParkingStore::default());
        let state = state_with(store.clone());

        let (status, headers, Json(created)) =
            create_parking(State(state.clone()), admin(), Json(body("Ploshtad")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(headers[0].1, format!("/api/v1/parkings/{}", created.id));

        let Json(updated) = update_parking(
            State(state.clone()),
            admin(),
            Path(created.id),
            Json(body("Ploshtad Makedonija")),
        )
        .await
        .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Ploshtad Makedonija");

        let Json(fetched) = get_parking(State(state.clone()), Path(created.id)).await.unwrap();
        assert_eq!(fetched, updated);

        let status = delete_parking(State(state.clone()), admin(), Path(created.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_parking(State(state.clone()), Path(created.id)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        let Json(all) = list_parkings(State(state)).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_parking_is_not_found() {
        let store = Arc::new(MemoryParkingStore::default());
        let state = state_with(store.clone());
        let err = update_parking(State(state), admin(), Path(Uuid::new_v4()), Json(body("Ghost")))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload() {
        let state = state_with(Arc::new(MemoryParkingStore::default()));
        let mut bad = body("Nowhere");
        bad.latitude = 95.0;
        let err = create_parking(State(state), admin(), Json(bad)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
