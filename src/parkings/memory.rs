use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use uuid::Uuid;

use super::repo::ParkingStore;
use super::repo_types::{Parking, ParkingDraft, ParkingFilter, SortKey};
use crate::error::AppError;

/// Vec-backed store; keeps insertion order.
#[derive(Default)]
pub struct MemoryParkingStore {
    rows: Mutex<Vec<Parking>>,
    searches: AtomicUsize,
}

impl MemoryParkingStore {
    pub fn with(drafts: impl IntoIterator<Item = ParkingDraft>) -> Self {
        let rows = drafts
            .into_iter()
            .map(|d| into_parking(d, Uuid::new_v4()))
            .collect();
        Self {
            rows: Mutex::new(rows),
            searches: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> Vec<Parking> {
        self.rows.lock().unwrap().clone()
    }

    /// Number of `search` calls served so far.
    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

fn into_parking(draft: ParkingDraft, id: Uuid) -> Parking {
    Parking {
        id,
        name: draft.name,
        city: draft.city,
        address: draft.address,
        latitude: draft.latitude,
        longitude: draft.longitude,
        rating: draft.rating,
        map_url: draft.map_url,
    }
}

/// Same semantics as the `UPDATE` in `PgParkingStore`: `map_url` only changes when set.
fn apply(draft: ParkingDraft, parking: &mut Parking) {
    parking.name = draft.name;
    parking.city = draft.city;
    parking.address = draft.address;
    parking.latitude = draft.latitude;
    parking.longitude = draft.longitude;
    parking.rating = draft.rating;
    if draft.map_url.is_some() {
        parking.map_url = draft.map_url;
    }
}

fn matches(filter: &ParkingFilter, parking: &Parking) -> bool {
    let contains = |haystack: &str, needle: &str| {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    };
    filter.city().map_or(true, |c| contains(&parking.city, c))
        && filter.address().map_or(true, |a| contains(&parking.address, a))
}

fn sort_rows(sort: SortKey, rows: &mut [Parking]) {
    match sort {
        SortKey::Name => rows.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::Rating => rows.sort_by(|a, b| b.rating.cmp(&a.rating)),
    }
}

#[async_trait]
impl ParkingStore for MemoryParkingStore {
    async fn find_all(&self) -> Result<Vec<Parking>, AppError> {
        Ok(self.snapshot())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Parking>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn search(&self, filter: &ParkingFilter, sort: SortKey) -> Result<Vec<Parking>, AppError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let mut hits: Vec<Parking> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| matches(filter, p))
            .cloned()
            .collect();
        sort_rows(sort, &mut hits);
        Ok(hits)
    }

    async fn insert(&self, draft: ParkingDraft) -> Result<Parking, AppError> {
        let parking = into_parking(draft, Uuid::new_v4());
        self.rows.lock().unwrap().push(parking.clone());
        Ok(parking)
    }

    async fn update(&self, id: Uuid, draft: ParkingDraft) -> Result<Option<Parking>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(existing) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        apply(draft, existing);
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, city: &str, address: &str) -> ParkingDraft {
        ParkingDraft {
            name: name.into(),
            city: city.into(),
            address: address.into(),
            latitude: 0.0,
            longitude: 0.0,
            rating: "3".into(),
            map_url: None,
        }
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let p = into_parking(draft("Central", "ROME", "Via Nazionale 1"), Uuid::new_v4());
        assert!(matches(&ParkingFilter::City("rome".into()), &p));
        assert!(matches(&ParkingFilter::Address("nazion".into()), &p));
        assert!(!matches(
            &ParkingFilter::CityAndAddress {
                city: "rome".into(),
                address: "corso".into()
            },
            &p
        ));
    }

    #[test]
    fn edit_keeps_map_url_unless_replaced() {
        let mut p = into_parking(draft("A", "Skopje", "Partizanska"), Uuid::new_v4());
        p.map_url = Some("https://maps.example/a".into());
        let id = p.id;

        apply(draft("B", "Bitola", "Shirok Sokak"), &mut p);
        assert_eq!(p.id, id);
        assert_eq!(p.name, "B");
        assert_eq!(p.city, "Bitola");
        assert_eq!(p.map_url.as_deref(), Some("https://maps.example/a"));

        let mut replaced = draft("B", "Bitola", "Shirok Sokak");
        replaced.map_url = Some("https://maps.example/b".into());
        apply(replaced, &mut p);
        assert_eq!(p.map_url.as_deref(), Some("https://maps.example/b"));
    }
}
