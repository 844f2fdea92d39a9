//! Discovers venues via nearby + text search and keeps `venues` canonical
//! (spec §4.2). Idempotent by venue id: a failed or empty area never
//! shrinks previously-seeded venues, since this crate only ever upserts.

pub mod error;
pub mod google_places;
pub mod mock;
pub mod provider;

pub use error::{Result, SeedError};
pub use provider::{PlaceCandidate, PlaceDetails, PlacesProvider};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use spotcast_common::{Area, ClassifyInput, Venue};
use sqlx::PgPool;
use tracing::{info, warn};

/// Establishment types probed at every grid point (spec §4.2 "(a) query a
/// nearby-search provider for each type of establishment").
const ESTABLISHMENT_TYPES: &[&str] = &["bar", "restaurant", "night_club"];

/// Curated text-search phrase templates; `{area}` is replaced with the
/// area's display name.
const TEXT_SEARCH_PHRASES: &[&str] = &["happy hour bar in {area}", "restaurant specials in {area}"];

/// Side length of the nearby-search grid covering each area's bounding box.
const GRID_SIZE: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct SeedStats {
    pub areas_succeeded: Vec<String>,
    pub areas_failed: Vec<String>,
    pub venues_upserted: usize,
}

/// Seeds every area, bounded by `concurrency` in-flight areas and
/// `max_requests_per_day` total provider calls. A failed provider call for
/// one area does not abort the others (spec §4.2 Failure).
pub async fn run_seed(
    pool: &PgPool,
    provider: Arc<dyn PlacesProvider>,
    areas: &[Area],
    concurrency: usize,
    max_requests_per_day: usize,
) -> Result<SeedStats> {
    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));
    let request_budget = Arc::new(AtomicUsize::new(max_requests_per_day));

    let all_areas = areas.to_vec();
    let mut tasks = Vec::with_capacity(areas.len());
    for area in areas {
        let area = area.clone();
        let all_areas = all_areas.clone();
        let provider = provider.clone();
        let semaphore = semaphore.clone();
        let request_budget = request_budget.clone();
        tasks.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore never closed");
            let result = seed_area(provider.as_ref(), &area, &all_areas, &request_budget).await;
            (area.name.clone(), result)
        }));
    }

    let mut merged: HashMap<String, Venue> = HashMap::new();
    let mut stats = SeedStats::default();

    for task in tasks {
        let (area_name, result) = task.await.map_err(|e| SeedError::Provider(e.to_string()))?;
        match result {
            Ok(venues) => {
                for venue in venues {
                    merged.insert(venue.id.clone(), venue);
                }
                stats.areas_succeeded.push(area_name);
            }
            Err(e) => {
                warn!(area = %area_name, error = %e, "seeder: area failed, venues left untouched");
                stats.areas_failed.push(area_name);
            }
        }
    }

    for venue in merged.values() {
        spotcast_store::venues::upsert(pool, venue).await?;
    }
    stats.venues_upserted = merged.len();

    info!(
        succeeded = stats.areas_succeeded.len(),
        failed = stats.areas_failed.len(),
        venues = stats.venues_upserted,
        "seeder: run complete"
    );
    Ok(stats)
}

async fn seed_area(
    provider: &dyn PlacesProvider,
    area: &Area,
    all_areas: &[Area],
    request_budget: &AtomicUsize,
) -> Result<Vec<Venue>> {
    let mut candidates: HashMap<String, PlaceCandidate> = HashMap::new();

    for (lat, lng) in grid_points(area, GRID_SIZE) {
        for kind in ESTABLISHMENT_TYPES {
            if !take_request_budget(request_budget) {
                break;
            }
            for c in provider.nearby_search(lat, lng, kind).await? {
                candidates.insert(c.provider_id.clone(), c);
            }
        }
    }

    for phrase in TEXT_SEARCH_PHRASES {
        if !take_request_budget(request_budget) {
            break;
        }
        let query = phrase.replace("{area}", &area.display_name);
        for c in provider.text_search(&query).await? {
            candidates.insert(c.provider_id.clone(), c);
        }
    }

    let mut venues = Vec::with_capacity(candidates.len());
    for candidate in candidates.into_values() {
        if !take_request_budget(request_budget) {
            break;
        }
        let details = provider.fetch_details(&candidate.provider_id).await?;
        venues.push(build_venue(&candidate, &details, all_areas));
    }

    Ok(venues)
}

fn take_request_budget(budget: &AtomicUsize) -> bool {
    budget
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn build_venue(candidate: &PlaceCandidate, details: &PlaceDetails, areas: &[Area]) -> Venue {
    let address = details.address.clone().unwrap_or_default();
    let input = ClassifyInput {
        lat: candidate.lat,
        lng: candidate.lng,
        full_address: &address,
        components: &details.address_components,
    };
    let area = spotcast_area_classifier::classify(&input, areas);
    let now = Utc::now();

    Venue {
        id: candidate.provider_id.clone(),
        name: candidate.name.clone(),
        lat: candidate.lat,
        lng: candidate.lng,
        area,
        address: details.address.clone(),
        website: details.website.clone(),
        zip_codes: details.address_components.zip.clone().into_iter().collect(),
        address_components: serde_json::json!({
            "sublocalityTypes": details.address_components.sublocality_types,
            "sublocalityName": details.address_components.sublocality_name,
            "zip": details.address_components.zip,
            "streetNumber": details.address_components.street_number,
            "streetName": details.address_components.street_name,
        }),
        operating_hours: serde_json::json!({}),
        created_at: now,
        updated_at: now,
    }
}

/// `n x n` grid of points spanning `area`'s bounding box (spec §4.2 "a grid
/// of seed points covering the area").
fn grid_points(area: &Area, n: usize) -> Vec<(f64, f64)> {
    let b = area.bounds;
    let n = n.max(1);
    let mut points = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let lat = b.south + (b.north - b.south) * (i as f64 + 0.5) / n as f64;
            let lng = b.west + (b.east - b.west) * (j as f64 + 0.5) / n as f64;
            points.push((lat, lng));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotcast_common::Bounds;
    use std::collections::HashSet;

    fn test_area() -> Area {
        Area {
            name: "downtown".to_string(),
            display_name: "Downtown".to_string(),
            bounds: Bounds { south: 32.75, west: -79.96, north: 32.80, east: -79.90 },
            center: (32.78, -79.93),
            radius_m: 3000.0,
            zip_codes: HashSet::new(),
        }
    }

    #[test]
    fn grid_points_stay_within_bounds() {
        let area = test_area();
        let points = grid_points(&area, 3);
        assert_eq!(points.len(), 9);
        for (lat, lng) in points {
            assert!(area.bounds.contains(lat, lng));
        }
    }

    #[test]
    fn request_budget_is_exhausted_after_n_takes() {
        let budget = AtomicUsize::new(2);
        assert!(take_request_budget(&budget));
        assert!(take_request_budget(&budget));
        assert!(!take_request_budget(&budget));
    }

    #[tokio::test]
    async fn seed_area_dedupes_candidates_by_provider_id() {
        let mut details = HashMap::new();
        details.insert(
            "p1".to_string(),
            PlaceDetails {
                website: Some("https://example.com".to_string()),
                address: Some("685 King Street, Charleston, SC".to_string()),
                address_components: Default::default(),
            },
        );
        let mock = mock::MockPlacesProvider {
            nearby_results: vec![PlaceCandidate {
                provider_id: "p1".to_string(),
                name: "Test Tavern".to_string(),
                lat: 32.78,
                lng: -79.93,
            }],
            text_results: vec![PlaceCandidate {
                provider_id: "p1".to_string(),
                name: "Test Tavern".to_string(),
                lat: 32.78,
                lng: -79.93,
            }],
            details,
            ..Default::default()
        };

        let budget = AtomicUsize::new(1000);
        let venues = seed_area(&mock, &test_area(), &[], &budget).await.unwrap();
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].id, "p1");
        assert_eq!(venues[0].area.as_deref(), Some("Downtown Charleston"));
    }

    #[tokio::test]
    async fn seed_area_skips_remaining_work_once_budget_exhausted() {
        let mock = mock::MockPlacesProvider {
            nearby_results: vec![PlaceCandidate {
                provider_id: "p1".to_string(),
                name: "Test Tavern".to_string(),
                lat: 32.78,
                lng: -79.93,
            }],
            ..Default::default()
        };
        let budget = AtomicUsize::new(0);
        let venues = seed_area(&mock, &test_area(), &[], &budget).await.unwrap();
        assert!(venues.is_empty());
        assert_eq!(*mock.nearby_calls.lock().unwrap(), 0);
    }
}
