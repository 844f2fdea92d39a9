use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, SeedError};
use crate::provider::{PlaceCandidate, PlaceDetails, PlacesProvider};

/// Returns pre-seeded candidates/details and records call counts, mirroring
/// `llm-client::MockProvider`. Used to test seeding logic without a live
/// Google Places call.
#[derive(Default)]
pub struct MockPlacesProvider {
    pub nearby_results: Vec<PlaceCandidate>,
    pub text_results: Vec<PlaceCandidate>,
    pub details: HashMap<String, PlaceDetails>,
    pub nearby_calls: Mutex<usize>,
    pub text_calls: Mutex<usize>,
}

#[async_trait]
impl PlacesProvider for MockPlacesProvider {
    async fn nearby_search(&self, _lat: f64, _lng: f64, _kind: &str) -> Result<Vec<PlaceCandidate>> {
        *self.nearby_calls.lock().unwrap() += 1;
        Ok(self.nearby_results.clone())
    }

    async fn text_search(&self, _query: &str) -> Result<Vec<PlaceCandidate>> {
        *self.text_calls.lock().unwrap() += 1;
        Ok(self.text_results.clone())
    }

    async fn fetch_details(&self, provider_id: &str) -> Result<PlaceDetails> {
        self.details
            .get(provider_id)
            .cloned()
            .ok_or_else(|| SeedError::Provider(format!("no details for {provider_id}")))
    }
}
