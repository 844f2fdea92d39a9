//! Provider abstraction for venue discovery (spec §4.2). Modeled the same
//! way as `llm-client`'s `ChatProvider`: a narrow trait so a mock can stand
//! in for tests without a live network call.

use async_trait::async_trait;
use spotcast_common::AddressComponents;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCandidate {
    pub provider_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PlaceDetails {
    pub website: Option<String>,
    pub address: Option<String>,
    pub address_components: AddressComponents,
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn nearby_search(&self, lat: f64, lng: f64, establishment_type: &str) -> Result<Vec<PlaceCandidate>>;
    async fn text_search(&self, query: &str) -> Result<Vec<PlaceCandidate>>;
    async fn fetch_details(&self, provider_id: &str) -> Result<PlaceDetails>;
}
