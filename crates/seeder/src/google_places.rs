//! A real `PlacesProvider` backed by the Google Places Web Service
//! (nearbysearch / textsearch / details). Network errors surface as
//! `SeedError::Provider` so a failed area can be logged and skipped
//! without aborting the rest of the run (spec §4.2 Failure).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use spotcast_common::AddressComponents;

use crate::error::{Result, SeedError};
use crate::provider::{PlaceCandidate, PlaceDetails, PlacesProvider};

const NEARBY_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const TEXT_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const SEARCH_RADIUS_M: u32 = 1500;

pub struct GooglePlacesProvider {
    client: Client,
    api_key: String,
}

impl GooglePlacesProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { client: Client::new(), api_key: api_key.into() }
    }

    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| SeedError::Provider(e.to_string()))?;
        response.json::<Value>().await.map_err(|e| SeedError::Provider(e.to_string()))
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesProvider {
    async fn nearby_search(&self, lat: f64, lng: f64, establishment_type: &str) -> Result<Vec<PlaceCandidate>> {
        let location = format!("{lat},{lng}");
        let radius = SEARCH_RADIUS_M.to_string();
        let body = self
            .get_json(
                NEARBY_URL,
                &[
                    ("location", location.as_str()),
                    ("radius", radius.as_str()),
                    ("type", establishment_type),
                    ("key", self.api_key.as_str()),
                ],
            )
            .await?;
        Ok(parse_candidates(&body))
    }

    async fn text_search(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        let body = self.get_json(TEXT_URL, &[("query", query), ("key", self.api_key.as_str())]).await?;
        Ok(parse_candidates(&body))
    }

    async fn fetch_details(&self, provider_id: &str) -> Result<PlaceDetails> {
        let body = self
            .get_json(
                DETAILS_URL,
                &[
                    ("place_id", provider_id),
                    ("fields", "website,formatted_address,address_component"),
                    ("key", self.api_key.as_str()),
                ],
            )
            .await?;
        Ok(parse_details(&body))
    }
}

fn parse_candidates(body: &Value) -> Vec<PlaceCandidate> {
    body["results"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|r| {
            Some(PlaceCandidate {
                provider_id: r["place_id"].as_str()?.to_string(),
                name: r["name"].as_str().unwrap_or_default().to_string(),
                lat: r["geometry"]["location"]["lat"].as_f64()?,
                lng: r["geometry"]["location"]["lng"].as_f64()?,
            })
        })
        .collect()
}

fn parse_details(body: &Value) -> PlaceDetails {
    let result = &body["result"];
    let mut components = AddressComponents::default();
    if let Some(items) = result["address_components"].as_array() {
        for item in items {
            let types: Vec<String> =
                item["types"].as_array().into_iter().flatten().filter_map(|t| t.as_str().map(String::from)).collect();
            let long_name = item["long_name"].as_str().unwrap_or_default().to_string();
            if types.iter().any(|t| t.starts_with("sublocality")) {
                components.sublocality_types = types.clone();
                components.sublocality_name = Some(long_name.clone());
            }
            if types.iter().any(|t| t == "postal_code") {
                components.zip = Some(long_name.clone());
            }
            if types.iter().any(|t| t == "street_number") {
                components.street_number = Some(long_name.clone());
            }
            if types.iter().any(|t| t == "route") {
                components.street_name = Some(long_name.clone());
            }
        }
    }

    PlaceDetails {
        website: result["website"].as_str().map(String::from),
        address: result["formatted_address"].as_str().map(String::from),
        address_components: components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_candidates_from_results_array() {
        let body = serde_json::json!({
            "results": [
                {"place_id": "abc", "name": "Test Bar", "geometry": {"location": {"lat": 32.78, "lng": -79.93}}}
            ]
        });
        let candidates = parse_candidates(&body);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].provider_id, "abc");
        assert_eq!(candidates[0].name, "Test Bar");
    }

    #[test]
    fn parses_details_address_components() {
        let body = serde_json::json!({
            "result": {
                "website": "https://example.com",
                "formatted_address": "123 King Street, Charleston, SC",
                "address_components": [
                    {"long_name": "29401", "types": ["postal_code"]},
                    {"long_name": "Downtown", "types": ["sublocality_level_1", "sublocality"]}
                ]
            }
        });
        let details = parse_details(&body);
        assert_eq!(details.website.as_deref(), Some("https://example.com"));
        assert_eq!(details.address_components.zip.as_deref(), Some("29401"));
        assert_eq!(details.address_components.sublocality_name.as_deref(), Some("Downtown"));
    }
}
