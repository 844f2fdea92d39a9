//! Collapses a venue's raw HTML files into one merged document
//! (spec §4.4). Owns `silver_merged/`; reads only from `raw/today/`.

pub mod error;

pub use error::{MergeError, Result};

use spotcast_common::{MergedDocument, MergedPage, Venue};
use spotcast_datafs::DataRoot;
use tracing::{info, warn};

/// Merges every venue's raw pages into `silver_merged/all/<id>.json`,
/// overwriting any prior document. Venues with no HTML files are still
/// emitted with `pages: []`.
pub async fn merge_all(data_root: &DataRoot, venues: &[Venue]) -> Result<usize> {
    let mut merged = 0;
    for venue in venues {
        merge_venue(data_root, venue).await?;
        merged += 1;
    }
    info!(venues = merged, "merge: wrote silver_merged documents");
    Ok(merged)
}

async fn merge_venue(data_root: &DataRoot, venue: &Venue) -> Result<()> {
    let venue_dir = data_root.raw_today_venue_dir(&venue.id);
    let metadata_path = data_root.raw_today_metadata(&venue.id);
    let url_by_hash: std::collections::HashMap<String, String> =
        spotcast_datafs::read_json(&metadata_path).await?.unwrap_or_default();

    let mut pages = Vec::new();
    if let Ok(mut entries) = tokio::fs::read_dir(&venue_dir).await {
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(hash) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };
            match read_page(&path, &hash, &url_by_hash).await {
                Ok(page) => pages.push(page),
                Err(e) => warn!(venue_id = %venue.id, file = %path.display(), error = %e, "merge: skipping unreadable page"),
            }
        }
    }

    let document = MergedDocument {
        venue_id: venue.id.clone(),
        venue_name: venue.name.clone(),
        venue_area: venue.area.clone(),
        website: venue.website.clone(),
        scraped_at: chrono::Utc::now(),
        pages,
    };

    let merged_path = data_root.merged_path(&venue.id);
    spotcast_datafs::write_json_ensuring_dir(&merged_path, &document).await?;
    Ok(())
}

async fn read_page(
    path: &std::path::Path,
    hash: &str,
    url_by_hash: &std::collections::HashMap<String, String>,
) -> Result<MergedPage> {
    let html = tokio::fs::read_to_string(path).await?;
    let meta = tokio::fs::metadata(path).await?;
    let downloaded_at = meta.modified()?.into();
    let url = url_by_hash.get(hash).cloned().unwrap_or_else(|| hash.to_string());

    Ok(MergedPage { url, html, hash: hash.to_string(), downloaded_at })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(id: &str, area: Option<&str>) -> Venue {
        Venue {
            id: id.to_string(),
            name: "Test Venue".to_string(),
            lat: 0.0,
            lng: 0.0,
            area: area.map(|s| s.to_string()),
            address: None,
            website: Some("https://example.com".to_string()),
            zip_codes: Vec::new(),
            address_components: serde_json::json!({}),
            operating_hours: serde_json::json!({}),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn venue_with_no_pages_still_gets_merged_document() {
        let dir = tempfile::tempdir().unwrap();
        let root = DataRoot::new(dir.path());
        let venues = vec![venue("v1", Some("downtown"))];

        merge_all(&root, &venues).await.unwrap();

        let doc: MergedDocument = spotcast_datafs::read_json(&root.merged_path("v1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.venue_id, "v1");
        assert_eq!(doc.venue_area.as_deref(), Some("downtown"));
        assert!(doc.pages.is_empty());
    }

    #[tokio::test]
    async fn merges_html_files_and_resolves_urls_via_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = DataRoot::new(dir.path());
        let venue_dir = root.raw_today_venue_dir("v1");
        tokio::fs::create_dir_all(&venue_dir).await.unwrap();
        tokio::fs::write(venue_dir.join("abc123456789.html"), "<html>hi</html>")
            .await
            .unwrap();
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("abc123456789".to_string(), "https://example.com/menu".to_string());
        spotcast_datafs::write_json_ensuring_dir(&root.raw_today_metadata("v1"), &metadata)
            .await
            .unwrap();

        let venues = vec![venue("v1", None)];
        merge_all(&root, &venues).await.unwrap();

        let doc: MergedDocument = spotcast_datafs::read_json(&root.merged_path("v1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].url, "https://example.com/menu");
        assert_eq!(doc.pages[0].html, "<html>hi</html>");
    }

    #[tokio::test]
    async fn missing_metadata_falls_back_to_hash_as_url() {
        let dir = tempfile::tempdir().unwrap();
        let root = DataRoot::new(dir.path());
        let venue_dir = root.raw_today_venue_dir("v1");
        tokio::fs::create_dir_all(&venue_dir).await.unwrap();
        tokio::fs::write(venue_dir.join("deadbeefcafe.html"), "<html></html>")
            .await
            .unwrap();

        let venues = vec![venue("v1", None)];
        merge_all(&root, &venues).await.unwrap();

        let doc: MergedDocument = spotcast_datafs::read_json(&root.merged_path("v1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.pages[0].url, "deadbeefcafe");
    }
}
