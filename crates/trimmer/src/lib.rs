//! Reduces merged HTML documents to plain visible text (spec §4.5).
//! Owns `silver_trimmed/all`; reads only from `silver_merged/`.

pub mod error;
pub mod text_extract;

pub use error::{Result, TrimError};

use spotcast_common::{TrimmedDocument, TrimmedPage};
use spotcast_datafs::DataRoot;
use tracing::info;

/// Trims every venue with a merged document on disk.
pub async fn trim_all(data_root: &DataRoot, venue_ids: &[String]) -> Result<usize> {
    let mut trimmed = 0;
    for venue_id in venue_ids {
        if trim_venue(data_root, venue_id).await? {
            trimmed += 1;
        }
    }
    info!(venues = trimmed, "trim: wrote silver_trimmed documents");
    Ok(trimmed)
}

/// Trims one venue's merged document, if present. Returns `false` if
/// there was nothing to trim (merger hasn't run for this venue yet).
pub async fn trim_venue(data_root: &DataRoot, venue_id: &str) -> Result<bool> {
    let merged_path = data_root.merged_path(venue_id);
    let Some(merged) = spotcast_datafs::read_json::<spotcast_common::MergedDocument>(&merged_path).await? else {
        return Ok(false);
    };

    let pages = merged
        .pages
        .into_iter()
        .map(|page| TrimmedPage {
            text: text_extract::extract_text(&page.html),
            url: page.url,
            hash: page.hash,
            downloaded_at: page.downloaded_at,
        })
        .collect();

    let document = TrimmedDocument {
        venue_id: merged.venue_id,
        venue_name: merged.venue_name,
        venue_area: merged.venue_area,
        website: merged.website,
        scraped_at: merged.scraped_at,
        pages,
    };

    spotcast_datafs::write_json_ensuring_dir(&data_root.trimmed_all_path(venue_id), &document).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotcast_common::{MergedDocument, MergedPage};

    #[tokio::test]
    async fn trims_html_to_text_and_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let root = DataRoot::new(dir.path());

        let merged = MergedDocument {
            venue_id: "v1".to_string(),
            venue_name: "Test Venue".to_string(),
            venue_area: Some("downtown".to_string()),
            website: Some("https://example.com".to_string()),
            scraped_at: chrono::Utc::now(),
            pages: vec![MergedPage {
                url: "https://example.com".to_string(),
                html: "<html><body><p>Happy hour 4-7pm</p></body></html>".to_string(),
                hash: "abc".to_string(),
                downloaded_at: chrono::Utc::now(),
            }],
        };
        spotcast_datafs::write_json_ensuring_dir(&root.merged_path("v1"), &merged).await.unwrap();

        let trimmed = trim_venue(&root, "v1").await.unwrap();
        assert!(trimmed);

        let doc: TrimmedDocument = spotcast_datafs::read_json(&root.trimmed_all_path("v1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.pages[0].text.contains("Happy hour 4-7pm"));
    }

    #[tokio::test]
    async fn missing_merged_document_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = DataRoot::new(dir.path());
        assert!(!trim_venue(&root, "ghost").await.unwrap());
    }
}
