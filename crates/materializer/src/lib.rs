//! Projects gold records plus venue data into user-visible spots (spec
//! §4.9): manual-override and pending-edit rules, streak bookkeeping.

pub mod error;

pub use error::{MaterializeError, Result};

use chrono::NaiveDate;
use spotcast_common::{GoldRecord, PromotionEntry, SpotSource, SpotStatus};
use spotcast_store::spots::UpsertSpot;
use sqlx::PgPool;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeStats {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped_excluded: usize,
    pub skipped_deprecated: usize,
    pub skipped_overridden: usize,
}

/// Materializes every `found=true` entry across `records` into spots.
/// Order is not significant: each gold record is independent.
pub async fn materialize_all(
    pool: &PgPool,
    records: &[GoldRecord],
    run_date: NaiveDate,
) -> Result<MaterializeStats> {
    let mut stats = MaterializeStats::default();
    for record in records {
        materialize_record(pool, record, run_date, &mut stats).await?;
    }
    Ok(stats)
}

async fn materialize_record(
    pool: &PgPool,
    record: &GoldRecord,
    run_date: NaiveDate,
    stats: &mut MaterializeStats,
) -> Result<()> {
    if !record.promotions.found() {
        return Ok(());
    }

    let Some(venue) = spotcast_store::venues::find_by_id(pool, &record.venue_id).await? else {
        return Ok(());
    };

    if spotcast_store::watchlist::is_excluded(pool, &record.venue_id).await? {
        stats.skipped_excluded += record.promotions.entries().len();
        return Ok(());
    }

    let status = if record.needs_llm { SpotStatus::Pending } else { SpotStatus::Approved };

    for entry in record.promotions.entries() {
        let kind = humanize_kind(&entry.kind);

        if !spotcast_store::activities::is_active(pool, &kind).await? {
            stats.skipped_deprecated += 1;
            continue;
        }

        let description = format_description(entry);
        let existing = spotcast_store::spots::find_by_natural_key(pool, &venue.id, &kind).await?;

        match existing {
            None => {
                spotcast_store::spots::insert(
                    pool,
                    &UpsertSpot {
                        venue_id: &venue.id,
                        title: &venue.name,
                        description: &description,
                        kind: &kind,
                        lat: venue.lat,
                        lng: venue.lng,
                        area: venue.area.as_deref(),
                        source: SpotSource::Automated,
                        status,
                        source_url: venue.website.as_deref(),
                        confidence: record.confidence,
                    },
                )
                .await?;
                spotcast_store::streaks::record_change(pool, &venue.id, &kind, &kind, run_date)
                    .await?;
                info!(venue_id = %venue.id, kind = %kind, "materializer: created spot");
                stats.created += 1;
            }
            Some(spot) if spot.manual_override || spot.pending_edit.is_some() || spot.pending_delete => {
                stats.skipped_overridden += 1;
            }
            Some(spot) => {
                let changed = spot.description != description;
                spotcast_store::spots::update_automated_fields(
                    pool,
                    spot.id,
                    &venue.name,
                    &description,
                    &kind,
                    status,
                    record.confidence,
                )
                .await?;
                if changed {
                    info!("Updated spot: {}", venue.name);
                    spotcast_store::streaks::record_change(pool, &venue.id, &kind, &kind, run_date)
                        .await?;
                    stats.updated += 1;
                } else {
                    stats.unchanged += 1;
                }
            }
        }
    }

    Ok(())
}

/// `"happy-hour"` -> `"Happy Hour"`; matches the extractor's kebab-case
/// `type` field to the human-facing spot category (spec §8 scenario A).
fn humanize_kind(kind: &str) -> String {
    kind.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `times • days • specials joined by ", "`, else "Happy Hour available"
/// (spec §4.9).
fn format_description(entry: &PromotionEntry) -> String {
    let mut parts = Vec::new();
    if let Some(times) = entry.times.as_deref().filter(|s| !s.is_empty()) {
        parts.push(times.to_string());
    }
    if let Some(days) = entry.days.as_deref().filter(|s| !s.is_empty()) {
        parts.push(days.to_string());
    }
    if !entry.specials.is_empty() {
        parts.push(entry.specials.join(", "));
    }

    if parts.is_empty() {
        "Happy Hour available".to_string()
    } else {
        parts.join(" \u{2022} ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanizes_kebab_case_kind() {
        assert_eq!(humanize_kind("happy-hour"), "Happy Hour");
        assert_eq!(humanize_kind("trivia_night"), "Trivia Night");
        assert_eq!(humanize_kind("brunch"), "Brunch");
    }

    #[test]
    fn formats_full_description() {
        let entry = PromotionEntry {
            kind: "happy-hour".to_string(),
            days: Some("Monday-Friday".to_string()),
            times: Some("4pm-7pm".to_string()),
            label: None,
            specials: vec!["$2 off drinks".to_string(), "half-price apps".to_string()],
        };
        assert_eq!(
            format_description(&entry),
            "4pm-7pm \u{2022} Monday-Friday \u{2022} $2 off drinks, half-price apps"
        );
    }

    #[test]
    fn empty_entry_falls_back_to_default_description() {
        let entry = PromotionEntry {
            kind: "happy-hour".to_string(),
            days: None,
            times: None,
            label: None,
            specials: vec![],
        };
        assert_eq!(format_description(&entry), "Happy Hour available");
    }

    #[test]
    fn partial_entry_only_joins_present_fields() {
        let entry = PromotionEntry {
            kind: "happy-hour".to_string(),
            days: Some("daily".to_string()),
            times: None,
            label: None,
            specials: vec![],
        };
        assert_eq!(format_description(&entry), "daily");
    }
}
