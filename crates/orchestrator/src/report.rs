//! Renders the daily report's high/medium/low action buckets from the
//! latest manifest, outstanding confidence reviews, and flagged venues
//! (spec §6 "report command", §7 "report's high/medium/low action
//! buckets").

use std::fmt;

use spotcast_common::{StepStatus, WatchlistStatus};
use spotcast_datafs::DataRoot;
use sqlx::PgPool;

use crate::error::Result;
use crate::manifest::{self, Manifest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone)]
pub struct ActionItem {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DailyReport {
    pub run: Option<Manifest>,
    pub actions: Vec<ActionItem>,
}

pub async fn build(pool: &PgPool, data_root: &DataRoot) -> Result<DailyReport> {
    let run = manifest::read(data_root).await?;
    let mut actions = Vec::new();

    if let Some(m) = &run {
        for (name, step) in &m.steps {
            match step.status {
                StepStatus::Failed => actions.push(ActionItem {
                    severity: Severity::High,
                    message: format!("{name} failed: {}", step.reason.as_deref().unwrap_or("no reason recorded")),
                }),
                StepStatus::Skipped => {
                    if let Some(reason) = &step.reason {
                        actions.push(ActionItem { severity: Severity::Medium, message: format!("{name} skipped: {reason}") });
                    }
                }
                StepStatus::Completed => {}
            }
        }
    }

    for review in spotcast_store::reviews::list_unsure(pool).await? {
        actions.push(ActionItem {
            severity: Severity::Medium,
            message: format!("{} / {} needs manual review (confidence {:.2})", review.venue_id, review.kind, review.heuristic_score),
        });
    }

    for entry in spotcast_store::watchlist::list_by_status(pool, WatchlistStatus::Flagged).await? {
        actions.push(ActionItem {
            severity: Severity::Low,
            message: format!("{} flagged: {}", entry.name, entry.reason.as_deref().unwrap_or("no reason given")),
        });
    }

    actions.sort_by_key(|a| std::cmp::Reverse(a.severity));
    Ok(DailyReport { run, actions })
}

impl fmt::Display for DailyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.run {
            Some(m) => writeln!(f, "Run {} ({}) — {:?}", m.run_id, m.run_date, m.status)?,
            None => writeln!(f, "No run manifest found")?,
        }
        if self.actions.is_empty() {
            return writeln!(f, "No outstanding actions.");
        }
        for severity in [Severity::High, Severity::Medium, Severity::Low] {
            let items: Vec<_> = self.actions.iter().filter(|a| a.severity == severity).collect();
            if items.is_empty() {
                continue;
            }
            writeln!(f, "{severity:?}:")?;
            for item in items {
                writeln!(f, "  - {}", item.message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Utc;
    use spotcast_common::RunStatus;

    #[test]
    fn displays_buckets_in_severity_order() {
        let report = DailyReport {
            run: Some(Manifest {
                run_id: 1,
                run_date: "20260731".to_string(),
                area_filter: None,
                status: RunStatus::Completed,
                started_at: Utc::now(),
                finished_at: Some(Utc::now()),
                steps: BTreeMap::new(),
            }),
            actions: vec![
                ActionItem { severity: Severity::Low, message: "low item".to_string() },
                ActionItem { severity: Severity::High, message: "high item".to_string() },
            ],
        };
        let rendered = report.to_string();
        assert!(rendered.find("High:").unwrap() < rendered.find("Low:").unwrap());
    }

    #[test]
    fn empty_actions_render_reassuring_message() {
        let report = DailyReport { run: None, actions: Vec::new() };
        assert!(report.to_string().contains("No outstanding actions"));
    }
}
