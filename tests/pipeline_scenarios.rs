//! End-to-end scenarios against a live Postgres instance (spec §8). Each
//! test skips cleanly when `DATABASE_TEST_URL` isn't set, following the
//! same pattern the rest of this workspace's DB-backed integration tests
//! use.

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;

use spotcast_common::{
    AuditAction, ExtractionMethod, GoldRecord, Promotions, RunStatus, SpotSource, SpotStatus,
    Venue, WatchlistStatus,
};
use spotcast_store::spots::UpsertSpot;

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;
    sqlx::migrate!("./migrations").run(&pool).await.ok()?;

    for table in ["audit", "reviews", "spots", "streaks", "gold", "watchlist", "pipeline_runs", "venues"] {
        sqlx::query(&format!("TRUNCATE {table} RESTART IDENTITY CASCADE")).execute(&pool).await.ok()?;
    }
    Some(pool)
}

fn test_venue(id: &str) -> Venue {
    Venue {
        id: id.to_string(),
        name: "Test Venue".to_string(),
        lat: 32.78,
        lng: -79.93,
        area: Some("downtown".to_string()),
        address: None,
        website: None,
        zip_codes: Vec::new(),
        address_components: json!({}),
        operating_hours: json!({}),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Scenario C — admin denies a user-submitted spot.
#[tokio::test]
async fn scenario_c_admin_denies_user_submitted_spot() {
    let Some(pool) = test_pool().await else {
        return;
    };
    spotcast_store::venues::upsert(&pool, &test_venue("v-c")).await.unwrap();

    let spot_id = spotcast_store::spots::insert(
        &pool,
        &UpsertSpot {
            venue_id: "v-c",
            title: "User tip",
            description: "A user-submitted happy hour tip",
            kind: "Happy Hour",
            lat: 32.78,
            lng: -79.93,
            area: Some("downtown"),
            source: SpotSource::User,
            status: SpotStatus::Pending,
            source_url: None,
            confidence: 0.0,
        },
    )
    .await
    .unwrap();

    spotcast_curation::apply(&pool, &format!("deny_{spot_id}"), "admin").await.unwrap();

    let spot = spotcast_store::spots::find_by_id(&pool, spot_id).await.unwrap().unwrap();
    assert_eq!(spot.status, SpotStatus::Denied);

    let audit_rows = spotcast_store::audit::for_row(&pool, "spots", &spot_id.to_string()).await.unwrap();
    assert!(audit_rows.iter().any(|r| r.action == AuditAction::Update && r.actor == "admin"));
}

/// Scenario D — user reports a spot and admin excludes; the venue never
/// resurfaces even though the gold record still says `found=true`.
#[tokio::test]
async fn scenario_d_report_excludes_venue_permanently() {
    let Some(pool) = test_pool().await else {
        return;
    };
    spotcast_store::venues::upsert(&pool, &test_venue("v-d")).await.unwrap();

    let spot_id = spotcast_store::spots::insert(
        &pool,
        &UpsertSpot {
            venue_id: "v-d",
            title: "Happy Hour",
            description: "4-7pm weekdays",
            kind: "Happy Hour",
            lat: 32.78,
            lng: -79.93,
            area: Some("downtown"),
            source: SpotSource::Automated,
            status: SpotStatus::Approved,
            source_url: None,
            confidence: 0.9,
        },
    )
    .await
    .unwrap();

    let gold = GoldRecord {
        venue_id: "v-d".to_string(),
        venue_name: "Test Venue".to_string(),
        extracted_at: Utc::now(),
        extraction_method: ExtractionMethod::Bulk,
        source_hash: "deadbeef".to_string(),
        source_modified_at: Utc::now(),
        needs_llm: false,
        confidence: 0.9,
        promotions: Promotions::Found(vec![]),
    };
    spotcast_store::gold::upsert(&pool, &gold).await.unwrap();

    spotcast_curation::apply(&pool, &format!("rptexcl_{spot_id}"), "admin").await.unwrap();

    assert!(spotcast_store::spots::find_by_id(&pool, spot_id).await.unwrap().is_none());
    assert!(spotcast_store::watchlist::is_excluded(&pool, "v-d").await.unwrap());

    let watchlist = spotcast_store::watchlist::list_by_status(&pool, WatchlistStatus::Excluded).await.unwrap();
    assert!(watchlist.iter().any(|w| w.venue_id == "v-d"));

    // Invariant 9: a gold record that still says `found=true` does not
    // resurrect a spot for an excluded venue.
    let still_found = spotcast_store::gold::find_by_venue(&pool, "v-d").await.unwrap().unwrap();
    assert!(still_found.promotions.found());
    assert!(spotcast_store::spots::find_by_natural_key(&pool, "v-d", "Happy Hour").await.unwrap().is_none());
}

/// Scenario F — stale pipeline recovery.
#[tokio::test]
async fn scenario_f_stale_run_recovers_on_startup() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let stale_id = spotcast_store::runs::start(&pool, "20260728", None).await.unwrap();
    sqlx::query("UPDATE pipeline_runs SET started_at = $2 WHERE id = $1")
        .bind(stale_id)
        .bind(Utc::now() - Duration::hours(3))
        .execute(&pool)
        .await
        .unwrap();

    let config = spotcast_common::Config {
        data_dir: "./data".to_string(),
        database_url: String::new(),
        llm_api_key: String::new(),
        llm_model: "gpt-4o-mini".to_string(),
        google_places_api_key: String::new(),
        google_places_enabled: false,
        admin_webhook_secret: String::new(),
        budget: Default::default(),
        heuristic: Default::default(),
        retry: Default::default(),
    };
    let recovered = spotcast_orchestrator::recover_stale_runs(&pool, &config).await.unwrap();
    assert_eq!(recovered, 1);

    let stale_run = spotcast_store::runs::find_by_id(&pool, stale_id).await.unwrap().unwrap();
    assert_eq!(stale_run.status, RunStatus::FailedStale);
    assert!(stale_run.finished_at.is_some());

    let fresh_id = spotcast_store::runs::start(&pool, "20260731", None).await.unwrap();
    assert_ne!(fresh_id, stale_id);
    let fresh_run = spotcast_store::runs::find_by_id(&pool, fresh_id).await.unwrap().unwrap();
    assert_eq!(fresh_run.status, RunStatus::Running);
}

/// Invariant 12 — every mutation from a curation callback leaves an audit
/// row with a non-null diff and the right actor.
#[tokio::test]
async fn audit_completeness_across_callback_actions() {
    let Some(pool) = test_pool().await else {
        return;
    };
    spotcast_store::venues::upsert(&pool, &test_venue("v-audit")).await.unwrap();

    let spot_id = spotcast_store::spots::insert(
        &pool,
        &UpsertSpot {
            venue_id: "v-audit",
            title: "Trivia Night",
            description: "Every Tuesday",
            kind: "Trivia",
            lat: 32.78,
            lng: -79.93,
            area: Some("downtown"),
            source: SpotSource::User,
            status: SpotStatus::Pending,
            source_url: None,
            confidence: 0.0,
        },
    )
    .await
    .unwrap();

    spotcast_curation::apply(&pool, &format!("approve_{spot_id}"), "admin").await.unwrap();
    spotcast_curation::apply(&pool, "actadd_trivia_night", "admin").await.unwrap();

    let spot_audit = spotcast_store::audit::for_row(&pool, "spots", &spot_id.to_string()).await.unwrap();
    assert!(!spot_audit.is_empty());
    for row in &spot_audit {
        assert_eq!(row.actor, "admin");
        assert!(!row.diff.is_null());
    }

    let activity_audit = spotcast_store::audit::for_row(&pool, "activities", "trivia_night").await.unwrap();
    assert!(!activity_audit.is_empty());
    assert_eq!(activity_audit[0].actor, "admin");
}
