//! End-to-end poll cycles writing real snapshot files.

use rust_decimal_macros::dec;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use donation_tracker::config::OutputConfig;
use donation_tracker::engine::scheduler::Scheduler;
use donation_tracker::engine::{EngineConfig, PollEngine};
use donation_tracker::storage::FileSink;
use donation_tracker::types::{ErrorKind, Slot};

use crate::fake_source::{donation, FakePageSource};

struct Harness {
    dir: PathBuf,
    source: FakePageSource,
    engine: PollEngine,
}

impl Harness {
    fn new(stream_id: &str, source: FakePageSource) -> Self {
        let mut dir = std::env::temp_dir();
        dir.push(format!("donation_tracker_it_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let sink = FileSink::new(OutputConfig {
            dir: dir.clone(),
            ..OutputConfig::default()
        });
        let engine = PollEngine::new(
            EngineConfig::new(stream_id),
            Arc::new(source.clone()),
            Arc::new(sink),
        );
        Self { dir, source, engine }
    }

    fn read(&self, slot: Slot) -> Option<String> {
        let path = OutputConfig {
            dir: self.dir.clone(),
            ..OutputConfig::default()
        }
        .path_for(slot);
        std::fs::read_to_string(path).ok()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

#[tokio::test]
async fn test_cycle_writes_snapshot_files() {
    let source = FakePageSource::new("1000.00");
    source.set_pages(vec![Some(vec![
        donation("A", dec!(5.0), 1),
        donation("B", dec!(10.0), 2),
    ])]);
    let mut h = Harness::new("bake-sale", source);

    let report = h.engine.run_cycle().await.unwrap();

    assert_eq!(report.cycle_number, 1);
    assert_eq!(h.read(Slot::TotalRaised).as_deref(), Some("£1000.00"));
    assert_eq!(h.read(Slot::LatestName).as_deref(), Some("B"));
    assert_eq!(h.read(Slot::LatestAmount).as_deref(), Some("£10.0"));
    assert_eq!(h.read(Slot::TopName).as_deref(), Some("B"));
    assert_eq!(h.read(Slot::TopAmount).as_deref(), Some("£10.0"));

    assert_eq!(
        h.source.requests(),
        vec![
            "page:bake-sale",
            "donations:bake-sale:150:1",
            "donations:bake-sale:150:2",
        ]
    );
}

#[tokio::test]
async fn test_latest_and_top_across_pages() {
    let source = FakePageSource::new("2500.5");
    source.set_pages(vec![
        Some(vec![
            donation("Early Whale With A Very Long Name", dec!(1234.5), 10),
            donation("Small", dec!(2), 20),
        ]),
        Some(vec![donation("Newest", dec!(15.25), 30)]),
    ]);
    let mut h = Harness::new("marathon", source);

    let report = h.engine.run_cycle().await.unwrap();

    assert_eq!(report.donations_seen, 3);
    assert_eq!(h.read(Slot::TotalRaised).as_deref(), Some("£2500.5"));
    assert_eq!(h.read(Slot::LatestName).as_deref(), Some("Newest"));
    assert_eq!(h.read(Slot::LatestAmount).as_deref(), Some("£15.25"));
    assert_eq!(h.read(Slot::TopName).as_deref(), Some("Early Whale With A V"));
    assert_eq!(h.read(Slot::TopAmount).as_deref(), Some("£1.234.5"));
}

#[tokio::test]
async fn test_slots_overwritten_each_cycle() {
    let source = FakePageSource::new("10.00");
    source.set_pages(vec![Some(vec![donation("A", dec!(10.00), 1)])]);
    let mut h = Harness::new("s", source);

    h.engine.run_cycle().await.unwrap();
    assert_eq!(h.read(Slot::LatestName).as_deref(), Some("A"));

    h.source.set_total("35.00");
    h.source.set_pages(vec![
        Some(vec![donation("A", dec!(10.00), 1)]),
        Some(vec![donation("Bo", dec!(25.00), 2)]),
    ]);
    let report = h.engine.run_cycle().await.unwrap();

    assert_eq!(report.cycle_number, 2);
    assert_eq!(h.read(Slot::TotalRaised).as_deref(), Some("£35.00"));
    assert_eq!(h.read(Slot::LatestName).as_deref(), Some("Bo"));
    assert_eq!(h.read(Slot::TopAmount).as_deref(), Some("£25.00"));
}

#[tokio::test]
async fn test_missing_first_page_skipped() {
    let source = FakePageSource::new("3");
    source.set_pages(vec![None, Some(vec![donation("Late", dec!(3), 5)])]);
    let mut h = Harness::new("s", source);

    h.engine.run_cycle().await.unwrap();
    assert_eq!(h.read(Slot::LatestName).as_deref(), Some("Late"));
}

#[tokio::test]
async fn test_connection_error_writes_nothing() {
    let source = FakePageSource::new("0");
    source.go_offline();
    source.set_pages(vec![Some(vec![donation("A", dec!(1), 1)])]);
    let mut h = Harness::new("offline-page", source);

    let err = h.engine.run_cycle().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(err.to_string(), "Could not connect to fundraiser: offline-page");
    assert_eq!(h.source.requests(), vec!["page:offline-page"]);
    for slot in Slot::ALL {
        assert!(h.read(*slot).is_none(), "{slot} should not be written");
    }
}

#[tokio::test]
async fn test_donations_error_keeps_total() {
    let source = FakePageSource::new("99.99");
    source.set_donations_error("404 Not Found");
    let mut h = Harness::new("private-page", source);

    let err = h.engine.run_cycle().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(
        err.to_string(),
        "Unable to retrieve donations for fundraiser: private-page"
    );
    assert_eq!(h.read(Slot::TotalRaised).as_deref(), Some("£99.99"));
    assert!(h.read(Slot::LatestName).is_none());
}

#[tokio::test]
async fn test_no_donations_is_empty_input() {
    let source = FakePageSource::new("0.00");
    let mut h = Harness::new("brand-new", source);

    let err = h.engine.run_cycle().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptyInput);
    assert_eq!(h.read(Slot::TotalRaised).as_deref(), Some("£0.00"));
    assert!(h.read(Slot::TopName).is_none());
}

#[tokio::test]
async fn test_scheduler_stops_when_page_goes_away() {
    let source = FakePageSource::new("5");
    source.set_pages(vec![Some(vec![donation("A", dec!(5), 1)])]);
    let mut h = Harness::new("s", source);

    let offline = h.source.clone();
    let scheduler = Scheduler::new(Duration::from_millis(10));
    let run = scheduler.run(&mut h.engine, std::future::pending::<()>());

    let (result, _) = tokio::join!(run, async move {
        tokio::time::sleep(Duration::from_millis(35)).await;
        offline.go_offline();
    });

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(h.engine.cycle_count() >= 1);
    assert_eq!(h.read(Slot::TotalRaised).as_deref(), Some("£5"));
}
