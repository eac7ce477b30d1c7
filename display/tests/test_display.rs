//! FILENAME: tests/test_display.rs
//! Integration tests: a display loaded from its saved JSON, driven through a
//! typical browsing session.

use std::sync::Arc;

use cogs::{Record, RecordStore};
use display::{DisplayConfig, DisplaySession, SessionError};
use filter_engine::{FilterMutation, OrderPreference, PageDirection};
use layout_engine::{ContainerSize, FitMode, GridShape, Arrangement};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const DISPLAY_JSON: &str = r#"{
    "cogInfo": [
        {"name": "continent", "type": "factor", "desc": "Continent"},
        {"name": "country", "type": "factor", "desc": "Country"},
        {"name": "life_exp", "type": "numeric", "desc": "Mean life expectancy"}
    ],
    "state": {
        "layout": {"nrow": 3, "ncol": 4, "arrange": "row"},
        "labels": ["country", "life_exp"],
        "sort": [{"name": "life_exp", "dir": "desc"}],
        "filter": [
            {"name": "continent", "type": "select", "value": ["Europe", "Asia"]}
        ]
    },
    "panelAspect": 1.0
}"#;

/// 100 countries over 4 continents; life expectancy 40.0..89.5, two missing.
fn create_gapminder_records() -> Arc<RecordStore> {
    let continents = ["Africa", "Americas", "Asia", "Europe"];
    let records: RecordStore = (0..100)
        .map(|i| {
            let life_exp = if i == 13 || i == 77 { None } else { Some(40.0 + i as f64 * 0.5) };
            Record::new(format!("country_{:03}", i))
                .with("continent", continents[i % 4])
                .with("country", format!("Country {}", i))
                .with("life_exp", life_exp)
        })
        .collect();
    Arc::new(records)
}

fn create_session() -> DisplaySession {
    init_logging();
    let config = DisplayConfig::from_json_str(DISPLAY_JSON).unwrap();
    DisplaySession::load(create_gapminder_records(), &config).unwrap()
}

// ============================================================================
// BROWSING FLOW
// ============================================================================

#[test]
fn test_initial_view() {
    let mut session = create_session();
    session.resize(ContainerSize::new(800.0, 600.0)).unwrap();
    let view = session.snapshot().unwrap();

    // Asia + Europe = 50 panels, 12 per page
    assert_eq!(view.active_count, 50);
    assert_eq!(view.total_pages, 5);
    assert_eq!(view.page_number, 1);
    assert_eq!(view.panels.len(), 12);

    // highest life expectancy among Asia/Europe is country_099 (Europe)
    let top = view.panel("country_099").unwrap();
    assert_eq!((top.row, top.col), (0, 0));
    assert_eq!(top.labels.len(), 2);
    assert_eq!(top.labels[1].description, "Mean life expectancy");

    let geometry = view.geometry.unwrap();
    assert_eq!(geometry.fit, FitMode::HeightFirst);
    assert_eq!(geometry.label_count, 2);
    assert!(geometry.horizontal_offset > 0.0);

    let dist = &view.distributions[0];
    assert_eq!(dist.attribute, "continent");
    assert_eq!(dist.selected_count, 2);
    assert_eq!(dist.sum_selected_count, 50);
    assert_eq!(dist.not_selected_count(), 2);
}

#[test]
fn test_filter_sort_and_page_interplay() {
    let mut session = create_session();
    assert_eq!(session.navigate(PageDirection::Next), 2);

    session
        .apply_filter(&FilterMutation::set_range("life_exp", Some(60.0), None))
        .unwrap();
    // records 40..99 with continent Asia/Europe, minus 77 (Americas anyway)
    assert_eq!(session.index().active_count(), 30);
    assert_eq!(session.total_pages(), 3);

    session
        .apply_filter(&FilterMutation::set_order("continent", OrderPreference::ValueDescending))
        .unwrap();
    let view = session.snapshot().unwrap();
    assert_eq!(view.page_number, 2);
    let dist = &view.distributions[0];
    assert!(!dist.reversed_for_display);
    let requested: Vec<String> = dist.ordered_buckets().map(|b| b.key.to_string()).collect();
    assert_eq!(requested, vec!["Europe", "Asia", "Americas", "Africa"]);

    session
        .apply_filter(&FilterMutation::clear("continent"))
        .unwrap();
    assert!(session.snapshot().unwrap().distributions.is_empty());
    assert_eq!(session.index().active_count(), 59);
}

#[test]
fn test_layout_change_and_bad_requests() {
    let mut session = create_session();
    session.resize(ContainerSize::new(1200.0, 900.0)).unwrap();
    session.set_page(3); // ranks 24..35

    session
        .set_layout(GridShape::new(2, 2, Arrangement::Column))
        .unwrap();
    assert_eq!(session.page_number(), 7);
    let view = session.snapshot().unwrap();
    let cells: Vec<(usize, usize, usize)> =
        view.panels.iter().map(|p| (p.rank, p.row, p.col)).collect();
    assert!(cells.contains(&(1, 1, 0)));

    let before = session.geometry().cloned();
    assert!(matches!(
        session.resize(ContainerSize::new(-5.0, 100.0)),
        Err(SessionError::Layout(_))
    ));
    assert_eq!(session.geometry().cloned(), before);

    let version = session.filters().version();
    assert!(matches!(
        session.apply_filter(&FilterMutation::set_regex("country", "(")),
        Err(SessionError::Filter(_))
    ));
    assert_eq!(session.filters().version(), version);
}
