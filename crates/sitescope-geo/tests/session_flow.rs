//! End-to-end flow through the public session surface.

use sitescope_core::{EngineConfig, SitePoint, ZoomStrategyKind};
use sitescope_geo::{
    InMemorySurface, MapSession, MarkerVisualState, SessionEvent, SessionOptions,
};

fn dhaka_sites() -> Vec<SitePoint> {
    vec![
        SitePoint::new("DHK001", Some(23.7925), Some(90.4078)).with_name("Gulshan 1"),
        SitePoint::new("DHK002", Some(23.7940), Some(90.4140)).with_name("Gulshan 2"),
        SitePoint::new("DHK003", Some(23.7806), Some(90.4193)).with_name("Badda"),
        SitePoint::new("DHK004", Some(23.7104), Some(90.4074)).with_name("Motijheel"),
        SitePoint::new("CTG001", Some(22.3569), Some(91.7832)).with_name("Agrabad"),
        SitePoint::new("PENDING", None, None).with_name("Not yet surveyed"),
    ]
}

#[test]
fn select_then_filter_then_reset() {
    let config = EngineConfig {
        neighbor_radius_km: 3.0,
        ..EngineConfig::default()
    };
    let mut session = MapSession::new(InMemorySurface::new(), SessionOptions::from_config(&config));
    session.set_working_set(dhaka_sites());
    assert_eq!(session.surface().marker_count(), 5);

    let request = session.select(Some("DHK001")).expect("history request");
    assert_eq!(request.days, 30);
    let neighbors = session.selection().neighbors().expect("neighbours");
    assert_eq!(
        neighbors.ids().collect::<Vec<_>>(),
        vec!["DHK002", "DHK003"]
    );
    assert_eq!(
        session.markers().visual_state("DHK004"),
        Some(MarkerVisualState::Default)
    );

    // A new dataset arrives for a different filter.
    let dataset = session.request_dataset(sitescope_core::FilterSet::default());
    let rows: Vec<SitePoint> = dhaka_sites().into_iter().skip(3).collect();
    session.apply_dataset::<std::io::Error>(dataset.ticket, Ok(rows));
    assert!(!session.selection().is_selected());
    assert_eq!(session.markers().rendered_ids(), vec!["CTG001", "DHK004"]);

    session.reset();
    let view = session.surface().view().expect("view");
    assert_eq!(Some(view), session.framer().current());
}

#[test]
fn fit_bounds_zooms_out_for_a_spread_set() {
    let config = EngineConfig {
        zoom_strategy: ZoomStrategyKind::FitBounds,
        ..EngineConfig::default()
    };
    let mut session = MapSession::new(InMemorySurface::new(), SessionOptions::from_config(&config));
    session.set_working_set(dhaka_sites());
    let spread = session.framer().current().expect("frame").zoom;

    session.set_working_set(dhaka_sites().into_iter().take(3).collect());
    let tight = session.framer().current().expect("frame").zoom;
    assert!(tight > spread, "tight={tight} spread={spread}");
}

#[test]
fn events_serialize_with_a_tag() {
    let mut session = MapSession::new(InMemorySurface::new(), SessionOptions::default());
    session.set_working_set(dhaka_sites());
    session.select(Some("CTG001"));

    let events = session.drain_events();
    let json = serde_json::to_value(&events).expect("serialize events");
    let tags: Vec<&str> = json
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|e| e["event"].as_str())
        .collect();
    assert_eq!(
        tags,
        vec![
            "working_set_changed",
            "viewport_changed",
            "selection_changed",
            "neighbors_changed",
            "viewport_changed",
        ]
    );
    assert!(matches!(
        events.last(),
        Some(SessionEvent::ViewportChanged { .. })
    ));
}
