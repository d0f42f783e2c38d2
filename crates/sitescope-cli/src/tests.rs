use sitescope_core::{EngineConfig, SitePoint};
use sitescope_geo::SearchQuery;

use super::*;

fn rows() -> Vec<SitePoint> {
    vec![
        SitePoint::new("A", Some(0.0), Some(0.0)).with_name("Alpha"),
        SitePoint::new("B", Some(0.0), Some(0.01)).with_name("Bravo"),
        SitePoint::new("C", Some(10.0), Some(10.0)).with_name("Charlie Hub"),
        SitePoint::new("D", None, None).with_name("Delta Hub"),
    ]
}

#[test]
fn parses_neighbors_command() {
    let cli = Cli::try_parse_from([
        "sitescope",
        "neighbors",
        "--file",
        "sites.json",
        "--site",
        "DHK001",
        "--radius",
        "2.5",
        "--cap",
        "0",
    ])
    .expect("expected valid cli args");

    let Commands::Neighbors {
        source,
        site,
        radius,
        cap,
    } = cli.command
    else {
        panic!("expected neighbors command");
    };
    assert_eq!(source.file, Some(PathBuf::from("sites.json")));
    assert_eq!(site, "DHK001");
    assert_eq!(radius, Some(2.5));
    assert_eq!(cap, Some(0));
}

#[test]
fn neighbors_requires_site() {
    assert!(Cli::try_parse_from(["sitescope", "neighbors", "--file", "sites.json"]).is_err());
}

#[test]
fn parses_search_with_filters() {
    let cli = Cli::try_parse_from([
        "sitescope",
        "search",
        "--region",
        "Dhaka",
        "--sub-region",
        "Dhaka North",
        "--address",
        "road 5",
    ])
    .expect("expected valid cli args");

    let Commands::Search {
        source,
        site,
        address,
        franchise,
    } = cli.command
    else {
        panic!("expected search command");
    };
    assert!(source.file.is_none());
    let filters = source.filters();
    assert_eq!(filters.region.as_deref(), Some("Dhaka"));
    assert_eq!(filters.sub_region.as_deref(), Some("Dhaka North"));
    assert!(site.is_none());
    assert_eq!(address.as_deref(), Some("road 5"));
    assert!(franchise.is_none());
}

#[test]
fn parses_frame_strategy() {
    let cli = Cli::try_parse_from(["sitescope", "frame", "--strategy", "fit-bounds"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Frame {
            strategy: Some(StrategyArg::FitBounds),
            ..
        }
    ));
    assert!(Cli::try_parse_from(["sitescope", "frame", "--strategy", "tiles"]).is_err());
}

#[test]
fn parses_picklist_scope() {
    let cli = Cli::try_parse_from(["sitescope", "picklist", "--scope", "sub-region"])
        .expect("expected valid cli args");
    let Commands::Picklist { scope, .. } = cli.command else {
        panic!("expected picklist command");
    };
    assert_eq!(PicklistScope::from(scope), PicklistScope::SubRegion);
}

#[test]
fn parses_history_command() {
    let cli = Cli::try_parse_from(["sitescope", "history", "--site", "CTG001", "--days", "7"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::History { ref site, days: Some(7) } if site == "CTG001"
    ));
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["sitescope"]).is_err());
}

#[test]
fn neighbors_report_lists_nearby_sites() {
    let report = commands::neighbors_report(rows(), "A", &EngineConfig::default())
        .expect("A is in the list");
    assert_eq!(report.focal_id, "A");
    assert_eq!(report.neighbors.len(), 1);
    assert_eq!(report.neighbors[0].id, "B");
    assert_eq!(report.neighbors[0].name, "Bravo");
    assert!(report.neighbors[0].distance_km.is_some());
    assert_eq!(report.cap, Some(2000));
    assert!(report.frame.is_some());
}

#[test]
fn neighbors_report_unknown_site_fails() {
    let err = commands::neighbors_report(rows(), "Z", &EngineConfig::default()).unwrap_err();
    assert!(err.to_string().contains("Z"));
}

#[test]
fn search_report_counts_matches_and_mapped() {
    let query = SearchQuery {
        site: "hub".to_string(),
        ..SearchQuery::default()
    };
    let report = commands::search_report(rows(), query, &EngineConfig::default());
    assert_eq!(report.total, 4);
    assert_eq!(report.matched, 2);
    assert_eq!(report.mapped, 1);
}

#[test]
fn frame_report_includes_markers() {
    let config = EngineConfig {
        zoom_strategy: ZoomStrategyKind::FitBounds,
        ..EngineConfig::default()
    };
    let report = commands::frame_report(rows(), &config);
    assert_eq!(report.total, 4);
    assert_eq!(report.mapped, 3);
    assert_eq!(report.strategy, "fit-bounds");
    assert_eq!(report.markers.len(), 3);
}

#[test]
fn frame_report_of_empty_list_uses_fallback() {
    let config = EngineConfig::default();
    let report = commands::frame_report(Vec::new(), &config);
    assert_eq!(report.frame.center, config.fallback_center);
    assert!(report.markers.is_empty());
}

#[tokio::test]
async fn history_without_backend_reports_missing_url() {
    let err = commands::history_report("A", 30, &EngineConfig::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("SITESCOPE_SOURCE_URL"), "{err}");
}
