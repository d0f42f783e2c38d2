use sitescope_core::{Coordinate, SitePoint};

use super::*;
use crate::selection::SelectionController;
use crate::surface::InMemorySurface;
use crate::viewport::{ViewportFramer, ZoomStrategy};

fn p(id: &str, lat: f64, lon: f64) -> SitePoint {
    SitePoint::new(id, Some(lat), Some(lon))
}

fn framer() -> ViewportFramer {
    ViewportFramer::new(ZoomStrategy::point_count(), Coordinate::new(23.8103, 90.4125))
}

fn abc() -> Vec<SitePoint> {
    vec![p("A", 0.0, 0.0), p("B", 0.0, 0.01), p("C", 10.0, 10.0)]
}

#[test]
fn first_pass_creates_one_marker_per_valid_site() {
    let mut data = abc();
    data.push(SitePoint::new("ghost", None, Some(1.0)));
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    let (stats, frame) = rec.reconcile(&data, &SelectionState::Unselected, &mut framer(), true);

    assert_eq!(stats.created, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(rec.rendered_ids(), vec!["A", "B", "C"]);
    assert_eq!(rec.surface().marker_count(), 3);
    assert_eq!(rec.surface().view(), frame);
    assert!(frame.is_some());
}

#[test]
fn replacing_working_set_removes_stale_markers() {
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    let mut fr = framer();
    rec.reconcile(&abc(), &SelectionState::Unselected, &mut fr, true);
    let next = [p("C", 10.0, 10.0), p("D", 1.0, 1.0)];
    let (stats, _) = rec.reconcile(&next, &SelectionState::Unselected, &mut fr, true);

    assert_eq!(stats.removed, 2);
    assert_eq!(stats.created, 1);
    assert_eq!(rec.rendered_ids(), vec!["C", "D"]);
    assert_eq!(rec.surface().marker_count(), 2);
    assert_eq!(rec.surface().listener_count(), 2);
}

#[test]
fn unchanged_pass_touches_nothing() {
    let data = abc();
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    let mut fr = framer();
    rec.reconcile(&data, &SelectionState::Unselected, &mut fr, false);
    let (stats, frame) = rec.reconcile(&data, &SelectionState::Unselected, &mut fr, false);

    assert_eq!(stats, ReconcileStats::default());
    assert!(frame.is_none());
    assert_eq!(rec.surface().created(), 3);
}

#[test]
fn moved_site_is_updated_in_place() {
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    let mut fr = framer();
    rec.reconcile(&abc(), &SelectionState::Unselected, &mut fr, false);
    let moved = vec![p("A", 1.0, 1.0), p("B", 0.0, 0.01), p("C", 10.0, 10.0)];
    let (stats, _) = rec.reconcile(&moved, &SelectionState::Unselected, &mut fr, false);

    assert_eq!(stats.updated, 1);
    assert_eq!(stats.created, 0);
    let markers = rec.surface().markers();
    assert_eq!(markers["A"].at, Coordinate::new(1.0, 1.0));
}

#[test]
fn duplicate_ids_render_once_with_last_row() {
    let data = vec![p("A", 0.0, 0.0), p("A", 2.0, 2.0)];
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    rec.reconcile(&data, &SelectionState::Unselected, &mut framer(), false);

    assert_eq!(rec.len(), 1);
    assert_eq!(rec.surface().markers()["A"].at, Coordinate::new(2.0, 2.0));
}

#[test]
fn duplicate_id_with_coordinate_less_last_row_is_not_rendered() {
    let data = vec![p("A", 0.0, 0.0), p("B", 0.0, 0.01), SitePoint::new("A", None, None)];
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    let (stats, _) = rec.reconcile(&data, &SelectionState::Unselected, &mut framer(), false);

    assert_eq!(stats.skipped, 1);
    assert_eq!(rec.rendered_ids(), vec!["B"]);
    assert!(rec.visual_state("A").is_none());

    // A coordinate arriving later for the same id brings the marker back.
    let data = vec![SitePoint::new("A", None, None), p("A", 1.0, 1.0)];
    rec.reconcile(&data, &SelectionState::Unselected, &mut framer(), false);
    assert_eq!(rec.rendered_ids(), vec!["A"]);
}

#[test]
fn selection_styles_focal_and_neighbors() {
    let data = abc();
    let mut ctl = SelectionController::default();
    ctl.interact(&data[0], &data);

    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    let mut fr = framer();
    let (_, frame) = rec.reconcile(&data, ctl.state(), &mut fr, true);

    assert_eq!(rec.visual_state("A"), Some(MarkerVisualState::Selected));
    assert_eq!(rec.visual_state("B"), Some(MarkerVisualState::Neighbor));
    assert_eq!(rec.visual_state("C"), Some(MarkerVisualState::Default));
    assert!(rec.is_popup_open("A"));
    assert!(!rec.is_popup_open("B"));
    assert_eq!(frame.map(|f| f.center), Some(Coordinate::new(0.0, 0.0)));
}

#[test]
fn clearing_selection_restyles_everything_default() {
    let data = abc();
    let mut ctl = SelectionController::default();
    ctl.interact(&data[0], &data);
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    let mut fr = framer();
    rec.reconcile(&data, ctl.state(), &mut fr, false);

    ctl.reset();
    let (stats, _) = rec.reconcile(&data, ctl.state(), &mut fr, false);

    assert_eq!(stats.updated, 2);
    for id in ["A", "B", "C"] {
        assert_eq!(rec.visual_state(id), Some(MarkerVisualState::Default));
    }
    assert!(rec.surface().open_popup_ids().is_empty());
}

#[test]
fn hover_opens_and_closes_popup() {
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    rec.reconcile(&abc(), &SelectionState::Unselected, &mut framer(), false);

    rec.hover_enter("B");
    assert_eq!(rec.surface().open_popup_ids(), vec!["B"]);
    rec.hover_enter("C");
    assert_eq!(rec.surface().open_popup_ids(), vec!["C"]);
    rec.hover_exit("C");
    assert!(rec.surface().open_popup_ids().is_empty());

    rec.hover_enter("nope");
    assert!(rec.surface().open_popup_ids().is_empty());
}

#[test]
fn hover_exit_keeps_selected_popup_open() {
    let data = abc();
    let mut ctl = SelectionController::default();
    ctl.interact(&data[0], &data);
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    rec.reconcile(&data, ctl.state(), &mut framer(), false);

    rec.hover_enter("A");
    rec.hover_exit("A");
    assert_eq!(rec.surface().open_popup_ids(), vec!["A"]);
}

#[test]
fn activate_only_known_markers() {
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    rec.reconcile(&abc(), &SelectionState::Unselected, &mut framer(), false);
    assert_eq!(rec.activate("B").as_deref(), Some("B"));
    assert_eq!(rec.activate("Z"), None);
}

#[test]
fn repeated_passes_do_not_leak() {
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    let mut fr = framer();
    for round in 0..20_i32 {
        let shift = f64::from(round % 3);
        let data: Vec<_> = (0..5_i32)
            .map(|i| p(&format!("S{}", i + round % 2), shift, f64::from(i)))
            .collect();
        rec.reconcile(&data, &SelectionState::Unselected, &mut fr, false);
        assert_eq!(rec.surface().marker_count(), 5);
        assert_eq!(rec.surface().listener_count(), 5);
    }
    assert_eq!(
        rec.surface().created() - rec.surface().removed(),
        rec.surface().marker_count()
    );
}

#[test]
fn clear_removes_everything() {
    let mut rec = MarkerReconciler::new(InMemorySurface::new());
    rec.reconcile(&abc(), &SelectionState::Unselected, &mut framer(), false);
    rec.hover_enter("A");
    rec.clear();
    assert!(rec.is_empty());
    assert_eq!(rec.surface().marker_count(), 0);
    assert_eq!(rec.surface().listener_count(), 0);
}
