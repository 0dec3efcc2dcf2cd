mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::mocks::{
    publication, view_id_for, DelegateLog, MockPager, MockRenderers, RecordingDelegate,
    TestNavigator, PAGE_WIDTH,
};
use epub_triptych::{Clamping, Location, MemoryStore, NavigatorController, NavigatorOptions};

fn navigator(chapters: usize, initial_index: usize) -> TestNavigator<MemoryStore> {
    let options = NavigatorOptions {
        initial_index: Some(initial_index),
        ..NavigatorOptions::default()
    };
    let mut navigator = NavigatorController::new(
        publication(chapters),
        MockRenderers::default(),
        MockPager::default(),
        MemoryStore::new(),
        options,
    )
    .unwrap();
    navigator.layout();
    navigator
}

fn live_bridges(navigator: &TestNavigator<MemoryStore>) -> usize {
    navigator
        .triptych()
        .factory()
        .renderers()
        .live_bridges
        .get()
}

#[test]
fn test_interior_window_holds_both_neighbors() {
    let navigator = navigator(5, 2);
    let triptych = navigator.triptych();
    assert_eq!(triptych.live_indices().as_slice(), &[1, 2, 3]);
    assert_eq!(triptych.container().pages, 3);
    assert_eq!(triptych.container().offset, PAGE_WIDTH);

    let views = triptych.views().unwrap().ordered();
    assert_eq!(views[0].initial_location(), Location::End);
    assert_eq!(views[1].initial_location(), Location::Beginning);
    assert_eq!(views[2].initial_location(), Location::Beginning);
}

#[test]
fn test_first_item_window_has_no_previous_page() {
    let navigator = navigator(3, 0);
    let triptych = navigator.triptych();
    assert_eq!(triptych.live_indices().as_slice(), &[0, 1]);
    assert_eq!(triptych.container().pages, 2);
    assert_eq!(triptych.container().offset, 0.0);
    assert!(triptych.container().writes.is_empty());
}

#[test]
fn test_single_item_spine_builds_one_view() {
    let mut navigator = navigator(1, 0);
    assert_eq!(navigator.triptych().factory().views_created(), 1);
    assert_eq!(navigator.triptych().container().pages, 1);

    navigator.display_next_spine_item();
    navigator.display_previous_spine_item();
    assert_eq!(navigator.current_index(), 0);
    assert_eq!(navigator.triptych().factory().views_created(), 1);
}

#[test]
fn test_step_forward_and_back_reuses_overlapping_views() {
    let mut navigator = navigator(5, 2);
    assert_eq!(navigator.triptych().factory().views_created(), 3);
    let two = view_id_for(&navigator, 2);
    let three = view_id_for(&navigator, 3);

    navigator.display_spine_item(3);
    assert_eq!(navigator.triptych().live_indices().as_slice(), &[2, 3, 4]);
    assert_eq!(navigator.triptych().factory().views_created(), 4);

    navigator.display_spine_item(2);
    assert_eq!(navigator.triptych().live_indices().as_slice(), &[1, 2, 3]);
    assert_eq!(navigator.triptych().factory().views_created(), 5);
    assert_eq!(view_id_for(&navigator, 2), two);
    assert_eq!(view_id_for(&navigator, 3), three);
}

#[test]
fn test_live_bridges_never_exceed_window() {
    let mut navigator = navigator(6, 0);
    for _ in 0..6 {
        navigator.display_next_spine_item();
        let live = navigator.triptych().live_indices().len();
        assert!(live <= 3);
        assert_eq!(live_bridges(&navigator), live);
    }
    assert_eq!(navigator.current_index(), 5);
    assert_eq!(live_bridges(&navigator), 2);

    for _ in 0..6 {
        navigator.display_previous_spine_item();
        assert_eq!(live_bridges(&navigator), navigator.triptych().live_indices().len());
    }
}

#[test]
fn test_drag_is_clamped_then_settles_on_previous_item() {
    let mut navigator = navigator(3, 1);
    let log = Rc::new(RefCell::new(DelegateLog::default()));
    navigator.set_delegate(Box::new(RecordingDelegate(Rc::clone(&log))));
    assert_eq!(navigator.triptych().container().offset, PAGE_WIDTH);

    navigator.triptych_mut().container_mut().offset = 280.0;
    navigator.did_scroll();
    assert_eq!(navigator.triptych().clamping(), Clamping::OnlyPrevious);

    navigator.triptych_mut().container_mut().offset = 400.0;
    navigator.did_scroll();
    assert_eq!(navigator.triptych().container().offset, PAGE_WIDTH);

    navigator.triptych_mut().container_mut().offset = 0.0;
    navigator.did_scroll();
    navigator.did_end_decelerating();

    assert_eq!(navigator.current_index(), 0);
    assert_eq!(navigator.triptych().clamping(), Clamping::None);
    assert_eq!(navigator.triptych().live_indices().as_slice(), &[0, 1]);
    assert_eq!(navigator.triptych().container().offset, 0.0);
    assert_eq!(log.borrow().indices, vec![0]);
}

#[test]
fn test_unaligned_settle_snaps_back_with_animation() {
    let mut navigator = navigator(3, 1);
    navigator.triptych_mut().container_mut().offset = 350.0;
    navigator.did_end_decelerating();

    assert_eq!(navigator.current_index(), 1);
    let pager = navigator.triptych().container();
    assert_eq!(pager.offset, PAGE_WIDTH);
    assert_eq!(pager.writes.last(), Some(&(PAGE_WIDTH, true)));
}

#[test]
fn test_page_turn_nudges_offset_before_relayout() {
    let mut navigator = navigator(4, 1);
    let before = navigator.triptych().container().writes.len();
    navigator.display_next_spine_item();

    let writes = &navigator.triptych().container().writes[before..];
    assert_eq!(writes[0], (PAGE_WIDTH + 1.0, false));
    assert_eq!(writes.last(), Some(&(PAGE_WIDTH, false)));
}
