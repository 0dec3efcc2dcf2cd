//! Sliding previous/current/next viewport over the spine.
//!
//! [`TriptychView`] keeps at most one live view on each side of the current
//! spine index, laid out left to right in a paging [`ScrollContainer`]. Views
//! are requested lazily from a [`ContentFactory`] and reused across index
//! changes as long as their spine index stays inside the window.

use core::fmt;

use smallvec::SmallVec;

use crate::bridge::DocumentRenderer;
use crate::content_view::{ContentView, SeekTarget};
use crate::error::NavigatorError;
use crate::location::Location;
use crate::scroll::{index_after_settle, is_page_aligned, settled_page, Clamping, ScrollContainer};
use crate::slots::{ViewSlots, Window};

/// What the triptych needs from a materialized view.
pub trait SlotView {
    /// Spine index the view was built for.
    fn spine_index(&self) -> usize;

    /// The view entered the window.
    fn attach(&mut self);

    /// The view left the window and is about to be dropped.
    fn detach(&mut self);

    /// Show the leading or trailing edge.
    fn settle_at(&mut self, location: Location);

    /// Seek to a position, now or once loaded.
    fn seek(&mut self, target: SeekTarget);
}

impl<R: DocumentRenderer> SlotView for ContentView<R> {
    fn spine_index(&self) -> usize {
        ContentView::spine_index(self)
    }

    fn attach(&mut self) {
        ContentView::attach(self);
    }

    fn detach(&mut self) {
        ContentView::detach(self);
    }

    fn settle_at(&mut self, location: Location) {
        ContentView::settle_at(self, location);
    }

    fn seek(&mut self, target: SeekTarget) {
        ContentView::seek(self, target);
    }
}

/// Builds views for spine indices entering the window.
pub trait ContentFactory {
    type View: SlotView;

    /// Create the view for `index`, initially showing `location`.
    fn make_view(&mut self, index: usize, location: Location) -> Self::View;
}

/// Tuning for the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriptychOptions {
    /// Offset nudge applied before a programmatic jump so the container
    /// redraws its pages.
    pub nudge_px: f64,
    /// Animate the corrective scroll when a drag settles between pages.
    pub animate_resnap: bool,
}

impl Default for TriptychOptions {
    fn default() -> Self {
        Self {
            nudge_px: 1.0,
            animate_resnap: true,
        }
    }
}

/// Three-pane viewport controller.
pub struct TriptychView<F: ContentFactory, S> {
    factory: F,
    container: S,
    options: TriptychOptions,
    view_count: usize,
    index: usize,
    clamping: Clamping,
    views: Option<ViewSlots<F::View>>,
}

impl<F: ContentFactory, S> fmt::Debug for TriptychView<F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriptychView")
            .field("view_count", &self.view_count)
            .field("index", &self.index)
            .field("clamping", &self.clamping)
            .field("live_views", &self.views.as_ref().map(ViewSlots::count))
            .finish()
    }
}

impl<F: ContentFactory, S: ScrollContainer> TriptychView<F, S> {
    /// Create a viewport over `view_count` spine items starting at
    /// `initial_index`. No view is built before the first
    /// [`TriptychView::layout`].
    ///
    /// # Errors
    ///
    /// Fails when `view_count` is zero or `initial_index` is out of range.
    pub fn new(
        view_count: usize,
        initial_index: usize,
        factory: F,
        container: S,
        options: TriptychOptions,
    ) -> Result<Self, NavigatorError> {
        if view_count == 0 {
            return Err(NavigatorError::EmptySpine);
        }
        if initial_index >= view_count {
            return Err(NavigatorError::InitialIndexOutOfRange {
                index: initial_index,
                count: view_count,
            });
        }
        Ok(Self {
            factory,
            container,
            options,
            view_count,
            index: initial_index,
            clamping: Clamping::None,
            views: None,
        })
    }

    /// Logical current spine index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn view_count(&self) -> usize {
        self.view_count
    }

    pub fn clamping(&self) -> Clamping {
        self.clamping
    }

    pub fn options(&self) -> &TriptychOptions {
        &self.options
    }

    pub fn views(&self) -> Option<&ViewSlots<F::View>> {
        self.views.as_ref()
    }

    /// Live views in page order.
    pub fn views_mut(&mut self) -> SmallVec<[&mut F::View; 3]> {
        match self.views.as_mut() {
            Some(views) => views.ordered_mut(),
            None => SmallVec::new(),
        }
    }

    /// Spine indices of the live views in page order.
    pub fn live_indices(&self) -> SmallVec<[usize; 3]> {
        match self.views.as_ref() {
            Some(views) => views
                .ordered()
                .into_iter()
                .map(|view| view.spine_index())
                .collect(),
            None => SmallVec::new(),
        }
    }

    pub fn current_view(&self) -> Option<&F::View> {
        let index = self.index;
        self.views.as_ref().map(|views| views.current(index))
    }

    pub fn current_view_mut(&mut self) -> Option<&mut F::View> {
        let index = self.index;
        self.views.as_mut().map(|views| views.current_mut(index))
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn container(&self) -> &S {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut S {
        &mut self.container
    }

    fn is_at_edge(&self) -> bool {
        self.index == 0 || self.index + 1 == self.view_count
    }

    /// Build the window on first use and place the current page in view.
    pub fn layout(&mut self) {
        if self.views.is_none() {
            self.update_views(None);
        }
        self.apply_layout(false);
    }

    fn apply_layout(&mut self, animated: bool) {
        let Some(views) = self.views.as_ref() else {
            self.container.set_page_count(1);
            return;
        };
        let pages = views.count();
        let page = views.current_page(self.index);
        self.container.set_page_count(pages);
        let target = self.container.page_width() * page as f64;
        if self.container.content_offset() != target {
            self.container.set_content_offset(target, animated);
        }
    }

    /// Rebuild the window around the current index, reusing every live view
    /// whose spine index is still required.
    fn update_views(&mut self, previous_index: Option<usize>) {
        if previous_index == Some(self.index) {
            return;
        }

        let previous_views = self.views.take();
        let mut reusable: SmallVec<[(usize, F::View); 3]> = match (previous_views, previous_index) {
            (Some(views), Some(previous)) => views.into_indexed(previous),
            (Some(mut views), None) => {
                for view in views.ordered_mut() {
                    view.detach();
                }
                SmallVec::new()
            }
            (None, _) => SmallVec::new(),
        };

        let index = self.index;
        let factory = &mut self.factory;
        let window = Window::for_index(index, self.view_count);
        let mut created = 0usize;
        let mut views = window.map_slots(index, |spine_index, location| {
            match reusable.iter().position(|(i, _)| *i == spine_index) {
                Some(pos) => reusable.swap_remove(pos).1,
                None => {
                    created += 1;
                    factory.make_view(spine_index, location)
                }
            }
        });

        for (spine_index, mut view) in reusable {
            log::trace!("dropping view for spine index {}", spine_index);
            view.detach();
        }
        for view in views.ordered_mut() {
            view.attach();
        }

        log::debug!(
            "window at index {} (from {:?}): {} live, {} new",
            index,
            previous_index,
            views.count(),
            created
        );
        self.views = Some(views);
    }

    /// Feed a scroll sample while the user drags.
    ///
    /// With three live pages, the first move away from the middle page pins
    /// the drag to that side until the scroll settles.
    pub fn did_scroll(&mut self) {
        let Some(views) = self.views.as_ref() else {
            return;
        };
        if views.count() != 3 {
            return;
        }
        let width = self.container.page_width();
        let offset = self.container.content_offset();
        let (clamping, pinned) = self.clamping.observe(offset, width);
        if clamping != self.clamping {
            log::debug!("clamping {:?} -> {:?} at offset {}", self.clamping, clamping, offset);
            self.clamping = clamping;
        }
        if let Some(pinned) = pinned {
            if pinned != offset {
                log::trace!("pinning offset {} -> {}", offset, pinned);
                self.container.set_content_offset(pinned, false);
            }
        }
    }

    /// The drag came to rest: derive the new index from the offset, rebuild
    /// the window and snap back onto a page boundary if needed.
    pub fn did_end_decelerating(&mut self) {
        self.clamping = Clamping::None;
        if self.views.is_none() {
            return;
        }

        let width = self.container.page_width();
        let offset = self.container.content_offset();
        let page = settled_page(offset, width);
        let aligned = is_page_aligned(offset, width);

        let previous_index = self.index;
        self.index = index_after_settle(self.index, page, self.view_count);
        self.update_views(Some(previous_index));
        self.apply_layout(!aligned && self.options.animate_resnap);
    }

    /// Jump to `next_index`, optionally seeking the new current view.
    ///
    /// Out-of-range indices are ignored. Jumping to the current index only
    /// applies `target` to the current view.
    pub fn move_to(&mut self, next_index: usize, target: Option<SeekTarget>) {
        if next_index >= self.view_count {
            log::debug!(
                "ignoring move to {} (spine has {} items)",
                next_index,
                self.view_count
            );
            return;
        }
        if self.views.is_none() {
            self.layout();
        }

        if next_index == self.index {
            if let (Some(target), Some(view)) = (target, self.current_view_mut()) {
                view.seek(target);
            }
            return;
        }

        let forward = next_index > self.index;
        let offset = self.container.content_offset();
        let nudge = if forward {
            self.options.nudge_px
        } else {
            -self.options.nudge_px
        };
        self.container.set_content_offset(offset + nudge, false);

        let outgoing_edge = if forward {
            Location::End
        } else {
            Location::Beginning
        };
        if let Some(view) = self.current_view_mut() {
            view.settle_at(outgoing_edge);
        }

        log::debug!(
            "moving {} -> {} (edge window: {})",
            self.index,
            next_index,
            self.is_at_edge()
        );
        let previous_index = self.index;
        self.index = next_index;
        self.clamping = Clamping::None;
        self.update_views(Some(previous_index));
        self.apply_layout(false);

        if let (Some(target), Some(view)) = (target, self.current_view_mut()) {
            view.seek(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StubView {
        index: usize,
        location: Location,
        attached: bool,
        settled: Vec<Location>,
        seeks: Vec<SeekTarget>,
    }

    impl SlotView for StubView {
        fn spine_index(&self) -> usize {
            self.index
        }

        fn attach(&mut self) {
            self.attached = true;
        }

        fn detach(&mut self) {
            self.attached = false;
        }

        fn settle_at(&mut self, location: Location) {
            self.settled.push(location);
        }

        fn seek(&mut self, target: SeekTarget) {
            self.seeks.push(target);
        }
    }

    #[derive(Default)]
    struct StubFactory {
        made: Vec<(usize, Location)>,
    }

    impl ContentFactory for StubFactory {
        type View = StubView;

        fn make_view(&mut self, index: usize, location: Location) -> StubView {
            self.made.push((index, location));
            StubView {
                index,
                location,
                attached: false,
                settled: Vec::new(),
                seeks: Vec::new(),
            }
        }
    }

    #[derive(Default)]
    struct StubPager {
        offset: f64,
        pages: usize,
        writes: Vec<(f64, bool)>,
    }

    impl ScrollContainer for StubPager {
        fn page_width(&self) -> f64 {
            200.0
        }

        fn content_offset(&self) -> f64 {
            self.offset
        }

        fn set_content_offset(&mut self, x: f64, animated: bool) {
            self.offset = x;
            self.writes.push((x, animated));
        }

        fn set_page_count(&mut self, pages: usize) {
            self.pages = pages;
        }
    }

    fn triptych(count: usize, index: usize) -> TriptychView<StubFactory, StubPager> {
        let mut view = TriptychView::new(
            count,
            index,
            StubFactory::default(),
            StubPager::default(),
            TriptychOptions::default(),
        )
        .unwrap();
        view.layout();
        view
    }

    #[test]
    fn test_new_rejects_bad_preconditions() {
        let err = TriptychView::new(
            0,
            0,
            StubFactory::default(),
            StubPager::default(),
            TriptychOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, NavigatorError::EmptySpine);
        let err = TriptychView::new(
            3,
            3,
            StubFactory::default(),
            StubPager::default(),
            TriptychOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, NavigatorError::InitialIndexOutOfRange { index: 3, count: 3 });
    }

    #[test]
    fn test_layout_builds_interior_window() {
        let view = triptych(5, 2);
        assert_eq!(view.live_indices().as_slice(), &[1, 2, 3]);
        assert_eq!(
            view.factory().made,
            vec![(2, Location::Beginning), (1, Location::End), (3, Location::Beginning)]
        );
        assert_eq!(view.container().pages, 3);
        assert_eq!(view.container().offset, 200.0);
        assert!(view.views().unwrap().ordered().iter().all(|v| v.attached));
        assert_eq!(view.current_view().unwrap().index, 2);
    }

    #[test]
    fn test_layout_at_first_index_starts_on_page_zero() {
        let view = triptych(5, 0);
        assert_eq!(view.live_indices().as_slice(), &[0, 1]);
        assert_eq!(view.container().offset, 0.0);
        assert!(view.container().writes.is_empty());
    }

    #[test]
    fn test_single_item_never_grows() {
        let mut view = triptych(1, 0);
        view.move_to(1, None);
        view.container_mut().offset = 0.0;
        view.did_end_decelerating();
        assert_eq!(view.live_indices().as_slice(), &[0]);
        assert_eq!(view.factory().made.len(), 1);
    }

    #[test]
    fn test_pair_layout_tracks_index() {
        let mut view = triptych(2, 1);
        assert_eq!(
            view.factory().made,
            vec![(0, Location::End), (1, Location::Beginning)]
        );
        assert_eq!(view.container().offset, 200.0);
        view.move_to(0, None);
        assert_eq!(view.index(), 0);
        assert_eq!(view.factory().made.len(), 2);
        assert_eq!(view.container().offset, 0.0);
    }

    #[test]
    fn test_move_forward_reuses_overlap_and_drops_old() {
        let mut view = triptych(6, 2);
        view.move_to(3, None);
        assert_eq!(view.live_indices().as_slice(), &[2, 3, 4]);
        assert_eq!(view.factory().made.len(), 4);
        assert_eq!(view.factory().made[3], (4, Location::Beginning));
        let ordered = view.views().unwrap().ordered();
        assert_eq!(ordered[0].settled, vec![Location::End]);
    }

    #[test]
    fn test_move_round_trip_keeps_view_for_origin() {
        let mut view = triptych(6, 2);
        view.move_to(3, None);
        view.move_to(2, None);
        assert_eq!(view.live_indices().as_slice(), &[1, 2, 3]);
        let made_for_two = view.factory().made.iter().filter(|(i, _)| *i == 2).count();
        assert_eq!(made_for_two, 1);
        let made_for_one = view.factory().made.iter().filter(|(i, _)| *i == 1).count();
        assert_eq!(made_for_one, 2);
    }

    #[test]
    fn test_move_nudges_offset_in_travel_direction() {
        let mut view = triptych(6, 2);
        let start = view.container().writes.len();
        view.move_to(4, None);
        assert_eq!(view.container().writes[start], (201.0, false));
        assert_eq!(view.container().offset, 200.0);

        let start = view.container().writes.len();
        view.move_to(3, None);
        assert_eq!(view.container().writes[start], (199.0, false));
        assert_eq!(view.container().offset, 200.0);
    }

    #[test]
    fn test_move_same_index_seeks_in_place() {
        let mut view = triptych(6, 2);
        let writes = view.container().writes.len();
        view.move_to(2, Some(SeekTarget::Anchor("fn4".into())));
        assert_eq!(view.factory().made.len(), 3);
        assert_eq!(view.container().writes.len(), writes);
        assert_eq!(
            view.current_view().unwrap().seeks,
            vec![SeekTarget::Anchor("fn4".into())]
        );
    }

    #[test]
    fn test_move_out_of_range_is_ignored() {
        let mut view = triptych(3, 1);
        view.move_to(3, None);
        assert_eq!(view.index(), 1);
        assert_eq!(view.factory().made.len(), 3);
    }

    #[test]
    fn test_move_applies_target_to_new_current() {
        let mut view = triptych(6, 2);
        view.move_to(5, Some(SeekTarget::Fraction(0.5)));
        let current = view.current_view().unwrap();
        assert_eq!(current.index, 5);
        assert_eq!(current.seeks, vec![SeekTarget::Fraction(0.5)]);
        assert_eq!(view.live_indices().as_slice(), &[4, 5]);
        assert_eq!(view.container().pages, 2);
    }

    #[test]
    fn test_drag_clamps_towards_previous() {
        let mut view = triptych(5, 2);
        for offset in [0.0, 80.0, 200.0] {
            view.container_mut().offset = offset;
            view.did_scroll();
            if offset == 80.0 {
                assert_eq!(view.clamping(), Clamping::OnlyPrevious);
            }
        }
        view.container_mut().offset = 260.0;
        view.did_scroll();
        assert_eq!(view.container().offset, 200.0);
        assert!(view.container().writes.iter().all(|(x, _)| *x <= 200.0));
    }

    #[test]
    fn test_drag_clamping_needs_three_pages() {
        let mut view = triptych(5, 0);
        view.container_mut().offset = 120.0;
        view.did_scroll();
        assert_eq!(view.clamping(), Clamping::None);
    }

    #[test]
    fn test_settle_on_next_page_advances() {
        let mut view = triptych(5, 2);
        view.container_mut().offset = 260.0;
        view.did_scroll();
        assert_eq!(view.clamping(), Clamping::OnlyNext);
        view.container_mut().offset = 400.0;
        view.did_end_decelerating();
        assert_eq!(view.clamping(), Clamping::None);
        assert_eq!(view.index(), 3);
        assert_eq!(view.live_indices().as_slice(), &[2, 3, 4]);
        assert_eq!(view.container().offset, 200.0);
        assert_eq!(view.container().writes.last(), Some(&(200.0, false)));
    }

    #[test]
    fn test_settle_on_previous_page_goes_back() {
        let mut view = triptych(5, 2);
        view.container_mut().offset = 0.0;
        view.did_end_decelerating();
        assert_eq!(view.index(), 1);
        assert_eq!(view.live_indices().as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn test_settle_from_first_index_uses_page_one_as_next() {
        let mut view = triptych(5, 0);
        view.container_mut().offset = 200.0;
        view.did_end_decelerating();
        assert_eq!(view.index(), 1);
        assert_eq!(view.live_indices().as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn test_settle_off_boundary_resnaps_animated() {
        let mut view = triptych(5, 2);
        view.container_mut().offset = 230.0;
        view.did_end_decelerating();
        assert_eq!(view.index(), 2);
        assert_eq!(view.container().writes.last(), Some(&(200.0, true)));
    }

    #[test]
    fn test_dropped_views_are_detached() {
        let mut view = triptych(6, 1);
        view.move_to(4, None);
        assert_eq!(view.live_indices().as_slice(), &[3, 4, 5]);
        assert!(view.views().unwrap().ordered().iter().all(|v| v.attached));
        assert_eq!(view.factory().made.len(), 6);
        let stale = view.factory().made.iter().filter(|(i, _)| *i == 4).count();
        assert_eq!(stale, 1);
    }

    #[test]
    fn test_fresh_views_keep_their_initial_location() {
        let view = triptych(4, 3);
        let locations: Vec<Location> = view
            .views()
            .unwrap()
            .ordered()
            .iter()
            .map(|v| v.location)
            .collect();
        assert_eq!(locations, vec![Location::End, Location::Beginning]);
    }
}
