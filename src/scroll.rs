//! Physical paging container port and the drag clamping state machine.

/// Horizontally paging container hosting the window's views side by side.
///
/// Offsets are in the container's own units (points/pixels); one page is
/// `page_width()` wide and page `n` starts at `n * page_width()`.
pub trait ScrollContainer {
    /// Width of one page.
    fn page_width(&self) -> f64;

    /// Current horizontal content offset.
    fn content_offset(&self) -> f64;

    /// Move the content offset, optionally animated.
    fn set_content_offset(&mut self, x: f64, animated: bool);

    /// Resize the scrollable content to `pages` pages.
    fn set_page_count(&mut self, pages: usize);
}

/// Which neighbor a drag is allowed to reveal.
///
/// Once a drag leaves the middle page in one direction, the offset is pinned
/// to that side so a single fling cannot skip past the one-neighbor window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Clamping {
    #[default]
    None,
    OnlyPrevious,
    OnlyNext,
}

impl Clamping {
    /// Feed one scroll sample taken while three pages are live.
    ///
    /// Returns the next state and, when the sample has to be pinned, the
    /// offset to apply to the container.
    pub fn observe(self, offset: f64, page_width: f64) -> (Clamping, Option<f64>) {
        match self {
            Clamping::None => {
                if offset < page_width {
                    (Clamping::OnlyPrevious, None)
                } else if offset > page_width {
                    (Clamping::OnlyNext, None)
                } else {
                    (Clamping::None, None)
                }
            }
            Clamping::OnlyPrevious => (Clamping::OnlyPrevious, Some(offset.min(page_width))),
            Clamping::OnlyNext => (Clamping::OnlyNext, Some(offset.max(page_width))),
        }
    }
}

/// Page the container settled on, rounded to the nearest boundary.
pub fn settled_page(offset: f64, page_width: f64) -> usize {
    if page_width <= 0.0 || !offset.is_finite() {
        return 0;
    }
    let page = (offset / page_width).round();
    if page <= 0.0 {
        0
    } else {
        page as usize
    }
}

/// Logical index after settling on `page` from `index`.
///
/// Page 0 means the previous item unless already at the first one. Page 1 is
/// the middle page, except for windows starting at index 0 where it is the
/// next item. Page 2 is always the next item.
pub fn index_after_settle(index: usize, page: usize, view_count: usize) -> usize {
    let next = match page {
        0 => index.saturating_sub(1),
        1 if index == 0 => 1,
        1 => index,
        _ => index + 1,
    };
    next.min(view_count.saturating_sub(1))
}

/// Whether `offset` sits exactly on a page boundary.
pub fn is_page_aligned(offset: f64, page_width: f64) -> bool {
    page_width <= 0.0 || offset % page_width == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping_enters_previous_and_pins() {
        let (state, pinned) = Clamping::None.observe(80.0, 200.0);
        assert_eq!(state, Clamping::OnlyPrevious);
        assert_eq!(pinned, None);

        let (state, pinned) = state.observe(260.0, 200.0);
        assert_eq!(state, Clamping::OnlyPrevious);
        assert_eq!(pinned, Some(200.0));
    }

    #[test]
    fn test_clamping_enters_next_and_pins() {
        let (state, _) = Clamping::None.observe(230.0, 200.0);
        assert_eq!(state, Clamping::OnlyNext);
        let (_, pinned) = state.observe(150.0, 200.0);
        assert_eq!(pinned, Some(200.0));
    }

    #[test]
    fn test_clamping_stays_none_on_middle_page() {
        assert_eq!(Clamping::None.observe(200.0, 200.0), (Clamping::None, None));
    }

    #[test]
    fn test_index_after_settle() {
        assert_eq!(index_after_settle(0, 0, 5), 0);
        assert_eq!(index_after_settle(3, 0, 5), 2);
        assert_eq!(index_after_settle(0, 1, 5), 1);
        assert_eq!(index_after_settle(3, 1, 5), 3);
        assert_eq!(index_after_settle(3, 2, 5), 4);
        assert_eq!(index_after_settle(4, 2, 5), 4);
    }

    #[test]
    fn test_settled_page_rounds() {
        assert_eq!(settled_page(290.0, 200.0), 1);
        assert_eq!(settled_page(310.0, 200.0), 2);
        assert_eq!(settled_page(-4.0, 200.0), 0);
        assert!(is_page_aligned(400.0, 200.0));
        assert!(!is_page_aligned(401.0, 200.0));
    }
}
