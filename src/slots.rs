//! The 1/2/3-slot view window held by [`crate::TriptychView`].
//!
//! `ViewSlots<V>` is a sum type rather than a list so the number of live
//! views is fixed by the variant. `ViewSlots<usize>` doubles as the
//! [`Window`] of spine indices required for a given position.

use smallvec::SmallVec;

use crate::disjunction::Disjunction;
use crate::location::Location;

/// Materialized views for the current window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewSlots<V> {
    /// Single-item publication.
    Single(V),
    /// Two-item publication: both items are always live.
    Pair(V, V),
    /// Three or more items: the current view plus one or two neighbors.
    Windowed {
        current: V,
        neighbors: Disjunction<V, V>,
    },
}

/// Spine indices required around a position.
pub type Window = ViewSlots<usize>;

impl Window {
    /// Compute the window for `index` in a spine of `view_count` items.
    ///
    /// `view_count` must be at least 1 and `index` must be in range; the
    /// result is clamped otherwise.
    pub fn for_index(index: usize, view_count: usize) -> Window {
        match view_count {
            0 | 1 => ViewSlots::Single(0),
            2 => ViewSlots::Pair(0, 1),
            _ => {
                let index = index.min(view_count - 1);
                let previous = index.checked_sub(1);
                let next = if index + 1 < view_count {
                    Some(index + 1)
                } else {
                    None
                };
                match Disjunction::from_parts(previous, next) {
                    Some(neighbors) => ViewSlots::Windowed {
                        current: index,
                        neighbors,
                    },
                    None => ViewSlots::Single(index),
                }
            }
        }
    }
}

impl<V> ViewSlots<V> {
    /// Number of live views.
    pub fn count(&self) -> usize {
        match self {
            ViewSlots::Single(_) => 1,
            ViewSlots::Pair(_, _) => 2,
            ViewSlots::Windowed { neighbors, .. } => 1 + neighbors.count(),
        }
    }

    /// Views in left-to-right page order.
    pub fn ordered(&self) -> SmallVec<[&V; 3]> {
        let mut out = SmallVec::new();
        match self {
            ViewSlots::Single(view) => out.push(view),
            ViewSlots::Pair(first, second) => {
                out.push(first);
                out.push(second);
            }
            ViewSlots::Windowed { current, neighbors } => {
                if let Some(previous) = neighbors.first() {
                    out.push(previous);
                }
                out.push(current);
                if let Some(next) = neighbors.second() {
                    out.push(next);
                }
            }
        }
        out
    }

    /// Mutable views in left-to-right page order.
    pub fn ordered_mut(&mut self) -> SmallVec<[&mut V; 3]> {
        let mut out = SmallVec::new();
        match self {
            ViewSlots::Single(view) => out.push(view),
            ViewSlots::Pair(first, second) => {
                out.push(first);
                out.push(second);
            }
            ViewSlots::Windowed { current, neighbors } => match neighbors {
                Disjunction::First(previous) => {
                    out.push(previous);
                    out.push(current);
                }
                Disjunction::Second(next) => {
                    out.push(current);
                    out.push(next);
                }
                Disjunction::Both(previous, next) => {
                    out.push(previous);
                    out.push(current);
                    out.push(next);
                }
            },
        }
        out
    }

    /// The view shown for logical `index`.
    pub fn current(&self, index: usize) -> &V {
        match self {
            ViewSlots::Single(view) => view,
            ViewSlots::Pair(first, second) => {
                if index == 0 {
                    first
                } else {
                    second
                }
            }
            ViewSlots::Windowed { current, .. } => current,
        }
    }

    pub fn current_mut(&mut self, index: usize) -> &mut V {
        match self {
            ViewSlots::Single(view) => view,
            ViewSlots::Pair(first, second) => {
                if index == 0 {
                    first
                } else {
                    second
                }
            }
            ViewSlots::Windowed { current, .. } => current,
        }
    }

    /// Physical page (0-based, left to right) of the view for `index`.
    pub fn current_page(&self, index: usize) -> usize {
        match self {
            ViewSlots::Single(_) => 0,
            ViewSlots::Pair(_, _) => index.min(1),
            ViewSlots::Windowed { neighbors, .. } => usize::from(neighbors.first().is_some()),
        }
    }

    /// Pair each view with the spine index it was built for, given that the
    /// window was laid out around `index`.
    pub fn into_indexed(self, index: usize) -> SmallVec<[(usize, V); 3]> {
        let mut out = SmallVec::new();
        match self {
            ViewSlots::Single(view) => out.push((index, view)),
            ViewSlots::Pair(first, second) => {
                out.push((0, first));
                out.push((1, second));
            }
            ViewSlots::Windowed { current, neighbors } => {
                let (previous, next) = neighbors.into_parts();
                if let Some(previous) = previous {
                    out.push((index.saturating_sub(1), previous));
                }
                out.push((index, current));
                if let Some(next) = next {
                    out.push((index + 1, next));
                }
            }
        }
        out
    }

    /// Build a new window of the same shape, visiting slots in creation
    /// order (current first, then previous, then next) with the edge each
    /// slot should initially show when laid out around `index`.
    pub fn map_slots<U>(self, index: usize, mut f: impl FnMut(V, Location) -> U) -> ViewSlots<U> {
        match self {
            ViewSlots::Single(view) => ViewSlots::Single(f(view, Location::Beginning)),
            ViewSlots::Pair(first, second) => {
                let first_location = if index == 0 {
                    Location::Beginning
                } else {
                    Location::End
                };
                let first = f(first, first_location);
                let second = f(second, Location::Beginning);
                ViewSlots::Pair(first, second)
            }
            ViewSlots::Windowed { current, neighbors } => {
                let current = f(current, Location::Beginning);
                let neighbors = match neighbors {
                    Disjunction::First(previous) => Disjunction::First(f(previous, Location::End)),
                    Disjunction::Second(next) => Disjunction::Second(f(next, Location::Beginning)),
                    Disjunction::Both(previous, next) => {
                        let previous = f(previous, Location::End);
                        let next = f(next, Location::Beginning);
                        Disjunction::Both(previous, next)
                    }
                };
                ViewSlots::Windowed { current, neighbors }
            }
        }
    }
}
