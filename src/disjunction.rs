//! Inclusive "one, the other, or both" union.

/// Holds a first value, a second value, or both.
///
/// Used by [`crate::ViewSlots`] for the neighbors of the current view: `First`
/// is the previous view, `Second` the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disjunction<A, B> {
    First(A),
    Second(B),
    Both(A, B),
}

impl<A, B> Disjunction<A, B> {
    /// Number of values held (1 or 2).
    pub fn count(&self) -> usize {
        match self {
            Disjunction::First(_) | Disjunction::Second(_) => 1,
            Disjunction::Both(_, _) => 2,
        }
    }

    pub fn first(&self) -> Option<&A> {
        match self {
            Disjunction::First(a) | Disjunction::Both(a, _) => Some(a),
            Disjunction::Second(_) => None,
        }
    }

    pub fn second(&self) -> Option<&B> {
        match self {
            Disjunction::Second(b) | Disjunction::Both(_, b) => Some(b),
            Disjunction::First(_) => None,
        }
    }

    /// Split into the optional halves.
    pub fn into_parts(self) -> (Option<A>, Option<B>) {
        match self {
            Disjunction::First(a) => (Some(a), None),
            Disjunction::Second(b) => (None, Some(b)),
            Disjunction::Both(a, b) => (Some(a), Some(b)),
        }
    }

    /// Build from optional halves; `None` when both are absent.
    pub fn from_parts(first: Option<A>, second: Option<B>) -> Option<Self> {
        match (first, second) {
            (Some(a), Some(b)) => Some(Disjunction::Both(a, b)),
            (Some(a), None) => Some(Disjunction::First(a)),
            (None, Some(b)) => Some(Disjunction::Second(b)),
            (None, None) => None,
        }
    }
}
