//! Edge markers for content views.

/// Which edge of a content view should be visible first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Location {
    /// Leading edge (progression `0.0`).
    #[default]
    Beginning,
    /// Trailing edge (progression `1.0`).
    End,
}

impl Location {
    /// Fractional document progression matching this edge.
    pub fn progression(self) -> f64 {
        match self {
            Location::Beginning => 0.0,
            Location::End => 1.0,
        }
    }
}
