//! Evaluation time for transform queries.
//!
//! Every resolution call takes an explicit [`TimeCode`]. There is no
//! process-wide "current time": callers thread the time they want through
//! each query, and caches key their entries by it.

use std::hash::{Hash, Hasher};

/// The time at which transform operations are evaluated.
///
/// [`TimeCode::Default`] selects each operation's authored default value,
/// ignoring its time samples. [`TimeCode::At`] evaluates time samples,
/// interpolating between them and holding the nearest sample outside the
/// sampled range.
///
/// # Example
///
/// ```
/// use worldxform::TimeCode;
///
/// let rest = TimeCode::Default;
/// let frame = TimeCode::at(24.0);
///
/// assert!(rest.is_default());
/// assert_eq!(frame.value(), Some(24.0));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub enum TimeCode {
    /// Evaluate authored default values.
    #[default]
    Default,
    /// Evaluate time samples at a numeric time.
    At(f64),
}

impl TimeCode {
    /// Creates a numeric time code.
    pub fn at(time: f64) -> Self {
        Self::At(time)
    }

    /// Returns true for [`TimeCode::Default`].
    pub fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Returns the numeric time, or `None` for the default time.
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Default => None,
            Self::At(time) => Some(time),
        }
    }

    // -0.0 and 0.0 must land on the same cache entry.
    fn key_bits(self) -> Option<u64> {
        self.value().map(|t| if t == 0.0 { 0.0f64.to_bits() } else { t.to_bits() })
    }
}

impl PartialEq for TimeCode {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for TimeCode {}

impl Hash for TimeCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_bits().hash(state);
    }
}

impl From<f64> for TimeCode {
    fn from(time: f64) -> Self {
        Self::At(time)
    }
}

impl std::fmt::Display for TimeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "DEFAULT"),
            Self::At(time) => write!(f, "{}", time),
        }
    }
}
