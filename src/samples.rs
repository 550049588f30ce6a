//! Time-sampled values for animated transform ops.
//!
//! An [`Animated`] value pairs an optional authored default with a sorted set
//! of [`TimeSamples`]. Evaluation interpolates linearly between bracketing
//! samples and holds the first/last sample outside the sampled range.

use crate::error::TimeSampleError;
use crate::time::TimeCode;
use glam::{DMat4, DQuat, DVec3};

/// A value that can be blended between two time samples.
///
/// `alpha` is in `[0, 1]`, with `0` returning `self` and `1` returning `other`.
pub trait Interpolate: Clone {
    /// Blends towards `other` by `alpha`.
    fn interpolate(&self, other: &Self, alpha: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(&self, other: &Self, alpha: f64) -> Self {
        self + (other - self) * alpha
    }
}

impl Interpolate for DVec3 {
    fn interpolate(&self, other: &Self, alpha: f64) -> Self {
        self.lerp(*other, alpha)
    }
}

impl Interpolate for DQuat {
    fn interpolate(&self, other: &Self, alpha: f64) -> Self {
        self.slerp(*other, alpha)
    }
}

impl Interpolate for DMat4 {
    fn interpolate(&self, other: &Self, alpha: f64) -> Self {
        let a = self.to_cols_array();
        let b = other.to_cols_array();
        DMat4::from_cols_array(&std::array::from_fn(|i| a[i].interpolate(&b[i], alpha)))
    }
}

/// An ordered mapping of time → value.
///
/// Samples are kept sorted by time. Authoring two samples at the same time
/// keeps the later one.
///
/// # Example
///
/// ```
/// use worldxform::{TimeSamples, DVec3};
///
/// let samples = TimeSamples::from_samples([
///     (10.0, DVec3::new(10.0, 0.0, 0.0)),
///     (0.0, DVec3::ZERO),
/// ])
/// .unwrap();
///
/// assert_eq!(samples.sample(5.0), Some(DVec3::new(5.0, 0.0, 0.0)));
/// // Outside the sampled range the nearest sample is held.
/// assert_eq!(samples.sample(-3.0), Some(DVec3::ZERO));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSamples<T> {
    samples: Vec<(f64, T)>,
}

impl<T> Default for TimeSamples<T> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl<T: Interpolate> TimeSamples<T> {
    /// Creates an empty sample set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sample set from `(time, value)` pairs in any order.
    ///
    /// Fails if any time is NaN or infinite.
    pub fn from_samples(
        samples: impl IntoIterator<Item = (f64, T)>,
    ) -> Result<Self, TimeSampleError> {
        let mut set = Self::new();
        for (time, value) in samples {
            set.insert(time, value)?;
        }
        Ok(set)
    }

    /// Authors a sample, replacing any sample already at `time`.
    pub fn insert(&mut self, time: f64, value: T) -> Result<(), TimeSampleError> {
        if !time.is_finite() {
            return Err(TimeSampleError::NonFiniteTime(time));
        }
        match self.samples.binary_search_by(|(t, _)| t.total_cmp(&time)) {
            Ok(index) => self.samples[index].1 = value,
            Err(index) => self.samples.insert(index, (time, value)),
        }
        Ok(())
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples are authored.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the authored sample times in ascending order.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|(t, _)| *t)
    }

    /// Returns the earliest sample's value.
    pub fn first(&self) -> Option<&T> {
        self.samples.first().map(|(_, v)| v)
    }

    /// Samples the value at `time`.
    ///
    /// Returns `None` only when there are no samples. A NaN `time` holds the
    /// first sample.
    pub fn sample(&self, time: f64) -> Option<T> {
        let (first, last) = (self.samples.first()?, self.samples.last()?);

        if time.is_nan() {
            log::warn!("Sampling at NaN time, holding first sample");
            return Some(first.1.clone());
        }
        if time <= first.0 {
            return Some(first.1.clone());
        }
        if time >= last.0 {
            return Some(last.1.clone());
        }

        // First sample strictly after `time`; both neighbours exist here.
        let upper = self.samples.partition_point(|(t, _)| *t <= time);
        let (t0, v0) = &self.samples[upper - 1];
        let (t1, v1) = &self.samples[upper];
        if *t0 == time {
            return Some(v0.clone());
        }
        let alpha = (time - t0) / (t1 - t0);
        Some(v0.interpolate(v1, alpha))
    }
}

/// A possibly animated op value: an authored default plus time samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Animated<T> {
    /// Value used at [`TimeCode::Default`], and at numeric times when no
    /// samples are authored.
    pub default: Option<T>,
    /// Time-varying values.
    pub samples: TimeSamples<T>,
}

impl<T> Default for Animated<T> {
    fn default() -> Self {
        Self {
            default: None,
            samples: TimeSamples::default(),
        }
    }
}

impl<T: Interpolate> Animated<T> {
    /// A constant value.
    pub fn constant(value: T) -> Self {
        Self {
            default: Some(value),
            samples: TimeSamples::new(),
        }
    }

    /// A value driven only by time samples.
    pub fn sampled(samples: TimeSamples<T>) -> Self {
        Self {
            default: None,
            samples,
        }
    }

    /// Adds a time sample, builder style.
    pub fn with_sample(mut self, time: f64, value: T) -> Result<Self, TimeSampleError> {
        self.samples.insert(time, value)?;
        Ok(self)
    }

    /// Returns true if the value varies over time.
    pub fn is_animated(&self) -> bool {
        self.samples.len() > 1
    }

    /// Evaluates the value at `time`.
    ///
    /// - [`TimeCode::Default`]: the default, or the first sample if no
    ///   default is authored.
    /// - [`TimeCode::At`]: the sampled value, or the default if no samples
    ///   are authored.
    ///
    /// Returns `None` when nothing is authored.
    pub fn eval(&self, time: TimeCode) -> Option<T> {
        match time {
            TimeCode::Default => self
                .default
                .clone()
                .or_else(|| self.samples.first().cloned()),
            TimeCode::At(t) => self.samples.sample(t).or_else(|| self.default.clone()),
        }
    }
}

impl<T: Interpolate> From<T> for Animated<T> {
    fn from(value: T) -> Self {
        Self::constant(value)
    }
}
