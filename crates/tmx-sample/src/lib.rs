#![forbid(unsafe_code)]

pub mod buffer;
pub mod source;
pub mod threefry;

use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use smallvec::SmallVec;
use tmx_core::{DataType, NumericCategory, Shape, Storage};

pub use buffer::ElementBuffer;
pub use source::{EntropySource, SAMPLE_SEED_ENV, capture_sample_seed};
pub use threefry::{ThreefryKey, ThreefryRng};

/// Sample container. Inline storage of one element keeps scalar buffers off
/// the heap and gives `bool` the same API as every other element type.
pub type Vector<T> = SmallVec<[T; 1]>;

/// A uniform distribution over a closed range, chosen by numeric category.
///
/// Every draw is returned as `f64`: integral for the boolean and integer
/// categories, continuous for floats. Narrowing to the target representation
/// is left to the caller.
#[derive(Debug, Clone)]
pub enum Sampler {
    Boolean(Uniform<i32>),
    Integer(Uniform<i64>),
    Float(Uniform<f64>),
}

impl Sampler {
    /// Uniform sampler over `[low, high]`.
    ///
    /// Discrete categories round the bounds inward (`ceil(low)`,
    /// `floor(high)`). Float bounds are used as given; [`random_buffer`]
    /// first rounds them inward to values the storage type can hold, so
    /// narrowing a draw never leaves the caller's range.
    ///
    /// # Panics
    ///
    /// Panics when the range is empty after rounding, or when a float bound
    /// is NaN. Keeping `low <= high` is the caller's job; bounds are never swapped.
    #[must_use]
    pub fn new(category: NumericCategory, low: f64, high: f64) -> Self {
        match category {
            NumericCategory::Boolean => {
                Self::Boolean(Uniform::new_inclusive(low.ceil() as i32, high.floor() as i32))
            }
            NumericCategory::Integer => {
                Self::Integer(Uniform::new_inclusive(low.ceil() as i64, high.floor() as i64))
            }
            NumericCategory::Float => Self::Float(Uniform::new_inclusive(low, high)),
        }
    }

    /// Sampler for `data_type`'s category. The bounds are used as given, not
    /// intersected with the type's own range.
    #[must_use]
    pub fn for_type(data_type: DataType, low: f64, high: f64) -> Self {
        Self::new(data_type.category(), low, high)
    }

    #[must_use]
    pub fn category(&self) -> NumericCategory {
        match self {
            Self::Boolean(_) => NumericCategory::Boolean,
            Self::Integer(_) => NumericCategory::Integer,
            Self::Float(_) => NumericCategory::Float,
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Boolean(dist) => f64::from(dist.sample(rng)),
            Self::Integer(dist) => dist.sample(rng) as f64,
            Self::Float(dist) => dist.sample(rng),
        }
    }
}

/// Optional caller bounds for [`random_buffer`]. Unset sides fall back to
/// the element type's intrinsic limits.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub const FULL: Self = Self {
        min: None,
        max: None,
    };

    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    #[must_use]
    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    #[must_use]
    pub const fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Intersection with `[data_type.min_value(), data_type.max_value()]`.
    #[must_use]
    pub fn effective(self, data_type: DataType) -> (f64, f64) {
        let type_min = data_type.min_value();
        let type_max = data_type.max_value();
        let low = self.min.map_or(type_min, |min| min.max(type_min));
        let high = self.max.map_or(type_max, |max| max.min(type_max));
        (low, high)
    }
}

/// `shape.num_elements()` independent uniform draws within `bounds`
/// intersected with the storage type's range.
///
/// Both ends are rounded inward to representable values before sampling.
///
/// # Panics
///
/// See [`Sampler::new`]: a range with no representable value panics.
pub fn random_buffer<S, R>(shape: &Shape, bounds: Bounds, rng: &mut R) -> Vector<S::Native>
where
    S: Storage,
    R: Rng + ?Sized,
{
    let (low, high) = bounds.effective(S::DATA_TYPE);
    let low = S::to_f64(S::from_f64_at_least(low));
    let high = S::to_f64(S::from_f64_at_most(high));
    let sampler = Sampler::for_type(S::DATA_TYPE, low, high);
    (0..shape.num_elements())
        .map(|_| S::from_f64(sampler.sample(&mut *rng)))
        .collect()
}

/// Deterministic counterpart of [`random_buffer`].
///
/// Elements count up by one from `start`; whenever the next value would
/// exceed `max`, the count restarts at `min`. Defaults are the storage
/// type's own limits, and `start` defaults to the type minimum even when a
/// narrower `min` is given.
pub fn iota_buffer<S: Storage>(
    shape: &Shape,
    start: Option<S::Native>,
    min: Option<S::Native>,
    max: Option<S::Native>,
) -> Vector<S::Native> {
    let min = min.unwrap_or(S::MIN_VALUE);
    let max = S::to_f64(max.unwrap_or(S::MAX_VALUE));
    let mut value = start.unwrap_or(S::MIN_VALUE);
    (0..shape.num_elements())
        .map(|_| {
            let current = value;
            let next = S::to_f64(value) + 1.0;
            value = if next > max { min } else { S::from_f64(next) };
            current
        })
        .collect()
}
