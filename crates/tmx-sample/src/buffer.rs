//! Buffers whose element type is only known at run time.
//!
//! Test combinations carry their [`DataType`] as data, so a test body that
//! iterates a cross product picks the storage representation by matching on
//! it. Each variant holds the native representation of one data type.

use half::{bf16, f16};
use rand::Rng;
use tmx_core::storage::{self, Storage};
use tmx_core::{DataType, Shape};

use crate::{Bounds, Vector, iota_buffer, random_buffer};

#[derive(Debug, Clone, PartialEq)]
pub enum ElementBuffer {
    I1(Vector<bool>),
    SI4(Vector<i8>),
    SI8(Vector<i8>),
    SI16(Vector<i16>),
    SI32(Vector<i32>),
    BF16(Vector<bf16>),
    F16(Vector<f16>),
    F32(Vector<f32>),
}

macro_rules! map_buffer {
    ($buffer:expr, |$values:ident, $marker:ident| $body:expr) => {
        match $buffer {
            ElementBuffer::I1($values) => {
                type $marker = storage::I1;
                $body
            }
            ElementBuffer::SI4($values) => {
                type $marker = storage::SI4;
                $body
            }
            ElementBuffer::SI8($values) => {
                type $marker = storage::SI8;
                $body
            }
            ElementBuffer::SI16($values) => {
                type $marker = storage::SI16;
                $body
            }
            ElementBuffer::SI32($values) => {
                type $marker = storage::SI32;
                $body
            }
            ElementBuffer::BF16($values) => {
                type $marker = storage::BF16;
                $body
            }
            ElementBuffer::F16($values) => {
                type $marker = storage::F16;
                $body
            }
            ElementBuffer::F32($values) => {
                type $marker = storage::F32;
                $body
            }
        }
    };
}

impl ElementBuffer {
    /// Runtime-dispatched [`random_buffer`].
    ///
    /// # Panics
    ///
    /// Panics when `bounds` leaves an empty range for `data_type`.
    pub fn random<R: Rng + ?Sized>(
        data_type: DataType,
        shape: &Shape,
        bounds: Bounds,
        rng: &mut R,
    ) -> Self {
        match data_type {
            DataType::I1 => Self::I1(random_buffer::<storage::I1, R>(shape, bounds, rng)),
            DataType::SI4 => Self::SI4(random_buffer::<storage::SI4, R>(shape, bounds, rng)),
            DataType::SI8 => Self::SI8(random_buffer::<storage::SI8, R>(shape, bounds, rng)),
            DataType::SI16 => Self::SI16(random_buffer::<storage::SI16, R>(shape, bounds, rng)),
            DataType::SI32 => Self::SI32(random_buffer::<storage::SI32, R>(shape, bounds, rng)),
            DataType::BF16 => Self::BF16(random_buffer::<storage::BF16, R>(shape, bounds, rng)),
            DataType::F16 => Self::F16(random_buffer::<storage::F16, R>(shape, bounds, rng)),
            DataType::F32 => Self::F32(random_buffer::<storage::F32, R>(shape, bounds, rng)),
        }
    }

    /// Runtime-dispatched [`iota_buffer`]. `start`, `min` and `max` are
    /// narrowed to `data_type` first.
    #[must_use]
    pub fn iota(
        data_type: DataType,
        shape: &Shape,
        start: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        fn typed<S: Storage>(
            shape: &Shape,
            start: Option<f64>,
            min: Option<f64>,
            max: Option<f64>,
        ) -> Vector<S::Native> {
            iota_buffer::<S>(
                shape,
                start.map(S::from_f64),
                min.map(S::from_f64),
                max.map(S::from_f64),
            )
        }

        match data_type {
            DataType::I1 => Self::I1(typed::<storage::I1>(shape, start, min, max)),
            DataType::SI4 => Self::SI4(typed::<storage::SI4>(shape, start, min, max)),
            DataType::SI8 => Self::SI8(typed::<storage::SI8>(shape, start, min, max)),
            DataType::SI16 => Self::SI16(typed::<storage::SI16>(shape, start, min, max)),
            DataType::SI32 => Self::SI32(typed::<storage::SI32>(shape, start, min, max)),
            DataType::BF16 => Self::BF16(typed::<storage::BF16>(shape, start, min, max)),
            DataType::F16 => Self::F16(typed::<storage::F16>(shape, start, min, max)),
            DataType::F32 => Self::F32(typed::<storage::F32>(shape, start, min, max)),
        }
    }

    #[must_use]
    pub fn data_type(&self) -> DataType {
        map_buffer!(self, |_values, S| S::DATA_TYPE)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        map_buffer!(self, |values, _S| values.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        map_buffer!(self, |values, S| values.get(index).copied().map(S::to_f64))
    }

    #[must_use]
    pub fn to_f64_vec(&self) -> Vec<f64> {
        map_buffer!(self, |values, S| values.iter().copied().map(S::to_f64).collect())
    }
}
