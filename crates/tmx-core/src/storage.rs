//! Compile-time storage descriptors, one marker type per [`DataType`].
//!
//! `Storage` ties a data type to its native Rust representation and its
//! intrinsic bounds. Conversions go through `f64`, which holds every value of
//! every supported type exactly.

use crate::DataType;
use half::{bf16, f16};

pub trait Storage {
    const DATA_TYPE: DataType;
    type Native: Copy + PartialOrd + std::fmt::Debug + Send + Sync + 'static;
    const MIN_VALUE: Self::Native;
    const MAX_VALUE: Self::Native;

    fn to_f64(value: Self::Native) -> f64;

    /// Narrowing conversion. Integers truncate toward zero, floats round to
    /// nearest; both saturate at `MIN_VALUE`/`MAX_VALUE`.
    fn from_f64(value: f64) -> Self::Native;

    /// Smallest representable value `>= value`, saturating at the type limits.
    fn from_f64_at_least(value: f64) -> Self::Native {
        Self::from_f64(value.ceil())
    }

    /// Largest representable value `<= value`, saturating at the type limits.
    fn from_f64_at_most(value: f64) -> Self::Native {
        Self::from_f64(value.floor())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SI4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SI8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SI16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SI32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BF16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct F16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct F32;

impl Storage for I1 {
    const DATA_TYPE: DataType = DataType::I1;
    type Native = bool;
    const MIN_VALUE: bool = false;
    const MAX_VALUE: bool = true;

    fn to_f64(value: bool) -> f64 {
        if value { 1.0 } else { 0.0 }
    }

    fn from_f64(value: f64) -> bool {
        value != 0.0
    }
}

impl Storage for SI4 {
    const DATA_TYPE: DataType = DataType::SI4;
    type Native = i8;
    const MIN_VALUE: i8 = -8;
    const MAX_VALUE: i8 = 7;

    fn to_f64(value: i8) -> f64 {
        f64::from(value)
    }

    fn from_f64(value: f64) -> i8 {
        (value as i8).clamp(Self::MIN_VALUE, Self::MAX_VALUE)
    }
}

macro_rules! integer_storage {
    ($marker:ident, $data_type:ident, $native:ty) => {
        impl Storage for $marker {
            const DATA_TYPE: DataType = DataType::$data_type;
            type Native = $native;
            const MIN_VALUE: $native = <$native>::MIN;
            const MAX_VALUE: $native = <$native>::MAX;

            fn to_f64(value: $native) -> f64 {
                f64::from(value)
            }

            fn from_f64(value: f64) -> $native {
                // `as` saturates float-to-int casts and maps NaN to zero.
                value as $native
            }
        }
    };
}

integer_storage!(SI8, SI8, i8);
integer_storage!(SI16, SI16, i16);
integer_storage!(SI32, SI32, i32);

impl Storage for BF16 {
    const DATA_TYPE: DataType = DataType::BF16;
    type Native = bf16;
    const MIN_VALUE: bf16 = bf16::MIN;
    const MAX_VALUE: bf16 = bf16::MAX;

    fn to_f64(value: bf16) -> f64 {
        value.to_f64()
    }

    fn from_f64(value: f64) -> bf16 {
        bf16::from_f64(saturate(value, Self::MIN_VALUE.to_f64(), Self::MAX_VALUE.to_f64()))
    }

    fn from_f64_at_least(value: f64) -> bf16 {
        let nearest = Self::from_f64(value);
        if nearest.to_f64() < value && nearest < Self::MAX_VALUE {
            bf16::from_bits(next_up_bits(nearest.to_bits()))
        } else {
            nearest
        }
    }

    fn from_f64_at_most(value: f64) -> bf16 {
        let nearest = Self::from_f64(value);
        if nearest.to_f64() > value && nearest > Self::MIN_VALUE {
            bf16::from_bits(next_down_bits(nearest.to_bits()))
        } else {
            nearest
        }
    }
}

impl Storage for F16 {
    const DATA_TYPE: DataType = DataType::F16;
    type Native = f16;
    const MIN_VALUE: f16 = f16::MIN;
    const MAX_VALUE: f16 = f16::MAX;

    fn to_f64(value: f16) -> f64 {
        value.to_f64()
    }

    fn from_f64(value: f64) -> f16 {
        f16::from_f64(saturate(value, Self::MIN_VALUE.to_f64(), Self::MAX_VALUE.to_f64()))
    }

    fn from_f64_at_least(value: f64) -> f16 {
        let nearest = Self::from_f64(value);
        if nearest.to_f64() < value && nearest < Self::MAX_VALUE {
            f16::from_bits(next_up_bits(nearest.to_bits()))
        } else {
            nearest
        }
    }

    fn from_f64_at_most(value: f64) -> f16 {
        let nearest = Self::from_f64(value);
        if nearest.to_f64() > value && nearest > Self::MIN_VALUE {
            f16::from_bits(next_down_bits(nearest.to_bits()))
        } else {
            nearest
        }
    }
}

impl Storage for F32 {
    const DATA_TYPE: DataType = DataType::F32;
    type Native = f32;
    const MIN_VALUE: f32 = f32::MIN;
    const MAX_VALUE: f32 = f32::MAX;

    fn to_f64(value: f32) -> f64 {
        f64::from(value)
    }

    fn from_f64(value: f64) -> f32 {
        saturate(value, f64::from(f32::MIN), f64::from(f32::MAX)) as f32
    }

    fn from_f64_at_least(value: f64) -> f32 {
        let nearest = Self::from_f64(value);
        if f64::from(nearest) < value && nearest < Self::MAX_VALUE {
            nearest.next_up()
        } else {
            nearest
        }
    }

    fn from_f64_at_most(value: f64) -> f32 {
        let nearest = Self::from_f64(value);
        if f64::from(nearest) > value && nearest > Self::MIN_VALUE {
            nearest.next_down()
        } else {
            nearest
        }
    }
}

// Neighbouring finite 16-bit floats, for bit patterns that are neither NaN
// nor the largest finite value in the stepping direction. Sign-magnitude
// layout: stepping away from zero increments the magnitude.
fn next_up_bits(bits: u16) -> u16 {
    const SIGN: u16 = 0x8000;
    if bits & !SIGN == 0 {
        1
    } else if bits & SIGN == 0 {
        bits + 1
    } else {
        bits - 1
    }
}

fn next_down_bits(bits: u16) -> u16 {
    const SIGN: u16 = 0x8000;
    if bits & !SIGN == 0 {
        SIGN | 1
    } else if bits & SIGN == 0 {
        bits - 1
    } else {
        bits + 1
    }
}

// NaN passes through unchanged.
fn saturate(value: f64, lowest: f64, highest: f64) -> f64 {
    if value < lowest {
        lowest
    } else if value > highest {
        highest
    } else {
        value
    }
}
