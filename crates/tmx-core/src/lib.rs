#![forbid(unsafe_code)]

#[cfg(test)]
pub mod proptest_strategies;
pub mod storage;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use storage::Storage;

/// Index of the dimension a per-axis quantization applies along.
pub type Axis = usize;

/// How values of a data type are generated and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericCategory {
    Boolean,
    Integer,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataType {
    I1,
    SI4,
    SI8,
    SI16,
    SI32,
    BF16,
    F16,
    F32,
}

impl DataType {
    pub const ALL: [Self; 8] = [
        Self::I1,
        Self::SI4,
        Self::SI8,
        Self::SI16,
        Self::SI32,
        Self::BF16,
        Self::F16,
        Self::F32,
    ];

    /// Display tag used when naming test combinations.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I1 => "I1",
            Self::SI4 => "SI4",
            Self::SI8 => "SI8",
            Self::SI16 => "SI16",
            Self::SI32 => "SI32",
            Self::BF16 => "BF16",
            Self::F16 => "F16",
            Self::F32 => "F32",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|data_type| data_type.name().eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub const fn category(self) -> NumericCategory {
        match self {
            Self::I1 => NumericCategory::Boolean,
            Self::SI4 | Self::SI8 | Self::SI16 | Self::SI32 => NumericCategory::Integer,
            Self::BF16 | Self::F16 | Self::F32 => NumericCategory::Float,
        }
    }

    #[must_use]
    pub const fn bit_width(self) -> u32 {
        match self {
            Self::I1 => 1,
            Self::SI4 => 4,
            Self::SI8 => 8,
            Self::SI16 | Self::BF16 | Self::F16 => 16,
            Self::SI32 | Self::F32 => 32,
        }
    }

    #[must_use]
    pub const fn is_bool(self) -> bool {
        matches!(self.category(), NumericCategory::Boolean)
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self.category(), NumericCategory::Integer)
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self.category(), NumericCategory::Float)
    }

    /// Smallest representable value, widened to `f64`.
    #[must_use]
    pub fn min_value(self) -> f64 {
        self.dispatch(StorageBound::Min)
    }

    /// Largest representable value, widened to `f64`.
    #[must_use]
    pub fn max_value(self) -> f64 {
        self.dispatch(StorageBound::Max)
    }

    /// Round `value` to the nearest value this type can hold, saturating at
    /// the type's bounds.
    #[must_use]
    pub fn narrow(self, value: f64) -> f64 {
        self.dispatch(StorageBound::Narrow(value))
    }

    fn dispatch(self, op: StorageBound) -> f64 {
        fn apply<S: Storage>(op: StorageBound) -> f64 {
            match op {
                StorageBound::Min => S::to_f64(S::MIN_VALUE),
                StorageBound::Max => S::to_f64(S::MAX_VALUE),
                StorageBound::Narrow(value) => S::to_f64(S::from_f64(value)),
            }
        }

        match self {
            Self::I1 => apply::<storage::I1>(op),
            Self::SI4 => apply::<storage::SI4>(op),
            Self::SI8 => apply::<storage::SI8>(op),
            Self::SI16 => apply::<storage::SI16>(op),
            Self::SI32 => apply::<storage::SI32>(op),
            Self::BF16 => apply::<storage::BF16>(op),
            Self::F16 => apply::<storage::F16>(op),
            Self::F32 => apply::<storage::F32>(op),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
enum StorageBound {
    Min,
    Max,
    Narrow(f64),
}

/// Tensor dimensions. The element count is checked to fit in `usize` at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct Shape {
    dims: Vec<u32>,
}

impl Shape {
    pub fn new(dims: impl Into<Vec<u32>>) -> Result<Self, CoreError> {
        let dims = dims.into();
        if element_count(&dims).is_none() {
            return Err(CoreError::ShapeOverflow { dims });
        }
        Ok(Self { dims })
    }

    #[must_use]
    pub fn scalar() -> Self {
        Self { dims: Vec::new() }
    }

    #[must_use]
    pub fn vector(len: u32) -> Self {
        Self { dims: vec![len] }
    }

    #[must_use]
    pub fn dims(&self) -> &[u32] {
        &self.dims
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[must_use]
    pub fn num_elements(&self) -> usize {
        // Checked in `new`; vectors and scalars cannot overflow.
        element_count(&self.dims).unwrap_or(usize::MAX)
    }
}

impl TryFrom<Vec<u32>> for Shape {
    type Error = CoreError;

    fn try_from(dims: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(dims)
    }
}

impl From<Shape> for Vec<u32> {
    fn from(shape: Shape) -> Self {
        shape.dims
    }
}

fn element_count(dims: &[u32]) -> Option<usize> {
    dims.iter().try_fold(1_usize, |acc, dim| {
        acc.checked_mul(usize::try_from(*dim).ok()?)
    })
}

/// Quantization parameters attached to an integer storage type.
///
/// Scales are kept as `f32` after being narrowed to the expressed type, which
/// is lossless for every float [`DataType`]. Zero points fit in `i32` for every
/// integer storage type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantizedElementType {
    storage_type: DataType,
    expressed_type: DataType,
    scales: SmallVec<[f32; 1]>,
    zero_points: SmallVec<[i32; 1]>,
    quantized_dimension: Option<Axis>,
}

impl QuantizedElementType {
    pub fn per_tensor(
        storage_type: DataType,
        expressed_type: DataType,
        scale: f32,
        zero_point: i32,
    ) -> Result<Self, CoreError> {
        check_quantized_pair(storage_type, expressed_type)?;
        Ok(Self {
            storage_type,
            expressed_type,
            scales: SmallVec::from_buf([expressed_type.narrow(f64::from(scale)) as f32]),
            zero_points: SmallVec::from_buf([zero_point]),
            quantized_dimension: None,
        })
    }

    /// Builds a per-axis element type. The scale and zero-point vectors are
    /// taken as given; they may be empty and are not checked against each
    /// other or against any shape.
    pub fn per_axis(
        storage_type: DataType,
        expressed_type: DataType,
        scales: impl IntoIterator<Item = f32>,
        zero_points: impl IntoIterator<Item = i32>,
        quantized_dimension: Axis,
    ) -> Result<Self, CoreError> {
        check_quantized_pair(storage_type, expressed_type)?;
        Ok(Self {
            storage_type,
            expressed_type,
            scales: scales
                .into_iter()
                .map(|scale| expressed_type.narrow(f64::from(scale)) as f32)
                .collect(),
            zero_points: zero_points.into_iter().collect(),
            quantized_dimension: Some(quantized_dimension),
        })
    }

    #[must_use]
    pub fn storage_type(&self) -> DataType {
        self.storage_type
    }

    #[must_use]
    pub fn expressed_type(&self) -> DataType {
        self.expressed_type
    }

    #[must_use]
    pub fn is_per_tensor(&self) -> bool {
        self.quantized_dimension.is_none()
    }

    #[must_use]
    pub fn is_per_axis(&self) -> bool {
        self.quantized_dimension.is_some()
    }

    #[must_use]
    pub fn quantized_dimension(&self) -> Option<Axis> {
        self.quantized_dimension
    }

    #[must_use]
    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    #[must_use]
    pub fn zero_points(&self) -> &[i32] {
        &self.zero_points
    }
}

fn check_quantized_pair(storage_type: DataType, expressed_type: DataType) -> Result<(), CoreError> {
    if !storage_type.is_integer() {
        return Err(CoreError::NonIntegerStorage {
            storage: storage_type,
        });
    }
    if !expressed_type.is_float() {
        return Err(CoreError::NonFloatExpressed {
            expressed: expressed_type,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorType {
    pub shape: Shape,
    pub element_type: DataType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantizedTensorType {
    pub shape: Shape,
    pub element_type: QuantizedElementType,
}

/// Either kind of tensor type, as handed to a tensor constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TensorTypeVariant {
    Tensor(TensorType),
    Quantized(QuantizedTensorType),
}

impl TensorTypeVariant {
    #[must_use]
    pub fn shape(&self) -> &Shape {
        match self {
            Self::Tensor(tensor) => &tensor.shape,
            Self::Quantized(tensor) => &tensor.shape,
        }
    }

    #[must_use]
    pub fn storage_type(&self) -> DataType {
        match self {
            Self::Tensor(tensor) => tensor.element_type,
            Self::Quantized(tensor) => tensor.element_type.storage_type(),
        }
    }

    #[must_use]
    pub fn as_quantized(&self) -> Option<&QuantizedTensorType> {
        match self {
            Self::Tensor(_) => None,
            Self::Quantized(tensor) => Some(tensor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    ShapeOverflow { dims: Vec<u32> },
    NonIntegerStorage { storage: DataType },
    NonFloatExpressed { expressed: DataType },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShapeOverflow { dims } => {
                write!(f, "shape element count overflowed: {dims:?}")
            }
            Self::NonIntegerStorage { storage } => {
                write!(f, "quantized storage type must be an integer, got {storage}")
            }
            Self::NonFloatExpressed { expressed } => {
                write!(f, "quantized expressed type must be a float, got {expressed}")
            }
        }
    }
}

impl std::error::Error for CoreError {}
