//! Descriptors for one point of a test matrix.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tmx_core::{Axis, CoreError, DataType};

use crate::MatrixError;

/// A storage type, plus the expressed type when the storage is quantized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestParam {
    storage: DataType,
    expressed: Option<DataType>,
}

impl TestParam {
    #[must_use]
    pub const fn new(storage: DataType) -> Self {
        Self {
            storage,
            expressed: None,
        }
    }

    /// Integer storage paired with a float expressed type.
    pub fn quantized(storage: DataType, expressed: DataType) -> Result<Self, MatrixError> {
        if !storage.is_integer() {
            return Err(CoreError::NonIntegerStorage { storage }.into());
        }
        if !expressed.is_float() {
            return Err(CoreError::NonFloatExpressed { expressed }.into());
        }
        Ok(Self::quantized_unchecked(storage, expressed))
    }

    pub(crate) const fn quantized_unchecked(storage: DataType, expressed: DataType) -> Self {
        Self {
            storage,
            expressed: Some(expressed),
        }
    }

    #[must_use]
    pub const fn storage(self) -> DataType {
        self.storage
    }

    #[must_use]
    pub const fn expressed(self) -> Option<DataType> {
        self.expressed
    }

    #[must_use]
    pub const fn is_quantized(self) -> bool {
        self.expressed.is_some()
    }

    /// Storage type first, then the expressed type if any.
    pub fn types(self) -> impl Iterator<Item = DataType> {
        std::iter::once(self.storage).chain(self.expressed)
    }
}

impl From<DataType> for TestParam {
    fn from(storage: DataType) -> Self {
        Self::new(storage)
    }
}

/// One dimension value: a descriptor, optionally tagged with how its tensor
/// should be quantized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Param {
    Plain(TestParam),
    PerTensor(TestParam),
    PerAxis { param: TestParam, axis: Axis },
}

impl Param {
    pub fn per_tensor(param: TestParam) -> Result<Self, MatrixError> {
        require_expressed(param)?;
        Ok(Self::PerTensor(param))
    }

    pub fn per_axis(param: TestParam, axis: Axis) -> Result<Self, MatrixError> {
        require_expressed(param)?;
        Ok(Self::PerAxis { param, axis })
    }

    #[must_use]
    pub const fn param(self) -> TestParam {
        match self {
            Self::Plain(param) | Self::PerTensor(param) | Self::PerAxis { param, .. } => param,
        }
    }

    #[must_use]
    pub const fn storage(self) -> DataType {
        self.param().storage()
    }

    #[must_use]
    pub const fn expressed(self) -> Option<DataType> {
        self.param().expressed()
    }

    #[must_use]
    pub const fn axis(self) -> Option<Axis> {
        match self {
            Self::PerAxis { axis, .. } => Some(axis),
            Self::Plain(_) | Self::PerTensor(_) => None,
        }
    }

    #[must_use]
    pub const fn is_per_tensor(self) -> bool {
        matches!(self, Self::PerTensor(_))
    }

    #[must_use]
    pub const fn is_per_axis(self) -> bool {
        matches!(self, Self::PerAxis { .. })
    }
}

impl From<TestParam> for Param {
    fn from(param: TestParam) -> Self {
        Self::Plain(param)
    }
}

impl From<DataType> for Param {
    fn from(storage: DataType) -> Self {
        Self::Plain(TestParam::new(storage))
    }
}

pub(crate) fn require_expressed(param: TestParam) -> Result<DataType, MatrixError> {
    param.expressed().ok_or(MatrixError::MissingExpressedType {
        storage: param.storage(),
    })
}

/// One point of a cross product: an element per input list, in list order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tuple<T>(SmallVec<[T; 4]>);

pub type ParamTuple = Tuple<Param>;

impl<T> Tuple<T> {
    #[must_use]
    pub fn empty() -> Self {
        Self(SmallVec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub(crate) fn push(&mut self, value: T) {
        self.0.push(value);
    }
}

impl<T: Clone> Tuple<T> {
    /// Destructures into exactly `N` elements.
    pub fn as_array<const N: usize>(&self) -> Result<[T; N], MatrixError> {
        <[T; N]>::try_from(self.0.to_vec()).map_err(|elements| MatrixError::ArityMismatch {
            expected: N,
            actual: elements.len(),
        })
    }
}

impl<T> Default for Tuple<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> FromIterator<T> for Tuple<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a Tuple<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Param, ParamTuple, TestParam, Tuple};
    use crate::MatrixError;
    use tmx_core::{CoreError, DataType};

    #[test]
    fn plain_param_has_no_expressed_type() {
        let param = TestParam::new(DataType::SI16);
        assert_eq!(param.storage(), DataType::SI16);
        assert_eq!(param.expressed(), None);
        assert!(!param.is_quantized());
        assert_eq!(param.types().collect::<Vec<_>>(), vec![DataType::SI16]);
    }

    #[test]
    fn quantized_param_validates_pair() {
        let param = TestParam::quantized(DataType::SI8, DataType::BF16).expect("valid pair");
        assert_eq!(
            param.types().collect::<Vec<_>>(),
            vec![DataType::SI8, DataType::BF16]
        );
        assert_eq!(
            TestParam::quantized(DataType::F32, DataType::F32),
            Err(MatrixError::Core(CoreError::NonIntegerStorage {
                storage: DataType::F32
            }))
        );
        assert_eq!(
            TestParam::quantized(DataType::SI8, DataType::I1),
            Err(MatrixError::Core(CoreError::NonFloatExpressed {
                expressed: DataType::I1
            }))
        );
    }

    #[test]
    fn quantization_modes_require_expressed_type() {
        let plain = TestParam::new(DataType::SI8);
        assert_eq!(
            Param::per_tensor(plain),
            Err(MatrixError::MissingExpressedType {
                storage: DataType::SI8
            })
        );
        assert!(Param::per_axis(plain, 1).is_err());

        let quantized = TestParam::quantized(DataType::SI4, DataType::F16).expect("valid pair");
        let per_axis = Param::per_axis(quantized, 3).expect("per-axis");
        assert_eq!(per_axis.axis(), Some(3));
        assert!(per_axis.is_per_axis());
        assert_eq!(per_axis.storage(), DataType::SI4);
        assert_eq!(per_axis.expressed(), Some(DataType::F16));
        assert!(Param::per_tensor(quantized).expect("per-tensor").is_per_tensor());
    }

    #[test]
    fn conversions_build_plain_params() {
        assert_eq!(
            Param::from(DataType::F32),
            Param::Plain(TestParam::new(DataType::F32))
        );
        assert_eq!(Param::from(DataType::F32).axis(), None);
    }

    #[test]
    fn tuple_as_array_checks_arity() {
        let tuple: ParamTuple = [Param::from(DataType::SI8), Param::from(DataType::F32)]
            .into_iter()
            .collect();
        let [first, second] = tuple.as_array::<2>().expect("arity 2");
        assert_eq!(first.storage(), DataType::SI8);
        assert_eq!(second.storage(), DataType::F32);
        assert_eq!(
            tuple.as_array::<3>(),
            Err(MatrixError::ArityMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn empty_tuple() {
        let tuple: Tuple<Param> = Tuple::empty();
        assert!(tuple.is_empty());
        assert_eq!(tuple.as_array::<0>(), Ok([]));
        assert_eq!(tuple.iter().count(), 0);
    }

    #[test]
    fn params_serialize_as_tagged_json() {
        let param = Param::per_axis(
            TestParam::quantized(DataType::SI8, DataType::F32).expect("valid pair"),
            2,
        )
        .expect("per-axis");
        let json = serde_json::to_string(&param).expect("serialize");
        let back: Param = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, param);
    }
}
