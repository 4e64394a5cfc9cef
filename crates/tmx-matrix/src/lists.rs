//! Predefined dimension lists and per-op default storage types.

use tmx_core::{Axis, DataType};

use crate::algebra::{concat, map};
use crate::param::{Param, TestParam};

const BOOL_TYPES: [DataType; 1] = [DataType::I1];
const INT_TYPES: [DataType; 4] = [DataType::SI4, DataType::SI8, DataType::SI16, DataType::SI32];
const FLOAT_TYPES: [DataType; 3] = [DataType::BF16, DataType::F16, DataType::F32];

/// Supported (storage, expressed) pairs. Wider expressed types come first.
const QUANTIZED_PAIRS: [(DataType, DataType); 7] = [
    (DataType::SI4, DataType::F32),
    (DataType::SI8, DataType::F32),
    (DataType::SI16, DataType::F32),
    (DataType::SI4, DataType::BF16),
    (DataType::SI8, DataType::BF16),
    (DataType::SI4, DataType::F16),
    (DataType::SI8, DataType::F16),
];

fn plain(types: &[DataType]) -> Vec<Param> {
    map(|&storage| Param::from(storage), types)
}

#[must_use]
pub fn bool_test_types() -> Vec<Param> {
    plain(&BOOL_TYPES)
}

#[must_use]
pub fn int_test_types() -> Vec<Param> {
    plain(&INT_TYPES)
}

#[must_use]
pub fn float_test_types() -> Vec<Param> {
    plain(&FLOAT_TYPES)
}

/// Integer types followed by float types.
#[must_use]
pub fn arithmetic_test_types() -> Vec<Param> {
    concat(&[int_test_types(), float_test_types()])
}

/// Every supported storage/expressed pair, not yet tied to a quantization
/// mode. Wrap with [`per_tensor_quantized_test_types`] or
/// [`per_axis_quantized_test_types`] before building tensor types.
#[must_use]
pub fn quantized_test_types() -> Vec<Param> {
    QUANTIZED_PAIRS
        .iter()
        .map(|&(storage, expressed)| {
            Param::Plain(TestParam::quantized_unchecked(storage, expressed))
        })
        .collect()
}

#[must_use]
pub fn per_tensor_quantized_test_types() -> Vec<Param> {
    map(|param| Param::PerTensor(param.param()), &quantized_test_types())
}

/// Quantized pairs along axis 0.
#[must_use]
pub fn per_axis_quantized_test_types() -> Vec<Param> {
    per_axis_quantized_test_types_on(0)
}

#[must_use]
pub fn per_axis_quantized_test_types_on(axis: Axis) -> Vec<Param> {
    map(
        |param| Param::PerAxis {
            param: param.param(),
            axis,
        },
        &quantized_test_types(),
    )
}

/// Storage type a generic test exercises when it does not care which one.
///
/// Ops opt in with an empty impl to get [`DataType::F32`], or override
/// `STORAGE_TYPE`.
pub trait SupportedOpDataType {
    const STORAGE_TYPE: DataType = DataType::F32;
}

#[must_use]
pub const fn supported_storage_type<Op: SupportedOpDataType>() -> DataType {
    Op::STORAGE_TYPE
}

#[must_use]
pub const fn supported_test_param<Op: SupportedOpDataType>() -> Param {
    Param::Plain(TestParam::new(Op::STORAGE_TYPE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{cross_product, filter};
    use crate::naming::{ParamName, case_names};
    use rustc_hash::FxHashSet;

    struct Abs;
    impl SupportedOpDataType for Abs {}

    struct Not;
    impl SupportedOpDataType for Not {
        const STORAGE_TYPE: DataType = DataType::I1;
    }

    #[test]
    fn plain_lists_cover_each_category() {
        assert_eq!(case_names(&bool_test_types()), vec!["I1"]);
        assert_eq!(
            case_names(&int_test_types()),
            vec!["SI4", "SI8", "SI16", "SI32"]
        );
        assert_eq!(case_names(&float_test_types()), vec!["BF16", "F16", "F32"]);
        assert_eq!(
            case_names(&arithmetic_test_types()),
            vec!["SI4", "SI8", "SI16", "SI32", "BF16", "F16", "F32"]
        );
    }

    #[test]
    fn quantized_lists_follow_pair_order() {
        assert_eq!(
            case_names(&quantized_test_types()),
            vec![
                "SI4_F32", "SI8_F32", "SI16_F32", "SI4_BF16", "SI8_BF16", "SI4_F16", "SI8_F16"
            ]
        );
        let per_tensor = per_tensor_quantized_test_types();
        assert!(per_tensor.iter().all(|p| p.is_per_tensor()));
        assert_eq!(per_tensor[0].param_name(), "PerTensor[SI4_F32]");

        let per_axis = per_axis_quantized_test_types();
        assert!(per_axis.iter().all(|p| p.axis() == Some(0)));
        assert_eq!(per_axis[6].param_name(), "PerAxis[SI8_F16:0]");
        assert_eq!(
            per_axis_quantized_test_types_on(3)[1].param_name(),
            "PerAxis[SI8_F32:3]"
        );
    }

    #[test]
    fn quantized_pairs_are_valid() {
        for param in quantized_test_types() {
            let descriptor = param.param();
            let expressed = descriptor.expressed().expect("expressed type");
            assert_eq!(
                TestParam::quantized(descriptor.storage(), expressed),
                Ok(descriptor)
            );
        }
    }

    #[test]
    fn supported_op_data_type_defaults_to_f32() {
        assert_eq!(supported_storage_type::<Abs>(), DataType::F32);
        assert_eq!(supported_storage_type::<Not>(), DataType::I1);
        assert_eq!(supported_test_param::<Not>().param_name(), "I1");
    }

    #[test]
    fn filter_selects_integer_storage() {
        let integers = filter(|p: &Param| p.storage().is_integer(), &arithmetic_test_types());
        assert_eq!(integers, int_test_types());
    }

    #[test]
    fn names_are_unique_across_predefined_products() {
        let dimensions = [
            bool_test_types(),
            arithmetic_test_types(),
            quantized_test_types(),
            per_tensor_quantized_test_types(),
            per_axis_quantized_test_types(),
            per_axis_quantized_test_types_on(1),
        ];
        let all: Vec<Param> = concat(&dimensions);

        let mut seen = FxHashSet::default();
        for name in case_names(&all) {
            assert!(seen.insert(name.clone()), "duplicate name {name}");
        }

        let pairs = cross_product::<Param, _>(&[all.clone(), all]);
        let mut seen = FxHashSet::default();
        for tuple in &pairs {
            let name = tuple.param_name();
            assert!(seen.insert(name.clone()), "duplicate name {name}");
        }
        assert_eq!(seen.len(), pairs.len());
    }
}
