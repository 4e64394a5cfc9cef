use crate::{DataType, Shape};
use proptest::prelude::*;

pub fn arb_data_type() -> impl Strategy<Value = DataType> {
    prop::sample::select(DataType::ALL.to_vec())
}

pub fn arb_integer_type() -> impl Strategy<Value = DataType> {
    prop::sample::select(vec![DataType::SI4, DataType::SI8, DataType::SI16, DataType::SI32])
}

pub fn arb_float_type() -> impl Strategy<Value = DataType> {
    prop::sample::select(vec![DataType::BF16, DataType::F16, DataType::F32])
}

/// Small shapes, rank 0 to 4, at most 8 per dimension.
pub fn arb_shape() -> impl Strategy<Value = Shape> {
    prop::collection::vec(0_u32..=8, 0..=4).prop_map(|dims| {
        Shape::new(dims).unwrap_or_else(|err| panic!("small shapes cannot overflow: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::{arb_float_type, arb_integer_type};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_category_strategies_are_consistent(
            int_type in arb_integer_type(),
            float_type in arb_float_type(),
        ) {
            prop_assert!(int_type.is_integer());
            prop_assert!(float_type.is_float());
        }

        #[test]
        fn prop_quantized_pairs_from_strategies_are_valid(
            storage in arb_integer_type(),
            expressed in arb_float_type(),
            scale in 0.5_f32..=1.5,
        ) {
            let element = crate::QuantizedElementType::per_tensor(storage, expressed, scale, 0);
            prop_assert!(element.is_ok());
        }
    }
}
