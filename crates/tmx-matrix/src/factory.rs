//! Tensor types for matrix parameters.

use rand::Rng;
use tmx_core::{
    QuantizedElementType, QuantizedTensorType, Shape, TensorType, TensorTypeVariant,
};
use tmx_sample::Sampler;
use tracing::trace;

use crate::MatrixError;
use crate::param::{Param, ParamTuple, require_expressed};

/// Range a per-tensor scale is drawn from, using the expressed type.
pub const PER_TENSOR_SCALE_RANGE: (f64, f64) = (0.5, 1.5);
/// Range a per-tensor zero point is drawn from, using the storage type.
pub const PER_TENSOR_ZERO_POINT_RANGE: (f64, f64) = (-5.0, 5.0);

/// Builds the tensor type `param` describes for a tensor of `shape`.
///
/// Per-tensor parameters get a freshly sampled scale and zero point. Per-axis
/// parameters come back with empty scale and zero-point vectors which the
/// caller fills in before use.
pub fn tensor_type_for<R: Rng + ?Sized>(
    param: &Param,
    shape: &Shape,
    rng: &mut R,
) -> Result<TensorTypeVariant, MatrixError> {
    let variant = match *param {
        Param::Plain(descriptor) => {
            if let Some(expressed) = descriptor.expressed() {
                return Err(MatrixError::UnwrappedQuantizedParam {
                    storage: descriptor.storage(),
                    expressed,
                });
            }
            TensorTypeVariant::Tensor(TensorType {
                shape: shape.clone(),
                element_type: descriptor.storage(),
            })
        }
        Param::PerTensor(descriptor) => {
            let storage = descriptor.storage();
            let expressed = require_expressed(descriptor)?;
            let (scale_low, scale_high) = PER_TENSOR_SCALE_RANGE;
            let (zero_low, zero_high) = PER_TENSOR_ZERO_POINT_RANGE;
            let scale = Sampler::for_type(expressed, scale_low, scale_high).sample(&mut *rng);
            let zero_point = Sampler::for_type(storage, zero_low, zero_high).sample(&mut *rng);
            TensorTypeVariant::Quantized(QuantizedTensorType {
                shape: shape.clone(),
                element_type: QuantizedElementType::per_tensor(
                    storage,
                    expressed,
                    scale as f32,
                    zero_point as i32,
                )?,
            })
        }
        Param::PerAxis { param: descriptor, axis } => {
            let expressed = require_expressed(descriptor)?;
            TensorTypeVariant::Quantized(QuantizedTensorType {
                shape: shape.clone(),
                element_type: QuantizedElementType::per_axis(
                    descriptor.storage(),
                    expressed,
                    [],
                    [],
                    axis,
                )?,
            })
        }
    };
    trace!(?param, dims = ?shape.dims(), "built tensor type");
    Ok(variant)
}

/// [`tensor_type_for`] applied to every element of a combination, all sharing
/// one shape.
pub fn tensor_types_for<R: Rng + ?Sized>(
    tuple: &ParamTuple,
    shape: &Shape,
    rng: &mut R,
) -> Result<Vec<TensorTypeVariant>, MatrixError> {
    tuple
        .iter()
        .map(|param| tensor_type_for(param, shape, &mut *rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{tensor_type_for, tensor_types_for};
    use crate::MatrixError;
    use crate::lists::{
        arithmetic_test_types, bool_test_types, per_axis_quantized_test_types_on,
        per_tensor_quantized_test_types, quantized_test_types,
    };
    use crate::param::{Param, ParamTuple, TestParam};
    use proptest::prelude::*;
    use tmx_core::{DataType, Shape, TensorTypeVariant};
    use tmx_sample::ThreefryRng;

    fn shape() -> Shape {
        Shape::new(vec![2, 3]).expect("shape")
    }

    #[test]
    fn plain_params_build_plain_tensor_types() {
        let mut rng = ThreefryRng::new(0);
        for param in bool_test_types().iter().chain(&arithmetic_test_types()) {
            let variant = tensor_type_for(param, &shape(), &mut rng).expect("plain");
            match variant {
                TensorTypeVariant::Tensor(tensor) => {
                    assert_eq!(tensor.element_type, param.storage());
                    assert_eq!(tensor.shape, shape());
                }
                TensorTypeVariant::Quantized(_) => panic!("{param:?} built a quantized type"),
            }
        }
    }

    #[test]
    fn per_tensor_params_sample_scale_and_zero_point() {
        let mut rng = ThreefryRng::new(17);
        for param in per_tensor_quantized_test_types() {
            for _ in 0..32 {
                let variant = tensor_type_for(&param, &shape(), &mut rng).expect("per-tensor");
                let quantized = variant.as_quantized().expect("quantized");
                let element = &quantized.element_type;
                assert!(element.is_per_tensor());
                assert_eq!(element.storage_type(), param.storage());
                assert_eq!(Some(element.expressed_type()), param.expressed());
                let scale = element.scales()[0];
                let zero_point = element.zero_points()[0];
                assert!((0.5..=1.5).contains(&scale), "scale {scale}");
                assert!((-5..=5).contains(&zero_point), "zero point {zero_point}");
                assert_eq!(
                    f64::from(scale),
                    element.expressed_type().narrow(f64::from(scale))
                );
            }
        }
    }

    #[test]
    fn per_axis_params_leave_vectors_empty() {
        let mut rng = ThreefryRng::new(5);
        for param in per_axis_quantized_test_types_on(1) {
            let variant = tensor_type_for(&param, &shape(), &mut rng).expect("per-axis");
            let quantized = variant.as_quantized().expect("quantized");
            assert!(quantized.element_type.is_per_axis());
            assert_eq!(quantized.element_type.quantized_dimension(), Some(1));
            assert!(quantized.element_type.scales().is_empty());
            assert!(quantized.element_type.zero_points().is_empty());
        }
    }

    #[test]
    fn unwrapped_quantized_params_are_rejected() {
        let mut rng = ThreefryRng::new(1);
        let param = quantized_test_types()[1];
        assert_eq!(
            tensor_type_for(&param, &shape(), &mut rng),
            Err(MatrixError::UnwrappedQuantizedParam {
                storage: DataType::SI8,
                expressed: DataType::F32,
            })
        );

        let bare = Param::PerTensor(TestParam::new(DataType::SI8));
        assert_eq!(
            tensor_type_for(&bare, &shape(), &mut rng),
            Err(MatrixError::MissingExpressedType {
                storage: DataType::SI8
            })
        );
    }

    #[test]
    fn tuple_tensor_types_keep_order() {
        let mut rng = ThreefryRng::new(9);
        let tuple: ParamTuple = [
            Param::from(DataType::F16),
            per_tensor_quantized_test_types()[0],
        ]
        .into_iter()
        .collect();
        let types = tensor_types_for(&tuple, &Shape::scalar(), &mut rng).expect("types");
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].storage_type(), DataType::F16);
        assert_eq!(types[1].storage_type(), DataType::SI4);
        assert!(types[1].as_quantized().is_some());
    }

    proptest! {
        #[test]
        fn prop_per_tensor_parameters_in_range(seed in any::<u64>(), index in 0_usize..7) {
            let mut rng = ThreefryRng::new(seed);
            let param = per_tensor_quantized_test_types()[index];
            let variant = tensor_type_for(&param, &shape(), &mut rng).expect("per-tensor");
            let element = &variant.as_quantized().expect("quantized").element_type;
            prop_assert!((0.5..=1.5).contains(&element.scales()[0]));
            prop_assert!((-5..=5).contains(&element.zero_points()[0]));
        }
    }
}
