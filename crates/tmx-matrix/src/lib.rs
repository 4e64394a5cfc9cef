#![forbid(unsafe_code)]

//! Test-matrix generation for tensor operation tests.
//!
//! Dimension lists of [`Param`] values are combined with the list algebra in
//! [`algebra`], named with [`ParamName`], and turned into concrete tensor
//! types with [`tensor_type_for`]. Input data comes from `tmx_sample`.

pub mod algebra;
pub mod errors;
pub mod factory;
pub mod lists;
pub mod manifest;
pub mod naming;
pub mod param;

pub use algebra::{all_same, concat, cross_product, filter, map, negate, try_map, with_op};
pub use errors::MatrixError;
pub use factory::{
    PER_TENSOR_SCALE_RANGE, PER_TENSOR_ZERO_POINT_RANGE, tensor_type_for, tensor_types_for,
};
pub use lists::{
    SupportedOpDataType, arithmetic_test_types, bool_test_types, float_test_types,
    int_test_types, per_axis_quantized_test_types, per_axis_quantized_test_types_on,
    per_tensor_quantized_test_types, quantized_test_types, supported_storage_type,
    supported_test_param,
};
pub use manifest::MatrixManifest;
pub use naming::{ParamName, case_names};
pub use param::{Param, ParamTuple, TestParam, Tuple};
