//! Display names for matrix combinations.
//!
//! A name is a pure function of the value it names. Type tags join with `_`,
//! quantization modes wrap their descriptor in brackets, and tuple elements
//! join with `:`.

use tmx_core::DataType;

use crate::param::{Param, TestParam, Tuple};

pub trait ParamName {
    fn param_name(&self) -> String;
}

impl ParamName for DataType {
    fn param_name(&self) -> String {
        self.name().to_owned()
    }
}

impl ParamName for TestParam {
    fn param_name(&self) -> String {
        self.types()
            .map(DataType::name)
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl ParamName for Param {
    fn param_name(&self) -> String {
        match self {
            Self::Plain(param) => param.param_name(),
            Self::PerTensor(param) => format!("PerTensor[{}]", param.param_name()),
            Self::PerAxis { param, axis } => format!("PerAxis[{}:{axis}]", param.param_name()),
        }
    }
}

impl<T: ParamName> ParamName for Tuple<T> {
    fn param_name(&self) -> String {
        join_names(self.iter())
    }
}

impl<T: ParamName + ?Sized> ParamName for &T {
    fn param_name(&self) -> String {
        (**self).param_name()
    }
}

impl<A: ParamName, B: ParamName> ParamName for (A, B) {
    fn param_name(&self) -> String {
        format!("{}:{}", self.0.param_name(), self.1.param_name())
    }
}

impl<A: ParamName, B: ParamName, C: ParamName> ParamName for (A, B, C) {
    fn param_name(&self) -> String {
        format!(
            "{}:{}:{}",
            self.0.param_name(),
            self.1.param_name(),
            self.2.param_name()
        )
    }
}

fn join_names<'a, T: ParamName + 'a>(values: impl Iterator<Item = &'a T>) -> String {
    values
        .map(ParamName::param_name)
        .collect::<Vec<_>>()
        .join(":")
}

/// Case names for every element, in list order.
#[must_use]
pub fn case_names<T: ParamName>(list: &[T]) -> Vec<String> {
    list.iter().map(ParamName::param_name).collect()
}
