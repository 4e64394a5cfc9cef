use tmx_core::{CoreError, DataType};

/// Registration-time rejection of a malformed test matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    ArityMismatch {
        expected: usize,
        actual: usize,
    },
    /// A per-tensor or per-axis mode wraps a descriptor with no expressed type.
    MissingExpressedType {
        storage: DataType,
    },
    /// A storage/expressed pair used without choosing per-tensor or per-axis
    /// quantization has no tensor type.
    UnwrappedQuantizedParam {
        storage: DataType,
        expressed: DataType,
    },
    DuplicateName {
        name: String,
        first_index: usize,
        second_index: usize,
    },
    Core(CoreError),
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArityMismatch { expected, actual } => {
                write!(
                    f,
                    "parameter tuple arity mismatch: expected {expected}, got {actual}"
                )
            }
            Self::MissingExpressedType { storage } => {
                write!(f, "quantized parameter {storage} has no expressed type")
            }
            Self::UnwrappedQuantizedParam { storage, expressed } => {
                write!(
                    f,
                    "parameter {storage}_{expressed} must be wrapped in PerTensor or PerAxis"
                )
            }
            Self::DuplicateName {
                name,
                first_index,
                second_index,
            } => {
                write!(
                    f,
                    "test case name {name:?} registered at {first_index} and {second_index}"
                )
            }
            Self::Core(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MatrixError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoreError> for MatrixError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}
