use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::MatrixError;
use crate::naming::{ParamName, case_names};

/// The registered names of one matrix, with a digest over their order.
///
/// Two manifests share a digest exactly when they register the same names in
/// the same order under the same suite name, so a digest change flags a
/// renamed, added, dropped or reordered case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixManifest {
    pub suite: String,
    pub case_names: Vec<String>,
    pub digest_hex: String,
}

impl MatrixManifest {
    /// Names every combination and rejects the matrix if two share a name.
    pub fn build<T: ParamName>(suite: impl Into<String>, cases: &[T]) -> Result<Self, MatrixError> {
        let suite = suite.into();
        let names = case_names(cases);

        let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
        for (index, name) in names.iter().enumerate() {
            if let Some(first_index) = seen.insert(name.as_str(), index) {
                return Err(MatrixError::DuplicateName {
                    name: name.clone(),
                    first_index,
                    second_index: index,
                });
            }
        }

        let digest_hex = digest_names(&suite, &names);
        debug!(
            suite = %suite,
            cases = names.len(),
            digest = %digest_hex,
            "registered test matrix"
        );
        Ok(Self {
            suite,
            case_names: names,
            digest_hex,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.case_names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.case_names.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.case_names.iter().any(|case| case == name)
    }

    /// Short stable identifier: `tmx-` and the first 16 digest characters.
    #[must_use]
    pub fn key(&self) -> String {
        let short: String = self.digest_hex.chars().take(16).collect();
        format!("tmx-{short}")
    }
}

fn digest_names(suite: &str, names: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"tmx-matrix-v1|");
    hasher.update(suite.as_bytes());
    for name in names {
        hasher.update(b"\n");
        hasher.update(name.as_bytes());
    }
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}
