//! Canonical property name → row/column position mapping.
//!
//! Every access into the distance table and the similarity matrices goes
//! through this index. Positions are never assumed from file order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{EstateError, EstateResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PropertyIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl PropertyIndex {
    /// Build an index from names in canonical order. Duplicates and blank
    /// names are rejected.
    pub fn from_names(names: Vec<String>) -> EstateResult<Self> {
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(EstateError::ArtifactLoad(format!(
                    "Blank property name at row {i}"
                )));
            }
            if positions.insert(name.clone(), i).is_some() {
                return Err(EstateError::ArtifactLoad(format!(
                    "Duplicate property name '{name}'"
                )));
            }
        }
        Ok(Self { names, positions })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Resolve a user-supplied property name.
    pub fn resolve(&self, name: &str) -> EstateResult<usize> {
        self.position(name)
            .ok_or_else(|| EstateError::InvalidInput(format!("Unknown property '{name}'")))
    }

    /// Name at a canonical position.
    pub fn name(&self, position: usize) -> &str {
        &self.names[position]
    }

    /// Names sorted alphabetically, as offered in selection lists.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.names.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted
    }
}

impl TryFrom<Vec<String>> for PropertyIndex {
    type Error = EstateError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_names(names)
    }
}

impl From<PropertyIndex> for Vec<String> {
    fn from(index: PropertyIndex) -> Self {
        index.names
    }
}
