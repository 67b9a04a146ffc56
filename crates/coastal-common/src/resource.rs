//! Resource identity and request construction.
//!
//! A resource is an endpoint plus a list of per-variable hyperslab
//! selections. The rendered URL doubles as the cache key, so two requests
//! for the same slices always share one cache entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The datasets this client knows how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Profile,
    Catalog,
    Areas,
    ReferencePoints,
    WaterLevels,
    Coastline,
}

impl DatasetKind {
    /// Stable name used for log fields, slots and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Profile => "profile",
            DatasetKind::Catalog => "catalog",
            DatasetKind::Areas => "areas",
            DatasetKind::ReferencePoints => "reference_points",
            DatasetKind::WaterLevels => "water_levels",
            DatasetKind::Coastline => "coastline",
        }
    }

    pub fn all() -> &'static [DatasetKind] {
        &[
            DatasetKind::Profile,
            DatasetKind::Catalog,
            DatasetKind::Areas,
            DatasetKind::ReferencePoints,
            DatasetKind::WaterLevels,
            DatasetKind::Coastline,
        ]
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bracketed dimension selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SliceExpr {
    /// A single position, rendered `[i]`.
    Index(usize),
    /// An inclusive strided range, rendered `[start:stride:end]`.
    Range {
        start: usize,
        stride: usize,
        end: usize,
    },
}

impl SliceExpr {
    /// Select every position of an axis of length `len`.
    ///
    /// Returns `None` for an empty axis, which cannot be expressed as a slice.
    pub fn all(len: usize) -> Option<Self> {
        len.checked_sub(1).map(|end| SliceExpr::Range {
            start: 0,
            stride: 1,
            end,
        })
    }

    /// Number of positions the slice selects.
    pub fn len(&self) -> usize {
        match *self {
            SliceExpr::Index(_) => 1,
            SliceExpr::Range { start, stride, end } => {
                if end < start || stride == 0 {
                    0
                } else {
                    (end - start) / stride + 1
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for SliceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceExpr::Index(i) => write!(f, "[{}]", i),
            SliceExpr::Range { start, stride, end } => write!(f, "[{}:{}:{}]", start, stride, end),
        }
    }
}

/// A variable projected with zero or more dimension slices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableSlice {
    pub name: String,
    pub slices: Vec<SliceExpr>,
}

impl VariableSlice {
    pub fn new(name: impl Into<String>, slices: Vec<SliceExpr>) -> Self {
        Self {
            name: name.into(),
            slices,
        }
    }

    /// The whole variable, with no constraint.
    pub fn whole(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

impl fmt::Display for VariableSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for slice in &self.slices {
            write!(f, "{}", slice)?;
        }
        Ok(())
    }
}

/// A fully described request for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub endpoint: String,
    pub kind: DatasetKind,
    pub variables: Vec<VariableSlice>,
}

impl ResourceRequest {
    pub fn new(endpoint: impl Into<String>, kind: DatasetKind) -> Self {
        Self {
            endpoint: endpoint.into(),
            kind,
            variables: Vec::new(),
        }
    }

    /// Add a projected variable.
    pub fn with_variable(mut self, variable: VariableSlice) -> Self {
        self.variables.push(variable);
        self
    }

    /// ASCII rendering URL: `<endpoint>.ascii?var[..],var[..]`.
    pub fn url(&self) -> String {
        let projection = self
            .variables
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let endpoint = self.endpoint.trim_end_matches('/');
        if projection.is_empty() {
            format!("{}.ascii", endpoint)
        } else {
            format!("{}.ascii?{}", endpoint, projection)
        }
    }

    /// Cache key identifying this resource.
    pub fn cache_key(&self) -> String {
        self.url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_rendering() {
        assert_eq!(SliceExpr::Index(7).to_string(), "[7]");
        assert_eq!(SliceExpr::all(3).unwrap().to_string(), "[0:1:2]");
        assert!(SliceExpr::all(0).is_none());
    }

    #[test]
    fn test_slice_len() {
        assert_eq!(SliceExpr::Index(4).len(), 1);
        assert_eq!(
            SliceExpr::Range {
                start: 0,
                stride: 2,
                end: 9
            }
            .len(),
            5
        );
    }

    #[test]
    fn test_request_url() {
        let request = ResourceRequest::new("https://example.org/dodsC/transect.nc", DatasetKind::Profile)
            .with_variable(VariableSlice::whole("cross_shore"))
            .with_variable(VariableSlice::new(
                "altitude",
                vec![
                    SliceExpr::all(2).unwrap(),
                    SliceExpr::Index(11),
                    SliceExpr::all(3).unwrap(),
                ],
            ));
        assert_eq!(
            request.url(),
            "https://example.org/dodsC/transect.nc.ascii?cross_shore,altitude[0:1:1][11][0:1:2]"
        );
        assert_eq!(request.cache_key(), request.url());
    }
}
