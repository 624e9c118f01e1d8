//! Initial sort order of grid columns

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
	#[serde(rename = "asc")]
	Ascending,
	#[serde(rename = "desc")]
	Descending,
}

/// A column index and its direction
///
/// Serializes as the `[index, "dir"]` pair grid libraries take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOrder(pub usize, pub SortDirection);
