//! Page arithmetic for grid rows

/// How a grid splits its rows into pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
	pub per_page: usize,
	pub total_items: usize,
}

impl Pagination {
	/// A zero page length is treated as one row per page
	pub fn new(per_page: usize, total_items: usize) -> Self {
		Self {
			per_page: per_page.max(1),
			total_items,
		}
	}

	/// An empty grid has no pages
	pub fn total_pages(&self) -> usize {
		self.total_items.div_ceil(self.per_page)
	}
}
