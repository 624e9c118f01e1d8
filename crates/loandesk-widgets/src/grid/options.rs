//! Grid configuration
//!
//! [`GridOptions`] serializes to the option object a grid library is created
//! with. Cell renderers cannot cross that boundary as data, so they are kept on
//! the Rust side and applied through [`CellRenderer::render`].

use loandesk_core::dom::{Dom, Selector};
use loandesk_core::numeric::{NumberFormat, RawValue, safe_number};
use serde::{Deserialize, Serialize};

use super::sorting::{ColumnOrder, SortDirection};

/// Column class marking columns that must not be sortable
pub const NO_SORT_CLASS: &str = "no-sort";
/// Column class rendered as currency
pub const CURRENCY_CLASS: &str = "currency";
/// Column class rendered as a percentage
pub const PERCENTAGE_CLASS: &str = "percentage";
/// Column type for formatted numbers
pub const NUMERIC_FORMATTED_TYPE: &str = "num-fmt";

/// Which columns a [`ColumnDef`] applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnTarget {
	/// Header cells carrying this class
	Class(String),
	/// Zero-based column indices
	Indices(Vec<usize>),
}

/// How a cell value is requested by the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
	Display,
	Type,
	Sort,
	Filter,
}

impl RenderKind {
	pub fn parse(kind: &str) -> Self {
		match kind {
			"display" => Self::Display,
			"type" => Self::Type,
			"sort" => Self::Sort,
			_ => Self::Filter,
		}
	}
}

/// Rendered cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
	Text(String),
	Number(f64),
}

/// Built-in cell renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellRenderer {
	Currency,
	Percentage,
}

impl CellRenderer {
	/// Formatted text for display and type detection, the plain number for
	/// sorting and filtering
	///
	/// # Examples
	///
	/// ```
	/// use loandesk_core::numeric::NumberFormat;
	/// use loandesk_widgets::grid::{CellRenderer, CellValue, RenderKind};
	///
	/// let format = NumberFormat::default();
	/// assert_eq!(
	/// 	CellRenderer::Currency.render(&format, "1500".into(), RenderKind::Display),
	/// 	CellValue::Text("₹1,500.00".into())
	/// );
	/// assert_eq!(
	/// 	CellRenderer::Currency.render(&format, "1500".into(), RenderKind::Sort),
	/// 	CellValue::Number(1500.0)
	/// );
	/// ```
	pub fn render(&self, format: &NumberFormat, data: RawValue<'_>, kind: RenderKind) -> CellValue {
		// cells already rendered by an earlier init carry the glyph and grouping
		let num = match (self, data) {
			(Self::Currency, RawValue::Text(text)) => format.parse_currency(text),
			(_, data) => safe_number(data, 0.0),
		};
		match kind {
			RenderKind::Display | RenderKind::Type => CellValue::Text(match self {
				Self::Currency => format.currency(num),
				Self::Percentage => format.percentage(num),
			}),
			RenderKind::Sort | RenderKind::Filter => CellValue::Number(num),
		}
	}
}

/// Per-column configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
	pub targets: ColumnTarget,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub orderable: Option<bool>,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub column_type: Option<String>,
	#[serde(skip)]
	pub renderer: Option<CellRenderer>,
}

impl ColumnDef {
	/// Columns that cannot be sorted
	pub fn not_orderable(targets: ColumnTarget) -> Self {
		Self {
			targets,
			orderable: Some(false),
			column_type: None,
			renderer: None,
		}
	}

	/// Formatted-number columns rendered through `renderer`
	pub fn rendered(targets: ColumnTarget, renderer: CellRenderer) -> Self {
		Self {
			targets,
			orderable: None,
			column_type: Some(NUMERIC_FORMATTED_TYPE.to_string()),
			renderer: Some(renderer),
		}
	}
}

/// User-facing grid strings; unset entries keep the library default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLanguage {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub length_menu: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub info: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub info_empty: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub info_filtered: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub zero_records: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub empty_table: Option<String>,
}

impl GridLanguage {
	/// Wording for generic record tables
	pub fn entries() -> Self {
		Self {
			search: Some("Search:".into()),
			length_menu: Some("Show _MENU_ entries".into()),
			info: Some("Showing _START_ to _END_ of _TOTAL_ entries".into()),
			info_empty: Some("No entries available".into()),
			info_filtered: Some("(filtered from _MAX_ total entries)".into()),
			zero_records: Some("No matching records found".into()),
			empty_table: Some("No data available in table".into()),
		}
	}
}

/// Options a grid is created with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
	/// Lets the library replace an existing instance
	pub destroy: bool,
	pub responsive: bool,
	pub page_length: usize,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub order: Vec<ColumnOrder>,
	pub language: GridLanguage,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub column_defs: Vec<ColumnDef>,
}

impl GridOptions {
	fn base(page_length: usize) -> Self {
		Self {
			destroy: true,
			responsive: true,
			page_length,
			order: Vec::new(),
			language: GridLanguage::default(),
			column_defs: Vec::new(),
		}
	}

	/// Generic record table: newest first, `no-sort` columns fixed,
	/// `currency`/`percentage` columns formatted
	pub fn standard(page_length: usize) -> Self {
		let mut options = Self::base(page_length)
			.with_order(0, SortDirection::Descending)
			.with_column_def(ColumnDef::not_orderable(ColumnTarget::Class(
				NO_SORT_CLASS.into(),
			)))
			.with_column_def(ColumnDef::rendered(
				ColumnTarget::Class(CURRENCY_CLASS.into()),
				CellRenderer::Currency,
			))
			.with_column_def(ColumnDef::rendered(
				ColumnTarget::Class(PERCENTAGE_CLASS.into()),
				CellRenderer::Percentage,
			));
		options.language = GridLanguage::entries();
		options
	}

	/// Customer summary on the reports page; column 7 holds the actions
	pub fn customer_summary(page_length: usize) -> Self {
		let mut options = Self::base(page_length)
			.with_order(0, SortDirection::Ascending)
			.with_column_def(ColumnDef::not_orderable(ColumnTarget::Indices(vec![7])));
		options.language = GridLanguage {
			search: Some("Search customers:".into()),
			length_menu: Some("Show _MENU_ customers".into()),
			info: Some("Showing _START_ to _END_ of _TOTAL_ customers".into()),
			..GridLanguage::default()
		};
		options
	}

	/// Customer master table; column 10 holds the actions
	pub fn customers(page_length: usize) -> Self {
		let mut options = Self::base(page_length)
			.with_column_def(ColumnDef::not_orderable(ColumnTarget::Indices(vec![10])));
		options.language = GridLanguage {
			search: Some("Search customers:".into()),
			empty_table: Some("No customers available".into()),
			..GridLanguage::default()
		};
		options
	}

	pub fn with_order(mut self, column: usize, direction: SortDirection) -> Self {
		self.order.push(ColumnOrder(column, direction));
		self
	}

	pub fn with_column_def(mut self, def: ColumnDef) -> Self {
		self.column_defs.push(def);
		self
	}

	/// Renderer configured for column `index` of `table`, if any
	pub fn renderer_for<D: Dom + ?Sized>(
		&self,
		dom: &D,
		table: &D::Node,
		index: usize,
	) -> Option<CellRenderer> {
		self.column_defs
			.iter()
			.filter(|def| def.renderer.is_some())
			.find(|def| resolve_columns(dom, table, &def.targets).contains(&index))
			.and_then(|def| def.renderer)
	}

	/// Option object handed to the grid library
	pub fn to_json(&self) -> serde_json::Value {
		serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
	}
}

/// Header cells of `table`: the first `thead` row, else the first row
pub fn header_cells<D: Dom + ?Sized>(dom: &D, table: &D::Node) -> Vec<D::Node> {
	let row = dom
		.query_selector(table, &Selector::tag("tr").inside(&Selector::tag("thead")))
		.or_else(|| dom.query_selector(table, &Selector::tag("tr")));
	row.map(|row| {
		dom.children_matching(&row, &Selector::tag("th").or(Selector::tag("td")))
	})
	.unwrap_or_default()
}

/// Column indices a target selects within `table`
pub fn resolve_columns<D: Dom + ?Sized>(
	dom: &D,
	table: &D::Node,
	target: &ColumnTarget,
) -> Vec<usize> {
	match target {
		ColumnTarget::Indices(indices) => indices.clone(),
		ColumnTarget::Class(class) => header_cells(dom, table)
			.iter()
			.enumerate()
			.filter(|(_, cell)| dom.has_class(cell, class))
			.map(|(i, _)| i)
			.collect(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use loandesk_core::dom::{MemoryDom, el};
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_standard_options_json() {
		let json = GridOptions::standard(10).to_json();
		assert_eq!(json["pageLength"], json!(10));
		assert_eq!(json["responsive"], json!(true));
		assert_eq!(json["order"], json!([[0, "desc"]]));
		assert_eq!(json["language"]["lengthMenu"], json!("Show _MENU_ entries"));
		assert_eq!(
			json["columnDefs"],
			json!([
				{"targets": "no-sort", "orderable": false},
				{"targets": "currency", "type": "num-fmt"},
				{"targets": "percentage", "type": "num-fmt"},
			])
		);
	}

	#[rstest]
	fn test_customer_options_json() {
		let json = GridOptions::customers(10).to_json();
		assert!(json.get("order").is_none());
		assert_eq!(json["columnDefs"], json!([{"targets": [10], "orderable": false}]));
		assert_eq!(
			json["language"],
			json!({"search": "Search customers:", "emptyTable": "No customers available"})
		);

		let summary = GridOptions::customer_summary(15).to_json();
		assert_eq!(summary["pageLength"], json!(15));
		assert_eq!(summary["order"], json!([[0, "asc"]]));
	}

	#[rstest]
	#[case(CellRenderer::Currency, "1234.5", RenderKind::Display, CellValue::Text("₹1,234.50".into()))]
	#[case(CellRenderer::Currency, "", RenderKind::Type, CellValue::Text("₹0.00".into()))]
	#[case(CellRenderer::Percentage, "7", RenderKind::Display, CellValue::Text("7.00%".into()))]
	#[case(CellRenderer::Percentage, "n/a", RenderKind::Sort, CellValue::Number(0.0))]
	#[case(CellRenderer::Currency, "99.9", RenderKind::Filter, CellValue::Number(99.9))]
	#[case(CellRenderer::Currency, "₹1,500.00", RenderKind::Display, CellValue::Text("₹1,500.00".into()))]
	#[case(CellRenderer::Currency, "₹-2,750.50", RenderKind::Sort, CellValue::Number(-2750.5))]
	#[case(CellRenderer::Percentage, "9.50%", RenderKind::Display, CellValue::Text("9.50%".into()))]
	fn test_render(
		#[case] renderer: CellRenderer,
		#[case] data: &str,
		#[case] kind: RenderKind,
		#[case] expected: CellValue,
	) {
		assert_eq!(renderer.render(&NumberFormat::default(), data.into(), kind), expected);
	}

	#[rstest]
	fn test_class_targets_resolve_from_header() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let table = dom.append(
			body,
			el("table").child(
				el("thead").child(
					el("tr")
						.child(el("th").text("Date"))
						.child(el("th").class("currency").text("Amount"))
						.child(el("th").class("percentage").text("Rate"))
						.child(el("th").class("no-sort").text("Actions")),
				),
			),
		);
		let options = GridOptions::standard(10);
		assert_eq!(options.renderer_for(&dom, &table, 1), Some(CellRenderer::Currency));
		assert_eq!(options.renderer_for(&dom, &table, 2), Some(CellRenderer::Percentage));
		assert_eq!(options.renderer_for(&dom, &table, 3), None);
		assert_eq!(
			resolve_columns(&dom, &table, &ColumnTarget::Class(NO_SORT_CLASS.into())),
			vec![3]
		);
	}
}
