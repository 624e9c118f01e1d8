//! Core Integration Tests
//!
//! Exercises the numeric helpers, selectors and patches together against the
//! in-memory document, the way the page layer drives them.
//!
//! Test Categories:
//! - Category 1: Numeric totality
//! - Category 2: Selector queries over realistic markup
//! - Category 3: Patch application

use loandesk_core::dom::{Dom, MemoryDom, Selector, el};
use loandesk_core::numeric::{NumberFormat, RawValue, format_currency, safe_number};
use loandesk_core::patch::{DomPatch, FEEDBACK_CLASS, apply_patches};
use proptest::prelude::*;
use rstest::{fixture, rstest};

// ============================================================================
// Category 1: Numeric totality
// ============================================================================

proptest! {
	#[test]
	fn prop_safe_number_is_finite_for_any_text(text in ".*", default in -1.0e12f64..1.0e12) {
		let n = safe_number(text.as_str(), default);
		prop_assert!(n.is_finite());
	}

	#[test]
	fn prop_safe_number_keeps_finite_numbers(n in proptest::num::f64::NORMAL) {
		prop_assert_eq!(safe_number(n, 0.0), n);
	}
}

#[rstest]
#[case(RawValue::Missing, 0.0)]
#[case(RawValue::Bool(true), 0.0)]
#[case(RawValue::Number(f64::NAN), 0.0)]
#[case(RawValue::Number(f64::INFINITY), 0.0)]
#[case(RawValue::Text("-5"), -5.0)]
#[case(RawValue::Text("0"), 0.0)]
fn test_safe_number_edge_values(#[case] value: RawValue<'static>, #[case] expected: f64) {
	assert_eq!(safe_number(value, 0.0), expected);
}

#[rstest]
fn test_display_text_reads_back() {
	let format = NumberFormat::default();
	let shown = format_currency(-98765.4);
	assert_eq!(shown, "₹-98,765.40");
	assert_eq!(format.parse_currency(&shown), -98765.4);
}

// ============================================================================
// Category 2: Selector queries over realistic markup
// ============================================================================

#[fixture]
fn page() -> MemoryDom {
	let mut dom = MemoryDom::new();
	let body = dom.body();
	dom.append(
		body,
		el("div")
			.class("modal")
			.id("addCustomerModal")
			.child(el("select").class("searchable-dropdown").id("customer_code")),
	);
	dom.append(
		body,
		el("table")
			.id("customersTable")
			.class("table")
			.child(el("tbody").child(el("tr").child(el("td").text("No customers found")))),
	);
	dom.append(body, el("table").id("loansTable").class("table"));
	dom.append(body, el("table").class("table").attr("data-no-datatable", ""));
	dom
}

#[rstest]
fn test_eligible_table_query(page: MemoryDom) {
	let selector = Selector::parse("table.table:not([data-no-datatable]):not(#customersTable)")
		.unwrap();
	let tables = page.select_all(&selector);
	assert_eq!(tables.len(), 1);
	assert_eq!(page.attribute(&tables[0], "id").as_deref(), Some("loansTable"));
}

#[rstest]
fn test_dropdown_inside_modal(page: MemoryDom) {
	let select = page.get_element_by_id("customer_code").unwrap();
	let container = page
		.closest(&select, &Selector::parse(".modal, [role=\"dialog\"]").unwrap())
		.unwrap();
	assert_eq!(page.attribute(&container, "id").as_deref(), Some("addCustomerModal"));
}

#[rstest]
fn test_placeholder_text_is_visible(page: MemoryDom) {
	let table = page.get_element_by_id("customersTable").unwrap();
	let tbody = page.query_selector(&table, &Selector::tag("tbody")).unwrap();
	assert!(page.text_content(&tbody).contains("No customers found"));
}

// ============================================================================
// Category 3: Patch application
// ============================================================================

#[rstest]
fn test_repeated_error_never_duplicates_feedback() {
	let mut dom = MemoryDom::new();
	let body = dom.body();
	let group = dom.append(body, el("div").child(el("input").id("rate")));
	let input = dom.get_element_by_id("rate").unwrap();

	for _ in 0..5 {
		apply_patches(
			&mut dom,
			&input,
			&[
				DomPatch::add_class("is-invalid"),
				DomPatch::ShowFeedback("Please enter a valid number".into()),
			],
		);
	}
	let feedback = dom.query_selector_all(&group, &Selector::class(FEEDBACK_CLASS));
	assert_eq!(feedback.len(), 1);
	assert!(dom.has_class(&input, "is-invalid"));
}
