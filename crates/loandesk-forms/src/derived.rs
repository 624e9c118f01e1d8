//! Derived display fields
//!
//! Two recomputations driven by field edits:
//!
//! - the running balance of the transaction entry form, read back from and
//!   written to its formatted display field
//! - the elapsed days and ordering of a `period_from`/`period_to` range
//!
//! The only state either one needs already lives in the document.

use loandesk_core::dates::{calculate_days, parse_date};
use loandesk_core::dom::{Dom, Selector};
use loandesk_core::numeric::{NumberFormat, safe_number};
use loandesk_core::patch::{DomPatch, apply_patches};
use loandesk_core::info_log;

use crate::field::{FieldError, FieldState, clear_error};

pub const TRANSACTION_FORM_ID: &str = "transactionForm";
pub const AMOUNT_PAID_FIELD: &str = "amount_paid";
pub const AMOUNT_REPAID_FIELD: &str = "amount_repaid";
pub const BALANCE_DISPLAY_ID: &str = "current_balance_display";
pub const PERIOD_FROM_FIELD: &str = "period_from";
pub const PERIOD_TO_FIELD: &str = "period_to";

fn named_input(name: &str) -> Selector {
	Selector::tag("input").with_attr_eq("name", name)
}

/// Direction of a balance change, rendered as a text colour class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceIndicator {
	Increase,
	Decrease,
	Unchanged,
}

impl BalanceIndicator {
	const ALL: [Self; 3] = [Self::Increase, Self::Decrease, Self::Unchanged];

	pub fn class(self) -> &'static str {
		match self {
			Self::Increase => "text-success",
			Self::Decrease => "text-danger",
			Self::Unchanged => "text-muted",
		}
	}

	fn between(previous: f64, current: f64) -> Self {
		if current > previous {
			Self::Increase
		} else if current < previous {
			Self::Decrease
		} else {
			Self::Unchanged
		}
	}
}

/// A recomputed running balance
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceUpdate {
	pub previous: f64,
	pub balance: f64,
	pub display: String,
	pub indicator: BalanceIndicator,
}

impl BalanceUpdate {
	/// Patches for the balance display element
	pub fn patches(&self) -> Vec<DomPatch> {
		let mut patches = vec![
			DomPatch::SetValue(self.display.clone()),
			DomPatch::add_class(self.indicator.class()),
		];
		patches.extend(
			BalanceIndicator::ALL
				.iter()
				.filter(|other| **other != self.indicator)
				.map(|other| DomPatch::remove_class(other.class())),
		);
		patches
	}
}

/// `displayed + paid - repaid`, with `displayed` read back out of the
/// formatted balance text
///
/// # Examples
///
/// ```
/// use loandesk_core::numeric::NumberFormat;
/// use loandesk_forms::derived::{BalanceIndicator, compute_balance};
///
/// let update = compute_balance(&NumberFormat::default(), "₹1,000.00", "250", "");
/// assert_eq!(update.display, "₹1,250.00");
/// assert_eq!(update.indicator, BalanceIndicator::Increase);
/// ```
pub fn compute_balance(
	format: &NumberFormat,
	displayed: &str,
	paid: &str,
	repaid: &str,
) -> BalanceUpdate {
	let previous = if displayed.is_empty() {
		0.0
	} else {
		format.parse_currency(displayed)
	};
	let balance = previous + safe_number(paid, 0.0) - safe_number(repaid, 0.0);
	BalanceUpdate {
		previous,
		balance,
		display: format.currency(balance),
		indicator: BalanceIndicator::between(previous, balance),
	}
}

/// Ordering of a period range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCheck {
	Ordered,
	/// The end date lies before the start date
	Inverted,
}

/// Result of recomputing a period range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodOutcome {
	/// Whole days between the two dates, order-independent
	pub days: i64,
	pub range: RangeCheck,
}

impl PeriodOutcome {
	/// Validation state of the end-date field
	pub fn end_state(&self) -> FieldState {
		match self.range {
			RangeCheck::Ordered => FieldState::Clean,
			RangeCheck::Inverted => FieldState::Invalid(FieldError::RangeInverted),
		}
	}
}

/// Computes the period between two date texts; `None` until both are filled
pub fn compute_period(from: &str, to: &str) -> Option<PeriodOutcome> {
	if from.is_empty() || to.is_empty() {
		return None;
	}
	let inverted = matches!(
		(parse_date(from), parse_date(to)),
		(Some(start), Some(end)) if start > end
	);
	Some(PeriodOutcome {
		days: calculate_days(from, to),
		range: if inverted {
			RangeCheck::Inverted
		} else {
			RangeCheck::Ordered
		},
	})
}

/// Recomputes derived fields after edits inside forms
#[derive(Debug, Clone, Default)]
pub struct DerivedFieldUpdater {
	format: NumberFormat,
}

impl DerivedFieldUpdater {
	pub fn new(format: NumberFormat) -> Self {
		Self { format }
	}

	/// Dispatches an edit of `field` to the affected recomputations
	pub fn on_field_edit<D: Dom + ?Sized>(&self, dom: &mut D, field: &D::Node) {
		let Some(form) = dom.closest(field, &Selector::tag("form")) else {
			return;
		};
		if dom.attribute(&form, "id").as_deref() == Some(TRANSACTION_FORM_ID) {
			self.update_transaction(dom, &form);
		}
		let name = dom.attribute(field, "name");
		if matches!(name.as_deref(), Some(PERIOD_FROM_FIELD | PERIOD_TO_FIELD)) {
			self.update_period(dom, &form);
		}
	}

	/// Rewrites the balance display of a transaction form
	///
	/// Does nothing unless both amount fields and the display are present.
	pub fn update_transaction<D: Dom + ?Sized>(
		&self,
		dom: &mut D,
		form: &D::Node,
	) -> Option<BalanceUpdate> {
		let paid = dom.query_selector(form, &named_input(AMOUNT_PAID_FIELD))?;
		let repaid = dom.query_selector(form, &named_input(AMOUNT_REPAID_FIELD))?;
		let display = dom.query_selector(form, &Selector::id(BALANCE_DISPLAY_ID))?;

		let update = compute_balance(
			&self.format,
			&dom.value(&display),
			&dom.value(&paid),
			&dom.value(&repaid),
		);
		apply_patches(dom, &display, &update.patches());
		Some(update)
	}

	/// Recomputes the period range of `form` and validates its ordering
	pub fn update_period<D: Dom + ?Sized>(
		&self,
		dom: &mut D,
		form: &D::Node,
	) -> Option<PeriodOutcome> {
		let from = dom.query_selector(form, &named_input(PERIOD_FROM_FIELD))?;
		let to = dom.query_selector(form, &named_input(PERIOD_TO_FIELD))?;

		let outcome = compute_period(&dom.value(&from), &dom.value(&to))?;
		info_log!("Period: {} days", outcome.days);

		let end_state = outcome.end_state();
		end_state.render(dom, &to);
		if end_state.is_valid() {
			clear_error(dom, &from);
		}
		Some(outcome)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::INVALID_CLASS;
	use loandesk_core::dom::{MemoryDom, NodeId, el};
	use rstest::{fixture, rstest};

	#[rstest]
	#[case("₹1,000.00", "0", "0", 1000.0, BalanceIndicator::Unchanged)]
	#[case("₹1,000.00", "500", "200", 1300.0, BalanceIndicator::Increase)]
	#[case("₹1,000.00", "", "1500.5", -500.5, BalanceIndicator::Decrease)]
	#[case("", "12abc", "", 12.0, BalanceIndicator::Increase)]
	#[case("garbage", "x", "y", 0.0, BalanceIndicator::Unchanged)]
	fn test_compute_balance(
		#[case] displayed: &str,
		#[case] paid: &str,
		#[case] repaid: &str,
		#[case] balance: f64,
		#[case] indicator: BalanceIndicator,
	) {
		let update = compute_balance(&NumberFormat::default(), displayed, paid, repaid);
		assert_eq!(update.balance, balance);
		assert_eq!(update.indicator, indicator);
	}

	#[rstest]
	fn test_balance_patches_keep_one_indicator() {
		let update = compute_balance(&NumberFormat::default(), "₹10.00", "", "5");
		let patches = update.patches();
		assert_eq!(patches[0], DomPatch::SetValue("₹5.00".into()));
		assert!(patches.contains(&DomPatch::add_class("text-danger")));
		assert!(patches.contains(&DomPatch::remove_class("text-success")));
		assert!(patches.contains(&DomPatch::remove_class("text-muted")));
	}

	#[rstest]
	#[case("2024-01-01", "2024-01-10", Some((9, RangeCheck::Ordered)))]
	#[case("2024-01-10", "2024-01-01", Some((9, RangeCheck::Inverted)))]
	#[case("2024-01-10", "2024-01-10", Some((0, RangeCheck::Ordered)))]
	#[case("2024-01-10", "nonsense", Some((0, RangeCheck::Ordered)))]
	#[case("", "2024-01-01", None)]
	fn test_compute_period(
		#[case] from: &str,
		#[case] to: &str,
		#[case] expected: Option<(i64, RangeCheck)>,
	) {
		let outcome = compute_period(from, to).map(|o| (o.days, o.range));
		assert_eq!(outcome, expected);
	}

	#[fixture]
	fn period_form() -> (MemoryDom, NodeId, NodeId, NodeId) {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let form = dom.append(
			body,
			el("form")
				.child(el("div").child(
					el("input").attr("type", "date").attr("name", "period_from").id("from"),
				))
				.child(el("div").child(
					el("input").attr("type", "date").attr("name", "period_to").id("to"),
				)),
		);
		let from = dom.get_element_by_id("from").unwrap();
		let to = dom.get_element_by_id("to").unwrap();
		(dom, form, from, to)
	}

	#[rstest]
	fn test_inverted_period_marks_end_field(period_form: (MemoryDom, NodeId, NodeId, NodeId)) {
		let (mut dom, _form, from, to) = period_form;
		let updater = DerivedFieldUpdater::default();
		dom.set_value(&from, "2024-03-01");
		dom.set_value(&to, "2024-02-01");
		updater.on_field_edit(&mut dom, &to);
		assert!(dom.has_class(&to, INVALID_CLASS));
		assert!(!dom.has_class(&from, INVALID_CLASS));

		dom.set_value(&to, "2024-04-01");
		updater.on_field_edit(&mut dom, &to);
		assert!(!dom.has_class(&to, INVALID_CLASS));
	}

	#[rstest]
	fn test_period_waits_for_both_dates(period_form: (MemoryDom, NodeId, NodeId, NodeId)) {
		let (mut dom, form, from, _to) = period_form;
		dom.set_value(&from, "2024-03-01");
		let outcome = DerivedFieldUpdater::default().update_period(&mut dom, &form);
		assert!(outcome.is_none());
	}

	#[rstest]
	fn test_transaction_form_updates_display() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		dom.append(
			body,
			el("form")
				.id(TRANSACTION_FORM_ID)
				.child(el("input").attr("type", "number").attr("name", "amount_paid").id("paid"))
				.child(el("input").attr("type", "number").attr("name", "amount_repaid"))
				.child(el("input").id(BALANCE_DISPLAY_ID).value("₹2,500.00")),
		);
		let paid = dom.get_element_by_id("paid").unwrap();
		let display = dom.get_element_by_id(BALANCE_DISPLAY_ID).unwrap();

		dom.set_value(&paid, "1000");
		DerivedFieldUpdater::default().on_field_edit(&mut dom, &paid);
		assert_eq!(dom.value(&display), "₹3,500.00");
		assert!(dom.has_class(&display, "text-success"));
	}

	#[rstest]
	fn test_other_forms_are_ignored() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		dom.append(
			body,
			el("form")
				.id("loanForm")
				.child(el("input").attr("type", "number").attr("name", "amount_paid").id("paid"))
				.child(el("input").attr("type", "number").attr("name", "amount_repaid"))
				.child(el("input").id(BALANCE_DISPLAY_ID).value("₹2,500.00")),
		);
		let paid = dom.get_element_by_id("paid").unwrap();
		dom.set_value(&paid, "1000");
		DerivedFieldUpdater::default().on_field_edit(&mut dom, &paid);

		let display = dom.get_element_by_id(BALANCE_DISPLAY_ID).unwrap();
		assert_eq!(dom.value(&display), "₹2,500.00");
	}
}
