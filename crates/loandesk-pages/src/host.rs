//! Browser capabilities outside the document
//!
//! Everything the page needs from its environment besides the DOM: dialogs,
//! the calendar, the address bar and the UI toolkit's modal/tooltip widgets.

use chrono::NaiveDate;
use url::Url;

/// Environment of a page; `N` is the document's node handle
pub trait Host<N> {
	/// Asks the user a yes/no question
	fn confirm(&mut self, message: &str) -> bool;

	/// The current local calendar day
	fn today(&self) -> NaiveDate;

	/// The page's current address
	fn location(&self) -> Url;

	/// Rewrites the address bar without a reload
	fn replace_history(&mut self, url: &Url);

	/// Opens a modal dialog element
	fn show_modal(&mut self, modal: &N);

	/// Whether the toolkit's tooltip widget is loaded
	fn tooltips_available(&self) -> bool;

	fn init_tooltip(&mut self, element: &N);

	/// Announces an event fired by the runtime to scripts outside it
	fn fire(&mut self, _target: &N, _event: &str) {}
}

/// Whether `url` carries `param=1`
pub fn has_flag(url: &Url, param: &str) -> bool {
	url.query_pairs().any(|(key, value)| key == param && value == "1")
}

/// `url` without any `param` query pairs; drops an emptied query entirely
pub fn without_param(url: &Url, param: &str) -> Url {
	let kept: Vec<(String, String)> = url
		.query_pairs()
		.filter(|(key, _)| key != param)
		.map(|(key, value)| (key.into_owned(), value.into_owned()))
		.collect();
	let mut stripped = url.clone();
	if kept.is_empty() {
		stripped.set_query(None);
	} else {
		stripped.query_pairs_mut().clear().extend_pairs(kept);
	}
	stripped
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("https://desk.example/customer_master?deleted=1", true)]
	#[case("https://desk.example/customer_master?page=2&deleted=1", true)]
	#[case("https://desk.example/customer_master?deleted=0", false)]
	#[case("https://desk.example/customer_master?undeleted=1", false)]
	#[case("https://desk.example/customer_master", false)]
	fn test_has_flag(#[case] url: &str, #[case] expected: bool) {
		assert_eq!(has_flag(&Url::parse(url).unwrap(), "deleted"), expected);
	}

	#[rstest]
	#[case("https://desk.example/customer_master?deleted=1", "https://desk.example/customer_master")]
	#[case(
		"https://desk.example/customer_master?page=2&deleted=1#list",
		"https://desk.example/customer_master?page=2#list"
	)]
	fn test_without_param(#[case] url: &str, #[case] expected: &str) {
		let url = Url::parse(url).unwrap();
		assert_eq!(without_param(&url, "deleted").as_str(), expected);
	}
}
