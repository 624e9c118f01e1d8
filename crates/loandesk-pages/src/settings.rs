//! Page settings
//!
//! Every key has a default, so a page works without any configuration. A
//! server template can override keys by rendering an inline JSON block:
//!
//! ```html
//! <script type="application/json" id="loandesk-settings">
//!   {"timing": {"submit_reset_ms": 8000}}
//! </script>
//! ```

use std::time::Duration;

use loandesk_core::dom::Dom;
use loandesk_core::numeric::NumberFormat;
use serde::{Deserialize, Serialize};

/// Id of the inline settings element
pub const SETTINGS_ELEMENT_ID: &str = "loandesk-settings";

/// Settings error
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SettingsError {
	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),
}

/// Number and date presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
	pub currency_symbol: String,
	pub decimal_places: usize,
	/// Display format of dates; informational only
	pub date_format: String,
}

impl Default for FormatSettings {
	fn default() -> Self {
		Self {
			currency_symbol: "₹".to_string(),
			decimal_places: 2,
			date_format: "DD-MM-YYYY".to_string(),
		}
	}
}

/// Delays, all in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
	pub submit_reset_ms: u64,
	pub widget_settle_ms: u64,
	pub alert_dismiss_ms: u64,
	pub post_delete_reinit_ms: u64,
	pub select_retry_ms: u64,
	pub select_retry_attempts: u32,
	pub card_stagger_ms: u64,
	pub table_stagger_offset_ms: u64,
	pub fade_duration_ms: u64,
}

impl Default for TimingSettings {
	fn default() -> Self {
		Self {
			submit_reset_ms: 5000,
			widget_settle_ms: 150,
			alert_dismiss_ms: 5000,
			post_delete_reinit_ms: 200,
			select_retry_ms: 500,
			select_retry_attempts: 1,
			card_stagger_ms: 100,
			table_stagger_offset_ms: 200,
			fade_duration_ms: 500,
		}
	}
}

impl TimingSettings {
	pub fn submit_reset(&self) -> Duration {
		Duration::from_millis(self.submit_reset_ms)
	}

	pub fn widget_settle(&self) -> Duration {
		Duration::from_millis(self.widget_settle_ms)
	}

	pub fn alert_dismiss(&self) -> Duration {
		Duration::from_millis(self.alert_dismiss_ms)
	}

	pub fn post_delete_reinit(&self) -> Duration {
		Duration::from_millis(self.post_delete_reinit_ms)
	}

	pub fn select_retry(&self) -> Duration {
		Duration::from_millis(self.select_retry_ms)
	}

	pub fn fade_duration(&self) -> Duration {
		Duration::from_millis(self.fade_duration_ms)
	}
}

/// Table discovery and grid sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
	/// Tables initialized by their own routines, never by generic discovery
	pub excluded_ids: Vec<String>,
	pub default_page_length: usize,
	pub summary_page_length: usize,
	/// Body text of the customer table when there are no customers
	pub customer_empty_marker: String,
}

impl Default for TableSettings {
	fn default() -> Self {
		Self {
			excluded_ids: vec![
				"customersTable".to_string(),
				"customerSummaryTable".to_string(),
				"dashboardCustomersTable".to_string(),
			],
			default_page_length: 10,
			summary_page_length: 15,
			customer_empty_marker: "No customers found".to_string(),
		}
	}
}

/// Route recognition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
	/// Path fragment identifying the customer page
	pub customer_path_marker: String,
	/// Query parameter set to `1` after a deletion
	pub deleted_param: String,
}

impl Default for RouteSettings {
	fn default() -> Self {
		Self {
			customer_path_marker: "customer_master".to_string(),
			deleted_param: "deleted".to_string(),
		}
	}
}

/// All page settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub format: FormatSettings,
	pub timing: TimingSettings,
	pub tables: TableSettings,
	pub routes: RouteSettings,
}

impl Settings {
	/// Parses TOML text
	///
	/// # Examples
	///
	/// ```
	/// use loandesk_pages::Settings;
	///
	/// let settings = Settings::from_toml("[timing]\nsubmit_reset_ms = 8000\n").unwrap();
	/// assert_eq!(settings.timing.submit_reset_ms, 8000);
	/// assert_eq!(settings.timing.widget_settle_ms, 150);
	/// ```
	pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
		let settings: Self = toml::from_str(text)
			.map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))?;
		settings.validate()?;
		Ok(settings)
	}

	pub fn from_json(text: &str) -> Result<Self, SettingsError> {
		let settings: Self = serde_json::from_str(text)
			.map_err(|e| SettingsError::ParseError(format!("JSON parse error: {}", e)))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Parses text in the named format (`toml` or `json`)
	pub fn from_str_with_format(text: &str, format: &str) -> Result<Self, SettingsError> {
		match format {
			"toml" => Self::from_toml(text),
			"json" => Self::from_json(text),
			other => Err(SettingsError::UnsupportedFormat(format!(
				"{}; supported formats: toml, json",
				other
			))),
		}
	}

	/// Reads the inline settings element; defaults when there is none
	pub fn from_dom<D: Dom + ?Sized>(dom: &D) -> Result<Self, SettingsError> {
		match dom.get_element_by_id(SETTINGS_ELEMENT_ID) {
			Some(node) => Self::from_json(dom.text_content(&node).trim()),
			None => Ok(Self::default()),
		}
	}

	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.tables.default_page_length == 0 || self.tables.summary_page_length == 0 {
			return Err(SettingsError::ValidationError(
				"page lengths must be positive".to_string(),
			));
		}
		if self.format.decimal_places > 10 {
			return Err(SettingsError::ValidationError(format!(
				"decimal_places must be at most 10, got {}",
				self.format.decimal_places
			)));
		}
		if self.routes.deleted_param.is_empty() {
			return Err(SettingsError::ValidationError(
				"deleted_param must not be empty".to_string(),
			));
		}
		Ok(())
	}

	pub fn number_format(&self) -> NumberFormat {
		NumberFormat::new(self.format.currency_symbol.clone(), self.format.decimal_places)
	}
}
