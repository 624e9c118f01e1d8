//! CSS selector subset used to discover page elements
//!
//! Supported syntax: type selectors, `*`, `#id`, `.class`, `[attr]`,
//! `[attr="value"]`, `:not(<compound>)`, the descendant combinator and
//! comma-separated groups. This covers every selector the page bootstrap
//! needs; anything else is rejected by [`Selector::parse`].

use std::fmt;

use super::Dom;

/// Error returned when a selector string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
	#[error("empty selector")]
	Empty,

	#[error("unsupported selector syntax in '{selector}' at byte {position}")]
	Unsupported { selector: String, position: usize },

	#[error("unterminated {what} in '{selector}'")]
	Unterminated { selector: String, what: &'static str },
}

/// Attribute condition inside `[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrCondition {
	/// `[name]`
	Exists(String),
	/// `[name="value"]`
	Equals(String, String),
}

/// A compound selector: everything that applies to a single element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
	tag: Option<String>,
	id: Option<String>,
	classes: Vec<String>,
	attrs: Vec<AttrCondition>,
	negations: Vec<Compound>,
}

impl Compound {
	fn matches<D: Dom + ?Sized>(&self, dom: &D, node: &D::Node) -> bool {
		if let Some(tag) = &self.tag
			&& !dom.tag_name(node).eq_ignore_ascii_case(tag)
		{
			return false;
		}
		if let Some(id) = &self.id
			&& dom.attribute(node, "id").as_deref() != Some(id.as_str())
		{
			return false;
		}
		if !self.classes.iter().all(|class| dom.has_class(node, class)) {
			return false;
		}
		let attrs_match = self.attrs.iter().all(|condition| match condition {
			AttrCondition::Exists(name) => dom.attribute(node, name).is_some(),
			AttrCondition::Equals(name, value) => {
				dom.attribute(node, name).as_deref() == Some(value.as_str())
			}
		});
		attrs_match && !self.negations.iter().any(|neg| neg.matches(dom, node))
	}
}

impl fmt::Display for Compound {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let empty = self.tag.is_none()
			&& self.id.is_none()
			&& self.classes.is_empty()
			&& self.attrs.is_empty();
		match &self.tag {
			Some(tag) => write!(f, "{tag}")?,
			None if empty => write!(f, "*")?,
			None => {}
		}
		if let Some(id) = &self.id {
			write!(f, "#{id}")?;
		}
		for class in &self.classes {
			write!(f, ".{class}")?;
		}
		for attr in &self.attrs {
			match attr {
				AttrCondition::Exists(name) => write!(f, "[{name}]")?,
				AttrCondition::Equals(name, value) => write!(f, "[{name}=\"{value}\"]")?,
			}
		}
		for negation in &self.negations {
			write!(f, ":not({negation})")?;
		}
		Ok(())
	}
}

/// Descendant chain; the last compound is the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chain {
	parts: Vec<Compound>,
}

impl Chain {
	fn subject_mut(&mut self) -> &mut Compound {
		if self.parts.is_empty() {
			self.parts.push(Compound::default());
		}
		let last = self.parts.len() - 1;
		&mut self.parts[last]
	}

	fn matches<D: Dom + ?Sized>(&self, dom: &D, node: &D::Node) -> bool {
		let Some((subject, ancestors)) = self.parts.split_last() else {
			return false;
		};
		if !subject.matches(dom, node) {
			return false;
		}

		// Walk up the tree, greedily consuming ancestor compounds right-to-left
		let mut remaining = ancestors.iter().rev().peekable();
		let mut current = dom.parent(node);
		while let Some(wanted) = remaining.peek() {
			let Some(candidate) = current else {
				return false;
			};
			if wanted.matches(dom, &candidate) {
				remaining.next();
			}
			current = dom.parent(&candidate);
		}
		true
	}
}

/// A parsed or programmatically built selector
///
/// ## Example
///
/// ```
/// use loandesk_core::dom::Selector;
///
/// let tables = Selector::class("table").not_id("customersTable");
/// assert_eq!(tables.to_string(), ".table:not(#customersTable)");
///
/// let parsed = Selector::parse(r#"input[type="number"]"#).unwrap();
/// assert_eq!(parsed, Selector::tag("input").with_attr_eq("type", "number"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
	groups: Vec<Chain>,
}

impl Selector {
	fn from_compound(compound: Compound) -> Self {
		Self {
			groups: vec![Chain {
				parts: vec![compound],
			}],
		}
	}

	fn subject_mut(&mut self) -> &mut Compound {
		if self.groups.is_empty() {
			self.groups.push(Chain { parts: Vec::new() });
		}
		let last = self.groups.len() - 1;
		self.groups[last].subject_mut()
	}

	/// Matches every element
	pub fn any() -> Self {
		Self::from_compound(Compound::default())
	}

	/// Type selector (`input`)
	pub fn tag(tag: impl Into<String>) -> Self {
		Self::from_compound(Compound {
			tag: Some(tag.into().to_ascii_lowercase()),
			..Compound::default()
		})
	}

	/// Id selector (`#customersTable`)
	pub fn id(id: impl Into<String>) -> Self {
		Self::from_compound(Compound {
			id: Some(id.into()),
			..Compound::default()
		})
	}

	/// Class selector (`.table`)
	pub fn class(class: impl Into<String>) -> Self {
		Self::from_compound(Compound {
			classes: vec![class.into()],
			..Compound::default()
		})
	}

	/// Attribute presence selector (`[data-bs-toggle]`)
	pub fn attr(name: impl Into<String>) -> Self {
		Self::from_compound(Compound {
			attrs: vec![AttrCondition::Exists(name.into())],
			..Compound::default()
		})
	}

	/// Attribute equality selector (`[role="dialog"]`)
	pub fn attr_eq(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self::from_compound(Compound {
			attrs: vec![AttrCondition::Equals(name.into(), value.into())],
			..Compound::default()
		})
	}

	/// Adds a class requirement to the last subject
	pub fn and_class(mut self, class: impl Into<String>) -> Self {
		self.subject_mut().classes.push(class.into());
		self
	}

	/// Adds an attribute presence requirement to the last subject
	pub fn with_attr(mut self, name: impl Into<String>) -> Self {
		self.subject_mut()
			.attrs
			.push(AttrCondition::Exists(name.into()));
		self
	}

	/// Adds an attribute equality requirement to the last subject
	pub fn with_attr_eq(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.subject_mut()
			.attrs
			.push(AttrCondition::Equals(name.into(), value.into()));
		self
	}

	/// Excludes an id from the last subject (`:not(#id)`)
	pub fn not_id(mut self, id: impl Into<String>) -> Self {
		self.subject_mut().negations.push(Compound {
			id: Some(id.into()),
			..Compound::default()
		});
		self
	}

	/// Excludes a class from the last subject (`:not(.class)`)
	pub fn not_class(mut self, class: impl Into<String>) -> Self {
		self.subject_mut().negations.push(Compound {
			classes: vec![class.into()],
			..Compound::default()
		});
		self
	}

	/// Requires the subject to sit inside an element matching `ancestor`
	///
	/// Only the first group of `ancestor` is used.
	pub fn inside(mut self, ancestor: &Selector) -> Self {
		let Some(prefix) = ancestor.groups.first() else {
			return self;
		};
		for group in &mut self.groups {
			let mut parts = prefix.parts.clone();
			parts.append(&mut group.parts);
			group.parts = parts;
		}
		self
	}

	/// Selector group union (`a, b`)
	pub fn or(mut self, other: Selector) -> Self {
		self.groups.extend(other.groups);
		self
	}

	/// Returns true if `node` matches any group
	pub fn matches<D: Dom + ?Sized>(&self, dom: &D, node: &D::Node) -> bool {
		self.groups.iter().any(|group| group.matches(dom, node))
	}

	/// Parses selector text
	pub fn parse(selector: &str) -> Result<Self, SelectorError> {
		let trimmed = selector.trim();
		if trimmed.is_empty() {
			return Err(SelectorError::Empty);
		}

		let mut groups = Vec::new();
		for group in split_top_level(trimmed, selector)? {
			let mut parts = Vec::new();
			for (offset, part) in group {
				parts.push(parse_compound(part, selector, offset)?);
			}
			if parts.is_empty() {
				return Err(SelectorError::Empty);
			}
			groups.push(Chain { parts });
		}
		Ok(Self { groups })
	}
}

impl fmt::Display for Selector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, group) in self.groups.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			for (j, part) in group.parts.iter().enumerate() {
				if j > 0 {
					write!(f, " ")?;
				}
				write!(f, "{part}")?;
			}
		}
		Ok(())
	}
}

impl std::str::FromStr for Selector {
	type Err = SelectorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

type Group<'a> = Vec<(usize, &'a str)>;

/// Splits into comma groups, then whitespace-separated compounds, ignoring
/// separators inside brackets, parentheses and quotes.
fn split_top_level<'a>(text: &'a str, original: &str) -> Result<Vec<Group<'a>>, SelectorError> {
	let mut groups = Vec::new();
	let mut current: Group<'a> = Vec::new();
	let mut depth = 0usize;
	let mut quote: Option<char> = None;
	let mut start: Option<usize> = None;

	for (i, c) in text.char_indices() {
		if let Some(q) = quote {
			if c == q {
				quote = None;
			}
			continue;
		}
		match c {
			'"' | '\'' => {
				quote = Some(c);
				start.get_or_insert(i);
			}
			'[' | '(' => {
				depth += 1;
				start.get_or_insert(i);
			}
			']' | ')' => {
				depth = depth.checked_sub(1).ok_or_else(|| SelectorError::Unsupported {
					selector: original.to_string(),
					position: i,
				})?;
			}
			',' if depth == 0 => {
				if let Some(s) = start.take() {
					current.push((s, &text[s..i]));
				}
				groups.push(std::mem::take(&mut current));
			}
			c if c.is_whitespace() && depth == 0 => {
				if let Some(s) = start.take() {
					current.push((s, &text[s..i]));
				}
			}
			'>' | '+' | '~' if depth == 0 => {
				return Err(SelectorError::Unsupported {
					selector: original.to_string(),
					position: i,
				});
			}
			_ => {
				start.get_or_insert(i);
			}
		}
	}

	if quote.is_some() {
		return Err(SelectorError::Unterminated {
			selector: original.to_string(),
			what: "string",
		});
	}
	if depth > 0 {
		return Err(SelectorError::Unterminated {
			selector: original.to_string(),
			what: "bracket",
		});
	}
	if let Some(s) = start {
		current.push((s, &text[s..]));
	}
	groups.push(current);

	if groups.iter().any(Vec::is_empty) {
		return Err(SelectorError::Empty);
	}
	Ok(groups)
}

fn is_ident_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(part: &str, from: usize) -> (&str, usize) {
	let end = part[from..]
		.char_indices()
		.find(|(_, c)| !is_ident_char(*c))
		.map_or(part.len(), |(i, _)| from + i);
	(&part[from..end], end)
}

fn parse_compound(part: &str, original: &str, offset: usize) -> Result<Compound, SelectorError> {
	let unsupported = |at: usize| SelectorError::Unsupported {
		selector: original.to_string(),
		position: offset + at,
	};

	let mut compound = Compound::default();
	let mut pos = 0usize;
	let bytes = part.as_bytes();

	while pos < part.len() {
		match bytes[pos] {
			b'*' => pos += 1,
			b'#' => {
				let (ident, end) = read_ident(part, pos + 1);
				if ident.is_empty() {
					return Err(unsupported(pos));
				}
				compound.id = Some(ident.to_string());
				pos = end;
			}
			b'.' => {
				let (ident, end) = read_ident(part, pos + 1);
				if ident.is_empty() {
					return Err(unsupported(pos));
				}
				compound.classes.push(ident.to_string());
				pos = end;
			}
			b'[' => {
				let close = part[pos..]
					.find(']')
					.map(|i| pos + i)
					.ok_or_else(|| unsupported(pos))?;
				let condition = parse_attr(&part[pos + 1..close]).ok_or_else(|| unsupported(pos))?;
				compound.attrs.push(condition);
				pos = close + 1;
			}
			b':' => {
				let rest = &part[pos..];
				let Some(inner_start) = rest.strip_prefix(":not(").map(|_| pos + 5) else {
					return Err(unsupported(pos));
				};
				let close = part[inner_start..]
					.find(')')
					.map(|i| inner_start + i)
					.ok_or_else(|| unsupported(pos))?;
				let inner = parse_compound(&part[inner_start..close], original, offset + inner_start)?;
				compound.negations.push(inner);
				pos = close + 1;
			}
			b if is_ident_char(b as char) && pos == 0 => {
				let (ident, end) = read_ident(part, pos);
				compound.tag = Some(ident.to_ascii_lowercase());
				pos = end;
			}
			_ => return Err(unsupported(pos)),
		}
	}
	Ok(compound)
}

fn parse_attr(body: &str) -> Option<AttrCondition> {
	match body.split_once('=') {
		None => {
			let name = body.trim();
			(!name.is_empty() && name.chars().all(is_ident_char))
				.then(|| AttrCondition::Exists(name.to_string()))
		}
		Some((name, value)) => {
			let name = name.trim();
			if name.is_empty() || !name.chars().all(is_ident_char) {
				return None;
			}
			let value = value.trim();
			let unquoted = value
				.strip_prefix('"')
				.and_then(|v| v.strip_suffix('"'))
				.or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
				.unwrap_or(value);
			Some(AttrCondition::Equals(name.to_string(), unquoted.to_string()))
		}
	}
}
