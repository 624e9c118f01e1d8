//! In-memory document
//!
//! An arena-backed element tree implementing [`Dom`]. It backs every test in
//! the workspace and is also usable for server-side rendering of patched
//! fragments. Node ids are never reused; removed nodes stay in the arena but
//! are unreachable from the root.

use std::collections::BTreeMap;

use super::Dom;

/// Elements that never have a closing tag
const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "hr", "img", "input", "link", "meta"];

/// Handle to a node inside a [`MemoryDom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct ElementData {
	tag: String,
	attrs: Vec<(String, String)>,
	classes: Vec<String>,
	styles: Vec<(String, String)>,
	value: String,
	disabled: bool,
	data: BTreeMap<String, serde_json::Value>,
	listeners: Vec<String>,
}

#[derive(Debug, Clone)]
enum NodeKind {
	Element(ElementData),
	Text(String),
	/// Markup assigned through `set_inner_html`, kept verbatim
	Raw(String),
}

#[derive(Debug, Clone)]
struct Node {
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	kind: NodeKind,
}

/// Arena-backed document rooted at a `<body>` element
#[derive(Debug, Clone)]
pub struct MemoryDom {
	nodes: Vec<Node>,
	root: NodeId,
	active: Option<NodeId>,
}

impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDom {
	/// Creates an empty document with a `<body>` root
	pub fn new() -> Self {
		Self {
			nodes: vec![Node {
				parent: None,
				children: Vec::new(),
				kind: NodeKind::Element(ElementData {
					tag: "body".to_string(),
					..ElementData::default()
				}),
			}],
			root: NodeId(0),
			active: None,
		}
	}

	/// The `<body>` element
	pub fn body(&self) -> NodeId {
		self.root
	}

	/// Builds `spec` and appends it under `parent`; returns the new element
	pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
		let node = self.build(spec);
		self.attach(parent, node, None);
		node
	}

	/// Builds `spec` without attaching it
	pub fn build(&mut self, spec: ElementSpec) -> NodeId {
		let value = spec
			.attrs
			.iter()
			.find(|(k, _)| k == "value")
			.map(|(_, v)| v.clone())
			.unwrap_or_default();
		let disabled = spec.attrs.iter().any(|(k, _)| k == "disabled");
		let id = self.push(NodeKind::Element(ElementData {
			tag: spec.tag.to_ascii_lowercase(),
			attrs: spec
				.attrs
				.into_iter()
				.filter(|(k, _)| k != "disabled")
				.collect(),
			classes: spec.classes,
			value,
			disabled,
			..ElementData::default()
		}));
		if let Some(text) = spec.text {
			let text_node = self.push(NodeKind::Text(text));
			self.attach(id, text_node, None);
		}
		for child in spec.children {
			let child_id = self.build(child);
			self.attach(id, child_id, None);
		}
		id
	}

	/// Number of nodes ever created, including detached ones
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	fn push(&mut self, kind: NodeKind) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(Node {
			parent: None,
			children: Vec::new(),
			kind,
		});
		id
	}

	fn attach(&mut self, parent: NodeId, child: NodeId, position: Option<usize>) {
		self.detach(child);
		let siblings = &mut self.nodes[parent.0].children;
		match position {
			Some(index) if index <= siblings.len() => siblings.insert(index, child),
			_ => siblings.push(child),
		}
		self.nodes[child.0].parent = Some(parent);
	}

	fn detach(&mut self, node: NodeId) {
		if let Some(parent) = self.nodes[node.0].parent.take() {
			self.nodes[parent.0].children.retain(|c| *c != node);
		}
	}

	fn clear_children(&mut self, node: NodeId) {
		let children = std::mem::take(&mut self.nodes[node.0].children);
		for child in children {
			self.nodes[child.0].parent = None;
		}
	}

	fn element(&self, node: NodeId) -> Option<&ElementData> {
		match &self.nodes.get(node.0)?.kind {
			NodeKind::Element(data) => Some(data),
			_ => None,
		}
	}

	fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
		match &mut self.nodes.get_mut(node.0)?.kind {
			NodeKind::Element(data) => Some(data),
			_ => None,
		}
	}

	fn deep_clone(&mut self, node: NodeId) -> NodeId {
		let kind = match &self.nodes[node.0].kind {
			NodeKind::Element(data) => NodeKind::Element(ElementData {
				data: BTreeMap::new(),
				listeners: Vec::new(),
				..data.clone()
			}),
			other => other.clone(),
		};
		let copy = self.push(kind);
		let children = self.nodes[node.0].children.clone();
		for child in children {
			let child_copy = self.deep_clone(child);
			self.attach(copy, child_copy, None);
		}
		copy
	}

	fn serialize_into(&self, node: NodeId, out: &mut String) {
		match &self.nodes[node.0].kind {
			NodeKind::Text(text) => out.push_str(&html_escape(text)),
			NodeKind::Raw(html) => out.push_str(html),
			NodeKind::Element(data) => {
				out.push('<');
				out.push_str(&data.tag);
				if !data.classes.is_empty() {
					out.push_str(&format!(" class=\"{}\"", html_escape(&data.classes.join(" "))));
				}
				for (name, value) in &data.attrs {
					out.push_str(&format!(" {}=\"{}\"", name, html_escape(value)));
				}
				if !data.styles.is_empty() {
					out.push_str(&format!(" style=\"{}\"", html_escape(&style_text(&data.styles))));
				}
				if data.disabled {
					out.push_str(" disabled");
				}
				out.push('>');
				if VOID_ELEMENTS.contains(&data.tag.as_str()) {
					return;
				}
				for child in &self.nodes[node.0].children {
					self.serialize_into(*child, out);
				}
				out.push_str(&format!("</{}>", data.tag));
			}
		}
	}

	fn collect_text(&self, node: NodeId, out: &mut String) {
		match &self.nodes[node.0].kind {
			NodeKind::Text(text) => out.push_str(text),
			NodeKind::Raw(html) => out.push_str(&strip_tags(html)),
			NodeKind::Element(_) => {
				for child in &self.nodes[node.0].children {
					self.collect_text(*child, out);
				}
			}
		}
	}

	/// Serialized markup of the element itself
	pub fn outer_html(&self, node: NodeId) -> String {
		let mut out = String::new();
		self.serialize_into(node, &mut out);
		out
	}
}

impl Dom for MemoryDom {
	type Node = NodeId;

	fn root(&self) -> NodeId {
		self.root
	}

	fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
		let mut stack = vec![self.root];
		while let Some(node) = stack.pop() {
			if let Some(data) = self.element(node)
				&& data.attrs.iter().any(|(k, v)| k == "id" && v == id)
			{
				return Some(node);
			}
			stack.extend(self.nodes[node.0].children.iter().rev().copied());
		}
		None
	}

	fn parent(&self, node: &NodeId) -> Option<NodeId> {
		self.nodes.get(node.0)?.parent
	}

	fn children(&self, node: &NodeId) -> Vec<NodeId> {
		self.nodes.get(node.0).map_or_else(Vec::new, |n| {
			n.children
				.iter()
				.copied()
				.filter(|c| self.element(*c).is_some())
				.collect()
		})
	}

	fn is_connected(&self, node: &NodeId) -> bool {
		let mut current = Some(*node);
		while let Some(candidate) = current {
			if candidate == self.root {
				return true;
			}
			current = self.parent(&candidate);
		}
		false
	}

	fn tag_name(&self, node: &NodeId) -> String {
		self.element(*node).map(|d| d.tag.clone()).unwrap_or_default()
	}

	fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
		let data = self.element(*node)?;
		match name {
			"class" if !data.classes.is_empty() => Some(data.classes.join(" ")),
			"class" => None,
			"style" if !data.styles.is_empty() => Some(style_text(&data.styles)),
			"style" => None,
			"disabled" => data.disabled.then(String::new),
			_ => data
				.attrs
				.iter()
				.find(|(k, _)| k == name)
				.map(|(_, v)| v.clone()),
		}
	}

	fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
		let Some(data) = self.element_mut(*node) else {
			return;
		};
		match name {
			"class" => {
				data.classes = value.split_whitespace().map(str::to_string).collect();
			}
			"style" => {
				data.styles = parse_style(value);
			}
			"disabled" => data.disabled = true,
			_ => match data.attrs.iter_mut().find(|(k, _)| k == name) {
				Some((_, existing)) => *existing = value.to_string(),
				None => data.attrs.push((name.to_string(), value.to_string())),
			},
		}
	}

	fn remove_attribute(&mut self, node: &NodeId, name: &str) {
		let Some(data) = self.element_mut(*node) else {
			return;
		};
		match name {
			"class" => data.classes.clear(),
			"style" => data.styles.clear(),
			"disabled" => data.disabled = false,
			_ => data.attrs.retain(|(k, _)| k != name),
		}
	}

	fn has_class(&self, node: &NodeId, class: &str) -> bool {
		self.element(*node)
			.is_some_and(|d| d.classes.iter().any(|c| c == class))
	}

	fn add_class(&mut self, node: &NodeId, class: &str) {
		if let Some(data) = self.element_mut(*node)
			&& !data.classes.iter().any(|c| c == class)
		{
			data.classes.push(class.to_string());
		}
	}

	fn remove_class(&mut self, node: &NodeId, class: &str) {
		if let Some(data) = self.element_mut(*node) {
			data.classes.retain(|c| c != class);
		}
	}

	fn value(&self, node: &NodeId) -> String {
		self.element(*node).map(|d| d.value.clone()).unwrap_or_default()
	}

	fn set_value(&mut self, node: &NodeId, value: &str) {
		if let Some(data) = self.element_mut(*node) {
			data.value = value.to_string();
		}
	}

	fn text_content(&self, node: &NodeId) -> String {
		let mut out = String::new();
		self.collect_text(*node, &mut out);
		out
	}

	fn set_text_content(&mut self, node: &NodeId, text: &str) {
		if self.element(*node).is_none() {
			return;
		}
		self.clear_children(*node);
		let text_node = self.push(NodeKind::Text(text.to_string()));
		self.attach(*node, text_node, None);
	}

	fn inner_html(&self, node: &NodeId) -> String {
		let mut out = String::new();
		if let Some(n) = self.nodes.get(node.0) {
			for child in &n.children {
				self.serialize_into(*child, &mut out);
			}
		}
		out
	}

	fn set_inner_html(&mut self, node: &NodeId, html: &str) {
		if self.element(*node).is_none() {
			return;
		}
		self.clear_children(*node);
		let raw = self.push(NodeKind::Raw(html.to_string()));
		self.attach(*node, raw, None);
	}

	fn is_disabled(&self, node: &NodeId) -> bool {
		self.element(*node).is_some_and(|d| d.disabled)
	}

	fn set_disabled(&mut self, node: &NodeId, disabled: bool) {
		if let Some(data) = self.element_mut(*node) {
			data.disabled = disabled;
		}
	}

	fn style(&self, node: &NodeId, property: &str) -> Option<String> {
		self.element(*node)?
			.styles
			.iter()
			.find(|(k, _)| k == property)
			.map(|(_, v)| v.clone())
	}

	fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
		let Some(data) = self.element_mut(*node) else {
			return;
		};
		if value.is_empty() {
			data.styles.retain(|(k, _)| k != property);
			return;
		}
		match data.styles.iter_mut().find(|(k, _)| k == property) {
			Some((_, existing)) => *existing = value.to_string(),
			None => data.styles.push((property.to_string(), value.to_string())),
		}
	}

	fn create_element(&mut self, tag: &str) -> NodeId {
		self.build(el(tag))
	}

	fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
		self.attach(*parent, *child, None);
	}

	fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: &NodeId) {
		self.detach(*child);
		let position = self.nodes[parent.0]
			.children
			.iter()
			.position(|c| c == reference);
		self.attach(*parent, *child, position);
	}

	fn remove(&mut self, node: &NodeId) {
		if self.active == Some(*node) {
			self.active = None;
		}
		self.detach(*node);
	}

	fn replace_with_clone(&mut self, node: &NodeId) -> NodeId {
		let copy = self.deep_clone(*node);
		if let Some(parent) = self.nodes[node.0].parent {
			let position = self.nodes[parent.0]
				.children
				.iter()
				.position(|c| c == node);
			self.detach(*node);
			self.attach(parent, copy, position);
		}
		copy
	}

	fn set_data(&mut self, node: &NodeId, key: &str, value: serde_json::Value) {
		if let Some(data) = self.element_mut(*node) {
			data.data.insert(key.to_string(), value);
		}
	}

	fn data(&self, node: &NodeId, key: &str) -> Option<serde_json::Value> {
		self.element(*node)?.data.get(key).cloned()
	}

	fn remove_data(&mut self, node: &NodeId, key: &str) {
		if let Some(data) = self.element_mut(*node) {
			data.data.remove(key);
		}
	}

	fn data_keys(&self, node: &NodeId) -> Vec<String> {
		self.element(*node)
			.map(|d| d.data.keys().cloned().collect())
			.unwrap_or_default()
	}

	fn add_listener(&mut self, node: &NodeId, event: &str) {
		if let Some(data) = self.element_mut(*node) {
			data.listeners.push(event.to_string());
		}
	}

	fn remove_listeners(&mut self, node: &NodeId, namespace: &str) -> usize {
		let Some(data) = self.element_mut(*node) else {
			return 0;
		};
		let before = data.listeners.len();
		data.listeners
			.retain(|event| event.split_once('.').map(|(_, ns)| ns) != Some(namespace));
		before - data.listeners.len()
	}

	fn listeners(&self, node: &NodeId) -> Vec<String> {
		self.element(*node)
			.map(|d| d.listeners.clone())
			.unwrap_or_default()
	}

	fn focus(&mut self, node: &NodeId) {
		if self.element(*node).is_some() {
			self.active = Some(*node);
		}
	}

	fn active_element(&self) -> Option<NodeId> {
		self.active.filter(|node| self.is_connected(node))
	}
}

/// Declarative element description used to build fixtures
///
/// ## Example
///
/// ```
/// use loandesk_core::dom::{Dom, MemoryDom, el};
///
/// let mut dom = MemoryDom::new();
/// let body = dom.body();
/// let form = dom.append(
/// 	body,
/// 	el("form").id("transactionForm").child(
/// 		el("input").attr("type", "number").attr("name", "amount_paid"),
/// 	),
/// );
/// assert_eq!(dom.children(&form).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
	tag: String,
	attrs: Vec<(String, String)>,
	classes: Vec<String>,
	text: Option<String>,
	children: Vec<ElementSpec>,
}

/// Starts an [`ElementSpec`] for `tag`
pub fn el(tag: &str) -> ElementSpec {
	ElementSpec {
		tag: tag.to_string(),
		..ElementSpec::default()
	}
}

impl ElementSpec {
	/// Sets the id attribute
	pub fn id(self, id: &str) -> Self {
		self.attr("id", id)
	}

	/// Adds one or more space-separated classes
	pub fn class(mut self, class: &str) -> Self {
		self.classes
			.extend(class.split_whitespace().map(str::to_string));
		self
	}

	/// Sets an attribute
	pub fn attr(mut self, name: &str, value: &str) -> Self {
		if name == "class" {
			return self.class(value);
		}
		self.attrs.push((name.to_string(), value.to_string()));
		self
	}

	/// Sets the initial value of a form control
	pub fn value(self, value: &str) -> Self {
		self.attr("value", value)
	}

	/// Adds a text child before any element children
	pub fn text(mut self, text: &str) -> Self {
		self.text = Some(text.to_string());
		self
	}

	/// Appends a child element
	pub fn child(mut self, child: ElementSpec) -> Self {
		self.children.push(child);
		self
	}

	/// Appends several child elements
	pub fn children(mut self, children: impl IntoIterator<Item = ElementSpec>) -> Self {
		self.children.extend(children);
		self
	}
}

fn style_text(styles: &[(String, String)]) -> String {
	styles
		.iter()
		.map(|(k, v)| format!("{k}: {v};"))
		.collect::<Vec<_>>()
		.join(" ")
}

fn parse_style(text: &str) -> Vec<(String, String)> {
	text.split(';')
		.filter_map(|decl| {
			let (k, v) = decl.split_once(':')?;
			let (k, v) = (k.trim(), v.trim());
			(!k.is_empty() && !v.is_empty()).then(|| (k.to_string(), v.to_string()))
		})
		.collect()
}

fn strip_tags(html: &str) -> String {
	let mut out = String::with_capacity(html.len());
	let mut in_tag = false;
	for c in html.chars() {
		match c {
			'<' => in_tag = true,
			'>' => in_tag = false,
			_ if !in_tag => out.push(c),
			_ => {}
		}
	}
	out
}

/// Escapes HTML special characters
pub fn html_escape(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::Selector;
	use rstest::{fixture, rstest};

	#[fixture]
	fn table_dom() -> (MemoryDom, NodeId) {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let table = dom.append(
			body,
			el("div").class("card").child(
				el("table").id("loans").class("table").child(
					el("tbody").child(
						el("tr")
							.child(el("td").text("1"))
							.child(el("td").class("currency").text("1200")),
					),
				),
			),
		);
		let table = dom.get_element_by_id("loans").unwrap_or(table);
		(dom, table)
	}

	#[rstest]
	fn test_query_and_closest(table_dom: (MemoryDom, NodeId)) {
		let (dom, table) = table_dom;
		let cells = dom.query_selector_all(&table, &Selector::tag("td"));
		assert_eq!(cells.len(), 2);
		assert_eq!(dom.text_content(&cells[1]), "1200");

		let card = dom.closest(&cells[0], &Selector::class("card")).unwrap();
		assert_eq!(dom.tag_name(&card), "div");
		assert!(dom.matches(&table, &Selector::parse("table.table#loans").unwrap()));
	}

	#[rstest]
	fn test_class_attribute_round_trip(table_dom: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_dom;
		dom.add_class(&table, "dataTable");
		dom.add_class(&table, "dataTable");
		assert_eq!(dom.attribute(&table, "class").as_deref(), Some("table dataTable"));

		dom.set_attribute(&table, "class", "plain");
		assert!(!dom.has_class(&table, "table"));
		dom.remove_attribute(&table, "class");
		assert!(dom.attribute(&table, "class").is_none());
	}

	#[rstest]
	fn test_remove_detaches_subtree(table_dom: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_dom;
		let cell = dom.query_selector(&table, &Selector::tag("td")).unwrap();
		dom.remove(&table);
		assert!(!dom.is_connected(&table));
		assert!(!dom.is_connected(&cell));
		assert!(dom.get_element_by_id("loans").is_none());
	}

	#[rstest]
	fn test_replace_with_clone_drops_listeners_and_data(table_dom: (MemoryDom, NodeId)) {
		let (mut dom, table) = table_dom;
		let cell = dom.query_selector(&table, &Selector::tag("td")).unwrap();
		dom.add_listener(&table, "draw.dt");
		dom.set_data(&cell, "_DT_CellIndex", serde_json::json!({"row": 0, "column": 0}));

		let copy = dom.replace_with_clone(&table);
		assert_ne!(copy, table);
		assert_eq!(dom.get_element_by_id("loans"), Some(copy));
		assert!(dom.listeners(&copy).is_empty());

		let copied_cells = dom.query_selector_all(&copy, &Selector::tag("td"));
		assert_eq!(copied_cells.len(), 2);
		assert!(dom.data_keys(&copied_cells[0]).is_empty());
		assert_eq!(dom.text_content(&copied_cells[1]), "1200");
	}

	#[rstest]
	fn test_remove_listeners_by_namespace() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let node = dom.append(body, el("table"));
		dom.add_listener(&node, "draw.dt");
		dom.add_listener(&node, "order.dt");
		dom.add_listener(&node, "click");
		dom.add_listener(&node, "click.app");

		assert_eq!(dom.remove_listeners(&node, "dt"), 2);
		assert_eq!(dom.listeners(&node), vec!["click", "click.app"]);
	}

	#[rstest]
	fn test_clear_data_keeps_attributes() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let node = dom.append(body, el("table").id("loansTable"));
		dom.set_data(&node, "DataTable", serde_json::json!({"page": 2}));
		dom.set_data(&node, "settings", serde_json::json!(true));

		dom.clear_data(&node);
		assert!(dom.data_keys(&node).is_empty());
		assert_eq!(dom.attribute(&node, "id").as_deref(), Some("loansTable"));
	}

	#[rstest]
	fn test_inner_html_and_text() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let button = dom.append(
			body,
			el("button").attr("type", "submit").text("Save & close"),
		);
		assert_eq!(dom.inner_html(&button), "Save &amp; close");

		dom.set_inner_html(&button, "<span class=\"loading-spinner\"></span> Processing...");
		assert_eq!(
			dom.inner_html(&button),
			"<span class=\"loading-spinner\"></span> Processing..."
		);
		assert_eq!(dom.text_content(&button), " Processing...");
	}

	#[rstest]
	fn test_styles() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let card = dom.append(body, el("div").class("card"));
		dom.set_style(&card, "opacity", "0");
		dom.set_style(&card, "transform", "translateY(20px)");
		assert_eq!(
			dom.attribute(&card, "style").as_deref(),
			Some("opacity: 0; transform: translateY(20px);")
		);
		dom.set_style(&card, "opacity", "");
		assert!(dom.style(&card, "opacity").is_none());
	}

	#[rstest]
	fn test_outer_html_void_and_disabled() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		let input = dom.append(
			body,
			el("input").attr("type", "number").attr("disabled", ""),
		);
		assert!(dom.is_disabled(&input));
		assert_eq!(dom.outer_html(input), "<input type=\"number\" disabled>");
	}
}
