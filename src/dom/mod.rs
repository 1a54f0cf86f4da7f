/*!
# `RelNotes`: DOM.

Rich-text fields are fragments (no `<html>`, no `<body>`), so they are parsed
inside a temporary scaffold and everything of interest is read back out of
the `<body>` element.
*/

pub(crate) mod node;

use crate::{
	RelnotesError,
	spec,
};
use html5ever::{
	Attribute,
	expanded_name,
	ns,
	local_name,
	ExpandedName,
	interface::{
		ElementFlags,
		NodeOrText,
		QuirksMode,
		TreeSink,
	},
	ParseOpts,
	QualName,
	tendril::{
		StrTendril,
		TendrilSink,
	},
	tree_builder::TreeBuilderOpts,
};
use indexmap::IndexMap;
use node::{
	Handle,
	Node,
	NodeInner,
};
use std::{
	borrow::Cow,
	cell::RefCell,
	rc::Rc,
};



/// # Invalid Expanded Name.
///
/// This is used to avoid unfriendly panics in inapplicable `TreeSink` member
/// methods.
static NOOP_NAME: ExpandedName = expanded_name!("", "abbr");

/// # Fragment Scaffold.
///
/// Opening the body explicitly keeps head-ish tags like `<title>` or `<style>`
/// in the body with everything else.
const FRAGMENT_OPEN: &str = "<html><head></head><body>";



#[derive(Debug)]
/// # HTML DOM Tree.
///
/// This struct mostly only exists as a place to chuck the ugly `TreeSink`
/// trait on. `Node` (or `Handle`) is self-referential, so is more or less
/// its own tree. Haha.
pub(crate) struct Tree {
	/// # Document Root.
	root: Handle,

	/// # Error.
	error: RefCell<Option<RelnotesError>>,
}

impl Default for Tree {
	#[inline]
	/// # Default: Empty Root Document.
	fn default() -> Self {
		Self {
			root: Node::new(NodeInner::Document),
			error: RefCell::new(None),
		}
	}
}

impl TreeSink for Tree {
	type Handle = Handle;
	type Output = Self;
	type ElemName<'a> = ExpandedName<'a>
	where Self: 'a;

	/// # Add Attributes if Missing.
	///
	/// If `target` is an element, attach the new attributes to it, except
	/// when they'd collide with existing entries.
	///
	/// Note: this isn't usually used.
	fn add_attrs_if_missing(&self, target: &Handle, new: Vec<Attribute>) {
		use indexmap::map::Entry;

		if let NodeInner::Element { ref attrs, .. } = target.inner {
			let attrs: &mut IndexMap<_, _> = &mut attrs.borrow_mut();

			for Attribute { name, value } in new {
				if let Entry::Vacant(e) = attrs.entry(name) { e.insert(value); }
			}
		}
	}

	/// # Append Node.
	///
	/// Attach a text or element child node to an existing (parent) node.
	///
	/// Other node types are ignored.
	fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
		match child {
			// Text nodes can always be added.
			NodeOrText::AppendText(v) =>
				// If the last node was text, merge them.
				if
					let Some(last) = parent.children.borrow().last() &&
					let NodeInner::Text { ref contents } = last.inner
				{
					contents.borrow_mut().push_tendril(&v);
				}
				// Otherwise add it anew.
				else { node::append(parent, Node::text(v)); },

			// Among the other possible node types, we're only actually
			// interested in elements.
			NodeOrText::AppendNode(v) => if matches!(v.inner, NodeInner::Element { .. }) {
				node::append(parent, v);
			},
		}
	}

	/// # Append Based on Parent Node.
	///
	/// Insert `child` before `sibling` if `sibling` has a parent, otherwise
	/// append it to `last_parent`.
	///
	/// Note: this isn't usually used.
	fn append_based_on_parent_node(
		&self,
		sibling: &Handle,
		last_parent: &Handle,
		child: NodeOrText<Self::Handle>,
	) {
		if sibling.parent().is_some() { self.append_before_sibling(sibling, child); }
		else { self.append(last_parent, child); }
	}

	/// # Append Before Sibling.
	///
	/// Note: this isn't usually used.
	fn append_before_sibling(&self, sibling: &Handle, child: NodeOrText<Handle>) {
		let Some(parent) = sibling.parent() else {
			self.error.borrow_mut().replace(RelnotesError::Parse);
			return;
		};

		match child {
			// Text nodes can always be added.
			NodeOrText::AppendText(v) => {
				// If the previous node was text, merge them.
				let prev = {
					let children = parent.children.borrow();
					children.iter()
						.position(|c| Rc::ptr_eq(c, sibling))
						.and_then(|pos| pos.checked_sub(1))
						.map(|pos| Rc::clone(&children[pos]))
				};
				if
					let Some(prev) = prev &&
					let NodeInner::Text { ref contents } = prev.inner
				{
					contents.borrow_mut().push_tendril(&v);
				}
				// Otherwise add it anew.
				else if ! node::insert_before(sibling, Node::text(v)) {
					self.error.borrow_mut().replace(RelnotesError::Parse);
				}
			},

			// Among the other possible node types, we're only actually
			// interested in elements.
			NodeOrText::AppendNode(v) =>
				if
					matches!(v.inner, NodeInner::Element { .. }) &&
					! node::insert_before(sibling, v)
				{
					self.error.borrow_mut().replace(RelnotesError::Parse);
				},
		}
	}

	/// # Create Comment.
	///
	/// Return a generic placeholder node that will be ignored if appended.
	fn create_comment(&self, _text: StrTendril) -> Handle {
		Node::new(NodeInner::Ignored)
	}

	/// # Create Element.
	///
	/// Create and return a new element node.
	fn create_element(&self, name: QualName, attrs: Vec<Attribute>, flags: ElementFlags)
	-> Handle {
		let out = Node::new(NodeInner::Element {
			name,
			attrs: RefCell::new(attrs.into_iter().map(|v| (v.name, v.value)).collect())
		});

		// Fucking templates. Haha.
		if flags.template { node::append(&out, Node::new(NodeInner::Document)); }

		out
	}

	/// # Create Processing Instruction.
	///
	/// Return a generic placeholder node that will be ignored if appended.
	fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Handle {
		Node::new(NodeInner::Ignored)
	}

	/// # Element Name.
	///
	/// Return an element node's fully qualified name.
	fn elem_name<'a>(&self, target: &'a Handle) -> ExpandedName<'a> {
		if let NodeInner::Element { ref name, .. } = target.inner {
			name.expanded()
		}
		else {
			debug_assert!(false, "BUG: elem_name called on non-element node.");
			self.error.borrow_mut().replace(RelnotesError::Parse);
			NOOP_NAME
		}
	}

	#[inline]
	/// # Finish Parsing.
	fn finish(self) -> Self { self }

	/// # Get Document Root.
	///
	/// Clone and return the root document.
	fn get_document(&self) -> Handle { Rc::clone(&self.root) }

	/// # Get Template Contents.
	///
	/// For whatever reason, `<template>` child nodes are treated as a new
	/// document instead of being attached as children.
	///
	/// This method returns a handle for them.
	fn get_template_contents(&self, target: &Handle) -> Handle {
		if
			target.is_elem("template") &&
			let Some(out) = target.children.borrow().first()
		{
			return Rc::clone(out);
		}

		debug_assert!(false, "BUG: get_template_contents called on non-template node.");
		self.error.borrow_mut().replace(RelnotesError::Parse);
		Node::new(NodeInner::Ignored)
	}

	/// # Remove From Parent.
	///
	/// Note: this isn't usually used.
	fn remove_from_parent(&self, target: &Handle) { node::detach(target); }

	/// # Reparent Children.
	///
	/// Drain and append all children from `old_parent` onto `new_parent`.
	///
	/// Note: this isn't usually used.
	fn reparent_children(&self, old_parent: &Handle, new_parent: &Handle) {
		node::reparent_children(old_parent, new_parent);
	}

	/// # Same Node?
	fn same_node(&self, x: &Handle, y: &Handle) -> bool { Rc::ptr_eq(x, y) }

	/// # Append Doctype to Document.
	fn append_doctype_to_document(
		&self,
		_name: StrTendril,
		_public_id: StrTendril,
		_system_id: StrTendril,
	) {
		// Noop.
	}

	/// # Is Mathml?
	///
	/// We don't support mathml, so always return false.
	fn is_mathml_annotation_xml_integration_point(&self, _node: &Handle) -> bool {
		false
	}

	/// # Set Parsing Error.
	///
	/// Markup errors are expected from rich-text editors; the tree builder
	/// recovers from them on its own.
	fn parse_error(&self, _msg: Cow<'static, str>) {
		// Noop.
	}

	/// # Set Quirks Mode.
	fn set_quirks_mode(&self, _mode: QuirksMode) {
		// Noop.
	}
}

impl Tree {
	/// # Parse Fragment.
	///
	/// Parse a (possibly malformed) HTML fragment into a tree. Malformed
	/// markup is repaired by the tree builder rather than rejected; an error
	/// is only returned if the sink itself gets into an inconsistent state.
	pub(crate) fn parse(raw: &str) -> Result<Self, RelnotesError> {
		// Since we aren't expecting anything other than HTML, we can skip the
		// doctype and save a tiny bit of overhead.
		let opts = ParseOpts {
			tree_builder: TreeBuilderOpts {
				drop_doctype: true,
				..TreeBuilderOpts::default()
			},
			..ParseOpts::default()
		};

		let mut src = String::with_capacity(FRAGMENT_OPEN.len() + raw.len());
		src.push_str(FRAGMENT_OPEN);
		src.push_str(raw);

		let dom = html5ever::parse_document(Self::default(), opts).one(src);
		if let Some(e) = dom.error.borrow_mut().take() {
			return Err(e);
		}

		dom.post_process();
		if dom.body().is_some() { Ok(dom) }
		else { Err(RelnotesError::Parse) }
	}

	#[must_use]
	/// # Body.
	///
	/// Return the `<body>` element, the parent of all fragment content.
	pub(crate) fn body(&self) -> Option<Handle> {
		self.root.children.borrow()
			.iter()
			.find(|v| v.is_elem("html"))
			.and_then(|html| html.children.borrow()
				.iter()
				.find(|v| v.is_elem("body"))
				.map(Rc::clone)
			)
	}

	#[must_use]
	/// # Top-Level Content.
	///
	/// Return the element and text nodes sitting directly in the body, i.e.
	/// the top level of the original fragment.
	pub(crate) fn top_level(&self) -> Vec<Handle> {
		self.body().map_or_else(Vec::new, |body| body.content_children())
	}

	#[must_use]
	/// # Elements By Tag.
	///
	/// Return every fragment element with the given tag, in document order.
	pub(crate) fn elements_by_tag(&self, tag: &str) -> Vec<Handle> {
		self.body().map_or_else(Vec::new, |body| node::descendants_by_tag(&body, tag))
	}

	#[must_use]
	/// # Inner HTML.
	///
	/// Serialize the fragment (the body's children) back into a string.
	pub(crate) fn inner_html(&self) -> String {
		self.body().map_or_else(String::new, |body| crate::ser::serialize_children(&body))
	}

	/// # Post Processing.
	///
	/// (Lightly) clean the tree before returning it.
	///
	/// Specifically, this ensures that void HTML elements really have no
	/// children, and fixes `<template>` child element associations.
	fn post_process(&self) {
		/// # Patch Tree.
		fn walk(handle: &Handle) {
			if let NodeInner::Element { ref name, .. } = handle.inner {
				// Ensure void HTML elements are actually childless.
				if spec::is_void_html_tag(name) {
					let old = std::mem::take(&mut *handle.children.borrow_mut());
					for child in old { child.parent.take(); }
					return; // No children, no recursion. Bail early!
				}

				// The tree builder parses <template> content as a separate
				// document instead of regular children. Let's remove that
				// indirection as it isn't relevant or helpful for our
				// purposes.
				if
					matches!(name.ns, ns!(html)) &&
					matches!(name.local, local_name!("template"))
				{
					let first = handle.children.borrow().first().map(Rc::clone);
					if let Some(first) = first && matches!(first.inner, NodeInner::Document) {
						node::detach(&first);
						node::reparent_children(&first, handle);
					}
				}
			}

			// Do the same for the children of the children.
			for child in handle.children.borrow().iter() { walk(child); }
		}

		walk(&self.root);
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_parse_fragment() {
		let tree = Tree::parse("Hello <b>World</b>!").expect("Tree parse failed.");
		let top = tree.top_level();
		assert_eq!(top.len(), 3);
		assert!(matches!(top[0].inner, NodeInner::Text { .. }));
		assert!(top[1].is_elem("b"));
		assert!(matches!(top[2].inner, NodeInner::Text { .. }));

		// Parents should all be the body.
		let body = tree.body().expect("Missing body.");
		assert!(top.iter().all(|v| v.parent().is_some_and(|p| Rc::ptr_eq(&p, &body))));
	}

	#[test]
	fn t_parse_empty() {
		for raw in ["", "<!-- Just a comment. -->", "<!DOCTYPE html>"] {
			let tree = Tree::parse(raw).expect("Tree parse failed.");
			assert!(tree.top_level().is_empty(), "Content found in {raw:?}.");
		}
	}

	#[test]
	fn t_parse_malformed() {
		// Unclosed tags are closed, stray closers are dropped.
		let tree = Tree::parse("<div><p>One<p>Two</span>").expect("Tree parse failed.");
		let top = tree.top_level();
		assert_eq!(top.len(), 1);
		assert!(top[0].is_elem("div"));
		assert_eq!(tree.elements_by_tag("p").len(), 2);
		assert_eq!(tree.inner_html(), "<div><p>One</p><p>Two</p></div>");
	}

	#[test]
	fn t_parse_head_tags() {
		// These would normally wind up in the <head>.
		let tree = Tree::parse("<title>Hi</title><style>b{}</style>").expect("Tree parse failed.");
		let top = tree.top_level();
		assert_eq!(top.len(), 2);
		assert!(top[0].is_elem("title"));
		assert!(top[1].is_elem("style"));
	}

	#[test]
	fn t_parse_void() {
		let tree = Tree::parse("<img src=a.png>text<br>").expect("Tree parse failed.");
		let img = tree.elements_by_tag("img");
		assert_eq!(img.len(), 1);
		assert!(img[0].children.borrow().is_empty());
		assert_eq!(img[0].attr("src").as_deref(), Some("a.png"));
		assert_eq!(img[0].attr("SRC").as_deref(), Some("a.png"));
		assert_eq!(img[0].attr("width"), None);
	}

	#[test]
	fn t_parse_template() {
		let tree = Tree::parse("<template><b>Hi</b></template>").expect("Tree parse failed.");
		let template = tree.elements_by_tag("template");
		assert_eq!(template.len(), 1);

		// The content should be attached directly, with the right parent.
		let children = template[0].content_children();
		assert_eq!(children.len(), 1);
		assert!(children[0].is_elem("b"));
		assert!(children[0].parent().is_some_and(|p| Rc::ptr_eq(&p, &template[0])));
	}

	#[test]
	fn t_parse_uppercase() {
		let tree = Tree::parse("<DIV>Shout</DIV><Br>").expect("Tree parse failed.");
		assert_eq!(tree.elements_by_tag("div").len(), 1);
		assert_eq!(tree.elements_by_tag("br").len(), 1);
	}
}
