/*!
# `RelNotes`: DOM Node.

This module holds the node type along with the handful of structural
mutations the sanitizer needs: detaching, inserting before a sibling, and
replacing. Each keeps the parent/child links in agreement.
*/

use html5ever::{
	LocalName,
	QualName,
	tendril::StrTendril,
};
use indexmap::IndexMap;
use std::{
	cell::RefCell,
	rc::{
		Rc,
		Weak,
	},
};



/// # Reference-Counted Node.
///
/// Nodes are self-referential, so generally need to be wrapped in `Rc`.
pub(crate) type Handle = Rc<Node>;



#[derive(Debug)]
/// # DOM Node.
///
/// This struct holds tag/attribute/content details for a node and its
/// children. At the root level, it's the whole damn tree.
///
/// Children are owned; the parent is only a weak back-reference, so a node
/// can never be kept alive by its own descendants.
pub(crate) struct Node {
	/// # Node Kind/Data.
	pub(crate) inner: NodeInner,

	/// # Parent Node.
	pub(crate) parent: RefCell<Weak<Node>>,

	/// # Child Node(s).
	pub(crate) children: RefCell<Vec<Handle>>,
}

impl Node {
	#[must_use]
	/// # New Node.
	pub(crate) fn new(inner: NodeInner) -> Handle {
		Rc::new(Self {
			inner,
			parent: RefCell::new(Weak::new()),
			children: RefCell::new(Vec::new()),
		})
	}

	#[must_use]
	/// # New Text Node.
	pub(crate) fn text<S: Into<StrTendril>>(contents: S) -> Handle {
		Self::new(NodeInner::Text { contents: RefCell::new(contents.into()) })
	}

	#[must_use]
	/// # Parent.
	pub(crate) fn parent(&self) -> Option<Handle> { self.parent.borrow().upgrade() }

	#[must_use]
	/// # Tag Name.
	///
	/// Return the (local) tag name if this is an element.
	pub(crate) fn tag(&self) -> Option<&LocalName> {
		if let NodeInner::Element { ref name, .. } = self.inner { Some(&name.local) }
		else { None }
	}

	#[must_use]
	/// # Is Element?
	///
	/// Returns `true` if this is an element with the given tag. The
	/// tokenizer lowercases tag names, so the comparison ignores case.
	pub(crate) fn is_elem(&self, tag: &str) -> bool {
		self.tag().is_some_and(|t| (**t).eq_ignore_ascii_case(tag))
	}

	#[must_use]
	/// # Is Content?
	///
	/// Returns `true` for elements and text, the only node types that count
	/// as document content.
	pub(crate) const fn is_content(&self) -> bool {
		matches!(self.inner, NodeInner::Element { .. } | NodeInner::Text { .. })
	}

	#[must_use]
	/// # Attribute Value.
	///
	/// Return the value of the (un-namespaced) attribute `key`, if present.
	pub(crate) fn attr(&self, key: &str) -> Option<String> {
		let NodeInner::Element { ref attrs, .. } = self.inner else { return None; };
		attrs.borrow()
			.iter()
			.find_map(|(k, v)| (*k.local).eq_ignore_ascii_case(key).then(|| v.to_string()))
	}

	#[must_use]
	/// # Content Children.
	///
	/// Return (cloned handles to) the element and text children, in order.
	pub(crate) fn content_children(&self) -> Vec<Handle> {
		self.children.borrow()
			.iter()
			.filter(|v| v.is_content())
			.map(Rc::clone)
			.collect()
	}
}



#[derive(Debug)]
/// # Node Kind/Data.
///
/// This enum holds the details for a given node, differentiated by kind.
pub(crate) enum NodeInner {
	/// # The Root Node.
	Document,

	/// # HTML Element.
	Element {
		/// # Tag Name.
		name: QualName,

		/// # Tag Attributes.
		attrs: RefCell<IndexMap<QualName, StrTendril>>,
	},

	/// # Text.
	Text {
		/// # Content.
		contents: RefCell<StrTendril>
	},

	/// # Comments, Doctypes, Processing Instructions.
	///
	/// We don't support these node types, but the `TreeSink` API requires we
	/// "create" them anyway.
	Ignored,
}



/// # Append Child.
///
/// Push `child` onto the end of `parent`'s children, detaching it from any
/// previous parent first.
pub(crate) fn append(parent: &Handle, child: Handle) {
	detach(&child);
	child.parent.replace(Rc::downgrade(parent));
	parent.children.borrow_mut().push(child);
}

/// # Detach.
///
/// Remove `node` from its parent, if any. Returns `true` if the node was
/// attached.
pub(crate) fn detach(node: &Handle) -> bool {
	let Some(parent) = node.parent.replace(Weak::new()).upgrade() else { return false; };
	let children: &mut Vec<_> = &mut parent.children.borrow_mut();
	if let Some(pos) = children.iter().position(|v| Rc::ptr_eq(v, node)) {
		children.remove(pos);
		true
	}
	else { false }
}

/// # Insert Before.
///
/// Move `child` into `sibling`'s parent, immediately before `sibling`.
/// Returns `false` (and leaves `child` alone) if `sibling` is unattached.
pub(crate) fn insert_before(sibling: &Handle, child: Handle) -> bool {
	if Rc::ptr_eq(sibling, &child) { return false; }
	let Some(parent) = sibling.parent() else { return false; };

	detach(&child);
	let children: &mut Vec<_> = &mut parent.children.borrow_mut();
	let Some(pos) = children.iter().position(|v| Rc::ptr_eq(v, sibling)) else {
		return false;
	};

	child.parent.replace(Rc::downgrade(&parent));
	children.insert(pos, child);
	true
}

/// # Replace.
///
/// Swap `old` out for `new` in `old`'s parent. Returns `false` if `old` is
/// unattached.
pub(crate) fn replace(old: &Handle, new: Handle) -> bool {
	if insert_before(old, new) { detach(old) }
	else { false }
}

/// # Reparent Children.
///
/// Drain all children from `old_parent` and append them to `new_parent`.
pub(crate) fn reparent_children(old_parent: &Handle, new_parent: &Handle) {
	let moved = std::mem::take(&mut *old_parent.children.borrow_mut());
	let weak = Rc::downgrade(new_parent);
	for child in &moved { child.parent.replace(Weak::clone(&weak)); }
	new_parent.children.borrow_mut().extend(moved);
}

#[must_use]
/// # Descendants By Tag.
///
/// Return every element below `handle` with the given tag, in document
/// order.
pub(crate) fn descendants_by_tag(handle: &Handle, tag: &str) -> Vec<Handle> {
	/// # Walk.
	fn walk(handle: &Handle, tag: &str, out: &mut Vec<Handle>) {
		for child in handle.children.borrow().iter() {
			if child.is_elem(tag) { out.push(Rc::clone(child)); }
			walk(child, tag, out);
		}
	}

	let mut out = Vec::new();
	walk(handle, tag, &mut out);
	out
}



#[cfg(test)]
mod tests {
	use super::*;
	use html5ever::{
		local_name,
		ns,
	};

	/// # Element Helper.
	fn elem(tag: LocalName) -> Handle {
		Node::new(NodeInner::Element {
			name: QualName::new(None, ns!(html), tag),
			attrs: RefCell::new(IndexMap::new()),
		})
	}

	/// # Text Helper.
	fn text_of(handle: &Handle) -> String {
		match handle.inner {
			NodeInner::Text { ref contents } => contents.borrow().to_string(),
			_ => String::new(),
		}
	}

	#[test]
	fn t_append_detach() {
		let root = Node::new(NodeInner::Document);
		let div = elem(local_name!("div"));
		append(&root, Rc::clone(&div));

		assert!(div.parent().is_some_and(|p| Rc::ptr_eq(&p, &root)));
		assert_eq!(root.children.borrow().len(), 1);

		assert!(detach(&div));
		assert!(div.parent().is_none());
		assert!(root.children.borrow().is_empty());

		// Already detached.
		assert!(! detach(&div));
	}

	#[test]
	fn t_append_moves() {
		let a = elem(local_name!("div"));
		let b = elem(local_name!("div"));
		let span = elem(local_name!("span"));

		append(&a, Rc::clone(&span));
		append(&b, Rc::clone(&span));

		// A node only ever has the one parent.
		assert!(a.children.borrow().is_empty());
		assert_eq!(b.children.borrow().len(), 1);
		assert!(span.parent().is_some_and(|p| Rc::ptr_eq(&p, &b)));
	}

	#[test]
	fn t_insert_before() {
		let root = Node::new(NodeInner::Document);
		let first = Node::text("one");
		let last = Node::text("three");
		append(&root, Rc::clone(&first));
		append(&root, Rc::clone(&last));

		assert!(insert_before(&last, Node::text("two")));
		let texts: Vec<String> = root.children.borrow().iter().map(text_of).collect();
		assert_eq!(texts, ["one", "two", "three"]);

		// Every child should point back at the root.
		assert!(root.children.borrow().iter().all(|c|
			c.parent().is_some_and(|p| Rc::ptr_eq(&p, &root))
		));

		// Can't insert next to an orphan.
		let orphan = Node::text("orphan");
		assert!(! insert_before(&orphan, Node::text("nope")));
	}

	#[test]
	fn t_replace() {
		let root = Node::new(NodeInner::Document);
		let br = elem(local_name!("br"));
		append(&root, Node::text("a"));
		append(&root, Rc::clone(&br));
		append(&root, Node::text("b"));

		assert!(replace(&br, Node::text("\n\n")));
		assert!(br.parent().is_none());
		let texts: Vec<String> = root.children.borrow().iter().map(text_of).collect();
		assert_eq!(texts, ["a", "\n\n", "b"]);
	}

	#[test]
	fn t_reparent_children() {
		let old = elem(local_name!("div"));
		let new = elem(local_name!("p"));
		append(&old, Node::text("a"));
		append(&old, elem(local_name!("br")));

		reparent_children(&old, &new);
		assert!(old.children.borrow().is_empty());
		assert_eq!(new.children.borrow().len(), 2);
		assert!(new.children.borrow().iter().all(|c|
			c.parent().is_some_and(|p| Rc::ptr_eq(&p, &new))
		));
	}

	#[test]
	fn t_descendants_by_tag() {
		let root = Node::new(NodeInner::Document);
		let p = elem(local_name!("p"));
		let img1 = elem(local_name!("img"));
		let img2 = elem(local_name!("img"));
		append(&root, Rc::clone(&img1));
		append(&root, Rc::clone(&p));
		append(&p, Rc::clone(&img2));

		let found = descendants_by_tag(&root, "IMG");
		assert_eq!(found.len(), 2);
		assert!(Rc::ptr_eq(&found[0], &img1));
		assert!(Rc::ptr_eq(&found[1], &img2));
		assert!(descendants_by_tag(&root, "video").is_empty());
	}

	#[test]
	fn t_tag_attr() {
		let img = elem(local_name!("img"));
		if let NodeInner::Element { ref attrs, .. } = img.inner {
			attrs.borrow_mut().insert(
				QualName::new(None, ns!(), local_name!("src")),
				StrTendril::from("a.png"),
			);
		}

		assert!(img.is_elem("img"));
		assert!(img.is_elem("IMG"));
		assert!(! img.is_elem("p"));
		assert_eq!(img.attr("src").as_deref(), Some("a.png"));
		assert_eq!(img.attr("SRC").as_deref(), Some("a.png"));
		assert_eq!(img.attr("width"), None);

		let text = Node::text("img");
		assert!(! text.is_elem("img"));
		assert_eq!(text.attr("src"), None);
	}
}
