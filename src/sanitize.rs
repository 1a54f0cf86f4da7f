/*!
# `RelNotes`: Sanitizer.

Rich-text fields are reduced to plain text, keeping only an allowlist of
tags. Disallowed elements are unwrapped rather than deleted, so text nested
inside them survives; line breaks are then converted into blank lines for the
renderer.
*/

use crate::{
	dom::{
		node::{
			self,
			Node,
			NodeInner,
		},
		Tree,
	},
	entity,
	RelnotesError,
};
use std::{
	collections::{
		BTreeSet,
		VecDeque,
	},
	rc::Rc,
};



/// # Line Break Replacement.
///
/// Each `<br>` becomes a blank line.
pub const LINE_BREAK: &str = "\n\n";



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Sanitizer.
///
/// This holds the tag allowlist. By default only `<br>` is allowed, and
/// since those are converted to text at the end, the output is markup-free.
///
/// Instances are immutable and cheap to share; pass one (by reference)
/// wherever fields need cleaning rather than stashing it anywhere global.
///
/// ## Examples
///
/// ```
/// use relnotes::Sanitizer;
///
/// let clean = Sanitizer::default()
///     .sanitize("<span>Hello <br> World</span>")
///     .unwrap();
/// assert_eq!(clean, "Hello \n\n World");
/// ```
pub struct Sanitizer {
	/// # Allowed Tags (Lowercase).
	allowed: BTreeSet<String>,
}

impl Default for Sanitizer {
	#[inline]
	fn default() -> Self { Self::with_tags(["br"]) }
}

impl Sanitizer {
	#[must_use]
	/// # With Tags.
	///
	/// Create a sanitizer allowing the given tags (case-insensitively).
	pub fn with_tags<I, S>(tags: I) -> Self
	where I: IntoIterator<Item=S>, S: AsRef<str> {
		let allowed = tags.into_iter()
			.filter_map(|t| {
				let t = t.as_ref().trim();
				if t.is_empty() { None }
				else { Some(t.to_ascii_lowercase()) }
			})
			.collect();
		Self { allowed }
	}

	#[must_use]
	/// # Is Allowed?
	pub fn allows(&self, tag: &str) -> bool {
		self.allowed.iter().any(|t| t.eq_ignore_ascii_case(tag))
	}

	/// # Sanitize.
	///
	/// Strip all but the allowed tags from the HTML fragment, promoting the
	/// children of removed elements into their place, then replace any
	/// `<br>` with a blank line.
	///
	/// Empty or whitespace-only input is returned as-is, as is input with
	/// nothing (but comments, etc.) in it, after entity decoding.
	///
	/// Entity-encoded markup is decoded first, so it gets stripped like any
	/// other markup. Sanitizing the output again returns it unchanged.
	///
	/// ## Errors
	///
	/// Malformed markup is repaired, not rejected, so this should only fail
	/// if the parser gets itself into trouble.
	pub fn sanitize(&self, html: &str) -> Result<String, RelnotesError> {
		if html.trim().is_empty() { return Ok(html.to_owned()); }

		let html = entity::decode(html);
		let tree = Tree::parse(&entity::escape_amp(&html))?;

		// Nothing to sanitize is fine too.
		let top = tree.top_level();
		if top.is_empty() { return Ok(html.into_owned()); }

		// Work through the nodes breadth-first. Children promoted from a
		// removed element go to the back of the queue so they get checked
		// too.
		let mut queue = VecDeque::from(top);
		while let Some(handle) = queue.pop_front() {
			let NodeInner::Element { ref name, .. } = handle.inner else { continue; };

			// Allowed elements stay, but their children still need checking.
			if self.allows(&name.local) {
				queue.extend(handle.content_children());
				continue;
			}

			// Empty elements can just go.
			let children = handle.content_children();
			if children.is_empty() {
				node::detach(&handle);
				continue;
			}

			// Otherwise unwrap it.
			for child in children {
				queue.push_back(Rc::clone(&child));
				node::insert_before(&handle, child);
			}
			node::detach(&handle);
		}

		// Convert line breaks to blank lines.
		for br in tree.elements_by_tag("br") {
			node::replace(&br, Node::text(LINE_BREAK));
		}

		Ok(tree.inner_html())
	}
}

/// # Sanitize (Default).
///
/// Sanitize with the default allowlist (`<br>` only).
///
/// ## Errors
///
/// See [`Sanitizer::sanitize`].
pub fn sanitize(html: &str) -> Result<String, RelnotesError> {
	Sanitizer::default().sanitize(html)
}
