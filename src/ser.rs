/*!
# `RelNotes`: Serialization

Sanitized fields are headed for a plain-text renderer, not a browser, so
text is written back out exactly as it was decoded. Only attribute values
are escaped, and those can only appear on explicitly allowed tags.
*/

use crate::{
	dom::node::{
		Handle,
		NodeInner,
	},
	spec,
};
use html5ever::{
	ns,
	QualName,
};
use std::{
	collections::VecDeque,
	rc::Rc,
};



#[must_use]
/// # Serialize Children.
///
/// Serialize the children of `handle` (but not `handle` itself) into a
/// string, i.e. its "inner HTML".
///
/// This borrows heavily from `markup5ever_rcdom::SerializableHandle`, but
/// doesn't actually leverage the `Serialize` trait.
pub(crate) fn serialize_children(handle: &Handle) -> String {
	#[derive(Debug)]
	/// # Stage.
	enum Stage {
		/// # Open Tag.
		Open(Handle),

		/// # Close Tag.
		Close(QualName),
	}

	// What we're writing to.
	let mut out = String::with_capacity(256);

	// A stack to work with.
	let mut stack = VecDeque::new();
	stack.extend(
		handle.children.borrow()
			.iter()
			.map(|h| Stage::Open(Rc::clone(h)))
	);

	while let Some(op) = stack.pop_front() {
		match op {
			// New tag!
			Stage::Open(handle) => match handle.inner {
				NodeInner::Element { ref name, ref attrs } => {
					out.push('<');
					out.push_str(&name.local);
					for (key, value) in attrs.borrow().iter() {
						write_attr(&mut out, key, value);
					}
					out.push('>');

					// Void tags have no children and no closing tag.
					if spec::is_void_html_tag(name) { continue; }

					stack.reserve(1 + handle.children.borrow().len());
					stack.push_front(Stage::Close(name.clone()));

					for child in handle.children.borrow().iter().rev() {
						stack.push_front(Stage::Open(Rc::clone(child)));
					}
				},
				NodeInner::Text { ref contents } => out.push_str(&contents.borrow()),

				// Unused.
				NodeInner::Document |
				NodeInner::Ignored => {},
			},

			// Close it.
			Stage::Close(name) => {
				out.push_str("</");
				out.push_str(&name.local);
				out.push('>');
			},
		}
	}

	out
}

/// # Write Tag Attribute.
///
/// Values are always double-quoted, escaping `&` and `"`.
fn write_attr(out: &mut String, key: &QualName, value: &str) {
	// Handle (some) namespaces, and/or just add a leading space.
	match key.ns {
		ns!(xml) => out.push_str(" xml:"),
		ns!(xmlns) =>
			if &*key.local == "xmlns" { out.push(' '); }
			else { out.push_str(" xmlns:"); },
		ns!(xlink) => out.push_str(" xlink:"),
		_ => out.push(' '),
	}

	// Push the key name.
	out.push_str(&key.local);

	// Push the value.
	out.push_str("=\"");
	for c in value.chars() {
		match c {
			'&' => { out.push_str("&amp;"); },
			'"' => { out.push_str("&#34;"); },
			'\u{a0}' => { out.push_str("&nbsp;"); },
			_ => { out.push(c); },
		}
	}
	out.push('"');
}



#[cfg(test)]
mod tests {
	use crate::dom::Tree;

	#[test]
	fn t_serialize() {
		for (raw, expected) in [
			("", ""),
			("Just text.", "Just text."),
			("<p>One</p><p>Two</p>", "<p>One</p><p>Two</p>"),
			("Line<br>Break", "Line<br>Break"),
			("<br/>", "<br>"),
			("<img src=\"a.png\" alt='Say \"hi\"'>", "<img src=\"a.png\" alt=\"Say &#34;hi&#34;\">"),
			("<a href=\"?a=1&amp;b=2\">Link</a>", "<a href=\"?a=1&amp;b=2\">Link</a>"),
			("<b>unclosed", "<b>unclosed</b>"),
			("<!-- comment -->text", "text"),
		] {
			let tree = Tree::parse(raw).expect("Tree parse failed.");
			assert_eq!(tree.inner_html(), expected, "Serializing {raw:?}");
		}
	}

	#[test]
	fn t_serialize_text_raw() {
		// Text comes back out without any escaping.
		let tree = Tree::parse("1 &lt; 2 &amp;&amp; 3 &gt; 2").expect("Tree parse failed.");
		assert_eq!(tree.inner_html(), "1 < 2 && 3 > 2");
	}
}
