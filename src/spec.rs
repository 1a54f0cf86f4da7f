/*!
# `RelNotes`: Questions of Spec.
*/

use html5ever::{
	interface::QualName,
	local_name,
	ns,
};



#[must_use]
/// # Is Void HTML Element?
///
/// Void elements never have children or closing tags.
pub(crate) const fn is_void_html_tag(tag: &QualName) -> bool {
	matches!(tag.ns, ns!(html)) &&
	matches!(
		tag.local,
		local_name!("area") |
		local_name!("base") |
		local_name!("basefont") |
		local_name!("bgsound") |
		local_name!("br") |
		local_name!("col") |
		local_name!("embed") |
		local_name!("frame") |
		local_name!("hr") |
		local_name!("img") |
		local_name!("input") |
		local_name!("keygen") |
		local_name!("link") |
		local_name!("meta") |
		local_name!("param") |
		local_name!("source") |
		local_name!("track") |
		local_name!("wbr")
	)
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_is_void_html_tag() {
		for i in [
			local_name!("br"),
			local_name!("hr"),
			local_name!("img"),
			local_name!("wbr"),
		] {
			let name = QualName::new(None, ns!(html), i);
			assert!(is_void_html_tag(&name));
		}

		for i in [
			local_name!("div"),
			local_name!("p"),
			local_name!("span"),
			local_name!("template"),
		] {
			let name = QualName::new(None, ns!(html), i);
			assert!(! is_void_html_tag(&name));
		}

		// Namespace matters.
		let name = QualName::new(None, ns!(svg), local_name!("img"));
		assert!(! is_void_html_tag(&name));
	}
}
