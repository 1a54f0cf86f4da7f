/*!
# `RelNotes`: Character References.

Rich-text fields are decoded _before_ they are parsed so that references like
`&nbsp;` or `&quot;` come through as the literal characters they stand for.

Decoding runs until the text stops changing, so double-encoded references
(`&amp;lt;`) end up in the same place as single ones. Whatever `&` is left
afterwards is escaped again before parsing, leaving nothing for the
tokenizer to decode a second time.
*/

use std::borrow::Cow;



#[must_use]
/// # Decode Character References.
///
/// Replace named (`&amp;`, `&eacute;`) and numeric (`&#38;`, `&#x26;`)
/// character references with their literal values, repeating until nothing
/// more can be decoded. Unrecognized references are passed through as-is.
pub fn decode(src: &str) -> Cow<'_, str> {
	let mut out = html_escape::decode_html_entities(src);

	// Each successful decode shrinks the text, so this always ends.
	loop {
		let next = html_escape::decode_html_entities(&out);
		if next.len() == out.len() { break; }
		let next = next.into_owned();
		out = Cow::Owned(next);
	}

	out
}

#[must_use]
/// # Escape Ampersands.
///
/// Re-escape any `&` in already-decoded text so the parser reads it
/// literally.
pub(crate) fn escape_amp(src: &str) -> Cow<'_, str> {
	if src.contains('&') { Cow::Owned(src.replace('&', "&amp;")) }
	else { Cow::Borrowed(src) }
}
