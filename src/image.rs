/*!
# `RelNotes`: Images.

Rich-text fields reference their images by URL. This module finds those
references, works out which tracker attachment each one points to, and pairs
them with their bytes once fetched.
*/

use crate::{
	dom::Tree,
	entity,
	RelnotesError,
};
use std::fmt;
use uuid::Uuid;



#[derive(Debug, Clone, Default, Eq, Hash, PartialEq)]
/// # Image Reference.
///
/// The source and _declared_ dimensions of an `<img>` element. A dimension
/// of zero means the markup didn't say.
pub struct ImageReference {
	/// # Source URL.
	pub url: String,

	/// # Width.
	pub width: u32,

	/// # Height.
	pub height: u32,
}

impl ImageReference {
	#[must_use]
	/// # Attachment ID.
	///
	/// Shorthand for [`attachment_id`] on the source URL.
	pub fn attachment_id(&self) -> Option<AttachmentId> { attachment_id(&self.url) }
}



/// # Extract Images.
///
/// Return a reference for each `<img>` element in the HTML fragment, in
/// document order. Callers pair fetched bytes back up by position, so the
/// order matters.
///
/// Empty input, or input with no content, yields an empty list.
///
/// ## Examples
///
/// ```
/// use relnotes::extract_images;
///
/// let images = extract_images(r#"<p><img src="b.png" width="10" height="20"></p>"#)
///     .unwrap();
/// assert_eq!(images.len(), 1);
/// assert_eq!(images[0].url, "b.png");
/// assert_eq!((images[0].width, images[0].height), (10, 20));
/// ```
///
/// ## Errors
///
/// A declared width or height that isn't a non-negative integer fails the
/// whole extraction.
pub fn extract_images(html: &str) -> Result<Vec<ImageReference>, RelnotesError> {
	if html.trim().is_empty() { return Ok(Vec::new()); }

	let html = entity::decode(html);
	let tree = Tree::parse(&entity::escape_amp(&html))?;
	if tree.top_level().is_empty() { return Ok(Vec::new()); }

	tree.elements_by_tag("img")
		.into_iter()
		.map(|img| Ok(ImageReference {
			url: img.attr("src").unwrap_or_default(),
			width: dimension(img.attr("width").as_deref(), RelnotesError::ImageWidth)?,
			height: dimension(img.attr("height").as_deref(), RelnotesError::ImageHeight)?,
		}))
		.collect()
}

/// # Parse Dimension.
///
/// Missing is zero; anything else has to parse.
fn dimension(raw: Option<&str>, err: RelnotesError) -> Result<u32, RelnotesError> {
	match raw {
		None => Ok(0),
		Some(raw) => raw.trim().parse::<u32>().map_err(|_| err),
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Attachment ID.
///
/// Tracker attachments are identified by GUID. The `Display` form is the
/// usual lowercase hyphenated one.
pub struct AttachmentId(Uuid);

impl fmt::Display for AttachmentId {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		<Uuid as fmt::Display>::fmt(&self.0, f)
	}
}

impl From<Uuid> for AttachmentId {
	#[inline]
	fn from(src: Uuid) -> Self { Self(src) }
}

impl AttachmentId {
	#[must_use]
	/// # Parse.
	///
	/// Accept 32 hex digits, optionally hyphenated 8-4-4-4-12, optionally
	/// wrapped in braces.
	pub fn parse(src: &str) -> Option<Self> {
		Uuid::parse_str(src.trim()).ok().map(Self)
	}

	#[must_use]
	/// # As UUID.
	pub const fn as_uuid(&self) -> &Uuid { &self.0 }
}

#[must_use]
/// # Attachment ID From URL.
///
/// Attachment URLs end with the attachment's GUID, e.g.
/// `https://host/org/project/_apis/wit/attachments/<guid>?fileName=x.png`.
///
/// The scheme, authority, query, and fragment are ignored; the last
/// non-empty path segment must parse as an [`AttachmentId`].
pub fn attachment_id(url: &str) -> Option<AttachmentId> {
	let url = url.trim();
	let url = url.split(['?', '#']).next().unwrap_or(url);

	// Drop the scheme and authority.
	let path = match url.find("://") {
		Some(pos) => {
			let rest = &url[pos + 3..];
			rest.find('/').map_or("", |p| &rest[p..])
		},
		None => url,
	};

	path.rsplit('/')
		.find(|s| ! s.is_empty())
		.and_then(AttachmentId::parse)
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Image Attachment.
///
/// An image reference paired with its (fetched) bytes.
pub struct ImageAttachment {
	/// # Reference.
	pub reference: ImageReference,

	/// # Image Data.
	pub bytes: Vec<u8>,
}

impl ImageAttachment {
	#[must_use]
	/// # New.
	///
	/// Pair a reference with its bytes. Any dimension the markup left out is
	/// filled in from the image header, when it can be read; otherwise it
	/// stays zero.
	pub fn new(mut reference: ImageReference, bytes: Vec<u8>) -> Self {
		if
			(reference.width == 0 || reference.height == 0) &&
			let Ok(size) = imagesize::blob_size(&bytes)
		{
			if reference.width == 0 {
				reference.width = u32::try_from(size.width).unwrap_or(u32::MAX);
			}
			if reference.height == 0 {
				reference.height = u32::try_from(size.height).unwrap_or(u32::MAX);
			}
		}

		Self { reference, bytes }
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	/// # GUID For Testing.
	const GUID: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";

	/// # Tiny PNG.
	///
	/// Just the signature and IHDR chunk of a 3x5 image, which is all the
	/// header sniffer needs.
	const PNG_3X5: &[u8] = &[
		0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n',
		0, 0, 0, 13, b'I', b'H', b'D', b'R',
		0, 0, 0, 3, 0, 0, 0, 5,
		8, 6, 0, 0, 0,
		0x1f, 0x15, 0xc4, 0x89,
	];

	#[test]
	fn t_extract_blank() {
		for raw in ["", "   ", "\n\t", "not html at all", "<!-- <img src=x> -->"] {
			assert!(extract_images(raw).unwrap().is_empty(), "Found images in {raw:?}.");
		}
	}

	#[test]
	fn t_extract_order() {
		let images = extract_images(
			r#"<img src="a.png"/><p><img src="b.png" width="10" height="20"/></p>"#
		).unwrap();
		assert_eq!(images, vec![
			ImageReference { url: "a.png".to_owned(), width: 0, height: 0 },
			ImageReference { url: "b.png".to_owned(), width: 10, height: 20 },
		]);
	}

	#[test]
	fn t_extract_attrs() {
		let images = extract_images(
			"<IMG SRC='x.png' WIDTH=' 7 '><img alt=nothing><div><span><img height=3 src=&quot;q.png&quot;></span></div>"
		).unwrap();
		assert_eq!(images.len(), 3);
		assert_eq!(images[0], ImageReference { url: "x.png".to_owned(), width: 7, height: 0 });
		assert_eq!(images[1], ImageReference::default());
		assert_eq!(images[2], ImageReference { url: "q.png".to_owned(), width: 0, height: 3 });
	}

	#[test]
	fn t_extract_strict() {
		assert!(matches!(
			extract_images("<img src='x.png' width='abc'>"),
			Err(RelnotesError::ImageWidth),
		));
		assert!(matches!(
			extract_images("<img src='x.png' width='10' height='10px'>"),
			Err(RelnotesError::ImageHeight),
		));
		assert!(matches!(
			extract_images("<img src='x.png' width='-1'>"),
			Err(RelnotesError::ImageWidth),
		));

		// One bad apple spoils the bunch.
		assert!(extract_images("<img src='a.png'><img src='b.png' width=''>").is_err());
	}

	#[test]
	fn t_attachment_id_parse() {
		let id = AttachmentId::parse(GUID).expect("GUID failed.");
		assert_eq!(id.to_string(), GUID);

		// Other accepted forms.
		for raw in [
			"3F2504E0-4F89-11D3-9A0C-0305E82C3301",
			"{3f2504e0-4f89-11d3-9a0c-0305e82c3301}",
			"3f2504e04f8911d39a0c0305e82c3301",
			" 3f2504e04f8911d39a0c0305e82c3301 ",
		] {
			assert_eq!(AttachmentId::parse(raw), Some(id), "Parsing {raw:?}");
		}

		// The UUID conversion is lossless.
		assert_eq!(AttachmentId::from(*id.as_uuid()), id);

		// Not GUIDs.
		for raw in [
			"",
			"image.png",
			"3f2504e0-4f89-11d3-9a0c-0305e82c330",
			"3f2504e0-4f89-11d3-9a0c-0305e82c3301a",
			"3f2504e04f89-11d3-9a0c-0305e82c33011",
			"zf2504e0-4f89-11d3-9a0c-0305e82c3301",
			"3f2504e0-4f89-11d3-9a0c-0305e82c33-1",
			"{3f2504e0-4f89-11d3-9a0c-0305e82c3301",
		] {
			assert_eq!(AttachmentId::parse(raw), None, "Parsing {raw:?}");
		}
	}

	#[test]
	fn t_attachment_id_url() {
		let id = AttachmentId::parse(GUID);
		for url in [
			format!("https://dev.example.com/org/proj/_apis/wit/attachments/{GUID}?fileName=image.png"),
			format!("https://dev.example.com/org/_apis/wit/attachments/{GUID}/"),
			format!("http://host:8080/{GUID}#frag"),
			format!("/_apis/wit/attachments/{GUID}"),
			GUID.to_owned(),
		] {
			assert_eq!(attachment_id(&url), id, "Parsing {url:?}");
		}

		for url in [
			"",
			"https://dev.example.com/",
			"https://dev.example.com/org/image.png",
			"https://3f2504e0-4f89-11d3-9a0c-0305e82c3301.example.com/a.png",
		] {
			assert_eq!(attachment_id(url), None, "Parsing {url:?}");
		}
	}

	#[test]
	fn t_attachment_dimensions() {
		// Missing dimensions come from the header.
		let img = ImageAttachment::new(ImageReference::default(), PNG_3X5.to_vec());
		assert_eq!((img.reference.width, img.reference.height), (3, 5));

		// Declared dimensions are left alone.
		let img = ImageAttachment::new(
			ImageReference { url: String::new(), width: 30, height: 0 },
			PNG_3X5.to_vec(),
		);
		assert_eq!((img.reference.width, img.reference.height), (30, 5));

		// Garbage stays zero.
		let img = ImageAttachment::new(ImageReference::default(), b"not an image".to_vec());
		assert_eq!((img.reference.width, img.reference.height), (0, 0));
	}
}
