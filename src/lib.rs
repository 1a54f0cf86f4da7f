/*!
# `RelNotes`

`RelNotes` turns tracker work items into a release notes document.

Work items are grouped by (pre-run) queries, and each group becomes a section
of the notes. Along the way, the rich-text description of every item is
reduced to plain text by the [`Sanitizer`], and any images it references are
pulled out with [`extract_images`] so their bytes can be fetched from the
attachment store and laid out next to the text.

Both of those build a proper DOM tree from the (often very messy) markup
before doing anything with it, so unclosed tags, stray closers, and the like
are repaired rather than choked on.



## Sanitizing

By default, every tag except `<br>` is stripped, with the text of removed
elements promoted in their place; breaks are then swapped for blank lines.

```
use relnotes::sanitize;

assert_eq!(
    sanitize("<div>Fixed <b>the</b> thing.<br>Also the other thing.</div>").unwrap(),
    "Fixed the thing.\n\nAlso the other thing.",
);
```

Other allowlists can be set up with [`Sanitizer::with_tags`].



## Images

```
use relnotes::extract_images;

let images = extract_images(
    r#"<p>Before</p><img src="https://x/_apis/wit/attachments/3f2504e0-4f89-11d3-9a0c-0305e82c3301" width="640">"#
).unwrap();

assert_eq!(images.len(), 1);
assert_eq!(images[0].width, 640);
assert_eq!(
    images[0].attachment_id().map(|id| id.to_string()).as_deref(),
    Some("3f2504e0-4f89-11d3-9a0c-0305e82c3301"),
);
```
*/


#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(clippy::module_name_repetitions, reason = "Repetition is preferred.")]



pub mod config;
mod dom;
mod entity;
mod error;
pub mod gather;
mod image;
pub mod notes;
mod sanitize;
mod ser;
pub mod source;
mod spec;

pub use config::{
	Config,
	Footer,
	ReleaseDate,
	ReleaseInfo,
	WorkItemGroup,
};
pub use entity::decode as decode_entities;
pub use error::RelnotesError;
pub use gather::{
	gather,
	gather_group,
	GroupItems,
	ReleaseItem,
};
pub use image::{
	attachment_id,
	AttachmentId,
	extract_images,
	ImageAttachment,
	ImageReference,
};
pub use notes::ReleaseNotes;
pub use sanitize::{
	LINE_BREAK,
	sanitize,
	Sanitizer,
};
pub use source::{
	AttachmentDir,
	AttachmentSource,
	ExportSource,
	WorkItem,
	WorkItemSource,
};
