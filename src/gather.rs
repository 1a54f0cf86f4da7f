/*!
# `RelNotes`: Gathering

This pairs each work item with the images its description references,
fetching their bytes from an [`AttachmentSource`].

Items are processed in parallel, but results come back in the original
order. A failure with one item's images is recorded and otherwise ignored;
the item still makes the notes, just without pictures.
*/

use crate::{
	AttachmentSource,
	Config,
	extract_images,
	ImageAttachment,
	RelnotesError,
	WorkItem,
	WorkItemGroup,
	WorkItemSource,
};
use rayon::iter::{
	IntoParallelIterator,
	ParallelIterator,
};



#[derive(Debug, Clone, PartialEq)]
/// # Release Item.
///
/// A work item and its images, in the order they were referenced.
pub struct ReleaseItem {
	/// # Work Item.
	pub item: WorkItem,

	/// # Images.
	pub images: Vec<ImageAttachment>,
}



#[derive(Debug, Clone)]
/// # Group Items.
///
/// Everything gathered for one group.
pub struct GroupItems {
	/// # Group.
	pub group: WorkItemGroup,

	/// # Items.
	pub items: Vec<ReleaseItem>,

	/// # Image Failures.
	///
	/// Work item IDs paired with whatever went wrong fetching their images.
	pub failures: Vec<(u64, RelnotesError)>,
}



/// # Gather Group.
///
/// Fetch the images for each of a group's items.
pub fn gather_group<A>(group: &WorkItemGroup, items: Vec<WorkItem>, attachments: &A)
-> GroupItems
where A: AttachmentSource + ?Sized {
	let results: Vec<(WorkItem, Result<Vec<ImageAttachment>, RelnotesError>)> = items
		.into_par_iter()
		.map(|item| {
			let images = item_images(group, &item, attachments);
			(item, images)
		})
		.collect();

	let mut out = GroupItems {
		group: group.clone(),
		items: Vec::with_capacity(results.len()),
		failures: Vec::new(),
	};

	for (item, images) in results {
		let images = images.unwrap_or_else(|e| {
			out.failures.push((item.id, e));
			Vec::new()
		});
		out.items.push(ReleaseItem { item, images });
	}

	out
}

/// # Gather.
///
/// Query and gather each configured group, in order.
///
/// ## Errors
///
/// Image problems are recorded per item, but if the work items for a group
/// can't be had at all, that error is returned.
pub fn gather<S, A>(config: &Config, source: &S, attachments: &A)
-> Result<Vec<GroupItems>, RelnotesError>
where S: WorkItemSource + ?Sized, A: AttachmentSource + ?Sized {
	config.work_item_groups.iter()
		.map(|group| {
			let items = source.work_items(group)?;
			Ok(gather_group(group, items, attachments))
		})
		.collect()
}

/// # Item Images.
///
/// Extract the image references from the item's description and fetch the
/// data for each. Empty attachments are skipped.
fn item_images<A>(group: &WorkItemGroup, item: &WorkItem, attachments: &A)
-> Result<Vec<ImageAttachment>, RelnotesError>
where A: AttachmentSource + ?Sized {
	let Some(description) = item.field(&group.description_field) else {
		return Ok(Vec::new());
	};
	if description.trim().is_empty() { return Ok(Vec::new()); }

	let mut out = Vec::new();
	for reference in extract_images(&description)? {
		let id = reference.attachment_id().ok_or(RelnotesError::AttachmentUrl)?;
		let bytes = attachments.attachment(id)?;
		if ! bytes.is_empty() {
			out.push(ImageAttachment::new(reference, bytes));
		}
	}

	Ok(out)
}
