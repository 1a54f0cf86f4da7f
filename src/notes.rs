/*!
# `RelNotes`: Release Notes

This assembles the gathered work items into the final document: a cover
page, then one page per group, each listing its items with their cleaned-up
descriptions and images.

The rendered form (via `Display`) is plain text, with pages separated by form
feeds.
*/

use crate::{
	Config,
	Footer,
	GroupItems,
	ImageAttachment,
	ReleaseDate,
	ReleaseItem,
	RelnotesError,
	Sanitizer,
	WorkItemGroup,
};
use std::fmt;



/// # Fallback Title Field.
const FALLBACK_TITLE: &str = "System.Title";

/// # Maximum Image Width.
///
/// Anything bigger gets scaled down to the page width.
const MAX_WIDTH: u32 = 400;

/// # Maximum Image Height.
const MAX_HEIGHT: u32 = 500;

/// # Placeholder Width.
const PLACEHOLDER_WIDTH: u32 = 150;

/// # Placeholder Height.
const PLACEHOLDER_HEIGHT: u32 = 75;

/// # Page Rule.
const RULE: &str = "------------------------------------------------------------------------";

/// # Page Break.
const PAGE_BREAK: char = '\x0C';

/// # Entry Indentation.
const INDENT: &str = "   ";

/// # Empty Section.
const NO_ITEMS: &str = "No items were included in this release.";



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Image Placement.
pub enum Placement {
	/// # Exact Size.
	Exact {
		/// # Width.
		width: u32,

		/// # Height.
		height: u32,
	},

	/// # Scale to Page Width.
	FitWidth,

	/// # Placeholder Box.
	///
	/// The image's size is unknown, so it probably won't render either.
	Placeholder {
		/// # Width.
		width: u32,

		/// # Height.
		height: u32,
	},
}

impl Placement {
	#[must_use]
	/// # From Dimensions.
	pub const fn new(width: u32, height: u32) -> Self {
		if MAX_WIDTH < width || MAX_HEIGHT < height { Self::FitWidth }
		else if width == 0 || height == 0 {
			Self::Placeholder { width: PLACEHOLDER_WIDTH, height: PLACEHOLDER_HEIGHT }
		}
		else { Self::Exact { width, height } }
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Figure.
///
/// An image and where it goes.
pub struct Figure {
	/// # Image.
	pub image: ImageAttachment,

	/// # Placement.
	pub placement: Placement,
}

impl From<ImageAttachment> for Figure {
	fn from(image: ImageAttachment) -> Self {
		let placement = Placement::new(image.reference.width, image.reference.height);
		Self { image, placement }
	}
}

impl fmt::Display for Figure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let url = self.image.reference.url.as_str();
		match self.placement {
			Placement::Exact { width, height } => write!(f, "[Image: {url} ({width}x{height})]"),
			Placement::FitWidth => write!(f, "[Image: {url} (fit to width)]"),
			Placement::Placeholder { width, height } =>
				write!(f, "[Image unavailable: {url} ({width}x{height})]"),
		}
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Entry.
///
/// One work item's worth of notes.
pub struct Entry {
	/// # Number (Within the Section).
	pub number: usize,

	/// # Work Item ID.
	pub id: u64,

	/// # Title.
	pub title: String,

	/// # Body (Plain Text).
	pub body: String,

	/// # Figures.
	pub figures: Vec<Figure>,
}

impl fmt::Display for Entry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{}. {}", self.number, self.title)?;
		writeln!(f, "{INDENT}Dev Ops: {}", self.id)?;

		for line in self.body.lines() {
			let line = line.trim_end();
			if line.is_empty() { writeln!(f)?; }
			else { writeln!(f, "{INDENT}{line}")?; }
		}

		for figure in &self.figures {
			writeln!(f, "{INDENT}{figure}")?;
		}

		writeln!(f)
	}
}

impl Entry {
	/// # New.
	///
	/// Build an entry from a release item, or return `None` if it should be
	/// skipped.
	///
	/// ## Errors
	///
	/// Returns an error if the description can't be sanitized.
	fn new(
		number: usize,
		group: &WorkItemGroup,
		src: &ReleaseItem,
		skip_empty: bool,
		sanitizer: &Sanitizer,
	) -> Result<Option<Self>, RelnotesError> {
		// Every item needs a title.
		let Some(title) = non_blank(src, &group.title_field)
			.or_else(|| non_blank(src, FALLBACK_TITLE))
		else { return Ok(None); };

		let body = match non_blank(src, &group.description_field) {
			Some(raw) => sanitizer.sanitize(&raw)?.trim().to_owned(),
			None if skip_empty => return Ok(None),
			None => String::new(),
		};

		Ok(Some(Self {
			number,
			id: src.item.id,
			title,
			body,
			figures: src.images.iter().cloned().map(Figure::from).collect(),
		}))
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Section.
pub struct Section {
	/// # Name.
	pub name: String,

	/// # Entries.
	pub entries: Vec<Entry>,
}



#[derive(Debug, Clone)]
/// # Release Notes.
///
/// ## Examples
///
/// ```
/// use relnotes::{
///     AttachmentId,
///     Config,
///     gather,
///     ExportSource,
///     ReleaseNotes,
///     Sanitizer,
/// };
/// use std::collections::HashMap;
///
/// let config = Config::from_json(r#"{
///     "releaseInfo": { "version": "1.0", "date": "2024-03-05" },
///     "workItemGroups": [{ "name": "Features", "query": "Q", "fields": "System.Id" }]
/// }"#).unwrap();
///
/// let source = ExportSource::from_json(r#"{
///     "Features": [{
///         "id": 1,
///         "fields": { "System.Title": "Dark mode", "System.Description": "<p>Finally.</p>" }
///     }]
/// }"#).unwrap();
///
/// let attachments: HashMap<AttachmentId, Vec<u8>> = HashMap::new();
/// let groups = gather(&config, &source, &attachments).unwrap();
/// let notes = ReleaseNotes::build(&config, &groups, &Sanitizer::default()).unwrap();
/// let text = notes.to_string();
/// assert!(text.contains("Update 1.0 - March 05, 2024"));
/// assert!(text.contains("1. Dark mode"));
/// assert!(text.contains("Finally."));
/// ```
pub struct ReleaseNotes {
	/// # Version.
	pub version: String,

	/// # Release Date.
	pub date: ReleaseDate,

	/// # Cover Footer.
	pub footer: Footer,

	/// # Sections.
	pub sections: Vec<Section>,
}

impl fmt::Display for ReleaseNotes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let total = self.pages();

		// The cover.
		writeln!(f, "Release Notes")?;
		writeln!(f)?;
		writeln!(f, "Update {} - {}", self.version, self.date.long())?;
		self.write_footer(f)?;
		write_page_end(f, 1, total)?;

		// The sections.
		let header = format!("Release {} - {}", self.version, self.date.short());
		for (k, section) in self.sections.iter().enumerate() {
			write!(f, "{PAGE_BREAK}")?;
			writeln!(f, "{header}")?;
			writeln!(f)?;
			writeln!(f, "{}", section.name)?;
			writeln!(f)?;

			if section.entries.is_empty() {
				writeln!(f, "{INDENT}{NO_ITEMS}")?;
				writeln!(f)?;
			}
			else {
				for entry in &section.entries {
					<Entry as fmt::Display>::fmt(entry, f)?;
				}
			}

			write_page_end(f, k + 2, total)?;
		}

		Ok(())
	}
}

impl ReleaseNotes {
	/// # Build.
	///
	/// Assemble the notes, with one section per configured group (in order).
	///
	/// Items are numbered from one within each section. Items without any
	/// sort of title are left out, as are items without a description if
	/// the configuration says to skip those.
	///
	/// ## Errors
	///
	/// Returns an error if a description can't be sanitized.
	pub fn build(config: &Config, groups: &[GroupItems], sanitizer: &Sanitizer)
	-> Result<Self, RelnotesError> {
		let mut sections = Vec::with_capacity(config.work_item_groups.len());
		for group in &config.work_item_groups {
			let items = groups.iter()
				.find(|g| g.group.name.trim().eq_ignore_ascii_case(group.name.trim()))
				.map_or(&[][..], |g| g.items.as_slice());

			let mut entries = Vec::with_capacity(items.len());
			for item in items {
				if let Some(entry) = Entry::new(
					entries.len() + 1,
					group,
					item,
					config.skip_work_items_with_no_notes,
					sanitizer,
				)? {
					entries.push(entry);
				}
			}

			sections.push(Section { name: group.name.trim().to_owned(), entries });
		}

		Ok(Self {
			version: config.release_info.version.trim().to_owned(),
			date: config.release_info.date(),
			footer: config.footer.clone(),
			sections,
		})
	}

	#[must_use]
	/// # Page Count.
	///
	/// The cover plus one page per section.
	pub fn pages(&self) -> usize { self.sections.len() + 1 }

	/// # Write Cover Footer.
	fn write_footer(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let address = self.footer.address.trim();
		let link = self.footer.hyperlink.trim();
		let text = self.footer.hyperlink_text.trim();
		if address.is_empty() && link.is_empty() && text.is_empty() { return Ok(()); }

		writeln!(f)?;
		for line in address.lines() { writeln!(f, "{}", line.trim())?; }
		match (text.is_empty(), link.is_empty()) {
			(false, false) => writeln!(f, "{text} <{link}>"),
			(false, true) => writeln!(f, "{text}"),
			(true, false) => writeln!(f, "{link}"),
			(true, true) => Ok(()),
		}
	}
}

/// # Write Page End.
fn write_page_end(f: &mut fmt::Formatter<'_>, page: usize, total: usize) -> fmt::Result {
	writeln!(f)?;
	writeln!(f, "{RULE}")?;
	writeln!(f, "Page {page} of {total}")
}

/// # Non-Blank Field.
fn non_blank(src: &ReleaseItem, field: &str) -> Option<String> {
	let value = src.item.field(field)?;
	let value = value.trim();
	if value.is_empty() { None }
	else { Some(value.to_owned()) }
}
