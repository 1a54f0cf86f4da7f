/*!
# `RelNotes`: Configuration

The settings live in a JSON file with camelCase keys, e.g.

```json
{
  "product": "Acme",
  "outputPath": "/tmp/notes",
  "skipWorkItemsWithNoNotes": true,
  "releaseInfo": { "version": "2.1", "date": "2024-03-05" },
  "footer": {
    "address": "123 Main St.",
    "hyperlink": "https://acme.example.com",
    "hyperlinkText": "acme.example.com"
  },
  "workItemGroups": [
    {
      "name": "Features",
      "query": "SELECT [System.Id] FROM WorkItems",
      "fields": "System.Id, System.Title",
      "titleField": "Custom.ReleaseTitle",
      "descriptionField": "Custom.ReleaseNotes"
    }
  ]
}
```
*/

use crate::RelnotesError;
use chrono::{
	Datelike,
	NaiveDate,
	Utc,
};
use serde::Deserialize;
use serde_json::Value;
use std::{
	fmt,
	path::{
		Path,
		PathBuf,
	},
};

/// # Default Title Field.
const TITLE_FIELD: &str = "System.Title";

/// # Default Description Field.
const DESCRIPTION_FIELD: &str = "System.Description";



#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// # Configuration.
pub struct Config {
	#[serde(default = "default_product")]
	/// # Product Name.
	///
	/// This is used as the prefix of the output file name.
	pub product: String,

	#[serde(default)]
	/// # Output Directory.
	///
	/// Empty means the current working directory.
	pub output_path: String,

	#[serde(default = "default_true")]
	/// # Skip Items Without Notes?
	pub skip_work_items_with_no_notes: bool,

	#[serde(default)]
	/// # Release Details.
	pub release_info: ReleaseInfo,

	#[serde(default)]
	/// # Cover Page Footer.
	pub footer: Footer,

	#[serde(default)]
	/// # Work Item Groups.
	///
	/// Each group becomes a section of the notes, in this order.
	pub work_item_groups: Vec<WorkItemGroup>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			product: default_product(),
			output_path: String::new(),
			skip_work_items_with_no_notes: true,
			release_info: ReleaseInfo::default(),
			footer: Footer::default(),
			work_item_groups: Vec::new(),
		}
	}
}

impl Config {
	/// # From File.
	///
	/// Read, parse, and validate the configuration file.
	///
	/// ## Errors
	///
	/// Returns an error if the file can't be read, isn't valid JSON, or fails
	/// validation.
	pub fn from_file<P: AsRef<Path>>(src: P) -> Result<Self, RelnotesError> {
		let raw = std::fs::read_to_string(src).map_err(|_| RelnotesError::Config)?;
		Self::from_json(&raw)
	}

	/// # From JSON.
	///
	/// Parse and validate a configuration from raw JSON.
	///
	/// ## Errors
	///
	/// Returns an error if the JSON is malformed, isn't an object, or fails
	/// validation.
	pub fn from_json(raw: &str) -> Result<Self, RelnotesError> {
		// Serde would happily read a struct out of an array.
		let raw: Value = serde_json::from_str(raw).map_err(|_| RelnotesError::Config)?;
		if ! raw.is_object() { return Err(RelnotesError::Config); }

		let mut out: Self = serde_json::from_value(raw).map_err(|_| RelnotesError::Config)?;
		out.validate()?;
		Ok(out)
	}

	/// # Validate.
	///
	/// Make sure there is at least one group, and that each has a name, a
	/// query, and some fields.
	///
	/// Once everything checks out, each group's title and description fields
	/// are added to its field list if missing, so they're always fetched.
	///
	/// ## Errors
	///
	/// Returns the first problem found.
	pub fn validate(&mut self) -> Result<(), RelnotesError> {
		if self.work_item_groups.is_empty() { return Err(RelnotesError::NoGroups); }

		for group in &self.work_item_groups {
			if group.name.trim().is_empty() { return Err(RelnotesError::GroupName); }
			if group.query.trim().is_empty() { return Err(RelnotesError::GroupQuery); }
			if group.field_list().is_empty() { return Err(RelnotesError::GroupFields); }
		}

		for group in &mut self.work_item_groups {
			let title = group.title_field.trim().to_owned();
			group.push_field(&title);
			let description = group.description_field.trim().to_owned();
			group.push_field(&description);
		}

		Ok(())
	}

	#[must_use]
	/// # Output File.
	///
	/// Return the path the notes should be saved to, e.g.
	/// `<dir>/Acme 2.1 - 2024.03.05.txt`.
	///
	/// The directory is `dir` if provided, otherwise `outputPath`, otherwise
	/// the current one.
	pub fn output_file(&self, dir: Option<&Path>) -> PathBuf {
		let name = format!(
			"{} {} - {}.txt",
			self.product.trim(),
			self.release_info.version.trim(),
			self.release_info.date().dotted(),
		);

		match dir {
			Some(dir) => dir.join(name),
			None =>
				if self.output_path.trim().is_empty() { PathBuf::from(name) }
				else { Path::new(self.output_path.trim()).join(name) },
		}
	}
}



#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// # Release Details.
pub struct ReleaseInfo {
	/// # Version.
	pub version: String,

	/// # Release Date (Raw).
	pub date: String,
}

impl ReleaseInfo {
	#[must_use]
	/// # Release Date.
	///
	/// Parse and return the release date, or today's date if it is missing
	/// or invalid.
	pub fn date(&self) -> ReleaseDate {
		ReleaseDate::parse(&self.date).unwrap_or_else(ReleaseDate::today)
	}
}



#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// # Cover Page Footer.
pub struct Footer {
	/// # Postal Address.
	pub address: String,

	/// # Link URL.
	pub hyperlink: String,

	/// # Link Text.
	pub hyperlink_text: String,
}



#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// # Work Item Group.
pub struct WorkItemGroup {
	#[serde(default)]
	/// # Section Name.
	pub name: String,

	#[serde(default)]
	/// # Query.
	///
	/// The (tracker-specific) query selecting the group's items.
	pub query: String,

	#[serde(default)]
	/// # Fields (Comma-Separated).
	pub fields: String,

	#[serde(default = "default_title_field")]
	/// # Title Field.
	pub title_field: String,

	#[serde(default = "default_description_field")]
	/// # Description Field.
	pub description_field: String,
}

impl WorkItemGroup {
	#[must_use]
	/// # New.
	pub fn new<S: Into<String>>(name: S, query: S, fields: S) -> Self {
		Self {
			name: name.into(),
			query: query.into(),
			fields: fields.into(),
			title_field: default_title_field(),
			description_field: default_description_field(),
		}
	}

	#[must_use]
	/// # Field List.
	///
	/// Split the comma-separated fields, trimming each and dropping empties.
	pub fn field_list(&self) -> Vec<&str> {
		self.fields.split(',')
			.filter_map(|f| {
				let f = f.trim();
				if f.is_empty() { None }
				else { Some(f) }
			})
			.collect()
	}

	#[must_use]
	/// # Has Field?
	pub fn has_field(&self, field: &str) -> bool {
		self.field_list().into_iter().any(|f| f.eq_ignore_ascii_case(field))
	}

	/// # Push Field.
	///
	/// Append a field to the list unless it's blank or already present.
	fn push_field(&mut self, field: &str) {
		if field.is_empty() || self.has_field(field) { return; }
		if self.fields.trim().is_empty() { field.clone_into(&mut self.fields); }
		else {
			self.fields.push_str(", ");
			self.fields.push_str(field);
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Release Date.
///
/// A plain calendar date; times and timezones have no bearing on release
/// notes.
pub struct ReleaseDate(NaiveDate);

impl fmt::Display for ReleaseDate {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.format("%Y-%m-%d"))
	}
}

impl From<NaiveDate> for ReleaseDate {
	#[inline]
	fn from(src: NaiveDate) -> Self { Self(src) }
}

impl ReleaseDate {
	#[must_use]
	/// # New.
	///
	/// Return a date if the parts make sense together.
	pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
		NaiveDate::from_ymd_opt(year, month, day).map(Self)
	}

	#[must_use]
	/// # Parse.
	///
	/// Accept `YYYY-MM-DD`, `YYYY/MM/DD`, or `M/D/YYYY`. Anything after the
	/// date (a time, say) is ignored.
	pub fn parse(src: &str) -> Option<Self> {
		let src = src.trim();
		let end = src.find(|c: char| c.is_whitespace() || c == 'T').unwrap_or(src.len());
		let src = &src[..end];

		// Chrono allows signs and short years; we don't.
		if ! src.bytes().all(|b| b.is_ascii_digit() || b == b'-' || b == b'/') {
			return None;
		}

		let fmt = match src.find(['-', '/'])? {
			4 if src.as_bytes()[4] == b'-' => "%Y-%m-%d",
			4 => "%Y/%m/%d",
			_ if src.rsplit('/').next().is_some_and(|y| y.len() == 4) => "%m/%d/%Y",
			_ => return None,
		};

		NaiveDate::parse_from_str(src, fmt).ok().map(Self)
	}

	#[must_use]
	/// # Today (UTC).
	pub fn today() -> Self { Self(Utc::now().date_naive()) }

	#[must_use]
	/// # Year.
	pub fn year(self) -> i32 { self.0.year() }

	#[must_use]
	/// # Month.
	pub fn month(self) -> u32 { self.0.month() }

	#[must_use]
	/// # Day.
	pub fn day(self) -> u32 { self.0.day() }

	#[must_use]
	/// # Long Format.
	///
	/// e.g. "March 05, 2024".
	pub fn long(self) -> String { self.0.format("%B %d, %Y").to_string() }

	#[must_use]
	/// # Short Format.
	///
	/// e.g. "3/05/2024".
	pub fn short(self) -> String { self.0.format("%-m/%d/%Y").to_string() }

	#[must_use]
	/// # Dotted Format.
	///
	/// e.g. "2024.03.05". This is used for file names.
	pub fn dotted(self) -> String { self.0.format("%Y.%m.%d").to_string() }
}



/// # Default Product.
fn default_product() -> String { "Release".to_owned() }

/// # Default True.
const fn default_true() -> bool { true }

/// # Default Title Field.
fn default_title_field() -> String { TITLE_FIELD.to_owned() }

/// # Default Description Field.
fn default_description_field() -> String { DESCRIPTION_FIELD.to_owned() }
