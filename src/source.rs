/*!
# `RelNotes`: Sources

The notes need two things from the tracker: the work items matching each
group's query, and the bytes of any attachments their descriptions
reference. Both are abstracted behind traits so the rest of the program
doesn't care where the data comes from.

The implementations here are file-backed: query results exported as JSON,
and attachments saved to a directory under their GUIDs.
*/

use crate::{
	AttachmentId,
	RelnotesError,
	WorkItemGroup,
};
use dowser::Dowser;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::{
	borrow::Cow,
	collections::HashMap,
	path::{
		Path,
		PathBuf,
	},
};



/// # Work Item Source.
///
/// Return the items belonging to a group.
pub trait WorkItemSource {
	/// # Work Items.
	///
	/// ## Errors
	///
	/// Implementations should return an error if the query can't be run at
	/// all; an empty result is not an error.
	fn work_items(&self, group: &WorkItemGroup) -> Result<Vec<WorkItem>, RelnotesError>;
}

/// # Attachment Source.
///
/// Return the raw bytes of an attachment. Lookups happen in parallel, hence
/// the `Sync` requirement.
pub trait AttachmentSource: Sync {
	/// # Attachment.
	///
	/// ## Errors
	///
	/// Implementations should return an error if the attachment is unknown
	/// or unreadable.
	fn attachment(&self, id: AttachmentId) -> Result<Vec<u8>, RelnotesError>;
}

impl AttachmentSource for HashMap<AttachmentId, Vec<u8>> {
	fn attachment(&self, id: AttachmentId) -> Result<Vec<u8>, RelnotesError> {
		self.get(&id).cloned().ok_or(RelnotesError::AttachmentMissing)
	}
}



#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
/// # Work Item.
pub struct WorkItem {
	/// # ID.
	pub id: u64,

	#[serde(default)]
	/// # Fields.
	///
	/// Field values keyed by reference name, e.g. `System.Title`.
	pub fields: IndexMap<String, Value>,
}

impl WorkItem {
	#[must_use]
	/// # New.
	pub fn new(id: u64) -> Self {
		Self { id, fields: IndexMap::new() }
	}

	#[must_use]
	/// # With Field.
	pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
	where K: Into<String>, V: Into<Value> {
		self.fields.insert(key.into(), value.into());
		self
	}

	#[must_use]
	/// # Field.
	///
	/// Return a field's value as text, matching the name case-insensitively.
	///
	/// Strings come back as-is, numbers and booleans are stringified, and
	/// everything else (null, lists, objects) is treated as missing.
	pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
		let (_, value) = self.fields.iter().find(|(k, _)| k.eq_ignore_ascii_case(name))?;
		match value {
			Value::String(s) => Some(Cow::Borrowed(s.as_str())),
			Value::Number(n) => Some(Cow::Owned(n.to_string())),
			Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
			Value::Null | Value::Array(_) | Value::Object(_) => None,
		}
	}

	#[must_use]
	/// # Project.
	///
	/// Return a copy of the item containing only the named fields, keeping
	/// the original key spelling and order.
	pub fn project(&self, fields: &[&str]) -> Self {
		Self {
			id: self.id,
			fields: self.fields.iter()
				.filter(|(k, _)| fields.iter().any(|f| f.eq_ignore_ascii_case(k)))
				.map(|(k, v)| (k.clone(), v.clone()))
				.collect(),
		}
	}
}



#[derive(Debug, Clone, Default)]
/// # Exported Query Results.
///
/// This holds work items keyed by group name, as exported from the tracker
/// in JSON:
///
/// ```json
/// {
///   "Features": [
///     { "id": 123, "fields": { "System.Title": "...", "System.Description": "..." } }
///   ]
/// }
/// ```
///
/// Any number of exports can be merged together.
pub struct ExportSource {
	/// # Items by Group.
	groups: IndexMap<String, Vec<WorkItem>>,
}

impl WorkItemSource for ExportSource {
	/// # Work Items.
	///
	/// Group names are matched case-insensitively; an unknown group has no
	/// items. Each item is trimmed down to the group's field list, same as a
	/// live query would do.
	fn work_items(&self, group: &WorkItemGroup) -> Result<Vec<WorkItem>, RelnotesError> {
		let name = group.name.trim();
		let Some(items) = self.groups.iter()
			.find_map(|(k, v)| k.trim().eq_ignore_ascii_case(name).then_some(v))
		else { return Ok(Vec::new()); };

		let fields = group.field_list();
		Ok(items.iter().map(|item| item.project(&fields)).collect())
	}
}

impl ExportSource {
	/// # From File.
	///
	/// ## Errors
	///
	/// Returns an error if the file can't be read or parsed.
	pub fn from_file<P: AsRef<Path>>(src: P) -> Result<Self, RelnotesError> {
		let raw = std::fs::read_to_string(src).map_err(|_| RelnotesError::Read)?;
		Self::from_json(&raw)
	}

	/// # From JSON.
	///
	/// ## Errors
	///
	/// Returns an error if the JSON is malformed or the wrong shape.
	pub fn from_json(raw: &str) -> Result<Self, RelnotesError> {
		let groups = serde_json::from_str(raw).map_err(|_| RelnotesError::Export)?;
		Ok(Self { groups })
	}

	/// # Merge.
	///
	/// Fold another export into this one. Items for a group already present
	/// (case-insensitively) are appended to it.
	pub fn merge(&mut self, other: Self) {
		for (name, items) in other.groups {
			if let Some((_, v)) = self.groups.iter_mut()
				.find(|(k, _)| k.trim().eq_ignore_ascii_case(name.trim()))
			{
				v.extend(items);
			}
			else { self.groups.insert(name, items); }
		}
	}

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.groups.values().all(Vec::is_empty) }

	#[must_use]
	/// # Total Items.
	pub fn len(&self) -> usize { self.groups.values().map(Vec::len).sum() }
}



#[derive(Debug, Clone, Default)]
/// # Attachment Directory.
///
/// Attachments saved to disk, named by GUID (extension optional). The
/// directory is crawled recursively up front; the files themselves are only
/// read when asked for.
pub struct AttachmentDir {
	/// # Files by ID.
	files: HashMap<AttachmentId, PathBuf>,
}

impl AttachmentSource for AttachmentDir {
	fn attachment(&self, id: AttachmentId) -> Result<Vec<u8>, RelnotesError> {
		let path = self.files.get(&id).ok_or(RelnotesError::AttachmentMissing)?;
		std::fs::read(path).map_err(|_| RelnotesError::Read)
	}
}

impl FromIterator<PathBuf> for AttachmentDir {
	fn from_iter<I: IntoIterator<Item=PathBuf>>(iter: I) -> Self {
		let files = iter.into_iter()
			.filter_map(|p| {
				let id = p.file_stem()
					.and_then(|s| s.to_str())
					.and_then(AttachmentId::parse)?;
				Some((id, p))
			})
			.collect();
		Self { files }
	}
}

impl AttachmentDir {
	#[must_use]
	/// # New.
	///
	/// Index the GUID-named files under `dir`. Everything else is ignored.
	pub fn new<P: AsRef<Path>>(dir: P) -> Self {
		Dowser::default().with_path(dir.as_ref()).collect()
	}

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.files.is_empty() }

	#[must_use]
	/// # Number of Attachments.
	pub fn len(&self) -> usize { self.files.len() }
}



#[cfg(test)]
mod tests {
	use super::*;

	/// # Export One.
	const EXPORT_ONE: &str = r#"{
		"Features": [
			{
				"id": 1,
				"fields": {
					"System.Title": "Dark mode",
					"System.Description": "<p>Easier on the eyes.</p>",
					"System.State": "Done",
					"Custom.Points": 5
				}
			},
			{ "id": 2 }
		],
		"Fixes": []
	}"#;

	/// # Export Two.
	const EXPORT_TWO: &str = r#"{
		"features": [
			{ "id": 3, "fields": { "system.title": "Light mode" } }
		],
		"Chores": [
			{ "id": 4, "fields": { "System.Title": "Dusting" } }
		]
	}"#;

	#[test]
	fn t_field() {
		let item = WorkItem::new(7)
			.with_field("System.Title", "Hello")
			.with_field("Custom.Points", 3)
			.with_field("Custom.Flag", true)
			.with_field("Custom.Nothing", Value::Null);

		assert_eq!(item.field("System.Title").as_deref(), Some("Hello"));
		assert_eq!(item.field("SYSTEM.TITLE").as_deref(), Some("Hello"));
		assert_eq!(item.field("Custom.Points").as_deref(), Some("3"));
		assert_eq!(item.field("Custom.Flag").as_deref(), Some("true"));
		assert_eq!(item.field("Custom.Nothing"), None);
		assert_eq!(item.field("Custom.Missing"), None);
	}

	#[test]
	fn t_export() {
		let src = ExportSource::from_json(EXPORT_ONE).expect("Export failed.");
		assert_eq!(src.len(), 2);
		assert!(! src.is_empty());

		let group = WorkItemGroup::new("FEATURES", "Q", "System.Title, system.description");
		let items = src.work_items(&group).expect("Work items failed.");
		assert_eq!(items.len(), 2);
		assert_eq!(items[0].id, 1);
		assert_eq!(items[1].id, 2);

		// Only the requested fields are kept.
		assert_eq!(
			items[0].fields.keys().map(String::as_str).collect::<Vec<_>>(),
			["System.Title", "System.Description"],
		);
		assert!(items[1].fields.is_empty());

		// Missing groups are just empty.
		let group = WorkItemGroup::new("Chores", "Q", "System.Title");
		assert!(src.work_items(&group).expect("Work items failed.").is_empty());
	}

	#[test]
	fn t_export_merge() {
		let mut src = ExportSource::from_json(EXPORT_ONE).expect("Export failed.");
		src.merge(ExportSource::from_json(EXPORT_TWO).expect("Export failed."));
		assert_eq!(src.len(), 4);

		let group = WorkItemGroup::new("Features", "Q", "System.Title");
		let items = src.work_items(&group).expect("Work items failed.");
		assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), [1, 2, 3]);
		assert_eq!(items[2].field("System.Title").as_deref(), Some("Light mode"));

		let group = WorkItemGroup::new("Chores", "Q", "System.Title");
		assert_eq!(src.work_items(&group).expect("Work items failed.").len(), 1);
	}

	#[test]
	fn t_export_bad() {
		for raw in ["", "[]", r#"{ "Features": 5 }"#, r#"{ "Features": [{ "fields": {} }] }"#] {
			assert!(
				matches!(ExportSource::from_json(raw), Err(RelnotesError::Export)),
				"Parsed {raw:?}",
			);
		}

		assert!(ExportSource::default().is_empty());
		assert!(ExportSource::from_json("{}").expect("Export failed.").is_empty());
	}

	#[test]
	fn t_attachment_dir() {
		let guid = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";
		let other = "0a2504e0-4f89-11d3-9a0c-0305e82c3301";
		let id = AttachmentId::parse(guid).expect("GUID failed.");

		let dir = std::env::temp_dir().join(format!("relnotes-attachments-{}", std::process::id()));
		let sub = dir.join("nested");
		std::fs::create_dir_all(&sub).expect("Unable to create test dir.");
		std::fs::write(dir.join(format!("{guid}.png")), b"image").expect("Unable to write file.");
		std::fs::write(sub.join(other), b"other").expect("Unable to write file.");
		std::fs::write(dir.join("readme.txt"), b"ignored").expect("Unable to write file.");

		let src = AttachmentDir::new(&dir);
		assert_eq!(src.len(), 2);
		assert_eq!(src.attachment(id).expect("Attachment failed."), b"image");
		assert_eq!(
			src.attachment(AttachmentId::parse(other).expect("GUID failed."))
				.expect("Attachment failed."),
			b"other",
		);

		let missing = AttachmentId::parse("ffffffff-4f89-11d3-9a0c-0305e82c3301")
			.expect("GUID failed.");
		assert!(matches!(src.attachment(missing), Err(RelnotesError::AttachmentMissing)));

		// Files that vanish after indexing can't be read.
		std::fs::remove_dir_all(&dir).expect("Unable to remove test dir.");
		assert!(matches!(src.attachment(id), Err(RelnotesError::Read)));
	}

	#[test]
	fn t_attachment_map() {
		let id = AttachmentId::parse("3f2504e04f8911d39a0c0305e82c3301").expect("GUID failed.");
		let mut map = HashMap::new();
		map.insert(id, vec![1_u8, 2, 3]);
		assert_eq!(map.attachment(id).expect("Attachment failed."), [1, 2, 3]);

		let missing = AttachmentId::parse("ffffffff-4f89-11d3-9a0c-0305e82c3301")
			.expect("GUID failed.");
		assert!(matches!(map.attachment(missing), Err(RelnotesError::AttachmentMissing)));
	}
}
