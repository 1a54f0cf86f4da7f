/*!
# `RelNotes`

`RelNotes` builds a release notes document from exported tracker work items.

Each configured work item group becomes a section of the notes. Item
descriptions are stripped of their markup, and any images they reference
are looked up in the attachment directory and laid out alongside the text.



## Use

```bash
# Build the notes from one export.
relnotes -c config.json export.json

# Merge every export in a directory, pull images from ./attachments, and
# save the result somewhere in particular.
relnotes -c config.json -a ./attachments -o /tmp/notes ./exports

# Do the same thing but with a progress bar.
relnotes -p -c config.json -a ./attachments ./exports

# For a full list of options, run help:
relnotes -h
```



## Configuration

The configuration is a JSON file. At minimum it needs one work item group
with a name, query, and field list:

```json
{
  "product": "Acme",
  "releaseInfo": { "version": "2.1", "date": "2024-03-05" },
  "workItemGroups": [
    { "name": "Features", "query": "...", "fields": "System.Id, System.Title" }
  ]
}
```

Exports hold the query results for each group, keyed by group name.
Attachments are files named by their GUID, with or without an extension.
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



use argyle::Argument;
use dowser::Dowser;
use fyi_msg::{
	Msg,
	Progless,
};
use relnotes::{
	AttachmentDir,
	Config,
	ExportSource,
	gather,
	gather_group,
	GroupItems,
	ReleaseNotes,
	RelnotesError,
	Sanitizer,
	WorkItemSource,
};
use std::path::PathBuf;



/// # Main.
fn main() {
	match main__() {
		Ok(()) => {},
		Err(e @ (RelnotesError::PrintHelp | RelnotesError::PrintVersion)) => {
			println!("{e}");
		},
		Err(e) => { Msg::error(e.as_str()).die(1); },
	}
}

#[inline]
/// # Actual Main.
fn main__() -> Result<(), RelnotesError> {
	// Parse CLI arguments.
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut progress = false;
	let mut attachments = None;
	let mut config = None;
	let mut output = None;
	let mut paths = Dowser::default();
	for arg in args {
		match arg {
			Argument::Key("-h" | "--help") => return Err(RelnotesError::PrintHelp),
			Argument::Key("-p" | "--progress") => { progress = true; },
			Argument::Key("-V" | "--version") => return Err(RelnotesError::PrintVersion),

			Argument::KeyWithValue("-a" | "--attachments", s) => {
				attachments.replace(PathBuf::from(s));
			},
			Argument::KeyWithValue("-c" | "--config", s) => {
				config.replace(PathBuf::from(s));
			},
			Argument::KeyWithValue("-o" | "--output", s) => {
				output.replace(PathBuf::from(s));
			},

			// Assume these are export paths.
			Argument::Other(s) => { paths = paths.with_path(s); },
			Argument::InvalidUtf8(s) => { paths = paths.with_path(s); },

			// Nothing else is expected.
			_ => {},
		}
	}

	// Load the configuration.
	let config = Config::from_file(config.ok_or(RelnotesError::Config)?)?;

	// Find and merge the exports.
	let mut exports: Vec<PathBuf> = paths
		.filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")))
		.collect();
	if exports.is_empty() { return Err(RelnotesError::NoExports); }
	exports.sort();

	let mut source = ExportSource::default();
	for path in &exports {
		source.merge(ExportSource::from_file(path)?);
	}

	// Index the attachments, if any.
	let attachments = attachments.map_or_else(AttachmentDir::default, AttachmentDir::new);

	// Gather everything up!
	let groups =
		if progress { gather_with_progress(&config, &source, &attachments)? }
		else { gather(&config, &source, &attachments)? };

	// Mention any image trouble.
	for group in &groups {
		for (id, e) in &group.failures {
			Msg::warning(format!(
				"{}: images for work item #{id} were skipped. {e}",
				group.group.name,
			)).eprint();
		}
	}

	// Build and save the notes.
	let notes = ReleaseNotes::build(&config, &groups, &Sanitizer::default())?;
	let dst = config.output_file(output.as_deref());
	write_atomic::write_file(&dst, notes.to_string().as_bytes())
		.map_err(|_| RelnotesError::Save)?;

	let total: usize = notes.sections.iter().map(|s| s.entries.len()).sum();
	Msg::success(format!(
		"Release notes with {total} item{} saved to {}.",
		if total == 1 { "" } else { "s" },
		dst.display(),
	)).print();

	Ok(())
}

/// # Gather (With Progress).
///
/// This is the same as `gather`, but ticks a progress bar after each group.
fn gather_with_progress(config: &Config, source: &ExportSource, attachments: &AttachmentDir)
-> Result<Vec<GroupItems>, RelnotesError> {
	let bar = Progless::try_from(config.work_item_groups.len())?
		.with_title(Some(Msg::custom("RelNotes", 199, "Gathering work items…")));

	let mut out = Vec::with_capacity(config.work_item_groups.len());
	for group in &config.work_item_groups {
		bar.add(&group.name);
		let res = source.work_items(group)
			.map(|items| gather_group(group, items, attachments));
		bar.remove(&group.name);

		match res {
			Ok(v) => out.push(v),
			Err(e) => {
				bar.finish();
				return Err(e);
			},
		}
	}

	bar.finish();
	Ok(out)
}
