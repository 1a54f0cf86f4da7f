/*!
# `RelNotes`: Errors
*/

use fyi_msg::ProglessError;
use std::{
	error::Error,
	fmt,
};



/// # Help Text.
const HELP: &str = concat!(r"
    .-------------.
    | ___________ |
    | ___________ |     ", "\x1b[38;5;199mRelNotes\x1b[0;38;5;69m v", env!("CARGO_PKG_VERSION"), "\x1b[0m", r#"
    | ______      |     Tracker work items in,
    | ___________ |     release notes out.
    '-------------'

USAGE:
    relnotes [FLAGS] [OPTIONS] -c <FILE> <PATH(S)>...

FLAGS:
    -h, --help        Print help information and exit.
    -p, --progress    Show progress bar while working.
    -V, --version     Print program version and exit.

OPTIONS:
    -a, --attachments <DIR>
                      Directory holding work item attachments, each named by
                      its GUID (with or without an extension).
    -c, --config <FILE>
                      Release notes configuration (JSON).
    -o, --output <DIR>
                      Save the notes to this directory instead of the
                      configured "outputPath".

ARGS:
    <PATH(S)>...      One or more work item export files (or directories
                      containing them) to build the notes from.
"#);



#[allow(missing_docs, reason = "Self-explanatory.")]
#[derive(Debug, Copy, Clone)]
/// # Generic Error.
pub enum RelnotesError {
	AttachmentMissing,
	AttachmentUrl,
	Config,
	Export,
	GroupFields,
	GroupName,
	GroupQuery,
	ImageHeight,
	ImageWidth,
	NoExports,
	NoGroups,
	Parse,
	Progress(ProglessError),
	Read,
	Save,
	PrintHelp,    // Not an error.
	PrintVersion, // Not an error.
}

impl AsRef<str> for RelnotesError {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for RelnotesError {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Error for RelnotesError {}

impl From<ProglessError> for RelnotesError {
	#[inline]
	fn from(src: ProglessError) -> Self { Self::Progress(src) }
}

impl RelnotesError {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::AttachmentMissing => "The attachment could not be found.",
			Self::AttachmentUrl => "The image URL does not reference an attachment.",
			Self::Config => "Unable to read the configuration.",
			Self::Export => "Unable to parse the work item export.",
			Self::GroupFields => "Every work item group needs at least one field.",
			Self::GroupName => "Every work item group needs a name.",
			Self::GroupQuery => "Every work item group needs a query.",
			Self::ImageHeight => "An image has a non-numeric height.",
			Self::ImageWidth => "An image has a non-numeric width.",
			Self::NoExports => "No work item exports were found.",
			Self::NoGroups => "At least one work item group is required.",
			Self::Parse => "Unable to parse the markup.",
			Self::Progress(e) => e.as_str(),
			Self::Read => "Unable to read the file.",
			Self::Save => "Unable to save the release notes.",
			Self::PrintHelp => HELP,
			Self::PrintVersion => concat!("RelNotes v", env!("CARGO_PKG_VERSION")),
		}
	}
}
