/* src/mime.rs */

use std::path::Path;

/// Types that take precedence over the `mime_guess` database.
const OVERRIDES: &[(&str, &str)] = &[("js", "text/javascript"), ("ico", "image/x-icon")];

/// Compression suffixes and the `Content-Encoding` they imply.
const ENCODINGS: &[(&str, &str)] = &[
	("gz", "gzip"),
	("Z", "compress"),
	("bz2", "bzip2"),
	("xz", "xz"),
	("br", "br"),
];

/// Shorthand suffixes that stand for a type plus an encoding.
const ALIASES: &[(&str, &str)] = &[
	("svgz", "svg.gz"),
	("tgz", "tar.gz"),
	("taz", "tar.gz"),
	("tz", "tar.gz"),
	("tbz2", "tar.bz2"),
	("txz", "tar.xz"),
];

/// Result of guessing a file's type from its name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guess {
	/// MIME type of the (decoded) content, if known.
	pub content_type: Option<String>,
	/// Compression applied on top of it, if any.
	pub content_encoding: Option<String>,
}

/// Guesses the content type and encoding from the file name alone.
///
/// A trailing compression suffix becomes the encoding and the type is taken
/// from the extension before it, so `notes.txt.gz` is gzip-encoded
/// `text/plain`. Unknown extensions give `None` rather than a generic type.
/// The filesystem is never touched.
///
/// ```
/// use std::path::Path;
/// let guess = static_app::mime::guess(Path::new("app.js"));
/// assert_eq!(guess.content_type.as_deref(), Some("text/javascript"));
/// assert_eq!(guess.content_encoding, None);
/// ```
#[must_use]
pub fn guess(path: &Path) -> Guess {
	let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
		return Guess::default();
	};

	let mut name = name.to_owned();
	if let Some((stem, ext)) = name.rsplit_once('.')
		&& let Some((_, expanded)) = ALIASES
			.iter()
			.find(|(alias, _)| alias.eq_ignore_ascii_case(ext))
	{
		name = format!("{stem}.{expanded}");
	}

	let mut content_encoding = None;
	if let Some((stem, ext)) = name.rsplit_once('.')
		&& let Some((_, encoding)) = ENCODINGS.iter().find(|(suffix, _)| *suffix == ext)
	{
		content_encoding = Some((*encoding).to_owned());
		name = stem.to_owned();
	}

	let content_type = name
		.rsplit_once('.')
		.and_then(|(_, ext)| lookup(ext));

	Guess {
		content_type,
		content_encoding,
	}
}

/// Looks up a single extension, case-insensitively.
fn lookup(ext: &str) -> Option<String> {
	if ext.is_empty() {
		return None;
	}
	let lower = ext.to_ascii_lowercase();
	if let Some((_, mime)) = OVERRIDES.iter().find(|(e, _)| *e == lower) {
		return Some((*mime).to_owned());
	}

	#[cfg(feature = "extension")]
	if let Some(guess) = mime_guess::from_ext(&lower).first() {
		return Some(guess.to_string());
	}

	None
}
