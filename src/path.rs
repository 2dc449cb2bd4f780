/* src/path.rs */

use std::ffi::OsString;
use std::path::{self, Component, Path, PathBuf};

use crate::error::Error;

/// The directory a [`crate::DirectoryResponder`] is confined to.
///
/// Kept in two forms: the absolute path as given (always ending with a
/// separator), used for the lexical containment check, and its canonical
/// form, used to catch symlinks that point out of the tree.
#[derive(Debug, Clone)]
pub struct DirectoryRoot {
	path: PathBuf,
	canonical: PathBuf,
}

/// Where a request path lands relative to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	/// A location at or below the root. It may not exist.
	Inside(PathBuf),
	/// The path climbs out of the root.
	Outside,
}

impl DirectoryRoot {
	/// Makes `root` absolute and checks that it is an existing directory.
	///
	/// ```
	/// let dir = std::env::temp_dir();
	/// let root = static_app::path::DirectoryRoot::new(&dir).unwrap();
	/// assert!(root.as_str().ends_with(std::path::MAIN_SEPARATOR));
	/// ```
	pub fn new(root: impl AsRef<Path>) -> Result<Self, Error> {
		let root = root.as_ref();
		let invalid = |source| Error::InvalidRoot {
			path: root.to_path_buf(),
			source,
		};

		let absolute = normalize(&path::absolute(root).map_err(invalid)?);
		let canonical = absolute.canonicalize().map_err(invalid)?;
		if !canonical.is_dir() {
			return Err(Error::NotADirectory(root.to_path_buf()));
		}

		let mut prefix = OsString::from(absolute);
		if !prefix.to_string_lossy().ends_with(path::is_separator) {
			prefix.push(path::MAIN_SEPARATOR_STR);
		}

		Ok(Self {
			path: PathBuf::from(prefix),
			canonical,
		})
	}

	/// The absolute root, ending with a separator.
	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The root as text, ending with a separator.
	#[must_use]
	pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
		self.path.to_string_lossy()
	}

	/// Maps a request path onto the filesystem without touching it.
	///
	/// The path is percent-decoded, leading slashes are dropped so it can
	/// never replace the root, and `.`/`..` are folded lexically. Anything
	/// that ends up above the root is [`Resolution::Outside`].
	pub fn resolve(&self, uri_path: &str) -> Result<Resolution, Error> {
		let decoded = percent_encoding::percent_decode_str(uri_path).decode_utf8()?;
		if decoded.contains('\0') {
			return Err(Error::NullByte);
		}

		let relative = decoded.trim_start_matches('/');
		let mut resolved = self.path.clone();
		for component in Path::new(relative).components() {
			match component {
				Component::Normal(c) => resolved.push(c),
				Component::ParentDir => {
					resolved.pop();
				}
				Component::CurDir => {}
				Component::RootDir | Component::Prefix(_) => return Ok(Resolution::Outside),
			}
		}

		if resolved.starts_with(&self.path) {
			Ok(Resolution::Inside(resolved))
		} else {
			Ok(Resolution::Outside)
		}
	}

	/// Whether `candidate`, with every symlink followed, is still below the
	/// root.
	///
	/// A candidate that does not exist is judged by its nearest existing
	/// ancestor, so a symlinked directory pointing out of the root is caught
	/// whether or not the file behind it exists.
	#[must_use]
	pub fn contains_canonical(&self, candidate: &Path) -> bool {
		let mut ancestor = candidate.to_path_buf();
		loop {
			match ancestor.canonicalize() {
				Ok(real) => return real.starts_with(&self.canonical),
				Err(_) => {
					if !ancestor.pop() {
						return false;
					}
				}
			}
		}
	}
}

/// Folds `.` and `..` out of an absolute path.
fn normalize(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();
	for component in path.components() {
		match component {
			Component::ParentDir => {
				out.pop();
			}
			Component::CurDir => {}
			other => out.push(other),
		}
	}
	out
}
