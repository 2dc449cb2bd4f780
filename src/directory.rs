/* src/directory.rs */

use std::fmt;
use std::path::Path;

use http::{Request, Response};
use log::{debug, warn};

use crate::body::Body;
use crate::error::{Error, Rejection};
use crate::file::FileResponder;
use crate::options::FileOptions;
use crate::path::{DirectoryRoot, Resolution};

/// Builds the [`FileResponder`] for a file that passed every path check.
///
/// Implemented for closures, so per-file tweaks (cache headers for one
/// extension, say) can be plugged in without touching the confinement
/// logic.
pub trait MakeFileResponder: Send + Sync {
	/// Returns the responder for `path`, which lies inside the root.
	fn make_file_responder(&self, path: &Path, options: &FileOptions) -> FileResponder;
}

impl<F> MakeFileResponder for F
where
	F: Fn(&Path, &FileOptions) -> FileResponder + Send + Sync,
{
	fn make_file_responder(&self, path: &Path, options: &FileOptions) -> FileResponder {
		self(path, options)
	}
}

/// Serves every file with the directory's options unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

impl MakeFileResponder for DefaultFactory {
	fn make_file_responder(&self, path: &Path, options: &FileOptions) -> FileResponder {
		FileResponder::with_options(path, options.clone())
	}
}

/// Serves the files below a root directory.
///
/// Requests whose path climbs out of the root are refused with 403 whether
/// or not the target exists; anything else that is not a regular file is a
/// 404.
///
/// ```no_run
/// use static_app::DirectoryResponder;
///
/// let site = DirectoryResponder::new("./public")?;
/// let request = http::Request::get("/css/site.css").body(()).unwrap();
/// let response = site.respond(&request);
/// # Ok::<(), static_app::Error>(())
/// ```
pub struct DirectoryResponder<M = DefaultFactory> {
	root: DirectoryRoot,
	options: FileOptions,
	follow_symlinks: bool,
	factory: M,
}

impl<M> fmt::Debug for DirectoryResponder<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DirectoryResponder")
			.field("root", &self.root)
			.field("options", &self.options)
			.field("follow_symlinks", &self.follow_symlinks)
			.finish_non_exhaustive()
	}
}

impl DirectoryResponder {
	/// Confines responses to `root`, which must be an existing directory.
	pub fn new(root: impl AsRef<Path>) -> Result<Self, Error> {
		Self::with_options(root, FileOptions::default())
	}

	/// Like [`DirectoryResponder::new`], passing `options` to every file.
	pub fn with_options(root: impl AsRef<Path>, options: FileOptions) -> Result<Self, Error> {
		Ok(Self {
			root: DirectoryRoot::new(root)?,
			options,
			follow_symlinks: false,
			factory: DefaultFactory,
		})
	}
}

impl<M: MakeFileResponder> DirectoryResponder<M> {
	/// Replaces the way file responders are built.
	pub fn with_factory<N: MakeFileResponder>(self, factory: N) -> DirectoryResponder<N> {
		DirectoryResponder {
			root: self.root,
			options: self.options,
			follow_symlinks: self.follow_symlinks,
			factory,
		}
	}

	/// Serves symlinks whose target lies outside the root. Off by default.
	#[must_use]
	pub fn follow_symlinks(mut self, follow: bool) -> Self {
		self.follow_symlinks = follow;
		self
	}

	/// The directory requests are confined to.
	#[must_use]
	pub fn root(&self) -> &DirectoryRoot {
		&self.root
	}

	/// Answers `request` from the file its path points at.
	pub fn respond<B>(&self, request: &Request<B>) -> Response<Body> {
		match self.lookup(request.uri().path()) {
			Ok(file) => file.respond(request),
			Err(rejection) => rejection.into_response(),
		}
	}

	/// Finds the responder for a request path, applying every check.
	pub fn lookup(&self, uri_path: &str) -> Result<FileResponder, Rejection> {
		let candidate = match self.root.resolve(uri_path) {
			Ok(Resolution::Inside(candidate)) => candidate,
			Ok(Resolution::Outside) => {
				warn!("path traversal blocked: {uri_path}");
				return Err(Rejection::Forbidden { message: None });
			}
			Err(e) => {
				debug!("undecodable request path {uri_path:?}: {e}");
				return Err(Rejection::NotFound {
					comment: e.to_string(),
				});
			}
		};

		if !self.follow_symlinks && !self.root.contains_canonical(&candidate) {
			warn!("symlink escape blocked: {}", candidate.display());
			return Err(Rejection::Forbidden { message: None });
		}

		if !candidate.is_file() {
			debug!("no file at {}", candidate.display());
			return Err(Rejection::NotFound {
				comment: candidate.display().to_string(),
			});
		}

		Ok(self
			.factory
			.make_file_responder(&candidate, &self.options))
	}
}
