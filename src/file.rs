/* src/file.rs */

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use http::header::{CONTENT_LENGTH, LAST_MODIFIED};
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use log::{debug, warn};

use crate::body::{Body, FileIter};
use crate::error::Rejection;
use crate::options::FileOptions;

/// Serves one file.
///
/// Type and encoding are worked out once, when the responder is built. The
/// file itself is looked at on every request, so a responder can outlive
/// changes to the file and be shared between threads.
///
/// ```
/// use static_app::FileResponder;
///
/// let responder = FileResponder::new("/definitely/not/here.txt");
/// let request = http::Request::get("/").body(()).unwrap();
/// assert_eq!(responder.respond(&request).status(), 404);
/// ```
#[derive(Debug, Clone)]
pub struct FileResponder {
	path: PathBuf,
	metadata: HeaderMap,
	options: FileOptions,
}

impl FileResponder {
	/// A responder with inferred metadata.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self::with_options(path, FileOptions::default())
	}

	/// A responder with explicit metadata overrides.
	pub fn with_options(path: impl Into<PathBuf>, options: FileOptions) -> Self {
		let path = path.into();
		let metadata = options.resolve(&path);
		Self {
			path,
			metadata,
			options,
		}
	}

	/// The file this responder serves.
	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Answers `request`, turning every refusal into its error response.
	///
	/// Successful responses carry an unread [`Body::File`]; pass them through
	/// [`crate::conditional::respond`] when no host framework handles
	/// `Range` and `If-Modified-Since`.
	pub fn respond<B>(&self, request: &Request<B>) -> Response<Body> {
		self.open(request.method())
			.unwrap_or_else(Rejection::into_response)
	}

	/// Stats and opens the file for a request made with `method`.
	///
	/// Non GET/HEAD methods are refused before the filesystem is touched.
	pub fn open(&self, method: &Method) -> Result<Response<Body>, Rejection> {
		if method != Method::GET && method != Method::HEAD {
			return Err(Rejection::MethodNotAllowed {
				method: method.clone(),
			});
		}

		let stat = fs::metadata(&self.path).map_err(|e| {
			let comment = format!("Can't open {:?}: {e}", self.path);
			debug!("{comment}");
			Rejection::NotFound { comment }
		})?;

		if stat.is_dir() {
			warn!("refusing to serve directory {}", self.path.display());
			return Err(Rejection::Forbidden {
				message: Some(
					"You are not permitted to view this file (is a directory)".to_owned(),
				),
			});
		}

		let file = File::open(&self.path).map_err(|e| {
			warn!("cannot open {}: {e}", self.path.display());
			Rejection::Forbidden {
				message: Some(format!("You are not permitted to view this file ({e})")),
			}
		})?;

		let mut response = Response::new(Body::File(FileIter::new(file)));
		*response.status_mut() = StatusCode::OK;

		let headers = response.headers_mut();
		headers.extend(self.metadata.clone());
		headers.insert(CONTENT_LENGTH, HeaderValue::from(stat.len()));
		if let Ok(modified) = stat.modified()
			&& let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(modified))
		{
			headers.insert(LAST_MODIFIED, value);
		}
		self.options.apply_extra(headers);

		debug!("serving {} ({} bytes)", self.path.display(), stat.len());
		Ok(response)
	}
}
