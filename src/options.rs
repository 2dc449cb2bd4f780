/* src/options.rs */

use std::path::Path;

use http::header::{ACCEPT_RANGES, CONTENT_ENCODING, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::mime;

/// Response metadata shared by the file and directory responders.
///
/// Anything left unset is inferred from the file name when a responder is
/// built. Extra headers are passed through untouched and win over the
/// headers computed by the responder.
///
/// ```
/// use http::HeaderValue;
/// use http::header::CACHE_CONTROL;
/// use static_app::FileOptions;
///
/// let options = FileOptions::new()
///     .content_type(Some(HeaderValue::from_static("text/plain")))
///     .content_encoding(None)
///     .header(CACHE_CONTROL, HeaderValue::from_static("max-age=60"));
/// # let _ = options;
/// ```
#[derive(Debug, Clone)]
pub struct FileOptions {
	content_type: Metadata,
	content_encoding: Metadata,
	accept_ranges: Option<HeaderValue>,
	extra: HeaderMap,
}

impl Default for FileOptions {
	fn default() -> Self {
		Self {
			content_type: Metadata::Inferred,
			content_encoding: Metadata::Inferred,
			accept_ranges: Some(HeaderValue::from_static("bytes")),
			extra: HeaderMap::new(),
		}
	}
}

impl FileOptions {
	/// Options with every value inferred and `Accept-Ranges: bytes`.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Fixes the `Content-Type` instead of guessing it; `None` leaves the
	/// header out.
	#[must_use]
	pub fn content_type(mut self, value: Option<HeaderValue>) -> Self {
		self.content_type = Metadata::Fixed(value);
		self
	}

	/// Fixes the `Content-Encoding` instead of guessing it; `None` leaves the
	/// header out.
	#[must_use]
	pub fn content_encoding(mut self, value: Option<HeaderValue>) -> Self {
		self.content_encoding = Metadata::Fixed(value);
		self
	}

	/// Sets `Accept-Ranges`; `None` leaves the header out.
	#[must_use]
	pub fn accept_ranges(mut self, value: Option<HeaderValue>) -> Self {
		self.accept_ranges = value;
		self
	}

	/// Adds a header sent with every successful response.
	#[must_use]
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.extra.append(name, value);
		self
	}

	/// Metadata headers for `path`, before size and date are known.
	pub(crate) fn resolve(&self, path: &Path) -> HeaderMap {
		let mut headers = HeaderMap::new();
		let needs_guess = matches!(self.content_type, Metadata::Inferred)
			|| matches!(self.content_encoding, Metadata::Inferred);
		let guess = if needs_guess {
			mime::guess(path)
		} else {
			mime::Guess::default()
		};

		let content_type = self.content_type.pick(guess.content_type.as_deref());
		let content_encoding = self.content_encoding.pick(guess.content_encoding.as_deref());

		if let Some(value) = content_type {
			headers.insert(CONTENT_TYPE, value);
		}
		if let Some(value) = content_encoding {
			headers.insert(CONTENT_ENCODING, value);
		}
		if let Some(value) = &self.accept_ranges {
			headers.insert(ACCEPT_RANGES, value.clone());
		}
		headers
	}

	/// Writes the pass-through headers over `headers`.
	pub(crate) fn apply_extra(&self, headers: &mut HeaderMap) {
		for name in self.extra.keys() {
			headers.remove(name);
		}
		for (name, value) in &self.extra {
			headers.append(name.clone(), value.clone());
		}
	}
}

/// A header that is either guessed from the file name or fixed by the caller.
#[derive(Debug, Clone)]
enum Metadata {
	Inferred,
	Fixed(Option<HeaderValue>),
}

impl Metadata {
	fn pick(&self, guessed: Option<&str>) -> Option<HeaderValue> {
		match self {
			Self::Inferred => guessed.and_then(|text| HeaderValue::from_str(text).ok()),
			Self::Fixed(value) => value.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::header::{CACHE_CONTROL, LINK};

	#[test]
	fn defaults_guess_and_accept_bytes() {
		let headers = FileOptions::new().resolve(Path::new("app.js"));
		assert_eq!(headers[CONTENT_TYPE], "text/javascript");
		assert_eq!(headers[ACCEPT_RANGES], "bytes");
		assert!(headers.get(CONTENT_ENCODING).is_none());
	}

	#[test]
	fn explicit_type_wins() {
		let headers = FileOptions::new()
			.content_type(Some(HeaderValue::from_static("application/x-custom")))
			.resolve(Path::new("app.js"));
		assert_eq!(headers[CONTENT_TYPE], "application/x-custom");
	}

	#[test]
	fn explicit_encoding_wins() {
		let headers = FileOptions::new()
			.content_encoding(Some(HeaderValue::from_static("identity")))
			.resolve(Path::new("bundle.js.gz"));
		assert_eq!(headers[CONTENT_ENCODING], "identity");
		assert_eq!(headers[CONTENT_TYPE], "text/javascript");
	}

	#[test]
	fn inference_can_be_switched_off() {
		let headers = FileOptions::new()
			.content_type(None)
			.content_encoding(None)
			.resolve(Path::new("bundle.js.gz"));
		assert!(headers.get(CONTENT_TYPE).is_none());
		assert!(headers.get(CONTENT_ENCODING).is_none());
		assert_eq!(headers[ACCEPT_RANGES], "bytes");
	}

	#[test]
	fn type_off_still_guesses_encoding() {
		let headers = FileOptions::new()
			.content_type(None)
			.resolve(Path::new("bundle.js.gz"));
		assert!(headers.get(CONTENT_TYPE).is_none());
		assert_eq!(headers[CONTENT_ENCODING], "gzip");
	}

	#[test]
	fn accept_ranges_can_be_dropped() {
		let headers = FileOptions::new()
			.accept_ranges(None)
			.resolve(Path::new("a.txt"));
		assert!(headers.get(ACCEPT_RANGES).is_none());
	}

	#[test]
	fn unknown_type_leaves_header_out() {
		let headers = FileOptions::new().resolve(Path::new("mystery.zzqqxx"));
		assert!(headers.get(CONTENT_TYPE).is_none());
	}

	#[test]
	fn extra_headers_replace_and_repeat() {
		let options = FileOptions::new()
			.header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
			.header(LINK, HeaderValue::from_static("</a.css>; rel=preload"))
			.header(LINK, HeaderValue::from_static("</b.js>; rel=preload"));

		let mut headers = options.resolve(Path::new("index.html"));
		headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=1"));
		options.apply_extra(&mut headers);

		assert_eq!(headers[CACHE_CONTROL], "no-cache");
		assert_eq!(headers.get_all(LINK).iter().count(), 2);
	}
}
