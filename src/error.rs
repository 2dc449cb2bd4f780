/* src/error.rs */

use std::path::PathBuf;

use http::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, Method, Response, StatusCode};
use thiserror::Error;

use crate::body::Body;

/// Errors raised while setting up a responder or decoding a request path.
#[derive(Debug, Error)]
pub enum Error {
	/// The root path is invalid or does not exist.
	#[error("invalid root path '{path}': {source}")]
	InvalidRoot {
		/// The path that failed to resolve.
		path: PathBuf,
		/// The underlying I/O error.
		source: std::io::Error,
	},

	/// The root path exists but is not a directory.
	#[error("root path '{0}' is not a directory")]
	NotADirectory(PathBuf),

	/// The URI contains invalid UTF-8 percent encoding.
	#[error("invalid URI encoding: {0}")]
	InvalidEncoding(#[from] std::str::Utf8Error),

	/// The decoded URI contains a null byte.
	#[error("null byte in URI path")]
	NullByte,
}

/// Why a request was refused.
///
/// Every filesystem failure is caught where it happens and turned into one of
/// these; none escape as a server fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
	/// The method is neither GET nor HEAD.
	#[error("You cannot {method} a file")]
	MethodNotAllowed {
		/// The offending method.
		method: Method,
	},

	/// Nothing servable exists at the requested location.
	#[error("not found: {comment}")]
	NotFound {
		/// Diagnostic for logs. Never written into the body.
		comment: String,
	},

	/// The file exists but may not be served.
	#[error("forbidden: {}", message.as_deref().unwrap_or("-"))]
	Forbidden {
		/// Detail shown to the client, if any.
		message: Option<String>,
	},
}

/// Diagnostic text attached to rejected responses as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic(pub String);

impl Rejection {
	/// The status code this rejection maps to.
	#[must_use]
	pub fn status(&self) -> StatusCode {
		match self {
			Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
			Self::NotFound { .. } => StatusCode::NOT_FOUND,
			Self::Forbidden { .. } => StatusCode::FORBIDDEN,
		}
	}

	/// Renders the rejection as a plain-text response.
	///
	/// ```
	/// use static_app::error::Rejection;
	///
	/// let response = Rejection::NotFound { comment: "/srv/missing".to_owned() }.into_response();
	/// assert_eq!(response.status(), 404);
	/// ```
	#[must_use]
	pub fn into_response(self) -> Response<Body> {
		let status = self.status();
		let reason = status.canonical_reason().unwrap_or("Error");
		let (text, diagnostic) = match &self {
			Self::MethodNotAllowed { .. } => (format!("{reason}\n\n{self}"), None),
			Self::NotFound { comment } => (reason.to_owned(), Some(comment.clone())),
			Self::Forbidden { message: Some(message) } => {
				(format!("{reason}\n\n{message}"), Some(message.clone()))
			}
			Self::Forbidden { message: None } => (reason.to_owned(), None),
		};

		let length = text.len();
		let mut response = Response::new(Body::from(text));
		*response.status_mut() = status;
		let headers = response.headers_mut();
		headers.insert(
			CONTENT_TYPE,
			HeaderValue::from_static("text/plain; charset=UTF-8"),
		);
		headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
		if matches!(self, Self::MethodNotAllowed { .. }) {
			headers.insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
		}
		if let Some(diagnostic) = diagnostic {
			response.extensions_mut().insert(Diagnostic(diagnostic));
		}
		response
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn body_text(response: Response<Body>) -> String {
		let bytes = response.into_body().read_to_end().unwrap();
		String::from_utf8(bytes).unwrap()
	}

	#[test]
	fn method_not_allowed_names_method() {
		let response = Rejection::MethodNotAllowed {
			method: Method::POST,
		}
		.into_response();
		assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(response.headers()[ALLOW], "GET, HEAD");
		assert!(body_text(response).contains("You cannot POST a file"));
	}

	#[test]
	fn not_found_keeps_comment_out_of_body() {
		let response = Rejection::NotFound {
			comment: "/secret/location".to_owned(),
		}
		.into_response();
		assert_eq!(
			response.extensions().get::<Diagnostic>(),
			Some(&Diagnostic("/secret/location".to_owned()))
		);
		assert!(!body_text(response).contains("/secret/location"));
	}

	#[test]
	fn bare_forbidden_has_no_diagnostic() {
		let response = Rejection::Forbidden { message: None }.into_response();
		assert_eq!(response.status(), StatusCode::FORBIDDEN);
		assert!(response.extensions().get::<Diagnostic>().is_none());
		assert_eq!(body_text(response), "Forbidden");
	}

	#[test]
	fn forbidden_message_is_shown() {
		let response = Rejection::Forbidden {
			message: Some("nope".to_owned()),
		}
		.into_response();
		assert!(body_text(response).ends_with("nope"));
	}

	#[test]
	fn content_length_matches_body() {
		let response = Rejection::Forbidden { message: None }.into_response();
		assert_eq!(response.headers()[CONTENT_LENGTH], "9");
	}
}
