/* src/conditional.rs */

//! Minimal conditional-response handling for hosts that have none.
//!
//! Handles `If-Modified-Since`, a single `Range` (with a date `If-Range`) and
//! HEAD body stripping. ETags and multipart ranges are out of scope.

use std::time::SystemTime;

use http::header::{
	CONTENT_LENGTH, CONTENT_RANGE, HeaderMap, IF_MODIFIED_SINCE, IF_RANGE, LAST_MODIFIED, RANGE,
};
use http::response::Parts;
use http::{HeaderValue, Method, Request, Response, StatusCode};
use log::debug;

use crate::body::Body;
use crate::range::{self, Parsed};

/// Applies the request's conditional headers to a responder's output.
///
/// Only `200 OK` responses are touched. A `Range` is honored only when the
/// body is still an unread file.
///
/// ```no_run
/// use static_app::{conditional, FileResponder};
///
/// let request = http::Request::get("/")
///     .header("range", "bytes=0-99")
///     .body(())
///     .unwrap();
/// let served = FileResponder::new("video.mp4").respond(&request);
/// let response = conditional::respond(&request, served);
/// ```
pub fn respond<B>(request: &Request<B>, response: Response<Body>) -> Response<Body> {
	let (mut parts, body) = response.into_parts();
	let is_head = request.method() == Method::HEAD;
	if parts.status != StatusCode::OK {
		return finish(parts, body, is_head);
	}

	let last_modified = http_date(parts.headers.get(LAST_MODIFIED));
	if let Some(modified) = last_modified
		&& let Some(since) = http_date(request.headers().get(IF_MODIFIED_SINCE))
		&& modified <= since
	{
		parts.status = StatusCode::NOT_MODIFIED;
		parts.headers.remove(CONTENT_LENGTH);
		return Response::from_parts(parts, Body::Empty);
	}

	let body = match request.headers().get(RANGE).and_then(|v| v.to_str().ok()) {
		Some(header) if if_range_holds(request.headers(), last_modified) => {
			apply_range(&mut parts, body, header)
		}
		_ => body,
	};
	finish(parts, body, is_head)
}

fn apply_range(parts: &mut Parts, body: Body, header: &str) -> Body {
	let Body::File(file) = body else {
		return body;
	};
	let Some(total) = parts
		.headers
		.get(CONTENT_LENGTH)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.parse::<u64>().ok())
	else {
		return Body::File(file);
	};

	match range::parse(header, total) {
		Parsed::Satisfiable(byte_range) => {
			debug!("serving {header} of {total} bytes");
			parts.status = StatusCode::PARTIAL_CONTENT;
			set(&mut parts.headers, CONTENT_RANGE, &byte_range.content_range(total));
			parts
				.headers
				.insert(CONTENT_LENGTH, HeaderValue::from(byte_range.length));
			Body::Range(file.range(Some(byte_range.start), Some(byte_range.end())))
		}
		Parsed::Unsatisfiable => {
			parts.status = StatusCode::RANGE_NOT_SATISFIABLE;
			set(&mut parts.headers, CONTENT_RANGE, &format!("bytes */{total}"));
			parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(0u64));
			Body::Empty
		}
		Parsed::Ignored => Body::File(file),
	}
}

/// An absent `If-Range` always holds; a date must equal `Last-Modified`.
/// Entity tags never match since none are issued.
fn if_range_holds(headers: &HeaderMap, last_modified: Option<SystemTime>) -> bool {
	let Some(value) = headers.get(IF_RANGE) else {
		return true;
	};
	match (http_date(Some(value)), last_modified) {
		(Some(date), Some(modified)) => date == modified,
		_ => false,
	}
}

fn http_date(value: Option<&HeaderValue>) -> Option<SystemTime> {
	let text = value?.to_str().ok()?;
	httpdate::parse_http_date(text).ok()
}

fn set(headers: &mut HeaderMap, name: http::HeaderName, value: &str) {
	if let Ok(value) = HeaderValue::from_str(value) {
		headers.insert(name, value);
	}
}

fn finish(parts: Parts, body: Body, is_head: bool) -> Response<Body> {
	let body = if is_head { Body::Empty } else { body };
	Response::from_parts(parts, body)
}
