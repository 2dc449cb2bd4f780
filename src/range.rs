/* src/range.rs */

use std::cmp;

/// A single byte range extracted from an HTTP Range header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
	/// Starting byte offset (zero-based).
	pub start: u64,
	/// Number of bytes in this range.
	pub length: u64,
}

impl ByteRange {
	/// Exclusive end offset, the `limit` expected by [`crate::body::FileIter::range`].
	#[must_use]
	pub fn end(self) -> u64 {
		self.start + self.length
	}

	/// `Content-Range` value for a 206 response.
	#[must_use]
	pub fn content_range(self, total_size: u64) -> String {
		format!("bytes {}-{}/{total_size}", self.start, self.end() - 1)
	}
}

/// What a Range header asks for, relative to a resource of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parsed {
	/// A range that can be served.
	Satisfiable(ByteRange),
	/// Well-formed but outside the resource; answer 416.
	Unsatisfiable,
	/// Malformed, another unit, or several ranges; serve the whole body.
	Ignored,
}

/// Parses an HTTP Range header value (RFC 9110 section 14.1.2).
///
/// Supported formats:
/// - `bytes=100-199` single segment
/// - `bytes=100-` open-ended (from offset to EOF)
/// - `bytes=-200` suffix (last N bytes)
///
/// Multi-range requests are ignored rather than rejected.
///
/// ```
/// use static_app::range::{parse, ByteRange, Parsed};
///
/// let r = parse("bytes=0-99", 1000);
/// assert_eq!(r, Parsed::Satisfiable(ByteRange { start: 0, length: 100 }));
/// ```
#[must_use]
pub fn parse(header: &str, total_size: u64) -> Parsed {
	let Some(range_part) = header.trim().strip_prefix("bytes=") else {
		return Parsed::Ignored;
	};
	if range_part.contains(',') {
		return Parsed::Ignored;
	}
	let Some((start_str, end_str)) = range_part.split_once('-') else {
		return Parsed::Ignored;
	};
	let (start_str, end_str) = (start_str.trim(), end_str.trim());

	if start_str.is_empty() {
		let Ok(suffix_len) = end_str.parse::<u64>() else {
			return Parsed::Ignored;
		};
		if suffix_len == 0 || total_size == 0 {
			return Parsed::Unsatisfiable;
		}
		let start = total_size.saturating_sub(suffix_len);
		return Parsed::Satisfiable(ByteRange {
			start,
			length: total_size - start,
		});
	}

	let Ok(start) = start_str.parse::<u64>() else {
		return Parsed::Ignored;
	};
	let end = if end_str.is_empty() {
		None
	} else {
		match end_str.parse::<u64>() {
			Ok(end) if end >= start => Some(end),
			_ => return Parsed::Ignored,
		}
	};

	if start >= total_size {
		return Parsed::Unsatisfiable;
	}

	let final_end = end.map_or(total_size - 1, |end| cmp::min(end, total_size - 1));

	Parsed::Satisfiable(ByteRange {
		start,
		length: final_end - start + 1,
	})
}
