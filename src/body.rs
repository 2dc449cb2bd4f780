/* src/body.rs */

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::iter::FusedIterator;

use bytes::Bytes;

/// Chunk size used when none is given: 64 KiB.
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 16;

/// A response body, produced lazily as a sequence of byte chunks.
///
/// File bodies are not read until iterated; dropping the body at any point
/// closes the underlying file.
#[derive(Debug, Default)]
pub enum Body {
	/// No content at all.
	#[default]
	Empty,
	/// An in-memory payload, yielded as a single chunk.
	Full(Bytes),
	/// A whole file, still unread. Range negotiation may narrow it.
	File(FileIter),
	/// A file already narrowed to a byte range.
	Range(RangeIter),
}

impl Body {
	/// Drains every chunk into a single buffer.
	pub fn read_to_end(self) -> io::Result<Vec<u8>> {
		let mut out = Vec::new();
		for chunk in self {
			out.extend_from_slice(&chunk?);
		}
		Ok(out)
	}
}

impl From<Bytes> for Body {
	fn from(bytes: Bytes) -> Self {
		Self::Full(bytes)
	}
}

impl From<String> for Body {
	fn from(text: String) -> Self {
		Self::Full(Bytes::from(text))
	}
}

impl From<&'static str> for Body {
	fn from(text: &'static str) -> Self {
		Self::Full(Bytes::from_static(text.as_bytes()))
	}
}

impl From<FileIter> for Body {
	fn from(file: FileIter) -> Self {
		Self::File(file)
	}
}

impl IntoIterator for Body {
	type Item = io::Result<Bytes>;
	type IntoIter = Chunks;

	fn into_iter(self) -> Self::IntoIter {
		let inner = match self {
			Self::Empty => Inner::Done,
			Self::Full(bytes) if bytes.is_empty() => Inner::Done,
			Self::Full(bytes) => Inner::Once(bytes),
			Self::File(file) => Inner::Range(file.into_iter()),
			Self::Range(range) => Inner::Range(range),
		};
		Chunks { inner }
	}
}

/// Iterator over the chunks of a [`Body`].
#[derive(Debug)]
pub struct Chunks {
	inner: Inner,
}

#[derive(Debug)]
enum Inner {
	Done,
	Once(Bytes),
	Range(RangeIter),
}

impl Iterator for Chunks {
	type Item = io::Result<Bytes>;

	fn next(&mut self) -> Option<Self::Item> {
		if let Inner::Range(range) = &mut self.inner {
			return range.next();
		}
		match std::mem::replace(&mut self.inner, Inner::Done) {
			Inner::Once(bytes) => Some(Ok(bytes)),
			Inner::Done | Inner::Range(_) => None,
		}
	}
}

impl FusedIterator for Chunks {}

/// An open file waiting to be streamed.
///
/// Iterating it directly streams the whole file; [`FileIter::range`] streams
/// a window of it instead. Either way the handle is consumed, so a body can
/// only be sent once.
#[derive(Debug)]
pub struct FileIter<R = File> {
	reader: R,
}

impl<R: Read + Seek> FileIter<R> {
	/// Wraps an open reader.
	pub fn new(reader: R) -> Self {
		Self { reader }
	}

	/// Streams from offset `seek` up to the absolute offset `limit`, in
	/// [`DEFAULT_BLOCK_SIZE`] chunks.
	pub fn range(self, seek: Option<u64>, limit: Option<u64>) -> RangeIter<R> {
		self.range_with_block_size(seek, limit, DEFAULT_BLOCK_SIZE)
	}

	/// Like [`FileIter::range`], reading at most `block_size` bytes per chunk.
	///
	/// A `seek` of zero is the same as no seek. `limit` is an end offset: once
	/// a seek is applied the remaining budget is `limit - seek`, and a limit
	/// at or before the seek point produces nothing.
	///
	/// ```
	/// use std::io::Cursor;
	/// use static_app::body::FileIter;
	///
	/// let file = FileIter::new(Cursor::new(b"0123456789".to_vec()));
	/// let chunks: Vec<_> = file
	///     .range_with_block_size(Some(2), Some(7), 2)
	///     .map(|chunk| chunk.unwrap())
	///     .collect();
	/// assert_eq!(chunks, vec!["23", "45", "6"]);
	/// ```
	pub fn range_with_block_size(
		self,
		seek: Option<u64>,
		limit: Option<u64>,
		block_size: usize,
	) -> RangeIter<R> {
		let seek = seek.filter(|&offset| offset != 0);
		let limit = match seek {
			Some(offset) => limit.map(|end| end.saturating_sub(offset)),
			None => limit,
		};
		RangeIter {
			reader: Some(self.reader),
			seek,
			limit,
			block_size: block_size.max(1),
		}
	}
}

impl<R: Read + Seek> IntoIterator for FileIter<R> {
	type Item = io::Result<Bytes>;
	type IntoIter = RangeIter<R>;

	fn into_iter(self) -> Self::IntoIter {
		self.range(None, None)
	}
}

/// Lazy chunk iterator over part of an open file.
///
/// The reader is released the moment the range is exhausted, when a read
/// fails, or when the iterator is dropped half way.
#[derive(Debug)]
pub struct RangeIter<R = File> {
	reader: Option<R>,
	seek: Option<u64>,
	limit: Option<u64>,
	block_size: usize,
}

impl<R> RangeIter<R> {
	/// Whether the underlying reader has already been released.
	#[must_use]
	pub fn is_closed(&self) -> bool {
		self.reader.is_none()
	}

	/// Bytes still allowed by the limit, if there is one.
	#[must_use]
	pub fn remaining(&self) -> Option<u64> {
		self.limit
	}

	fn close(&mut self) {
		self.reader = None;
	}
}

impl<R: Read + Seek> RangeIter<R> {
	fn pull(&mut self) -> io::Result<Option<Bytes>> {
		let Some(reader) = self.reader.as_mut() else {
			return Ok(None);
		};

		if let Some(offset) = self.seek.take() {
			reader.seek(SeekFrom::Start(offset))?;
		}

		let want = match self.limit {
			Some(0) => return Ok(None),
			Some(limit) => {
				usize::try_from(limit).map_or(self.block_size, |l| l.min(self.block_size))
			}
			None => self.block_size,
		};

		let mut buf = Vec::with_capacity(want);
		reader.by_ref().take(want as u64).read_to_end(&mut buf)?;
		if buf.is_empty() {
			return Ok(None);
		}

		if let Some(limit) = self.limit.as_mut() {
			*limit = limit.saturating_sub(buf.len() as u64);
		}
		Ok(Some(Bytes::from(buf)))
	}
}

impl<R: Read + Seek> Iterator for RangeIter<R> {
	type Item = io::Result<Bytes>;

	fn next(&mut self) -> Option<Self::Item> {
		match self.pull() {
			Ok(Some(chunk)) => {
				if self.limit == Some(0) {
					self.close();
				}
				Some(Ok(chunk))
			}
			Ok(None) => {
				self.close();
				None
			}
			Err(e) => {
				self.close();
				Some(Err(e))
			}
		}
	}
}

impl<R: Read + Seek> FusedIterator for RangeIter<R> {}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicBool, Ordering};

	/// Reader that records when it is dropped.
	#[derive(Debug)]
	struct Tracked {
		inner: Cursor<Vec<u8>>,
		dropped: Arc<AtomicBool>,
	}

	impl Read for Tracked {
		fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
			self.inner.read(buf)
		}
	}

	impl Seek for Tracked {
		fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
			self.inner.seek(pos)
		}
	}

	impl Drop for Tracked {
		fn drop(&mut self) {
			self.dropped.store(true, Ordering::SeqCst);
		}
	}

	fn tracked(len: usize) -> (FileIter<Tracked>, Arc<AtomicBool>) {
		let dropped = Arc::new(AtomicBool::new(false));
		let data = (0..len).map(|i| (i % 251) as u8).collect();
		let reader = Tracked {
			inner: Cursor::new(data),
			dropped: Arc::clone(&dropped),
		};
		(FileIter::new(reader), dropped)
	}

	fn expected(range: std::ops::Range<usize>) -> Vec<u8> {
		range.map(|i| (i % 251) as u8).collect()
	}

	/// Always fails to read.
	#[derive(Debug)]
	struct Broken;

	impl Read for Broken {
		fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
			Err(io::Error::other("disk on fire"))
		}
	}

	impl Seek for Broken {
		fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
			Ok(0)
		}
	}

	#[test]
	fn seek_and_limit_in_small_blocks() {
		let (file, dropped) = tracked(100);
		let mut iter = file.range_with_block_size(Some(10), Some(30), 5);
		let chunks: Vec<Bytes> = iter.by_ref().map(Result::unwrap).collect();

		assert_eq!(chunks.len(), 4);
		assert!(chunks.iter().all(|c| c.len() == 5));
		assert_eq!(chunks.concat(), expected(10..30));
		assert!(iter.is_closed());
		assert!(dropped.load(Ordering::SeqCst));
	}

	#[test]
	fn whole_file_by_default() {
		let (file, dropped) = tracked(DEFAULT_BLOCK_SIZE * 2 + 7);
		let chunks: Vec<Bytes> = file.into_iter().map(Result::unwrap).collect();

		assert_eq!(
			chunks.iter().map(Bytes::len).collect::<Vec<_>>(),
			vec![DEFAULT_BLOCK_SIZE, DEFAULT_BLOCK_SIZE, 7]
		);
		assert_eq!(chunks.concat(), expected(0..DEFAULT_BLOCK_SIZE * 2 + 7));
		assert!(dropped.load(Ordering::SeqCst));
	}

	#[test]
	fn zero_seek_matches_no_seek() {
		let (a, _) = tracked(50);
		let (b, _) = tracked(50);
		let with_zero: Vec<Bytes> = a
			.range_with_block_size(Some(0), Some(20), 8)
			.map(Result::unwrap)
			.collect();
		let without: Vec<Bytes> = b
			.range_with_block_size(None, Some(20), 8)
			.map(Result::unwrap)
			.collect();

		assert_eq!(with_zero, without);
		assert_eq!(with_zero.concat(), expected(0..20));
	}

	#[test]
	fn zero_limit_is_empty_and_closes() {
		let (file, dropped) = tracked(50);
		let mut iter = file.range(None, Some(0));
		assert!(iter.next().is_none());
		assert!(iter.is_closed());
		assert!(dropped.load(Ordering::SeqCst));
	}

	#[test]
	fn seek_past_eof_is_empty_and_closes() {
		let (file, dropped) = tracked(50);
		let mut iter = file.range(Some(500), None);
		assert!(iter.next().is_none());
		assert!(dropped.load(Ordering::SeqCst));
	}

	#[test]
	fn limit_before_seek_saturates() {
		let (file, _) = tracked(50);
		let iter = file.range(Some(30), Some(10));
		assert_eq!(iter.remaining(), Some(0));
		assert_eq!(iter.count(), 0);
	}

	#[test]
	fn limit_past_eof_stops_at_eof() {
		let (file, dropped) = tracked(12);
		let chunks: Vec<Bytes> = file
			.range_with_block_size(Some(4), Some(1000), 5)
			.map(Result::unwrap)
			.collect();
		assert_eq!(chunks.concat(), expected(4..12));
		assert!(dropped.load(Ordering::SeqCst));
	}

	#[test]
	fn abandoned_iterator_releases_reader() {
		let (file, dropped) = tracked(100);
		let mut iter = file.range_with_block_size(None, None, 10);
		assert!(iter.next().is_some());
		assert!(!dropped.load(Ordering::SeqCst));
		drop(iter);
		assert!(dropped.load(Ordering::SeqCst));
	}

	#[test]
	fn read_error_is_yielded_once() {
		let mut iter = FileIter::new(Broken).range(None, None);
		assert!(matches!(iter.next(), Some(Err(_))));
		assert!(iter.is_closed());
		assert!(iter.next().is_none());
	}

	#[test]
	fn real_file_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("data.bin");
		std::fs::write(&path, b"hello, range world").unwrap();

		let file = FileIter::new(File::open(&path).unwrap());
		let body = Body::Range(file.range(Some(7), Some(12)));
		assert_eq!(body.read_to_end().unwrap(), b"range");
	}

	#[test]
	fn full_body_yields_once() {
		let mut chunks = Body::from("abc").into_iter();
		assert_eq!(chunks.next().unwrap().unwrap(), "abc");
		assert!(chunks.next().is_none());
	}

	#[test]
	fn empty_bodies_yield_nothing() {
		assert_eq!(Body::Empty.into_iter().count(), 0);
		assert_eq!(Body::from(Bytes::new()).into_iter().count(), 0);
	}
}
