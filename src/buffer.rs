// SPDX-License-Identifier: Apache-2.0

mod options;
mod parse;
mod read;
mod utf8;
mod write;

pub use options::BufferOptions;

use std::fmt;
use std::hash::{Hash, Hasher};
use itertools::Itertools;
use crate::error::{Error, OperationKind, PositionError, Result};
use crate::pool::{DefaultPool, Pool};
use crate::segment::ring::Segments;
use crate::segment::Segment;
use crate::util::utf8::{decode_code_point, REPLACEMENT};

/// A byte queue implemented as a ring of pooled [`Segment`]s. Bytes are written
/// at the tail and read at the head; splicing between buffers relinks whole
/// segments, and snapshots share segment memory instead of copying it.
pub struct Buffer<P: Pool = DefaultPool> {
	pub(crate) pool: P,
	pub(crate) segments: Segments,
	pub(crate) options: BufferOptions,
}

impl<P: Pool + Default> Default for Buffer<P> {
	fn default() -> Self { Self::new(P::default()) }
}

impl<P: Pool + Default> Buffer<P> {
	/// Creates a buffer that always shares on split instead of copying.
	pub fn lean() -> Self {
		Self::with_options(P::default(), BufferOptions::lean())
	}
}

impl<P: Pool> Buffer<P> {
	pub fn new(pool: P) -> Self {
		Self::with_options(pool, BufferOptions::default())
	}

	pub fn with_options(pool: P, options: BufferOptions) -> Self {
		Self {
			pool,
			segments: Segments::default(),
			options,
		}
	}

	/// Returns the buffer's tuning options.
	pub fn options(&self) -> BufferOptions { self.options }

	/// Returns the number of readable bytes.
	pub fn count(&self) -> usize {
		self.segments.count()
	}

	/// Returns `true` if the buffer contains no bytes.
	pub fn is_empty(&self) -> bool {
		self.count() == 0
	}

	/// Returns the number of segments currently linked into the buffer.
	pub fn segment_count(&self) -> usize {
		self.segments.len()
	}

	/// Returns `true` if at least `byte_count` bytes are available.
	pub fn request(&self, byte_count: usize) -> bool {
		self.count() >= byte_count
	}

	/// Returns an end-of-stream error unless at least `byte_count` bytes are
	/// available.
	pub fn require(&self, byte_count: usize) -> Result {
		if self.request(byte_count) {
			Ok(())
		} else {
			Err(Error::eos(OperationKind::BufRead))
		}
	}

	/// Recycles all segments, leaving the buffer empty.
	pub fn clear(&mut self) {
		let Self { pool, segments, .. } = self;
		segments.clear(pool);
	}

	/// Removes `byte_count` bytes from the head, failing with end-of-stream if
	/// fewer are available. No bytes are consumed on failure.
	pub fn skip(&mut self, byte_count: usize) -> Result {
		self.require(byte_count)?;
		let skipped = self.skip_at_most(byte_count);
		debug_assert_eq!(skipped, byte_count);
		Ok(())
	}

	/// Removes up to `byte_count` bytes from the head, returning the number
	/// removed.
	pub(crate) fn skip_at_most(&mut self, mut byte_count: usize) -> usize {
		let mut skipped = 0;
		while byte_count > 0 && !self.segments.is_empty() {
			let n = self.segments
				.with_front(|seg| {
					let n = byte_count.min(seg.len());
					seg.consume(n);
					n
				})
				.unwrap_or_default();
			skipped += n;
			byte_count -= n;
			let Self { pool, segments, .. } = self;
			segments.tidy(pool);
		}
		skipped
	}

	/// Removes all bytes, returning the number removed.
	pub fn skip_all(&mut self) -> usize {
		let count = self.count();
		self.clear();
		count
	}

	/// Repacks the buffer's bytes into as few segments as possible, releasing
	/// shared blocks and reclaiming the gaps partial reads and splices leave
	/// behind. The byte sequence is unchanged. This copies, so it is worth
	/// calling only when a buffer is held for a long time.
	pub fn compact(&mut self) {
		if self.segment_count() < 2 && !self.segments.front().is_some_and(Segment::is_shared) {
			return
		}

		let Self { pool, segments, .. } = self;
		let before = segments.count();
		let mut packed = Segments::default();
		while let Some(mut seg) = segments.pop_front() {
			while !seg.is_empty() {
				packed.reserve_back(pool, 1);
				packed.with_back(|back| seg.move_into(back, seg.len()));
			}
			pool.recycle_one(seg);
		}

		debug_assert_eq!(packed.count(), before);
		*segments = packed;
	}

	/// Returns the byte at `pos` without consuming it.
	pub fn get(&self, pos: usize) -> Result<u8> {
		let (index, seg_start) = self.locate(pos)
			.ok_or_else(|| Error::out_of_bounds(
				OperationKind::BufRead,
				PositionError { pos, count: self.count() }
			))?;
		let seg = self.segments
			.iter()
			.nth(index)
			.expect("located segment should exist");
		Ok(seg.data()[pos - seg_start])
	}

	/// Returns the absolute offset of the first occurrence of `byte` in
	/// `[from, to)`, or `None`. The range end is clamped to the byte count.
	pub fn index_of(&self, byte: u8, from: usize, to: usize) -> Option<usize> {
		let to = to.min(self.count());
		if from >= to { return None }

		let (index, mut seg_start) = self.locate(from)?;
		for seg in self.segments.iter().skip(index) {
			if seg_start >= to { break }

			let data = seg.data();
			let lo = from.saturating_sub(seg_start);
			let hi = data.len().min(to - seg_start);
			if let Some(found) = data[lo..hi].iter().position(|&b| b == byte) {
				return Some(seg_start + lo + found)
			}
			seg_start += data.len();
		}
		None
	}

	/// Locates the segment containing absolute `offset`, scanning from the head
	/// or the tail, whichever is closer. Returns the segment's index and the
	/// absolute offset at which it begins.
	pub(crate) fn locate(&self, offset: usize) -> Option<(usize, usize)> {
		let count = self.count();
		if offset >= count { return None }

		if offset <= count / 2 {
			// Scan forward from the head.
			let mut start = 0;
			for (index, seg) in self.segments.iter().enumerate() {
				if offset < start + seg.len() {
					return Some((index, start))
				}
				start += seg.len();
			}
		} else {
			// Scan backward from the tail.
			let mut end = count;
			let len = self.segments.len();
			for (rev_index, seg) in self.segments.iter().collect_vec().into_iter().rev().enumerate() {
				end -= seg.len();
				if offset >= end {
					return Some((len - 1 - rev_index, end))
				}
			}
		}
		None
	}

	/// Copies `byte_count` bytes starting at `offset` into `sink` by sharing
	/// segment memory. No bytes are copied and this buffer is unchanged.
	pub fn copy_to(&self, sink: &mut Buffer<impl Pool>, offset: usize, byte_count: usize) -> Result {
		if byte_count == 0 { return Ok(()) }
		let end = match offset.checked_add(byte_count) {
			Some(end) if end <= self.count() => end,
			_ => return Err(Error::out_of_bounds(
				OperationKind::BufCopy,
				PositionError { pos: offset.saturating_add(byte_count), count: self.count() }
			))
		};
		let mut seg_start = 0;
		for seg in self.segments.iter() {
			let seg_end = seg_start + seg.len();
			if seg_end > offset {
				let lo = offset.saturating_sub(seg_start);
				let hi = seg.len().min(end - seg_start);
				let mut shared = seg.share(hi);
				shared.consume(lo);
				sink.segments.push_back(shared);
			}
			seg_start = seg_end;
			if seg_start >= end { break }
		}
		Ok(())
	}

	/// Copies all bytes into `sink` by sharing segment memory.
	pub fn copy_all_to(&self, sink: &mut Buffer<impl Pool>) -> Result {
		self.copy_to(sink, 0, self.count())
	}

	/// Returns the number of bytes in segments that are complete: everything
	/// except a still-writable tail, which may yet take more bytes.
	pub(crate) fn complete_byte_count(&self) -> usize {
		let held_back = self.segments
			.back()
			.filter(|seg| seg.can_append() && !seg.is_full())
			.map_or(0, Segment::len);
		self.count() - held_back
	}

	/// Returns the order-sensitive content hash `h = 31 * h + byte` over all
	/// readable bytes.
	pub fn hash_code(&self) -> i32 {
		let mut hash = 0i32;
		for seg in self.segments.iter() {
			for &byte in seg.data() {
				hash = hash.wrapping_mul(31).wrapping_add(byte as i32);
			}
		}
		hash
	}
}

impl<P: Pool + Clone> Buffer<P> {
	/// Returns a snapshot of this buffer. The copy shares segment memory with
	/// the source; neither buffer's reads affect the other.
	pub fn copy(&self) -> Self {
		let mut copy = Self::new(self.pool.clone());
		let _ = self.copy_all_to(&mut copy);
		copy
	}
}

impl<P: Pool + Clone> Clone for Buffer<P> {
	fn clone(&self) -> Self { self.copy() }
}

impl<P: Pool> Drop for Buffer<P> {
	fn drop(&mut self) {
		self.clear();
	}
}

impl<P: Pool, O: Pool> PartialEq<Buffer<O>> for Buffer<P> {
	/// Buffers are equal when they hold identical bytes, regardless of how the
	/// bytes are chunked into segments.
	fn eq(&self, other: &Buffer<O>) -> bool {
		if self.count() != other.count() { return false }

		let mut a = self.segments.iter().map(Segment::data).filter(|data| !data.is_empty());
		let mut b = other.segments.iter().map(Segment::data).filter(|data| !data.is_empty());
		let (mut left, mut right) = (&[][..], &[][..]);
		loop {
			if left.is_empty() {
				left = match a.next() {
					Some(data) => data,
					None => return right.is_empty() && b.next().is_none(),
				};
			}
			if right.is_empty() {
				right = match b.next() {
					Some(data) => data,
					None => return false,
				};
			}
			let n = left.len().min(right.len());
			if left[..n] != right[..n] { return false }
			left = &left[n..];
			right = &right[n..];
		}
	}
}

impl<P: Pool> Eq for Buffer<P> { }

impl<P: Pool> Hash for Buffer<P> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		// Fed per byte, not per slice, so equal buffers hash alike no matter
		// how their bytes are chunked into segments.
		for seg in self.segments.iter() {
			for &byte in seg.data() {
				state.write_u8(byte);
			}
		}
	}
}

const DESCRIBE_LIMIT: usize = 64;

impl<P: Pool> fmt::Display for Buffer<P> {
	/// Formats as `[size=N text=…]` when the first code points are printable,
	/// falling back to `[size=N hex=…]` of the leading bytes otherwise.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let count = self.count();
		if count == 0 {
			return write!(f, "[size=0]")
		}

		// Up to 64 code points at up to 4 bytes each.
		let prefix: Vec<u8> = self.segments
			.iter()
			.flat_map(Segment::data)
			.copied()
			.take(DESCRIBE_LIMIT * 4)
			.collect();

		if let Some(text) = printable_prefix(&prefix, count) {
			write!(f, "[size={count} text={text}]")
		} else {
			let shown = &prefix[..prefix.len().min(DESCRIBE_LIMIT)];
			let hex = base16ct::lower::encode_string(shown);
			let ellipsis = if count > DESCRIBE_LIMIT { "…" } else { "" };
			write!(f, "[size={count} hex={hex}{ellipsis}]")
		}
	}
}

/// Decodes up to 64 leading code points, returning the printable text form or
/// `None` when any of them is a control character or malformed.
fn printable_prefix(prefix: &[u8], count: usize) -> Option<String> {
	let mut text = String::new();
	let mut off = 0;
	let mut points = 0;
	while off < prefix.len() && points < DESCRIBE_LIMIT {
		let (point, len) = decode_code_point(&prefix[off..]);
		if point == REPLACEMENT {
			return None
		}
		let c = char::from_u32(point)?;
		if c.is_control() && c != '\n' && c != '\r' {
			return None
		}
		text.push(c);
		off += len;
		points += 1;
	}
	if off < count {
		text.push('…');
	}
	Some(text)
}

impl<P: Pool> fmt::Debug for Buffer<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Buffer{self}")
	}
}
