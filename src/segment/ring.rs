// SPDX-License-Identifier: Apache-2.0

use std::collections::VecDeque;
use all_asserts::debug_assert_le;
use crate::pool::Pool;
use super::Segment;

/// A group of [`Segment`]s contained in a ring buffer. Laden segments are kept
/// in order, with the head (read end) at the front and the tail (write end) at
/// the back. Exhausted segments are recycled eagerly; the pool, not the ring,
/// is responsible for keeping spare memory around.
#[derive(Default)]
pub(crate) struct Segments {
	ring: VecDeque<Segment>,
	count: usize,
}

impl Segments {
	/// Returns the number of readable bytes in all segments.
	pub fn count(&self) -> usize { self.count }

	/// Returns the number of segments.
	pub fn len(&self) -> usize { self.ring.len() }

	/// Returns `true` if the ring holds no segments.
	pub fn is_empty(&self) -> bool { self.ring.is_empty() }

	/// Returns the head segment.
	pub fn front(&self) -> Option<&Segment> { self.ring.front() }

	/// Returns the tail segment.
	pub fn back(&self) -> Option<&Segment> { self.ring.back() }

	/// Iterates over the segments, head first.
	pub fn iter(&self) -> impl Iterator<Item = &Segment> + '_ {
		self.ring.iter()
	}

	/// Pushes a segment to the tail.
	pub fn push_back(&mut self, seg: Segment) {
		self.count += seg.len();
		self.ring.push_back(seg);
	}

	/// Pushes a segment to the head.
	pub fn push_front(&mut self, seg: Segment) {
		self.count += seg.len();
		self.ring.push_front(seg);
	}

	/// Pops the head segment.
	pub fn pop_front(&mut self) -> Option<Segment> {
		let seg = self.ring.pop_front()?;
		self.count -= seg.len();
		Some(seg)
	}

	/// Mutates the head segment through `op`, keeping the byte count consistent.
	pub fn with_front<R>(&mut self, op: impl FnOnce(&mut Segment) -> R) -> Option<R> {
		let seg = self.ring.front_mut()?;
		let before = seg.len();
		let result = op(seg);
		let after = seg.len();
		self.count = recalc(self.count, before, after);
		Some(result)
	}

	/// Mutates the tail segment through `op`, keeping the byte count consistent.
	pub fn with_back<R>(&mut self, op: impl FnOnce(&mut Segment) -> R) -> Option<R> {
		let seg = self.ring.back_mut()?;
		let before = seg.len();
		let result = op(seg);
		let after = seg.len();
		self.count = recalc(self.count, before, after);
		Some(result)
	}

	/// Makes sure the tail segment is writable, claiming a fresh one from the
	/// pool when the ring is empty or the current tail cannot take `min_needed`
	/// more bytes.
	pub fn reserve_back(&mut self, pool: &impl Pool, min_needed: usize) {
		debug_assert_le!(min_needed, super::SIZE);
		let fits = self.ring
			.back()
			.is_some_and(|seg| seg.can_append() && seg.lim() >= min_needed.max(1));
		if !fits {
			self.ring.push_back(pool.claim_one());
		}
	}

	/// Appends a segment transferred from another ring, merging it into the
	/// current tail when both fit in one block. The merged-out segment goes back
	/// to the pool. This keeps interior segments at least half full after
	/// splicing, since two adjacent segments whose contents fit in one block are
	/// always combined.
	pub fn push_compact(&mut self, mut seg: Segment, pool: &impl Pool) {
		if seg.is_empty() {
			pool.recycle_one(seg);
			return;
		}

		if let Some(back) = self.ring.back_mut() {
			if back.can_append() && seg.len() <= back.free_space() {
				let moved = seg.move_into(back, seg.len());
				self.count += moved;
				if seg.is_empty() {
					pool.recycle_one(seg);
					return;
				}
			}
		}

		self.push_back(seg);
	}

	/// Moves up to `byte_count` bytes from this ring's head into the tail of
	/// `other` by in-place copy, returning the number of bytes moved.
	pub fn move_front_into_back(&mut self, other: &mut Segments, byte_count: usize) -> usize {
		let Some(front) = self.ring.front_mut() else { return 0 };
		let Some(back) = other.ring.back_mut() else { return 0 };
		let moved = front.move_into(back, byte_count);
		self.count -= moved;
		other.count += moved;
		moved
	}

	/// Recycles exhausted head segments.
	pub fn tidy(&mut self, pool: &impl Pool) {
		while self.ring.front().is_some_and(Segment::is_empty) {
			if let Some(seg) = self.ring.pop_front() {
				pool.recycle_one(seg);
			}
		}
	}

	/// Recycles all segments.
	pub fn clear(&mut self, pool: &impl Pool) {
		pool.recycle(self.ring.drain(..));
		self.count = 0;
	}
}

fn recalc(count: usize, before: usize, after: usize) -> usize {
	count + after - before
}
