// SPDX-License-Identifier: Apache-2.0

pub(crate) mod memory;
pub(crate) mod ring;

use std::sync::Arc;
use memory::{Block, Memory};

/// The segment capacity, in bytes.
pub const SIZE: usize = 8192;

/// A fixed-size buffer segment: a reference-counted block of [`SIZE`] bytes with
/// a read cursor, a write cursor, and an owner flag. Only the segment a block
/// was claimed into may append to it, and only while the block is not shared.
pub struct Segment {
	mem: Memory,
	owner: bool,
}

impl Segment {
	fn new(mem: Memory, owner: bool) -> Self {
		Self { mem, owner }
	}

	/// Returns a new empty segment with freshly allocated memory.
	pub fn empty() -> Self { Self::new(Memory::default(), true) }

	/// Rebuilds a segment around a recycled block.
	pub(crate) fn from_block(block: Arc<Block>) -> Self {
		Self::new(Memory::new(block), true)
	}

	/// Returns a new read-only segment sharing this segment's block, with the
	/// same position and limit.
	pub fn share_all(&self) -> Self { Self::new(self.mem.share_all(), false) }

	/// Returns a new read-only segment sharing the first `byte_count` readable
	/// bytes of this segment's block.
	pub fn share(&self, byte_count: usize) -> Self {
		Self::new(self.mem.share(byte_count), false)
	}

	/// Returns `true` if the segment is empty.
	pub fn is_empty(&self) -> bool { self.len() == 0 }
	/// Returns `true` if no more bytes can be appended.
	pub fn is_full(&self) -> bool { self.lim() == 0 }

	/// Returns the position, from `[0,SIZE]`.
	pub fn pos(&self) -> usize { self.mem.start() }
	/// Returns the number of readable bytes, from `[0,SIZE]`.
	pub fn len(&self) -> usize { self.mem.len() }
	/// Returns the number of bytes that can be appended at the tail.
	pub fn lim(&self) -> usize { self.mem.lim() }

	/// Returns `true` if this segment's block is referenced by another segment.
	pub fn is_shared(&self) -> bool { self.mem.is_shared() }

	/// Returns `true` if this segment may have bytes appended: it owns its block
	/// and the block is not shared.
	pub fn can_append(&self) -> bool { self.owner && !self.is_shared() }

	/// Returns the number of bytes this segment could absorb, counting the
	/// unused area before the position which a slide would free. Zero for
	/// segments that cannot append.
	pub fn free_space(&self) -> usize {
		if self.can_append() {
			self.lim() + self.pos()
		} else {
			0
		}
	}

	/// Returns a slice of the data available for reading.
	pub fn data(&self) -> &[u8] { self.mem.data() }

	/// Returns a mutable slice of the writable tail area, or an empty slice if
	/// the segment cannot append. Writes must be committed with [`add`].
	///
	/// [`add`]: Self::add
	pub fn spare_mut(&mut self) -> &mut [u8] {
		if self.owner {
			self.mem.spare_mut()
		} else {
			&mut []
		}
	}

	/// Shifts the data back such that `pos` is 0.
	pub fn shift(&mut self) {
		if self.can_append() {
			self.mem.shift();
		}
	}

	/// Consumes `n` bytes after reading.
	pub fn consume(&mut self, n: usize) {
		self.mem.consume(n);
	}

	/// Adds `n` bytes after writing.
	pub fn add(&mut self, n: usize) {
		self.mem.add(n);
	}

	/// Moves up to `byte_count` bytes into another segment by in-place copy,
	/// returning the number of bytes moved. The target's data slides back to
	/// position 0 first when the tail alone is too small. Moves nothing if the
	/// target cannot append.
	pub fn move_into(&mut self, other: &mut Self, byte_count: usize) -> usize {
		if !other.can_append() { return 0 }

		let cnt = byte_count.min(self.len());
		if other.lim() < cnt && other.pos() > 0 {
			other.shift();
		}
		self.mem.move_into(&mut other.mem, cnt)
	}

	/// Pushes one byte to the segment, returning `true` if it could be written.
	pub fn push(&mut self, byte: u8) -> bool {
		self.owner && self.mem.push(byte)
	}

	/// Pops one byte from the segment.
	pub fn pop(&mut self) -> Option<u8> {
		self.mem.pop()
	}

	/// Pushes a slice of bytes to the segment, returning the number of bytes
	/// written.
	pub fn push_slice(&mut self, bytes: &[u8]) -> usize {
		if self.owner {
			self.mem.push_slice(bytes)
		} else {
			0
		}
	}

	/// Pops bytes into a slice from the segment, returning the number of bytes
	/// read.
	pub fn pop_into_slice(&mut self, bytes: &mut [u8]) -> usize {
		self.mem.pop_into_slice(bytes)
	}

	/// Unwraps the segment's block for recycling. Returns `None` for shared
	/// blocks, which are reclaimed when their last referrer drops instead.
	pub(crate) fn into_block(self) -> Option<Arc<Block>> {
		self.mem.into_block()
	}
}

impl Default for Segment {
	fn default() -> Self { Self::empty() }
}
