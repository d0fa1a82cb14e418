// SPDX-License-Identifier: Apache-2.0

use crate::segment::SIZE;

/// Options for tuning [`Buffer`](super::Buffer)'s behavior and performance.
///
/// # Share threshold
///
/// The minimum size for segment data to be shared rather than copied when a
/// segment is split or a prefix of it moves to another buffer. Defaults to
/// `1024B`, one eighth the segment size. With a value above the segment size,
/// segments are never shared.
///
/// Sharing is significantly faster than copying for large prefixes, O(1) vs
/// O(n) complexity, but pins the whole block in memory until every referrer is
/// done with it. Copying small prefixes keeps tiny reads from holding 8KiB
/// blocks hostage.
#[derive(Copy, Clone, Debug)]
#[non_exhaustive]
pub struct BufferOptions {
	pub share_threshold: usize,
}

impl Default for BufferOptions {
	fn default() -> Self {
		Self {
			share_threshold: SIZE / 8,
		}
	}
}

impl BufferOptions {
	/// Presets the options to create a "lean" buffer, one that always shares on
	/// split instead of copying.
	pub fn lean() -> Self {
		Self {
			share_threshold: 0,
		}
	}

	/// Returns the segment share threshold.
	pub fn share_threshold(&self) -> usize { self.share_threshold }

	/// Sets the segment share threshold.
	pub fn set_share_threshold(mut self, value: usize) -> Self {
		self.share_threshold = value;
		self
	}
}
