// SPDX-License-Identifier: Apache-2.0

use std::cmp::min;
use std::io::Write;
use crate::Buffer;
use crate::error::{Error, Result};
use crate::pool::Pool;
use crate::segment::Segment;
use crate::streams::{BufSink, BufSource, BufStream, Sink, Source};

impl<P: Pool> Buffer<P> {
	/// Consumes up to `max_count` bytes through `consume`, one segment slice at
	/// a time. The closure returns how many bytes of the slice it took; a short
	/// take ends the loop.
	pub(crate) fn read_segments(
		&mut self,
		mut max_count: usize,
		mut consume: impl FnMut(&[u8]) -> Result<usize>,
	) -> Result<usize> {
		let mut count = 0;
		while max_count > 0 && !self.segments.is_empty() {
			let read = self.segments
				.with_front(|seg| {
					let len = min(max_count, seg.len());
					let read = consume(&seg.data()[..len])?;
					seg.consume(read);
					Ok::<_, Error>(read)
				})
				.unwrap_or(Ok(0))?;

			self.tidy();
			if read == 0 { break }
			count += read;
			max_count -= read;
		}
		Ok(count)
	}

	pub(crate) fn read_std<W: Write>(&mut self, writer: &mut W, count: usize) -> Result<usize> {
		self.read_segments(count, |seg| Ok(writer.write(seg)?))
	}

	pub(crate) fn tidy(&mut self) {
		let Self { pool, segments, .. } = self;
		segments.tidy(pool);
	}

	/// Reads one byte from the head.
	pub fn read_u8(&mut self) -> Result<u8> {
		self.require(1)?;

		let byte = self.segments
			.with_front(|seg| seg.pop())
			.flatten()
			.expect("should be at least one byte available after require");

		self.tidy();
		Ok(byte)
	}

	/// Reads one signed byte from the head.
	pub fn read_i8(&mut self) -> Result<i8> {
		self.read_u8().map(|n| n as i8)
	}

	/// Reads a fixed-size array from the head. When the array straddles a
	/// segment boundary it is assembled one byte at a time; reads never touch
	/// memory past a segment's readable data.
	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		self.require(N)?;

		let mut array = [0; N];
		let direct = self.segments
			.with_front(|seg| {
				if seg.len() >= N {
					seg.pop_into_slice(&mut array);
					true
				} else {
					false
				}
			})
			.unwrap_or_default();

		if direct {
			self.tidy();
		} else {
			for slot in &mut array {
				*slot = self.read_u8()?;
			}
		}
		Ok(array)
	}

	/// Reads bytes into a slice, returning the number of bytes read.
	pub fn read_into_slice(&mut self, dst: &mut [u8]) -> Result<usize> {
		let n = min(dst.len(), self.count());
		self.read_into_slice_exact(&mut dst[..n])?;
		Ok(n)
	}

	/// Fills a slice exactly, failing with end-of-stream (and consuming
	/// nothing) if fewer bytes are available.
	pub fn read_into_slice_exact(&mut self, dst: &mut [u8]) -> Result {
		let count = dst.len();
		self.require(count)?;

		let mut off = 0;
		self.read_segments(count, |seg| {
			dst[off..off + seg.len()].copy_from_slice(seg);
			off += seg.len();
			Ok(seg.len())
		})?;

		debug_assert_eq!(off, count, "exact slice length should have been read");
		Ok(())
	}

	/// Reads up to `byte_count` bytes into an owned byte string.
	pub fn read_byte_str(&mut self, byte_count: usize) -> Result<Vec<u8>> {
		let len = min(byte_count, self.count());
		let mut dst = Vec::with_capacity(len);

		self.read_segments(byte_count, |seg| {
			dst.extend_from_slice(seg);
			Ok(seg.len())
		})?;
		Ok(dst)
	}

	/// Splits the head so its first `byte_count` bytes land in a new segment in
	/// front of it. Large prefixes share the head's block; small ones are
	/// copied into a fresh segment so the head's block stays appendable.
	fn split_front(&mut self, byte_count: usize) {
		let Self { pool, segments, options } = self;
		let prefix = segments.with_front(|front| {
			let prefix = if byte_count >= options.share_threshold {
				front.share(byte_count)
			} else {
				let mut seg = pool.claim_one();
				let copied = seg.push_slice(&front.data()[..byte_count]);
				debug_assert_eq!(copied, byte_count);
				seg
			};
			front.consume(byte_count);
			prefix
		});

		if let Some(prefix) = prefix {
			segments.push_front(prefix);
		}
	}
}

macro_rules! gen_int_reads {
	($($s_name:ident $s_le_name:ident $s_ty:ident $u_name:ident $u_le_name:ident $u_ty:ident),+ $(,)?) => {$(
		#[doc = concat!(" Reads one big-endian [`", stringify!($s_ty), "`] from the head.")]
		pub fn $s_name(&mut self) -> Result<$s_ty> {
			self.$u_name().map(|n| n as $s_ty)
		}

		#[doc = concat!(" Reads one little-endian [`", stringify!($s_ty), "`] from the head.")]
		pub fn $s_le_name(&mut self) -> Result<$s_ty> {
			self.$u_le_name().map(|n| n as $s_ty)
		}

		#[doc = concat!(" Reads one big-endian [`", stringify!($u_ty), "`] from the head.")]
		pub fn $u_name(&mut self) -> Result<$u_ty> {
			Ok(<$u_ty>::from_be_bytes(self.read_array()?))
		}

		#[doc = concat!(" Reads one little-endian [`", stringify!($u_ty), "`] from the head.")]
		pub fn $u_le_name(&mut self) -> Result<$u_ty> {
			Ok(<$u_ty>::from_le_bytes(self.read_array()?))
		}
	)+};
}

impl<P: Pool> Buffer<P> {
	gen_int_reads! {
		read_i16   read_i16_le   i16   read_u16   read_u16_le   u16,
		read_i32   read_i32_le   i32   read_u32   read_u32_le   u32,
		read_i64   read_i64_le   i64   read_u64   read_u64_le   u64,
		read_isize read_isize_le isize read_usize read_usize_le usize,
	}

	/// Reads one big-endian [`f32`] from the head.
	pub fn read_f32(&mut self) -> Result<f32> {
		self.read_u32().map(f32::from_bits)
	}

	/// Reads one little-endian [`f32`] from the head.
	pub fn read_f32_le(&mut self) -> Result<f32> {
		self.read_u32_le().map(f32::from_bits)
	}

	/// Reads one big-endian [`f64`] from the head.
	pub fn read_f64(&mut self) -> Result<f64> {
		self.read_u64().map(f64::from_bits)
	}

	/// Reads one little-endian [`f64`] from the head.
	pub fn read_f64_le(&mut self) -> Result<f64> {
		self.read_u64_le().map(f64::from_bits)
	}
}

impl<P: Pool> Source for Buffer<P> {
	/// Moves up to `count` bytes from the head of this buffer to the tail of
	/// `sink`. Whole segments transfer by relinking; a partial head is either
	/// copied into the sink's tail when it fits, or split first. A relinked
	/// segment merges into its predecessor whenever both fit in one block, so
	/// interior segments stay at least half full.
	fn read(&mut self, sink: &mut Buffer<impl Pool>, mut count: usize) -> Result<usize> {
		count = min(count, self.count());
		let mut moved = 0;

		while moved < count {
			let remaining = count - moved;
			let Some(head_len) = self.segments.front().map(Segment::len) else { break };

			if remaining < head_len {
				let absorbable = sink.segments
					.back()
					.is_some_and(|back| remaining <= back.free_space());
				if absorbable {
					moved += self.segments.move_front_into_back(&mut sink.segments, remaining);
					continue;
				}
				self.split_front(remaining);
			}

			let Some(seg) = self.segments.pop_front() else { break };
			let len = seg.len();
			let Buffer { pool, segments, .. } = sink;
			segments.push_compact(seg, pool);
			moved += len;
		}

		self.tidy();
		Ok(moved)
	}

	fn read_all(&mut self, sink: &mut Buffer<impl Pool>) -> Result<usize> {
		let count = self.count();
		self.read(sink, count)
	}

	fn close_source(&mut self) -> Result {
		self.clear();
		Ok(())
	}
}

impl<P: Pool> BufStream for Buffer<P> {
	type Pool = P;

	fn buf(&self) -> &Buffer<P> { self }
	fn buf_mut(&mut self) -> &mut Buffer<P> { self }
}

impl<P: Pool> BufSource for Buffer<P> {
	fn request(&mut self, byte_count: usize) -> Result<bool> {
		Ok(Buffer::request(self, byte_count))
	}

	fn read_all_into(&mut self, sink: &mut impl Sink) -> Result<usize> {
		sink.write_all(self)
			.map_err(Error::with_op_buf_read)
	}
}

impl<P: Pool> BufSink for Buffer<P> {
	fn write_all_from(&mut self, source: &mut impl Source) -> Result<usize> {
		source.read_all(self)
			.map_err(Error::with_op_buf_write)
	}
}
