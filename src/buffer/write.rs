// SPDX-License-Identifier: Apache-2.0

use std::cmp::min;
use std::io::Read;
use crate::Buffer;
use crate::error::{Error, Message, Result};
use crate::error::OperationKind::BufWrite;
use crate::pool::Pool;
use crate::streams::{Sink, Source};

impl<P: Pool> Buffer<P> {
	/// Produces up to `count` bytes through `write`, one writable tail slice at
	/// a time. The closure returns how many bytes of the slice it filled; a
	/// short fill ends the loop.
	pub(crate) fn write_segments(
		&mut self,
		mut count: usize,
		mut write: impl FnMut(&mut [u8]) -> Result<usize>,
	) -> Result<usize> {
		let mut written = 0;
		while count > 0 {
			let Self { pool, segments, .. } = self;
			segments.reserve_back(pool, 1);

			let n = segments
				.with_back(|seg| {
					let spare = seg.spare_mut();
					let limit = min(count, spare.len());
					let n = write(&mut spare[..limit])?;
					seg.add(n);
					Ok::<_, Error>(n)
				})
				.unwrap_or(Ok(0))?;

			if n == 0 { break }
			written += n;
			count -= n;
		}
		Ok(written)
	}

	pub(crate) fn write_std<R: Read>(&mut self, reader: &mut R, count: usize) -> Result<usize> {
		self.write_segments(count, |seg| Ok(reader.read(seg)?))
	}

	/// Writes one byte at the tail.
	pub fn write_u8(&mut self, value: u8) -> Result {
		self.write_segments(1, |seg| {
			seg[0] = value;
			Ok(1)
		})?;
		Ok(())
	}

	/// Writes one signed byte at the tail.
	pub fn write_i8(&mut self, value: i8) -> Result {
		self.write_u8(value as u8)
	}

	/// Writes a slice of bytes at the tail.
	pub fn write_from_slice(&mut self, mut value: &[u8]) -> Result {
		while !value.is_empty() {
			self.write_segments(value.len(), |seg| {
				let n = min(seg.len(), value.len());
				seg[..n].copy_from_slice(&value[..n]);
				value = &value[n..];
				Ok(n)
			})?;
		}
		Ok(())
	}

	/// Constructs a buffer holding a copy of `value`.
	pub fn from_slice(value: &[u8]) -> Result<Self>
	where P: Default {
		let mut buffer = Self::default();
		buffer.write_from_slice(value)?;
		Ok(buffer)
	}
}

macro_rules! gen_int_writes {
	($($name:ident $le_name:ident $ty:ident),+ $(,)?) => {$(
		#[doc = concat!(" Writes one big-endian [`", stringify!($ty), "`] at the tail.")]
		pub fn $name(&mut self, value: $ty) -> Result {
			self.write_from_slice(&value.to_be_bytes())
		}

		#[doc = concat!(" Writes one little-endian [`", stringify!($ty), "`] at the tail.")]
		pub fn $le_name(&mut self, value: $ty) -> Result {
			self.write_from_slice(&value.to_le_bytes())
		}
	)+};
}

impl<P: Pool> Buffer<P> {
	gen_int_writes! {
		write_i16   write_i16_le   i16,
		write_u16   write_u16_le   u16,
		write_i32   write_i32_le   i32,
		write_u32   write_u32_le   u32,
		write_i64   write_i64_le   i64,
		write_u64   write_u64_le   u64,
		write_isize write_isize_le isize,
		write_usize write_usize_le usize,
	}

	/// Writes one big-endian [`f32`] at the tail.
	pub fn write_f32(&mut self, value: f32) -> Result {
		self.write_u32(value.to_bits())
	}

	/// Writes one little-endian [`f32`] at the tail.
	pub fn write_f32_le(&mut self, value: f32) -> Result {
		self.write_u32_le(value.to_bits())
	}

	/// Writes one big-endian [`f64`] at the tail.
	pub fn write_f64(&mut self, value: f64) -> Result {
		self.write_u64(value.to_bits())
	}

	/// Writes one little-endian [`f64`] at the tail.
	pub fn write_f64_le(&mut self, value: f64) -> Result {
		self.write_u64_le(value.to_bits())
	}
}

impl<P: Pool> Sink for Buffer<P> {
	/// Moves exactly `count` bytes from the head of `source` to this buffer's
	/// tail. Fails with an invalid-argument error when `source` holds fewer
	/// than `count` bytes.
	fn write(&mut self, source: &mut Buffer<impl Pool>, count: usize) -> Result<usize> {
		if count > source.count() {
			return Err(Error::invalid_input(
				BufWrite,
				Message("byte count exceeds the source buffer's size")
			))
		}
		source.read(self, count).map_err(Error::with_op_buf_write)
	}

	fn write_all(&mut self, source: &mut Buffer<impl Pool>) -> Result<usize> {
		source.read_all(self).map_err(Error::with_op_buf_write)
	}

	fn close_sink(&mut self) -> Result {
		self.clear();
		Ok(())
	}
}
