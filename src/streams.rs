// SPDX-License-Identifier: Apache-2.0

//! Raw and buffered stream traits. A [`Source`] produces bytes into a
//! [`Buffer`]; a [`Sink`] consumes bytes out of one. [`BufSource`] and
//! [`BufSink`] add typed operations on top of an internal buffer, implemented
//! once here and shared by [`Buffer`] itself and the buffered wrappers.

use std::cmp::min;
use std::mem;
use crate::buffer::Buffer;
use crate::buffered_wrappers::{BufferedSink, BufferedSource};
use crate::error::OperationKind::BufRead;
use crate::pool::Pool;
use crate::segment::SIZE;
use crate::streams::codec::{Decode, Encode};

pub mod codec;

pub use crate::error::{Error, ErrorKind, OperationKind, Result};

/// A data source: an external byte producer capability.
pub trait Source {
	/// Reads up to `count` bytes from the source into the buffer, returning the
	/// number of bytes read. Zero signals end-of-stream.
	fn read(&mut self, sink: &mut Buffer<impl Pool>, count: usize) -> Result<usize>;

	/// Reads all bytes from the source into the buffer.
	fn read_all(&mut self, sink: &mut Buffer<impl Pool>) -> Result<usize> {
		self.read(sink, usize::MAX)
	}

	/// Closes the source. All default streams close automatically when dropped.
	/// Closing is idempotent; `close_source` may be called more than once with
	/// no effect.
	fn close_source(&mut self) -> Result { Ok(()) }
}

/// A data sink: an external byte consumer capability.
pub trait Sink {
	/// Writes `count` bytes from the buffer into the sink, returning the number
	/// of bytes written.
	fn write(&mut self, source: &mut Buffer<impl Pool>, count: usize) -> Result<usize>;

	/// Writes all bytes from the buffer into the sink.
	fn write_all(&mut self, source: &mut Buffer<impl Pool>) -> Result<usize> {
		let count = source.count();
		self.write(source, count)
	}

	/// Writes all buffered data to its final target.
	fn flush(&mut self) -> Result { Ok(()) }

	/// Flushes and closes the sink. All default streams close automatically
	/// when dropped. Closing is idempotent.
	fn close_sink(&mut self) -> Result { self.flush() }
}

/// Wraps the source in a [`BufferedSource`].
pub trait SourceExt: Source + Sized {
	fn buffered(self) -> BufferedSource<Self> {
		BufferedSource::new(self)
	}
}

impl<S: Source> SourceExt for S { }

/// Wraps the sink in a [`BufferedSink`].
pub trait SinkExt: Sink + Sized {
	fn buffered(self) -> BufferedSink<Self> {
		BufferedSink::new(self)
	}
}

impl<S: Sink> SinkExt for S { }

/// A stream holding an internal [`Buffer`].
pub trait BufStream {
	type Pool: Pool;

	fn buf(&self) -> &Buffer<Self::Pool>;
	fn buf_mut(&mut self) -> &mut Buffer<Self::Pool>;
}

macro_rules! gen_int_reads {
	($($be_name:ident$($le_name:ident)?->$ty:ident,)+) => {
		$(gen_int_reads! { $be_name$($le_name)?->$ty })+
	};
	($be_name:ident$le_name:ident->$ty:ident) => {
		gen_int_reads! { $be_name->$ty "big-endian " }
		gen_int_reads! { $le_name->$ty "little-endian " }
	};
	($name:ident->$ty:ident$($endian:literal)?) => {
		#[doc = concat!(" Reads one ",$($endian,)?"[`",stringify!($ty),"`] from the source.")]
		fn $name(&mut self) -> Result<$ty> {
			self.require(mem::size_of::<$ty>())?;
			self.buf_mut().$name()
		}
	}
}

/// A buffered data source with typed reads.
pub trait BufSource: BufStream + Source {
	/// Reads up to `byte_count` bytes into the buffer, returning whether the
	/// requested count is available. To return an end-of-stream error instead,
	/// use [`Self::require`].
	fn request(&mut self, byte_count: usize) -> Result<bool>;

	/// Reads at least `byte_count` bytes into the buffer, returning an
	/// end-of-stream error if not successful. To return `false` instead, use
	/// [`Self::request`].
	fn require(&mut self, byte_count: usize) -> Result {
		if self.request(byte_count)? {
			Ok(())
		} else {
			Err(Error::eos(BufRead))
		}
	}

	/// Returns `true` when no bytes remain: the buffer is empty and the
	/// underlying source is exhausted.
	fn exhausted(&mut self) -> Result<bool> {
		Ok(!self.request(1)?)
	}

	/// Reads all bytes from the source into `sink`.
	fn read_all_into(&mut self, sink: &mut impl Sink) -> Result<usize>;

	/// Decodes a value from at most `byte_count` big-endian bytes.
	fn read_into(&mut self, value: &mut impl Decode, byte_count: usize) -> Result<usize> {
		let _ = self.request(byte_count.min(SIZE))?;
		value.decode(self.buf_mut(), byte_count, false)
	}

	/// Decodes a value from at most `byte_count` little-endian bytes.
	fn read_into_le(&mut self, value: &mut impl Decode, byte_count: usize) -> Result<usize> {
		let _ = self.request(byte_count.min(SIZE))?;
		value.decode(self.buf_mut(), byte_count, true)
	}

	gen_int_reads! {
		read_i8 -> i8,
		read_u8 -> u8,
		read_i16 read_i16_le -> i16,
		read_u16 read_u16_le -> u16,
		read_i32 read_i32_le -> i32,
		read_u32 read_u32_le -> u32,
		read_i64 read_i64_le -> i64,
		read_u64 read_u64_le -> u64,
		read_isize read_isize_le -> isize,
		read_usize read_usize_le -> usize,
		read_f32 read_f32_le -> f32,
		read_f64 read_f64_le -> f64,
	}

	/// Reads a fixed-size array from the source.
	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		self.require(N)?;
		self.buf_mut().read_array()
	}

	/// Reads up to `byte_count` bytes into an owned byte string.
	fn read_byte_str(&mut self, byte_count: usize) -> Result<Vec<u8>> {
		let _ = self.request(byte_count)?;
		self.buf_mut().read_byte_str(byte_count)
	}

	/// Removes up to `byte_count` bytes from the source, returning the number
	/// removed.
	fn skip(&mut self, mut byte_count: usize) -> Result<usize> {
		let mut n = 0;
		while byte_count > 0 {
			if self.buf().is_empty() && !self.request(min(byte_count, SIZE))? {
				break
			}
			let skipped = self.buf_mut().skip_at_most(byte_count);
			n += skipped;
			byte_count -= skipped;
		}
		Ok(n)
	}

	/// Reads bytes into a slice, returning the number of bytes read.
	fn read_into_slice(&mut self, mut dst: &mut [u8]) -> Result<usize> {
		let mut n = 0;
		loop {
			let read = self.buf_mut().read_into_slice(dst)?;
			n += read;
			let rest = dst;
			dst = &mut rest[read..];
			if dst.is_empty() || !self.request(1)? {
				break
			}
		}
		Ok(n)
	}

	/// Reads the exact length of bytes into a slice, returning an end-of-stream
	/// error if the slice could not be filled. Bytes are not consumed from the
	/// buffer when end-of-stream is returned.
	fn read_into_slice_exact(&mut self, dst: &mut [u8]) -> Result {
		self.require(dst.len())?;
		self.buf_mut().read_into_slice_exact(dst)
	}

	/// Reads exactly `byte_count` bytes, decoding them into `str` as UTF-8 with
	/// malformed sequences replaced by U+FFFD. Returns the number of bytes read.
	fn read_utf8(&mut self, str: &mut String, byte_count: usize) -> Result<usize> {
		self.require(byte_count)?;
		self.buf_mut().read_utf8(str, byte_count)
	}

	/// Reads all remaining bytes, decoding them into `str` as UTF-8.
	fn read_utf8_to_end(&mut self, str: &mut String) -> Result<usize> {
		while self.request(self.buf().count() + 1)? { }
		self.buf_mut().read_utf8_to_end(str)
	}

	/// Reads UTF-8 text into `str` until a line terminator, returning whether
	/// the terminator was encountered. Consumes the terminator (`\n` or `\r\n`)
	/// without writing it to the string.
	fn read_utf8_line(&mut self, str: &mut String) -> Result<bool> {
		loop {
			let count = self.buf().count();
			if self.buf().index_of(b'\n', 0, count).is_some() {
				return self.buf_mut().read_utf8_line(str)
			}
			if !self.request(count + 1)? {
				self.buf_mut().read_utf8_to_end(str)?;
				return Ok(false)
			}
		}
	}

	/// Reads a line like [`read_utf8_line`], but fails with an end-of-stream
	/// error when no terminator appears within `limit` bytes.
	///
	/// [`read_utf8_line`]: Self::read_utf8_line
	fn read_utf8_line_strict(&mut self, str: &mut String, limit: usize) -> Result {
		loop {
			let count = self.buf().count();
			let search_end = min(limit.saturating_add(1), count);
			if self.buf().index_of(b'\n', 0, search_end).is_some() || count > limit {
				return self.buf_mut().read_utf8_line_strict(str, limit)
			}
			if !self.request(count + 1)? {
				return self.buf_mut().read_utf8_line_strict(str, limit)
			}
		}
	}

	/// Reads one UTF-8 code point, mapping malformed sequences to U+FFFD.
	fn read_utf8_code_point(&mut self) -> Result<u32> {
		self.require(1)?;
		let _ = self.request(4)?;
		self.buf_mut().read_utf8_code_point()
	}

	/// Reads a signed decimal long, such as `-8192`. Fails with a number format
	/// error when the literal overflows an `i64` or no digits are present.
	fn read_decimal_long(&mut self) -> Result<i64> {
		self.require(1)?;
		let mut pos = 0;
		loop {
			if !self.request(pos + 1)? { break }
			let byte = self.buf().get(pos)?;
			let continues = if pos == 0 {
				byte == b'-' || byte.is_ascii_digit()
			} else {
				byte.is_ascii_digit()
			};
			if !continues { break }
			pos += 1;
		}
		self.buf_mut().read_decimal_long()
	}

	/// Reads an unsigned hexadecimal long, such as `ffff`. Fails with a number
	/// format error when the literal overflows a `u64` or no hex digits are
	/// present.
	fn read_hex_long(&mut self) -> Result<u64> {
		self.require(1)?;
		let mut pos = 0;
		loop {
			if !self.request(pos + 1)? { break }
			if !self.buf().get(pos)?.is_ascii_hexdigit() { break }
			pos += 1;
		}
		self.buf_mut().read_hex_long()
	}
}

macro_rules! gen_int_writes {
	($($be_name:ident$($le_name:ident)?->$ty:ident,)+) => {
		$(gen_int_writes! { $be_name$($le_name)?->$ty })+
	};
	($be_name:ident$le_name:ident->$ty:ident) => {
		gen_int_writes! { $be_name->$ty "big-endian " }
		gen_int_writes! { $le_name->$ty "little-endian " }
	};
	($name:ident->$ty:ident$($endian:literal)?) => {
		#[doc = concat!(" Writes one ",$($endian,)?"[`",stringify!($ty),"`] to the sink.")]
		fn $name(&mut self, value: $ty) -> Result {
			self.check_open()?;
			self.buf_mut().$name(value)?;
			self.emit_complete_segments()
		}
	}
}

/// A buffered data sink with typed writes.
pub trait BufSink: BufStream + Sink {
	/// Fails when the sink can take no more writes. The default always can.
	fn check_open(&self) -> Result { Ok(()) }

	/// Forwards full segments to the underlying sink, where one exists. Called
	/// after every typed write; the default keeps everything buffered.
	fn emit_complete_segments(&mut self) -> Result { Ok(()) }

	/// Writes all bytes from `source` into the sink.
	fn write_all_from(&mut self, source: &mut impl Source) -> Result<usize>;

	/// Encodes a value in big-endian byte order.
	fn write_from(&mut self, value: impl Encode) -> Result<usize> {
		self.check_open()?;
		let n = value.encode(self.buf_mut(), false)?;
		self.emit_complete_segments()?;
		Ok(n)
	}

	/// Encodes a value in little-endian byte order.
	fn write_from_le(&mut self, value: impl Encode) -> Result<usize> {
		self.check_open()?;
		let n = value.encode(self.buf_mut(), true)?;
		self.emit_complete_segments()?;
		Ok(n)
	}

	gen_int_writes! {
		write_i8 -> i8,
		write_u8 -> u8,
		write_i16 write_i16_le -> i16,
		write_u16 write_u16_le -> u16,
		write_i32 write_i32_le -> i32,
		write_u32 write_u32_le -> u32,
		write_i64 write_i64_le -> i64,
		write_u64 write_u64_le -> u64,
		write_isize write_isize_le -> isize,
		write_usize write_usize_le -> usize,
		write_f32 write_f32_le -> f32,
		write_f64 write_f64_le -> f64,
	}

	/// Writes a slice of bytes to the sink.
	fn write_from_slice(&mut self, value: &[u8]) -> Result {
		self.check_open()?;
		self.buf_mut().write_from_slice(value)?;
		self.emit_complete_segments()
	}

	/// Writes a string to the sink as UTF-8.
	fn write_utf8(&mut self, value: &str) -> Result {
		self.check_open()?;
		self.buf_mut().write_utf8(value)?;
		self.emit_complete_segments()
	}

	/// Writes one character to the sink as UTF-8.
	fn write_utf8_char(&mut self, value: char) -> Result {
		self.check_open()?;
		self.buf_mut().write_utf8_char(value)?;
		self.emit_complete_segments()
	}

	/// Writes one code point to the sink as UTF-8. Surrogate code points encode
	/// as `?`; code points past U+10FFFF are rejected.
	fn write_utf8_code_point(&mut self, value: u32) -> Result {
		self.check_open()?;
		self.buf_mut().write_utf8_code_point(value)?;
		self.emit_complete_segments()
	}

	/// Writes UTF-16 code units to the sink as UTF-8. Each unpaired surrogate
	/// encodes as one `?` byte.
	fn write_utf16(&mut self, value: &[u16]) -> Result {
		self.check_open()?;
		self.buf_mut().write_utf16(value)?;
		self.emit_complete_segments()
	}
}

// Impls

impl Source for &[u8] {
	fn read(&mut self, sink: &mut Buffer<impl Pool>, mut count: usize) -> Result<usize> {
		count = min(count, self.len());
		sink.write_from_slice(&self[..count])
			.map_err(Error::with_op_buf_read)?;
		*self = &self[count..];
		Ok(count)
	}
}

impl Sink for Vec<u8> {
	fn write(&mut self, source: &mut Buffer<impl Pool>, count: usize) -> Result<usize> {
		let count = min(count, source.count());
		self.reserve(count);
		source.read_segments(count, |data| {
			self.extend_from_slice(data);
			Ok(data.len())
		}).map_err(Error::with_op_buf_write)
	}
}
