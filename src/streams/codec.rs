// SPDX-License-Identifier: Apache-2.0

//! Provides Encode and Decode traits for arbitrary types to interact with
//! streams. Values are written with [`BufSink::write_from`] and read back with
//! [`BufSource::read_into`]; the `_le` variants switch to little-endian byte
//! order for the types where order matters.
//!
//! [`BufSink::write_from`]: super::BufSink::write_from
//! [`BufSource::read_into`]: super::BufSource::read_into

use std::cmp::min;
use std::mem;
use crate::buffer::Buffer;
use crate::error::Result;
use crate::pool::Pool;

/// Defines encoding behavior.
pub trait Encode {
	/// Encodes into `buf`, in little-endian byte order if `le` is `true`.
	/// Returns the number of bytes written.
	fn encode(self, buf: &mut Buffer<impl Pool>, le: bool) -> Result<usize>;
}

/// Defines decoding behavior.
pub trait Decode {
	/// Decodes at most `byte_count` bytes from `buf`, in little-endian byte
	/// order if `le` is `true`. Returns the number of bytes read.
	fn decode(&mut self, buf: &mut Buffer<impl Pool>, byte_count: usize, le: bool) -> Result<usize>;
}

// Bytes

impl Encode for &[u8] {
	fn encode(self, buf: &mut Buffer<impl Pool>, _: bool) -> Result<usize> {
		buf.write_from_slice(self)?;
		Ok(self.len())
	}
}

impl Decode for Vec<u8> {
	fn decode(&mut self, buf: &mut Buffer<impl Pool>, byte_count: usize, _: bool) -> Result<usize> {
		let len = min(byte_count, buf.count());
		let mut read = buf.read_byte_str(len)?;
		self.append(&mut read);
		Ok(len)
	}
}

// Utf8

impl Encode for &str {
	fn encode(self, buf: &mut Buffer<impl Pool>, _: bool) -> Result<usize> {
		buf.write_utf8(self)?;
		Ok(self.len())
	}
}

impl Encode for String {
	fn encode(self, buf: &mut Buffer<impl Pool>, _: bool) -> Result<usize> {
		buf.write_utf8(&self)?;
		Ok(self.len())
	}
}

impl Encode for char {
	fn encode(self, buf: &mut Buffer<impl Pool>, _: bool) -> Result<usize> {
		buf.write_utf8_char(self)?;
		Ok(self.len_utf8())
	}
}

impl Decode for String {
	fn decode(&mut self, buf: &mut Buffer<impl Pool>, byte_count: usize, _: bool) -> Result<usize> {
		let len = min(byte_count, buf.count());
		buf.read_utf8(self, len)
	}
}

// Numbers

macro_rules! gen_num_codec {
	($($wfn:ident $rfn:ident $($wfn_le:ident $rfn_le:ident)? -> $ty:ident,)+) => {
		$(gen_num_codec! { $wfn $rfn $($wfn_le $rfn_le)? $ty })+
	};
	($wfn:ident $rfn:ident $wfn_le:ident $rfn_le:ident $ty:ident) => {
		impl Encode for $ty {
			fn encode(self, buf: &mut Buffer<impl Pool>, le: bool) -> Result<usize> {
				if le {
					buf.$wfn_le(self)?;
				} else {
					buf.$wfn(self)?;
				}
				Ok(mem::size_of::<$ty>())
			}
		}
		impl Decode for $ty {
			fn decode(&mut self, buf: &mut Buffer<impl Pool>, byte_count: usize, le: bool) -> Result<usize> {
				if byte_count < mem::size_of::<$ty>() {
					return Ok(0)
				}

				*self = if le {
					buf.$rfn_le()?
				} else {
					buf.$rfn()?
				};
				Ok(mem::size_of::<$ty>())
			}
		}
	};
	($wfn:ident $rfn:ident $ty:ident) => {
		impl Encode for $ty {
			fn encode(self, buf: &mut Buffer<impl Pool>, _: bool) -> Result<usize> {
				buf.$wfn(self)?;
				Ok(1)
			}
		}
		impl Decode for $ty {
			fn decode(&mut self, buf: &mut Buffer<impl Pool>, byte_count: usize, _: bool) -> Result<usize> {
				if byte_count == 0 { return Ok(0) }

				*self = buf.$rfn()?;
				Ok(1)
			}
		}
	};
}

gen_num_codec! {
	write_i8 read_i8 -> i8,
	write_u8 read_u8 -> u8,
	write_i16 read_i16 write_i16_le read_i16_le -> i16,
	write_u16 read_u16 write_u16_le read_u16_le -> u16,
	write_i32 read_i32 write_i32_le read_i32_le -> i32,
	write_u32 read_u32 write_u32_le read_u32_le -> u32,
	write_i64 read_i64 write_i64_le read_i64_le -> i64,
	write_u64 read_u64 write_u64_le read_u64_le -> u64,
	write_isize read_isize write_isize_le read_isize_le -> isize,
	write_usize read_usize write_usize_le read_usize_le -> usize,
	write_f32 read_f32 write_f32_le read_f32_le -> f32,
	write_f64 read_f64 write_f64_le read_f64_le -> f64,
}
