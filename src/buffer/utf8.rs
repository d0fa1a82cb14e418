// SPDX-License-Identifier: Apache-2.0

use arrayvec::ArrayVec;
use simdutf8::compat::from_utf8;
use crate::Buffer;
use crate::error::{Error, Message, Result, Utf8Error};
use crate::error::OperationKind::{BufRead, BufWrite};
use crate::pool::Pool;
use crate::util::utf8::{
	decode_code_point, encode_code_point, is_surrogate, push_code_point, MAX_CODE_POINT,
};

impl<P: Pool> Buffer<P> {
	/// Writes a string at the tail as UTF-8. Rust strings are already UTF-8, so
	/// this is a plain byte copy; ASCII needs no transcoding at all.
	pub fn write_utf8(&mut self, value: &str) -> Result {
		self.write_from_slice(value.as_bytes())
	}

	/// Writes one character at the tail as UTF-8.
	pub fn write_utf8_char(&mut self, value: char) -> Result {
		let mut bytes = [0; 4];
		self.write_from_slice(value.encode_utf8(&mut bytes).as_bytes())
	}

	/// Writes one code point at the tail as UTF-8. Surrogate code points encode
	/// as a single `?` byte; code points past U+10FFFF fail with an
	/// invalid-argument error.
	pub fn write_utf8_code_point(&mut self, value: u32) -> Result {
		if value > MAX_CODE_POINT {
			return Err(Error::invalid_input(
				BufWrite,
				Message("code point exceeds U+10FFFF")
			))
		}
		if is_surrogate(value) {
			return self.write_u8(b'?')
		}
		self.write_from_slice(&encode_code_point(value))
	}

	/// Writes UTF-16 code units at the tail as UTF-8 per RFC 3629. Each
	/// unpaired surrogate encodes as one `?` byte.
	pub fn write_utf16(&mut self, value: &[u16]) -> Result {
		for decoded in char::decode_utf16(value.iter().copied()) {
			match decoded {
				Ok(c) => self.write_utf8_char(c)?,
				Err(_) => self.write_u8(b'?')?,
			}
		}
		Ok(())
	}

	/// Reads exactly `byte_count` bytes from the head, decoding them into `str`
	/// as UTF-8. Each malformed sequence decodes to U+FFFD. Returns the number
	/// of bytes read.
	pub fn read_utf8(&mut self, str: &mut String, byte_count: usize) -> Result<usize> {
		self.require(byte_count)?;
		let bytes = self.read_byte_str(byte_count)?;
		push_utf8_lossy(str, &bytes);
		Ok(byte_count)
	}

	/// Reads all bytes from the head, decoding them into `str` as UTF-8 with
	/// U+FFFD replacement.
	pub fn read_utf8_to_end(&mut self, str: &mut String) -> Result<usize> {
		let count = self.count();
		self.read_utf8(str, count)
	}

	/// Reads exactly `byte_count` bytes, requiring them to be valid UTF-8.
	/// Fails without consuming anything when the bytes are malformed.
	pub fn read_utf8_strict(&mut self, str: &mut String, byte_count: usize) -> Result<usize> {
		self.require(byte_count)?;

		let mut bytes = Vec::with_capacity(byte_count);
		for seg in self.segments.iter() {
			if bytes.len() == byte_count { break }
			let take = seg.len().min(byte_count - bytes.len());
			bytes.extend_from_slice(&seg.data()[..take]);
		}
		debug_assert_eq!(bytes.len(), byte_count);

		let text = from_utf8(&bytes)
			.map_err(|err| Error::invalid_utf8(BufRead, Utf8Error::new(err, 0)))?;
		str.push_str(text);
		self.skip(byte_count)?;
		Ok(byte_count)
	}

	/// Reads one code point from the head. Malformed sequences decode to U+FFFD
	/// with the advance rules of [`decode_code_point`]; a sequence truncated by
	/// the end of the buffer decodes to U+FFFD and advances one byte.
	pub fn read_utf8_code_point(&mut self) -> Result<u32> {
		self.require(1)?;

		let mut head = ArrayVec::<u8, 4>::new();
		for pos in 0..self.count().min(4) {
			head.push(self.get(pos)?);
		}

		let (point, len) = decode_code_point(&head);
		self.skip(len)?;
		Ok(point)
	}

	/// Reads UTF-8 text into `str` until a line terminator, returning whether
	/// one was found. The terminator (`\n`, or `\r\n` as a pair) is consumed
	/// but not written to the string. Without a terminator, reads to the end.
	pub fn read_utf8_line(&mut self, str: &mut String) -> Result<bool> {
		if let Some(mut line_term) = self.index_of(b'\n', 0, self.count()) {
			let mut term_len = 1;

			// CRLF
			if line_term > 0 && self.get(line_term - 1)? == b'\r' {
				line_term -= 1;
				term_len += 1;
			}

			self.read_utf8(str, line_term)?;
			self.skip(term_len)?;
			Ok(true)
		} else {
			self.read_utf8_to_end(str)?;
			Ok(false)
		}
	}

	/// Reads a line like [`read_utf8_line`], failing with an end-of-stream
	/// error when no line terminator appears within `limit` bytes.
	///
	/// [`read_utf8_line`]: Self::read_utf8_line
	pub fn read_utf8_line_strict(&mut self, str: &mut String, limit: usize) -> Result {
		let search_end = limit.saturating_add(1).min(self.count());
		match self.index_of(b'\n', 0, search_end) {
			Some(mut line_term) => {
				let mut term_len = 1;
				if line_term > 0 && self.get(line_term - 1)? == b'\r' {
					line_term -= 1;
					term_len += 1;
				}
				self.read_utf8(str, line_term)?;
				self.skip(term_len)?;
				Ok(())
			}
			None => Err(Error::eos(BufRead))
		}
	}
}

/// Decodes `bytes` onto `text`, replacing malformed sequences with U+FFFD. The
/// valid case is a single validated copy; the walk only runs on bad input.
fn push_utf8_lossy(text: &mut String, mut bytes: &[u8]) {
	match from_utf8(bytes) {
		Ok(valid) => text.push_str(valid),
		Err(_) => while !bytes.is_empty() {
			let (point, len) = decode_code_point(bytes);
			push_code_point(text, point);
			bytes = &bytes[len..];
		}
	}
}
