// SPDX-License-Identifier: Apache-2.0

use std::error::Error as StdError;
use std::{io, result};
use amplify_derive::Display;

pub type Result<T = ()> = result::Result<T, Error>;

/// The operation an [`Error`] was raised in.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Display)]
pub enum OperationKind {
	#[default]
	#[display("unknown operation")]
	Unknown,
	#[display("read from buffer")]
	BufRead,
	#[display("write to buffer")]
	BufWrite,
	#[display("copy buffer")]
	BufCopy,
	#[display("clear buffer")]
	BufClear,
	#[display("flush buffer")]
	BufFlush,
	#[display("close stream")]
	BufClose,
	#[display("parse number")]
	Parse,
	#[display("{0}")]
	Other(&'static str),
}

/// The kind of failure an [`Error`] describes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Display)]
pub enum ErrorKind {
	#[display("premature end-of-stream")]
	Eos,
	#[display("IO error")]
	Io,
	#[display("invalid argument")]
	InvalidInput,
	#[display("position out of bounds")]
	OutOfBounds,
	#[display("malformed number")]
	NumberFormat,
	#[display("invalid UTF-8")]
	InvalidUtf8,
	#[display("stream closed")]
	Closed,
	#[display("{0}")]
	Other(&'static str),
}

/// The error type for buffer and stream operations.
#[derive(Debug, Display)]
#[display("could not {op}: {kind}")]
pub struct Error {
	pub op: OperationKind,
	pub kind: ErrorKind,
	source: Option<Box<dyn StdError + Send + Sync>>,
}

impl StdError for Error {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.source
			.as_deref()
			.map(|src| src as &(dyn StdError + 'static))
	}
}

impl Error {
	pub fn new(
		op: OperationKind,
		kind: ErrorKind,
		source: Option<Box<dyn StdError + Send + Sync>>
	) -> Self {
		Self { op, kind, source }
	}

	/// Creates a new "end-of-stream" error.
	pub fn eos(op: OperationKind) -> Self { Self::new(op, ErrorKind::Eos, None) }

	/// Creates a new IO error.
	pub fn io(op: OperationKind, error: io::Error) -> Self {
		Self::new(op, ErrorKind::Io, Some(error.into()))
	}

	/// Creates a new "closed" error.
	pub fn closed(op: OperationKind) -> Self {
		Self::new(op, ErrorKind::Closed, None)
	}

	/// Creates a new "invalid argument" error.
	pub fn invalid_input(op: OperationKind, source: impl StdError + Send + Sync + 'static) -> Self {
		Self::new(op, ErrorKind::InvalidInput, Some(Box::new(source)))
	}

	/// Creates a new "out of bounds" error.
	pub fn out_of_bounds(op: OperationKind, source: impl StdError + Send + Sync + 'static) -> Self {
		Self::new(op, ErrorKind::OutOfBounds, Some(Box::new(source)))
	}

	/// Creates a new number format error.
	pub fn number_format(source: impl StdError + Send + Sync + 'static) -> Self {
		Self::new(OperationKind::Parse, ErrorKind::NumberFormat, Some(Box::new(source)))
	}

	/// Creates a new UTF-8 error.
	pub fn invalid_utf8(op: OperationKind, source: impl StdError + Send + Sync + 'static) -> Self {
		Self::new(op, ErrorKind::InvalidUtf8, Some(Box::new(source)))
	}

	/// Replaces the operation kind, keeping the rest.
	pub fn with_operation(mut self, op: OperationKind) -> Self {
		self.op = op;
		self
	}

	/// Convenience shorthand for `with_operation(OperationKind::BufRead)`.
	pub fn with_op_buf_read(self) -> Self { self.with_operation(OperationKind::BufRead) }

	/// Convenience shorthand for `with_operation(OperationKind::BufWrite)`.
	pub fn with_op_buf_write(self) -> Self { self.with_operation(OperationKind::BufWrite) }

	/// Convenience shorthand for `with_operation(OperationKind::BufCopy)`.
	pub fn with_op_buf_copy(self) -> Self { self.with_operation(OperationKind::BufCopy) }

	/// Convenience shorthand for `with_operation(OperationKind::BufFlush)`.
	pub fn with_op_buf_flush(self) -> Self { self.with_operation(OperationKind::BufFlush) }

	/// Convenience shorthand for `with_operation(OperationKind::BufClose)`.
	pub fn with_op_buf_close(self) -> Self { self.with_operation(OperationKind::BufClose) }

	/// Returns the source downcast into an IO error, if possible.
	pub fn io_source(&self) -> Option<&io::Error> {
		self.source()?.downcast_ref()
	}

	pub(crate) fn into_io(self) -> io::Error {
		match self.kind {
			ErrorKind::Eos => io::Error::new(io::ErrorKind::UnexpectedEof, self),
			ErrorKind::Io => {
				let Some(src) = self.io_source() else {
					return io::Error::other(self)
				};
				io::Error::new(src.kind(), self)
			}
			_ => io::Error::other(self)
		}
	}
}

impl From<io::Error> for Error {
	fn from(value: io::Error) -> Self {
		if let io::ErrorKind::UnexpectedEof = value.kind() {
			Self::eos(OperationKind::Unknown)
		} else {
			Self::io(OperationKind::Unknown, value)
		}
	}
}

/// A message-only error used as the source of argument failures.
#[derive(Copy, Clone, Debug, thiserror::Error)]
#[error("{0}")]
pub struct Message(pub &'static str);

/// The position error raised by [`Buffer::get`] and friends.
///
/// [`Buffer::get`]: crate::Buffer::get
#[derive(Copy, Clone, Debug, thiserror::Error)]
#[error("position {pos} out of bounds in buffer of {count} bytes")]
pub struct PositionError {
	pub pos: usize,
	pub count: usize,
}

/// The error raised when decimal or hexadecimal parsing fails.
#[derive(Clone, Debug, thiserror::Error)]
pub enum NumberFormatError {
	#[error("number {literal:?} too large for a 64-bit integer")]
	Overflow {
		literal: String
	},
	#[error("expected a digit, found {found:?}")]
	NoDigits {
		found: Option<u8>
	},
}

/// A UTF-8 validation error offset into a larger read, raised by strict decoding.
#[derive(Copy, Clone, Debug)]
pub struct Utf8Error {
	inner: simdutf8::compat::Utf8Error,
	offset: usize,
}

impl Utf8Error {
	pub(crate) fn new(inner: simdutf8::compat::Utf8Error, offset: usize) -> Self {
		Self { inner, offset }
	}

	/// Returns the number of valid bytes before the error.
	pub fn valid_up_to(&self) -> usize {
		self.offset + self.inner.valid_up_to()
	}

	/// Returns the length of the invalid sequence, or `None` if the input was
	/// truncated.
	pub fn error_len(&self) -> Option<usize> {
		self.inner.error_len()
	}
}

impl std::fmt::Display for Utf8Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if let Some(error_len) = self.error_len() {
			write!(
				f,
				"invalid utf-8 sequence of {error_len} bytes from index {}",
				self.valid_up_to()
			)
		} else {
			write!(
				f,
				"incomplete utf-8 byte sequence from index {}",
				self.valid_up_to()
			)
		}
	}
}

impl StdError for Utf8Error {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		Some(&self.inner)
	}
}
