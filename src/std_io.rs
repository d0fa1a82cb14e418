// SPDX-License-Identifier: Apache-2.0

//! Bridges between this crate's streams and `std::io`. [`ReaderSource`] and
//! [`WriterSink`] make any std reader or writer usable as a raw source or sink;
//! [`SourceReader`] and [`SinkWriter`] go the other way.

use std::io;
use std::io::{Read, Write};
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::error::OperationKind::BufFlush;
use crate::pool::Pool;
use crate::streams::{BufSink, BufSource, Sink, Source};

/// A [`Source`] reading from a [`Read`] implementation.
pub struct ReaderSource<R: Read>(R);

impl<R: Read> From<R> for ReaderSource<R> {
	fn from(value: R) -> Self { Self(value) }
}

impl<R: Read> ReaderSource<R> {
	pub fn new(reader: R) -> Self { Self(reader) }

	pub fn into_inner(self) -> R { self.0 }
}

impl<R: Read> Source for ReaderSource<R> {
	fn read(&mut self, sink: &mut Buffer<impl Pool>, count: usize) -> Result<usize> {
		let Self(reader) = self;
		sink.write_std(reader, count)
			.map_err(Error::with_op_buf_read)
	}
}

/// A [`Sink`] writing to a [`Write`] implementation.
pub struct WriterSink<W: Write>(W);

impl<W: Write> From<W> for WriterSink<W> {
	fn from(value: W) -> Self { Self(value) }
}

impl<W: Write> WriterSink<W> {
	pub fn new(writer: W) -> Self { Self(writer) }

	pub fn into_inner(self) -> W { self.0 }
}

impl<W: Write> Sink for WriterSink<W> {
	fn write(&mut self, source: &mut Buffer<impl Pool>, count: usize) -> Result<usize> {
		let Self(writer) = self;
		source.read_std(writer, count)
			  .map_err(Error::with_op_buf_write)
	}

	fn flush(&mut self) -> Result {
		Write::flush(&mut self.0)
			.map_err(|err| Error::io(BufFlush, err))
	}
}

/// A wrapper implementing the [`Read`] trait for [`BufSource`].
pub struct SourceReader<S: BufSource>(S);

impl<S: BufSource> From<S> for SourceReader<S> {
	fn from(value: S) -> Self { Self(value) }
}

impl<S: BufSource> SourceReader<S> {
	pub fn new(source: S) -> Self { Self(source) }

	pub fn into_inner(self) -> S { self.0 }
}

impl<S: BufSource> Read for SourceReader<S> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let Self(source) = self;
		source.read_into_slice(buf)
			  .map_err(Error::into_io)
	}
}

/// A wrapper implementing the [`Write`] trait for [`BufSink`].
pub struct SinkWriter<S: BufSink>(S);

impl<S: BufSink> From<S> for SinkWriter<S> {
	fn from(value: S) -> Self { Self(value) }
}

impl<S: BufSink> SinkWriter<S> {
	pub fn new(sink: S) -> Self { Self(sink) }

	pub fn into_inner(self) -> S { self.0 }
}

impl<S: BufSink> Write for SinkWriter<S> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let Self(sink) = self;
		sink.write_from_slice(buf)
			.map_err(Error::into_io)?;
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		self.0
			.flush()
			.map_err(Error::into_io)
	}
}
