// SPDX-License-Identifier: Apache-2.0

use std::mem::ManuallyDrop;
use std::ptr;
use crate::buffer::Buffer;
use crate::error::{Error, ErrorKind, Result};
use crate::error::OperationKind::{BufFlush, BufRead, BufWrite};
use crate::pool::Pool;
use crate::segment::SIZE;
use crate::streams::{BufSink, BufSource, BufStream, Sink, Source};

/// A [`Source`] made efficient to consume byte-by-byte: bytes are pulled from
/// the underlying source in whole-segment units into an internal buffer, and
/// typed reads are served from there.
pub struct BufferedSource<S: Source> {
	buffer: Buffer,
	source: S,
	closed: bool,
}

impl<S: Source> BufferedSource<S> {
	pub(crate) fn new(source: S) -> Self {
		Self {
			buffer: Buffer::default(),
			source,
			closed: false,
		}
	}

	/// Returns a look-ahead source reading the upcoming bytes without consuming
	/// them. The peek serves from shared snapshots of the internal buffer,
	/// pulling further data through this source on demand.
	pub fn peek(&mut self) -> Peek<'_, S> {
		Peek {
			parent: self,
			buffer: Buffer::default(),
			offset: 0,
		}
	}

	/// Serves `count` bytes into `sink` from the internal buffer, pulling one
	/// segment-sized chunk from the underlying source first when the buffer is
	/// empty. Returns the number of bytes moved; zero signals end-of-stream.
	pub fn read_at_most_to(&mut self, sink: &mut Buffer<impl Pool>, count: usize) -> Result<usize> {
		if self.closed { return Err(Error::closed(BufRead)) }

		if self.buffer.is_empty() && !self.fill_buf(SIZE)? {
			return Ok(0)
		}
		let count = count.min(self.buffer.count());
		self.buffer.read(sink, count)
	}

	/// Unwraps the underlying source, discarding buffered bytes without closing.
	pub fn into_inner(self) -> S {
		let this = ManuallyDrop::new(self);
		// The fields are read out exactly once each; the wrapper itself is
		// forgotten, so nothing double-drops.
		unsafe {
			drop(ptr::read(&this.buffer));
			ptr::read(&this.source)
		}
	}

	/// Fills the buffer, rounding the pull up to the nearest segment size.
	fn fill_buf(&mut self, byte_count: usize) -> Result<bool> {
		let count = self.buffer.count();
		let target = count.saturating_add(byte_count);
		let chunks = target / SIZE + usize::from(target % SIZE > 0);
		let byte_count = chunks.saturating_mul(SIZE) - count;

		match self.source.read(&mut self.buffer, byte_count) {
			Ok(read) => Ok(read > 0),
			Err(error) if error.kind == ErrorKind::Eos => Ok(false),
			Err(error) => Err(error.with_op_buf_read()),
		}
	}
}

impl<S: Source> Source for BufferedSource<S> {
	fn read(&mut self, sink: &mut Buffer<impl Pool>, count: usize) -> Result<usize> {
		if self.closed { return Err(Error::closed(BufRead)) }

		let _ = self.request(count)?;
		let count = count.min(self.buffer.count());
		self.buffer.read(sink, count)
	}

	fn close_source(&mut self) -> Result {
		if self.closed { return Ok(()) }

		self.closed = true;
		self.buffer.clear();
		self.source.close_source()
	}
}

impl<S: Source> BufStream for BufferedSource<S> {
	type Pool = crate::pool::DefaultPool;

	fn buf(&self) -> &Buffer { &self.buffer }
	fn buf_mut(&mut self) -> &mut Buffer { &mut self.buffer }
}

impl<S: Source> BufSource for BufferedSource<S> {
	fn request(&mut self, byte_count: usize) -> Result<bool> {
		if self.closed { return Err(Error::closed(BufRead)) }

		while !self.buffer.request(byte_count) {
			let missing = byte_count - self.buffer.count();
			if !self.fill_buf(missing)? {
				return Ok(false)
			}
		}
		Ok(true)
	}

	fn read_all_into(&mut self, sink: &mut impl Sink) -> Result<usize> {
		if self.closed { return Err(Error::closed(BufRead)) }

		let mut n = 0;
		loop {
			n += sink.write_all(&mut self.buffer)
				.map_err(Error::with_op_buf_read)?;
			if !self.fill_buf(SIZE)? { break }
		}
		Ok(n)
	}
}

impl<S: Source> Drop for BufferedSource<S> {
	fn drop(&mut self) {
		let _ = self.close_source();
	}
}

/// A look-ahead view over a [`BufferedSource`], created with
/// [`BufferedSource::peek`]. Reading from the peek never consumes bytes from
/// the parent; its data comes from shared snapshots of the parent's buffer.
pub struct Peek<'a, S: Source> {
	parent: &'a mut BufferedSource<S>,
	buffer: Buffer,
	/// Bytes of the parent buffer already snapshotted into this peek.
	offset: usize,
}

impl<S: Source> Source for Peek<'_, S> {
	fn read(&mut self, sink: &mut Buffer<impl Pool>, count: usize) -> Result<usize> {
		let _ = self.request(count)?;
		let count = count.min(self.buffer.count());
		self.buffer.read(sink, count)
	}
}

impl<S: Source> BufStream for Peek<'_, S> {
	type Pool = crate::pool::DefaultPool;

	fn buf(&self) -> &Buffer { &self.buffer }
	fn buf_mut(&mut self) -> &mut Buffer { &mut self.buffer }
}

impl<S: Source> BufSource for Peek<'_, S> {
	fn request(&mut self, byte_count: usize) -> Result<bool> {
		while !self.buffer.request(byte_count) {
			let needed = self.offset.saturating_add(byte_count - self.buffer.count());
			let available = self.parent.request(needed)?;

			// Snapshot whatever the parent now holds past our offset.
			let parent_count = self.parent.buffer.count();
			if parent_count > self.offset {
				self.parent.buffer
					.copy_to(&mut self.buffer, self.offset, parent_count - self.offset)
					.map_err(Error::with_op_buf_copy)?;
				self.offset = parent_count;
			}

			if !available && !self.buffer.request(byte_count) {
				return Ok(false)
			}
		}
		Ok(true)
	}

	fn read_all_into(&mut self, sink: &mut impl Sink) -> Result<usize> {
		let mut n = 0;
		while self.request(SIZE)? || !self.buffer.is_empty() {
			n += sink.write_all(&mut self.buffer)
				.map_err(Error::with_op_buf_read)?;
		}
		Ok(n)
	}
}

/// A [`Sink`] made efficient to produce byte-by-byte: typed writes stage into
/// an internal buffer, and completed segments are forwarded to the underlying
/// sink in whole-segment batches.
pub struct BufferedSink<S: Sink> {
	buffer: Buffer,
	sink: S,
	closed: bool,
}

impl<S: Sink> BufferedSink<S> {
	pub(crate) fn new(sink: S) -> Self {
		Self {
			buffer: Buffer::default(),
			sink,
			closed: false,
		}
	}

	/// Forwards all buffered bytes to the underlying sink without flushing it.
	pub fn emit(&mut self) -> Result {
		if self.closed { return Err(Error::closed(BufFlush)) }

		if !self.buffer.is_empty() {
			self.sink
				.write_all(&mut self.buffer)
				.map_err(Error::with_op_buf_flush)?;
		}
		Ok(())
	}

	/// Unwraps the underlying sink, discarding buffered bytes without closing.
	/// Call [`emit`] or [`flush`] first to keep them.
	///
	/// [`emit`]: Self::emit
	/// [`flush`]: Sink::flush
	pub fn into_inner(self) -> S {
		let this = ManuallyDrop::new(self);
		// The fields are read out exactly once each; the wrapper itself is
		// forgotten, so nothing double-drops.
		unsafe {
			drop(ptr::read(&this.buffer));
			ptr::read(&this.sink)
		}
	}
}

impl<S: Sink> Sink for BufferedSink<S> {
	fn write(&mut self, source: &mut Buffer<impl Pool>, count: usize) -> Result<usize> {
		if self.closed { return Err(Error::closed(BufWrite)) }

		let count = self.buffer.write(source, count)?;
		self.emit_complete_segments()?;
		Ok(count)
	}

	/// Forwards all buffered bytes and flushes the underlying sink.
	fn flush(&mut self) -> Result {
		self.emit()?;
		self.sink
			.flush()
			.map_err(Error::with_op_buf_flush)
	}

	/// Closes the sink: buffered bytes are emitted, then the underlying sink is
	/// closed. When both steps fail, the emit failure surfaces and the close
	/// failure is suppressed.
	fn close_sink(&mut self) -> Result {
		if self.closed { return Ok(()) }

		self.closed = true;
		let emit = if self.buffer.is_empty() {
			Ok(0)
		} else {
			self.sink
				.write_all(&mut self.buffer)
				.map_err(Error::with_op_buf_close)
		};
		let close = self.sink.close_sink();
		self.buffer.clear();
		emit?;
		close
	}
}

impl<S: Sink> BufStream for BufferedSink<S> {
	type Pool = crate::pool::DefaultPool;

	fn buf(&self) -> &Buffer { &self.buffer }
	fn buf_mut(&mut self) -> &mut Buffer { &mut self.buffer }
}

impl<S: Sink> BufSink for BufferedSink<S> {
	fn check_open(&self) -> Result {
		if self.closed {
			Err(Error::closed(BufWrite))
		} else {
			Ok(())
		}
	}

	/// Forwards every byte not sitting in a still-writable tail segment. The
	/// tail might yet take more bytes; flushing it early would force the
	/// underlying sink into short writes.
	fn emit_complete_segments(&mut self) -> Result {
		let count = self.buffer.complete_byte_count();
		if count > 0 {
			self.sink
				.write(&mut self.buffer, count)
				.map_err(Error::with_op_buf_flush)?;
		}
		Ok(())
	}

	fn write_all_from(&mut self, source: &mut impl Source) -> Result<usize> {
		self.check_open()?;

		let mut n = 0;
		loop {
			let read = source
				.read(&mut self.buffer, SIZE)
				.map_err(Error::with_op_buf_write)?;
			if read == 0 { break }
			n += read;
			self.emit_complete_segments()?;
		}
		Ok(n)
	}
}

impl<S: Sink> Drop for BufferedSink<S> {
	fn drop(&mut self) {
		let _ = self.close_sink();
	}
}
