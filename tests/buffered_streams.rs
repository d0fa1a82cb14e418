// SPDX-License-Identifier: Apache-2.0

use pretty_assertions::assert_eq;
use segio::{Buffer, ErrorKind, SIZE};
use segio::pool::Pool;
use segio::streams::{
	BufSink, BufSource, BufStream, Error, OperationKind, Result, Sink, SinkExt, Source,
	SourceExt,
};

#[test]
fn typed_reads_from_slice_source() -> Result {
	let data = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, b'h', b'i'];
	let mut source = (&data[..]).buffered();

	assert_eq!(source.read_u16()?, 0x1122);
	assert_eq!(source.read_u32_le()?, 0x66554433);
	let mut text = String::new();
	source.read_utf8(&mut text, 2)?;
	assert_eq!(text, "hi");
	assert!(source.exhausted()?);
	Ok(())
}

#[test]
fn request_pulls_whole_segments() -> Result {
	let data = vec![0xAB; SIZE * 2 + 10];
	let mut source = (&data[..]).buffered();

	// A one-byte request still fills a whole segment from the raw source.
	assert!(source.request(1)?);
	assert_eq!(source.buf().count(), SIZE);

	assert!(source.request(SIZE + 1)?);
	assert_eq!(source.buf().count(), SIZE * 2);

	assert!(!source.request(SIZE * 3)?);
	assert_eq!(source.skip(SIZE * 3)?, SIZE * 2 + 10);
	assert!(source.exhausted()?);
	Ok(())
}

#[test]
fn require_fails_at_end() {
	let mut source = (&b"ab"[..]).buffered();
	assert!(source.require(2).is_ok());
	let error = source.require(3).unwrap_err();
	assert_eq!(error.kind, ErrorKind::Eos);
}

#[test]
fn read_at_most_to_serves_chunks() -> Result {
	let data = vec![0x42; SIZE + 100];
	let mut source = (&data[..]).buffered();
	let mut sink: Buffer = Buffer::default();

	// Empty buffer: one segment is pulled, then served.
	assert_eq!(source.read_at_most_to(&mut sink, SIZE * 4)?, SIZE);
	assert_eq!(source.read_at_most_to(&mut sink, SIZE * 4)?, 100);
	assert_eq!(source.read_at_most_to(&mut sink, SIZE * 4)?, 0);
	assert_eq!(sink.count(), SIZE + 100);
	Ok(())
}

#[test]
fn peek_does_not_consume() -> Result {
	let data = b"peekaboo";
	let mut source = (&data[..]).buffered();

	{
		let mut peek = source.peek();
		assert_eq!(peek.read_array::<4>()?, *b"peek");
		assert_eq!(peek.read_array::<4>()?, *b"aboo");
		assert!(peek.exhausted()?);
	}

	// The parent still sees everything.
	assert_eq!(source.read_array::<8>()?, *b"peekaboo");
	assert!(source.exhausted()?);
	Ok(())
}

#[test]
fn peek_pulls_ahead_of_parent_buffer() -> Result {
	let data = vec![0x77; SIZE * 3];
	let mut source = (&data[..]).buffered();
	source.require(1)?;

	let mut peek = source.peek();
	let mut sink: Buffer = Buffer::default();
	// Looking ahead past the buffered segment forces pulls through the parent.
	let mut remaining = SIZE * 3;
	while remaining > 0 {
		let read = peek.read(&mut sink, remaining)?;
		assert!(read > 0, "peek should reach the full stream");
		remaining -= read;
	}
	drop(peek);

	assert_eq!(sink.count(), SIZE * 3);
	assert_eq!(source.skip(usize::MAX)?, SIZE * 3);
	Ok(())
}

#[test]
fn closed_source_rejects_reads() -> Result {
	let mut source = (&b"data"[..]).buffered();
	source.close_source()?;
	assert_eq!(source.read_u8().unwrap_err().kind, ErrorKind::Closed);

	// Closing again is a no-op.
	source.close_source()?;
	Ok(())
}

#[test]
fn sink_batches_whole_segments() -> Result {
	let mut sink = Vec::new().buffered();

	// A partial tail stays buffered; typed writes alone don't reach the raw
	// sink until a full segment completes.
	sink.write_from_slice(&[1u8; 100])?;
	assert_eq!(sink.buf().count(), 100);

	sink.write_from_slice(&vec![2u8; SIZE])?;
	assert!(sink.buf().count() < SIZE + 100);

	sink.flush()?;
	assert_eq!(sink.buf().count(), 0);
	let vec = sink.into_inner();
	assert_eq!(vec.len(), SIZE + 100);
	Ok(())
}

#[test]
fn sink_emit_forwards_everything() -> Result {
	let mut sink = Vec::new().buffered();
	sink.write_utf8("abc")?;
	sink.emit()?;
	assert!(sink.buf().is_empty());
	assert_eq!(sink.into_inner(), b"abc");
	Ok(())
}

#[test]
fn closed_sink_rejects_writes() -> Result {
	let mut sink = Vec::new().buffered();
	sink.write_u8(1)?;
	sink.close_sink()?;
	assert_eq!(sink.write_u8(2).unwrap_err().kind, ErrorKind::Closed);
	assert_eq!(sink.flush().unwrap_err().kind, ErrorKind::Closed);
	Ok(())
}

/// A raw sink that fails every write, recording whether it was closed.
struct FailingSink {
	closed: bool,
}

impl Sink for FailingSink {
	fn write(&mut self, _source: &mut Buffer<impl Pool>, _count: usize) -> Result<usize> {
		Err(Error::io(
			OperationKind::BufWrite,
			std::io::Error::other("raw write failed")
		))
	}

	fn close_sink(&mut self) -> Result {
		self.closed = true;
		Ok(())
	}
}

#[test]
fn close_still_closes_raw_after_failed_emit() {
	let mut sink = FailingSink { closed: false }.buffered();
	sink.write_u8(0x5A).unwrap();

	let error = sink.close_sink().unwrap_err();
	assert_eq!(error.kind, ErrorKind::Io);

	let raw = sink.into_inner();
	assert!(raw.closed, "the raw sink must be closed even when the emit fails");
}

#[test]
fn write_all_from_streams_through() -> Result {
	let data = vec![0x3C; SIZE * 2 + 17];
	let mut source = &data[..];
	let mut sink = Vec::new().buffered();

	assert_eq!(sink.write_all_from(&mut source)?, SIZE * 2 + 17);
	sink.flush()?;
	assert_eq!(sink.into_inner().len(), SIZE * 2 + 17);
	Ok(())
}

#[test]
fn read_all_into_drains_source() -> Result {
	let data = vec![0x9D; SIZE + 5];
	let mut source = (&data[..]).buffered();
	let mut collected = Vec::new();

	assert_eq!(source.read_all_into(&mut collected)?, SIZE + 5);
	assert_eq!(collected, data);
	Ok(())
}

#[test]
fn buffered_line_reads() -> Result {
	let mut source = (&b"alpha\nbeta\r\ngamma"[..]).buffered();
	let mut line = String::new();

	assert!(source.read_utf8_line(&mut line)?);
	assert_eq!(line, "alpha");
	line.clear();
	assert!(source.read_utf8_line(&mut line)?);
	assert_eq!(line, "beta");
	line.clear();
	assert!(!source.read_utf8_line(&mut line)?);
	assert_eq!(line, "gamma");
	Ok(())
}

#[test]
fn buffered_decimal_read() -> Result {
	let mut source = (&b"-12345 rest"[..]).buffered();
	assert_eq!(source.read_decimal_long()?, -12345);
	assert_eq!(source.read_u8()?, b' ');
	Ok(())
}
