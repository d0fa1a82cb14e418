// SPDX-License-Identifier: Apache-2.0

use std::io::{Read, Seek, SeekFrom, Write};
use pretty_assertions::assert_eq;
use segio::{Buffer, ReaderSource, SinkWriter, SourceReader, WriterSink};
use segio::streams::{BufSink, BufSource, Result, Sink, SinkExt, SourceExt};

#[test]
fn file_round_trip() -> Result {
	let mut file = tempfile::tempfile().map_err(segio::Error::from)?;
	file.write_all(b"written through std, read through a source")
		.map_err(segio::Error::from)?;
	file.seek(SeekFrom::Start(0)).map_err(segio::Error::from)?;

	let mut source = ReaderSource::new(file).buffered();
	let mut text = String::new();
	source.read_utf8_to_end(&mut text)?;
	assert_eq!(text, "written through std, read through a source");
	Ok(())
}

#[test]
fn writer_sink_forwards_bytes() -> Result {
	let mut sink = WriterSink::new(Vec::new()).buffered();
	sink.write_utf8("line one\n")?;
	sink.write_u32(0xCAFEBABE)?;
	sink.flush()?;

	let vec = sink.into_inner().into_inner();
	assert_eq!(&vec[..9], b"line one\n");
	assert_eq!(&vec[9..], [0xCA, 0xFE, 0xBA, 0xBE]);
	Ok(())
}

#[test]
fn source_reader_bridges_to_std() -> Result {
	let data = b"bridged back into std::io";
	let mut reader = SourceReader::new((&data[..]).buffered());

	let mut read = Vec::new();
	reader.read_to_end(&mut read).map_err(segio::Error::from)?;
	assert_eq!(read, data);
	Ok(())
}

#[test]
fn sink_writer_bridges_to_std() -> Result {
	let mut writer: SinkWriter<Buffer> = SinkWriter::new(Buffer::default());
	writer.write_all(b"std writes, buffer receives").map_err(segio::Error::from)?;
	writer.flush().map_err(segio::Error::from)?;

	let mut buffer = writer.into_inner();
	assert_eq!(buffer.read_byte_str(buffer.count())?, b"std writes, buffer receives");
	Ok(())
}

#[test]
fn empty_source_reads_zero() {
	let mut reader: SourceReader<Buffer> = SourceReader::new(Buffer::default());
	let mut byte = [0u8; 1];
	// An empty source reads zero bytes rather than failing.
	assert_eq!(reader.read(&mut byte).unwrap(), 0);
}

#[test]
fn file_copy_through_buffers() -> Result {
	let mut input = tempfile::tempfile().map_err(segio::Error::from)?;
	let payload: Vec<u8> = (0..100_000u32).map(|n| n as u8).collect();
	input.write_all(&payload).map_err(segio::Error::from)?;
	input.seek(SeekFrom::Start(0)).map_err(segio::Error::from)?;

	let mut source = ReaderSource::new(input).buffered();
	let mut sink = WriterSink::new(Vec::new()).buffered();
	let copied = sink.write_all_from(&mut source)?;
	assert_eq!(copied, payload.len());
	sink.flush()?;

	assert_eq!(sink.into_inner().into_inner(), payload);
	Ok(())
}
