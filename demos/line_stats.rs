// SPDX-License-Identifier: Apache-2.0

//! Builds a small metrics log in memory, then streams it back out line by line,
//! parsing the sample value on each line and folding it into a running summary.
//! The summary is staged through a buffered sink and printed at the end.

use segio::Buffer;
use segio::streams::{BufSink, BufSource, Result, SinkExt, SourceExt};

fn main() -> Result {
	// Stage a log of `name value` lines in a plain buffer.
	let mut log: Buffer = Buffer::default();
	for n in 0..10_000i64 {
		log.write_utf8("sample ")?;
		log.write_utf8(&(n * n % 7919).to_string())?;
		log.write_utf8("\n")?;
	}
	println!("staged {}", log);

	// Read it back through a buffered source, one line at a time.
	let mut source = SourceExt::buffered(log);
	let mut line = String::new();
	let mut count = 0i64;
	let mut total = 0i64;
	let mut max = i64::MIN;
	while source.read_utf8_line(&mut line)? {
		let (_, value) = line
			.rsplit_once(' ')
			.expect("every log line has a value field");
		let mut record: Buffer = Buffer::default();
		record.write_utf8(value)?;
		let value = record.read_decimal_long()?;

		count += 1;
		total += value;
		max = max.max(value);
		line.clear();
	}

	// Render the summary through a buffered sink.
	let mut sink = Vec::new().buffered();
	sink.write_utf8("samples: ")?;
	sink.write_utf8(&count.to_string())?;
	sink.write_utf8("\nmean: ")?;
	sink.write_utf8(&(total / count.max(1)).to_string())?;
	sink.write_utf8("\nmax: ")?;
	sink.write_utf8(&max.to_string())?;
	sink.write_utf8("\n")?;
	sink.emit()?;

	let summary = sink.into_inner();
	print!("{}", String::from_utf8_lossy(&summary));
	Ok(())
}
