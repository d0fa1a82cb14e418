// SPDX-License-Identifier: Apache-2.0

use pretty_assertions::assert_eq;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use segio::{Buffer, ErrorKind, SIZE};
use segio::streams::{Result, Sink, Source};

#[quickcheck]
fn transfer_preserves_bytes(bytes: Vec<u8>, n: usize) -> TestResult {
	if bytes.is_empty() { return TestResult::discard() }
	let n = n % (bytes.len() + 1);

	let mut src: Buffer = Buffer::default();
	src.write_from_slice(&bytes).unwrap();
	let mut dst: Buffer = Buffer::default();
	dst.write(&mut src, n).unwrap();

	let total = src.count() + dst.count();
	let moved = dst.read_byte_str(n).unwrap();
	let rest = src.read_byte_str(bytes.len() - n).unwrap();

	TestResult::from_bool(
		total == bytes.len() &&
		moved == bytes[..n] &&
		rest == bytes[n..]
	)
}

#[test]
fn move_only_splice() -> Result {
	let mut a: Buffer = Buffer::default();
	a.write_from_slice(&[0x5A; 40000])?;
	let mut b: Buffer = Buffer::default();
	b.write_from_slice(&[0xA5; 40000])?;

	b.write(&mut a, 40000)?;
	assert_eq!(a.count(), 0);
	assert_eq!(b.count(), 80000);

	// Interior segments stay at least half full after the splice.
	assert!(b.count() >= b.segment_count().saturating_sub(2) * (SIZE / 2));

	let read = b.read_byte_str(80000)?;
	assert!(read[..40000].iter().all(|&byte| byte == 0xA5));
	assert!(read[40000..].iter().all(|&byte| byte == 0x5A));
	Ok(())
}

#[quickcheck]
fn splice_keeps_interior_segments_half_full(prefix: Vec<u8>, moved: Vec<u8>, n: usize) -> TestResult {
	if moved.is_empty() { return TestResult::discard() }
	let n = n % (moved.len() + 1);

	let mut src: Buffer = Buffer::default();
	src.write_from_slice(&moved).unwrap();
	let mut dst: Buffer = Buffer::default();
	dst.write_from_slice(&prefix).unwrap();
	dst.write(&mut src, n).unwrap();

	let dst_ok = dst.count() >= dst.segment_count().saturating_sub(2) * (SIZE / 2);
	let src_ok = src.count() >= src.segment_count().saturating_sub(2) * (SIZE / 2);
	TestResult::from_bool(dst_ok && src_ok)
}

#[test]
fn write_rejects_oversized_count() {
	let mut src: Buffer = Buffer::default();
	src.write_from_slice(b"abc").unwrap();
	let mut dst: Buffer = Buffer::default();

	let error = dst.write(&mut src, 4).unwrap_err();
	assert_eq!(error.kind, ErrorKind::InvalidInput);
	assert_eq!(src.count(), 3);
}

#[test]
fn spanning_copy() -> Result {
	let mut a: Buffer = Buffer::default();
	a.write_utf8(&"a".repeat(16384))?;
	a.write_utf8(&"b".repeat(16384))?;

	let mut b: Buffer = Buffer::default();
	a.copy_to(&mut b, 10, 24576)?;

	let mut read = String::new();
	b.read_utf8(&mut read, 24576)?;
	assert_eq!(&read[..16374], "a".repeat(16374));
	assert_eq!(&read[16374..], "b".repeat(8202));

	// The source is unchanged.
	let mut original = String::new();
	a.read_utf8(&mut original, 32768)?;
	assert_eq!(original, format!("{}{}", "a".repeat(16384), "b".repeat(16384)));
	Ok(())
}

#[quickcheck]
fn copy_is_independent(bytes: Vec<u8>) -> bool {
	let mut buf: Buffer = Buffer::default();
	buf.write_from_slice(&bytes).unwrap();

	let mut copy = buf.copy();
	assert_eq!(buf, copy);

	// Draining the copy leaves the source untouched.
	let read = copy.read_byte_str(bytes.len()).unwrap();
	read == bytes && buf.count() == bytes.len() && copy.is_empty()
}

#[test]
fn copy_then_write_original() -> Result {
	let mut buf: Buffer = Buffer::default();
	buf.write_utf8("seed")?;
	let copy = buf.copy();

	// Appending to the original must not show up in the snapshot.
	buf.write_utf8("-more")?;
	assert_eq!(copy.count(), 4);
	assert_eq!(buf.count(), 9);

	let mut read = String::new();
	buf.read_utf8_to_end(&mut read)?;
	assert_eq!(read, "seed-more");
	Ok(())
}

#[test]
fn copy_out_of_bounds() {
	let mut buf: Buffer = Buffer::default();
	buf.write_from_slice(b"abc").unwrap();
	let mut dst: Buffer = Buffer::default();
	let error = buf.copy_to(&mut dst, 1, 3).unwrap_err();
	assert_eq!(error.kind, ErrorKind::OutOfBounds);
}

#[test]
fn read_all_drains_source() -> Result {
	let mut src: Buffer = Buffer::default();
	src.write_from_slice(&vec![7u8; SIZE + 100])?;
	let mut dst: Buffer = Buffer::default();

	assert_eq!(src.read_all(&mut dst)?, SIZE + 100);
	assert!(src.is_empty());
	assert_eq!(dst.count(), SIZE + 100);
	Ok(())
}

#[test]
fn compact_repacks_fragments() -> Result {
	let mut buf: Buffer = Buffer::default();
	buf.write_from_slice(&vec![9u8; SIZE * 3])?;

	// Sharing fragments the buffer into partial segments.
	let copy = buf.copy();
	let mut fragmented: Buffer = Buffer::default();
	buf.read_all(&mut fragmented)?;
	drop(copy);

	let expected = fragmented.copy();
	fragmented.compact();
	assert_eq!(fragmented.count(), SIZE * 3);
	assert_eq!(fragmented, expected);
	Ok(())
}

#[test]
fn lean_buffer_always_shares() -> Result {
	let mut src: Buffer = Buffer::lean();
	src.write_from_slice(&[0x44; 600])?;

	// A split below the default share threshold still shares in a lean buffer,
	// freezing the source segment's block.
	let mut dst: Buffer = Buffer::default();
	dst.write(&mut src, 100)?;
	assert_eq!(dst.count(), 100);
	assert_eq!(src.count(), 500);
	assert_eq!(dst.read_byte_str(100)?, [0x44; 100]);
	Ok(())
}

#[test]
fn small_transfers_compact() -> Result {
	// Many small buffer-to-buffer moves must not leave a trail of nearly-empty
	// segments behind.
	let mut dst: Buffer = Buffer::default();
	for _ in 0..64 {
		let mut src: Buffer = Buffer::default();
		src.write_from_slice(&[1u8; 100])?;
		dst.write(&mut src, 100)?;
	}
	assert_eq!(dst.count(), 6400);
	assert!(dst.segment_count() <= 2);
	Ok(())
}
