// SPDX-License-Identifier: Apache-2.0

use std::thread;
use segio::{Buffer, SEGMENT_SIZE};
use segio::pool::{pool, Pool};
use segio::streams::{Result, Source};

#[test]
fn claimed_segments_start_fresh() {
	let pool = pool();
	for _ in 0..32 {
		let seg = pool.claim_one();
		assert_eq!(seg.len(), 0);
		assert_eq!(seg.pos(), 0);
		assert_eq!(seg.lim(), SEGMENT_SIZE);
		assert!(seg.can_append());
		assert!(!seg.is_shared());
		pool.recycle_one(seg);
	}
}

#[test]
fn recycle_after_use_resets_state() -> Result {
	let pool = pool();

	let mut seg = pool.claim_one();
	assert_eq!(seg.push_slice(b"leftover data"), 13);
	seg.consume(4);
	pool.recycle_one(seg);

	// Whatever comes back out, recycled or fresh, is in the initial state.
	let seg = pool.claim_one();
	assert_eq!((seg.pos(), seg.len()), (0, 0));
	assert!(seg.can_append());
	Ok(())
}

#[test]
fn shared_segments_are_not_pooled() -> Result {
	let pool = pool();
	let mut seg = pool.claim_one();
	seg.push_slice(b"shared");
	let copy = seg.share_all();

	assert!(seg.is_shared());
	assert!(!seg.can_append());
	pool.recycle_one(seg);

	// The copy still reads its bytes; the block was not recycled under it.
	assert_eq!(copy.data(), b"shared");
	Ok(())
}

#[test]
fn buffers_recycle_through_the_pool() -> Result {
	// Cycling many segment-sized writes through buffers must reuse pooled
	// memory rather than fail; this exercises claim and recycle on both tiers.
	for _ in 0..16 {
		let mut buf: Buffer = Buffer::default();
		buf.write_from_slice(&vec![0xAB; SEGMENT_SIZE * 8])?;
		let mut sink: Buffer = Buffer::default();
		buf.read_all(&mut sink)?;
		sink.clear();
	}
	Ok(())
}

#[test]
fn concurrent_claims_and_recycles() {
	let threads: Vec<_> = (0..8)
		.map(|_| thread::spawn(|| {
			let pool = pool();
			for round in 0..200 {
				let mut seg = pool.claim_one();
				assert_eq!(seg.len(), 0);
				let n = seg.push_slice(&[round as u8; 64]);
				assert_eq!(n, 64);
				pool.recycle_one(seg);
			}
		}))
		.collect();

	for thread in threads {
		thread.join().expect("pool thread should not panic");
	}
}

#[test]
fn claim_size_rounds_up_to_whole_segments() {
	let pool = pool();
	let mut claimed = Vec::new();
	pool.claim_size(&mut claimed, SEGMENT_SIZE * 2 + 1);
	assert_eq!(claimed.len(), 3);
	assert!(claimed.iter().all(|seg| seg.len() == 0 && seg.can_append()));
	pool.recycle(claimed);
}

#[test]
fn shed_clears_cached_segments() {
	let pool = pool();
	for _ in 0..8 {
		let seg = pool.claim_one();
		pool.recycle_one(seg);
	}
	pool.shed();

	let seg = pool.claim_one();
	assert_eq!(seg.len(), 0);
}

#[cfg(not(feature = "local-pool"))]
mod shared {
	use std::thread;
	use segio::Buffer;
	use segio::streams::Result;

	#[test]
	fn buffers_cross_threads() -> Result {
		// Segments written on one thread drain on another; the shared pool
		// takes the recycled blocks either way.
		let handle = thread::spawn(|| {
			let mut buf: Buffer = Buffer::default();
			buf.write_from_slice(&vec![0x11; 100_000]).map(|_| buf)
		});
		let mut buf = handle.join().expect("writer thread should not panic")?;
		assert_eq!(buf.count(), 100_000);
		assert!(buf.read_byte_str(100_000)?.iter().all(|&b| b == 0x11));
		Ok(())
	}
}
