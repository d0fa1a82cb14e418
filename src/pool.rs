// SPDX-License-Identifier: Apache-2.0

//! Segment pools. The default [`SharedPool`] is a process-wide, two-tier cache:
//! small per-thread buckets of lock-free slots in front of a larger common
//! reserve. Claiming and recycling are single atomic pointer swaps; when both
//! tiers are full the excess block is simply dropped, so the pool's footprint
//! stays bounded under bursts. The [`LocalPool`] alternative keeps a plain
//! per-thread `Vec` behind a `RefCell`, selected crate-wide with the
//! `local-pool` feature.

use std::cell::RefCell;
use std::ptr;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use std::thread::available_parallelism;
use cfg_if::cfg_if;
use once_cell::sync::Lazy;
use crate::segment::memory::{alloc_block, Block};
use crate::segment::{Segment, SIZE};

/// The byte budget of each first-tier bucket.
const BUCKET_BYTES: usize = 64 * 1024;
/// The byte budget of the second-tier reserve.
const RESERVE_BYTES: usize = 4 * 1024 * 1024;

const BUCKET_SLOTS: usize = BUCKET_BYTES / SIZE;
const RESERVE_SLOTS: usize = RESERVE_BYTES / SIZE;

/// A source of reusable segments. Pools never fail: a claim falls back to the
/// system allocator, and a recycle over budget drops the segment.
pub trait Pool {
	/// Claims a single segment, with `pos == limit == 0` and append rights.
	fn claim_one(&self) -> Segment;

	/// Claims segments totalling at least `min_size` bytes into `target`.
	fn claim_size(&self, target: &mut impl Extend<Segment>, min_size: usize)
	where Self: Sized {
		let count = min_size / SIZE + usize::from(min_size % SIZE > 0);
		target.extend((0..count).map(|_| self.claim_one()));
	}

	/// Recycles a single segment back into the pool. Segments still sharing
	/// their block with others are dropped instead; their memory is reclaimed
	/// when the last referrer goes.
	fn recycle_one(&self, segment: Segment);

	/// Recycles many segments back into the pool.
	fn recycle(&self, segments: impl IntoIterator<Item = Segment>)
	where Self: Sized {
		for seg in segments {
			self.recycle_one(seg);
		}
	}

	/// Clears cached segments from the pool to free space.
	fn shed(&self) { }
}

cfg_if! {
	if #[cfg(feature = "local-pool")] {
		pub type DefaultPool = LocalPool;
	} else {
		pub type DefaultPool = SharedPool;
	}
}

/// Returns a handle to the default segment pool.
pub fn pool() -> DefaultPool { DefaultPool::get() }

// Shared pool

/// A bounded shelf of blocks. Each slot holds at most one block; transfers are
/// single atomic swaps, so the shelf is lock-free and safe under any number of
/// concurrent callers.
struct Shelf {
	slots: Box<[AtomicPtr<Block>]>,
}

impl Shelf {
	fn new(len: usize) -> Self {
		let slots = (0..len)
			.map(|_| AtomicPtr::new(ptr::null_mut()))
			.collect();
		Self { slots }
	}

	/// Stores a block in the first free slot, or hands it back when full.
	fn put(&self, block: Arc<Block>) -> Result<(), Arc<Block>> {
		let raw = Arc::into_raw(block) as *mut Block;
		for slot in self.slots.iter() {
			if slot.compare_exchange(
				ptr::null_mut(),
				raw,
				Ordering::Release,
				Ordering::Relaxed
			).is_ok() {
				return Ok(())
			}
		}
		// Every slot was occupied; reconstitute the block so the caller can
		// drop or forward it.
		Err(unsafe { Arc::from_raw(raw) })
	}

	/// Takes a block from the first occupied slot.
	fn take(&self) -> Option<Arc<Block>> {
		for slot in self.slots.iter() {
			let raw = slot.swap(ptr::null_mut(), Ordering::Acquire);
			if !raw.is_null() {
				// The swap took sole ownership of the pointer out of the slot.
				return Some(unsafe { Arc::from_raw(raw) })
			}
		}
		None
	}

	fn drain(&self) {
		while self.take().is_some() { }
	}
}

impl Drop for Shelf {
	fn drop(&mut self) {
		self.drain();
	}
}

struct PoolInner {
	buckets: Box<[Shelf]>,
	reserve: Shelf,
}

static SHARED: Lazy<PoolInner> = Lazy::new(|| {
	let parallelism = available_parallelism().map_or(8, usize::from);
	let buckets = (0..parallelism)
		.map(|_| Shelf::new(BUCKET_SLOTS))
		.collect();
	PoolInner {
		buckets,
		reserve: Shelf::new(RESERVE_SLOTS),
	}
});

static NEXT_BUCKET: AtomicUsize = AtomicUsize::new(0);

thread_local! {
	/// A cheap thread-identity surrogate: each thread is assigned a bucket
	/// index round-robin the first time it touches the pool.
	static BUCKET: usize = NEXT_BUCKET.fetch_add(1, Ordering::Relaxed);
}

/// The process-wide two-tier segment pool. The handle is freely cloneable;
/// all handles refer to the same storage.
#[derive(Copy, Clone, Default)]
pub struct SharedPool;

impl SharedPool {
	pub fn get() -> Self { Self }

	fn bucket(&self) -> &'static Shelf {
		let index = BUCKET.with(|bucket| *bucket);
		&SHARED.buckets[index % SHARED.buckets.len()]
	}
}

impl Pool for SharedPool {
	fn claim_one(&self) -> Segment {
		let block = self.bucket()
			.take()
			.or_else(|| SHARED.reserve.take())
			.unwrap_or_else(alloc_block);
		Segment::from_block(block)
	}

	fn recycle_one(&self, segment: Segment) {
		let Some(block) = segment.into_block() else { return };
		if let Err(block) = self.bucket().put(block) {
			// First tier full; the reserve absorbs the burst, and past that the
			// block goes back to the allocator.
			let _ = SHARED.reserve.put(block);
		}
	}

	fn shed(&self) {
		for bucket in SHARED.buckets.iter() {
			bucket.drain();
		}
		SHARED.reserve.drain();
	}
}

// Local pool

const LOCAL_SLOTS: usize = RESERVE_SLOTS;

thread_local! {
	static LOCAL: LocalPool = LocalPool {
		blocks: Rc::new(RefCell::new(Vec::new())),
	};
}

/// A single-threaded pool holding its blocks in a thread-local `Vec`. Faster
/// than [`SharedPool`] under one thread, but recycled memory never migrates
/// between threads.
#[derive(Clone)]
pub struct LocalPool {
	blocks: Rc<RefCell<Vec<Arc<Block>>>>,
}

impl LocalPool {
	pub fn get() -> Self {
		LOCAL.with(LocalPool::clone)
	}
}

impl Default for LocalPool {
	fn default() -> Self { Self::get() }
}

impl Pool for LocalPool {
	fn claim_one(&self) -> Segment {
		let block = self.blocks
			.borrow_mut()
			.pop()
			.unwrap_or_else(alloc_block);
		Segment::from_block(block)
	}

	fn recycle_one(&self, segment: Segment) {
		let Some(block) = segment.into_block() else { return };
		let mut blocks = self.blocks.borrow_mut();
		if blocks.len() < LOCAL_SLOTS {
			blocks.push(block);
		}
	}

	fn shed(&self) {
		self.blocks.borrow_mut().clear();
	}
}
