// SPDX-License-Identifier: Apache-2.0

//! ## How it works
//!
//! Data is written to and read from reusable chunks of memory called *segments*.
//! When a segment is consumed, it's returned to a *pool*. To write data, segments
//! are claimed from this pool. When the pool is exhausted, segments are created
//! from the system allocator. The default pool instance is shared process-wide:
//! its segments are cached in per-thread buckets of lock-free slots, backed by a
//! larger common reserve which absorbs bursts. With the `local-pool` feature each
//! thread instead keeps its own `RefCell`-based pool, which is faster but cannot
//! move segments between threads.
//!
//! ### Segments
//!
//! Segments are reusable chunks of memory arranged in a ring buffer. Memory
//! within segments can either be owned by or shared between segments, avoiding
//! expensive mem-copy operations as much as possible. Shared memory is read-only;
//! it can be read through multiple segments, and is reclaimed once the last of
//! them is dropped. Small amounts of data under a set threshold (1024B) are not
//! shared, as a tradeoff between memory allocation performance and speed.
//!
//! The ring buffer behaves as a continuous byte queue. Bytes are read from one
//! end and written to the other, claiming new segments from the pool as it fills.
//! Splicing buffers together relinks whole segments instead of copying, merging
//! a relinked segment into its neighbor when both fit in one chunk. This keeps
//! interior segments at least half full, so fragmentation stays bounded no matter
//! how buffers are sliced and recombined.
//!
//! ### Streams
//!
//! [`Source`] and [`Sink`] are the raw byte-stream capabilities; everything that
//! produces or consumes bytes implements one of them against a [`Buffer`].
//! [`BufferedSource`] and [`BufferedSink`] wrap raw streams with an internal
//! buffer, turning per-byte access into segment-sized transfers.
//!
//! [`Source`]: streams::Source
//! [`Sink`]: streams::Sink
//! [`BufferedSource`]: BufferedSource
//! [`BufferedSink`]: BufferedSink

mod buffer;
mod buffered_wrappers;
mod error;
pub mod streams;
mod segment;
pub mod pool;
mod std_io;
mod util;

pub use buffer::*;
pub use buffered_wrappers::{BufferedSink, BufferedSource, Peek};
pub use error::*;
pub use segment::{Segment, SIZE as SEGMENT_SIZE};
pub use std_io::{ReaderSource, SinkWriter, SourceReader, WriterSink};

/// The fixed segment capacity, in bytes.
pub const SIZE: usize = segment::SIZE;
