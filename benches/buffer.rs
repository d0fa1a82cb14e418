// SPDX-License-Identifier: Apache-2.0

use std::mem;
use criterion::{BatchSize, Bencher, black_box, Criterion, criterion_group, criterion_main};
use segio::{Buffer, SIZE};
use segio::streams::Sink;

fn data() -> Vec<u8> {
	(0..SIZE * 4).map(|n| (n % 251) as u8).collect()
}

fn write_slice(c: &mut Criterion) {
	let data = data();
	c.bench_function("write_slice", |b| b.iter(|| {
		let mut buf: Buffer = Buffer::default();
		buf.write_from_slice(&data).unwrap();
		buf
	}));
}

fn write_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("write_numbers");
	let mut buffer: Buffer = Buffer::default();

	macro_rules! gen {
		($($fn:ident $ty:ident),+ $(,)?) => {$(
			group.bench_function(stringify!($fn), |b| b.iter(|| {
				for _ in 0..SIZE / mem::size_of::<$ty>() {
					let _ = black_box(buffer.$fn($ty::MAX));
				}
				buffer.clear();
			}));
		)+};
	}

	gen! {
		write_u8 u8,
		write_u16 u16,
		write_u32 u32,
		write_u32_le u32,
		write_u64 u64,
		write_u64_le u64,
	}
}

#[inline(always)]
fn read_loop<R>(b: &mut Bencher, buf: &Buffer, read: impl FnMut(&mut Buffer) -> R) {
	b.iter_batched_ref(|| buf.clone(), read, BatchSize::SmallInput)
}

fn read_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("read_numbers");
	let mut buffer: Buffer = Buffer::default();
	for _ in 0..SIZE / 8 {
		let _ = buffer.write_u64(u64::MAX);
	}

	macro_rules! gen {
		($($fn:ident $ty:ident),+ $(,)?) => {$(
			group.bench_function(stringify!($fn), |b|
				read_loop(b, &buffer, |buf|
					for _ in 0..SIZE / mem::size_of::<$ty>() {
						let _ = black_box(buf.$fn());
					}
				)
			);
		)+};
	}

	gen! {
		read_u8 u8,
		read_u16 u16,
		read_u32 u32,
		read_u32_le u32,
		read_u64 u64,
		read_u64_le u64,
	}
}

fn splice(c: &mut Criterion) {
	let data = data();
	let mut full: Buffer = Buffer::default();
	full.write_from_slice(&data).unwrap();

	c.bench_function("splice", |b| b.iter_batched_ref(
		|| (full.clone(), Buffer::<segio::pool::DefaultPool>::default()),
		|(src, dst)| dst.write(src, src.count()),
		BatchSize::SmallInput
	));
}

fn snapshot(c: &mut Criterion) {
	let data = data();
	let mut buffer: Buffer = Buffer::default();
	buffer.write_from_slice(&data).unwrap();

	c.bench_function("snapshot", |b| b.iter(|| buffer.copy()));
}

fn skip(c: &mut Criterion) {
	let data = data();
	let mut buffer: Buffer = Buffer::default();
	buffer.write_from_slice(&data).unwrap();

	let mut group = c.benchmark_group("skip");
	group.bench_function("skip all", |b|
		read_loop(b, &buffer, |buf| buf.skip(buf.count()))
	);
	group.bench_function("skip partial", |b|
		read_loop(b, &buffer, |buf| buf.skip(4096))
	);
	group.finish();
}

fn find(c: &mut Criterion) {
	let data = data();
	let mut buffer: Buffer = Buffer::default();
	buffer.write_from_slice(&data).unwrap();

	c.bench_function("index_of", |b| b.iter(||
		buffer.index_of(black_box(250), 0, buffer.count())
	));
}

criterion_group!(write, write_slice, write_numbers);
criterion_group!(read, read_numbers, splice, snapshot, skip, find);
criterion_main!(write, read);
