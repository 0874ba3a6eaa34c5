//! Throughput microbenchmarks for the hot leaf algorithms and the
//! multi-hash fan-out path (one `criterion_group` per logical area, wired
//! through `criterion_main!`).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hashkit::multihash::MultiHashContext;
use hashkit::registry::AlgorithmId;

const SIZES: &[usize] = &[64, 4096, 1_048_576];

fn bench_single_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_algorithm");
    for &size in SIZES {
        let data = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));
        for id in [
            AlgorithmId::Crc32,
            AlgorithmId::Md5,
            AlgorithmId::Sha1,
            AlgorithmId::Sha256,
            AlgorithmId::Blake3,
            AlgorithmId::Tth,
        ] {
            group.bench_with_input(BenchmarkId::new(format!("{:?}", id), size), &data, |b, data| {
                b.iter(|| {
                    let mut ctx = MultiHashContext::init(id.bit()).unwrap();
                    ctx.update(black_box(data)).unwrap();
                    ctx.finalize();
                    black_box(ctx.read_digest(id).unwrap().to_vec());
                });
            });
        }
    }
    group.finish();
}

fn bench_multi_hash_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_hash_fan_out");
    let data = vec![0xA5u8; 1_048_576];
    group.throughput(Throughput::Bytes(data.len() as u64));

    let mask_all_common = AlgorithmId::Crc32.bit()
        | AlgorithmId::Md5.bit()
        | AlgorithmId::Sha1.bit()
        | AlgorithmId::Sha256.bit()
        | AlgorithmId::Blake3.bit();

    group.bench_function("five_algorithms_1mib", |b| {
        b.iter(|| {
            let mut ctx = MultiHashContext::init(mask_all_common).unwrap();
            ctx.update(black_box(&data)).unwrap();
            ctx.finalize();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_single_algorithms, bench_multi_hash_fan_out);
criterion_main!(benches);
