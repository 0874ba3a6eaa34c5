//! Property-style tests for chunking invariance over
//! randomly generated inputs and random split points, plus a couple of
//! compile-time hex-literal known-answer vectors.

use hex_literal::hex;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use hashkit::multihash::MultiHashContext;
use hashkit::registry::AlgorithmId;

#[test]
fn random_chunkings_agree_for_every_mainstream_algorithm() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    for id in [
        AlgorithmId::Md5,
        AlgorithmId::Sha1,
        AlgorithmId::Sha256,
        AlgorithmId::Sha3_256,
        AlgorithmId::Blake2s,
        AlgorithmId::Blake3,
        AlgorithmId::Ripemd160,
        AlgorithmId::Tiger,
        AlgorithmId::Crc32,
    ] {
        for _ in 0..20 {
            let len: usize = rng.gen_range(0..4096);
            let data: Vec<u8> = (0..len).map(|_| rng.gen::<u8>()).collect();

            let mut whole = MultiHashContext::init(id.bit()).unwrap();
            whole.update(&data).unwrap();
            whole.finalize();
            let expected = whole.read_digest(id).unwrap().to_vec();

            let split_count = rng.gen_range(0..6).min(len);
            let mut splits: Vec<usize> = (0..split_count).map(|_| rng.gen_range(0..=len)).collect();
            splits.sort_unstable();

            let actual = digest_via_splits(id, &data, &splits);
            assert_eq!(actual, expected, "{id:?} is not chunking-invariant for len={len}, splits={splits:?}");
        }
    }
}

fn digest_via_splits(id: AlgorithmId, data: &[u8], splits: &[usize]) -> Vec<u8> {
    let mut ctx = MultiHashContext::init(id.bit()).unwrap();
    let mut pos = 0;
    for &s in splits {
        ctx.update(&data[pos..s]).unwrap();
        pos = s;
    }
    ctx.update(&data[pos..]).unwrap();
    ctx.finalize();
    ctx.read_digest(id).unwrap().to_vec()
}

#[test]
fn md5_empty_matches_compile_time_hex_literal() {
    let mut ctx = MultiHashContext::init(AlgorithmId::Md5.bit()).unwrap();
    ctx.update(b"").unwrap();
    ctx.finalize();
    let expected = hex!("d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(ctx.read_digest(AlgorithmId::Md5).unwrap(), expected);
}

#[test]
fn sha1_abc_matches_compile_time_hex_literal() {
    let mut ctx = MultiHashContext::init(AlgorithmId::Sha1.bit()).unwrap();
    ctx.update(b"abc").unwrap();
    ctx.finalize();
    let expected = hex!("a9993e364706816aba3e25717850c26c9cd0d89");
    assert_eq!(ctx.read_digest(AlgorithmId::Sha1).unwrap(), expected);
}
