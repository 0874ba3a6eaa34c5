//! ED2K, the eDonkey2000/eMule file hash.
//!
//! The file is split into 9,728,000-byte chunks. If the file is no larger
//! than one chunk the ED2K hash is simply `MD4(file)`. Otherwise each chunk
//! is hashed with MD4, the chunk digests are concatenated in order, and the
//! result is `MD4(concat_of_chunk_digests)`.
//!
//! Note: this intentionally implements the "old style" rule — a file whose
//! length is an exact multiple of the chunk size is not given a trailing
//! empty chunk. Some eMule versions add one, producing a different hash for
//! such files (the so-called red/blue icon discrepancy); this crate follows
//! the simpler, more widely compatible rule.

use md4::{Digest, Md4};

const PART_SIZE: usize = 9_728_000;

fn md4_of(data: &[u8]) -> [u8; 16] {
    let mut h = Md4::new();
    h.update(data);
    let out = h.finalize();
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&out);
    buf
}

#[derive(Clone)]
pub struct Ed2kState {
    part_buf: Vec<u8>,
    chunk_digests: Vec<u8>,
    chunk_count: usize,
}

impl Ed2kState {
    pub fn new() -> Self {
        Self {
            part_buf: Vec::with_capacity(PART_SIZE),
            chunk_digests: Vec::new(),
            chunk_count: 0,
        }
    }

    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let need = PART_SIZE - self.part_buf.len();
            let take = need.min(data.len());
            self.part_buf.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.part_buf.len() == PART_SIZE && !data.is_empty() {
                // Only flush a full chunk early if more data follows: a
                // file that ends exactly on a chunk boundary must not
                // spuriously become "two chunks, the second empty".
                self.flush_chunk();
            }
        }
    }

    fn flush_chunk(&mut self) {
        let d = md4_of(&self.part_buf);
        self.part_buf.clear();
        self.chunk_digests.extend_from_slice(&d);
        self.chunk_count += 1;
    }

    pub fn finalize(mut self) -> Vec<u8> {
        if self.chunk_count == 0 {
            return md4_of(&self.part_buf).to_vec();
        }
        if !self.part_buf.is_empty() {
            self.flush_chunk();
        }
        if self.chunk_count == 1 {
            return self.chunk_digests;
        }
        md4_of(&self.chunk_digests).to_vec()
    }
}

impl Default for Ed2kState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(data: &[u8]) -> Vec<u8> {
        let mut s = Ed2kState::new();
        s.update(data);
        s.finalize()
    }

    #[test]
    fn small_file_is_plain_md4() {
        assert_eq!(digest(b"abc"), md4_of(b"abc").to_vec());
    }

    #[test]
    fn digest_is_sixteen_bytes() {
        assert_eq!(digest(b"hello world").len(), 16);
    }

    #[test]
    fn two_chunk_file_hashes_concatenated_chunk_digests() {
        let a = vec![0xAAu8; PART_SIZE];
        let b = vec![0xBBu8; 1234];
        let mut data = a.clone();
        data.extend_from_slice(&b);

        let mut expected_concat = Vec::new();
        expected_concat.extend_from_slice(&md4_of(&a));
        expected_concat.extend_from_slice(&md4_of(&b));
        let expected = md4_of(&expected_concat);

        assert_eq!(digest(&data), expected.to_vec());
    }

    #[test]
    fn chunking_invariance() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 97) as u8).collect();
        let whole = digest(&data);
        let mut s = Ed2kState::new();
        for c in data.chunks(4096) {
            s.update(c);
        }
        assert_eq!(whole, s.finalize());
    }
}
