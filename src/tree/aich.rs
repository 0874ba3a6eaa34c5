//! AICH (Advanced Intelligent Corruption Handling), the eMule/eDonkey2000
//! per-part integrity tree.
//!
//! Data is split into 9,728,000-byte parts (the same part size ED2K uses).
//! Each part is hashed with plain SHA-1 (no domain prefix); internal nodes
//! are `SHA1(left_20_bytes || right_20_bytes)`. Unlike TTH, AICH has no
//! leaf/node domain separation, but the incremental merge has the same
//! shape: a part with no sibling at its level is carried up unchanged and
//! only combined once a sibling appears, which is exactly what
//! [`crate::tree::merge_piece`]/[`crate::tree::fold_stack`] already do.

use sha1::{Digest, Sha1};

const PART_SIZE: usize = 9_728_000;

fn leaf_hash(data: &[u8]) -> [u8; 20] {
    let mut h = Sha1::new();
    h.update(data);
    let out = h.finalize();
    let mut buf = [0u8; 20];
    buf.copy_from_slice(&out);
    buf
}

fn node_hash(left: &[u8; 20], right: &[u8; 20]) -> [u8; 20] {
    let mut h = Sha1::new();
    h.update(left);
    h.update(right);
    let out = h.finalize();
    let mut buf = [0u8; 20];
    buf.copy_from_slice(&out);
    buf
}

#[derive(Clone)]
pub struct AichState {
    part_buf: Vec<u8>,
    stack: Vec<Option<[u8; 20]>>,
    any_part_hashed: bool,
}

impl AichState {
    pub fn new() -> Self {
        Self {
            part_buf: Vec::with_capacity(PART_SIZE),
            stack: Vec::new(),
            any_part_hashed: false,
        }
    }

    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let need = PART_SIZE - self.part_buf.len();
            let take = need.min(data.len());
            self.part_buf.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.part_buf.len() == PART_SIZE {
                self.flush_part();
            }
        }
    }

    fn flush_part(&mut self) {
        let h = leaf_hash(&self.part_buf);
        self.part_buf.clear();
        self.any_part_hashed = true;
        crate::tree::merge_piece(&mut self.stack, h, |l, r| node_hash(l, r));
    }

    pub fn finalize(mut self) -> Vec<u8> {
        if !self.part_buf.is_empty() || !self.any_part_hashed {
            self.flush_part();
        }
        let root = crate::tree::fold_stack(&mut self.stack, |l, r| node_hash(l, r));
        root.to_vec()
    }
}

impl Default for AichState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(data: &[u8]) -> Vec<u8> {
        let mut s = AichState::new();
        s.update(data);
        s.finalize()
    }

    #[test]
    fn empty_input_is_sha1_of_empty_part() {
        assert_eq!(digest(b""), leaf_hash(b"").to_vec());
    }

    #[test]
    fn single_part_root_equals_part_hash() {
        let data = vec![0x99u8; 1000];
        assert_eq!(digest(&data), leaf_hash(&data).to_vec());
    }

    #[test]
    fn digest_is_twenty_bytes() {
        assert_eq!(digest(b"abc").len(), 20);
    }

    #[test]
    fn chunking_invariance() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 199) as u8).collect();
        let whole = digest(&data);
        let mut s = AichState::new();
        for c in data.chunks(777) {
            s.update(c);
        }
        assert_eq!(whole, s.finalize());
    }
}
