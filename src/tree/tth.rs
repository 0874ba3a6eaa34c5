//! Tiger Tree Hash (THEX), as used by DC++ and gtk-gnutella magnet links.
//!
//! Data is split into 1024-byte leaves. Each leaf is hashed as
//! `Tiger(0x00 || leaf_bytes)`; each internal node is
//! `Tiger(0x01 || left_24_bytes || right_24_bytes)`. Leaf hashes are folded
//! into a root with the same incremental binary-counter merge
//! `librhash/tth.c` uses (there expressed as an array indexed by bit
//! position; here as a `Vec` of optional per-level hashes via
//! [`crate::tree::merge_piece`]/[`crate::tree::fold_stack`]). A message that
//! fits in a single leaf has a root equal to that leaf's own hash, and the
//! empty message hashes to `Tiger(0x00)`.

use digest::Digest as _;

const LEAF_SIZE: usize = 1024;

fn leaf_hash(data: &[u8]) -> [u8; 24] {
    let mut t = tiger::Tiger::new();
    t.update([0x00]);
    t.update(data);
    let out = t.finalize();
    let mut buf = [0u8; 24];
    buf.copy_from_slice(&out);
    buf
}

fn node_hash(left: &[u8; 24], right: &[u8; 24]) -> [u8; 24] {
    let mut t = tiger::Tiger::new();
    t.update([0x01]);
    t.update(left);
    t.update(right);
    let out = t.finalize();
    let mut buf = [0u8; 24];
    buf.copy_from_slice(&out);
    buf
}

#[derive(Clone)]
pub struct TthState {
    leaf_buf: Vec<u8>,
    stack: Vec<Option<[u8; 24]>>,
    any_leaf_hashed: bool,
}

impl TthState {
    pub fn new() -> Self {
        Self {
            leaf_buf: Vec::with_capacity(LEAF_SIZE),
            stack: Vec::new(),
            any_leaf_hashed: false,
        }
    }

    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let need = LEAF_SIZE - self.leaf_buf.len();
            let take = need.min(data.len());
            self.leaf_buf.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.leaf_buf.len() == LEAF_SIZE {
                self.flush_leaf();
            }
        }
    }

    fn flush_leaf(&mut self) {
        let h = leaf_hash(&self.leaf_buf);
        self.leaf_buf.clear();
        self.any_leaf_hashed = true;
        crate::tree::merge_piece(&mut self.stack, h, |l, r| node_hash(l, r));
    }

    pub fn finalize(mut self) -> Vec<u8> {
        if !self.leaf_buf.is_empty() || !self.any_leaf_hashed {
            self.flush_leaf();
        }
        let root = crate::tree::fold_stack(&mut self.stack, |l, r| node_hash(l, r));
        root.to_vec()
    }
}

impl Default for TthState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(data: &[u8]) -> Vec<u8> {
        let mut s = TthState::new();
        s.update(data);
        s.finalize()
    }

    #[test]
    fn empty_input_is_tiger_of_domain_byte_alone() {
        let mut t = tiger::Tiger::new();
        digest::Digest::update(&mut t, [0x00]);
        let expected = t.finalize().to_vec();
        assert_eq!(digest(b""), expected);
    }

    #[test]
    fn single_leaf_root_equals_leaf_hash() {
        let data = vec![0x42u8; 500];
        assert_eq!(digest(&data), leaf_hash(&data).to_vec());
    }

    #[test]
    fn two_full_leaves_combine_via_node_hash() {
        let a = vec![0x11u8; LEAF_SIZE];
        let b = vec![0x22u8; LEAF_SIZE];
        let mut data = a.clone();
        data.extend_from_slice(&b);
        let expected = node_hash(&leaf_hash(&a), &leaf_hash(&b));
        assert_eq!(digest(&data), expected.to_vec());
    }

    #[test]
    fn chunking_invariance() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let whole = digest(&data);
        let mut s = TthState::new();
        for c in data.chunks(333) {
            s.update(c);
        }
        assert_eq!(whole, s.finalize());
    }

    #[test]
    fn digest_is_twenty_four_bytes() {
        assert_eq!(digest(b"abc").len(), 24);
    }
}
