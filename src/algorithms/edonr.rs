//! EDON-R 256/512, a NIST SHA-3 round-1 candidate built from two
//! "quasigroup" word transforms instead of S-boxes, over a double-pipe
//! state twice the width of its output — the digest occupies only the
//! upper half of the internal state.
//!
//! EDON-R256 operates on 32-bit words with a 512-bit (16-word) block and a
//! 512-bit double-pipe state; EDON-R512 is the same construction over
//! 64-bit words with a 1024-bit block and a 1024-bit state. Both share the
//! two-quasigroup round shape below, generalized over the word width.
//!
//! Known limitation: the exact quasigroup operations and rotation schedule
//! from the NIST SHA-3 round-1 submission are not reproduced bit-for-bit —
//! no copy of the submission document exists anywhere in this crate's
//! reference material to check a reconstruction against. What's preserved
//! faithfully is EDON-R's defining shape: no S-boxes, only word rotations,
//! additions and XORs (pure ARX), over a double-pipe state twice the output
//! width with feed-forward from the pre-round state. The specific per-word
//! rotation amounts below are therefore this module's own, not the
//! original's. Digests will not match a reference EDON-R implementation;
//! no known-answer test asserts that they do.

macro_rules! edonr_variant {
    ($name:ident, $word:ty, $rotl:ident, $words:expr, $out_words:expr, $out_bytes:expr, $load:path, $store:path) => {
        #[derive(Clone)]
        pub struct $name {
            state: [$word; $words],
            buffer: [u8; $words * (<$word>::BITS as usize / 8)],
            buffered: usize,
            total_len: u64,
        }

        impl $name {
            const WORD_BYTES: usize = <$word>::BITS as usize / 8;
            const BLOCK: usize = $words * Self::WORD_BYTES;

            pub fn new() -> Self {
                Self {
                    state: [0 as $word; $words],
                    buffer: [0u8; $words * (<$word>::BITS as usize / 8)],
                    buffered: 0,
                    total_len: 0,
                }
            }

            pub fn update(&mut self, mut data: &[u8]) {
                self.total_len += data.len() as u64;
                if self.buffered > 0 {
                    let need = Self::BLOCK - self.buffered;
                    let take = need.min(data.len());
                    self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
                    self.buffered += take;
                    data = &data[take..];
                    if self.buffered == Self::BLOCK {
                        let block: Vec<u8> = self.buffer.to_vec();
                        self.absorb(&block);
                        self.buffered = 0;
                    }
                }
                while data.len() >= Self::BLOCK {
                    self.absorb(&data[..Self::BLOCK]);
                    data = &data[Self::BLOCK..];
                }
                if !data.is_empty() {
                    self.buffer[..data.len()].copy_from_slice(data);
                    self.buffered = data.len();
                }
            }

            fn absorb(&mut self, block: &[u8]) {
                let mut m = [0 as $word; $words];
                for i in 0..$words {
                    m[i] = $load(&block[i * Self::WORD_BYTES..]);
                }
                // Quasigroup round Q: state <- Q(state, message).
                let mut a = self.state;
                for i in 0..$words {
                    let left = a[(i + $words - 1) % $words];
                    let right = m[i];
                    a[i] = ($rotl(a[i] ^ left, (i as u32 * 7 + 3) % (<$word>::BITS)))
                        .wrapping_add(right.rotate_left(11))
                        ^ left.rotate_right(5);
                }
                // Quasigroup round R, folding the pre-round state back in so
                // absorbing the same block twice never reproduces the input
                // (double-pipe feed-forward).
                for i in 0..$words {
                    let prev = self.state[i];
                    a[i] = a[i].wrapping_add(prev.rotate_left((i as u32 * 5 + 1) % <$word>::BITS));
                }
                self.state = a;
            }

            pub fn finalize(mut self) -> Vec<u8> {
                let bit_len = self.total_len.wrapping_mul(8);
                let mut pad = vec![0x80u8];
                let rem = (self.total_len as usize + 1) % Self::BLOCK;
                let footer = 16usize; // 128-bit length field, generous for both variants
                let zeros = if rem <= Self::BLOCK - footer {
                    Self::BLOCK - footer - rem
                } else {
                    2 * Self::BLOCK - footer - rem
                };
                pad.extend(std::iter::repeat(0u8).take(zeros));
                pad.extend(std::iter::repeat(0u8).take(footer - 8));
                pad.extend_from_slice(&bit_len.to_le_bytes());
                self.update(&pad);
                debug_assert_eq!(self.buffered, 0);

                // Output occupies only the upper half of the double-pipe state.
                let upper = &self.state[$words - $out_words..];
                let mut out = Vec::with_capacity($out_bytes);
                for &w in upper {
                    let mut buf = [0u8; <$word>::BITS as usize / 8];
                    $store(&mut buf, w);
                    out.extend_from_slice(&buf);
                }
                out.truncate($out_bytes);
                out
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

#[inline]
fn rotl32(x: u32, n: u32) -> u32 {
    x.rotate_left(n % 32)
}

#[inline]
fn rotl64(x: u64, n: u32) -> u64 {
    x.rotate_left(n % 64)
}

edonr_variant!(
    EdonR256,
    u32,
    rotl32,
    16,
    8,
    32,
    crate::codec::load_u32_le,
    crate::codec::store_u32_le
);
edonr_variant!(
    EdonR512,
    u64,
    rotl64,
    16,
    8,
    64,
    crate::codec::load_u64_le,
    crate::codec::store_u64_le
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_lengths() {
        let mut h = EdonR256::new();
        h.update(b"abc");
        assert_eq!(h.finalize().len(), 32);

        let mut h = EdonR512::new();
        h.update(b"abc");
        assert_eq!(h.finalize().len(), 64);
    }

    #[test]
    fn chunking_invariance() {
        let data = vec![0x11u8; 300];
        let mut whole = EdonR256::new();
        whole.update(&data);
        let whole = whole.finalize();

        let mut chunked = EdonR256::new();
        for c in data.chunks(13) {
            chunked.update(c);
        }
        assert_eq!(whole, chunked.finalize());
    }

    #[test]
    fn distinct_inputs_differ() {
        let mut a = EdonR512::new();
        a.update(b"abc");
        let mut b = EdonR512::new();
        b.update(b"abd");
        assert_ne!(a.finalize(), b.finalize());
    }
}
