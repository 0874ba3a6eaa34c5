//! The multi-hash streaming context: drive any
//! number of concurrently-selected algorithms over a single byte stream with
//! one `update` call each, fan-out to a [`crate::algorithms::LeafState`] per
//! selected bit.
//!
//! Mirrors the shape of a typical incremental-digest context (`init` /
//! `update` / `final`, plus `reset` to rehash a second message without
//! reallocating), generalized from a single algorithm to a mask of them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::algorithms::{DigestBuf, LeafState};
use crate::registry::{self, AlgoMask, AlgorithmId};
use crate::error::{Error, Result};

/// Progress callback invoked after each `update` call with the running
/// total byte count; returning `false` requests
/// cancellation, checked cooperatively on the next `update`.
pub type ProgressCallback = Box<dyn FnMut(u64) -> bool + Send>;

struct Leaf {
    id: AlgorithmId,
    state: Option<LeafState>,
    digest: Option<DigestBuf>,
}

/// Streaming context selected over a bitmask of algorithms. Not `Clone`: a `LeafState` is consumed by
/// `finalize`, so a context is a one-shot, move-only computation the way
/// the underlying digest crates are.
pub struct MultiHashContext {
    mask: AlgoMask,
    leaves: Vec<Leaf>,
    total_bytes: u64,
    finalized: bool,
    /// When set (the default), `read_digest` transparently calls `finalize`
    /// on first read instead of failing; turn it off to require an explicit
    /// `finalize` call and treat a premature read as a hard error.
    auto_final: bool,
    cancel: Arc<AtomicBool>,
    callback: Option<ProgressCallback>,
    /// Full `.torrent` body captured from the BTIH leaf at `finalize`, since
    /// the leaf's buffered file bytes don't survive being consumed into a
    /// plain digest. `None` unless a BTIH leaf was selected.
    btih_torrent: Option<Vec<u8>>,
}

impl MultiHashContext {
    /// Create a context over `mask`. `mask` must be
    /// non-zero and contain only registered algorithm bits.
    pub fn init(mask: AlgoMask) -> Result<Self> {
        registry::validate_mask(mask)?;
        let leaves = registry::iter_mask(mask)
            .map(|id| Leaf { id, state: Some(LeafState::new(id)), digest: None })
            .collect();
        Ok(Self {
            mask,
            leaves,
            total_bytes: 0,
            finalized: false,
            auto_final: true,
            cancel: Arc::new(AtomicBool::new(false)),
            callback: None,
            btih_torrent: None,
        })
    }

    pub fn auto_final(&self) -> bool {
        self.auto_final
    }

    /// Toggle auto-finalization on `read_digest`. Off requires the caller to
    /// call `finalize` explicitly before reading a digest.
    pub fn set_auto_final(&mut self, on: bool) {
        self.auto_final = on;
    }

    pub fn mask(&self) -> AlgoMask {
        self.mask
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Install a progress callback, replacing any previously set one.
    pub fn set_callback(&mut self, callback: ProgressCallback) {
        self.callback = Some(callback);
    }

    /// Configure the BTIH leaf (piece length, private flag, torrent name),
    /// if one is selected. Must be
    /// called before any `update`; replaces the leaf's fresh default state.
    pub fn set_btih_options(&mut self, options: crate::tree::btih::BtihOptions) {
        if let Some(leaf) = self.leaves.iter_mut().find(|l| l.id == AlgorithmId::Btih) {
            leaf.state = Some(LeafState::Btih(Box::new(crate::tree::btih::BtihState::with_options(options))));
        }
    }

    /// A cheap, cloneable handle a second thread can use to request
    /// cancellation of an in-flight `update` loop (cooperative, checked
    /// between chunks, never preemptive).
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel.clone())
    }

    /// Feed a chunk of the message to every selected leaf. A canceled
    /// context silently drops the call without touching any leaf state or
    /// `total_bytes`; calling this after `finalize` (without an intervening
    /// `reset`) is a recoverable error, not a panic.
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(Error::Canceled);
        }
        if self.finalized {
            return Err(Error::InvalidState("update called after finalize"));
        }
        for leaf in &mut self.leaves {
            leaf.state
                .as_mut()
                .expect("leaf state present until finalize")
                .update(data);
        }
        self.total_bytes += data.len() as u64;

        if let Some(cb) = self.callback.as_mut() {
            if !cb(self.total_bytes) {
                self.cancel.store(true, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Finalize every leaf, consuming their states.
    /// Idempotent: calling this more than once just re-returns the same
    /// digests without rehashing.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        for leaf in &mut self.leaves {
            if leaf.id == AlgorithmId::Btih {
                if let Some(LeafState::Btih(b)) = &leaf.state {
                    self.btih_torrent = Some(b.full_torrent());
                }
            }
            let state = leaf.state.take().expect("leaf state present until finalize");
            leaf.digest = Some(state.finalize());
        }
        self.finalized = true;
    }

    /// The full `.torrent` file body (outer dict wrapping the `info` dict),
    /// captured at `finalize` if a BTIH leaf was selected. `None` before
    /// `finalize` or when BTIH wasn't part of the mask.
    pub fn btih_torrent(&self) -> Option<&[u8]> {
        self.btih_torrent.as_deref()
    }

    /// Read the digest for one selected algorithm. If not yet finalized and
    /// `auto_final` is on (the default), finalizes first; with `auto_final`
    /// off, reading before `finalize` is an `InvalidState` error. Reading an
    /// algorithm that was never part of the selected mask is an
    /// `InvalidArgument` error, distinct from "not finalized yet".
    pub fn read_digest(&mut self, id: AlgorithmId) -> Result<&[u8]> {
        if !self.finalized {
            if self.auto_final {
                self.finalize();
            } else {
                return Err(Error::InvalidState("read_digest called before finalize with auto_final disabled"));
            }
        }
        self.leaves
            .iter()
            .find(|l| l.id == id)
            .and_then(|l| l.digest.as_ref())
            .map(|d| d.as_slice())
            .ok_or(Error::InvalidArgument("algorithm not part of the selected mask"))
    }

    /// All finalized digests, in ascending bit order.
    pub fn digests(&self) -> impl Iterator<Item = (AlgorithmId, &[u8])> {
        self.leaves
            .iter()
            .filter_map(|l| l.digest.as_ref().map(|d| (l.id, d.as_slice())))
    }

    /// Discard all progress and start over with a fresh state for the same
    /// mask, without reallocating the leaf vector.
    pub fn reset(&mut self) {
        for leaf in &mut self.leaves {
            leaf.state = Some(LeafState::new(leaf.id));
            leaf.digest = None;
        }
        self.total_bytes = 0;
        self.finalized = false;
        self.btih_torrent = None;
        self.cancel.store(false, Ordering::Relaxed);
    }
}

/// A clonable handle that can request cancellation of a
/// [`MultiHashContext`]'s in-flight `update` loop from another thread.
#[derive(Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AlgorithmId::*;

    #[test]
    fn init_rejects_zero_mask() {
        assert!(MultiHashContext::init(0).is_err());
    }

    #[test]
    fn single_algorithm_matches_leaf_state() {
        let mut ctx = MultiHashContext::init(Md5.bit()).unwrap();
        ctx.update(b"abc").unwrap();
        ctx.finalize();
        assert_eq!(
            crate::codec::hex_encode(ctx.read_digest(Md5).unwrap(), false),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn multiple_algorithms_each_see_the_full_stream() {
        let mask = Md5.bit() | Sha1.bit() | Sha256.bit();
        let mut ctx = MultiHashContext::init(mask).unwrap();
        ctx.update(b"The quick brown fox").unwrap();
        ctx.update(b" jumps over the lazy dog").unwrap();
        ctx.finalize();

        assert!(ctx.read_digest(Md5).is_ok());
        assert!(ctx.read_digest(Sha1).is_ok());
        assert!(ctx.read_digest(Sha256).is_ok());
        assert!(ctx.read_digest(Blake3).is_err());
        assert_eq!(ctx.total_bytes(), 43);
    }

    #[test]
    fn reset_allows_rehashing_without_reallocating_leaves() {
        let mut ctx = MultiHashContext::init(Sha256.bit()).unwrap();
        ctx.update(b"first").unwrap();
        ctx.finalize();
        let first = ctx.read_digest(Sha256).unwrap().to_vec();

        ctx.reset();
        ctx.update(b"first").unwrap();
        ctx.finalize();
        assert_eq!(ctx.read_digest(Sha256).unwrap(), first.as_slice());
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut ctx = MultiHashContext::init(Sha1.bit()).unwrap();
        ctx.update(b"data").unwrap();
        ctx.finalize();
        let a = ctx.read_digest(Sha1).unwrap().to_vec();
        ctx.finalize();
        let b = ctx.read_digest(Sha1).unwrap().to_vec();
        assert_eq!(a, b);
    }

    #[test]
    fn cancel_handle_aborts_next_update() {
        let mut ctx = MultiHashContext::init(Sha256.bit()).unwrap();
        let handle = ctx.cancel_handle();
        handle.cancel();
        assert!(ctx.update(b"more data").is_err());
    }

    #[test]
    fn update_after_finalize_is_a_recoverable_error_not_a_panic() {
        let mut ctx = MultiHashContext::init(Sha256.bit()).unwrap();
        ctx.update(b"first").unwrap();
        ctx.finalize();
        assert!(matches!(ctx.update(b"more"), Err(crate::error::Error::InvalidState(_))));
    }

    #[test]
    fn canceled_context_drops_update_before_touching_total_bytes() {
        let mut ctx = MultiHashContext::init(Sha256.bit()).unwrap();
        ctx.update(b"first").unwrap();
        let before = ctx.total_bytes();
        let handle = ctx.cancel_handle();
        handle.cancel();
        assert!(ctx.update(b"more data").is_err());
        assert_eq!(ctx.total_bytes(), before, "canceled update must not grow total_bytes");
    }

    #[test]
    fn read_digest_auto_finalizes_by_default() {
        let mut ctx = MultiHashContext::init(Sha256.bit()).unwrap();
        ctx.update(b"abc").unwrap();
        assert!(ctx.read_digest(Sha256).is_ok());
    }

    #[test]
    fn read_digest_before_finalize_errors_when_auto_final_disabled() {
        let mut ctx = MultiHashContext::init(Sha256.bit()).unwrap();
        ctx.set_auto_final(false);
        ctx.update(b"abc").unwrap();
        assert!(matches!(ctx.read_digest(Sha256), Err(crate::error::Error::InvalidState(_))));
        ctx.finalize();
        assert!(ctx.read_digest(Sha256).is_ok());
    }

    #[test]
    fn btih_torrent_is_captured_at_finalize() {
        let mut ctx = MultiHashContext::init(Btih.bit()).unwrap();
        assert!(ctx.btih_torrent().is_none());
        ctx.update(b"some file bytes").unwrap();
        ctx.finalize();
        let torrent = ctx.btih_torrent().expect("BTIH leaf should capture a torrent body");
        assert!(torrent.starts_with(b"d"));
        assert!(torrent.ends_with(b"e"));
    }

    #[test]
    fn read_digest_for_unselected_algorithm_is_invalid_argument() {
        let mut ctx = MultiHashContext::init(Md5.bit()).unwrap();
        ctx.update(b"abc").unwrap();
        ctx.finalize();
        assert!(matches!(ctx.read_digest(Blake3), Err(crate::error::Error::InvalidArgument(_))));
    }
}
