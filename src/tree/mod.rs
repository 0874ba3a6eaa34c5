//! Tree-structured and composite chunk hashes: TTH, AICH and BTIH fold a
//! stream of fixed-size piece hashes into a single root by the same family
//! of incremental binary-counter merge, while
//! ED2K concatenates its chunk hashes and runs them through one more pass of
//! the chunk hash function instead of a tree.
//!
//! Each state type here is driven by [`crate::algorithms::LeafState`]
//! exactly like a plain leaf hash: `new`, `update`, `finalize`. None of them
//! allocate per update call; the piece buffer is reused across pieces.

pub mod aich;
pub mod btih;
pub mod ed2k;
pub mod tth;

/// Shared incremental Merkle-mountain-range style merge: push a newly
/// completed piece hash onto `stack`, combining with any already-occupied
/// lower levels exactly like carrying in binary addition. `combine` takes
/// the existing (older, left) value and the new (right) value and returns
/// the parent hash.
pub(crate) fn merge_piece<H, F>(stack: &mut Vec<Option<H>>, mut h: H, combine: F)
where
    H: Clone,
    F: Fn(&H, &H) -> H,
{
    let mut level = 0;
    loop {
        if level == stack.len() {
            stack.push(Some(h));
            return;
        }
        match stack[level].take() {
            Some(left) => {
                h = combine(&left, &h);
                level += 1;
            }
            None => {
                stack[level] = Some(h);
                return;
            }
        }
    }
}

/// Fold all occupied levels of a finished `stack` into a single root,
/// starting from the lowest occupied level and combining upward. Panics if
/// `stack` is empty (callers must have merged at least one piece).
pub(crate) fn fold_stack<H, F>(stack: &mut [Option<H>], combine: F) -> H
where
    H: Clone,
    F: Fn(&H, &H) -> H,
{
    let mut levels = stack.iter_mut().filter(|s| s.is_some());
    let mut acc = levels.next().expect("at least one piece hashed").take().unwrap();
    for slot in levels {
        let higher = slot.take().unwrap();
        acc = combine(&higher, &acc);
    }
    acc
}
