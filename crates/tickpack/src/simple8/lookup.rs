//! O(n) selector search over a precomputed state table.
//!
//! The naive selector choice re-scans up to 60 values for every candidate
//! word, giving O(n²) encoding. `STATE_SPACE` collapses that search: the
//! table is indexed by "values scanned so far" laid out row after row
//! across the whole selector geometry, and each entry names the smallest
//! word size that the scan can still settle on at that point. During
//! encoding a running `pruning` value (max significant bits seen so far,
//! minus one) walks the table and exits the scan in O(1) amortized per
//! value, while choosing exactly the selector the backtracking search
//! would.

use crate::error::{not_allow, CodecError, Result};
use crate::simple8::packing::{Packing, SELECTORS};
use crate::stream::Getter;

/// Row-major scan states across the selector geometry. Entry 0 is row
/// `i = 1` (one value scanned); row `i` spans `60 / i` entries beyond the
/// first row's 60.
const STATE_SPACE_LEN: usize = 261;

static STATE_SPACE: [u8; STATE_SPACE_LEN] = build_state_space();

const fn build_state_space() -> [u8; STATE_SPACE_LEN] {
    let mut table = [0u8; STATE_SPACE_LEN];
    let mut beg = 0;
    let mut end = 60;
    let mut i = 1;
    while i <= 60 {
        if i != 1 {
            end += 60 / i;
        }
        // A pack of i integers is settled once the significant-bit count
        // lands in [beg + 60 / (i + 1), end).
        let mut n = beg + 60 / (i + 1);
        while n < end {
            table[n] = i as u8;
            n += 1;
        }
        beg = end;
        i += 1;
    }
    table
}

/// Minimum bit width needed for a non-negative value (1 for zero).
pub(crate) fn significant_bits(value: i64) -> u32 {
    if value == 0 {
        1
    } else {
        64 - value.leading_zeros()
    }
}

fn get_packing(integers: usize) -> Result<&'static Packing> {
    let selector = match integers {
        n @ 1..=8 => 16 - n,
        10 => 7,
        12 => 6,
        15 => 5,
        20 => 4,
        30 => 3,
        60 => 2,
        120 => 1,
        240 => 0,
        _ => return Err(CodecError::AssertFailure("invalid packing size")),
    };
    Ok(&SELECTORS[selector])
}

/// Chooses the packing for the suffix of `src` starting at `pos`.
///
/// Fails with `ValueOverflow` when a scanned value is negative or needs
/// 60 or more significant bits plus one, i.e. cannot be packed at all.
pub(crate) fn lookup_packing<G: Getter<i64>>(
    src: &mut G,
    pos: usize,
    len: usize,
) -> Result<&'static Packing> {
    not_allow(pos >= len, "lookup past end of sequence")?;
    let remain = len - pos;
    let num = remain.min(60);

    let mut pruning = 0usize;
    // Tracks whether every scanned value equals the first one.
    let mut indicator = src.get(pos)?;
    let mut all_equal = true;
    let (mut beg, mut end) = (0usize, 60usize);
    let mut matched = 1usize;

    let mut i = 1;
    while i <= num {
        if i != 1 {
            end += 60 / i;
        }
        let value = if i == 1 { indicator } else { src.get(pos + i - 1)? };
        if value < 0 || value >= (1i64 << 60) {
            return Err(CodecError::ValueOverflow("value needs more than 60 bits"));
        }
        if indicator != value {
            all_equal = false;
        }
        // Prune the search space: a value with s significant bits rules
        // out every packing whose field width is below s.
        pruning = pruning.max(significant_bits(value) as usize - 1);
        let n = pruning;
        if beg + n >= end {
            return get_packing(matched);
        }
        if i < 60 && STATE_SPACE[beg + n] > 0 {
            return get_packing(STATE_SPACE[beg + n] as usize);
        }
        if STATE_SPACE[end - 1] > 0 {
            matched = STATE_SPACE[end - 1] as usize;
        }
        beg = end;
        i += 1;
    }

    if num < 60 || remain < 120 || !all_equal {
        return get_packing(matched);
    }

    // Sixty identical single-bit values so far: probe a 120 or 240 run.
    let probe = remain.min(240);
    let mut i = 60;
    while i < probe {
        if src.get(pos + i)? != indicator {
            break;
        }
        i += 1;
    }
    if i == 240 {
        get_packing(240)
    } else if i >= 120 {
        get_packing(120)
    } else {
        get_packing(matched)
    }
}
