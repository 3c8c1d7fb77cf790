// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prefix/mask algebra: mask <-> prefix-length reduction, the exact
//! masked-interval computation, and the split/join primitives used when
//! materializing inet_aton and mixed notations.

use crate::{IPV6_BITS, IPV4_BITS};

/**
Returns a u128 with `prefix` high bits set, remaining low bits zero.

bits: 32 or 128, prefix: `0..=bits`
*/
#[inline]
pub(crate) fn prefix_to_mask(bits: u8, prefix: u8) -> u128 {
    if prefix == 0 {
        return 0;
    }
    if prefix >= bits {
        return ones(bits);
    }
    ones(bits) & !ones(bits - prefix)
}

/// Returns `n` iff `mask` is exactly `n` one-bits followed by zeros.
#[inline]
pub(crate) fn mask_to_prefix(bits: u8, mask: u128) -> Option<u8> {
    if mask == 0 {
        return Some(0);
    }
    let n: u8 = (mask << (128 - bits)).leading_ones() as u8;
    if mask == prefix_to_mask(bits, n) {
        Some(n)
    } else {
        None
    }
}

/// Full-ones value of the given width. `bits: 0..=128`
#[inline]
pub(crate) fn ones(bits: u8) -> u128 {
    if bits >= IPV6_BITS {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

#[inline]
pub(crate) fn v4_field_widths(supplied: usize) -> &'static [u8] {
    match supplied {
        4 => &[8, 8, 8, 8],
        3 => &[8, 8, 16],
        2 => &[8, 24],
        _ => &[32],
    }
}

/**
The image of the interval `[lo, hi]` under bitwise AND with `mask`,
if that image is itself one contiguous interval, else `None`.

Masking can tear a range apart: `{0..255} AND 0x80` is `{0, 128}`.
The recursion walks the bits from the top; at the first bit where the
bounds diverge the two halves must rejoin exactly (bit kept by the
mask) or overlay into one plane (bit cleared by the mask).
*/
pub(crate) fn masked_range(lo: u32, hi: u32, mask: u32, width: u8) -> Option<(u32, u32)> {
    debug_assert!(lo <= hi);
    if width == 0 {
        return Some((0, 0));
    }
    let top: u32 = 1 << (width - 1);
    let low: u32 = top - 1;

    if (lo & top) == (hi & top) {
        let t: u32 = lo & top & mask;
        let (a, z) = masked_range(lo & low, hi & low, mask & low, width - 1)?;
        return Some((t | a, t | z));
    }

    // The top bit diverges: the lower half runs up to all-ones and the
    // upper half starts from zero.
    let (la, lz) = masked_range(lo & low, low, mask & low, width - 1)?;
    let (_, rz) = masked_range(0, hi & low, mask & low, width - 1)?;
    if mask & top != 0 {
        // the diverging bit survives: the halves must meet exactly
        if lz + 1 == top {
            Some((la, top | rz))
        } else {
            None
        }
    } else {
        // the diverging bit is cleared: both images land in one plane
        if la <= rz + 1 {
            Some((0, lz.max(rz)))
        } else {
            None
        }
    }
}

/**
Split a wide value range into consecutive fixed-width fields, returned
most significant first.

The cartesian product of the returned per-field intervals must equal
the original integer interval; that holds exactly when every field
below the highest ranged one covers its full domain. `None` otherwise.
*/
pub(crate) fn split_wide(lo: u128, hi: u128, widths: &[u8]) -> Option<Vec<(u32, u32)>> {
    debug_assert!(lo <= hi);
    let mut out: Vec<(u32, u32)> = Vec::with_capacity(widths.len());
    let mut rem: u8 = widths.iter().sum();

    let mut rlo = lo;
    let mut rhi = hi;
    for &w in widths {
        rem -= w;
        let flo: u32 = ((rlo >> rem) & ones(w)) as u32;
        let fhi: u32 = ((rhi >> rem) & ones(w)) as u32;
        rlo &= ones(rem);
        rhi &= ones(rem);
        if flo != fhi && rem > 0 && (rlo != 0 || rhi != ones(rem)) {
            return None;
        }
        out.push((flo, fhi));
    }
    Some(out)
}

/**
Join two consecutive fields into one, high field first. The joined set
is contiguous only if the high field is single-valued or the low field
covers its full domain.
*/
#[inline]
pub(crate) fn join_fields(
    high: (u32, u32),
    low: (u32, u32),
    low_bits: u8,
) -> Option<(u32, u32)> {
    let low_max: u32 = ones(low_bits) as u32;
    if high.0 != high.1 && (low.0 != 0 || low.1 != low_max) {
        return None;
    }
    Some((high.0 << low_bits | low.0, high.1 << low_bits | low.1))
}

/// Network/host clamp of one segment against a prefix boundary that
/// falls inside it: host bits of `lo` cleared, of `hi` set, network
/// bits kept as supplied.
#[inline]
pub(crate) fn clamp_to_prefix(lo: u32, hi: u32, host_bits: u8) -> (u32, u32) {
    let host: u32 = ones(host_bits) as u32;
    (lo & !host, hi | host)
}

/// Sanity ceiling for a parsed prefix value against a family width.
#[inline]
pub(crate) fn family_prefix_max(v4: bool, beyond: bool) -> u32 {
    if v4 && !beyond {
        IPV4_BITS as u32
    } else {
        IPV6_BITS as u32
    }
}

/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_to_mask() {
        assert_eq!(prefix_to_mask(32, 0), 0);
        assert_eq!(prefix_to_mask(32, 16), 0xffff0000);
        assert_eq!(prefix_to_mask(32, 32), 0xffffffff);
        assert_eq!(prefix_to_mask(128, 64), 0xffff_ffff_ffff_ffff_0000_0000_0000_0000);
        assert_eq!(prefix_to_mask(128, 128), u128::MAX);
    }

    #[test]
    fn test_mask_to_prefix() {
        assert_eq!(mask_to_prefix(32, 0xffff0000), Some(16));
        assert_eq!(mask_to_prefix(32, 0xffffff00), Some(24));
        assert_eq!(mask_to_prefix(32, 0), Some(0));
        assert_eq!(mask_to_prefix(32, 0xffffffff), Some(32));
        assert_eq!(mask_to_prefix(32, 0x00ff0000), None);
        assert_eq!(mask_to_prefix(32, 0xff00ff00), None);
        assert_eq!(mask_to_prefix(128, u128::MAX << 96), Some(32));
    }

    #[test]
    fn test_masked_range_identity_and_zero() {
        assert_eq!(masked_range(0, 255, 0xff, 8), Some((0, 255)));
        assert_eq!(masked_range(17, 42, 0xff, 8), Some((17, 42)));
        assert_eq!(masked_range(17, 42, 0, 8), Some((0, 0)));
    }

    #[test]
    fn test_masked_range_tears() {
        // {0..255} AND 0x80 = {0, 128}: two points, not an interval
        assert_eq!(masked_range(0, 255, 0x80, 8), None);
        assert_eq!(masked_range(0, 255, 0xc0, 8), None);
        // but a half range collapses to a single point
        assert_eq!(masked_range(0, 127, 0x80, 8), Some((0, 0)));
        assert_eq!(masked_range(128, 255, 0x80, 8), Some((128, 128)));
    }

    #[test]
    fn test_masked_range_contiguous_suffix() {
        assert_eq!(masked_range(0, 255, 0x7f, 8), Some((0, 127)));
        assert_eq!(masked_range(0, 100, 0x7f, 8), Some((0, 100)));
        // mask keeps the range's top bit but clears bits below it
        assert_eq!(masked_range(0, 100, 0x4f, 8), None);
    }

    #[test]
    fn test_masked_range_cross_boundary() {
        // [50, 300] AND 0xff wraps into {0..44, 50..255}: torn
        assert_eq!(masked_range(50, 300, 0xff, 16), None);
        // a full wrap covers everything
        assert_eq!(masked_range(0, 511, 0xff, 16), Some((0, 255)));
    }

    #[test]
    fn test_split_wide() {
        // 1.2.3 inet_aton: last 16 bits as one field
        assert_eq!(split_wide(3, 3, &[8, 8, 16]), Some(vec![(0, 0), (0, 0), (3, 3)]));
        // ranged high field over fully-covered low fields
        assert_eq!(
            split_wide(0x01020000, 0x0103ffff, &[8, 8, 8, 8]),
            Some(vec![(1, 1), (2, 3), (0, 255), (0, 255)])
        );
        // low fields not fully covered
        assert_eq!(split_wide(0x01020000, 0x0103fffe, &[8, 8, 8, 8]), None);
        // single value always splits
        assert_eq!(
            split_wide(0x01020304, 0x01020304, &[8, 8, 8, 8]),
            Some(vec![(1, 1), (2, 2), (3, 3), (4, 4)])
        );
    }

    #[test]
    fn test_join_fields() {
        assert_eq!(join_fields((1, 1), (2, 2), 8), Some((0x102, 0x102)));
        assert_eq!(join_fields((1, 1), (0, 255), 8), Some((0x100, 0x1ff)));
        assert_eq!(join_fields((1, 2), (0, 255), 8), Some((0x100, 0x2ff)));
        // ranged high with partial low: torn
        assert_eq!(join_fields((1, 2), (0, 254), 8), None);
        assert_eq!(join_fields((1, 2), (3, 3), 8), None);
    }

    #[test]
    fn test_clamp_to_prefix() {
        // /28 boundary inside the last octet
        assert_eq!(clamp_to_prefix(4, 4, 4), (0, 15));
        assert_eq!(clamp_to_prefix(200, 210, 4), (192, 223));
    }
}
