// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The materializer: turns a validated [Provider] into a concrete
//! [RangeAddr], applying inet_aton splits, mixed-quad joins, masks and
//! prefix-subnet expansion. This is where a syntactically valid string
//! can still fail semantically, when some segment's value set does not
//! reduce to one contiguous interval.

use crate::{
    masks::{clamp_to_prefix, join_fields, masked_range, ones, prefix_to_mask, split_wide, v4_field_widths},
    options::ParseOpts,
    structs::{AddrSpec, IpFam, Provider, RangeAddr, SegVal},
    RangeError, IPV4_BITS,
};

/// Resolve without a version hint: `None` for the version-ambiguous
/// Empty/All/PrefixOnly providers.
pub(crate) fn resolve_auto(
    p: &Provider,
    opts: &ParseOpts,
) -> Result<Option<RangeAddr>, RangeError> {
    match p {
        Provider::Empty | Provider::All | Provider::PrefixOnly(_) => Ok(None),
        Provider::Addr(spec) => materialize(spec, false, opts).map(Some),
    }
}

/// Resolve against a caller-supplied version: loopback for Empty, the
/// full address range for All, the network mask for PrefixOnly, and a
/// version check for everything else.
pub(crate) fn resolve_as(
    p: &Provider,
    fam: IpFam,
    opts: &ParseOpts,
) -> Result<RangeAddr, RangeError> {
    match p {
        Provider::Empty => Ok(loopback(fam)),
        Provider::All => Ok(full_range(fam)),
        Provider::PrefixOnly(n) => mask_addr(fam, *n, opts),
        Provider::Addr(spec) => {
            if spec.fam != fam {
                return Err(RangeError::WrongVersion { expected: fam, actual: spec.fam });
            }
            materialize(spec, false, opts)
        }
    }
}

/// The literal host value: mask and prefix-subnet expansion skipped,
/// the prefix itself retained.
pub(crate) fn resolve_host(
    p: &Provider,
    opts: &ParseOpts,
) -> Result<Option<RangeAddr>, RangeError> {
    match p {
        Provider::Addr(spec) => materialize(spec, true, opts).map(Some),
        _ => Ok(None),
    }
}

/* ---------------------------------- */

fn loopback(fam: IpFam) -> RangeAddr {
    let segs: Vec<SegVal> = match fam {
        IpFam::V4 => vec![
            SegVal::new(127, 127),
            SegVal::new(0, 0),
            SegVal::new(0, 0),
            SegVal::new(1, 1),
        ],
        IpFam::V6 => {
            let mut v = vec![SegVal::new(0, 0); 8];
            v[7] = SegVal::new(1, 1);
            v
        }
    };
    RangeAddr { fam, segs, prefix: None, zone: None, mixed: false }
}

fn full_range(fam: IpFam) -> RangeAddr {
    let max = fam.seg_max() as u16;
    RangeAddr {
        fam,
        segs: vec![SegVal::new(0, max); fam.seg_count()],
        prefix: None,
        zone: None,
        mixed: false,
    }
}

/// `/n` resolved against a version is the n-bit network mask address.
fn mask_addr(fam: IpFam, n: u8, opts: &ParseOpts) -> Result<RangeAddr, RangeError> {
    let bits = fam.bits();
    if n > bits && !(fam == IpFam::V4 && opts.prefixes_beyond_size) {
        return Err(RangeError::PrefixTooLong { prefix: n, fam });
    }
    let n = n.min(bits);
    let mask = prefix_to_mask(bits, n);
    Ok(RangeAddr {
        fam,
        segs: segs_from_u128(fam, mask),
        prefix: Some(n),
        zone: None,
        mixed: false,
    })
}

fn segs_from_u128(fam: IpFam, v: u128) -> Vec<SegVal> {
    let sb = fam.seg_bits();
    let count = fam.seg_count();
    (0..count)
        .map(|i| {
            let shift = ((count - 1 - i) as u32) * sb as u32;
            let s = ((v >> shift) & ones(sb)) as u16;
            SegVal::new(s, s)
        })
        .collect()
}

#[inline]
fn octet_widths(bits: u8) -> &'static [u8] {
    match bits {
        16 => &[8, 8],
        24 => &[8, 8, 8],
        _ => &[8, 8, 8, 8],
    }
}

/* ---------------------------------- */

/**
Materialize an address spec into per-segment contiguous intervals.

With `host` set, the literal parsed value is produced: no mask
application and no prefix-subnet expansion (the prefix field itself is
kept). Reversed ranges are renormalized here in either case.
*/
pub(crate) fn materialize(
    spec: &AddrSpec,
    host: bool,
    opts: &ParseOpts,
) -> Result<RangeAddr, RangeError> {
    let fam = spec.fam;
    let sb = fam.seg_bits();
    let mut vals: Vec<(u32, u32)> = Vec::with_capacity(fam.seg_count());

    if let Some((wlo, whi)) = spec.wide {
        let (lo, hi) = if wlo <= whi { (wlo, whi) } else { (whi, wlo) };
        vals = split_wide(lo, hi, &[16; 8]).ok_or(RangeError::NonContiguous { seg: 0 })?;
    } else if fam == IpFam::V4 {
        let widths = v4_field_widths(spec.segs.len());
        for (i, seg) in spec.segs.iter().enumerate() {
            let (lo, hi) = seg.ordered();
            if widths[i] == 8 {
                vals.push((lo, hi));
            } else {
                let split = split_wide(lo as u128, hi as u128, octet_widths(widths[i]))
                    .ok_or(RangeError::NonContiguous { seg: i })?;
                vals.extend(split);
            }
        }
    } else {
        for seg in &spec.segs {
            vals.push(seg.ordered());
        }
        if let Some(quad) = &spec.mixed {
            let o: Vec<(u32, u32)> = quad.iter().map(|s| s.ordered()).collect();
            vals.push(join_fields(o[0], o[1], 8).ok_or(RangeError::MixedJoin { seg: 6 })?);
            vals.push(join_fields(o[2], o[3], 8).ok_or(RangeError::MixedJoin { seg: 7 })?);
        }
    }

    // an IPv4 prefix beyond 32 bits (permitted by configuration) clamps
    let mut prefix = spec.prefix;
    if fam == IpFam::V4 {
        if let Some(p) = prefix {
            if p > IPV4_BITS {
                prefix = Some(IPV4_BITS);
            }
        }
    }

    if !host {
        if let Some(m) = spec.mask {
            let count = fam.seg_count();
            for (i, v) in vals.iter_mut().enumerate() {
                let shift = ((count - 1 - i) as u32) * sb as u32;
                let mseg: u32 = ((m >> shift) & ones(sb)) as u32;
                *v = masked_range(v.0, v.1, mseg, sb)
                    .ok_or(RangeError::NonContiguous { seg: i })?;
            }
        }
        if let Some(p) = prefix {
            for (i, v) in vals.iter_mut().enumerate() {
                let start = (i as u32) * sb as u32;
                let end = start + sb as u32;
                let p = p as u32;
                if p <= start {
                    // fully host-side: the whole segment range
                    *v = (0, ones(sb) as u32);
                } else if p < end {
                    *v = clamp_to_prefix(v.0, v.1, (end - p) as u8);
                }
            }
        }
    }

    Ok(RangeAddr {
        fam,
        segs: vals
            .into_iter()
            .map(|(lo, hi)| SegVal::new(lo as u16, hi as u16))
            .collect(),
        prefix,
        zone: spec.zone.clone(),
        mixed: spec.mixed.is_some(),
    })
}

/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    fn addr(s: &str) -> RangeAddr {
        let opts = ParseOpts::default();
        match validate(s, &opts) {
            Ok(p) => match resolve_auto(&p, &opts) {
                Ok(Some(a)) => a,
                other => panic!("'{s}' did not resolve: {other:?}"),
            },
            Err(e) => panic!("'{s}' did not validate: {e}"),
        }
    }

    fn addr_err(s: &str) -> RangeError {
        let opts = ParseOpts::default();
        match validate(s, &opts) {
            Ok(p) => match resolve_auto(&p, &opts) {
                Err(e) => e,
                other => panic!("'{s}' should fail to resolve, got {other:?}"),
            },
            Err(e) => panic!("'{s}' did not validate: {e}"),
        }
    }

    #[test]
    fn test_prefix_subnet_expansion() {
        let a = addr("1.2.3.4/16");
        assert_eq!(a.prefix, Some(16));
        assert_eq!(a.lower(), 0x01020000);
        assert_eq!(a.upper(), 0x0102ffff);
        assert_eq!(a.count(), 65536);
        // /28 straddles the last octet
        let b = addr("1.2.3.4/28");
        assert_eq!(b.segs[3].lo, 0);
        assert_eq!(b.segs[3].hi, 15);
        assert_eq!(b.count(), 16);
    }

    #[test]
    fn test_prefix_equivalence() {
        assert_eq!(addr("1.2.3.4/16"), addr("1.2.*.*"));
        assert_eq!(addr("1.2.3.4/255.255.0.0"), addr("1.2.*.*"));
    }

    #[test]
    fn test_host_resolution() {
        let opts = ParseOpts::default();
        let p = validate("1.2.3.4/16", &opts).unwrap();
        let host = resolve_host(&p, &opts).unwrap().unwrap();
        assert_eq!(host.lower(), 0x01020304);
        assert_eq!(host.upper(), 0x01020304);
        assert_eq!(host.prefix, Some(16));
    }

    #[test]
    fn test_inet_aton_splits() {
        assert_eq!(addr("1.2.3").lower(), 0x01020003);
        assert_eq!(addr("1.2").lower(), 0x01000002);
        assert_eq!(addr("4294967295").lower(), 0xffffffff);
        // "1.*" covers the lower 24 bits entirely
        let a = addr("1.*");
        assert_eq!(a.lower(), 0x01000000);
        assert_eq!(a.upper(), 0x01ffffff);
        assert_eq!(a.segs.len(), 4);
    }

    #[test]
    fn test_non_contiguous_mask() {
        // 0.0.0.* AND 0.0.0.128 = {0, 128}: torn
        match addr_err("0.0.0.*/0.0.0.128") {
            RangeError::NonContiguous { seg } => assert_eq!(seg, 3),
            other => panic!("{other:?}"),
        }
        // 0.0.0.0-127 AND 0.0.0.128 collapses to one point
        let a = addr("0.0.0.0-127/0.0.0.128");
        assert_eq!(a.lower(), 0);
        assert_eq!(a.upper(), 0);
    }

    #[test]
    fn test_mixed_join() {
        let a = addr("::ffff:1.2.3.4");
        assert_eq!(a.segs[6], SegVal::new(0x0102, 0x0102));
        assert_eq!(a.segs[7], SegVal::new(0x0304, 0x0304));
        assert!(a.mixed);
        // a ranged third octet with a fixed fourth cannot re-pack
        match addr_err("::ffff:0.0.1-2.0") {
            RangeError::MixedJoin { seg } => assert_eq!(seg, 7),
            other => panic!("{other:?}"),
        }
        // ranged high octet over a full low octet is fine
        let b = addr("::ffff:1.2.3.*");
        assert_eq!(b.segs[7], SegVal::new(0x0300, 0x03ff));
    }

    #[test]
    fn test_reversed_renormalized() {
        let a = addr("1.2.3.20-10/32");
        assert_eq!(a.segs[3].lo, 10);
        assert_eq!(a.segs[3].hi, 20);
    }

    #[test]
    fn test_resolve_as_specials() {
        let opts = ParseOpts::default();
        let empty = validate("", &opts).unwrap();
        assert_eq!(resolve_as(&empty, IpFam::V4, &opts).unwrap().lower(), 0x7f000001);
        assert_eq!(resolve_as(&empty, IpFam::V6, &opts).unwrap().lower(), 1);
        assert!(resolve_auto(&empty, &opts).unwrap().is_none());

        let all = validate("*", &opts).unwrap();
        let a = resolve_as(&all, IpFam::V4, &opts).unwrap();
        assert_eq!(a.lower(), 0);
        assert_eq!(a.upper(), 0xffffffff);

        let pre = validate("/24", &opts).unwrap();
        let m = resolve_as(&pre, IpFam::V4, &opts).unwrap();
        assert_eq!(m.lower(), 0xffffff00);
        assert_eq!(m.prefix, Some(24));
        // /64 does not fit IPv4
        let pre64 = validate("/64", &opts).unwrap();
        match resolve_as(&pre64, IpFam::V4, &opts) {
            Err(RangeError::PrefixTooLong { prefix: 64, fam: IpFam::V4 }) => {}
            other => panic!("{other:?}"),
        }
        assert_eq!(
            resolve_as(&pre64, IpFam::V6, &opts).unwrap().lower(),
            0xffff_ffff_ffff_ffff_0000_0000_0000_0000
        );
    }

    #[test]
    fn test_wrong_version() {
        let opts = ParseOpts::default();
        let p = validate("1.2.3.4", &opts).unwrap();
        match resolve_as(&p, IpFam::V6, &opts) {
            Err(RangeError::WrongVersion { expected: IpFam::V6, actual: IpFam::V4 }) => {}
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_wide_split() {
        let a = addr("00aa00bb00cc00dd00ee00ff00aa00bb");
        assert_eq!(a.segs[0], SegVal::new(0xaa, 0xaa));
        assert_eq!(a.segs[7], SegVal::new(0xbb, 0xbb));
    }

    #[test]
    fn test_mask_wrong_seg_untouched() {
        // only the final segment is constrained by this mask
        let a = addr("1.2.3.*/255.255.255.0");
        assert_eq!(a.prefix, Some(24));
        assert_eq!(a.segs[3], SegVal::new(0, 255));
    }
}
