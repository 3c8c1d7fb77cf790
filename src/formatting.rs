// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure string renderings of a materialized [RangeAddr]. Every function
//! here is deterministic and side-effect free; the fallible forms return
//! [RangeError] when the value cannot carry the requested shape.

use crate::{
    masks::split_wide,
    strings::*,
    structs::{IpFam, RangeAddr, SegVal},
    RangeError,
};
use serde::{Deserialize, Serialize};

/// Radix selector for the inet_aton style renderings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum AtonRadix {
    Octal,
    Hex,
}

/// Render switches shared by the normalized/compressed/wildcard family.
#[derive(Clone, Copy)]
struct Style {
    /// zero-pad segment values to this width (0 = no padding)
    pad: usize,
    /// full-range segments as `*` instead of the numeric range
    star: bool,
    /// IPv6 zero-run compression with `::`
    compress: bool,
    /// render a parsed-mixed value with the dotted IPv4 tail
    mixed: bool,
    /// append `/n` when the value carries a prefix
    prefix: bool,
}

/// Fully expanded: no compression, ranges as `lower-upper`, wildcards
/// as the full numeric range.
pub(crate) fn normalized(a: &RangeAddr) -> String {
    render(a, Style { pad: 0, star: false, compress: false, mixed: true, prefix: true })
}

/// Canonical/compressed: the longest (leftmost on ties) run of zero
/// segments becomes `::`, exactly once.
pub(crate) fn compressed(a: &RangeAddr) -> String {
    render(a, Style { pad: 0, star: false, compress: true, mixed: true, prefix: true })
}

/// Every segment zero-padded to the radix maximum width, no compression.
pub(crate) fn full(a: &RangeAddr) -> String {
    let pad = match a.fam {
        IpFam::V4 => 3,
        IpFam::V6 => 4,
    };
    render(a, Style { pad, star: false, compress: false, mixed: false, prefix: true })
}

/// Full-range segments as `*`, partial ranges as `lower-upper`.
pub(crate) fn wildcarded(a: &RangeAddr) -> String {
    render(a, Style { pad: 0, star: true, compress: false, mixed: true, prefix: false })
}

/// [wildcarded] plus IPv6 zero-run compression.
pub(crate) fn canonical_wildcarded(a: &RangeAddr) -> String {
    render(a, Style { pad: 0, star: true, compress: true, mixed: true, prefix: false })
}

/**
`net/n` when the value is an exact prefix block (and not a lone host
written without a prefix), otherwise the wildcard notation.
*/
pub(crate) fn subnet(a: &RangeAddr) -> String {
    if a.is_single() && a.prefix.is_none() {
        return compressed(a);
    }
    match a.prefix_block_len() {
        Some(n) => {
            let net = RangeAddr {
                fam: a.fam,
                segs: a.segs.iter().map(|s| SegVal::new(s.lo, s.lo)).collect(),
                prefix: Some(n),
                zone: a.zone.clone(),
                mixed: false,
            };
            compressed(&net)
        }
        None => wildcarded(a),
    }
}

/**
SQL wildcards: whole-segment wildcards as `%`, digit-count widenings as
a digit prefix plus `_` per free position, other ranges as
`lower-upper`.
*/
pub(crate) fn sql_wildcarded(a: &RangeAddr) -> String {
    let base: u32 = match a.fam {
        IpFam::V4 => 10,
        IpFam::V6 => 16,
    };
    let max = a.fam.seg_max() as u16;
    let sep = seg_sep(a.fam);
    let maxd: u32 = match a.fam {
        IpFam::V4 => 3,
        IpFam::V6 => 4,
    };

    let mut parts: Vec<String> = Vec::with_capacity(a.segs.len());
    for s in &a.segs {
        if s.is_full(max) {
            parts.push(PERCENT.to_string());
        } else if s.is_single() {
            parts.push(fmt_val(s.lo, a.fam, 0));
        } else {
            parts.push(sql_seg(s, base, maxd, max, a.fam));
        }
    }
    parts.join(sep)
}

fn sql_seg(s: &SegVal, base: u32, maxd: u32, max: u16, fam: IpFam) -> String {
    for k in (1..maxd).rev() {
        let scale: u32 = base.pow(k);
        let lo = s.lo as u32;
        if lo % scale != 0 {
            continue;
        }
        let p = lo / scale;
        if p == 0 && k != 1 {
            continue;
        }
        let top = (lo + scale - 1).min(max as u32);
        if s.hi as u32 == top {
            let prefix = if p == 0 { String::new() } else { fmt_val(p as u16, fam, 0) };
            return format!("{}{}", prefix, USCORE.to_string().repeat(k as usize));
        }
    }
    format!("{}-{}", fmt_val(s.lo, fam, 0), fmt_val(s.hi, fam, 0))
}

/**
Reverse-DNS listing: octet-reversed `.in-addr.arpa` for IPv4 (ranges
allowed per octet), nibble-reversed `.ip6.arpa` for IPv6. An IPv6
segment must be single-valued or full-range; anything in between has no
nibble rendering.
*/
pub(crate) fn reverse_dns(a: &RangeAddr) -> Result<String, RangeError> {
    let max = a.fam.seg_max() as u16;
    let mut labels: Vec<String> = Vec::new();
    match a.fam {
        IpFam::V4 => {
            for s in a.segs.iter().rev() {
                if s.is_full(max) {
                    labels.push(STAR.to_string());
                } else if s.is_single() {
                    labels.push(s.lo.to_string());
                } else {
                    labels.push(format!("{}-{}", s.lo, s.hi));
                }
            }
            Ok(format!("{}{}", labels.join("."), REV_DNS_V4_SUFFIX))
        }
        IpFam::V6 => {
            for (i, s) in a.segs.iter().enumerate().rev() {
                if s.is_full(max) {
                    labels.extend(std::iter::repeat(STAR.to_string()).take(4));
                } else if s.is_single() {
                    for k in 0..4 {
                        labels.push(format!("{:x}", (s.lo >> (4 * k)) & 0xf));
                    }
                } else {
                    return Err(RangeError::NotSingleValued { seg: i });
                }
            }
            Ok(format!("{}{}", labels.join("."), REV_DNS_V6_SUFFIX))
        }
    }
}

/**
UNC host form: `-`-separated segment values with the
`.ipv6-literal.net` suffix, the zone appended after an `s` marker.
IPv4 values render as their plain dotted form.
*/
pub(crate) fn unc_host(a: &RangeAddr) -> Result<String, RangeError> {
    if a.fam == IpFam::V4 {
        return Ok(render(a, Style { pad: 0, star: false, compress: false, mixed: false, prefix: false }));
    }
    // '-' separates UNC segments, so ranged values cannot render
    if let Some(i) = a.segs.iter().position(|s| !s.is_single()) {
        return Err(RangeError::NotSingleValued { seg: i });
    }
    let body: Vec<String> = a.segs.iter().map(|s| format!("{:x}", s.lo)).collect();
    let mut out = body.join("-");
    if let Some(zone) = &a.zone {
        out.push(UNC_ZONE_MARK);
        out.push_str(zone);
    }
    out.push_str(UNC_SUFFIX);
    Ok(out)
}

/// RFC 1924 base-85 encoding of the full 128-bit value; defined only
/// for a single, non-ranged IPv6 value.
pub(crate) fn base85(a: &RangeAddr) -> Result<String, RangeError> {
    if a.fam != IpFam::V6 {
        return Err(RangeError::WrongVersion { expected: IpFam::V6, actual: a.fam });
    }
    if let Some(i) = a.segs.iter().position(|s| !s.is_single()) {
        return Err(RangeError::NotSingleValued { seg: i });
    }
    let mut v = a.lower();
    let mut out = [0u8; BASE85_LEN];
    for slot in out.iter_mut().rev() {
        *slot = BASE85_ALPHABET[(v % 85) as usize];
        v /= 85;
    }
    Ok(out.iter().map(|&b| b as char).collect())
}

/// The mixed rendering: compressed IPv6 head with the trailing 32 bits
/// as a dotted IPv4 quad.
pub(crate) fn mixed(a: &RangeAddr) -> Result<String, RangeError> {
    if a.fam != IpFam::V6 {
        return Err(RangeError::WrongVersion { expected: IpFam::V6, actual: a.fam });
    }
    let quad = quad_string(a, &Style { pad: 0, star: false, compress: true, mixed: true, prefix: true })
        .ok_or(RangeError::MixedJoin { seg: 6 })?;
    Ok(assemble_v6(a, &Style { pad: 0, star: false, compress: true, mixed: true, prefix: true }, Some(quad)))
}

/**
The whole address joined into one hex literal, `0x`-prefixed and
zero-padded (8 digits IPv4, 32 IPv6); a ranged value renders as
`lower-upper` and must be one contiguous interval.
*/
pub(crate) fn joined_hex(a: &RangeAddr) -> Result<String, RangeError> {
    let digits = match a.fam {
        IpFam::V4 => 8,
        IpFam::V6 => 32,
    };
    let (lo, hi) = joined_bounds(a)?;
    if lo == hi {
        Ok(format!("0x{:0digits$x}", lo))
    } else {
        Ok(format!("0x{:0digits$x}-0x{:0digits$x}", lo, hi))
    }
}

/// As [joined_hex], in octal with the `0` marker (11 digits IPv4, 43 IPv6).
pub(crate) fn joined_octal(a: &RangeAddr) -> Result<String, RangeError> {
    let digits = match a.fam {
        IpFam::V4 => 11,
        IpFam::V6 => 43,
    };
    let (lo, hi) = joined_bounds(a)?;
    if lo == hi {
        Ok(format!("0{:0digits$o}", lo))
    } else {
        Ok(format!("0{:0digits$o}-0{:0digits$o}", lo, hi))
    }
}

fn joined_bounds(a: &RangeAddr) -> Result<(u128, u128), RangeError> {
    if let Some(i) = first_non_sequential(a) {
        return Err(RangeError::NonContiguous { seg: i });
    }
    Ok((a.lower(), a.upper()))
}

fn first_non_sequential(a: &RangeAddr) -> Option<usize> {
    let max = a.fam.seg_max() as u16;
    let mut ranged = false;
    for (i, s) in a.segs.iter().enumerate() {
        if ranged && !s.is_full(max) {
            return Some(i);
        }
        ranged |= !s.is_single();
    }
    None
}

/**
inet_aton style IPv4 rendering with `parts` output segments (1 to 4):
the trailing segments are joined into one value of the requested radix.
Joining fails unless the joined set is one contiguous interval.
*/
pub(crate) fn inet_aton(a: &RangeAddr, radix: AtonRadix, parts: usize) -> Result<String, RangeError> {
    if a.fam != IpFam::V4 {
        return Err(RangeError::WrongVersion { expected: IpFam::V4, actual: a.fam });
    }
    let parts = parts.clamp(1, 4);
    if parts == 1 {
        return match radix {
            AtonRadix::Hex => joined_hex(a),
            AtonRadix::Octal => joined_octal(a),
        };
    }

    let mut fields: Vec<(u32, u32)> =
        a.segs[..parts - 1].iter().map(|s| (s.lo as u32, s.hi as u32)).collect();
    let tail = &a.segs[parts - 1..];
    let mut acc: (u32, u32) = (tail[0].lo as u32, tail[0].hi as u32);
    for (k, s) in tail.iter().enumerate().skip(1) {
        acc = crate::masks::join_fields(acc, (s.lo as u32, s.hi as u32), 8)
            .ok_or(RangeError::NonContiguous { seg: parts - 1 + k })?;
    }
    fields.push(acc);

    let fmt_one = |v: u32| match radix {
        AtonRadix::Hex => format!("0x{:x}", v),
        AtonRadix::Octal => format!("0{:o}", v),
    };
    let out: Vec<String> = fields
        .iter()
        .map(|&(lo, hi)| {
            if lo == hi {
                fmt_one(lo)
            } else {
                format!("{}-{}", fmt_one(lo), fmt_one(hi))
            }
        })
        .collect();
    Ok(out.join("."))
}

/* ---------------------------------- */

#[inline]
fn seg_sep(fam: IpFam) -> &'static str {
    match fam {
        IpFam::V4 => ".",
        IpFam::V6 => ":",
    }
}

fn fmt_val(v: u16, fam: IpFam, pad: usize) -> String {
    match fam {
        IpFam::V4 => format!("{:0pad$}", v),
        IpFam::V6 => format!("{:0pad$x}", v),
    }
}

fn seg_txt(s: &SegVal, fam: IpFam, style: &Style) -> String {
    let max = fam.seg_max() as u16;
    if style.star && s.is_full(max) {
        return STAR.to_string();
    }
    if s.is_single() {
        fmt_val(s.lo, fam, style.pad)
    } else {
        format!("{}-{}", fmt_val(s.lo, fam, style.pad), fmt_val(s.hi, fam, style.pad))
    }
}

/// The dotted IPv4 tail of a mixed value, if the trailing two segments
/// split back into octet ranges.
fn quad_string(a: &RangeAddr, style: &Style) -> Option<String> {
    let mut octets: Vec<SegVal> = Vec::with_capacity(4);
    for s in &a.segs[6..8] {
        let halves = split_wide(s.lo as u128, s.hi as u128, &[8, 8])?;
        octets.extend(halves.iter().map(|&(lo, hi)| SegVal::new(lo as u16, hi as u16)));
    }
    let sub = Style { pad: 0, ..*style };
    let parts: Vec<String> = octets.iter().map(|o| seg_txt(o, IpFam::V4, &sub)).collect();
    Some(parts.join("."))
}

fn render(a: &RangeAddr, style: Style) -> String {
    match a.fam {
        IpFam::V4 => {
            let parts: Vec<String> = a.segs.iter().map(|s| seg_txt(s, a.fam, &style)).collect();
            let mut out = parts.join(".");
            if style.prefix {
                if let Some(n) = a.prefix {
                    out.push(SLASH);
                    out.push_str(&n.to_string());
                }
            }
            out
        }
        IpFam::V6 => {
            let quad = if style.mixed && a.mixed { quad_string(a, &style) } else { None };
            assemble_v6(a, &style, quad)
        }
    }
}

fn assemble_v6(a: &RangeAddr, style: &Style, quad: Option<String>) -> String {
    let n: usize = if quad.is_some() { 6 } else { 8 };
    let parts: Vec<String> = a.segs[..n].iter().map(|s| seg_txt(s, IpFam::V6, style)).collect();

    let mut out = if style.compress {
        match longest_zero_run(&a.segs[..n]) {
            Some((start, end)) => {
                let mut right: Vec<String> = parts[end..].to_vec();
                if let Some(q) = &quad {
                    right.push(q.clone());
                }
                format!("{}{}{}", parts[..start].join(":"), COMPRESS, right.join(":"))
            }
            None => match &quad {
                Some(q) => format!("{}:{}", parts.join(":"), q),
                None => parts.join(":"),
            },
        }
    } else {
        match &quad {
            Some(q) => format!("{}:{}", parts.join(":"), q),
            None => parts.join(":"),
        }
    };

    if let Some(zone) = &a.zone {
        out.push(PERCENT);
        out.push_str(zone);
    }
    if style.prefix {
        if let Some(n) = a.prefix {
            out.push(SLASH);
            out.push_str(&n.to_string());
        }
    }
    out
}

/// Longest run of exactly-zero segments, leftmost on ties.
fn longest_zero_run(segs: &[SegVal]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut i = 0;
    while i < segs.len() {
        if segs[i].lo == 0 && segs[i].hi == 0 {
            let start = i;
            while i < segs.len() && segs[i].lo == 0 && segs[i].hi == 0 {
                i += 1;
            }
            if best.map(|(s, e)| i - start > e - s).unwrap_or(true) {
                best = Some((start, i));
            }
        } else {
            i += 1;
        }
    }
    best
}

/* -------------------------------------------------------------------------- */
