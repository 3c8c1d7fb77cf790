// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tokenizer/validator: classifies one trimmed address string into
//! a [Provider] or a [FormatError]. The grammar is deliberately
//! permissive; every extension is gated by [ParseOpts].

use crate::{
    masks::{family_prefix_max, mask_to_prefix, ones, v4_field_widths},
    options::ParseOpts,
    resolving,
    strings::*,
    structs::{AddrSpec, IpFam, Provider, Seg},
    FormatError, FormatErrorKind as K, IPV6_BITS,
};
use lazy_static::lazy_static;
use std::collections::HashMap;
use tracing::{debug, trace};

lazy_static! {
    /// RFC 1924 digit values keyed by alphabet character.
    static ref BASE85_INDEX: HashMap<char, u128> = {
        let mut m = HashMap::new();
        for (i, &b) in BASE85_ALPHABET.iter().enumerate() {
            m.insert(b as char, i as u128);
        }
        m
    };
}

/// Validate `text` (already trimmed) against `opts`.
pub(crate) fn validate(text: &str, opts: &ParseOpts) -> Result<Provider, FormatError> {
    trace!("validating address string '{text}'");

    if text.is_empty() {
        return if opts.allow_empty {
            Ok(Provider::Empty)
        } else {
            Err(FormatError::new(K::EmptyNotAllowed, 0))
        };
    }
    if text.len() == 1 && text.starts_with(STAR) {
        return if opts.allow_all {
            Ok(Provider::All)
        } else {
            Err(FormatError::new(K::AllNotAllowed, 0))
        };
    }
    if let Some(rest) = text.strip_prefix(SLASH) {
        if !opts.allow_prefix_only {
            return Err(FormatError::new(K::PrefixOnlyNotAllowed, 0));
        }
        let n = parse_prefix_value(rest, 1, IPV6_BITS as u32)?;
        return Ok(Provider::PrefixOnly(n as u8));
    }

    if text.contains(COLON) {
        validate_v6(text, opts)
    } else {
        validate_no_colon(text, opts)
    }
}

/**
Validate the digits of a prefix length. No sign, no leading zeros,
value at most `max` (the universal 128-bit ceiling, or the family
ceiling once a version is known).
*/
pub(crate) fn parse_prefix_value(s: &str, off: usize, max: u32) -> Result<u32, FormatError> {
    if s.is_empty() {
        return Err(FormatError::new(K::BadPrefix, off));
    }
    if s.len() > 1 && s.starts_with('0') {
        return Err(FormatError::new(K::BadPrefix, off));
    }
    for (i, c) in s.char_indices() {
        if !c.is_ascii_digit() {
            return Err(FormatError::new(K::BadPrefix, off + i));
        }
    }
    if s.len() > 3 {
        return Err(FormatError::new(K::OversizedPrefix(u32::MAX), off));
    }
    let n: u32 = s.parse().map_err(|_| FormatError::new(K::BadPrefix, off))?;
    if n > max {
        return Err(FormatError::new(K::OversizedPrefix(n), off));
    }
    Ok(n)
}

/* ---------------------------------- */

/// Split off the `/suffix` (prefix length or mask). At most one slash.
fn split_slash(text: &str) -> Result<(&str, Option<&str>), FormatError> {
    match text.split_once(SLASH) {
        None => Ok((text, None)),
        Some((addr, rest)) => {
            if let Some(i) = rest.find(SLASH) {
                return Err(FormatError::new(K::BadPrefix, addr.len() + 1 + i));
            }
            Ok((addr, Some(rest)))
        }
    }
}

/// Parse the `/suffix`: all digits make a prefix length, anything else
/// must be a plain mask literal of the same family. A mask equal to a
/// ones-then-zeros pattern is reduced to its prefix length here.
fn parse_suffix(
    suffix: Option<&str>,
    off: usize,
    fam: IpFam,
    opts: &ParseOpts,
) -> Result<(Option<u8>, Option<u128>), FormatError> {
    let s = match suffix {
        None => return Ok((None, None)),
        Some(s) => s,
    };
    if s.is_empty() {
        return Err(FormatError::new(K::BadPrefix, off));
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        let max = family_prefix_max(fam == IpFam::V4, opts.prefixes_beyond_size);
        let n = parse_prefix_value(s, off, max)?;
        return Ok((Some(n as u8), None));
    }
    if s.starts_with(DASH) {
        // a negative prefix length, not a mask
        return Err(FormatError::new(K::BadPrefix, off));
    }

    // a mask literal must not contain wildcards or ranges
    for (i, c) in s.char_indices() {
        if c == STAR || c == PERCENT || c == USCORE || c == DASH {
            return Err(FormatError::new(K::WildcardInMask, off + i));
        }
    }
    let spec = match validate(s, &opts.mask_opts()) {
        Ok(Provider::Addr(spec)) if spec.fam == fam => spec,
        Ok(_) => return Err(FormatError::new(K::BadMask, off)),
        Err(e) => return Err(FormatError::new(K::BadMask, off + e.at)),
    };
    let addr = resolving::materialize(&spec, true, opts)
        .map_err(|_| FormatError::new(K::BadMask, off))?;
    if !addr.is_single() {
        return Err(FormatError::new(K::BadMask, off));
    }

    let m = addr.lower();
    if let Some(n) = mask_to_prefix(fam.bits(), m) {
        debug!("mask '{s}' reduced to prefix length {n}");
        return Ok((Some(n), None));
    }
    Ok((None, Some(m)))
}

/* ---------------------------------- */

/// No `:` anywhere: IPv4, or an undelimited 128-bit token (32 hex
/// digits or 20 base-85 characters).
fn validate_no_colon(text: &str, opts: &ParseOpts) -> Result<Provider, FormatError> {
    let (addr, suffix) = split_slash(text)?;
    let suffix_off = addr.len() + 1;

    if !addr.contains(DOT) {
        if opts.allow_base85 && is_base85_token(addr) {
            return validate_base85(addr, suffix, suffix_off, opts);
        }
        if let Some((wlo, whi, ranged)) = parse_wide_hex(addr) {
            if !opts.allow_single_segment {
                return Err(FormatError::new(K::SingleSegmentNotAllowed, 0));
            }
            if ranged && !opts.range.range_ok() {
                return Err(FormatError::new(K::RangeNotAllowed, 0));
            }
            let (prefix, mask) = parse_suffix(suffix, suffix_off, IpFam::V6, opts)?;
            if wlo > whi && prefix.is_none() {
                return Err(FormatError::new(K::ReversedRange, 0));
            }
            return Ok(Provider::Addr(AddrSpec {
                fam: IpFam::V6,
                segs: Vec::new(),
                wide: Some((wlo, whi)),
                mixed: None,
                prefix,
                mask,
                zone: None,
                base85: false,
            }));
        }
    }

    validate_v4(addr, suffix, suffix_off, opts)
}

/// Exactly 20 characters, all from the RFC 1924 alphabet.
fn is_base85_token(s: &str) -> bool {
    s.chars().count() == BASE85_LEN && s.chars().all(|c| BASE85_INDEX.contains_key(&c))
}

fn validate_base85(
    addr: &str,
    suffix: Option<&str>,
    suffix_off: usize,
    opts: &ParseOpts,
) -> Result<Provider, FormatError> {
    let mut v: u128 = 0;
    for (i, c) in addr.char_indices() {
        let d = BASE85_INDEX
            .get(&c)
            .ok_or_else(|| FormatError::new(K::BadDigit { c, radix: 85 }, i))?;
        v = v
            .checked_mul(85)
            .and_then(|x| x.checked_add(*d))
            .ok_or_else(|| FormatError::new(K::SegmentTooLarge(u128::MAX), i))?;
    }
    let (prefix, mask) = parse_suffix(suffix, suffix_off, IpFam::V6, opts)?;
    Ok(Provider::Addr(AddrSpec {
        fam: IpFam::V6,
        segs: Vec::new(),
        wide: Some((v, v)),
        mixed: None,
        prefix,
        mask,
        zone: None,
        base85: true,
    }))
}

/// A 32-hex-digit token (optional `0x`), or a range of two of them,
/// is a full undelimited IPv6 value.
fn parse_wide_hex(s: &str) -> Option<(u128, u128, bool)> {
    fn hex128(t: &str) -> Option<u128> {
        let t = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")).unwrap_or(t);
        if t.len() != 32 || !t.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u128::from_str_radix(t, 16).ok()
    }
    if let Some(v) = hex128(s) {
        return Some((v, v, false));
    }
    if let Some((a, b)) = s.split_once(DASH) {
        if let (Some(x), Some(y)) = (hex128(a), hex128(b)) {
            return Some((x, y, true));
        }
    }
    None
}

/* ---------------------------------- */

fn validate_v4(
    addr: &str,
    suffix: Option<&str>,
    suffix_off: usize,
    opts: &ParseOpts,
) -> Result<Provider, FormatError> {
    let (prefix, mask) = parse_suffix(suffix, suffix_off, IpFam::V4, opts)?;

    let parts: Vec<&str> = addr.split(DOT).collect();
    if parts.len() > 4 {
        return Err(FormatError::new(K::WrongSegmentCount(parts.len()), 0));
    }
    if parts.len() == 1 && !opts.allow_single_segment {
        return Err(FormatError::new(K::SingleSegmentNotAllowed, 0));
    }
    if (2..=3).contains(&parts.len()) && !opts.inet_aton_joined {
        return Err(FormatError::new(K::WrongSegmentCount(parts.len()), 0));
    }

    let widths = v4_field_widths(parts.len());
    let mut segs: Vec<Seg> = Vec::with_capacity(parts.len());
    let mut off = 0usize;
    let mut reversed = false;
    for (i, part) in parts.iter().enumerate() {
        let seg = parse_seg(part, off, widths[i], IpFam::V4, opts)?;
        reversed |= seg.reversed;
        segs.push(seg);
        off += part.len() + 1;
    }
    if reversed && prefix.is_none() {
        return Err(FormatError::new(K::ReversedRange, 0));
    }

    Ok(Provider::Addr(AddrSpec {
        fam: IpFam::V4,
        segs,
        wide: None,
        mixed: None,
        prefix,
        mask,
        zone: None,
        base85: false,
    }))
}

/* ---------------------------------- */

fn validate_v6(text: &str, opts: &ParseOpts) -> Result<Provider, FormatError> {
    let (whole, suffix) = split_slash(text)?;
    let suffix_off = whole.len() + 1;

    // the first '%' ends the address proper and starts the zone
    let (addr, zone) = if opts.allow_zone {
        match whole.split_once(PERCENT) {
            Some((a, z)) => {
                if z.is_empty() {
                    return Err(FormatError::new(K::BadZone, a.len()));
                }
                (a, Some(z.to_string()))
            }
            None => (whole, None),
        }
    } else {
        (whole, None)
    };

    let (prefix, mask) = parse_suffix(suffix, suffix_off, IpFam::V6, opts)?;

    // mixed notation: a dotted quad after the last ':'
    let (head, quad) = match addr.rfind(COLON) {
        Some(ci) if addr[ci + 1..].contains(DOT) => {
            if !opts.allow_mixed {
                return Err(FormatError::new(K::MixedNotAllowed, ci + 1));
            }
            (&addr[..ci + 1], Some((&addr[ci + 1..], ci + 1)))
        }
        _ => (addr, None),
    };
    let limit: usize = if quad.is_some() { 6 } else { 8 };

    // normalize the head: keep a trailing "::", drop a lone ':'
    let body: &str = if quad.is_some() {
        if head == ":" {
            return Err(FormatError::new(K::EmptySegment, 0));
        }
        if head.ends_with(COMPRESS) {
            head
        } else {
            &head[..head.len() - 1]
        }
    } else {
        head
    };

    let cpos = compress_positions(body);
    if cpos.len() > 1 {
        return Err(FormatError::new(K::DoubleCompression, cpos[1]));
    }

    let max = IpFam::V6.seg_max();
    let segs: Vec<Seg> = if let Some(&pos) = cpos.first() {
        let lsegs = parse_v6_run(&body[..pos], 0, opts)?;
        let rsegs = parse_v6_run(&body[pos + 2..], pos + 2, opts)?;
        let explicit = lsegs.len() + rsegs.len();
        if explicit + 1 > limit {
            return Err(FormatError::new(K::WrongSegmentCount(explicit), 0));
        }
        let mut out = lsegs;
        out.extend(std::iter::repeat(Seg::value(0, 16, 0)).take(limit - explicit));
        out.extend(rsegs);
        out
    } else {
        let mut run = parse_v6_run(body, 0, opts)?;
        if run.len() > limit {
            return Err(FormatError::new(K::WrongSegmentCount(run.len()), 0));
        }
        if run.len() < limit {
            // a trailing '*' stretches over the missing segments
            let stretch = run
                .last()
                .map(|s| s.wildcard && s.lo == 0 && s.hi == max)
                .unwrap_or(false);
            if !stretch {
                return Err(FormatError::new(K::WrongSegmentCount(run.len()), 0));
            }
            while run.len() < limit {
                run.push(Seg::full(max));
            }
        }
        run
    };

    let mixed_segs: Option<Vec<Seg>> = match quad {
        None => None,
        Some((q, qoff)) => {
            let parts: Vec<&str> = q.split(DOT).collect();
            if parts.len() != 4 {
                return Err(FormatError::new(K::WrongSegmentCount(parts.len()), qoff));
            }
            let mut ms: Vec<Seg> = Vec::with_capacity(4);
            let mut o = qoff;
            for part in parts {
                ms.push(parse_seg(part, o, 8, IpFam::V4, opts)?);
                o += part.len() + 1;
            }
            Some(ms)
        }
    };

    let reversed = segs
        .iter()
        .chain(mixed_segs.iter().flatten())
        .any(|s| s.reversed);
    if reversed && prefix.is_none() {
        return Err(FormatError::new(K::ReversedRange, 0));
    }

    Ok(Provider::Addr(AddrSpec {
        fam: IpFam::V6,
        segs,
        wide: None,
        mixed: mixed_segs,
        prefix,
        mask,
        zone,
        base85: false,
    }))
}

/// Byte positions of every (possibly overlapping) `::` occurrence.
fn compress_positions(s: &str) -> Vec<usize> {
    let b = s.as_bytes();
    (0..b.len().saturating_sub(1))
        .filter(|&i| b[i] == b':' && b[i + 1] == b':')
        .collect()
}

fn parse_v6_run(s: &str, off: usize, opts: &ParseOpts) -> Result<Vec<Seg>, FormatError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    let mut out: Vec<Seg> = Vec::new();
    let mut o = off;
    for part in s.split(COLON) {
        if part.is_empty() {
            return Err(FormatError::new(K::EmptySegment, o));
        }
        out.push(parse_seg(part, o, 16, IpFam::V6, opts)?);
        o += part.len() + 1;
    }
    Ok(out)
}

/* ---------------------------------- */

/// One segment: a value, an `a-b` range (possibly open-ended), a `*`
/// or `%` wildcard, or a digit prefix widened with SQL underscores.
fn parse_seg(s: &str, off: usize, width: u8, fam: IpFam, opts: &ParseOpts) -> Result<Seg, FormatError> {
    if s.is_empty() {
        return Err(FormatError::new(K::EmptySegment, off));
    }
    let max: u32 = ones(width) as u32;

    // repeated stars collapse into one wildcard
    if s.bytes().all(|b| b == STAR as u8) {
        if !opts.range.wildcard_ok() {
            return Err(FormatError::new(K::WildcardNotAllowed, off));
        }
        return Ok(Seg::full(max));
    }
    if s.len() == 1 && s.starts_with(PERCENT) {
        // SQL whole-segment wildcard; as a zone marker '%' never gets here
        if !opts.range.wildcard_ok() {
            return Err(FormatError::new(K::WildcardNotAllowed, off));
        }
        return Ok(Seg::full(max));
    }
    if s.ends_with(USCORE) {
        return parse_sql_widened(s, off, width, fam, opts);
    }

    if let Some(di) = s.find(DASH) {
        if !opts.range.range_ok() {
            return Err(FormatError::new(K::RangeNotAllowed, off + di));
        }
        let (ls, rs) = (&s[..di], &s[di + 1..]);
        if ls.is_empty() && rs.is_empty() {
            return Err(FormatError::new(K::BadChar(DASH), off + di));
        }
        if rs.contains(DASH) {
            return Err(FormatError::new(K::BadChar(DASH), off + di + 1));
        }
        let (lo, lradix, lz) = if ls.is_empty() {
            (0, default_radix(fam), 0)
        } else {
            parse_value(ls, off, width, fam, opts)?
        };
        let (hi, rradix, _) = if rs.is_empty() {
            (max, lradix, 0)
        } else {
            parse_value(rs, off + di + 1, width, fam, opts)?
        };
        let radix = if ls.is_empty() { rradix } else { lradix };
        let mut seg = Seg::range(lo, hi, radix);
        seg.zeros = lz;
        return Ok(seg);
    }

    let (v, radix, zeros) = parse_value(s, off, width, fam, opts)?;
    Ok(Seg::value(v, radix, zeros))
}

#[inline]
fn default_radix(fam: IpFam) -> u32 {
    match fam {
        IpFam::V4 => 10,
        IpFam::V6 => 16,
    }
}

/// Maximum written digit count for a field of `width` bits.
fn max_digits(width: u8, radix: u32) -> usize {
    match radix {
        16 => (width as usize + 3) / 4,
        10 => match width {
            8 => 3,
            16 => 5,
            24 => 8,
            _ => 10,
        },
        8 => (width as usize + 2) / 3,
        _ => width as usize,
    }
}

/// A digit prefix plus `k` trailing underscores: each underscore frees
/// one written digit position (decimal for IPv4, hex for IPv6), the
/// upper bound clipped at the field maximum.
fn parse_sql_widened(
    s: &str,
    off: usize,
    width: u8,
    fam: IpFam,
    opts: &ParseOpts,
) -> Result<Seg, FormatError> {
    if !opts.range.wildcard_ok() {
        return Err(FormatError::new(K::WildcardNotAllowed, off));
    }
    let base: u32 = default_radix(fam);
    let max: u32 = ones(width) as u32;

    let k = s.bytes().rev().take_while(|&b| b == USCORE as u8).count();
    let p = &s[..s.len() - k];
    if p.len() + k > max_digits(width, base) {
        return Err(FormatError::new(K::WildcardWidth(p.len() + k), off));
    }

    let mut pv: u64 = 0;
    for (i, c) in p.char_indices() {
        let d = c
            .to_digit(base)
            .ok_or_else(|| FormatError::new(K::BadDigit { c, radix: base }, off + i))?;
        pv = pv * base as u64 + d as u64;
    }
    let scale: u64 = (base as u64).pow(k as u32);
    let lo: u64 = pv * scale;
    if lo > max as u64 {
        return Err(FormatError::new(K::SegmentTooLarge(lo as u128), off));
    }
    let hi: u64 = (lo + scale - 1).min(max as u64);

    Ok(Seg {
        lo: lo as u32,
        hi: hi as u32,
        radix: base,
        zeros: 0,
        wildcard: false,
        reversed: false,
    })
}

/**
One numeric value. IPv4 detects the radix from the prefix: `0x` hex,
`0b` binary, a leading zero octal when so configured, decimal
otherwise. IPv6 is always plain hex.

Returns (value, radix, extra leading zeros).
*/
fn parse_value(
    s: &str,
    off: usize,
    width: u8,
    fam: IpFam,
    opts: &ParseOpts,
) -> Result<(u32, u32, u8), FormatError> {
    let max: u32 = ones(width) as u32;
    let (digits, radix, doff): (&str, u32, usize) = match fam {
        IpFam::V6 => (s, 16, 0),
        IpFam::V4 => {
            if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                if !opts.inet_aton_hex {
                    return Err(FormatError::new(K::BadDigit { c: 'x', radix: 10 }, off + 1));
                }
                (rest, 16, 2)
            } else if let Some(rest) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
                (rest, 2, 2)
            } else if s.len() > 1 && s.starts_with('0') && opts.octal_leading_zeros {
                // the marker zero is consumed; the rest is octal
                (&s[1..], 8, 1)
            } else {
                (s, 10, 0)
            }
        }
    };
    if digits.is_empty() {
        return Err(FormatError::new(K::EmptySegment, off));
    }

    let mut zeros = digits.bytes().take_while(|&b| b == b'0').count();
    if zeros == digits.len() {
        zeros -= 1; // a lone (or all-zero) value has one significant zero
    }
    if zeros > 0 && !opts.allow_leading_zeros {
        return Err(FormatError::new(K::LeadingZeros, off + doff));
    }

    let maxd = max_digits(width, radix);
    if digits.len() - zeros > maxd {
        return Err(FormatError::new(K::SegmentTooLarge(u128::MAX), off));
    }
    if digits.len() > maxd && !opts.unlimited_leading_zeros {
        return Err(FormatError::new(K::LeadingZeros, off + doff));
    }

    let mut v: u128 = 0;
    for (i, c) in digits.char_indices() {
        let d = c
            .to_digit(radix)
            .ok_or_else(|| FormatError::new(K::BadDigit { c, radix }, off + doff + i))?;
        v = v * radix as u128 + d as u128;
    }
    if v > max as u128 {
        return Err(FormatError::new(K::SegmentTooLarge(v), off));
    }
    Ok((v as u32, radix, zeros as u8))
}

/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RangeOpts;

    fn ok(s: &str) -> Provider {
        match validate(s, &ParseOpts::default()) {
            Ok(p) => p,
            Err(e) => panic!("'{s}' should validate, got {e}"),
        }
    }

    fn fail(s: &str) -> FormatError {
        match validate(s, &ParseOpts::default()) {
            Ok(_) => panic!("'{s}' should not validate"),
            Err(e) => e,
        }
    }

    fn spec(s: &str) -> AddrSpec {
        match ok(s) {
            Provider::Addr(spec) => spec,
            other => panic!("'{s}' classified as {other:?}"),
        }
    }

    #[test]
    fn test_classification() {
        assert!(matches!(ok(""), Provider::Empty));
        assert!(matches!(ok("*"), Provider::All));
        assert!(matches!(ok("/64"), Provider::PrefixOnly(64)));
        assert!(matches!(ok("1.2.3.4"), Provider::Addr(_)));
        assert!(matches!(ok("::1"), Provider::Addr(_)));
    }

    #[test]
    fn test_gates() {
        let strict = ParseOpts {
            allow_empty: false,
            allow_all: false,
            allow_prefix_only: false,
            ..Default::default()
        };
        assert!(validate("", &strict).is_err());
        assert!(validate("*", &strict).is_err());
        assert!(validate("/64", &strict).is_err());
    }

    #[test]
    fn test_v4_basic() {
        let s = spec("1.2.3.4");
        assert_eq!(s.fam, IpFam::V4);
        assert_eq!(s.segs.len(), 4);
        assert_eq!((s.segs[3].lo, s.segs[3].hi), (4, 4));
        assert_eq!(s.prefix, None);
    }

    #[test]
    fn test_v4_inet_aton_counts() {
        assert_eq!(spec("1.2.3").segs.len(), 3);
        assert_eq!(spec("1.2").segs.len(), 2);
        assert_eq!(spec("4294967295").segs.len(), 1);
        assert!(matches!(fail("1.2.3.4.5").kind, K::WrongSegmentCount(5)));
    }

    #[test]
    fn test_v4_radixes() {
        let s = spec("0xa.11.013.11");
        assert_eq!(s.segs[0].lo, 10);
        assert_eq!(s.segs[0].radix, 16);
        // leading zero is decimal unless octal is enabled
        assert_eq!(s.segs[2].lo, 13);
        let octal = ParseOpts { octal_leading_zeros: true, ..Default::default() };
        match validate("0xa.11.013.11", &octal) {
            Ok(Provider::Addr(s)) => {
                assert_eq!(s.segs[2].lo, 11);
                assert_eq!(s.segs[2].radix, 8);
            }
            other => panic!("{other:?}"),
        }
        // binary segments
        assert_eq!(spec("0b101.0.0.1").segs[0].lo, 5);
    }

    #[test]
    fn test_v4_leading_zero_ambiguity() {
        assert_eq!(spec("010.010.010.010").segs[0].lo, 10);
        let octal = ParseOpts { octal_leading_zeros: true, ..Default::default() };
        match validate("010.010.010.010", &octal) {
            Ok(Provider::Addr(s)) => assert_eq!(s.segs[0].lo, 8),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_v4_ranges_and_wildcards() {
        let s = spec("1.2.*.10-20");
        assert!(s.segs[2].wildcard);
        assert_eq!((s.segs[2].lo, s.segs[2].hi), (0, 255));
        assert_eq!((s.segs[3].lo, s.segs[3].hi), (10, 20));
        // open ranges
        assert_eq!((spec("1.2.3.-20").segs[3].lo, spec("1.2.3.-20").segs[3].hi), (0, 20));
        assert_eq!((spec("1.2.3.20-").segs[3].lo, spec("1.2.3.20-").segs[3].hi), (20, 255));
        // SQL forms
        assert_eq!((spec("1.2.3.%").segs[3].lo, spec("1.2.3.%").segs[3].hi), (0, 255));
        assert_eq!((spec("1.2.3.25_").segs[3].lo, spec("1.2.3.25_").segs[3].hi), (250, 255));
        assert_eq!((spec("1.2.3.1__").segs[3].lo, spec("1.2.3.1__").segs[3].hi), (100, 199));
        assert!(matches!(fail("1.2.3.____").kind, K::WildcardWidth(4)));
    }

    #[test]
    fn test_range_gates() {
        let wc_only = ParseOpts { range: RangeOpts::WildcardOnly, ..Default::default() };
        assert!(validate("1.2.*.4", &wc_only).is_ok());
        assert!(validate("1.2.3-4.4", &wc_only).is_err());
        let none = ParseOpts { range: RangeOpts::NoRange, ..Default::default() };
        assert!(validate("1.2.*.4", &none).is_err());
        assert!(validate("1.2.3.4", &none).is_ok());
    }

    #[test]
    fn test_reversed_range_quirk() {
        // a downwards range is malformed on its own...
        assert!(matches!(fail("1.2.*.101-100").kind, K::ReversedRange));
        // ...but tolerated when the address carries a CIDR prefix
        let s = spec("1.2.*.101-100/24");
        assert!(s.segs[3].reversed);
        assert_eq!(s.prefix, Some(24));
    }

    #[test]
    fn test_prefix_errors() {
        assert!(matches!(fail("1.2.*.4/-1").kind, K::BadPrefix));
        assert!(matches!(fail("1.2.*.4/").kind, K::BadPrefix));
        assert!(matches!(fail("1.2.*.4/x").kind, K::BadMask));
        assert!(matches!(fail("1.2.*.4/33").kind, K::OversizedPrefix(33)));
        assert!(matches!(fail("1:2::1/129").kind, K::OversizedPrefix(129)));
        assert!(validate("1.2.*.4/1", &ParseOpts::default()).is_ok());
        let beyond = ParseOpts { prefixes_beyond_size: true, ..Default::default() };
        assert!(validate("1.2.3.4/40", &beyond).is_ok());
    }

    #[test]
    fn test_masks() {
        // a full mask literal reduces to its prefix length
        assert_eq!(spec("1.2.3.4/255.255.0.0").prefix, Some(16));
        assert_eq!(spec("1.2.3.4/255.255.0.0").mask, None);
        // a non-contiguous mask is kept literally
        let s = spec("0.0.0.0/0.0.0.128");
        assert_eq!(s.prefix, None);
        assert_eq!(s.mask, Some(128));
        // wildcards and ranges in masks are syntax errors
        assert!(matches!(fail("1.2.3.4/255.*.0.0").kind, K::WildcardInMask));
        assert!(matches!(fail("1.2.3.4/1-2.2.3.4").kind, K::WildcardInMask));
        assert!(matches!(fail("1:2::1/*:*").kind, K::WildcardInMask));
        // mask of the wrong family
        assert!(matches!(fail("1:2::1/1.2.3.4").kind, K::BadMask));
        assert!(matches!(fail("1.2.3.4/1::2").kind, K::BadMask));
        // an all-digit suffix is always a prefix length, never a mask
        assert!(matches!(fail("1.2.3.4/255").kind, K::OversizedPrefix(255)));
        assert_eq!(spec("1.2.3.4/0.0.0.255").mask, Some(255));
    }

    #[test]
    fn test_bad_chars() {
        assert!(matches!(fail("a.*.3.4").kind, K::BadDigit { c: 'a', radix: 10 }));
        assert!(matches!(fail("1.2.3.4x").kind, K::BadDigit { c: 'x', .. }));
        assert!(fail("1..3.4").kind == K::EmptySegment);
        assert!(matches!(fail("1.2.3.256").kind, K::SegmentTooLarge(256)));
        assert!(matches!(fail("1:2:3:4:5:6:7:10000").kind, K::SegmentTooLarge(_)));
    }

    #[test]
    fn test_v6_basic() {
        let s = spec("a:b:c:d:e:f:a:b");
        assert_eq!(s.fam, IpFam::V6);
        assert_eq!(s.segs.len(), 8);
        assert_eq!(s.segs[5].lo, 0xf);
    }

    #[test]
    fn test_v6_compression() {
        let s = spec("1::8");
        assert_eq!(s.segs.len(), 8);
        assert_eq!(s.segs[0].lo, 1);
        assert!(s.segs[1..7].iter().all(|g| g.lo == 0 && g.hi == 0));
        assert_eq!(s.segs[7].lo, 8);
        assert_eq!(spec("::").segs.iter().filter(|g| g.lo == 0).count(), 8);
        assert!(matches!(fail("1::2::3").kind, K::DoubleCompression));
        assert!(matches!(fail(":::").kind, K::DoubleCompression));
        assert!(matches!(fail("1:2:3").kind, K::WrongSegmentCount(3)));
        assert!(matches!(fail("1:2:3:4:5:6:7:8:9").kind, K::WrongSegmentCount(9)));
        assert!(matches!(fail("::1:2:3:4:5:6:7:8").kind, K::WrongSegmentCount(8)));
        assert!(fail(":1:2:3:4:5:6:7").kind == K::EmptySegment);
    }

    #[test]
    fn test_v6_trailing_star_stretch() {
        let s = spec("*:1:*");
        assert_eq!(s.segs.len(), 8);
        assert!(s.segs[0].wildcard && s.segs[7].wildcard);
        assert_eq!(s.segs[1].lo, 1);
        // repeated stars collapse
        assert!(spec("abcd:ef12:*:*:***:a:*:bbbb").segs[4].wildcard);
    }

    #[test]
    fn test_v6_zone() {
        let s = spec("fe80::1%eth0");
        assert_eq!(s.zone.as_deref(), Some("eth0"));
        let s = spec("fe80::1%eth0/64");
        assert_eq!(s.zone.as_deref(), Some("eth0"));
        assert_eq!(s.prefix, Some(64));
        assert!(matches!(fail("fe80::1%").kind, K::BadZone));
        // with zones disabled '%' is a wildcard
        let nozone = ParseOpts { allow_zone: false, ..Default::default() };
        match validate("fe80::%", &nozone) {
            Ok(Provider::Addr(s)) => assert_eq!(s.segs[7].hi, 0xffff),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_v6_mixed() {
        let s = spec("1:2:3:4:5:6:1.2.3.4");
        assert_eq!(s.segs.len(), 6);
        let quad = s.mixed.as_ref().map(|q| q.len());
        assert_eq!(quad, Some(4));
        assert!(spec("::1.2.3.4").mixed.is_some());
        assert!(spec("::ffff:1.2.3.4").mixed.is_some());
        assert!(fail("1:1:2:3:4:5:1.2.3.4.5").kind == K::WrongSegmentCount(5));
        assert!(fail("1:1:2:3:4:5:6:1.2.3.4").kind == K::WrongSegmentCount(7));
        let nomixed = ParseOpts { allow_mixed: false, ..Default::default() };
        assert!(validate("::1.2.3.4", &nomixed).is_err());
    }

    #[test]
    fn test_single_segment_v6() {
        let s = spec("00aa00bb00cc00dd00ee00ff00aa00bb");
        let v: u128 = 0x00aa00bb00cc00dd00ee00ff00aa00bb;
        assert_eq!(s.wide, Some((v, v)));
        let s = spec("0x00aa00bb00cc00dd00ee00ff00aa00bb");
        assert!(s.wide.is_some());
        let nosingle = ParseOpts { allow_single_segment: false, ..Default::default() };
        assert!(validate("00aa00bb00cc00dd00ee00ff00aa00bb", &nosingle).is_err());
    }

    #[test]
    fn test_base85() {
        let s = spec("4)+k&C#VzJ4br>0wv%Yp");
        assert!(s.base85);
        assert!(s.wide.is_some());
        // 20 decimal digits are a base-85 token too
        assert!(spec("00000000000000000002").base85);
        let no85 = ParseOpts { allow_base85: false, ..Default::default() };
        assert!(validate("4)+k&C#VzJ4br>0wv%Yp", &no85).is_err());
    }

    #[test]
    fn test_leading_zero_tolerance() {
        assert_eq!(spec("001.002.003.004").segs[0].zeros, 2);
        let noz = ParseOpts { allow_leading_zeros: false, ..Default::default() };
        assert!(validate("01.2.3.4", &noz).is_err());
        assert!(validate("1.2.3.4", &noz).is_ok());
        // padding beyond the field width needs the unlimited gate
        assert!(matches!(fail("0001.2.3.4").kind, K::LeadingZeros));
        let unlim = ParseOpts { unlimited_leading_zeros: true, ..Default::default() };
        assert!(validate("0001.2.3.4", &unlim).is_ok());
        assert!(validate("00000:0000:0:0:0:0:0:1", &unlim).is_ok());
        assert!(matches!(fail("00000:0000:0:0:0:0:0:1").kind, K::LeadingZeros));
    }
}
