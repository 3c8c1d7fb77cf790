// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [IpString] entry type: an immutable parsed address string with
//! lazy, compute-once validation and resolution.

use crate::{
    formatting::{self, AtonRadix},
    masks::mask_to_prefix,
    options::ParseOpts,
    resolving,
    strings::{SLASH, STAR},
    structs::{IpFam, Provider, RangeAddr, SegVal},
    validation, AddrError, FormatError, FormatErrorKind, IPV6_BITS,
};
use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

lazy_static! {
    /// The canonical empty address string (loopback once a version is supplied).
    pub static ref EMPTY_ADDRESS: IpString = IpString::new("");
    /// The canonical all-addresses wildcard string.
    pub static ref ALL_ADDRESSES: IpString = IpString::new("*");
}

/**
An immutable IP address string and its lazily computed interpretations.

Construction never fails and performs no work; validation runs at most
once per instance on first demand, with the classified [Provider] (or
the validation error) published through a compute-once cell. The same
applies to each resolved address value, so repeated queries replay the
cached outcome without recomputation, concurrently or not.

Equality and ordering follow the covered address set when both sides
are valid (a prefix carried by one side is not considered), and fall
back to the raw text otherwise.
*/
#[derive(Clone, Debug)]
pub struct IpString {
    text: String,
    opts: ParseOpts,
    provider: OnceCell<Result<Provider, FormatError>>,
    resolved: OnceCell<Result<Option<RangeAddr>, AddrError>>,
    resolved_v4: OnceCell<Result<RangeAddr, AddrError>>,
    resolved_v6: OnceCell<Result<RangeAddr, AddrError>>,
    host: OnceCell<Result<Option<RangeAddr>, AddrError>>,
}

impl IpString {
    /// Parse with the default (permissive) options. Never fails; all
    /// validation is deferred.
    pub fn new(addr: impl AsRef<str>) -> Self {
        Self::with_opts(addr, ParseOpts::default())
    }

    pub fn with_opts(addr: impl AsRef<str>, opts: ParseOpts) -> Self {
        IpString {
            text: addr.as_ref().trim().to_string(),
            opts,
            provider: OnceCell::new(),
            resolved: OnceCell::new(),
            resolved_v4: OnceCell::new(),
            resolved_v6: OnceCell::new(),
            host: OnceCell::new(),
        }
    }

    /// The (trimmed) original string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &ParseOpts {
        &self.opts
    }

    fn provider(&self) -> &Result<Provider, FormatError> {
        self.provider
            .get_or_init(|| validation::validate(&self.text, &self.opts))
    }

    /* ------------- validation ------------- */

    /// Validate, raising the classified [FormatError] for malformed text.
    pub fn validate(&self) -> Result<(), FormatError> {
        match self.provider() {
            Ok(_) => Ok(()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Validate and additionally require the given version. The
    /// version-ambiguous Empty/All/PrefixOnly forms satisfy either.
    pub fn validate_as(&self, fam: IpFam) -> Result<(), FormatError> {
        match self.provider() {
            Err(e) => Err(e.clone()),
            Ok(p) => match p.version() {
                Some(actual) if actual != fam => {
                    Err(FormatError::new(FormatErrorKind::WrongVersion(actual), 0))
                }
                _ => Ok(()),
            },
        }
    }

    /* ------------- predicates ------------- */

    pub fn is_valid(&self) -> bool {
        self.provider().is_ok()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.provider(), Ok(p) if p.is_empty())
    }

    pub fn is_all_addresses(&self) -> bool {
        matches!(self.provider(), Ok(p) if p.is_all())
    }

    pub fn is_prefix_only(&self) -> bool {
        matches!(self.provider(), Ok(p) if p.is_prefix_only())
    }

    pub fn is_ipv4(&self) -> bool {
        self.version() == Some(IpFam::V4)
    }

    pub fn is_ipv6(&self) -> bool {
        self.version() == Some(IpFam::V6)
    }

    pub fn is_mixed_ipv6(&self) -> bool {
        matches!(self.provider(), Ok(p) if p.is_mixed())
    }

    pub fn is_base85(&self) -> bool {
        matches!(self.provider(), Ok(p) if p.is_base85())
    }

    pub fn is_prefixed(&self) -> bool {
        self.prefix_len().is_some()
    }

    pub fn is_loopback(&self) -> bool {
        self.addr().map(|a| a.is_loopback()).unwrap_or(false)
    }

    pub fn is_zero(&self) -> bool {
        self.addr().map(|a| a.is_zero()).unwrap_or(false)
    }

    pub fn version(&self) -> Option<IpFam> {
        self.provider().as_ref().ok().and_then(Provider::version)
    }

    pub fn prefix_len(&self) -> Option<u8> {
        self.provider().as_ref().ok().and_then(Provider::prefix_len)
    }

    /* ------------- resolution ------------- */

    /**
    The materialized address value. `Ok(None)` for the valid but
    version-ambiguous forms (empty, `*`, `/n`); an error for malformed
    text or for values that do not reduce to contiguous ranges.
    */
    pub fn to_addr(&self) -> Result<Option<RangeAddr>, AddrError> {
        self.resolved
            .get_or_init(|| {
                let p = self
                    .provider()
                    .as_ref()
                    .map_err(|e| AddrError::Format(e.clone()))?;
                resolving::resolve_auto(p, &self.opts).map_err(AddrError::Range)
            })
            .clone()
    }

    /// The materialized value of the given version: loopback for the
    /// empty string, the full range for `*`, the network mask for `/n`.
    pub fn to_addr_as(&self, fam: IpFam) -> Result<RangeAddr, AddrError> {
        let cell = match fam {
            IpFam::V4 => &self.resolved_v4,
            IpFam::V6 => &self.resolved_v6,
        };
        cell.get_or_init(|| {
            let p = self
                .provider()
                .as_ref()
                .map_err(|e| AddrError::Format(e.clone()))?;
            resolving::resolve_as(p, fam, &self.opts).map_err(AddrError::Range)
        })
        .clone()
    }

    /// The literal host value, ignoring any mask or prefix-subnet
    /// expansion (the prefix itself is retained).
    pub fn to_host_addr(&self) -> Result<Option<RangeAddr>, AddrError> {
        self.host
            .get_or_init(|| {
                let p = self
                    .provider()
                    .as_ref()
                    .map_err(|e| AddrError::Format(e.clone()))?;
                resolving::resolve_host(p, &self.opts).map_err(AddrError::Range)
            })
            .clone()
    }

    /// Non-throwing [Self::to_addr]; the failure stays cached.
    pub fn addr(&self) -> Option<RangeAddr> {
        self.to_addr().ok().flatten()
    }

    /// Non-throwing [Self::to_addr_as].
    pub fn addr_as(&self, fam: IpFam) -> Option<RangeAddr> {
        self.to_addr_as(fam).ok()
    }

    /// Non-throwing [Self::to_host_addr].
    pub fn host_addr(&self) -> Option<RangeAddr> {
        self.to_host_addr().ok().flatten()
    }

    /// Number of addresses covered; 0 when there is no resolvable value.
    pub fn count(&self) -> u128 {
        self.addr().map(|a| a.count()).unwrap_or(0)
    }

    /* ------------- string forms ------------- */

    /// Fully expanded rendering; falls back to the original text for
    /// strings with no canonical form.
    pub fn to_normalized_string(&self) -> String {
        match self.provider() {
            Err(_) => self.text.clone(),
            Ok(Provider::Empty) => String::new(),
            Ok(Provider::All) => STAR.to_string(),
            Ok(Provider::PrefixOnly(n)) => prefix_string(*n),
            Ok(Provider::Addr(_)) => match self.to_addr() {
                Ok(Some(a)) => formatting::normalized(&a),
                _ => self.text.clone(),
            },
        }
    }

    fn form_with<F>(&self, f: F) -> Result<String, AddrError>
    where
        F: FnOnce(&RangeAddr) -> Result<String, crate::RangeError>,
    {
        let p = self
            .provider()
            .as_ref()
            .map_err(|e| AddrError::Format(e.clone()))?;
        match p {
            Provider::Empty => Ok(String::new()),
            Provider::All => Ok(STAR.to_string()),
            Provider::PrefixOnly(n) => Ok(prefix_string(*n)),
            Provider::Addr(_) => match self.to_addr()? {
                Some(a) => f(&a).map_err(AddrError::Range),
                None => unreachable!("an address provider resolves to a value"),
            },
        }
    }

    pub fn to_compressed_string(&self) -> Result<String, AddrError> {
        self.form_with(|a| Ok(formatting::compressed(a)))
    }

    pub fn to_full_string(&self) -> Result<String, AddrError> {
        self.form_with(|a| Ok(formatting::full(a)))
    }

    pub fn to_subnet_string(&self) -> Result<String, AddrError> {
        self.form_with(|a| Ok(formatting::subnet(a)))
    }

    pub fn to_wildcarded_string(&self) -> Result<String, AddrError> {
        self.form_with(|a| Ok(formatting::wildcarded(a)))
    }

    pub fn to_canonical_wildcard_string(&self) -> Result<String, AddrError> {
        self.form_with(|a| Ok(formatting::canonical_wildcarded(a)))
    }

    pub fn to_sql_wildcard_string(&self) -> Result<String, AddrError> {
        self.form_with(|a| Ok(formatting::sql_wildcarded(a)))
    }

    pub fn to_reverse_dns_string(&self) -> Result<String, AddrError> {
        self.form_with(formatting::reverse_dns)
    }

    pub fn to_unc_host_string(&self) -> Result<String, AddrError> {
        self.form_with(formatting::unc_host)
    }

    pub fn to_base85_string(&self) -> Result<String, AddrError> {
        self.form_with(formatting::base85)
    }

    pub fn to_mixed_string(&self) -> Result<String, AddrError> {
        self.form_with(formatting::mixed)
    }

    /// The whole value as one hex literal, e.g. `0x01020304`.
    pub fn to_hex_string(&self) -> Result<String, AddrError> {
        self.form_with(formatting::joined_hex)
    }

    /// The whole value as one octal literal, e.g. `000100401404`.
    pub fn to_octal_string(&self) -> Result<String, AddrError> {
        self.form_with(formatting::joined_octal)
    }

    /// inet_aton style rendering with 1 to 4 output segments.
    pub fn to_inet_aton_string(&self, radix: AtonRadix, parts: usize) -> Result<String, AddrError> {
        self.form_with(|a| formatting::inet_aton(a, radix, parts))
    }

    /// `/n` when this is a prefix-only string or a single value that is
    /// a valid network mask, e.g. `255.255.0.0` gives `/16`.
    pub fn to_prefix_len_string(&self) -> Option<String> {
        match self.provider().as_ref().ok()? {
            Provider::PrefixOnly(n) => Some(prefix_string(*n)),
            Provider::Addr(_) => {
                let host = self.host_addr()?;
                if !host.is_single() {
                    return None;
                }
                mask_to_prefix(host.fam.bits(), host.lower()).map(prefix_string)
            }
            _ => None,
        }
    }

    /* ------------- prefix adjustment ------------- */

    /**
    Move the prefix boundary to the next (`forward`) or previous
    segment boundary, returning the network-truncated result. Moving
    backward from `/0` collapses to [struct@ALL_ADDRESSES]. A
    prefix-only string steps on 8-bit boundaries under the 128-bit
    ceiling.
    */
    pub fn adjust_prefix_by_segment(&self, forward: bool) -> Option<IpString> {
        match self.provider().as_ref().ok()? {
            Provider::PrefixOnly(n) => {
                let new = step_prefix(*n as i32, 8, IPV6_BITS as i32, forward);
                Some(IpString::with_opts(prefix_string(new as u8), self.opts.clone()))
            }
            Provider::Addr(_) => {
                let addr = self.addr()?;
                let bits = addr.fam.bits() as i32;
                let base = addr.prefix.unwrap_or(addr.fam.bits()) as i32;
                if !forward && base == 0 {
                    return Some(ALL_ADDRESSES.clone());
                }
                let new = step_prefix(base, addr.fam.seg_bits() as i32, bits, forward);
                self.with_new_prefix(new as u8, true)
            }
            _ => None,
        }
    }

    /**
    Move the prefix boundary by an arbitrary bit delta, clamped to
    `[0, bits]`. Below zero collapses to [struct@ALL_ADDRESSES]; past the
    address size the unmasked host remains, without a prefix.
    */
    pub fn adjust_prefix_len(&self, delta: i32) -> Option<IpString> {
        match self.provider().as_ref().ok()? {
            Provider::PrefixOnly(n) => {
                let new = (*n as i32 + delta).clamp(0, IPV6_BITS as i32);
                Some(IpString::with_opts(prefix_string(new as u8), self.opts.clone()))
            }
            Provider::Addr(_) => {
                if delta == 0 {
                    return Some(self.clone());
                }
                let addr = self.addr()?;
                let bits = addr.fam.bits() as i32;
                let base = addr.prefix.unwrap_or(addr.fam.bits()) as i32;
                if base + delta < 0 {
                    return Some(ALL_ADDRESSES.clone());
                }
                if base + delta > bits {
                    return self.with_new_prefix(bits as u8, false);
                }
                self.with_new_prefix((base + delta) as u8, true)
            }
            _ => None,
        }
    }

    /// The host value truncated to `new` network bits, rendered
    /// canonically (with the `/new` suffix unless `with_suffix` is off)
    /// and reparsed under the same options.
    fn with_new_prefix(&self, new: u8, with_suffix: bool) -> Option<IpString> {
        let host = self.host_addr()?;
        let sb = host.fam.seg_bits() as u32;
        let mut segs: Vec<SegVal> = Vec::with_capacity(host.segs.len());
        for (i, s) in host.segs.iter().enumerate() {
            let start = i as u32 * sb;
            let end = start + sb;
            let p = new as u32;
            let (lo, hi) = if p <= start {
                (0, 0)
            } else if p >= end {
                (s.lo, s.hi)
            } else {
                let hm = crate::masks::ones((end - p) as u8) as u16;
                (s.lo & !hm, s.hi & !hm)
            };
            segs.push(SegVal::new(lo, hi));
        }
        let truncated = RangeAddr {
            fam: host.fam,
            segs,
            prefix: if with_suffix { Some(new) } else { None },
            zone: host.zone.clone(),
            mixed: false,
        };
        Some(IpString::with_opts(
            formatting::compressed(&truncated),
            self.opts.clone(),
        ))
    }

    /* ------------- comparison key ------------- */

    fn cmp_key(&self) -> Option<(u8, u8, u8, Vec<SegVal>, Option<String>)> {
        let p = self.provider().as_ref().ok()?;
        Some(match p {
            Provider::Empty => (0, 0, 0, Vec::new(), None),
            Provider::All => (1, 0, 0, Vec::new(), None),
            Provider::PrefixOnly(n) => (2, 0, *n, Vec::new(), None),
            Provider::Addr(_) => {
                let a = self.addr()?;
                let famr = match a.fam {
                    IpFam::V4 => 1,
                    IpFam::V6 => 2,
                };
                (3, famr, 0, a.segs, a.zone)
            }
        })
    }
}

/// Validate a standalone prefix length string (digits only, no slash)
/// against the given version, or the 128-bit ceiling when unknown.
pub fn validate_prefix(fam: Option<IpFam>, s: &str) -> Result<u8, FormatError> {
    let max = fam.map(|f| f.bits()).unwrap_or(IPV6_BITS) as u32;
    validation::parse_prefix_value(s, 0, max).map(|n| n as u8)
}

#[inline]
fn prefix_string(n: u8) -> String {
    format!("{SLASH}{n}")
}

/// Prefix stepping: forward rounds up to the next multiple of
/// `seg_bits`, backward to the previous one (strictly smaller).
fn step_prefix(base: i32, seg_bits: i32, max: i32, forward: bool) -> i32 {
    if forward {
        (base + seg_bits - base.rem_euclid(seg_bits)).min(max)
    } else {
        (base - ((base - 1).rem_euclid(seg_bits) + 1)).max(0)
    }
}

/* ---------------------------------- */

impl fmt::Display for IpString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Default for IpString {
    fn default() -> Self {
        IpString::new("")
    }
}

impl From<&str> for IpString {
    fn from(s: &str) -> Self {
        IpString::new(s)
    }
}

impl From<String> for IpString {
    fn from(s: String) -> Self {
        IpString::new(s)
    }
}

impl PartialEq for IpString {
    fn eq(&self, other: &Self) -> bool {
        match (self.cmp_key(), other.cmp_key()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.text == other.text,
            _ => false,
        }
    }
}

impl Eq for IpString {}

impl Hash for IpString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.cmp_key() {
            Some(key) => {
                1u8.hash(state);
                key.hash(state);
            }
            None => {
                0u8.hash(state);
                self.text.hash(state);
            }
        }
    }
}

impl Ord for IpString {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.cmp_key(), other.cmp_key()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (None, None) => self.text.cmp(&other.text),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for IpString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/* -------------------------------------------------------------------------- */
