// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{formatting, IPV4_BITS, IPV4_SEGS, IPV6_BITS, IPV6_SEGS};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

/// IP address family
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum IpFam {
    V4,
    V6,
}

impl IpFam {
    pub fn bits(&self) -> u8 {
        match self {
            IpFam::V4 => IPV4_BITS,
            IpFam::V6 => IPV6_BITS,
        }
    }

    pub fn seg_count(&self) -> usize {
        match self {
            IpFam::V4 => IPV4_SEGS,
            IpFam::V6 => IPV6_SEGS,
        }
    }

    /// Bits per segment: an octet for IPv4, a 16-bit group for IPv6.
    pub fn seg_bits(&self) -> u8 {
        match self {
            IpFam::V4 => 8,
            IpFam::V6 => 16,
        }
    }

    pub fn seg_max(&self) -> u32 {
        match self {
            IpFam::V4 => 0xff,
            IpFam::V6 => 0xffff,
        }
    }
}

impl fmt::Display for IpFam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFam::V4 => write!(f, "IPv4"),
            IpFam::V6 => write!(f, "IPv6"),
        }
    }
}

/* -------------------------------------------------------------------------- */

/**
One parsed (pre-materialization) segment: a value range in the radix it
was written in. `lo > hi` is only possible with `reversed` set, which
the validator tolerates when the whole string carries a CIDR prefix;
the materializer swaps the bounds.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Seg {
    pub lo: u32,
    pub hi: u32,
    /// 2, 8, 10 or 16
    pub radix: u32,
    /// leading zeros as written
    pub zeros: u8,
    pub wildcard: bool,
    pub reversed: bool,
}

impl Seg {
    pub fn value(v: u32, radix: u32, zeros: u8) -> Self {
        Seg { lo: v, hi: v, radix, zeros, wildcard: false, reversed: false }
    }

    pub fn range(lo: u32, hi: u32, radix: u32) -> Self {
        Seg { lo, hi, radix, zeros: 0, wildcard: false, reversed: lo > hi }
    }

    pub fn full(max: u32) -> Self {
        Seg { lo: 0, hi: max, radix: 10, zeros: 0, wildcard: true, reversed: false }
    }

    /// Bounds in ascending order (reversed ranges renormalized).
    pub fn ordered(&self) -> (u32, u32) {
        if self.lo <= self.hi {
            (self.lo, self.hi)
        } else {
            (self.hi, self.lo)
        }
    }
}

/* -------------------------------------------------------------------------- */

/// The classified result of validating one address string. Exactly one
/// variant is ever computed per string; the memoized cell in
/// [IpString](crate::IpString) holds either this or the validation error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Provider {
    /// the empty string (loopback once a version is supplied)
    Empty,
    /// the lone `*`, all addresses of both versions
    All,
    /// `/n` with no address part
    PrefixOnly(u8),
    /// a version-specific address, possibly ranged/prefixed/masked
    Addr(AddrSpec),
}

/// Payload of [Provider::Addr].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddrSpec {
    pub(crate) fam: IpFam,
    /// as-supplied segments; for IPv4 fewer than 4 means inet_aton
    /// shortcuts, for IPv6 always 8 (or 6 with a mixed tail)
    pub(crate) segs: Vec<Seg>,
    /// an undelimited 128-bit value (32-digit hex or base 85)
    pub(crate) wide: Option<(u128, u128)>,
    /// trailing IPv4 quad of a mixed IPv6 address
    pub(crate) mixed: Option<Vec<Seg>>,
    pub(crate) prefix: Option<u8>,
    /// an explicit mask that did not reduce to a prefix length
    pub(crate) mask: Option<u128>,
    pub(crate) zone: Option<String>,
    pub(crate) base85: bool,
}

impl Provider {
    pub fn version(&self) -> Option<IpFam> {
        match self {
            Provider::Addr(spec) => Some(spec.fam),
            _ => None,
        }
    }

    pub fn prefix_len(&self) -> Option<u8> {
        match self {
            Provider::PrefixOnly(n) => Some(*n),
            Provider::Addr(spec) => spec.prefix,
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Provider::Empty)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Provider::All)
    }

    pub fn is_prefix_only(&self) -> bool {
        matches!(self, Provider::PrefixOnly(_))
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Provider::Addr(spec) if spec.mixed.is_some())
    }

    pub fn is_base85(&self) -> bool {
        matches!(self, Provider::Addr(spec) if spec.base85)
    }
}

/* -------------------------------------------------------------------------- */

/// One materialized segment: a single contiguous value interval.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SegVal {
    pub lo: u16,
    /// inclusive
    pub hi: u16,
}

impl SegVal {
    pub fn new(lo: u16, hi: u16) -> Self {
        debug_assert!(lo <= hi);
        SegVal { lo, hi }
    }

    pub fn is_single(&self) -> bool {
        self.lo == self.hi
    }

    pub fn is_full(&self, max: u16) -> bool {
        self.lo == 0 && self.hi == max
    }

    /// Number of values covered.
    pub fn span(&self) -> u32 {
        (self.hi - self.lo) as u32 + 1
    }
}

/**
A materialized range address: 4 or 8 contiguous per-segment intervals,
with the optional prefix length and zone the string carried.

Equality, ordering and hashing consider only the address set (family,
segment intervals, zone) - a prefixed block equals the equivalent
wildcard form, e.g. `1.2.3.4/16` == `1.2.*.*`.
*/
#[derive(Clone, Debug)]
pub struct RangeAddr {
    pub fam: IpFam,
    pub segs: Vec<SegVal>,
    pub prefix: Option<u8>,
    pub zone: Option<String>,
    /// parsed from (or renders to) the mixed IPv6/IPv4 notation
    pub mixed: bool,
}

impl RangeAddr {
    /// Lowest covered address as an integer.
    pub fn lower(&self) -> u128 {
        let sb = self.fam.seg_bits();
        self.segs.iter().fold(0u128, |acc, s| (acc << sb) | s.lo as u128)
    }

    /// Highest covered address as an integer.
    pub fn upper(&self) -> u128 {
        let sb = self.fam.seg_bits();
        self.segs.iter().fold(0u128, |acc, s| (acc << sb) | s.hi as u128)
    }

    /// Number of addresses covered (the product of the segment spans).
    /// Cannot be an [usize] due to IPv6. Saturating.
    pub fn count(&self) -> u128 {
        let mut n: u128 = 1;
        for s in &self.segs {
            n = n.saturating_mul(s.span() as u128);
        }
        n
    }

    pub fn is_single(&self) -> bool {
        self.segs.iter().all(SegVal::is_single)
    }

    pub fn is_zero(&self) -> bool {
        self.segs.iter().all(|s| s.lo == 0 && s.hi == 0)
    }

    pub fn is_loopback(&self) -> bool {
        self.to_ip_addr().map(|ip| ip.is_loopback()).unwrap_or(false)
    }

    /**
    Whether the covered set is one contiguous interval `[lower, upper]`.

    The segments form a cartesian product, so this holds exactly when
    every segment after the first ranged one covers its full domain.
    */
    pub fn is_sequential(&self) -> bool {
        let max = self.fam.seg_max() as u16;
        let mut ranged = false;
        for s in &self.segs {
            if ranged && !s.is_full(max) {
                return false;
            }
            ranged |= !s.is_single();
        }
        true
    }

    /**
    The prefix length `n` for which this value is exactly the block
    `net/n`, if there is one. This ignores the prefix the string was
    written with; `1.2.*.*` yields `Some(16)` just like `1.2.0.0/16`.
    */
    pub fn prefix_block_len(&self) -> Option<u8> {
        if !self.is_sequential() {
            return None;
        }
        let bits = self.fam.bits();
        let (lo, hi) = (self.lower(), self.upper());
        let all: u128 = if bits == IPV6_BITS { u128::MAX } else { (1u128 << bits) - 1 };
        if lo == 0 && hi == all {
            return Some(0);
        }
        let span: u128 = hi - lo + 1;
        if !span.is_power_of_two() || lo & (span - 1) != 0 {
            return None;
        }
        Some(bits - span.trailing_zeros() as u8)
    }

    /// The single [IpAddr] this value covers, if it covers exactly one.
    pub fn to_ip_addr(&self) -> Option<IpAddr> {
        if !self.is_single() {
            return None;
        }
        Some(int_to_ip(self.fam, self.lower()))
    }

    /// The equivalent [IpNet] when this value is an exact prefix block.
    pub fn to_ip_net(&self) -> Option<IpNet> {
        let prefix = self.prefix_block_len()?;
        match int_to_ip(self.fam, self.lower()) {
            IpAddr::V4(a) => Ipv4Net::new(a, prefix).ok().map(IpNet::V4),
            IpAddr::V6(a) => Ipv6Net::new(a, prefix).ok().map(IpNet::V6),
        }
    }

    /**
    Returns an iterator over every [IpAddr] covered, in ascending order.

    NOTE: ranged IPv6 values can cover astronomically many addresses.
    Use with caution. You have been warned.
    */
    pub fn iter(&self) -> AddrIter {
        AddrIter::new(self)
    }
}

impl fmt::Display for RangeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", formatting::normalized(self))
    }
}

impl PartialEq for RangeAddr {
    fn eq(&self, other: &Self) -> bool {
        self.fam == other.fam && self.segs == other.segs && self.zone == other.zone
    }
}

impl Eq for RangeAddr {}

impl Hash for RangeAddr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fam.hash(state);
        self.segs.hash(state);
        self.zone.hash(state);
    }
}

impl Ord for RangeAddr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fam
            .cmp(&other.fam)
            .then_with(|| self.lower().cmp(&other.lower()))
            .then_with(|| self.upper().cmp(&other.upper()))
            .then_with(|| self.segs.cmp(&other.segs))
            .then_with(|| self.zone.cmp(&other.zone))
    }
}

impl PartialOrd for RangeAddr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub(crate) fn int_to_ip(fam: IpFam, v: u128) -> IpAddr {
    match fam {
        IpFam::V4 => IpAddr::V4(Ipv4Addr::from(v as u32)),
        IpFam::V6 => IpAddr::V6(Ipv6Addr::from(v)),
    }
}

/* ---------------------------------- */

/// Iterator over every address covered by a [RangeAddr].
pub struct AddrIter {
    fam: IpFam,
    segs: Vec<SegVal>,
    cur: Vec<u16>,
    done: bool,
}

impl AddrIter {
    fn new(addr: &RangeAddr) -> Self {
        AddrIter {
            fam: addr.fam,
            cur: addr.segs.iter().map(|s| s.lo).collect(),
            segs: addr.segs.clone(),
            done: false,
        }
    }
}

impl Iterator for AddrIter {
    type Item = IpAddr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let sb = self.fam.seg_bits();
        let v: u128 = self.cur.iter().fold(0u128, |acc, &s| (acc << sb) | s as u128);
        let ip: IpAddr = int_to_ip(self.fam, v);

        // odometer step, rightmost segment fastest
        let mut i = self.segs.len();
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.cur[i] < self.segs[i].hi {
                self.cur[i] += 1;
                for j in i + 1..self.segs.len() {
                    self.cur[j] = self.segs[j].lo;
                }
                break;
            }
        }

        Some(ip)
    }
}

impl IntoIterator for &RangeAddr {
    type Item = IpAddr;
    type IntoIter = AddrIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(segs: [(u16, u16); 4], prefix: Option<u8>) -> RangeAddr {
        RangeAddr {
            fam: IpFam::V4,
            segs: segs.iter().map(|&(lo, hi)| SegVal::new(lo, hi)).collect(),
            prefix,
            zone: None,
            mixed: false,
        }
    }

    #[test]
    fn test_lower_upper_count() {
        let a = v4([(1, 1), (2, 2), (0, 255), (0, 255)], Some(16));
        assert_eq!(a.lower(), 0x01020000);
        assert_eq!(a.upper(), 0x0102ffff);
        assert_eq!(a.count(), 65536);
    }

    #[test]
    fn test_eq_ignores_prefix() {
        let a = v4([(1, 1), (2, 2), (0, 255), (0, 255)], Some(16));
        let b = v4([(1, 1), (2, 2), (0, 255), (0, 255)], None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequential() {
        assert!(v4([(1, 1), (2, 2), (0, 255), (0, 255)], None).is_sequential());
        assert!(!v4([(1, 1), (2, 3), (0, 255), (4, 4)], None).is_sequential());
        // a single trailing range is fine
        assert!(v4([(1, 1), (2, 2), (3, 3), (10, 20)], None).is_sequential());
    }

    #[test]
    fn test_prefix_block_len() {
        assert_eq!(v4([(1, 1), (2, 2), (0, 255), (0, 255)], None).prefix_block_len(), Some(16));
        assert_eq!(v4([(1, 1), (2, 2), (3, 3), (4, 4)], None).prefix_block_len(), Some(32));
        assert_eq!(v4([(1, 1), (2, 2), (3, 3), (4, 7)], None).prefix_block_len(), Some(30));
        // not aligned
        assert_eq!(v4([(1, 1), (2, 2), (3, 3), (1, 4)], None).prefix_block_len(), None);
        let all = v4([(0, 255), (0, 255), (0, 255), (0, 255)], None);
        assert_eq!(all.prefix_block_len(), Some(0));
    }

    #[test]
    fn test_to_ip_net() {
        let a = v4([(10, 10), (0, 255), (0, 255), (0, 255)], Some(8));
        assert_eq!(a.to_ip_net().unwrap().to_string(), "10.0.0.0/8");
        assert!(v4([(10, 10), (0, 0), (0, 0), (1, 3)], None).to_ip_net().is_none());
    }

    #[test]
    fn test_iter_order_and_bounds() {
        let a = v4([(10, 10), (0, 0), (1, 2), (254, 255)], None);
        let ips: Vec<IpAddr> = a.iter().collect();
        assert_eq!(ips.len() as u128, a.count());
        assert_eq!(ips[0], int_to_ip(IpFam::V4, a.lower()));
        assert_eq!(ips[ips.len() - 1], int_to_ip(IpFam::V4, a.upper()));
        // odometer order: rightmost varies fastest
        assert_eq!(ips[1], "10.0.1.255".parse::<IpAddr>().unwrap());
        assert_eq!(ips[2], "10.0.2.254".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_v6_full_range_count_saturates() {
        let a = RangeAddr {
            fam: IpFam::V6,
            segs: vec![SegVal::new(0, 0xffff); 8],
            prefix: None,
            zone: None,
            mixed: false,
        };
        assert_eq!(a.count(), u128::MAX);
        assert_eq!(a.prefix_block_len(), Some(0));
    }
}
