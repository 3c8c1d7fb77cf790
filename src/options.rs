// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

/// Which range notations are accepted inside segments.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum RangeOpts {
    /// only plain single-valued segments
    NoRange,
    /// `*`, `%` and `_` wildcards, but no explicit `a-b` ranges
    WildcardOnly,
    /// wildcards and explicit `a-b` ranges
    #[default]
    WildcardAndRange,
}

impl RangeOpts {
    pub(crate) fn wildcard_ok(&self) -> bool {
        !matches!(self, RangeOpts::NoRange)
    }

    pub(crate) fn range_ok(&self) -> bool {
        matches!(self, RangeOpts::WildcardAndRange)
    }
}

/**
Options controlling which grammar extensions the validator accepts.

The defaults are permissive: everything is on except octal
interpretation of leading-zero IPv4 segments (`010.0.0.1` reads as
decimal 10 by default), unlimited zero padding, and prefix lengths
beyond the address size.

Plain struct-update syntax is the intended way to deviate:
```ignore
let opts = ParseOpts { allow_all: false, ..Default::default() };
```
*/
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParseOpts {
    /// "" is accepted (resolving to the loopback when given a version)
    pub allow_empty: bool,
    /// the lone `*` token covering all IPv4 and IPv6 addresses
    pub allow_all: bool,
    pub range: RangeOpts,
    /// tolerate more leading zeros than the value needs
    pub allow_leading_zeros: bool,
    /// inet_aton style: a leading zero makes an IPv4 segment octal
    pub octal_leading_zeros: bool,
    /// tolerate zero padding beyond the segment width
    pub unlimited_leading_zeros: bool,
    /// `/24` with no address part
    pub allow_prefix_only: bool,
    /// IPv4 prefix lengths above 32 (clamped when applied)
    pub prefixes_beyond_size: bool,
    /// IPv6 `%zone` suffixes; when off, `%` is an SQL wildcard instead
    pub allow_zone: bool,
    /// RFC 1924 base-85 IPv6 strings
    pub allow_base85: bool,
    /// undelimited single-segment forms (`4294967295`, 32 hex digits)
    pub allow_single_segment: bool,
    /// inet_aton 2- and 3-segment IPv4 shortcuts
    pub inet_aton_joined: bool,
    /// inet_aton `0x` hex IPv4 segments
    pub inet_aton_hex: bool,
    /// IPv6 with an embedded trailing IPv4 quad
    pub allow_mixed: bool,
}

impl Default for ParseOpts {
    fn default() -> Self {
        Self {
            allow_empty: true,
            allow_all: true,
            range: RangeOpts::WildcardAndRange,
            allow_leading_zeros: true,
            octal_leading_zeros: false,
            unlimited_leading_zeros: false,
            allow_prefix_only: true,
            prefixes_beyond_size: false,
            allow_zone: true,
            allow_base85: true,
            allow_single_segment: true,
            inet_aton_joined: true,
            inet_aton_hex: true,
            allow_mixed: true,
        }
    }
}

impl ParseOpts {
    /// Options accepting only plain, fully written-out addresses.
    pub fn strict() -> Self {
        Self {
            allow_empty: false,
            allow_all: false,
            range: RangeOpts::NoRange,
            allow_leading_zeros: false,
            octal_leading_zeros: false,
            unlimited_leading_zeros: false,
            allow_prefix_only: false,
            prefixes_beyond_size: false,
            allow_zone: true,
            allow_base85: false,
            allow_single_segment: false,
            inet_aton_joined: false,
            inet_aton_hex: false,
            allow_mixed: true,
        }
    }

    /// Derived options for parsing the mask half of an `addr/mask` string.
    /// A mask is a plain address literal: no ranges, no nested prefix,
    /// no zone, no base 85.
    pub(crate) fn mask_opts(&self) -> Self {
        Self {
            allow_empty: false,
            allow_all: false,
            range: RangeOpts::NoRange,
            allow_prefix_only: false,
            prefixes_beyond_size: false,
            allow_zone: false,
            allow_base85: false,
            ..self.clone()
        }
    }
}

/* -------------------------------------------------------------------------- */
