// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

pub(crate) const DOT: char = '.';
pub(crate) const COLON: char = ':';
pub(crate) const DASH: char = '-';
pub(crate) const SLASH: char = '/';
pub(crate) const STAR: char = '*';
pub(crate) const PERCENT: char = '%';
pub(crate) const USCORE: char = '_';
pub(crate) const COMMA: char = ',';
pub(crate) const COMPRESS: &str = "::";

/// RFC 1924 alphabet for the base-85 IPv6 encoding.
pub(crate) const BASE85_ALPHABET: &[u8; 85] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~";
pub(crate) const BASE85_LEN: usize = 20;

pub(crate) static UNC_SUFFIX: &str = ".ipv6-literal.net";
pub(crate) static UNC_ZONE_MARK: char = 's';
pub(crate) static REV_DNS_V4_SUFFIX: &str = ".in-addr.arpa";
pub(crate) static REV_DNS_V6_SUFFIX: &str = ".ip6.arpa";

// lib.rs (FormatErrorKind)
pub(crate) static ERR_EMPTY: &str = "empty address strings not allowed";
pub(crate) static ERR_ALL: &str = "the all-addresses wildcard is not allowed";
pub(crate) static ERR_PREFIX_ONLY: &str = "prefix-only address strings not allowed";
pub(crate) static ERR_EMPTY_SEG: &str = "empty segment";
pub(crate) static ERR_BAD_CHAR: &str = "unexpected character";
pub(crate) static ERR_BAD_DIGIT: &str = "invalid digit";
pub(crate) static ERR_SEG_TOOLARGE: &str = "segment value out of range";
pub(crate) static ERR_LEADING_ZEROS: &str = "leading zeros not allowed";
pub(crate) static ERR_SEG_COUNT: &str = "wrong number of segments";
pub(crate) static ERR_REVERSED: &str = "reversed range (only tolerated with a CIDR prefix)";
pub(crate) static ERR_NO_RANGE: &str = "ranged segments not allowed";
pub(crate) static ERR_NO_WILDCARD: &str = "wildcard segments not allowed";
pub(crate) static ERR_WILDCARD_WIDTH: &str = "wildcard wider than the segment";
pub(crate) static ERR_PREFIX_SIZE: &str = "prefix length out of range";
pub(crate) static ERR_BAD_PREFIX: &str = "invalid prefix length";
pub(crate) static ERR_BAD_MASK: &str = "invalid mask";
pub(crate) static ERR_WILDCARD_MASK: &str = "wildcards and ranges not allowed in a mask";
pub(crate) static ERR_DOUBLE_COMPRESS: &str = "multiple '::' compressions";
pub(crate) static ERR_BAD_ZONE: &str = "invalid zone/scope id";
pub(crate) static ERR_NO_MIXED: &str = "mixed IPv6/IPv4 notation not allowed";
pub(crate) static ERR_NO_SINGLE_SEG: &str = "single-segment address strings not allowed";
pub(crate) static ERR_NO_BASE85: &str = "base 85 address strings not allowed";
pub(crate) static ERR_IS_OTHER_VERSION: &str = "address is of the other IP version";

// lib.rs (RangeError)
pub(crate) static ERR_NON_CONTIG: &str = "segment does not reduce to one contiguous range";
pub(crate) static ERR_MIXED_JOIN: &str = "embedded IPv4 range cannot be joined into an IPv6 segment";
pub(crate) static ERR_NOT_SINGLE: &str = "segment is a range where a single value is required";
pub(crate) static ERR_WRONG_VERSION: &str = "wrong IP version";
pub(crate) static ERR_PREFIX_TOOLONG: &str = "prefix length exceeds the address size";
