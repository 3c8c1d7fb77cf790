// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expansion of comma-delimited segment alternatives, e.g.
//! `"1,2.3.4,5.6"` into `1.3.4.6`, `1.3.5.6`, `2.3.4.6`, `2.3.5.6`.

use crate::strings::{COLON, COMMA, DASH, DOT};

/// Segment boundaries: commas group alternatives *within* these.
#[inline]
fn is_boundary(c: char) -> bool {
    c == DOT || c == COLON || c == DASH
}

/**
Count the strings [parse_delimited_segments] would produce, without
materializing them: the product over every comma group of its
alternative count. Returns 1 for undelimited input. Saturating.
*/
pub fn count_delimited_addresses(s: &str) -> u64 {
    let mut group: u64 = 0;
    let mut result: u64 = 1;
    for c in s.chars() {
        if is_boundary(c) {
            if group > 0 {
                result = result.saturating_mul(group + 1);
                group = 0;
            }
        } else if c == COMMA {
            group += 1;
        }
    }
    if group > 0 {
        result = result.saturating_mul(group + 1);
    }
    result
}

/**
Expand comma-delimited segment alternatives into every literal string
formed by picking one alternative per group, left-to-right order
preserved and the rightmost group varying fastest.

The produced strings are not validated; feed them to
[IpString](crate::IpString) as needed.
*/
pub fn parse_delimited_segments(s: &str) -> DelimitedIter {
    let mut parts: Vec<Vec<String>> = Vec::new();
    let mut vals: Vec<String> = Vec::new();
    let mut last_part_end = 0usize; // start of pending fixed text
    let mut seg_start = 0usize; // start of the current segment
    let mut val_start = 0usize; // start of the current alternative

    for (i, c) in s.char_indices() {
        if is_boundary(c) {
            if !vals.is_empty() {
                vals.push(s[val_start..i].to_string());
                if last_part_end != seg_start {
                    parts.push(vec![s[last_part_end..seg_start].to_string()]);
                }
                parts.push(std::mem::take(&mut vals));
                last_part_end = i;
            }
            seg_start = i + 1;
            val_start = i + 1;
        } else if c == COMMA {
            vals.push(s[val_start..i].to_string());
            val_start = i + 1;
        }
    }
    if !vals.is_empty() {
        vals.push(s[val_start..].to_string());
        if last_part_end != seg_start {
            parts.push(vec![s[last_part_end..seg_start].to_string()]);
        }
        parts.push(vals);
    } else if parts.is_empty() {
        // no delimiters at all: the iterator yields the input once
        parts.push(vec![s.to_string()]);
    } else if last_part_end < s.len() {
        parts.push(vec![s[last_part_end..].to_string()]);
    }

    let idx = vec![0usize; parts.len()];
    DelimitedIter { parts, idx, done: false }
}

/* ---------------------------------- */

/// Forward-only, non-restartable iterator over delimited combinations.
pub struct DelimitedIter {
    parts: Vec<Vec<String>>,
    idx: Vec<usize>,
    done: bool,
}

impl Iterator for DelimitedIter {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut out = String::new();
        for (part, &i) in self.parts.iter().zip(self.idx.iter()) {
            out.push_str(&part[i]);
        }

        // odometer step, rightmost group fastest
        let mut j = self.parts.len();
        loop {
            if j == 0 {
                self.done = true;
                break;
            }
            j -= 1;
            if self.idx[j] + 1 < self.parts[j].len() {
                self.idx[j] += 1;
                for k in j + 1..self.parts.len() {
                    self.idx[k] = 0;
                }
                break;
            }
        }

        Some(out)
    }
}

/* -------------------------------------------------------------------------- */
