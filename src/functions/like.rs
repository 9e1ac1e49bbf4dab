//   Copyright (c) 2024-2026 Anton Kundenko <singaraiona@gmail.com>
//   All rights reserved.
//
//   Permission is hereby granted, free of charge, to any person obtaining a copy
//   of this software and associated documentation files (the "Software"), to deal
//   in the Software without restriction, including without limitation the rights
//   to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//   copies of the Software, and to permit persons to whom the Software is
//   furnished to do so, subject to the following conditions:
//
//   The above copyright notice and this permission notice shall be included in all
//   copies or substantial portions of the Software.
//
//   THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//   IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//   FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//   AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//   LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,

//! LIKE pattern compilation (spec §4.8 step 3): `_`→`.`, `%`→`.*`, anchored
//! `^…$`, compiled once per evaluation.

use regex::Regex;

use crate::error::{Error, Result};

/// Translates a SQL `LIKE` pattern into an anchored regular expression.
pub fn compile(pattern: &str) -> Result<Regex> {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '_' => out.push('.'),
            '%' => out.push_str(".*"),
            // Escape everything else that is a regex metacharacter so the
            // literal text of the pattern matches literally.
            '.' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out.push('$');
    Regex::new(&out).map_err(|e| Error::function(format!("invalid LIKE pattern: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_wildcards() {
        let re = compile("Jos%").unwrap();
        assert!(re.is_match("Joseph"));
        assert!(!re.is_match("xJoseph"));
    }

    #[test]
    fn underscore_matches_single_char() {
        let re = compile("a_c").unwrap();
        assert!(re.is_match("abc"));
        assert!(!re.is_match("abbc"));
    }
}
