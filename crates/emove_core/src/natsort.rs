//! Natural ordering for dotted hierarchical IDs.
//!
//! Plain lexical comparison puts `"1.10"` before `"1.2"`; listing points
//! and ports needs the numeric segments compared as numbers instead.

use std::cmp::Ordering;

#[derive(Debug, PartialEq)]
enum Run<'a> {
    Num(u64),
    Text(&'a str),
}

/// Splits a string into alternating runs of digits and non-digits.
fn runs(s: &str) -> Vec<Run<'_>> {
    let mut out = Vec::new();
    let bytes = s.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        let is_digit = bytes[start].is_ascii_digit();
        let mut end = start + 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() == is_digit {
            end += 1;
        }
        let chunk = &s[start..end];
        if is_digit {
            match chunk.parse::<u64>() {
                Ok(n) => out.push(Run::Num(n)),
                // Digit run too long for u64; fall back to text comparison.
                Err(_) => out.push(Run::Text(chunk)),
            }
        } else {
            out.push(Run::Text(chunk));
        }
        start = end;
    }
    out
}

/// Total order over ID strings: numeric runs compare as integers, text runs
/// lexically, numbers before text, shorter prefix first.
pub fn compare(a: &str, b: &str) -> Ordering {
    let ax = runs(a);
    let bx = runs(b);
    for (ra, rb) in ax.iter().zip(bx.iter()) {
        let ord = match (ra, rb) {
            (Run::Num(x), Run::Num(y)) => x.cmp(y),
            (Run::Text(x), Run::Text(y)) => x.cmp(y),
            (Run::Num(_), Run::Text(_)) => Ordering::Less,
            (Run::Text(_), Run::Num(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    // All shared runs equal; break the tie on the raw string so distinct
    // IDs never compare equal (e.g. "01" vs "1").
    ax.len().cmp(&bx.len()).then_with(|| a.cmp(b))
}
