//! Natural ordering for reference strings
//!
//! References like `MAT 1:10!2` are compared as alternating runs of
//! non-digits and ASCII digits. Digit runs compare by numeric value,
//! other runs by code point. When one string runs out of runs first it
//! sorts first. `"Ref 2" < "Ref 10"`, unlike plain string ordering.

use std::cmp::Ordering;

use crate::word::Word;

/// A maximal run of digits or non-digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run<'a> {
    Digits(&'a [u8]),
    Text(&'a [u8]),
}

/// Iterator over the runs of a byte string
struct Runs<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Runs<'a> {
    type Item = Run<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = *self.rest.first()?;
        let digits = first.is_ascii_digit();
        let len = self
            .rest
            .iter()
            .position(|b| b.is_ascii_digit() != digits)
            .unwrap_or(self.rest.len());
        let (run, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(if digits { Run::Digits(run) } else { Run::Text(run) })
    }
}

fn runs(s: &str) -> Runs<'_> {
    // Splitting on ASCII digits never cuts a UTF-8 sequence
    Runs { rest: s.as_bytes() }
}

/// Compare two digit runs by numeric value
fn compare_digits(a: &[u8], b: &[u8]) -> Ordering {
    if let (Some(x), Some(y)) = (atoi::atoi::<u64>(a), atoi::atoi::<u64>(b)) {
        return x.cmp(&y);
    }

    // Too large for u64: compare without leading zeros, longer is larger
    let strip = |s: &[u8]| -> usize { s.iter().position(|&c| c != b'0').unwrap_or(s.len()) };
    let (a, b) = (&a[strip(a)..], &b[strip(b)..]);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural order of two strings
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = runs(a);
    let mut right = runs(b);

    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(Run::Digits(x)), Some(Run::Digits(y))) => compare_digits(x, y),
            (Some(Run::Text(x)), Some(Run::Text(y))) => x.cmp(y),
            // Numbers sort before text
            (Some(Run::Digits(_)), Some(Run::Text(_))) => Ordering::Less,
            (Some(Run::Text(_)), Some(Run::Digits(_))) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

/// Natural order of optional strings; unset sorts first
pub fn natural_cmp_opt(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => natural_cmp(a, b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// Stable sort of words into reference order
pub fn sort_by_reference(words: &mut [Word]) {
    words.sort_by(|a, b| natural_cmp_opt(a.reference.as_deref(), b.reference.as_deref()));
}
