//! Interpolation-slot markers.
//!
//! A marker is `$$$<nonce>:<index>$$$`. The nonce is random per template call, so
//! author-written text cannot collide with a marker unless it guesses the nonce.

use std::borrow::Cow;
use std::ops::Range;

use uuid::Uuid;

const FENCE: &str = "$$$";

#[derive(Clone, Debug)]
pub struct PlaceholderCodec {
    /// `$$$<nonce>:`
    prefix: String,
}

/// One marker occurrence inside a string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker {
    pub range: Range<usize>,
    pub index: usize,
}

impl PlaceholderCodec {
    pub fn new() -> Self {
        Self::with_nonce(&Uuid::new_v4().simple().to_string())
    }

    /// Codec with a fixed nonce. Only use a guessable nonce for tests.
    pub fn with_nonce(nonce: &str) -> Self {
        debug_assert!(
            !nonce.contains('$'),
            "nonce must not contain the marker fence"
        );
        Self {
            prefix: format!("{FENCE}{nonce}:"),
        }
    }

    pub fn encode(&self, index: usize) -> String {
        let mut out = String::new();
        self.push_marker(&mut out, index);
        out
    }

    pub fn push_marker(&self, out: &mut String, index: usize) {
        out.push_str(&self.prefix);
        out.push_str(&index.to_string());
        out.push_str(FENCE);
    }

    pub fn find<'t>(&self, text: &'t str) -> MarkerIter<'_, 't> {
        MarkerIter {
            prefix: &self.prefix,
            text,
            pos: 0,
        }
    }

    pub fn contains_marker(&self, text: &str) -> bool {
        self.find(text).next().is_some()
    }

    /// Replaces every marker in `text` with what `replacement` returns for its index.
    ///
    /// `Ok(None)` keeps that marker literally. Returns the input borrowed when it
    /// contains no markers.
    pub fn replace_all<'t, R, E, F>(&self, text: &'t str, mut replacement: F) -> Result<Cow<'t, str>, E>
    where
        R: AsRef<str>,
        F: FnMut(usize) -> Result<Option<R>, E>,
    {
        let mut markers = self.find(text).peekable();
        if markers.peek().is_none() {
            return Ok(Cow::Borrowed(text));
        }
        let mut out = String::with_capacity(text.len());
        let mut copy_start = 0;
        for Marker { range, index } in markers {
            out.push_str(&text[copy_start..range.start]);
            match replacement(index)? {
                Some(value) => out.push_str(value.as_ref()),
                None => out.push_str(&text[range.clone()]),
            }
            copy_start = range.end;
        }
        out.push_str(&text[copy_start..]);
        Ok(Cow::Owned(out))
    }
}

impl Default for PlaceholderCodec {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MarkerIter<'c, 't> {
    prefix: &'c str,
    text: &'t str,
    pos: usize,
}

impl Iterator for MarkerIter<'_, '_> {
    type Item = Marker;

    fn next(&mut self) -> Option<Marker> {
        while self.pos < self.text.len() {
            let start = self.pos + self.text[self.pos..].find(self.prefix)?;
            let digits_start = start + self.prefix.len();
            let digits_len = self.text[digits_start..]
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            let digits_end = digits_start + digits_len;
            let parsed = self.text[digits_start..digits_end].parse::<usize>();
            match parsed {
                Ok(index) if self.text[digits_end..].starts_with(FENCE) => {
                    let end = digits_end + FENCE.len();
                    self.pos = end;
                    return Some(Marker {
                        range: start..end,
                        index,
                    });
                }
                // `$` is ASCII, so start + 1 is a char boundary.
                _ => self.pos = start + 1,
            }
        }
        None
    }
}
