//! Entity decoding for the tokenizer and escaping for the serializer.

use memchr::memchr;

/// Escape text-node content for serialization outside raw-text elements.
///
/// Replaces `&`, `<`, `>` and U+00A0, matching how `innerHTML` serializes text.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a double-quoted attribute value for serialization.
///
/// Replaces `&`, `"`, `<`, `>` and U+00A0.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Named references the decoder understands. Together with numeric references this
/// covers everything the escapers in this workspace emit.
const NAMED_REFERENCES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
];

/// Longest reference body between `&` and `;` (`#x10FFFF`, `#1114111`).
const MAX_REFERENCE_LEN: usize = 8;

/// Decode character references in text and attribute values.
///
/// Decodes `&amp; &lt; &gt; &quot; &apos; &nbsp;` and semicolon-terminated numeric
/// references (`&#39;`, `&#x27;`) that name a Unicode scalar value, `&#0;` included.
/// Anything else, including a reference without its `;`, is kept as written.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        let body = &rest[amp + 1..];
        match decode_reference(body) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &body[consumed..];
            }
            None => {
                out.push('&');
                rest = body;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decodes the reference starting right after `&`, returning the character and the
/// number of bytes consumed through the closing `;`.
fn decode_reference(body: &str) -> Option<(char, usize)> {
    let window = &body.as_bytes()[..body.len().min(MAX_REFERENCE_LEN + 1)];
    let semicolon = memchr(b';', window)?;
    let name = &body[..semicolon];
    let ch = match name.strip_prefix('#') {
        Some(number) => decode_numeric(number)?,
        None => NAMED_REFERENCES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|&(_, ch)| ch)?,
    };
    Some((ch, semicolon + 1))
}

fn decode_numeric(number: &str) -> Option<char> {
    let (digits, radix) = match number.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (number, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
}
