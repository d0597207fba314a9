//! Simplified HTML tokenizer for markup fragments.
//!
//! Tag names are restricted to ASCII `[A-Za-z0-9:_-]` and must start with an ASCII letter.
//! Attribute names accept any character except ASCII whitespace, `/`, `>`, `=`, `<` and quotes.
//!
//! This is not a full HTML5 tokenizer/state machine. It covers what fragment
//! construction needs: a `<` that does not open markup is plain text, raw-text
//! element bodies are kept verbatim, and `<!...>` / `<?...>` that are not comments
//! or doctypes become bogus comments.
//!
//! Known limitations (intentional):
//! - No spec parse-error recovery beyond the cases above.
//! - No RCDATA handling for `title`/`textarea`; their bodies tokenize as markup.
//! - `/>` is honored on every element, so `<script/>` closes immediately instead of
//!   starting a raw-text body.
//! - Raw-text close-tag scanning accepts only ASCII whitespace before `>` (see
//!   `find_rawtext_close_tag`).
use crate::entities::decode_entities;
use crate::types::{AtomId, AtomTable, Token, TokenStream};
use memchr::memchr;

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";

/// Elements whose body is kept verbatim up to the matching close tag.
pub const RAWTEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

pub fn is_rawtext_element(name: &str) -> bool {
    RAWTEXT_ELEMENTS
        .iter()
        .any(|raw| raw.eq_ignore_ascii_case(name))
}

pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn is_tag_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

fn is_attribute_name_char(c: u8) -> bool {
    !c.is_ascii_whitespace() && !matches!(c, b'/' | b'>' | b'=' | b'<' | b'"' | b'\'')
}

/// Whether the `<` at `i` starts a tag, comment, doctype or bogus comment.
fn opens_markup(bytes: &[u8], i: usize) -> bool {
    debug_assert_eq!(bytes[i], b'<');
    match bytes.get(i + 1) {
        Some(c) if c.is_ascii_alphabetic() => true,
        Some(b'!') | Some(b'?') => true,
        Some(b'/') => matches!(bytes.get(i + 2), Some(c) if c.is_ascii_alphabetic() || *c == b'>'),
        _ => false,
    }
}

// it only attempts matches starting at ASCII <
// < cannot appear in UTF-8 continuation bytes
fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let hay_bytes = haystack.as_bytes();
    let len = hay_bytes.len();
    let n = close_tag.len();
    debug_assert!(n >= 3);
    debug_assert!(close_tag[0] == b'<' && close_tag[1] == b'/');
    debug_assert!(close_tag.is_ascii());
    if len < n {
        return None;
    }
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &hay_bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if hay_bytes[i + 1] == b'/' && starts_with_ignore_ascii_case_at(hay_bytes, i, close_tag) {
            let mut k = i + n;
            // Spec allows other parse-error paths like `</script foo>`, but we only
            // accept ASCII whitespace before `>` to keep the scan simple/alloc-free.
            while k < len && hay_bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && hay_bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

fn emit(out: &mut Vec<Token>, token: Token) {
    log::trace!(target: "html.tokenizer", "emit token: {token:?}");
    out.push(token);
}

/// Tokenizes into a token stream with interned tag/attribute names to reduce allocations.
pub fn tokenize(input: &str) -> TokenStream {
    let mut out = Vec::new();
    let mut atoms = AtomTable::new();
    let mut i = 0;
    let bytes = input.as_bytes();
    let len = bytes.len();
    // Invariant: we scan by byte, but any slice endpoints must be UTF-8 char boundaries.
    // We only cut slices at ASCII structural bytes or at positions reached by scanning
    // ASCII-only tokens; therefore slice endpoints remain UTF-8 boundaries.
    while i < len {
        if bytes[i] != b'<' || !opens_markup(bytes, i) {
            // collect text until the next '<' that opens markup
            let start = i;
            i += 1;
            loop {
                match memchr(b'<', &bytes[i.min(len)..]) {
                    Some(rel) if opens_markup(bytes, i + rel) => {
                        i += rel;
                        break;
                    }
                    Some(rel) => i += rel + 1,
                    None => {
                        i = len;
                        break;
                    }
                }
            }
            debug_assert!(input.is_char_boundary(start));
            debug_assert!(input.is_char_boundary(i));
            let decoded = decode_entities(&input[start..i]);
            if !decoded.is_empty() {
                emit(&mut out, Token::Text(decoded));
            }
            continue;
        }
        // now b[i] == b'<' and it opens markup
        debug_assert!(input.is_char_boundary(i));
        if input[i..].starts_with(HTML_COMMENT_START) {
            let comment_start = i + HTML_COMMENT_START.len();
            // Scan for the comment terminator once per comment (linear in comment length).
            if let Some(end) = input[comment_start..].find(HTML_COMMENT_END) {
                let comment_end = comment_start + end;
                debug_assert!(input.is_char_boundary(comment_end));
                emit(
                    &mut out,
                    Token::Comment(input[comment_start..comment_end].to_string()),
                );
                i = comment_end + HTML_COMMENT_END.len();
                continue;
            }
            emit(&mut out, Token::Comment(input[comment_start..].to_string()));
            break;
        }
        if starts_with_ignore_ascii_case_at(bytes, i, b"<!doctype") {
            let rest = &input[i + 2..];
            if let Some(end) = rest.find('>') {
                emit(&mut out, Token::Doctype(rest[..end].trim().to_string()));
                i += 2 + end + 1;
                continue;
            }
            break;
        }
        if bytes[i + 1] == b'!' || bytes[i + 1] == b'?' {
            // bogus comment up to the next '>'
            let body_start = i + if bytes[i + 1] == b'!' { 2 } else { 1 };
            let end = memchr(b'>', &bytes[body_start..]).map_or(len, |rel| body_start + rel);
            emit(&mut out, Token::Comment(input[body_start..end].to_string()));
            i = (end + 1).min(len);
            continue;
        }
        // end tag?
        if bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < len && is_tag_name_char(bytes[j]) {
                j += 1;
            }
            let name = (j > start).then(|| atoms.intern_ascii_lowercase(&input[start..j]));
            // skip to '>'
            while j < len && bytes[j] != b'>' {
                j += 1;
            }
            if j < len {
                j += 1;
            }
            // `</>` is dropped entirely
            if let Some(name) = name {
                emit(&mut out, Token::EndTag(name));
            }
            i = j;
            continue;
        }
        // start tag
        let start = i + 1;
        let mut j = start;
        while j < len && is_tag_name_char(bytes[j]) {
            j += 1;
        }
        debug_assert!(j > start);
        let name = atoms.intern_ascii_lowercase(&input[start..j]);
        let (attributes, self_closing, content_start) = scan_attributes(input, j, &mut atoms);
        let name_str = atoms.resolve(name);
        let self_closing = self_closing || is_void_element(name_str);
        let rawtext = !self_closing && is_rawtext_element(name_str);
        let close_tag = rawtext.then(|| format!("</{name_str}"));

        emit(
            &mut out,
            Token::StartTag {
                name,
                attributes,
                self_closing,
            },
        );

        if let Some(close_tag) = close_tag {
            let k = content_start;
            debug_assert!(input.is_char_boundary(k));
            if let Some((rel_start, rel_end)) =
                find_rawtext_close_tag(&input[k..], close_tag.as_bytes())
            {
                let raw = &input[k..k + rel_start];
                if !raw.is_empty() {
                    emit(&mut out, Token::Text(raw.to_string()));
                }
                emit(&mut out, Token::EndTag(name));
                i = k + rel_end;
                continue;
            }
            // If the rawtext close tag is missing, emit an implicit end tag and
            // treat the remainder as rawtext content.
            let raw = &input[k..];
            if !raw.is_empty() {
                emit(&mut out, Token::Text(raw.to_string()));
            }
            emit(&mut out, Token::EndTag(name));
            break;
        }

        i = content_start;
    }
    TokenStream::new(out, atoms)
}

/// Scans attributes starting right after the tag name.
///
/// Returns the attributes, whether the tag was written self-closing, and the index
/// just past the closing `>` (or the end of input).
fn scan_attributes(
    input: &str,
    mut k: usize,
    atoms: &mut AtomTable,
) -> (Vec<(AtomId, Option<String>)>, bool, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut attributes: Vec<(AtomId, Option<String>)> = Vec::new();
    let mut self_closing = false;

    let skip_whitespace = |k: &mut usize| {
        while *k < len && bytes[*k].is_ascii_whitespace() {
            *k += 1;
        }
    };

    loop {
        skip_whitespace(&mut k);
        if k >= len {
            break;
        }
        if bytes[k] == b'>' {
            k += 1;
            break;
        }
        if bytes[k] == b'/' {
            if k + 1 < len && bytes[k + 1] == b'>' {
                self_closing = true;
                k += 2;
                break;
            }
            k += 1;
            continue;
        }
        let name_start = k;
        while k < len && is_attribute_name_char(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            // stray `=`, `<` or quote where a name should be
            k += 1;
            continue;
        }
        debug_assert!(input.is_char_boundary(name_start));
        debug_assert!(input.is_char_boundary(k));
        let attribute_name = atoms.intern_ascii_lowercase(&input[name_start..k]);

        skip_whitespace(&mut k);
        let value = if k < len && bytes[k] == b'=' {
            k += 1;
            skip_whitespace(&mut k);
            if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let quote = bytes[k];
                k += 1;
                let vstart = k;
                while k < len && bytes[k] != quote {
                    k += 1;
                }
                let raw = &input[vstart..k];
                if k < len {
                    k += 1;
                }
                Some(decode_entities(raw))
            } else {
                let vstart = k;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                        break;
                    }
                    k += 1;
                }
                Some(decode_entities(&input[vstart..k]))
            }
        } else {
            None
        };
        // first occurrence wins, as in HTML
        if !attributes.iter().any(|(existing, _)| *existing == attribute_name) {
            attributes.push((attribute_name, value));
        }
    }
    (attributes, self_closing, k)
}
