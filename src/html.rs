//! Naive HTML to text extraction
//!
//! Collects every run of character data between tags, in document order.
//! Tags, attributes, comments, doctype declarations and processing
//! instructions are dropped. Script and style bodies are *not* dropped:
//! they are scanned as raw text and kept like any other data.

/// Elements whose content is raw text up to the matching end tag
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Longest reference name looked for behind a `;`
/// (`CounterClockwiseContourIntegral` is the longest HTML5 name)
const MAX_ENTITY_LEN: usize = 32;

/// Extract the character data of an HTML fragment
///
/// No whitespace is added or collapsed: `"<b>Hi</b> there"` becomes
/// `"Hi there"`, `"<p>a</p><p>b</p>"` becomes `"ab"`.
#[must_use]
pub fn extract_text(markup: &str) -> String {
    let chars: Vec<char> = markup.chars().collect();
    let mut result = String::with_capacity(markup.len());
    let mut data = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '<' || !opens_markup(&chars, i) {
            data.push(chars[i]);
            i += 1;
            continue;
        }

        let end = match chars.get(i + 1) {
            Some('!') if starts_with_at(&chars, i, "<!--") => find_after(&chars, i + 4, "-->"),
            Some('!' | '?') => find_after(&chars, i + 2, ">"),
            _ => tag_end(&chars, i),
        };

        // Unterminated markup is kept as character data
        let Some(end) = end else {
            data.extend(&chars[i..]);
            break;
        };

        result.push_str(&decode_entities(&data));
        data.clear();

        let (name, closing) = tag_name(&chars[i + 1..end]);
        i = end;

        if !closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let close = format!("</{name}");
            let raw_end = find_ignore_case(&chars, i, &close).unwrap_or(chars.len());
            result.extend(&chars[i..raw_end]);
            i = raw_end;
        }
    }

    result.push_str(&decode_entities(&data));
    result
}

/// A `<` only starts markup when followed by a tag name, `/`, `!` or `?`
fn opens_markup(chars: &[char], lt: usize) -> bool {
    match chars.get(lt + 1) {
        Some(c) if c.is_ascii_alphabetic() => true,
        Some('/') => chars.get(lt + 2).is_some_and(char::is_ascii_alphabetic),
        Some('!' | '?') => true,
        _ => false,
    }
}

/// Index just past the `>` closing the tag at `lt`, honouring quoted attributes
fn tag_end(chars: &[char], lt: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, &c) in chars[lt + 1..].iter().enumerate() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(lt + offset + 2),
            _ => {}
        }
    }
    None
}

/// Lowercased tag name and whether it is an end tag
fn tag_name(tag: &[char]) -> (String, bool) {
    let (closing, rest) = match tag.first() {
        Some('/') => (true, &tag[1..]),
        _ => (false, tag),
    };
    let name = rest
        .iter()
        .take_while(|c| c.is_ascii_alphanumeric() || **c == '-')
        .map(char::to_ascii_lowercase)
        .collect();
    (name, closing)
}

fn starts_with_at(chars: &[char], at: usize, needle: &str) -> bool {
    let mut idx = at;
    for n in needle.chars() {
        if chars.get(idx) != Some(&n) {
            return false;
        }
        idx += 1;
    }
    true
}

/// Index just past the first `needle` at or after `from`
fn find_after(chars: &[char], from: usize, needle: &str) -> Option<usize> {
    let len = needle.chars().count();
    (from..chars.len())
        .find(|&idx| starts_with_at(chars, idx, needle))
        .map(|idx| idx + len)
}

/// Index of the first case-insensitive `needle` at or after `from`
fn find_ignore_case(chars: &[char], from: usize, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    (from..chars.len()).find(|&idx| {
        chars.len() - idx >= needle.len()
            && chars[idx..idx + needle.len()]
                .iter()
                .zip(&needle)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

/// Decode character references with the HTML5 entity table; unknown ones are kept
fn decode_entities(data: &str) -> String {
    html_escape::decode_html_entities(data).into_owned()
}

/// Remove markup and resolve character references until none remain
///
/// Unlike [`extract_text`], text produced by a removal or a decoded
/// reference is scanned again, so `&amp;lt;b&amp;gt;` and `<<b>b>`
/// both reduce to nothing. Applying this to its own output returns it
/// unchanged. Runs in linear time.
#[must_use]
pub fn strip_markup(text: &str) -> String {
    let mut out: Vec<char> = Vec::with_capacity(text.len());
    // Positions in `out` of every `<`
    let mut opens: Vec<usize> = Vec::new();
    // Decoded characters fed back before the rest of the input, reversed
    let mut pending: Vec<char> = Vec::new();
    let mut input = text.chars();

    while let Some(c) = pending.pop().or_else(|| input.next()) {
        match c {
            ';' => {
                if let Some((amp, decoded)) = entity_at_tail(&out) {
                    out.truncate(amp);
                    while opens.last().is_some_and(|&p| p >= amp) {
                        opens.pop();
                    }
                    pending.extend(decoded.chars().rev());
                    continue;
                }
            }
            '>' => {
                if let Some(&lt) = opens.last()
                    && closes_markup(&out, lt)
                {
                    out.truncate(lt);
                    opens.pop();
                    continue;
                }
            }
            '<' => opens.push(out.len()),
            _ => {}
        }
        out.push(c);
    }

    out.into_iter().collect()
}

/// Whether a `>` now ends markup opened by the `<` at `lt`
fn closes_markup(out: &[char], lt: usize) -> bool {
    match out.get(lt + 1) {
        Some(c) if c.is_ascii_alphabetic() => true,
        Some('/') => out.get(lt + 2).is_some_and(char::is_ascii_alphabetic),
        Some('!') if starts_with_at(out, lt, "<!--") => {
            out.len() >= lt + 6 && out.ends_with(&['-', '-'])
        }
        Some('!' | '?') => true,
        _ => false,
    }
}

/// A character reference ending where a `;` is about to be appended
fn entity_at_tail(out: &[char]) -> Option<(usize, String)> {
    let window = out.len().saturating_sub(MAX_ENTITY_LEN);
    let amp = window + out[window..].iter().rposition(|&c| c == '&')?;
    let name = &out[amp + 1..];

    if name.is_empty() || !name.iter().all(|c| c.is_ascii_alphanumeric() || *c == '#') {
        return None;
    }

    let reference: String = std::iter::once('&')
        .chain(name.iter().copied())
        .chain(std::iter::once(';'))
        .collect();
    let decoded = html_escape::decode_html_entities(&reference);

    (decoded.chars().count() < reference.chars().count()).then(|| (amp, decoded.into_owned()))
}
