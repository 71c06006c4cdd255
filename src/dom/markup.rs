//! Markup helpers: stripping tags to plain text and escaping text for markup.

use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|</?[a-zA-Z][^>]*>").expect("valid tag regex"))
}

fn entity_pattern() -> &'static Regex {
    static ENTITIES: OnceLock<Regex> = OnceLock::new();
    ENTITIES.get_or_init(|| {
        Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity regex")
    })
}

/// Convert a markup fragment into the text a reader would see.
///
/// Tags and comments are dropped and character references are decoded, so
/// `"<b>Tom &amp; Jerry</b>"` becomes `"Tom & Jerry"`. A `<` that does not
/// open a tag is kept as text. Unknown named references are left as written.
pub fn strip_markup(fragment: &str) -> String {
    let mut text = fragment.to_string();
    // Dropping one tag can close up another (`<<b>i>`).
    while contains_markup(&text) {
        text = tag_pattern().replace_all(&text, "").into_owned();
    }
    decode_entities(&text)
}

/// Whether `text` contains a tag or comment that [`strip_markup`] would drop.
pub fn contains_markup(text: &str) -> bool {
    tag_pattern().is_match(text)
}

/// Decode HTML character references (`&amp;`, `&#2453;`, `&#x9A4;`, ...).
pub fn decode_entities(text: &str) -> String {
    entity_pattern()
        .replace_all(text, |caps: &regex::Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "copy" => Some('©'),
        "reg" => Some('®'),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        "hellip" => Some('…'),
        _ => None,
    }
}

/// Escape an attribute value for a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Escape plain text so it can be embedded in markup verbatim.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
