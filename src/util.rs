use regex::Regex;
use std::sync::OnceLock;

static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Format the first run of eleven ASCII digits as `XXXX-XXX-XXXX`.
///
/// Anything else, including numbers written in Bengali digits, is returned
/// unchanged.
pub fn format_phone_number(number: &str) -> String {
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"([0-9]{4})([0-9]{3})([0-9]{4})").expect("valid phone regex"));
    regex.replace(number, "$1-$2-$3").into_owned()
}
