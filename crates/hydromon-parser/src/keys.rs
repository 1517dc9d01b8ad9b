/// Normalises a raw location identifier to its six-digit, zero-padded form.
///
/// Spreadsheet exports frequently render integer ids as `"1234.0"`; that
/// suffix is accepted. Anything that is not a non-negative integer returns
/// `None`.
pub fn location_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = digits.parse().ok()?;
    Some(format!("{value:06}"))
}
