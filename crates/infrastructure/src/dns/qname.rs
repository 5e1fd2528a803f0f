/// Canonical form used for every rule lookup, cache key and log row:
/// lowercase, one trailing dot stripped.
pub fn normalize_qname(qname: &str) -> String {
    let trimmed = qname.strip_suffix('.').unwrap_or(qname);
    trimmed.to_ascii_lowercase()
}
