use rustc_hash::FxHashSet;

/// True if `domain` itself or any parent suffix with at least two labels
/// is in `set`. `v16.tiktokcdn.com` matches a set containing
/// `tiktokcdn.com`; the bare first label is never treated as a parent.
pub fn domain_matches(domain: &str, set: &FxHashSet<String>) -> bool {
    if set.is_empty() {
        return false;
    }
    if set.contains(domain) {
        return true;
    }
    let mut rest = domain;
    while let Some((_, parent)) = rest.split_once('.') {
        if parent.contains('.') && set.contains(parent) {
            return true;
        }
        rest = parent;
    }
    false
}
