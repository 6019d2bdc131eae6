//! Path exemption matching.
//!
//! An exemption pattern is either a literal path (`/api/v1/status/`) or a
//! literal prefix followed by `*` (`/api/v1/docs/*`). Literal patterns are
//! compared after both sides are normalized to end with `/`.

const SEPARATOR: char = '/';
const WILDCARD: char = '*';

/// Check whether `path` bypasses authentication.
///
/// An absent path or an empty exemption list is never exempt. The first
/// matching pattern wins.
pub fn is_exempt<S: AsRef<str>>(path: Option<&str>, exemptions: &[S]) -> bool {
    let Some(path) = path else {
        return false;
    };
    if exemptions.is_empty() {
        return false;
    }

    let path = normalize(path);

    exemptions.iter().any(|pattern| {
        let pattern = pattern.as_ref();
        match pattern.strip_suffix(WILDCARD) {
            Some(prefix) => path.starts_with(prefix),
            None => normalize(pattern) == path,
        }
    })
}

fn normalize(path: &str) -> String {
    if path.ends_with(SEPARATOR) {
        path.to_string()
    } else {
        format!("{}{}", path, SEPARATOR)
    }
}
