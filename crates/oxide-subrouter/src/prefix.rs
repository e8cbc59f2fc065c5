//! Prefix joining for route patterns.
//!
//! Joining follows POSIX path semantics: empty elements are ignored, the
//! rest are glued with `/`, and the result is cleaned (repeated slashes
//! collapsed, `.` and `..` resolved lexically, trailing slash removed
//! unless the whole result is `/`).

/// Joins a prefix and a path.
///
/// ```
/// use oxide_subrouter::join_path;
///
/// assert_eq!(join_path("/pre/fix/", "/some/path"), "/pre/fix/some/path");
/// assert_eq!(join_path("/", "/some/path"), "/some/path");
/// assert_eq!(join_path("", ""), "");
/// ```
pub fn join_path(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => String::new(),
        (true, false) => clean(path),
        (false, true) => clean(prefix),
        (false, false) => clean(&format!("{prefix}/{path}")),
    }
}

/// Prepends `prefix` to a dispatch pattern, keeping a leading method token.
///
/// A pattern is either a bare path (`/users/{id}`) or a method token, one
/// space and a path (`GET /users/{id}`). Only the path part is joined.
///
/// ```
/// use oxide_subrouter::apply_prefix_to_pattern;
///
/// assert_eq!(apply_prefix_to_pattern("/api", "GET /users"), "GET /api/users");
/// assert_eq!(apply_prefix_to_pattern("/api", "/users"), "/api/users");
/// ```
pub fn apply_prefix_to_pattern(prefix: &str, pattern: &str) -> String {
    match pattern.split_once(' ') {
        Some((method, path)) => format!("{method} {}", join_path(prefix, path)),
        None => join_path(prefix, pattern),
    }
}

/// Lexically cleans a non-empty path.
fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // `..` at the root stays at the root
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
