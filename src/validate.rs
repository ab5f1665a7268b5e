//! Syntactic traversal check applied before any filesystem access.

/// Returns false if any `/`- or `\`-separated field of `path` is exactly `..`.
///
/// Names that merely contain dots (`a..b`, `..hidden`) are accepted. Nothing
/// is normalized here; the check runs on the decoded request path as-is.
pub fn validate_request_path(path: &str) -> bool {
    if !path.contains("..") {
        return true;
    }

    !path.split(['/', '\\']).any(|field| field == "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_paths() {
        assert!(validate_request_path("/"));
        assert!(validate_request_path(""));
        assert!(validate_request_path("/docs/readme.md"));
        assert!(validate_request_path("/./a/./b"));
    }

    #[test]
    fn test_rejects_parent_tokens() {
        assert!(!validate_request_path(".."));
        assert!(!validate_request_path("/.."));
        assert!(!validate_request_path("/../etc/passwd"));
        assert!(!validate_request_path("/a/b/../../.."));
        assert!(!validate_request_path("/a/.."));
        assert!(!validate_request_path("/a/../"));
    }

    #[test]
    fn test_rejects_backslash_separated_parent() {
        assert!(!validate_request_path("/a\\..\\b"));
        assert!(!validate_request_path("..\\windows"));
        assert!(!validate_request_path("/x/..\\y"));
    }

    #[test]
    fn test_accepts_dots_inside_longer_tokens() {
        assert!(validate_request_path("/a..b"));
        assert!(validate_request_path("/..hidden"));
        assert!(validate_request_path("/trailing.."));
        assert!(validate_request_path("/.../x"));
        assert!(validate_request_path("/archive..tar.gz"));
    }
}
