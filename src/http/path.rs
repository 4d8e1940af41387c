//! Request path decoding module
//!
//! Turns the raw URI path into a relative filesystem path, rejecting
//! anything that could climb out of the served directory.

use std::path::PathBuf;

/// Decode a request path into a relative path under the base directory.
///
/// Percent escapes are decoded before segments are inspected, so an encoded
/// `%2e%2e` is rejected just like a literal `..`. Empty and `.` segments are
/// dropped.
///
/// Returns `None` for malformed escapes, non-UTF-8 paths, or forbidden segments.
pub fn to_relative_path(path: &str) -> Option<PathBuf> {
    segments_to_path(&percent_decode(path)?)
}

/// Like [`to_relative_path`], but the path must name a file: a trailing `/`
/// or a final `.` segment (decoded or not) yields `None`.
pub fn to_file_path(path: &str) -> Option<PathBuf> {
    let decoded = percent_decode(path)?;
    match decoded.rsplit('/').next() {
        Some("" | ".") => None,
        _ => segments_to_path(&decoded),
    }
}

fn segments_to_path(decoded: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();

    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => relative.push(s),
        }
    }

    Some(relative)
}

/// Decode `%XX` escapes. `+` is left alone since it is literal in paths.
pub fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paths() {
        assert_eq!(
            to_relative_path("/assets/logo.png"),
            Some(PathBuf::from("assets/logo.png"))
        );
        assert_eq!(
            to_relative_path("/js//./app.js"),
            Some(PathBuf::from("js/app.js"))
        );
        assert_eq!(to_relative_path("/"), Some(PathBuf::new()));
    }

    #[test]
    fn test_file_path_rejects_directory_forms() {
        assert_eq!(
            to_file_path("/assets/logo.png"),
            Some(PathBuf::from("assets/logo.png"))
        );
        assert_eq!(to_file_path("/index.html/"), None);
        assert_eq!(to_file_path("/assets/logo.png/."), None);
        assert_eq!(to_file_path("/assets/logo.png%2F"), None);
        assert_eq!(to_file_path("/assets/"), None);
        assert_eq!(to_file_path("/../index.html"), None);
    }

    #[test]
    fn test_decoding() {
        assert_eq!(
            to_relative_path("/my%20file.txt"),
            Some(PathBuf::from("my file.txt"))
        );
        assert_eq!(
            to_relative_path("/caf%C3%A9.css"),
            Some(PathBuf::from("café.css"))
        );
        assert_eq!(percent_decode("a+b").as_deref(), Some("a+b"));
    }

    #[test]
    fn test_traversal_rejected() {
        assert_eq!(to_relative_path("/../secret"), None);
        assert_eq!(to_relative_path("/assets/../../secret"), None);
        assert_eq!(to_relative_path("/%2e%2e/secret"), None);
        assert_eq!(to_relative_path("/%2E%2E%2fsecret"), None);
        assert_eq!(to_relative_path("/..%5csecret"), None);
        assert_eq!(to_relative_path("/a%00b"), None);
    }

    #[test]
    fn test_malformed_escapes() {
        assert_eq!(percent_decode("%"), None);
        assert_eq!(percent_decode("%4"), None);
        assert_eq!(percent_decode("%zz"), None);
        assert_eq!(percent_decode("%ff"), None); // not UTF-8
    }
}
