//! Path builders for every named page, and the login continuation rules.

use std::fmt::Write;

pub const INDEX: &str = "/";
pub const CREATE_POST: &str = "/create/";
pub const LOGIN: &str = "/auth/login/";

pub fn group(slug: &str) -> String {
    format!("/group/{}/", encode(slug))
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", encode(username))
}

pub fn post_detail(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

pub fn post_edit(post_id: i64) -> String {
    format!("/posts/{post_id}/edit/")
}

/// Login page carrying `next` as the continuation parameter.
pub fn login_with_next(next: &str) -> String {
    format!("{LOGIN}?next={}", encode(next))
}

/// Percent-encode everything except unreserved characters and `/`.
fn encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// Only local absolute paths are followed after login.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_keeps_slashes() {
        assert_eq!(login_with_next("/create/"), "/auth/login/?next=/create/");
        assert_eq!(
            login_with_next("/posts/3/edit/"),
            "/auth/login/?next=/posts/3/edit/"
        );
    }

    #[test]
    fn test_query_in_next_is_escaped() {
        assert_eq!(
            login_with_next("/?page=2&x=1"),
            "/auth/login/?next=/%3Fpage%3D2%26x%3D1"
        );
        assert_eq!(
            login_with_next("/create/?q=a%26b"),
            "/auth/login/?next=/create/%3Fq%3Da%2526b"
        );
    }

    #[test]
    fn test_non_ascii_segments_are_encoded() {
        assert_eq!(profile("UserTest"), "/profile/UserTest/");
        assert_eq!(profile("лев"), "/profile/%D0%BB%D0%B5%D0%B2/");
        assert_eq!(group("test-slug"), "/group/test-slug/");
    }

    #[test]
    fn test_safe_next() {
        assert!(is_safe_next("/create/"));
        assert!(!is_safe_next("//evil.example"));
        assert!(!is_safe_next("https://evil.example/"));
        assert!(!is_safe_next("/\\evil.example"));
        assert!(!is_safe_next(""));
        assert!(!is_safe_next("/create/\r\nSet-Cookie: x=1"));
        assert!(!is_safe_next("/a\tb"));
    }
}
