//! Filesystem-safe name fragments.
//!
//! Feed and episode titles come straight out of RSS documents and can contain
//! anything, including path separators. These helpers reduce arbitrary text to
//! a single safe path segment by dropping (not replacing) offending characters
//! and trimming surrounding whitespace.

/// Characters that are invalid in file names on at least one supported
/// platform. Applied everywhere so archives can be moved between systems.
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

fn strip_invalid(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && !INVALID_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitize a feed title into a usable directory name.
pub fn folder_name(name: &str) -> String {
    strip_invalid(name)
}

/// Sanitize an episode title into a usable file name.
///
/// Folder and file sanitization currently share the same character set; they
/// stay separate entry points because directory names must never be less
/// strict than file names.
pub fn file_name(name: &str) -> String {
    strip_invalid(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_invalid_characters() {
        assert_eq!(file_name("Hello: World?"), "Hello World");
        assert_eq!(file_name("AC/DC"), "ACDC");
        assert_eq!(file_name("a<b>c"), "abc");
        assert_eq!(file_name("pipe|test"), "pipetest");
        assert_eq!(folder_name("Back\\slash"), "Backslash");
        assert_eq!(folder_name("wild*card"), "wildcard");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(file_name("  padded  "), "padded");
        // Stripping can expose new surrounding whitespace
        assert_eq!(file_name("?  question  ?"), "question");
    }

    #[test]
    fn test_valid_names_pass_through() {
        assert_eq!(file_name("Episode 42 - The Answer"), "Episode 42 - The Answer");
        assert_eq!(folder_name("My Podcast (2024)"), "My Podcast (2024)");
    }

    #[test]
    fn test_control_characters_removed() {
        assert_eq!(file_name("tab\there"), "tabhere");
        assert_eq!(file_name("nul\0byte"), "nulbyte");
    }

    #[test]
    fn test_empty_and_all_invalid() {
        assert_eq!(file_name(""), "");
        assert_eq!(file_name("<>:\"/\\|?*"), "");
    }
}
