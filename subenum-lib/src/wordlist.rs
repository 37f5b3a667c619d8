//! Wordlist loading for the brute-force stage.
//!
//! Plain text, one word per line. Blank lines and lines starting with `#`
//! are ignored.

use crate::error::SubenumError;
use std::fs;
use std::path::Path;

/// Extract words from wordlist text.
pub fn parse_words(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read and parse a wordlist file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<String>, SubenumError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        SubenumError::file_error(
            path.to_string_lossy(),
            format!("Could not read wordlist: {}", e),
        )
    })?;

    // Wordlists in the wild are not always clean UTF-8
    Ok(parse_words(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_words_skips_blank_and_comment_lines() {
        let words = parse_words("dev\n\n# comment\napi\n   \n  staging  \n");
        assert_eq!(words, vec!["dev", "api", "staging"]);
    }

    #[test]
    fn test_indented_comment_is_still_a_comment() {
        assert!(parse_words("   # not a word").is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"www\r\nmail\r\n#ignored\r\n").unwrap();
        file.flush().unwrap();

        assert_eq!(load(file.path()).unwrap(), vec!["www", "mail"]);
    }

    #[test]
    fn test_load_tolerates_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"www\n\xff\xfebad\nvpn\n").unwrap();
        file.flush().unwrap();

        let words = load(file.path()).unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0], "www");
        assert_eq!(words[2], "vpn");
    }

    #[test]
    fn test_missing_file_is_a_file_error() {
        let err = load("/definitely/not/here/words.txt").unwrap_err();
        assert!(matches!(err, SubenumError::FileError { .. }));
    }
}
