//! Candidate hostname handling.
//!
//! Builds brute-force hosts from a wordlist, filters raw names from passive
//! sources down to hostnames under the target domain, and merges the two
//! sources into one sorted, deduplicated candidate list.

use std::collections::BTreeSet;

/// Turn a raw name into a hostname under `domain`, if it is one.
///
/// Trims and lower-cases the name, strips a leading `*.` wildcard marker and
/// a trailing root dot. The result must equal `domain` or end with
/// `.{domain}`. Names that still carry a `*` after stripping, or any
/// character outside `[a-z0-9._-]` (e-mail SANs), are rejected.
/// `domain` is expected to be normalized already.
pub fn normalize_hostname(domain: &str, raw: &str) -> Option<String> {
    let mut name = raw.trim().to_lowercase();

    while let Some(stripped) = name.strip_prefix("*.") {
        name = stripped.to_string();
    }
    let name = name.trim_start_matches('.').trim_end_matches('.');

    if name.is_empty() || !name.chars().all(is_hostname_char) {
        return None;
    }

    if is_within_domain(name, domain) {
        Some(name.to_string())
    } else {
        None
    }
}

fn is_hostname_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_')
}

/// Whether `host` is `domain` itself or a subdomain of it.
///
/// Matches on a label boundary, so `notexample.com` is not within
/// `example.com`.
pub fn is_within_domain(host: &str, domain: &str) -> bool {
    match host.strip_suffix(domain) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

/// Build brute-force candidates `"{word}.{domain}"` from wordlist lines.
///
/// Lines are trimmed and lower-cased; blank lines and `#` comments are
/// skipped. Repeated words collapse into one candidate. Labels are not validated here, an
/// invalid one simply fails to resolve later.
pub fn build_candidates<S: AsRef<str>>(domain: &str, words: &[S]) -> BTreeSet<String> {
    words
        .iter()
        .map(|w| w.as_ref().trim())
        .filter(|w| !w.is_empty() && !w.starts_with('#'))
        .map(|w| format!("{}.{}", w.to_lowercase(), domain))
        .collect()
}

/// Union of two hostname sets as an ascending, deduplicated list.
pub fn merge<'a, A, B>(a: A, b: B) -> Vec<String>
where
    A: IntoIterator<Item = &'a String>,
    B: IntoIterator<Item = &'a String>,
{
    let union: BTreeSet<&String> = a.into_iter().chain(b).collect();
    union.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_strips_wildcards_and_filters_foreign_names() {
        let domain = "example.com";
        assert_eq!(
            normalize_hostname(domain, "www.example.com"),
            Some("www.example.com".to_string())
        );
        assert_eq!(
            normalize_hostname(domain, "*.api.example.com"),
            Some("api.example.com".to_string())
        );
        assert_eq!(
            normalize_hostname(domain, "  MAIL.Example.com. "),
            Some("mail.example.com".to_string())
        );
        assert_eq!(
            normalize_hostname(domain, "example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(normalize_hostname(domain, "other.com"), None);
        assert_eq!(normalize_hostname(domain, "notexample.com"), None);
        assert_eq!(normalize_hostname(domain, "dev.*.example.com"), None);
        assert_eq!(normalize_hostname(domain, "   "), None);
    }

    #[test]
    fn test_normalize_rejects_non_hostname_characters() {
        let domain = "example.com";
        assert_eq!(normalize_hostname(domain, "admin@mail.example.com"), None);
        assert_eq!(normalize_hostname(domain, "a b.example.com"), None);
        assert_eq!(normalize_hostname(domain, "wörk.example.com"), None);
        assert_eq!(
            normalize_hostname(domain, "_dmarc.example.com"),
            Some("_dmarc.example.com".to_string())
        );
        assert_eq!(
            normalize_hostname(domain, "cdn-1.example.com"),
            Some("cdn-1.example.com".to_string())
        );
    }

    #[test]
    fn test_is_within_domain() {
        assert!(is_within_domain("example.com", "example.com"));
        assert!(is_within_domain("a.b.example.com", "example.com"));
        assert!(!is_within_domain("badexample.com", "example.com"));
        assert!(!is_within_domain("example.com.evil.net", "example.com"));
    }

    #[test]
    fn test_build_candidates_skips_blank_and_comment_lines() {
        let words = strings(&["dev", "", "# comment", "api"]);
        let candidates = build_candidates("example.com", &words);

        let expected: BTreeSet<String> = strings(&["dev.example.com", "api.example.com"])
            .into_iter()
            .collect();
        assert_eq!(candidates, expected);
    }

    #[test]
    fn test_build_candidates_collapses_duplicates() {
        let words = strings(&["www", " www ", "www"]);
        let candidates = build_candidates("example.com", &words);
        assert_eq!(candidates.len(), 1);
        assert!(candidates.contains("www.example.com"));
    }

    #[test]
    fn test_mixed_case_word_merges_with_passive_name() {
        let passive: BTreeSet<String> = normalize_hostname("example.com", "WWW.example.com")
            .into_iter()
            .collect();
        let brute = build_candidates("example.com", &["WWW", "Api"]);

        assert!(brute.contains("api.example.com"));
        let merged = merge(&passive, &brute);
        assert_eq!(merged, strings(&["api.example.com", "www.example.com"]));
    }

    #[test]
    fn test_merge_is_sorted_commutative_and_idempotent() {
        let a: BTreeSet<String> = strings(&["www.example.com", "api.example.com"])
            .into_iter()
            .collect();
        let b: BTreeSet<String> = strings(&["dev.example.com", "www.example.com"])
            .into_iter()
            .collect();

        let ab = merge(&a, &b);
        let ba = merge(&b, &a);
        assert_eq!(ab, ba);
        assert_eq!(
            ab,
            strings(&["api.example.com", "dev.example.com", "www.example.com"])
        );

        let again = merge(&ab, &a);
        assert_eq!(again, ab);
    }

    #[test]
    fn test_merge_of_empty_sets() {
        let empty: Vec<String> = Vec::new();
        assert!(merge(&empty, &empty).is_empty());
    }
}
