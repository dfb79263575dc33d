//! Path canonicalization and lexical path predicates.
//!
//! The canonical form produced here is the sole key used for deduplication,
//! ancestry tests, and stable ID derivation: any two spellings a caller
//! would consider "the same file" must canonicalize identically. All output
//! is POSIX-like and `/`-separated regardless of the input's OS flavor.

use percent_encoding::percent_decode_str;

/// Optional Unicode normalization hook applied during canonicalization
/// (typically NFC). Injected by the host; the core never picks a form.
pub type UnicodeNormalizer = fn(&str) -> String;

/// Canonicalize a raw path into its POSIX-like form.
///
/// Steps, in order: trim outer whitespace (empty input becomes `/`);
/// backslashes become `/`; the optional Unicode normalizer runs; percent
/// escapes are decoded with file-URI semantics; a single `/` inserted ahead
/// of a Windows drive letter is stripped and the drive letter uppercased;
/// a leading `//` is treated as UNC-like and kept; finally the path is
/// normalized lexically (`.` collapsed, `..` resolved without escaping the
/// root, duplicate and trailing separators removed).
pub fn canonicalize(raw: &str, unicode_normalize: Option<UnicodeNormalizer>) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }

    let mut s = trimmed.replace('\\', "/");
    if let Some(normalize) = unicode_normalize {
        s = normalize(&s);
    }
    let mut s = percent_decode_str(&s).decode_utf8_lossy().into_owned();

    // File-URI parsing leaves "/C:/..." for drive paths; drop that slash.
    if starts_with_slashed_drive(&s) {
        s.remove(0);
    }

    let (prefix, rest) = split_prefix(&s);
    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                // Clamp at root: ".." never escapes the prefix.
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return match prefix {
            Prefix::Drive(letter) => format!("{}:/", letter),
            _ => "/".to_string(),
        };
    }

    match prefix {
        Prefix::Drive(letter) => format!("{}:/{}", letter, segments.join("/")),
        Prefix::Unc => format!("//{}", segments.join("/")),
        Prefix::Absolute => format!("/{}", segments.join("/")),
        Prefix::Relative => segments.join("/"),
    }
}

enum Prefix {
    Drive(char),
    Unc,
    Absolute,
    Relative,
}

fn split_prefix(s: &str) -> (Prefix, &str) {
    if let Some(letter) = drive_letter(s) {
        return (Prefix::Drive(letter), &s[2..]);
    }
    if s.starts_with("//") {
        return (Prefix::Unc, s);
    }
    if s.starts_with('/') {
        return (Prefix::Absolute, s);
    }
    (Prefix::Relative, s)
}

/// `X:` followed by `/` or end of string, uppercased.
fn drive_letter(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.next() != Some(':') {
        return None;
    }
    match chars.next() {
        None | Some('/') => Some(first.to_ascii_uppercase()),
        _ => None,
    }
}

fn starts_with_slashed_drive(s: &str) -> bool {
    s.strip_prefix('/')
        .is_some_and(|rest| drive_letter(rest).is_some())
}

/// Case-policy key for a canonical path.
pub fn fold(path: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        path.to_lowercase()
    } else {
        path.to_string()
    }
}

/// True iff `parent` equals `child` or is a path-segment ancestor of it,
/// under the case policy. Both arguments must already be canonical.
pub fn is_within(parent: &str, child: &str, case_insensitive: bool) -> bool {
    let p = fold(parent, case_insensitive);
    let c = fold(child, case_insensitive);
    if p == c {
        return true;
    }
    let prefix = if p.ends_with('/') { p } else { format!("{}/", p) };
    c.starts_with(&prefix)
}

/// Path segments after any root prefix.
pub fn segments(path: &str) -> Vec<&str> {
    let rest = if drive_letter(path).is_some() {
        &path[2..]
    } else {
        path
    };
    rest.split('/').filter(|s| !s.is_empty()).collect()
}

/// Number of segments; the ancestor-depth key for anchor ordering.
pub fn depth(path: &str) -> usize {
    segments(path).len()
}

/// Final path segment. Root forms (`/`, `X:/`, `//`) return themselves.
pub fn base_name(path: &str) -> &str {
    segments(path).last().copied().unwrap_or(path)
}

/// Parent directory of a canonical path. Root forms are their own parent.
pub fn parent_dir(path: &str) -> String {
    let segs = segments(path);
    if segs.is_empty() {
        return path.to_string();
    }
    let parent_segs = &segs[..segs.len() - 1];
    if let Some(letter) = drive_letter(path) {
        if parent_segs.is_empty() {
            return format!("{}:/", letter);
        }
        return format!("{}:/{}", letter, parent_segs.join("/"));
    }
    if path.starts_with("//") {
        if parent_segs.is_empty() {
            return "//".to_string();
        }
        return format!("//{}", parent_segs.join("/"));
    }
    if path.starts_with('/') {
        if parent_segs.is_empty() {
            return "/".to_string();
        }
        return format!("/{}", parent_segs.join("/"));
    }
    parent_segs.join("/")
}

/// Segments of `path` below `ancestor`, preserving the path's own casing.
/// Callers must have established ancestry via [`is_within`].
pub fn relative_segments(ancestor: &str, path: &str) -> Vec<String> {
    let skip = segments(ancestor).len();
    segments(path)
        .into_iter()
        .skip(skip)
        .map(str::to_string)
        .collect()
}

/// Strips configured prefixes from canonical paths to produce the display
/// form stored in `source_path`.
///
/// Prefixes are canonicalized up front and tried longest-first. The first
/// prefix that equals or contains the input wins: an exact match keeps the
/// prefix's own final segment (`/repo` stays visible as `/repo`), a
/// descendant keeps only the remainder, rooted with `/`. Paths no prefix
/// covers pass through unchanged.
#[derive(Debug, Clone)]
pub struct PrefixStripper {
    prefixes: Vec<String>,
    case_insensitive: bool,
    unicode_normalize: Option<UnicodeNormalizer>,
}

impl PrefixStripper {
    pub fn new(
        raw_prefixes: &[String],
        case_insensitive: bool,
        unicode_normalize: Option<UnicodeNormalizer>,
    ) -> Self {
        let mut prefixes: Vec<String> = raw_prefixes
            .iter()
            .map(|p| canonicalize(p, unicode_normalize))
            .collect();
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        prefixes.dedup();
        Self {
            prefixes,
            case_insensitive,
            unicode_normalize,
        }
    }

    /// Display form of `path` after prefix stripping.
    pub fn strip(&self, path: &str) -> String {
        let canonical = canonicalize(path, self.unicode_normalize);
        for prefix in &self.prefixes {
            if segments(prefix).is_empty() {
                continue;
            }
            if fold(prefix, self.case_insensitive) == fold(&canonical, self.case_insensitive) {
                return format!("/{}", base_name(prefix));
            }
            if is_within(prefix, &canonical, self.case_insensitive) {
                let rest = relative_segments(prefix, &canonical).join("/");
                return format!("/{}", rest);
            }
        }
        canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_become_root() {
        assert_eq!(canonicalize("", None), "/");
        assert_eq!(canonicalize("   ", None), "/");
    }

    #[test]
    fn test_backslashes_become_forward_slashes() {
        assert_eq!(canonicalize("C:\\work\\repo", None), "C:/work/repo");
        assert_eq!(canonicalize("a\\b\\c.txt", None), "a/b/c.txt");
    }

    #[test]
    fn test_drive_letter_uppercased() {
        assert_eq!(canonicalize("c:/work", None), "C:/work");
        assert_eq!(canonicalize("c:", None), "C:/");
    }

    #[test]
    fn test_leading_slash_before_drive_stripped() {
        assert_eq!(canonicalize("/C:/work", None), "C:/work");
    }

    #[test]
    fn test_percent_escapes_decoded() {
        assert_eq!(canonicalize("/a%20b/c", None), "/a b/c");
    }

    #[test]
    fn test_duplicate_and_trailing_separators_collapse() {
        assert_eq!(canonicalize("/a//b///c/", None), "/a/b/c");
        assert_eq!(canonicalize("/a/./b/.", None), "/a/b");
    }

    #[test]
    fn test_dot_dot_clamps_at_root() {
        assert_eq!(canonicalize("/a/../../b", None), "/b");
        assert_eq!(canonicalize("/..", None), "/");
        assert_eq!(canonicalize("C:/a/../..", None), "C:/");
    }

    #[test]
    fn test_unc_prefix_kept() {
        assert_eq!(canonicalize("//server/share/x", None), "//server/share/x");
    }

    #[test]
    fn test_unicode_normalizer_applied() {
        fn upper(s: &str) -> String {
            s.to_uppercase()
        }
        assert_eq!(canonicalize("/ab", Some(upper)), "/AB");
    }

    #[test]
    fn test_is_within_segment_boundaries() {
        assert!(is_within("/a/b", "/a/b", false));
        assert!(is_within("/a/b", "/a/b/c", false));
        assert!(!is_within("/a/b", "/a/bc", false));
        assert!(is_within("/", "/a", false));
        assert!(is_within("/A/B", "/a/b/c", true));
        assert!(!is_within("/A/B", "/a/b/c", false));
    }

    #[test]
    fn test_parent_dir_and_base_name() {
        assert_eq!(parent_dir("/a/b/c"), "/a/b");
        assert_eq!(parent_dir("/a"), "/");
        assert_eq!(parent_dir("/"), "/");
        assert_eq!(parent_dir("C:/x"), "C:/");
        assert_eq!(base_name("/a/b/c"), "c");
        assert_eq!(base_name("/"), "/");
    }

    #[test]
    fn test_relative_segments() {
        assert_eq!(
            relative_segments("/repo", "/repo/lib/a.rs"),
            vec!["lib".to_string(), "a.rs".to_string()]
        );
        assert!(relative_segments("/repo", "/repo").is_empty());
    }

    #[test]
    fn test_stripper_exact_match_keeps_final_segment() {
        let s = PrefixStripper::new(&["/repo".to_string()], true, None);
        assert_eq!(s.strip("/repo"), "/repo");
    }

    #[test]
    fn test_stripper_descendant_keeps_remainder() {
        let s = PrefixStripper::new(&["/repo".to_string()], true, None);
        assert_eq!(s.strip("/repo/lib/src"), "/lib/src");
    }

    #[test]
    fn test_stripper_longest_prefix_wins() {
        let s = PrefixStripper::new(
            &["/repo".to_string(), "/repo/lib".to_string()],
            true,
            None,
        );
        assert_eq!(s.strip("/repo/lib/src"), "/src");
    }

    #[test]
    fn test_stripper_unmatched_path_unchanged() {
        let s = PrefixStripper::new(&["/repo".to_string()], true, None);
        assert_eq!(s.strip("/other/x"), "/other/x");
    }

    #[test]
    fn test_stripper_case_policy() {
        let s = PrefixStripper::new(&["C:/Work/Repo".to_string()], true, None);
        assert_eq!(s.strip("c:/work/repo/lib"), "/lib");
    }
}
