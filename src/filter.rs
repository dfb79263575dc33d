//! Filter mini-language compiler.
//!
//! Compiles a textual query into the predicate arrow consumed by flatten.
//! Whitespace-separated terms AND together: a bare term is a
//! case-insensitive substring test on the name, `ext:foo` compares the
//! dotted extension, and `!foo` negates a substring test. A null or blank
//! query compiles to an always-true predicate.

/// Predicate over `(name, extension_lower)`.
pub type FilterPredicate = Box<dyn Fn(&str, &str) -> bool>;

enum Term {
    Substring(String),
    Negated(String),
    Extension(String),
}

/// Compile a query into a predicate.
pub fn compile_filter(query: Option<&str>) -> FilterPredicate {
    let terms = match query {
        Some(q) if !q.trim().is_empty() => parse_terms(q),
        _ => Vec::new(),
    };
    if terms.is_empty() {
        return Box::new(|_, _| true);
    }
    Box::new(move |name, ext_lower| {
        let name_lower = name.to_lowercase();
        terms.iter().all(|term| match term {
            Term::Substring(needle) => name_lower.contains(needle),
            Term::Negated(needle) => !name_lower.contains(needle),
            Term::Extension(ext) => ext_lower == ext,
        })
    })
}

fn parse_terms(query: &str) -> Vec<Term> {
    let mut terms = Vec::new();
    for raw in query.split_whitespace() {
        if let Some(ext) = raw.strip_prefix("ext:") {
            let ext = ext.trim_start_matches('.').to_lowercase();
            if !ext.is_empty() {
                terms.push(Term::Extension(format!(".{}", ext)));
            }
        } else if let Some(negated) = raw.strip_prefix('!') {
            if !negated.is_empty() {
                terms.push(Term::Negated(negated.to_lowercase()));
            }
        } else {
            terms.push(Term::Substring(raw.to_lowercase()));
        }
    }
    terms
}

/// Lowercased dotted extension of a display name (`".dart"`), or empty.
/// Leading-dot names (`.env`) have no extension.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(i) if i > 0 => name[i..].to_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_matches_everything() {
        let pred = compile_filter(None);
        assert!(pred("anything", ""));
        let pred = compile_filter(Some("   "));
        assert!(pred("anything", ".rs"));
    }

    #[test]
    fn test_substring_terms_and_together() {
        let pred = compile_filter(Some("scan model"));
        assert!(pred("scan_model.dart", ".dart"));
        assert!(!pred("scan.dart", ".dart"));
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let pred = compile_filter(Some("SCAN"));
        assert!(pred("my_scan.rs", ".rs"));
    }

    #[test]
    fn test_extension_term() {
        let pred = compile_filter(Some("ext:dart"));
        assert!(pred("a.dart", ".dart"));
        assert!(!pred("a.rs", ".rs"));
        let dotted = compile_filter(Some("ext:.dart"));
        assert!(dotted("a.dart", ".dart"));
    }

    #[test]
    fn test_negated_term() {
        let pred = compile_filter(Some("!test"));
        assert!(pred("main.rs", ".rs"));
        assert!(!pred("main_test.rs", ".rs"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.DART"), ".dart");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".env"), "");
    }
}
