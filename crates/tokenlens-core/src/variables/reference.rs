//! Scanning of `var(--name[, fallback])` references inside a value string.

/// One `var()` occurrence, as byte offsets into the scanned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VarReference<'a> {
    /// Offset of the `v` in `var(`.
    pub start: usize,
    /// Offset one past the closing parenthesis.
    pub end: usize,
    pub name: &'a str,
    /// Raw fallback text, untrimmed of nested `var()` calls.
    pub fallback: Option<&'a str>,
}

/// True when `value` contains anything that looks like a `var(` call.
pub(crate) fn contains_reference(value: &str) -> bool {
    value.contains("var(")
}

/// Finds the top-level `var()` references in `value`, left to right.
///
/// References nested inside another reference's fallback are not reported;
/// they are found when the fallback itself is expanded.
/// A `var(` without a matching `)` ends the scan. Calls whose first argument
/// is not a custom property name are skipped and left as literal text.
pub(crate) fn find_references(value: &str) -> Vec<VarReference<'_>> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = value[cursor..].find("var(") {
        let start = cursor + offset;
        let body_start = start + "var(".len();

        let preceded_by_ident = value[..start]
            .chars()
            .next_back()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if preceded_by_ident {
            cursor = body_start;
            continue;
        }

        let Some(close) = matching_paren(value, body_start) else {
            break;
        };
        let body = &value[body_start..close];
        let (name, fallback) = match top_level_comma(body) {
            Some(comma) => (body[..comma].trim(), Some(&body[comma + 1..])),
            None => (body.trim(), None),
        };

        if name.starts_with("--") {
            found.push(VarReference {
                start,
                end: close + 1,
                name,
                fallback,
            });
        }
        cursor = close + 1;
    }

    found
}

/// Byte offset of the `)` closing a group whose body starts at `from`.
fn matching_paren(value: &str, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in value[from..].char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' if depth == 0 => return Some(from + i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn top_level_comma(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in body.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_reference() {
        let refs = find_references("var(--primary)");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "--primary");
        assert_eq!(refs[0].fallback, None);
        assert_eq!((refs[0].start, refs[0].end), (0, 14));
    }

    #[test]
    fn test_fallback_with_nested_parens() {
        let refs = find_references("var(--bg, rgb(0, 0, 0))");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "--bg");
        assert_eq!(refs[0].fallback, Some(" rgb(0, 0, 0)"));
    }

    #[test]
    fn test_nested_var_in_fallback_is_not_top_level() {
        let refs = find_references("var(--a, var(--b))");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "--a");
        assert_eq!(refs[0].fallback, Some(" var(--b)"));
    }

    #[test]
    fn test_multiple_references_in_one_value() {
        let value = "0 1px 2px var(--shadow-color), inset 0 0 0 1px var(--ring)";
        let names: Vec<_> = find_references(value).iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["--shadow-color", "--ring"]);
    }

    #[test]
    fn test_whitespace_around_name() {
        let refs = find_references("var(  --gap  )");
        assert_eq!(refs[0].name, "--gap");
    }

    #[test]
    fn test_quoted_parens_in_fallback() {
        let refs = find_references("var(--font, \"Foo (Bar)\"), serif");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].fallback, Some(" \"Foo (Bar)\""));
    }

    #[test]
    fn test_unbalanced_stops_scan() {
        assert!(find_references("var(--a").is_empty());
        assert!(find_references("var(--a, rgb(0 0 0)").is_empty());
    }

    #[test]
    fn test_non_custom_property_argument_is_skipped() {
        assert!(find_references("var(primary)").is_empty());
        assert!(find_references("somevar(--x)").is_empty());
    }
}
