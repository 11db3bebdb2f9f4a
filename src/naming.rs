//! Naming helpers: resource references, Java identifiers and case conversion

/// Java reserved words and literals that can never be used as identifiers
const JAVA_RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null", "_",
];

/// Convert a snake_case name to UpperCamelCase
///
/// Splits on `_` and uppercases the first character of every segment.
/// Empty segments (leading, trailing or doubled underscores) contribute nothing.
///
/// ```
/// use lifecyclegen::naming::to_upper_camel_case;
/// assert_eq!(to_upper_camel_case("user_name"), "UserName");
/// assert_eq!(to_upper_camel_case(""), "");
/// ```
pub fn to_upper_camel_case(name: &str) -> String {
    name.split('_').map(first_to_upper_case).collect()
}

/// Uppercase the first character of `word`, leaving the rest untouched
pub fn first_to_upper_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Extract the resource name from a reference of the form `@<type>/<name>`
///
/// Returns `None` when the `@` prefix or the `/` separator is missing, or when
/// the reference does not split into exactly two non-empty parts. Trailing
/// separators are ignored, so `@layout/main/` names `main`.
pub fn parse_resource_reference(reference: &str) -> Option<&str> {
    if !reference.starts_with('@') || !reference.contains('/') {
        return None;
    }

    let mut parts = reference.trim_end_matches('/').split('/');
    let (_kind, name) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || name.is_empty() {
        return None;
    }
    Some(name)
}

/// Check whether `name` is a legal Java identifier
pub fn is_java_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !JAVA_RESERVED.contains(&name)
}

/// Last segment of a dotted name (`android.app.Activity` -> `Activity`)
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_camel_case() {
        assert_eq!(to_upper_camel_case("user_name"), "UserName");
        assert_eq!(to_upper_camel_case("activity_main_list"), "ActivityMainList");
        assert_eq!(to_upper_camel_case("title"), "Title");
        assert_eq!(to_upper_camel_case(""), "");
        assert_eq!(to_upper_camel_case("_tv__name_"), "TvName");
    }

    #[test]
    fn test_first_to_upper_case() {
        assert_eq!(first_to_upper_case("abc"), "Abc");
        assert_eq!(first_to_upper_case("Abc"), "Abc");
        assert_eq!(first_to_upper_case(""), "");
    }

    #[test]
    fn test_parse_resource_reference() {
        assert_eq!(parse_resource_reference("@layout/foo_bar"), Some("foo_bar"));
        assert_eq!(parse_resource_reference("@+id/btn_ok"), Some("btn_ok"));
        assert_eq!(parse_resource_reference("layout/foo_bar"), None);
        assert_eq!(parse_resource_reference("@layout"), None);
        assert_eq!(parse_resource_reference("@layout/a/b"), None);
        assert_eq!(parse_resource_reference("@layout/"), None);
        assert_eq!(parse_resource_reference("@layout//"), None);
        assert_eq!(parse_resource_reference("@layout/a/"), Some("a"));
        assert_eq!(parse_resource_reference("@layout//a"), None);
    }

    #[test]
    fn test_java_identifier() {
        assert!(is_java_identifier("activity_main"));
        assert!(is_java_identifier("$view1"));
        assert!(!is_java_identifier(""));
        assert!(!is_java_identifier("1layout"));
        assert!(!is_java_identifier("main-layout"));
        assert!(!is_java_identifier("class"));
        assert!(!is_java_identifier("foo); System.exit(0"));
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("android.app.Activity"), "Activity");
        assert_eq!(simple_name("Activity"), "Activity");
    }
}
