//! String resource lookup in Android `strings.xml` documents

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;

/// Captures the raw inner markup of a `<string>` element's source text
fn string_body_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A<string\b[^>]*>(.*)</string\s*>\z").expect("valid regex")
    })
}

/// Find the value of the `<string name="key">` declaration in a resource document
///
/// Elements are visited depth-first in document order. The value is the raw
/// inner markup of the element, so entities and nested tags such as `<b>` are
/// returned as written.
///
/// When several declarations share `key`, the **last** one visited wins.
/// Self-closing declarations have no value and are skipped. Returns `Ok(None)`
/// when nothing matches and an error when the document is not well-formed XML.
pub fn extract_string_resource_value(xml: &str, key: &str) -> Result<Option<String>> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut value = None;

    for node in doc.descendants() {
        if !node.is_element()
            || node.tag_name().name() != "string"
            || node.attribute("name") != Some(key)
        {
            continue;
        }

        let raw = &xml[node.range()];
        if let Some(caps) = string_body_regex().captures(raw) {
            value = Some(caps[1].to_string());
        }
    }

    Ok(value)
}

/// Whether a `values*` directory carries a configuration qualifier (`values-de`, `values-night`)
fn is_qualified(path: &Path) -> bool {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .is_some_and(|name| name != "values")
}

/// Every `strings.xml` inside a `values*` directory below `res_root`
///
/// The unqualified `values/` files come first, then qualified ones, each group
/// sorted by path. A path that is itself a file is returned as-is.
pub fn find_string_resources<P: AsRef<Path>>(res_root: P) -> Result<Vec<PathBuf>> {
    let root = res_root.as_ref();
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        let path = entry.path();
        let in_values_dir = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("values"));
        if entry.file_type().is_file() && entry.file_name() == "strings.xml" && in_values_dir {
            files.push(path.to_path_buf());
        }
    }

    files.sort_by(|a, b| (is_qualified(a), a).cmp(&(is_qualified(b), b)));
    Ok(files)
}

/// Look up a string resource across a `res/` tree
///
/// Files are consulted in [`find_string_resources`] order and the first file
/// declaring `key` provides the value (last declaration within that file).
pub fn lookup_string<P: AsRef<Path>>(res_root: P, key: &str) -> Result<Option<String>> {
    for path in find_string_resources(res_root)? {
        let xml = fs::read_to_string(&path)?;
        if let Some(value) = extract_string_resource_value(&xml, key)? {
            debug!(path = %path.display(), key, "string resource resolved");
            return Ok(Some(value));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;

    const STRINGS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<resources>
    <string name="app_name">My Application</string>
    <string name="greeting">Hello <b>%1$s</b> &amp; welcome</string>
    <string name="empty"/>
    <string name="app_name" translatable="false">Second Name</string>
</resources>
"#;

    #[test]
    fn test_extract_simple_value() {
        assert_eq!(
            extract_string_resource_value(STRINGS, "greeting").unwrap().as_deref(),
            Some("Hello <b>%1$s</b> &amp; welcome")
        );
    }

    #[test]
    fn test_last_declaration_wins() {
        assert_eq!(
            extract_string_resource_value(STRINGS, "app_name").unwrap().as_deref(),
            Some("Second Name")
        );
    }

    #[test]
    fn test_missing_and_self_closing() {
        assert_eq!(extract_string_resource_value(STRINGS, "missing").unwrap(), None);
        assert_eq!(extract_string_resource_value(STRINGS, "empty").unwrap(), None);
    }

    #[test]
    fn test_multiline_value() {
        let xml = "<resources><string name=\"about\">line one\nline two</string></resources>";
        assert_eq!(
            extract_string_resource_value(xml, "about").unwrap().as_deref(),
            Some("line one\nline two")
        );
    }

    #[test]
    fn test_malformed_document() {
        let result = extract_string_resource_value("<resources><string name=\"a\">", "a");
        assert!(matches!(result, Err(GenError::Xml(_))));
    }

    #[test]
    fn test_lookup_prefers_default_values() {
        let dir = tempfile::tempdir().unwrap();
        let res = dir.path().join("res");
        fs::create_dir_all(res.join("values")).unwrap();
        fs::create_dir_all(res.join("values-de")).unwrap();
        fs::create_dir_all(res.join("layout")).unwrap();
        fs::write(
            res.join("values/strings.xml"),
            r#"<resources><string name="title">Title</string></resources>"#,
        )
        .unwrap();
        fs::write(
            res.join("values-de/strings.xml"),
            r#"<resources><string name="title">Titel</string><string name="only_de">Nur</string></resources>"#,
        )
        .unwrap();
        fs::write(res.join("layout/strings.xml"), "<resources/>").unwrap();

        let files = find_string_resources(&res).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("values/strings.xml"));

        assert_eq!(lookup_string(&res, "title").unwrap().as_deref(), Some("Title"));
        assert_eq!(lookup_string(&res, "only_de").unwrap().as_deref(), Some("Nur"));
        assert_eq!(lookup_string(&res, "nope").unwrap(), None);
    }
}
