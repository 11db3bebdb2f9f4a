//! Post-edit cleanup: reference shortening, import optimization and reformatting
//!
//! Each pass takes source text and returns new text; they re-parse their input
//! so they can run in any order. [`crate::command`] runs them as
//! reformat (inserted member) -> shorten references -> optimize imports, which
//! yields the same text as the host order (imports, references, reformat) while
//! keeping the inserted member's byte range valid for the reformat pass.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::java::{node_text, visit_nodes, Import, JavaFile};
use crate::naming::simple_name;

/// Node kinds whose contents are indented one level deeper than the node itself
const BLOCK_KINDS: &[&str] = &[
    "class_body",
    "interface_body",
    "enum_body",
    "annotation_type_body",
    "block",
    "constructor_body",
    "switch_block",
    "switch_block_statement_group",
    "switch_rule",
];

/// Node kinds whose continuation lines are left exactly as written
const VERBATIM_KINDS: &[&str] = &["block_comment", "string_literal", "text_block"];

/// Summary of an import optimization pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// Replace qualified type references inside `range` with simple names
///
/// A reference `a.b.C.Inner` becomes `C.Inner` and `a.b.C` is returned as an
/// import to add. References whose simple name is already taken by another
/// import, by a type declared in the file, or by an unqualified use that
/// resolves some other way (wildcard import, same package) are left qualified.
///
/// # Returns
///
/// The rewritten source and the fully-qualified names that need importing.
pub fn shorten_references(source: &str, range: Range<usize>) -> Result<(String, Vec<String>)> {
    let file = JavaFile::parse(source)?;
    let imports = file.imports();
    let package = file.package();
    let declared = file.declared_type_names();

    // simple name -> FQN it is bound to, seeded with single-type imports
    let mut bound: HashMap<String, String> = imports
        .iter()
        .filter(|i| !i.is_static && !i.wildcard)
        .map(|i| (simple_name(&i.path).to_string(), i.path.clone()))
        .collect();
    // Names the file already uses that resolve through a wildcard import, the
    // package or java.lang; a new single-type import would rebind them
    let taken: HashSet<String> = unqualified_type_names(&file)
        .into_iter()
        .filter(|name| !bound.contains_key(name) && !declared.contains(name))
        .collect();

    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    let mut to_import: BTreeSet<String> = BTreeSet::new();

    visit_nodes(file.tree().root_node(), &mut |node| {
        if node.kind() != "scoped_type_identifier"
            || node.parent().is_some_and(|p| p.kind() == "scoped_type_identifier")
            || node.start_byte() < range.start
            || node.end_byte() > range.end
        {
            return;
        }

        let written: String = node_text(node, source)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if written.contains(['<', '@']) {
            return;
        }

        let segments: Vec<&str> = written.split('.').collect();
        let Some(outer) = segments.iter().position(|s| s.starts_with(char::is_uppercase)) else {
            return;
        };
        if outer == 0 {
            return;
        }

        let outer_fqn = segments[..=outer].join(".");
        let simple = segments[outer];
        match bound.get(simple) {
            Some(existing) if *existing != outer_fqn => return,
            Some(_) => {}
            None => {
                if declared.contains(simple) || taken.contains(simple) {
                    return;
                }
                bound.insert(simple.to_string(), outer_fqn.clone());
            }
        }

        let outer_package = segments[..outer].join(".");
        let already_visible = outer_package == "java.lang"
            || package.as_deref() == Some(outer_package.as_str())
            || imports.iter().any(|i| {
                !i.is_static
                    && ((i.wildcard && i.path == outer_package)
                        || (!i.wildcard && i.path == outer_fqn))
            });
        if !already_visible {
            to_import.insert(outer_fqn);
        }

        edits.push((node.start_byte()..node.end_byte(), segments[outer..].join(".")));
    });

    let mut text = source.to_string();
    for (span, replacement) in edits.iter().rev() {
        text.replace_range(span.clone(), replacement);
    }
    debug!(shortened = edits.len(), imports = to_import.len(), "qualified references shortened");

    Ok((text, to_import.into_iter().collect()))
}

/// Capitalized names used as a type, or as the head of a qualified name, without
/// a package prefix (`View`, `View.OnClickListener`, `TextUtils.isEmpty(..)`)
fn unqualified_type_names(file: &JavaFile) -> HashSet<String> {
    let source = file.text();
    let mut names = HashSet::new();
    visit_nodes(file.tree().root_node(), &mut |node| {
        let Some(parent) = node.parent() else {
            return;
        };
        let simple_use = match node.kind() {
            "type_identifier" => {
                parent.kind() != "scoped_type_identifier"
                    || parent.start_byte() == node.start_byte()
            }
            "identifier" => {
                matches!(parent.kind(), "field_access" | "method_invocation")
                    && parent.child_by_field_name("object") == Some(node)
            }
            _ => false,
        };
        let text = node_text(node, source);
        if simple_use && text.starts_with(char::is_uppercase) {
            names.insert(text.to_string());
        }
    });
    names
}

/// Capitalized words mentioned in Javadoc, e.g. `{@link Foo}`
fn javadoc_words(comment: &str, into: &mut HashSet<String>) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\b[A-Z][A-Za-z0-9_$]*\b").expect("valid regex"));
    into.extend(re.find_iter(comment).map(|m| m.as_str().to_string()));
}

/// Names referenced anywhere outside the package and import declarations
fn referenced_names(file: &JavaFile) -> HashSet<String> {
    let source = file.text();
    let mut names = HashSet::new();
    let root = file.tree().root_node();
    let mut cursor = root.walk();
    for top in root.children(&mut cursor) {
        if matches!(top.kind(), "package_declaration" | "import_declaration") {
            continue;
        }
        visit_nodes(top, &mut |node| match node.kind() {
            "identifier" | "type_identifier" => {
                names.insert(node_text(node, source).to_string());
            }
            "block_comment" if node_text(node, source).starts_with("/**") => {
                javadoc_words(node_text(node, source), &mut names);
            }
            _ => {}
        });
    }
    names
}

/// Add `extra` imports, drop duplicates and (optionally) unused single-type
/// imports, and sort the block
///
/// Regular imports come first, then static imports after a blank line.
/// Comments found between imports move above the block. The file is returned
/// untouched when the block is already in that shape.
pub fn optimize_imports(
    source: &str,
    extra: &[String],
    remove_unused: bool,
) -> Result<(String, ImportChanges)> {
    let file = JavaFile::parse(source)?;
    let existing = file.imports();
    let mut changes = ImportChanges::default();

    let used = if remove_unused {
        Some(referenced_names(&file))
    } else {
        None
    };

    let mut seen = HashSet::new();
    let mut kept: Vec<Import> = Vec::new();
    for import in &existing {
        if !seen.insert(import.render()) {
            continue;
        }
        let unused = used.as_ref().is_some_and(|names| {
            !import.is_static && !import.wildcard && !names.contains(simple_name(&import.path))
        });
        if unused {
            changes.removed.push(import.path.clone());
            continue;
        }
        kept.push(import.clone());
    }

    for fqn in extra {
        let import = Import {
            path: fqn.clone(),
            is_static: false,
            wildcard: false,
            start: 0,
            end: 0,
        };
        if seen.insert(import.render()) {
            changes.added.push(fqn.clone());
            kept.push(import);
        }
    }

    let (mut statics, mut regular): (Vec<Import>, Vec<Import>) =
        kept.into_iter().partition(|i| i.is_static);
    regular.sort_by(|a, b| a.path.cmp(&b.path));
    statics.sort_by(|a, b| a.path.cmp(&b.path));

    let mut block = regular.iter().map(Import::render).collect::<Vec<_>>().join("\n");
    if !statics.is_empty() {
        if !block.is_empty() {
            block.push_str("\n\n");
        }
        block.push_str(&statics.iter().map(Import::render).collect::<Vec<_>>().join("\n"));
    }

    let text = match (existing.first(), existing.last()) {
        (Some(first), Some(last)) => {
            // Comments between imports cannot follow the sorted lines; they are
            // kept in order above the block
            let root = file.tree().root_node();
            let mut cursor = root.walk();
            let comments: Vec<&str> = root
                .named_children(&mut cursor)
                .filter(|n| matches!(n.kind(), "line_comment" | "block_comment"))
                .filter(|n| n.start_byte() > first.start && n.end_byte() < last.end)
                .map(|n| node_text(n, source))
                .collect();
            if !comments.is_empty() {
                let imports = std::mem::take(&mut block);
                block = comments.join("\n");
                if !imports.is_empty() {
                    block.push('\n');
                    block.push_str(&imports);
                }
            }

            let current = &source[first.start..last.end];
            if current == block {
                return Ok((source.to_string(), changes));
            }
            let mut text = String::with_capacity(source.len() + block.len());
            text.push_str(&source[..first.start]);
            text.push_str(&block);
            // Swallow the newline of a block that became empty
            let rest = &source[last.end..];
            text.push_str(if block.is_empty() { rest.trim_start_matches(['\r', '\n']) } else { rest });
            text
        }
        _ if block.is_empty() => return Ok((source.to_string(), changes)),
        _ => {
            let root = file.tree().root_node();
            let mut cursor = root.walk();
            let package_end = root
                .named_children(&mut cursor)
                .find(|n| n.kind() == "package_declaration")
                .map(|n| n.end_byte());
            match package_end {
                Some(at) => format!("{}\n\n{}{}", &source[..at], block, &source[at..]),
                None => format!("{}\n\n{}", block, source),
            }
        }
    };

    debug!(added = changes.added.len(), removed = changes.removed.len(), "imports optimized");
    Ok((text, changes))
}

/// Indentation depth of the token starting at byte `at`, or `None` when the
/// line continues a multi-line comment or string
fn depth_at(file: &JavaFile, at: usize) -> Option<usize> {
    let mut node = file.tree().root_node().descendant_for_byte_range(at, at + 1);
    let mut depth = 0;
    while let Some(current) = node {
        let (start, end) = (current.start_byte(), current.end_byte());
        if VERBATIM_KINDS.contains(&current.kind()) && start < at {
            return None;
        }
        if BLOCK_KINDS.contains(&current.kind()) && start < at && at + 1 < end {
            depth += 1;
        }
        node = current.parent();
    }
    Some(depth)
}

/// Re-indent lines by syntactic nesting depth
///
/// Only lines starting inside `range` are touched; `None` reformats the whole
/// file. Trailing whitespace is removed and blank lines are emptied.
pub fn reformat(source: &str, range: Option<Range<usize>>, indent: &str) -> Result<String> {
    let file = JavaFile::parse(source)?;
    let range = range.unwrap_or(0..source.len());
    let mut out = String::with_capacity(source.len());
    let mut line_start = 0;

    for line in source.split_inclusive('\n') {
        let offset = line_start;
        line_start += line.len();
        if offset < range.start || offset >= range.end {
            out.push_str(line);
            continue;
        }

        let newline = &line[line.trim_end_matches(['\n', '\r']).len()..];
        let content = line.trim_end_matches(['\n', '\r']).trim_end();
        let trimmed = content.trim_start();
        if trimmed.is_empty() {
            out.push_str(newline);
            continue;
        }

        let first = offset + (content.len() - trimmed.len());
        match depth_at(&file, first) {
            Some(depth) => {
                out.push_str(&indent.repeat(depth));
                out.push_str(trimmed);
            }
            None => out.push_str(content),
        }
        out.push_str(newline);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shorten_references_adds_imports() {
        let source = "package a;\n\nclass Main {\n    void f(android.os.Bundle b, android.view.View.OnClickListener l) {}\n}\n";
        let (text, imports) = shorten_references(source, 0..source.len()).unwrap();

        assert_eq!(
            text,
            "package a;\n\nclass Main {\n    void f(Bundle b, View.OnClickListener l) {}\n}\n"
        );
        assert_eq!(imports, vec!["android.os.Bundle".to_string(), "android.view.View".to_string()]);
    }

    #[test]
    fn test_shorten_respects_conflicts_and_range() {
        let source = "import com.example.Bundle;\nclass Main {\n    android.os.Bundle a;\n    java.lang.String s;\n    android.view.View v;\n}\n";
        let range_start = source.find("java.lang").unwrap();
        let (text, imports) = shorten_references(source, range_start..source.len()).unwrap();

        assert!(text.contains("android.os.Bundle a;"));
        assert!(text.contains("    String s;"));
        assert!(text.contains("    View v;"));
        assert_eq!(imports, vec!["android.view.View".to_string()]);
    }

    #[test]
    fn test_shorten_keeps_names_resolved_elsewhere() {
        let source = "package com.example;\n\nimport com.example.widgets.*;\n\nclass Home {\n    private View header;\n    private Toolbar.Style style;\n    android.view.View inflate() { return null; }\n    android.widget.Toolbar bar;\n    android.os.Bundle state;\n}\n";
        let (text, imports) = shorten_references(source, 0..source.len()).unwrap();

        assert!(text.contains("    private View header;\n"));
        assert!(text.contains("    android.view.View inflate()"));
        assert!(text.contains("    android.widget.Toolbar bar;"));
        assert!(text.contains("    Bundle state;"));
        assert_eq!(imports, vec!["android.os.Bundle".to_string()]);
    }

    #[test]
    fn test_shorten_skips_declared_names() {
        let source = "class Main {\n    com.other.Main m;\n}\n";
        let (text, imports) = shorten_references(source, 0..source.len()).unwrap();
        assert_eq!(text, source);
        assert!(imports.is_empty());
    }

    #[test]
    fn test_optimize_imports_sorts_dedupes_and_removes_unused() {
        let source = "package a;\n\nimport java.util.List;\nimport static org.junit.Assert.assertTrue;\nimport android.os.Bundle;\nimport java.util.List;\nimport java.util.Map;\n\nclass Main {\n    List<String> items;\n}\n";
        let (text, changes) =
            optimize_imports(source, &["android.view.View".to_string()], true).unwrap();

        assert_eq!(
            text,
            "package a;\n\nimport android.view.View;\nimport java.util.List;\n\nimport static org.junit.Assert.assertTrue;\n\nclass Main {\n    List<String> items;\n}\n"
        );
        assert_eq!(changes.added, vec!["android.view.View".to_string()]);
        assert_eq!(
            changes.removed,
            vec!["android.os.Bundle".to_string(), "java.util.Map".to_string()]
        );
    }

    #[test]
    fn test_optimize_imports_keeps_comments_between_imports() {
        let source = "import java.util.Map;\n// keep me\nimport java.util.List;\n/* import java.util.Set; */\nimport android.app.Activity;\n\nclass Main extends Activity {\n    List<String> items;\n}\n";
        let (text, changes) =
            optimize_imports(source, &["android.os.Bundle".to_string()], true).unwrap();

        assert_eq!(
            text,
            "// keep me\n/* import java.util.Set; */\nimport android.app.Activity;\nimport android.os.Bundle;\nimport java.util.List;\n\nclass Main extends Activity {\n    List<String> items;\n}\n"
        );
        assert_eq!(changes.removed, vec!["java.util.Map".to_string()]);

        let (again, _) = optimize_imports(&text, &[], false).unwrap();
        assert_eq!(again, text);
    }

    #[test]
    fn test_optimize_imports_keeps_javadoc_references() {
        let source = "import android.app.Activity;\n\n/** Same as {@link Activity}. */\nclass Main {}\n";
        let (text, changes) = optimize_imports(source, &[], true).unwrap();
        assert_eq!(text, source);
        assert!(changes.removed.is_empty());
    }

    #[test]
    fn test_optimize_imports_without_existing_block() {
        let source = "package a;\n\nclass Main {}\n";
        let (text, _) = optimize_imports(source, &["android.os.Bundle".to_string()], true).unwrap();
        assert_eq!(text, "package a;\n\nimport android.os.Bundle;\n\nclass Main {}\n");

        let bare = "class Main {}\n";
        let (text, _) = optimize_imports(bare, &["android.os.Bundle".to_string()], true).unwrap();
        assert_eq!(text, "import android.os.Bundle;\n\nclass Main {}\n");
    }

    #[test]
    fn test_reformat_range() {
        let source = "class Main {\n  int untouched;\n\t@Override\n\tprotected void onCreate() {\n\t\tsuper.onCreate();  \n\n\t}\n}\n";
        let start = source.find("\t@Override").unwrap();
        let end = source.rfind('}').unwrap();
        let text = reformat(source, Some(start..end), "    ").unwrap();

        assert_eq!(
            text,
            "class Main {\n  int untouched;\n    @Override\n    protected void onCreate() {\n        super.onCreate();\n\n    }\n}\n"
        );
    }

    #[test]
    fn test_reformat_leaves_comment_continuations() {
        let source = "class Main {\n/**\n   * Docs\n   */\nvoid f() {\nif (x) {\ny();\n}\n}\n}\n";
        let text = reformat(source, None, "  ").unwrap();
        assert_eq!(
            text,
            "class Main {\n  /**\n   * Docs\n   */\n  void f() {\n    if (x) {\n      y();\n    }\n  }\n}\n"
        );
    }
}
