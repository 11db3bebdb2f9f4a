//! Java structural model backed by `tree-sitter-java`
//!
//! This is the read side of the edit: it resolves the class enclosing a caret,
//! lists a class's own methods and supertypes, and resolves the names written in
//! `extends` / `implements` clauses against the file's package and imports.
//!
//! The model is rebuilt from text for every invocation; nothing here mutates
//! the source. Edits are produced as new text by [`crate::command`] and
//! [`crate::cleanup`].

use std::collections::{HashMap, HashSet};

use tree_sitter::{Node, Parser, Tree};

use crate::error::{GenError, Result};
use crate::naming::simple_name;

/// Node kinds that declare a named type and contribute to a nested class's FQN
const TYPE_DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// Create a parser loaded with the Java grammar
pub(crate) fn java_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| GenError::Parse(format!("failed to load Java grammar: {e}")))?;
    Ok(parser)
}

/// Visit a node and all of its descendants in pre-order
pub(crate) fn visit_nodes<'a, F: FnMut(Node<'a>)>(node: Node<'a>, f: &mut F) {
    f(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_nodes(child, f);
    }
}

/// Text of a node, or an empty string when the range is not valid UTF-8
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

/// A parsed Java compilation unit
pub struct JavaFile {
    text: String,
    tree: Tree,
}

/// One `import` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported path without `import`, `static` or the trailing `.*`
    pub path: String,
    pub is_static: bool,
    pub wildcard: bool,
    pub start: usize,
    pub end: usize,
}

impl Import {
    /// Render the declaration in canonical form
    pub fn render(&self) -> String {
        let prefix = if self.is_static { "import static " } else { "import " };
        let suffix = if self.wildcard { ".*" } else { "" };
        format!("{}{}{};", prefix, self.path, suffix)
    }
}

/// A type name as written in source plus the fully-qualified names it may denote
///
/// Candidates are ordered by Java's shadowing rules: single-type imports and
/// types declared in the same file first, then on-demand imports, the current
/// package and `java.lang`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub written: String,
    pub candidates: Vec<String>,
}

impl TypeRef {
    /// A reference that is already fully qualified
    pub fn exact(fqn: &str) -> Self {
        Self {
            written: fqn.to_string(),
            candidates: vec![fqn.to_string()],
        }
    }
}

/// A method declared directly in a class body
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub start: usize,
    pub end: usize,
    /// Source text of each statement in the body; `None` for abstract/native methods
    pub statements: Option<Vec<String>>,
}

/// A named class declaration
#[derive(Debug, Clone)]
pub struct ClassDecl {
    /// Simple name
    pub name: String,
    /// Fully-qualified name, including enclosing types for nested classes
    pub fqn: String,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub methods: Vec<MethodDecl>,
    pub start: usize,
    pub end: usize,
    /// Byte offset of the opening `{` of the class body
    pub body_start: usize,
    /// Byte offset of the closing `}` of the class body
    pub body_end: usize,
}

impl ClassDecl {
    /// Whether the class itself declares a method called `name` (inherited methods are ignored)
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// Direct supertypes, superclass first
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    /// Whether any `implements` clause mentions `needle` (e.g. `OnClickListener`)
    pub fn implements_matching(&self, needle: &str) -> bool {
        self.interfaces.iter().any(|i| i.written.contains(needle))
    }

    /// Statements of the first method called `name`, if it exists and has a body
    pub fn method_statements(&self, name: &str) -> Option<&[String]> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .and_then(|m| m.statements.as_deref())
    }
}

/// Name resolution scope for a single compilation unit
struct ResolveScope {
    package: Option<String>,
    imports: Vec<Import>,
    /// Simple name -> FQN of every type declared in the file
    local_types: HashMap<String, String>,
}

impl ResolveScope {
    fn resolve(&self, written: &str) -> TypeRef {
        let name: String = written
            .split('<')
            .next()
            .unwrap_or(written)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let candidates = match name.split_once('.') {
            // `Outer.Inner` where `Outer` is in scope, otherwise already qualified
            Some((head, rest)) => match self.resolve_simple(head).into_iter().next() {
                Some(outer) if head.starts_with(char::is_uppercase) => {
                    vec![format!("{}.{}", outer, rest)]
                }
                _ => vec![name.clone()],
            },
            None => self.resolve_simple(&name),
        };

        TypeRef {
            written: name,
            candidates,
        }
    }

    fn resolve_simple(&self, name: &str) -> Vec<String> {
        let single = self
            .imports
            .iter()
            .find(|i| !i.is_static && !i.wildcard && simple_name(&i.path) == name);
        if let Some(import) = single {
            return vec![import.path.clone()];
        }
        if let Some(fqn) = self.local_types.get(name) {
            return vec![fqn.clone()];
        }

        let mut candidates: Vec<String> = self
            .imports
            .iter()
            .filter(|i| !i.is_static && i.wildcard)
            .map(|i| format!("{}.{}", i.path, name))
            .collect();
        candidates.push(match &self.package {
            Some(pkg) => format!("{}.{}", pkg, name),
            None => name.to_string(),
        });
        candidates.push(format!("java.lang.{}", name));
        candidates
    }
}

impl JavaFile {
    /// Parse Java source text
    ///
    /// tree-sitter recovers from syntax errors, so this only fails when the
    /// grammar cannot be loaded or parsing is aborted.
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let mut parser = java_parser()?;
        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| GenError::Parse("tree-sitter failed to produce a syntax tree".into()))?;
        Ok(Self { text, tree })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Declared package, if any
    pub fn package(&self) -> Option<String> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        let package = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_declaration")?;

        let mut inner = package.walk();
        let name = package
            .named_children(&mut inner)
            .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
            .map(|n| node_text(n, &self.text).to_string());
        name
    }

    /// All import declarations in source order
    pub fn imports(&self) -> Vec<Import> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        let imports = root
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "import_declaration")
            .map(|n| {
                let raw: String = node_text(n, &self.text)
                    .trim_start_matches("import")
                    .trim_end_matches(';')
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                let (is_static, path) = match raw.strip_prefix("static ") {
                    Some(rest) => (true, rest.trim().to_string()),
                    None => (false, raw.trim().to_string()),
                };
                let (wildcard, path) = match path.strip_suffix(".*") {
                    Some(pkg) => (true, pkg.to_string()),
                    None => (false, path),
                };
                Import {
                    path: path.replace(' ', ""),
                    is_static,
                    wildcard,
                    start: n.start_byte(),
                    end: n.end_byte(),
                }
            })
            .collect();
        imports
    }

    /// Every named class declared in the file, outer classes first
    pub fn classes(&self) -> Vec<ClassDecl> {
        let scope = self.resolve_scope();
        let mut classes = Vec::new();
        visit_nodes(self.tree.root_node(), &mut |node| {
            if node.kind() == "class_declaration" {
                if let Some(class) = self.build_class(node, &scope) {
                    classes.push(class);
                }
            }
        });
        classes
    }

    /// The innermost named class enclosing `offset`
    ///
    /// Anonymous class bodies are skipped in favour of their enclosing
    /// declaration.
    pub fn class_at(&self, offset: usize) -> Option<ClassDecl> {
        let offset = offset.min(self.text.len());
        let mut node = self
            .tree
            .root_node()
            .descendant_for_byte_range(offset, offset)?;

        loop {
            if node.kind() == "class_declaration" {
                return self.build_class(node, &self.resolve_scope());
            }
            node = node.parent()?;
        }
    }

    /// Simple names of every type declared in the file, nested ones included
    pub fn declared_type_names(&self) -> HashSet<String> {
        let mut names = HashSet::new();
        visit_nodes(self.tree.root_node(), &mut |node| {
            if TYPE_DECLARATION_KINDS.contains(&node.kind()) {
                if let Some(name) = node.child_by_field_name("name") {
                    names.insert(node_text(name, &self.text).to_string());
                }
            }
        });
        names
    }

    /// Whether any syntax error or missing token overlaps `start..end`
    pub fn has_errors_in(&self, start: usize, end: usize) -> bool {
        fn check(node: Node<'_>, start: usize, end: usize) -> bool {
            if node.end_byte() <= start || node.start_byte() >= end {
                return false;
            }
            if node.is_error() || node.is_missing() {
                return true;
            }
            if !node.has_error() {
                return false;
            }
            let mut cursor = node.walk();
            let found = node.children(&mut cursor).any(|c| check(c, start, end));
            found
        }
        check(self.tree.root_node(), start, end)
    }

    fn resolve_scope(&self) -> ResolveScope {
        let package = self.package();
        let mut local_types = HashMap::new();
        visit_nodes(self.tree.root_node(), &mut |node| {
            if TYPE_DECLARATION_KINDS.contains(&node.kind()) {
                if let Some(name) = node.child_by_field_name("name") {
                    let fqn = self.qualified_name(node, package.as_deref());
                    local_types
                        .entry(node_text(name, &self.text).to_string())
                        .or_insert(fqn);
                }
            }
        });

        ResolveScope {
            package,
            imports: self.imports(),
            local_types,
        }
    }

    /// Package + enclosing type names + own name
    fn qualified_name(&self, decl: Node<'_>, package: Option<&str>) -> String {
        let mut segments = Vec::new();
        let mut current = Some(decl);
        while let Some(node) = current {
            if TYPE_DECLARATION_KINDS.contains(&node.kind()) {
                if let Some(name) = node.child_by_field_name("name") {
                    segments.push(node_text(name, &self.text).to_string());
                }
            }
            current = node.parent();
        }
        if let Some(pkg) = package {
            segments.push(pkg.to_string());
        }
        segments.reverse();
        segments.join(".")
    }

    fn build_class(&self, node: Node<'_>, scope: &ResolveScope) -> Option<ClassDecl> {
        let name = node_text(node.child_by_field_name("name")?, &self.text).to_string();
        let body = node.child_by_field_name("body")?;

        let superclass = node.child_by_field_name("superclass").and_then(|sc| {
            let mut cursor = sc.walk();
            let ty = sc.named_children(&mut cursor).last();
            ty.map(|t| scope.resolve(node_text(t, &self.text)))
        });

        let mut interfaces = Vec::new();
        if let Some(clause) = node.child_by_field_name("interfaces") {
            let mut cursor = clause.walk();
            for list in clause.named_children(&mut cursor) {
                if list.kind() != "type_list" {
                    continue;
                }
                let mut list_cursor = list.walk();
                for ty in list.named_children(&mut list_cursor) {
                    interfaces.push(scope.resolve(node_text(ty, &self.text)));
                }
            }
        }

        let mut methods = Vec::new();
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if member.kind() != "method_declaration" {
                continue;
            }
            let Some(method_name) = member.child_by_field_name("name") else {
                continue;
            };
            let statements = member.child_by_field_name("body").map(|block| {
                let mut block_cursor = block.walk();
                let statements: Vec<String> = block
                    .named_children(&mut block_cursor)
                    .filter(|s| !matches!(s.kind(), "line_comment" | "block_comment"))
                    .map(|s| node_text(s, &self.text).to_string())
                    .collect();
                statements
            });
            methods.push(MethodDecl {
                name: node_text(method_name, &self.text).to_string(),
                start: member.start_byte(),
                end: member.end_byte(),
                statements,
            });
        }

        Some(ClassDecl {
            name,
            fqn: self.qualified_name(node, scope.package.as_deref()),
            superclass,
            interfaces,
            methods,
            start: node.start_byte(),
            end: node.end_byte(),
            body_start: body.start_byte(),
            body_end: body.end_byte().saturating_sub(1),
        })
    }
}

/// Convert a 1-based line/column (in characters) into a byte offset
pub fn offset_at(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }
    let mut line_start = 0;
    for (index, current) in text.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let content = current.trim_end_matches(['\n', '\r']);
            let char_count = content.chars().count();
            if column > char_count + 1 {
                return None;
            }
            let within = content
                .char_indices()
                .nth(column - 1)
                .map(|(i, _)| i)
                .unwrap_or(content.len());
            return Some(line_start + within);
        }
        line_start += current.len();
    }
    // Caret on the empty line after a trailing newline
    (line_start == text.len() && column == 1 && text.lines().count() + 1 == line)
        .then_some(line_start)
}
