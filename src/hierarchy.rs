//! Type hierarchy queries used for ancestry-based classification
//!
//! [`TypeHierarchy`] is the seam between classification and whatever knows the
//! project's types. [`ProjectIndex`] implements it from Java sources on disk plus
//! a table of well-known Android framework supertypes, so that chains such as
//! `MainActivity -> AppCompatActivity -> ... -> Activity` resolve without the SDK
//! being present.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::java::{ClassDecl, JavaFile, TypeRef};

/// Android framework types and their direct superclass
const ANDROID_SUPERTYPES: &[(&str, &str)] = &[
    ("android.app.Activity", "android.view.ContextThemeWrapper"),
    ("android.app.ListActivity", "android.app.Activity"),
    ("android.app.ExpandableListActivity", "android.app.Activity"),
    ("android.preference.PreferenceActivity", "android.app.ListActivity"),
    ("android.support.v4.app.SupportActivity", "android.app.Activity"),
    ("android.support.v4.app.FragmentActivity", "android.support.v4.app.SupportActivity"),
    ("android.support.v7.app.AppCompatActivity", "android.support.v4.app.FragmentActivity"),
    ("androidx.core.app.ComponentActivity", "android.app.Activity"),
    ("androidx.activity.ComponentActivity", "androidx.core.app.ComponentActivity"),
    ("androidx.fragment.app.FragmentActivity", "androidx.activity.ComponentActivity"),
    ("androidx.appcompat.app.AppCompatActivity", "androidx.fragment.app.FragmentActivity"),
    ("android.app.DialogFragment", "android.app.Fragment"),
    ("android.app.ListFragment", "android.app.Fragment"),
    ("android.preference.PreferenceFragment", "android.app.Fragment"),
    ("android.support.v4.app.DialogFragment", "android.support.v4.app.Fragment"),
    ("android.support.v4.app.ListFragment", "android.support.v4.app.Fragment"),
    ("androidx.fragment.app.DialogFragment", "androidx.fragment.app.Fragment"),
    ("androidx.fragment.app.ListFragment", "androidx.fragment.app.Fragment"),
    ("androidx.appcompat.app.AppCompatDialogFragment", "androidx.fragment.app.DialogFragment"),
    ("androidx.preference.PreferenceFragmentCompat", "androidx.fragment.app.Fragment"),
    (
        "com.google.android.material.bottomsheet.BottomSheetDialogFragment",
        "androidx.appcompat.app.AppCompatDialogFragment",
    ),
];

/// Resolves the direct supertypes of fully-qualified type names
pub trait TypeHierarchy {
    /// Direct supertypes of `fqn`, or `None` when the type is not known
    fn supertypes(&self, fqn: &str) -> Option<&[TypeRef]>;
}

/// Check whether `class` transitively extends or implements `base`
///
/// Every candidate of every supertype reference is followed. Types the
/// hierarchy cannot resolve end their branch; this is a "not found", never an
/// error.
pub fn is_inheritor<H: TypeHierarchy + ?Sized>(hierarchy: &H, class: &ClassDecl, base: &str) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut pending: Vec<&str> = class
        .supertypes()
        .flat_map(|t| t.candidates.iter().map(String::as_str))
        .collect();

    while let Some(fqn) = pending.pop() {
        if fqn == base {
            return true;
        }
        if !visited.insert(fqn) {
            continue;
        }
        if let Some(supers) = hierarchy.supertypes(fqn) {
            pending.extend(supers.iter().flat_map(|t| t.candidates.iter().map(String::as_str)));
        }
    }
    false
}

/// In-memory index of class declarations keyed by fully-qualified name
#[derive(Debug, Default)]
pub struct ProjectIndex {
    types: HashMap<String, Vec<TypeRef>>,
}

impl ProjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index pre-populated with the Android framework supertypes
    pub fn with_android_stubs() -> Self {
        let mut index = Self::new();
        for (fqn, superclass) in ANDROID_SUPERTYPES {
            index
                .types
                .insert((*fqn).to_string(), vec![TypeRef::exact(superclass)]);
        }
        index
    }

    /// Record every class declared in `file`
    ///
    /// Declarations already present (including stubs) are replaced.
    pub fn add_file(&mut self, file: &JavaFile) {
        for class in file.classes() {
            let supers: Vec<TypeRef> = class.supertypes().cloned().collect();
            self.types.insert(class.fqn, supers);
        }
    }

    /// Index every `.java` file below `root`
    ///
    /// Files that cannot be read are skipped with a warning; an unreadable
    /// directory tree is an error.
    pub fn scan<P: AsRef<Path>>(&mut self, root: P) -> Result<usize> {
        let mut indexed = 0;
        for entry in WalkDir::new(root.as_ref()).follow_links(false) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !matches!(path.extension(), Some(ext) if ext == "java") {
                continue;
            }

            let source = match fs::read_to_string(path) {
                Ok(source) => source,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable source");
                    continue;
                }
            };
            let file = JavaFile::parse(source)?;
            self.add_file(&file);
            indexed += 1;
        }
        debug!(root = %root.as_ref().display(), files = indexed, types = self.types.len(), "project indexed");
        Ok(indexed)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeHierarchy for ProjectIndex {
    fn supertypes(&self, fqn: &str) -> Option<&[TypeRef]> {
        self.types.get(fqn).map(Vec::as_slice)
    }
}

impl TypeHierarchy for HashMap<String, Vec<TypeRef>> {
    fn supertypes(&self, fqn: &str) -> Option<&[TypeRef]> {
        self.get(fqn).map(Vec::as_slice)
    }
}
