//! Source templates for the generated lifecycle methods

use std::fmt;

use crate::error::{GenError, Result};
use crate::naming::{is_java_identifier, parse_resource_reference};

/// A layout resource name that is safe to splice into `R.layout.<name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutName(String);

impl LayoutName {
    /// Validate a user-selected token
    ///
    /// Accepts either a bare resource name (`activity_main`) or a reference
    /// (`@layout/activity_main`). Anything that is not a Java identifier after
    /// stripping the reference prefix is rejected.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim();
        let name = if token.starts_with('@') {
            parse_resource_reference(token).ok_or_else(|| GenError::InvalidToken(token.into()))?
        } else {
            token
        };

        if !is_java_identifier(name) {
            return Err(GenError::InvalidToken(token.into()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle methods this tool can synthesize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleMethod {
    /// `Activity.onCreate(Bundle)`
    OnCreate,
    /// `Fragment.onCreateView(LayoutInflater, ViewGroup, Bundle)`
    OnCreateView,
}

impl LifecycleMethod {
    pub fn name(self) -> &'static str {
        match self {
            LifecycleMethod::OnCreate => "onCreate",
            LifecycleMethod::OnCreateView => "onCreateView",
        }
    }

    /// Render the method declaration for `layout`
    ///
    /// Types are written fully qualified; the cleanup pass shortens them and
    /// adds the imports.
    pub fn render(self, layout: &LayoutName) -> String {
        match self {
            LifecycleMethod::OnCreate => format!(
                "@Override\n\
                 protected void onCreate(android.os.Bundle savedInstanceState) {{\n\
                 \tsuper.onCreate(savedInstanceState);\n\
                 \t// onCreate was generated, run FindViewById again to bind the views\n\
                 \tsetContentView(R.layout.{layout});\n\
                 }}"
            ),
            LifecycleMethod::OnCreateView => format!(
                "@Override\n\
                 public android.view.View onCreateView(android.view.LayoutInflater inflater, \
                 android.view.ViewGroup container, android.os.Bundle savedInstanceState) {{\n\
                 \t// onCreateView was generated, run FindViewById again to bind the views\n\
                 \tandroid.view.View view = inflater.inflate(R.layout.{layout}, container, false);\n\
                 \treturn view;\n\
                 }}"
            ),
        }
    }
}

impl fmt::Display for LifecycleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
