//! Activity / Fragment classification
//!
//! Classification runs in two stages:
//!
//! 1. [`classify_by_ancestry`] walks the supertype chain through a
//!    [`TypeHierarchy`] and matches it against the configured base types.
//! 2. [`classify_by_name`] looks for `Activity` / `Fragment` in the simple name.
//!
//! Stage 1 short-circuits when it finds a match. When it does not (the class
//! genuinely has no Android ancestor, or the chain runs into a type nobody
//! indexed) stage 2 decides.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::ClassifyConfig;
use crate::error::GenError;
use crate::hierarchy::{is_inheritor, TypeHierarchy};
use crate::java::ClassDecl;
use crate::template::LifecycleMethod;

/// Inferred component type of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Activity,
    Fragment,
    Unknown,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComponentKind::Activity => "activity",
            ComponentKind::Fragment => "fragment",
            ComponentKind::Unknown => "unknown",
        })
    }
}

/// Component type asserted by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredKind {
    Activity,
    Fragment,
}

impl DeclaredKind {
    /// Whether an inferred classification agrees with this declaration
    pub fn matches(self, kind: ComponentKind) -> bool {
        matches!(
            (self, kind),
            (DeclaredKind::Activity, ComponentKind::Activity)
                | (DeclaredKind::Fragment, ComponentKind::Fragment)
        )
    }

    /// The lifecycle method this kind of component inflates its layout in
    pub fn lifecycle_method(self) -> LifecycleMethod {
        match self {
            DeclaredKind::Activity => LifecycleMethod::OnCreate,
            DeclaredKind::Fragment => LifecycleMethod::OnCreateView,
        }
    }
}

impl FromStr for DeclaredKind {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activity" => Ok(DeclaredKind::Activity),
            "fragment" => Ok(DeclaredKind::Fragment),
            _ => Err(GenError::UnknownKind(s.to_string())),
        }
    }
}

impl fmt::Display for DeclaredKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeclaredKind::Activity => "activity",
            DeclaredKind::Fragment => "fragment",
        })
    }
}

/// Which stage produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ancestry,
    Name,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Ancestry => "ancestry",
            Stage::Name => "name",
        })
    }
}

/// Result of [`classify_with_stage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: ComponentKind,
    /// `None` when neither stage matched
    pub stage: Option<Stage>,
}

/// Stage 1: match the supertype chain against the configured base types
///
/// Activity bases are checked before fragment bases.
pub fn classify_by_ancestry<H: TypeHierarchy + ?Sized>(
    class: &ClassDecl,
    hierarchy: &H,
    config: &ClassifyConfig,
) -> Option<ComponentKind> {
    let inherits_any =
        |bases: &[String]| bases.iter().any(|base| is_inheritor(hierarchy, class, base));

    if inherits_any(&config.activity_base_types[..]) {
        Some(ComponentKind::Activity)
    } else if inherits_any(&config.fragment_base_types[..]) {
        Some(ComponentKind::Fragment)
    } else {
        None
    }
}

/// Stage 2: naming-convention fallback
pub fn classify_by_name(name: &str) -> ComponentKind {
    if name.contains("Activity") {
        ComponentKind::Activity
    } else if name.contains("Fragment") {
        ComponentKind::Fragment
    } else {
        ComponentKind::Unknown
    }
}

/// Classify a class, reporting which stage decided
pub fn classify_with_stage<H: TypeHierarchy + ?Sized>(
    class: &ClassDecl,
    hierarchy: &H,
    config: &ClassifyConfig,
) -> Classification {
    if let Some(kind) = classify_by_ancestry(class, hierarchy, config) {
        debug!(class = %class.fqn, %kind, "classified by ancestry");
        return Classification {
            kind,
            stage: Some(Stage::Ancestry),
        };
    }

    if config.name_fallback {
        let kind = classify_by_name(&class.name);
        if kind != ComponentKind::Unknown {
            debug!(class = %class.fqn, %kind, "ancestry inconclusive, classified by name");
            return Classification {
                kind,
                stage: Some(Stage::Name),
            };
        }
    }

    debug!(class = %class.fqn, "class is neither an activity nor a fragment");
    Classification {
        kind: ComponentKind::Unknown,
        stage: None,
    }
}

/// Classify a class as Activity, Fragment or Unknown
pub fn classify<H: TypeHierarchy + ?Sized>(
    class: &ClassDecl,
    hierarchy: &H,
    config: &ClassifyConfig,
) -> ComponentKind {
    classify_with_stage(class, hierarchy, config).kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::ProjectIndex;
    use crate::java::JavaFile;

    fn class_in(source: &str, name: &str) -> ClassDecl {
        let file = JavaFile::parse(source).unwrap();
        file.classes().into_iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn test_ancestry_beats_name() {
        // Name says fragment, hierarchy says activity
        let class = class_in(
            "import android.app.Activity;\nclass SettingsFragment extends Activity {}",
            "SettingsFragment",
        );
        let index = ProjectIndex::with_android_stubs();
        let config = ClassifyConfig::default();

        let result = classify_with_stage(&class, &index, &config);
        assert_eq!(result.kind, ComponentKind::Activity);
        assert_eq!(result.stage, Some(Stage::Ancestry));
    }

    #[test]
    fn test_ancestry_regardless_of_name() {
        let class = class_in(
            "import androidx.appcompat.app.AppCompatActivity;\nclass Login extends AppCompatActivity {}",
            "Login",
        );
        let index = ProjectIndex::with_android_stubs();
        assert_eq!(
            classify(&class, &index, &ClassifyConfig::default()),
            ComponentKind::Activity
        );
    }

    #[test]
    fn test_fragment_by_ancestry() {
        let class = class_in(
            "import androidx.fragment.app.DialogFragment;\nclass Picker extends DialogFragment {}",
            "Picker",
        );
        let index = ProjectIndex::with_android_stubs();
        assert_eq!(
            classify(&class, &index, &ClassifyConfig::default()),
            ComponentKind::Fragment
        );
    }

    #[test]
    fn test_name_fallback_when_unresolved() {
        let class = class_in("class MainActivity extends BaseScreen {}", "MainActivity");
        let index = ProjectIndex::new();

        let result = classify_with_stage(&class, &index, &ClassifyConfig::default());
        assert_eq!(result.kind, ComponentKind::Activity);
        assert_eq!(result.stage, Some(Stage::Name));
    }

    #[test]
    fn test_name_fallback_disabled() {
        let class = class_in("class MainActivity {}", "MainActivity");
        let config = ClassifyConfig {
            name_fallback: false,
            ..ClassifyConfig::default()
        };
        assert_eq!(classify(&class, &ProjectIndex::new(), &config), ComponentKind::Unknown);
    }

    #[test]
    fn test_classify_by_name() {
        assert_eq!(classify_by_name("MainActivity"), ComponentKind::Activity);
        assert_eq!(classify_by_name("HomeFragment"), ComponentKind::Fragment);
        assert_eq!(classify_by_name("ActivityFragment"), ComponentKind::Activity);
        assert_eq!(classify_by_name("UserRepository"), ComponentKind::Unknown);
    }

    #[test]
    fn test_declared_kind() {
        assert_eq!("activity".parse::<DeclaredKind>().unwrap(), DeclaredKind::Activity);
        assert_eq!("Fragment".parse::<DeclaredKind>().unwrap(), DeclaredKind::Fragment);
        assert!("service".parse::<DeclaredKind>().is_err());

        assert!(DeclaredKind::Activity.matches(ComponentKind::Activity));
        assert!(!DeclaredKind::Activity.matches(ComponentKind::Fragment));
        assert!(!DeclaredKind::Fragment.matches(ComponentKind::Unknown));
        assert_eq!(DeclaredKind::Fragment.lifecycle_method(), LifecycleMethod::OnCreateView);
    }
}
