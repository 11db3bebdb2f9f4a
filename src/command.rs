//! The create-method edit command
//!
//! [`CreateMethodCommand`] runs one undoable edit: classify the target class,
//! decide whether its lifecycle method is missing, insert the generated method,
//! clean up, and queue a notification. It never touches the file on disk; the
//! edited source is returned in [`Outcome::Created`] and the caller commits it
//! atomically (or drops it, which is the rollback).

use std::fmt;
use std::ops::Range;

use tracing::{debug, info, info_span, warn};

use crate::classify::{classify_with_stage, ComponentKind, DeclaredKind};
use crate::cleanup::{self, ImportChanges};
use crate::config::Config;
use crate::error::{GenError, Result};
use crate::hierarchy::TypeHierarchy;
use crate::java::{ClassDecl, JavaFile};
use crate::notify::{Notification, NotificationQueue};
use crate::template::{LayoutName, LifecycleMethod};

/// Why a command finished without editing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The class is not the kind of component the caller declared
    KindMismatch {
        declared: DeclaredKind,
        actual: ComponentKind,
    },
    /// The class already declares the lifecycle method
    MethodExists(LifecycleMethod),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::KindMismatch { declared, actual } => {
                write!(f, "declared {declared} but the class is classified as {actual}")
            }
            SkipReason::MethodExists(method) => write!(f, "{method} is already declared"),
        }
    }
}

/// Progress of a [`CreateMethodCommand`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandState {
    NotStarted,
    Classified(ComponentKind),
    Injected(LifecycleMethod),
    Skipped(SkipReason),
    Cleaned,
    Failed(String),
}

/// Result of running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The method was inserted; `source` is the complete edited file
    Created {
        method: LifecycleMethod,
        source: String,
        imports: ImportChanges,
    },
    Skipped(SkipReason),
    /// The edit was aborted; the message has been queued as a notification
    Failed(String),
}

/// Insert `member` as the last member of `class`
///
/// The member gets its own lines, separated from existing members by a blank
/// line. Returns the new source and the byte range of the inserted text.
/// Fails when the class body is unterminated or the inserted text does not
/// parse.
pub fn insert_member(
    source: &str,
    class: &ClassDecl,
    member: &str,
) -> Result<(String, Range<usize>)> {
    if source.as_bytes().get(class.body_end) != Some(&b'}') {
        return Err(GenError::Parse(format!(
            "class body of `{}` is not closed",
            class.name
        )));
    }

    let has_members = !source[class.body_start + 1..class.body_end].trim().is_empty();
    let separator = if has_members { "\n" } else { "" };
    let line_start = source[..class.body_end].rfind('\n').map_or(0, |i| i + 1);

    let (insert_at, text) = if source[line_start..class.body_end].trim().is_empty() {
        (line_start, format!("{}{}\n", separator, member))
    } else {
        (class.body_end, format!("\n{}{}\n", separator, member))
    };

    let mut edited = String::with_capacity(source.len() + text.len());
    edited.push_str(&source[..insert_at]);
    edited.push_str(&text);
    edited.push_str(&source[insert_at..]);

    let range = insert_at..insert_at + text.len();
    if JavaFile::parse(edited.as_str())?.has_errors_in(range.start, range.end) {
        return Err(GenError::Parse("generated code does not parse".into()));
    }
    Ok((edited, range))
}

/// Creates a missing `onCreate` / `onCreateView` in an Activity or Fragment
pub struct CreateMethodCommand<'a> {
    /// Human-readable name of the edit, as shown in undo history
    label: String,
    /// User selection naming the layout to inflate
    token: String,
    kind: DeclaredKind,
    config: &'a Config,
    state: CommandState,
}

impl<'a> CreateMethodCommand<'a> {
    pub fn new(
        label: impl Into<String>,
        token: impl Into<String>,
        kind: DeclaredKind,
        config: &'a Config,
    ) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
            kind,
            config,
            state: CommandState::NotStarted,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> &CommandState {
        &self.state
    }

    /// Run the edit, catching every failure
    ///
    /// Errors are logged, queued as an error notification and reported as
    /// [`Outcome::Failed`]; nothing is cleaned up or committed for them.
    pub fn execute<H: TypeHierarchy + ?Sized>(
        &mut self,
        file: &JavaFile,
        class: &ClassDecl,
        hierarchy: &H,
        notifications: &mut NotificationQueue,
    ) -> Outcome {
        match self.try_execute(file, class, hierarchy, notifications) {
            Ok(outcome) => outcome,
            Err(err) => {
                let message = err.to_string();
                warn!(label = %self.label, error = %message, "edit aborted");
                self.state = CommandState::Failed(message.clone());
                notifications.push(Notification::error(
                    message.clone(),
                    self.config.notify.fadeout(),
                ));
                Outcome::Failed(message)
            }
        }
    }

    /// Run the edit, propagating the first failure
    pub fn try_execute<H: TypeHierarchy + ?Sized>(
        &mut self,
        file: &JavaFile,
        class: &ClassDecl,
        hierarchy: &H,
        notifications: &mut NotificationQueue,
    ) -> Result<Outcome> {
        let span = info_span!("create_method", label = %self.label, class = %class.fqn, kind = %self.kind);
        let _guard = span.enter();

        let classification = classify_with_stage(class, hierarchy, &self.config.classify);
        self.state = CommandState::Classified(classification.kind);

        if !self.kind.matches(classification.kind) {
            let reason = SkipReason::KindMismatch {
                declared: self.kind,
                actual: classification.kind,
            };
            debug!(?reason, "class does not match the declared kind");
            return Ok(self.skip(reason));
        }

        let method = self.kind.lifecycle_method();
        if class.has_method(method.name()) {
            debug!(%method, "lifecycle method already present");
            return Ok(self.skip(SkipReason::MethodExists(method)));
        }

        let layout = LayoutName::parse(&self.token)?;
        let generated = method.render(&layout);
        let (inserted, member) =
            insert_member(file.text(), class, &generated).map_err(|err| GenError::Synthesis {
                method: method.name(),
                reason: err.to_string(),
            })?;
        self.state = CommandState::Injected(method);

        let (source, imports) = self.clean_up(file.text(), &inserted, member, class)?;
        self.state = CommandState::Cleaned;

        notifications.push(Notification::method_created(method, self.config.notify.fadeout()));
        info!(%method, %layout, added_imports = imports.added.len(), "lifecycle method created");

        Ok(Outcome::Created {
            method,
            source,
            imports,
        })
    }

    fn skip(&mut self, reason: SkipReason) -> Outcome {
        self.state = CommandState::Skipped(reason.clone());
        Outcome::Skipped(reason)
    }

    /// Reformat the new member, shorten references in the class, then fix imports
    fn clean_up(
        &self,
        original: &str,
        inserted: &str,
        member: Range<usize>,
        class: &ClassDecl,
    ) -> Result<(String, ImportChanges)> {
        let format = &self.config.format;

        let text = cleanup::reformat(inserted, Some(member), &format.indent)?;
        // Every length change so far happened inside the class
        let class_end = (class.end + text.len()).saturating_sub(original.len());

        let (text, to_import) = cleanup::shorten_references(&text, class.start..class_end)?;
        let (text, changes) =
            cleanup::optimize_imports(&text, &to_import, format.remove_unused_imports)?;

        let text = if format.reformat_whole_file {
            cleanup::reformat(&text, None, &format.indent)?
        } else {
            text
        };
        Ok((text, changes))
    }
}
