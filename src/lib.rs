//! # lifecyclegen - Android lifecycle method synthesis
//!
//! lifecyclegen inserts a missing lifecycle method into an Android Java class so
//! that view-binding code has somewhere to go: `onCreate(Bundle)` calling
//! `setContentView(R.layout.<name>)` for an Activity, and
//! `onCreateView(LayoutInflater, ViewGroup, Bundle)` inflating the layout for a
//! Fragment.
//!
//! ## Architecture
//!
//! - [`java`]: tree-sitter model of a Java file (classes, supertypes, methods, imports)
//! - [`hierarchy`]: supertype index and transitive inheritance queries
//! - [`classify`]: Activity / Fragment classification by ancestry, then by name
//! - [`template`]: validated layout names and the method templates
//! - [`command`]: the create-method edit (classify, decide, insert, clean up, notify)
//! - [`cleanup`]: reference shortening, import optimization and reformatting
//! - [`resources`]: `strings.xml` value lookup
//! - [`naming`]: identifier and resource-name helpers
//! - [`notify`]: notifications queued until the edit is committed
//!
//! ## Example
//!
//! ```rust,no_run
//! use lifecyclegen::classify::DeclaredKind;
//! use lifecyclegen::command::{CreateMethodCommand, Outcome};
//! use lifecyclegen::config::Config;
//! use lifecyclegen::hierarchy::ProjectIndex;
//! use lifecyclegen::java::JavaFile;
//! use lifecyclegen::notify::NotificationQueue;
//!
//! let source = "import android.app.Activity;\nclass Foo extends Activity {}\n";
//! let file = JavaFile::parse(source).unwrap();
//! let class = file.class_at(source.find("class").unwrap()).unwrap();
//!
//! let config = Config::default();
//! let mut queue = NotificationQueue::new();
//! let mut command =
//!     CreateMethodCommand::new("Create onCreate", "activity_main", DeclaredKind::Activity, &config);
//!
//! if let Outcome::Created { source, .. } =
//!     command.execute(&file, &class, &ProjectIndex::with_android_stubs(), &mut queue)
//! {
//!     println!("{source}");
//! }
//! ```

pub mod classify;
pub mod cleanup;
pub mod command;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod java;
pub mod logging;
pub mod naming;
pub mod notify;
pub mod resources;
pub mod template;

pub use error::{GenError, Result};
