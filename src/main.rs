//! # lifecyclegen command-line tool
//!
//! ## Usage
//!
//! ```bash
//! # Create onCreate in the Activity around line 12, column 5
//! lifecyclegen inject -i app/src/main/java/com/example/MainActivity.java \
//!     --line 12 --column 5 --token @layout/activity_main --kind activity --project app/src
//!
//! # Preview the edit without touching the file
//! lifecyclegen inject -i HomeFragment.java --offset 240 --token fragment_home --kind fragment -n
//!
//! # Show how a class is classified
//! lifecyclegen classify -i MainActivity.java --line 12 --column 5
//!
//! # Look up a string resource
//! lifecyclegen string --res app/src/main/res --key app_name
//! ```

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use lifecyclegen::classify::{classify_with_stage, DeclaredKind};
use lifecyclegen::command::{CreateMethodCommand, Outcome};
use lifecyclegen::config::Config;
use lifecyclegen::error::GenError;
use lifecyclegen::hierarchy::ProjectIndex;
use lifecyclegen::java::{offset_at, JavaFile};
use lifecyclegen::logging::init_logging;
use lifecyclegen::notify::{LogNotifier, NotificationQueue};
use lifecyclegen::resources::lookup_string;
use std::fs;
use std::path::{Path, PathBuf};

/// Command-line arguments for lifecyclegen
#[derive(Parser)]
#[command(name = "lifecyclegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (`RUST_LOG` takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    ///
    /// If not specified, lifecyclegen will search for `.lifecyclegen.toml` in the
    /// current directory and its parents.
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the missing onCreate / onCreateView method of a class
    Inject(InjectArgs),
    /// Print how the class at the caret is classified
    Classify(ClassifyArgs),
    /// Print the value of a string resource
    String(StringArgs),
}

/// Caret position, either as a byte offset or a 1-based line and column
#[derive(Args)]
struct Caret {
    /// Byte offset inside the class
    #[arg(long, conflicts_with_all = ["line", "column"], required_unless_present = "line")]
    offset: Option<usize>,

    /// 1-based line of the caret
    #[arg(long, requires = "column")]
    line: Option<usize>,

    /// 1-based column of the caret
    #[arg(long, requires = "line")]
    column: Option<usize>,
}

impl Caret {
    fn resolve(&self, text: &str) -> Result<usize> {
        match (self.offset, self.line, self.column) {
            (Some(offset), _, _) if offset <= text.len() => Ok(offset),
            (Some(offset), _, _) => bail!("Offset {} is past the end of the file", offset),
            (None, Some(line), Some(column)) => offset_at(text, line, column)
                .ok_or_else(|| anyhow!("Line {} column {} is outside the file", line, column)),
            _ => bail!("Either --offset or --line and --column is required"),
        }
    }
}

#[derive(Args)]
struct InjectArgs {
    /// Java source file to edit
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    caret: Caret,

    /// Selected layout name, bare (`activity_main`) or as a reference (`@layout/activity_main`)
    #[arg(short, long)]
    token: String,

    /// Declared component kind: `activity` or `fragment`
    #[arg(short, long)]
    kind: DeclaredKind,

    /// Name of the edit, used in logs
    #[arg(long, default_value = "Create lifecycle method")]
    label: String,

    /// Source root to index for supertype resolution
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Dry run - print the edited file without writing it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Fall back to the class name when ancestry is inconclusive
    ///
    /// Overrides configuration file if specified.
    #[arg(long)]
    name_fallback: Option<bool>,

    /// Reformat the whole file instead of only the inserted method
    ///
    /// Overrides configuration file if specified.
    #[arg(long)]
    reformat_whole_file: Option<bool>,

    /// Seconds a notification stays visible
    ///
    /// Overrides configuration file if specified.
    #[arg(long)]
    fadeout_secs: Option<u64>,
}

#[derive(Args)]
struct ClassifyArgs {
    /// Java source file containing the class
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    caret: Caret,

    /// Source root to index for supertype resolution
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Fall back to the class name when ancestry is inconclusive
    #[arg(long)]
    name_fallback: Option<bool>,
}

#[derive(Args)]
struct StringArgs {
    /// `res/` directory or a single `strings.xml`
    #[arg(short, long)]
    res: PathBuf,

    /// Resource name, e.g. `app_name`
    #[arg(short, long)]
    key: String,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(config_path) => Config::from_file(config_path).context(format!(
            "Failed to load configuration from {:?}",
            config_path
        )),
        None => Ok(Config::load_from_current_dir()),
    }
}

fn read_java(path: &Path) -> Result<JavaFile> {
    let source =
        fs::read_to_string(path).context(format!("Failed to read input file: {:?}", path))?;
    JavaFile::parse(source).context("Failed to parse Java source code")
}

/// Supertype index: Android stubs (if enabled), the project sources, then the edited file
fn build_index(config: &Config, project: Option<&Path>, file: &JavaFile) -> Result<ProjectIndex> {
    let mut index = if config.classify.android_stubs {
        ProjectIndex::with_android_stubs()
    } else {
        ProjectIndex::new()
    };
    if let Some(root) = project {
        let files = index
            .scan(root)
            .context(format!("Failed to index project sources in {:?}", root))?;
        println!("Indexed {} Java files from {:?}", files, root);
    }
    index.add_file(file);
    Ok(index)
}

/// Replace `path` by writing a sibling file and renaming it over the original
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let staging = path.with_extension("java.lifecyclegen");
    fs::write(&staging, contents).context(format!("Failed to write {:?}", staging))?;
    if let Err(err) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(err).context(format!("Failed to replace {:?}", path));
    }
    Ok(())
}

fn run_inject(args: InjectArgs, mut config: Config) -> Result<()> {
    config.merge_with_args(args.name_fallback, args.reformat_whole_file, args.fadeout_secs);

    let file = read_java(&args.input)?;
    let offset = args.caret.resolve(file.text())?;
    let class = file
        .class_at(offset)
        .ok_or(GenError::NoClassAtOffset(offset))
        .context(format!("Nothing to edit in {:?}", args.input))?;
    let index = build_index(&config, args.project.as_deref(), &file)?;

    println!("Target class: {}", class.fqn);

    let mut notifications = NotificationQueue::new();
    let mut command = CreateMethodCommand::new(args.label, args.token, args.kind, &config);
    let outcome = command.execute(&file, &class, &index, &mut notifications);

    let result = match &outcome {
        Outcome::Created {
            method,
            source,
            imports,
        } if args.dry_run => {
            println!("\n{}", "=".repeat(60));
            println!("DRY RUN - {} would be created", method);
            println!("{}", "=".repeat(60));
            print!("{}", source);
            if !imports.added.is_empty() {
                println!("{}", "=".repeat(60));
                println!("Imports added: {}", imports.added.join(", "));
            }
            Ok(())
        }
        Outcome::Created {
            method, source, ..
        } => {
            // Create backup for rollback support
            let backup_dir = std::env::temp_dir()
                .join(format!(".lifecyclegen_backup_{}", std::process::id()));
            fs::create_dir_all(&backup_dir)?;
            fs::copy(&args.input, backup_dir.join("original.java"))?;
            println!("📦 Backup created at: {:?}", backup_dir);

            write_atomically(&args.input, source)?;
            println!("Created {} in {:?}", method, args.input);
            Ok(())
        }
        Outcome::Skipped(reason) => {
            println!("Nothing to do: {}", reason);
            Ok(())
        }
        Outcome::Failed(message) => Err(anyhow!("{}: {}", command.label(), message)),
    };

    // The edit is committed (or abandoned); now the user may see what happened
    notifications.flush(&mut LogNotifier);
    result
}

fn run_classify(args: ClassifyArgs, mut config: Config) -> Result<()> {
    config.merge_with_args(args.name_fallback, None, None);

    let file = read_java(&args.input)?;
    let offset = args.caret.resolve(file.text())?;
    let class = file
        .class_at(offset)
        .ok_or(GenError::NoClassAtOffset(offset))?;
    let index = build_index(&config, args.project.as_deref(), &file)?;

    let classification = classify_with_stage(&class, &index, &config.classify);
    println!("Class: {}", class.fqn);
    match classification.stage {
        Some(stage) => println!("Kind: {} (by {})", classification.kind, stage),
        None => println!("Kind: {}", classification.kind),
    }
    if let Some(superclass) = &class.superclass {
        println!("Extends: {}", superclass.candidates.first().unwrap_or(&superclass.written));
    }
    println!(
        "Implements OnClickListener: {}",
        if class.implements_matching("OnClickListener") { "yes" } else { "no" }
    );

    for method in ["onCreate", "onCreateView", "initView", "onClick"] {
        if let Some(statements) = class.method_statements(method) {
            println!("\n{} ({} statements):", method, statements.len());
            for statement in statements {
                println!("  {}", statement);
            }
        }
    }
    Ok(())
}

fn run_string(args: StringArgs) -> Result<()> {
    let value = lookup_string(&args.res, &args.key)
        .context(format!("Failed to read string resources under {:?}", args.res))?;
    match value {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => bail!("No string resource named `{}` under {:?}", args.key, args.res),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Inject(args) => run_inject(args, load_config(cli.config.as_deref())?),
        Command::Classify(args) => run_classify(args, load_config(cli.config.as_deref())?),
        Command::String(args) => run_string(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_inject() {
        let cli = Cli::try_parse_from([
            "lifecyclegen",
            "inject",
            "-i",
            "Main.java",
            "--line",
            "3",
            "--column",
            "5",
            "--token",
            "@layout/activity_main",
            "--kind",
            "Activity",
            "--reformat-whole-file",
            "true",
        ])
        .unwrap();

        let Command::Inject(args) = cli.command else {
            panic!("expected inject");
        };
        assert_eq!(args.kind, DeclaredKind::Activity);
        assert_eq!(args.caret.line, Some(3));
        assert_eq!(args.reformat_whole_file, Some(true));
        assert!(!args.dry_run);
    }

    #[test]
    fn test_cli_rejects_unknown_kind_and_missing_caret() {
        assert!(Cli::try_parse_from([
            "lifecyclegen", "inject", "-i", "A.java", "--offset", "1", "-t", "x", "-k", "service",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "lifecyclegen", "inject", "-i", "A.java", "-t", "x", "-k", "activity",
        ])
        .is_err());
    }

    #[test]
    fn test_caret_resolution() {
        let text = "class A {\n    int x;\n}\n";
        let caret = Caret { offset: None, line: Some(2), column: Some(5) };
        assert_eq!(caret.resolve(text).unwrap(), text.find("int").unwrap());

        let past_end = Caret { offset: Some(999), line: None, column: None };
        assert!(past_end.resolve(text).is_err());
    }

    #[test]
    fn test_failed_replace_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be replaced by a file
        let target = dir.path().join("Main.java");
        fs::create_dir(&target).unwrap();

        assert!(write_atomically(&target, "class Main {}\n").is_err());
        assert!(!dir.path().join("Main.java.lifecyclegen").exists());
        assert!(target.is_dir());
    }

    #[test]
    fn test_inject_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MainActivity.java");
        fs::write(&path, "import android.app.Activity;\n\npublic class MainActivity extends Activity {\n}\n")
            .unwrap();

        let args = InjectArgs {
            input: path.clone(),
            caret: Caret { offset: Some(40), line: None, column: None },
            token: "activity_main".into(),
            kind: DeclaredKind::Activity,
            label: "Create lifecycle method".into(),
            project: None,
            dry_run: false,
            name_fallback: None,
            reformat_whole_file: None,
            fadeout_secs: None,
        };
        run_inject(args, Config::default()).unwrap();

        let edited = fs::read_to_string(&path).unwrap();
        assert!(edited.contains("import android.os.Bundle;"));
        assert!(edited.contains("        setContentView(R.layout.activity_main);\n"));
    }
}
