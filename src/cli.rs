//! CLI: schema JSON → (AsciiDoc parameter reference | render check)
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, Args};
use colored::Colorize;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{render_document, Frame, Registry};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// document the constructor parameters of schema classes from their declared constraints
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// render the parameter reference document
    Render(RenderOut),
    /// render every class without writing, reporting failures
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more schema files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// only document these classes (repeatable)
    #[arg(long = "class")]
    classes: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct RenderOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .adoc file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// file whose contents precede the class blocks
    #[arg(long)]
    prelude: Option<PathBuf>,

    /// file whose contents follow the class blocks
    #[arg(long)]
    epilogue: Option<PathBuf>,

    /// skip classes that fail to render instead of aborting
    #[arg(long, default_value_t = false)]
    keep_going: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_registry(&self) -> Result<Registry> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut registry = Registry::default();
        for source_path in source_paths {
            let loaded = Registry::load(&source_path)
                .with_context(|| format!("failed to load schema {}", source_path.display()))?;
            registry.extend(loaded);
        }
        if !self.classes.is_empty() {
            let missing = registry.retain_named(&self.classes);
            if !missing.is_empty() {
                bail!("unknown class(es): {}", missing.join(", "));
            }
        }
        Ok(registry)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn verbose(&self) -> bool {
        self.verbose
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Render(target) => {
                let registry = target.input_settings.load_registry()?;
                let frame = Frame::new(
                    read_frame_part(target.prelude.as_deref())?,
                    read_frame_part(target.epilogue.as_deref())?,
                );

                let document = if target.keep_going {
                    let blocks = registry
                        .render_blocks()
                        .into_iter()
                        .filter_map(|(name, block)| match block {
                            Ok(block) => Some(block),
                            Err(error) => {
                                tracing::warn!(class = name, %error, "skipping class");
                                None
                            }
                        })
                        .collect::<Vec<_>>();
                    frame.wrap(blocks.iter().map(String::as_str))
                } else {
                    render_document(&registry, &frame).context("failed to render document")?
                };

                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("failed to create {}", parent.display()))?;
                    }
                    std::fs::write(out, &document)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    tracing::info!(
                        path = %out.display(),
                        classes = registry.classes.len(),
                        "wrote parameter reference"
                    );
                } else {
                    print!("{document}");
                }
                Ok(())
            }
            Command::Check(target) => {
                let registry = target.input_settings.load_registry()?;
                let mut failed = 0usize;
                for (name, block) in registry.render_blocks() {
                    match block {
                        Ok(_) => println!("{} {name}", "ok".green()),
                        Err(error) => {
                            failed += 1;
                            println!("{} {name}: {error}", "FAILED".red().bold());
                        }
                    }
                }
                if failed > 0 {
                    bail!("{failed} of {} class(es) failed to render", registry.classes.len());
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Contents of a prelude/epilogue file, or a single newline when none is given.
fn read_frame_part(path: Option<&Path>) -> Result<String> {
    match path {
        None => Ok("\n".to_string()),
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> SchemaResult<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                return Err(SchemaError::NoMatches(pattern.to_string()));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ------------------------------- Tests ------------------------------------ //
