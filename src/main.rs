//! `pdfedit` CLI - edit PDF text in place through a rewriting service

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pdfedit::{
    EditedPdf, Editor, EditorConfig, EditorError, ElementId, MemoryEngine, RenderEngine, RewriteClient,
    SourceFile,
};

#[derive(Parser)]
#[command(name = "pdfedit")]
#[command(about = "Edit the text of a PDF in place via a rewriting service")]
#[command(version)]
struct Cli {
    /// Page magnification (overrides config)
    #[arg(long, global = true)]
    scale: Option<f64>,

    /// Rewriting service URL (overrides config and PDFEDIT_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Read page layouts from a JSON file instead of decoding the PDF
    #[arg(long, global = true, value_name = "FILE")]
    layout: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the editable text elements of a PDF
    Inspect {
        /// PDF file to open
        file: PathBuf,

        /// Print elements as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change element text and produce an edited PDF
    Edit {
        /// PDF file to edit
        file: PathBuf,

        /// Set an element's text: ID=TEXT (repeatable)
        #[arg(long = "set", value_name = "ID=TEXT", value_parser = parse_set)]
        sets: Vec<(ElementId, String)>,

        /// Replace every element whose original text is FROM: FROM=TO (repeatable)
        #[arg(long = "replace", value_name = "FROM=TO", value_parser = parse_replace)]
        replacements: Vec<(String, String)>,

        /// Print the edits payload instead of submitting it
        #[arg(long)]
        dry_run: bool,

        /// Directory for the edited file
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

fn parse_set(s: &str) -> std::result::Result<(ElementId, String), String> {
    let (id, text) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=TEXT, got '{s}'"))?;
    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("element id must be a number, got '{id}'"))?;
    Ok((ElementId(id), text.to_string()))
}

fn parse_replace(s: &str) -> std::result::Result<(String, String), String> {
    let (from, to) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FROM=TO, got '{s}'"))?;
    if from.is_empty() {
        return Err("FROM must not be empty".to_string());
    }
    Ok((from.to_string(), to.to_string()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<EditorError>() {
            Some(e) if e.is_informational() => println!("ℹ️  {}", e.user_message()),
            Some(e) => {
                eprintln!("❌ {}", e.user_message());
                std::process::exit(1);
            }
            None => {
                eprintln!("❌ {err:#}");
                std::process::exit(1);
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "pdfedit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = EditorConfig::load()?;
    if let Some(scale) = cli.scale {
        anyhow::ensure!(scale.is_finite() && scale > 0.0, "--scale must be positive");
        config.scale = scale;
    }
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    match cli.command {
        Commands::Inspect { file, json } => cmd_inspect(config, cli.layout.as_deref(), &file, json).await,
        Commands::Edit {
            file,
            sets,
            replacements,
            dry_run,
            output,
        } => {
            cmd_edit(
                config,
                cli.layout.as_deref(),
                &file,
                &sets,
                &replacements,
                dry_run,
                &output,
            )
            .await
        }
    }
}

fn create_engine(layout: Option<&Path>) -> Result<Box<dyn RenderEngine>> {
    if let Some(path) = layout {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let engine = MemoryEngine::from_json(&json)
            .with_context(|| format!("invalid layout in {}", path.display()))?;
        return Ok(Box::new(engine));
    }
    pdf_engine()
}

#[cfg(feature = "pdf")]
fn pdf_engine() -> Result<Box<dyn RenderEngine>> {
    Ok(Box::new(pdfedit::PdfiumEngine::new()?))
}

#[cfg(not(feature = "pdf"))]
fn pdf_engine() -> Result<Box<dyn RenderEngine>> {
    anyhow::bail!("built without the `pdf` feature; pass --layout or rebuild with --features pdf")
}

/// Validate the file type, then load and render it.
async fn open_editor(config: EditorConfig, layout: Option<&Path>, path: &Path) -> Result<Editor> {
    let file = SourceFile::open(path).await?;
    let engine = create_engine(layout)?;
    let mut editor = Editor::new(config);
    editor.open(engine.as_ref(), file).await?;
    Ok(editor)
}

async fn cmd_inspect(config: EditorConfig, layout: Option<&Path>, path: &Path, json: bool) -> Result<()> {
    let editor = open_editor(config, layout, path).await?;
    let session = editor.session().ok_or(EditorError::NoDocument)?;
    let records = session.layout.records();

    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    println!(
        "📄 {}: {} pages, {} editable elements",
        session.file.name,
        session.layout.pages().len(),
        records.len()
    );
    for record in records {
        println!(
            "   #{:<4} p{:<3} ({:.1}, {:.1}) {:.1}×{:.1}  {:.1}px  {:?}",
            record.owner,
            record.page_index + 1,
            record.rect.x,
            record.rect.y,
            record.rect.width,
            record.rect.height,
            record.font_size,
            record.original_text
        );
    }
    Ok(())
}

async fn cmd_edit(
    config: EditorConfig,
    layout: Option<&Path>,
    path: &Path,
    sets: &[(ElementId, String)],
    replacements: &[(String, String)],
    dry_run: bool,
    output: &Path,
) -> Result<()> {
    let mut editor = open_editor(config, layout, path).await?;

    for (id, text) in sets {
        editor.set_text(*id, text.clone())?;
    }

    for (from, to) in replacements {
        let targets: Vec<ElementId> = editor
            .session()
            .map(|s| {
                s.layout
                    .records()
                    .iter()
                    .filter(|r| r.original_text == *from)
                    .map(|r| r.owner)
                    .collect()
            })
            .unwrap_or_default();
        if targets.is_empty() {
            println!("⚠️  No element with text {from:?}");
        }
        for id in targets {
            editor.set_text(id, to.clone())?;
        }
    }

    if dry_run {
        let edits = editor.pending_edits();
        if edits.is_empty() {
            return Err(EditorError::NoChanges.into());
        }
        println!("{}", serde_json::to_string_pretty(&edits)?);
        return Ok(());
    }

    let client = RewriteClient::new(editor.config())?;
    println!("📤 Submitting {} edit(s) to {}", editor.pending_edits().len(), client.endpoint());
    let edited: EditedPdf = editor.save(&client).await?;
    let saved = edited.save_into(output).await?;
    println!("💾 Saved {} bytes to {}", edited.bytes.len(), saved.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_set_splits_on_first_equals() {
        let (id, text) = parse_set("3=a=b").unwrap();
        assert_eq!(id, ElementId(3));
        assert_eq!(text, "a=b");
        assert_eq!(parse_set("0=").unwrap().1, "");
        assert!(parse_set("x=1").is_err());
        assert!(parse_set("12").is_err());
    }

    #[test]
    fn parse_replace_requires_from() {
        assert_eq!(
            parse_replace("Hello=Hello, World").unwrap(),
            ("Hello".to_string(), "Hello, World".to_string())
        );
        assert!(parse_replace("=x").is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
