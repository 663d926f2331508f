use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use component_ref_tagger::{ComponentRefTagger, HostContext, HostMode, TaggerOptions, TransformOutput};

#[derive(Parser)]
#[command(name = "component-ref-tagger")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug                Enable debug logging\n    COMPONENT_REF_EDITOR=cursor   Override the configured editor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag the JSX elements of one file and print the result
    Transform {
        /// Source file to read
        file: PathBuf,

        /// Module id to tag under (defaults to the absolute file path)
        #[arg(long)]
        id: Option<String>,

        /// JSON options file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Behave as a production build (no tagging)
        #[arg(long)]
        build: bool,
    },
    /// Run the open-in-editor side channel
    Serve {
        /// Project root that request paths are resolved against
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[arg(short, long, default_value_t = 5174)]
        port: u16,

        /// JSON options file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_options(path: Option<&Path>) -> Result<TaggerOptions> {
    match path {
        Some(p) => TaggerOptions::from_file(p)
            .with_context(|| format!("failed to load options from {}", p.display())),
        None => Ok(TaggerOptions::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Transform {
            file,
            id,
            config,
            build,
        } => {
            let options = load_options(config.as_deref())?;
            let code = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let abs = std::path::absolute(&file)
                .with_context(|| format!("failed to resolve {}", file.display()))?;
            let id = id.unwrap_or_else(|| abs.display().to_string());

            let root = abs.parent().map(Path::to_path_buf).unwrap_or_default();
            let mode = if build { HostMode::Build } else { HostMode::Serve };
            let tagger = ComponentRefTagger::new(options, HostContext { mode, root });

            match tagger.transform(&code, &id)? {
                TransformOutput::Transformed(out) => print!("{out}"),
                TransformOutput::Unchanged => {
                    debug!(file = %id, "unchanged");
                    print!("{code}");
                }
            }
            Ok(())
        }
        Commands::Serve { root, port, config } => {
            let options = load_options(config.as_deref())?;
            let root = std::path::absolute(&root)
                .with_context(|| format!("failed to resolve {}", root.display()))?;
            let tagger = ComponentRefTagger::new(options, HostContext::serve(root));

            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            runtime.block_on(component_ref_tagger::server::serve(addr, tagger.router()))?;
            Ok(())
        }
    }
}
