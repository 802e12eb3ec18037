use std::path::PathBuf;

use anyhow::Result;
use blogsmith::build::build_site;
use blogsmith::config::Config;
use blogsmith::watch::watch;
use clap::Parser;

/// Builds the blog's article pages from `content/posts` and refreshes the
/// article listings on the home page and the articles index.
#[derive(Parser)]
#[command(name = "blogsmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Keep running and rebuild whenever a post changes
    #[arg(long)]
    watch: bool,

    /// The blog's root directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_root(&cli.root);
    if cli.watch {
        watch(&config)
    } else {
        let report = build_site(&config)?;
        println!("posts={}", report.posts);
        Ok(())
    }
}
