//! CLI entry point for article-edge

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use article_edge::config::{SiteConfig, API_URL_ENV};
use article_edge::content::ContentType;
use article_edge::Site;

#[derive(Parser)]
#[command(name = "article-edge")]
#[command(version)]
#[command(about = "Serve knowledge and news articles from a content API", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Config file (defaults to <cwd>/_config.yml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Content API origin, overrides the config file
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Directory with the pre-built static site
        #[arg(long)]
        public_dir: Option<PathBuf>,
    },

    /// List slugs that redirect to pre-built static pages
    Routes,

    /// Render one article and print the response
    Render {
        /// Content type (knowledge, news)
        content_type: ContentType,

        /// Article slug
        slug: String,

        /// Language (vn, en, zh)
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "article_edge=debug,info"
    } else {
        "article_edge=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let mut site = match &cli.config {
        Some(path) => Site::with_config(&base_dir, SiteConfig::load(path)?),
        None => Site::new(&base_dir)?,
    };
    site.config.override_api_url(cli.api_url);

    match cli.command {
        Commands::Serve {
            port,
            ip,
            public_dir,
        } => {
            if let Some(dir) = public_dir {
                site.public_dir = if dir.is_absolute() {
                    dir
                } else {
                    base_dir.join(dir)
                };
            }
            tracing::info!("Starting server at http://{}:{}", ip, port);
            article_edge::server::start(&site, &ip, port).await?;
        }

        Commands::Routes => {
            article_edge::commands::routes::run(&site)?;
        }

        Commands::Render {
            content_type,
            slug,
            lang,
        } => {
            article_edge::commands::render::run(&site, content_type, &slug, lang.as_deref()).await?;
        }

        Commands::Version => {
            println!("article-edge version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
