pub mod commands;

use clap::{Args, Parser, Subcommand};
use crate::error::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medium-export")]
#[command(about = "Export Medium articles as clean Markdown")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Extract an article page and save it as Markdown
    Extract(ExtractArgs),

    /// Convert an already cleaned article fragment and print the body
    Convert {
        /// HTML file holding the article markup
        html_file: PathBuf,

        /// Leave images out of the output
        #[arg(long)]
        no_images: bool,
    },

    /// Upload a Markdown file to the configured remote endpoint
    Upload {
        /// Markdown file to upload
        file: PathBuf,

        /// Remote file name (defaults to the local file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show or change configuration values
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Answer JSON requests on stdin, one per line
    Serve,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Article URL or path to a saved page
    pub source: String,

    /// Page URL to record when extracting from a saved file
    #[arg(long)]
    pub url: Option<String>,

    /// Omit the frontmatter block
    #[arg(long)]
    pub no_frontmatter: bool,

    /// Leave images out of the output
    #[arg(long)]
    pub no_images: bool,

    /// Print the document instead of saving it
    #[arg(long, conflicts_with_all = ["output", "upload"])]
    pub stdout: bool,

    /// Directory to save into (overrides output.directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Upload to the remote endpoint instead of saving locally
    #[arg(short, long)]
    pub upload: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print one value, e.g. `remote.endpoint`
    Get { key: String },

    /// Change one value and save the file
    Set { key: String, value: String },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let logging = commands::load_config(self.config.clone())
            .map(|config| config.logging)
            .unwrap_or_default();
        commands::init_logging(self.debug, self.verbose, &logging)?;

        match self.command {
            Commands::Init { force } => {
                commands::init(self.config, force).await
            }
            Commands::Extract(args) => {
                commands::extract(args, self.config).await
            }
            Commands::Convert { html_file, no_images } => {
                commands::convert(html_file, no_images, self.config).await
            }
            Commands::Upload { file, name } => {
                commands::upload(file, name, self.config).await
            }
            Commands::Config { action } => match action {
                ConfigAction::Show => commands::config_show(self.config),
                ConfigAction::Get { key } => commands::config_get(key, self.config),
                ConfigAction::Set { key, value } => commands::config_set(key, value, self.config),
            },
            Commands::Serve => {
                commands::serve(self.config).await
            }
            Commands::Completions { shell } => {
                commands::generate_completions(shell);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::parse_from([
            "medium-export",
            "-v",
            "extract",
            "saved.html",
            "--url",
            "https://medium.com/p/1",
            "--no-images",
            "--stdout",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.source, "saved.html");
                assert_eq!(args.url.as_deref(), Some("https://medium.com/p/1"));
                assert!(args.no_images);
                assert!(!args.no_frontmatter);
                assert!(args.stdout);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_stdout_conflicts_with_upload() {
        let result = Cli::try_parse_from(["medium-export", "extract", "a.html", "--stdout", "--upload"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::parse_from(["medium-export", "config", "set", "remote.folder", "Clippings"]);
        match cli.command {
            Commands::Config {
                action: ConfigAction::Set { key, value },
            } => {
                assert_eq!(key, "remote.folder");
                assert_eq!(value, "Clippings");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
