use std::path::PathBuf;
use std::sync::Arc;
use clap_complete::{generate, Shell};
use clap::CommandFactory;
use tokio::io::BufReader;
use tracing::{info, warn, debug};

use crate::cli::{Cli, ExtractArgs};
use crate::config::{Config, LoggingConfig};
use crate::convert::convert_html;
use crate::error::{Error, Result};
use crate::extract::ArticleExtractor;
use crate::transport::{ExportService, LocalFileSink, OutputSink, RemoteSink, RoutedPageSource};

/// Write a default configuration file
pub async fn init(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    info!("Initializing medium-export configuration");

    let config_file = get_config_file(config_path)?;
    if config_file.exists() && !force {
        warn!("Configuration file already exists: {}", config_file.display());
        println!("⚠️  Configuration already exists: {}", config_file.display());
        println!("   Use --force to overwrite it.");
        return Ok(());
    }

    if let Some(parent) = config_file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&config_file, create_default_config()).await?;
    info!("Created default configuration: {}", config_file.display());

    println!("✅ medium-export initialized successfully!");
    println!("   Config file: {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("   1. Export an article: medium-export extract <url>");
    println!("   2. Optional upload target: medium-export config set remote.endpoint <url>");

    Ok(())
}

/// Extract one page and save, upload or print the result
pub async fn extract(args: ExtractArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;

    let mut options = config.export_options();
    if args.no_frontmatter {
        options.include_frontmatter = false;
    }
    if args.no_images {
        options.include_images = false;
    }

    let sink: Arc<dyn OutputSink> = if args.upload {
        Arc::new(RemoteSink::new(&config.remote, &config.http)?)
    } else {
        let directory = args.output.clone().unwrap_or_else(|| config.output.directory.clone());
        Arc::new(LocalFileSink::new(directory))
    };

    let service = ExportService::new(
        Arc::new(RoutedPageSource::new(&config.http)?),
        sink,
        ArticleExtractor::with_settings(config.extractor_settings()),
    )
    .with_options(options)
    .with_filename_style(config.export.filename_style);

    if !args.stdout {
        println!("📡 Extracting {}...", args.source);
    }
    let article = service.extract(&args.source, args.url.clone()).await?;
    let (markdown, filename) = service.render(&article.metadata, &article.article_html, options);

    if args.stdout {
        print!("{}", markdown);
        return Ok(());
    }

    let location = service.persist(&filename, &markdown).await?;
    println!("✅ Exported \"{}\"", display_title(&article.metadata.title));
    if !article.metadata.author.is_empty() {
        println!("   Author: {}", article.metadata.author);
    }
    println!("   Saved to: {}", location);

    Ok(())
}

/// Convert a cleaned article fragment and print the Markdown body
pub async fn convert(html_file: PathBuf, no_images: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let mut options = config.export_options();
    if no_images {
        options.include_images = false;
    }

    let html = tokio::fs::read_to_string(&html_file).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(html_file.display().to_string()),
        _ => Error::Io(e),
    })?;
    debug!("Converting {} bytes from {}", html.len(), html_file.display());

    print!("{}", convert_html(&html, &options));
    Ok(())
}

/// Upload an existing Markdown file to the remote endpoint
pub async fn upload(file: PathBuf, name: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let sink = RemoteSink::new(&config.remote, &config.http)?;

    let markdown = tokio::fs::read_to_string(&file).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(file.display().to_string()),
        _ => Error::Io(e),
    })?;

    let filename = match name {
        Some(name) => name,
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Invalid(format!("Not a file: {}", file.display())))?,
    };

    println!("📤 Uploading {}...", filename);
    let location = sink.persist(&filename, &markdown).await?;
    println!("✅ Uploaded to {}", location);
    Ok(())
}

/// Print the effective configuration with the token masked
pub fn config_show(config_path: Option<PathBuf>) -> Result<()> {
    let config_file = get_config_file(config_path.clone())?;
    let mut config = load_config(config_path)?;
    config.remote.token = mask_token(&config.remote.token);

    let content = toml::to_string_pretty(&config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    if config_file.exists() {
        println!("# {}", config_file.display());
    } else {
        println!("# {} (not found, showing defaults)", config_file.display());
    }
    print!("{}", content);
    Ok(())
}

pub fn config_get(key: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    println!("{}", config.get(&key)?);
    Ok(())
}

pub fn config_set(key: String, value: String, config_path: Option<PathBuf>) -> Result<()> {
    let config_file = get_config_file(config_path)?;
    let mut config = if config_file.exists() {
        Config::load(&config_file)?
    } else {
        Config::default()
    };

    config.set(&key, &value)?;
    config.save(&config_file)?;
    info!("Set {} in {}", key, config_file.display());

    println!("✅ {} updated", key);
    Ok(())
}

/// Answer newline-delimited JSON requests until stdin closes
pub async fn serve(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;

    let sink: Arc<dyn OutputSink> = if config.remote_enabled() {
        Arc::new(RemoteSink::new(&config.remote, &config.http)?)
    } else {
        Arc::new(LocalFileSink::new(config.output.directory.clone()))
    };
    info!("Serving requests on stdin, persisting via {} sink", sink.name());

    let service = ExportService::new(
        Arc::new(RoutedPageSource::new(&config.http)?),
        sink,
        ArticleExtractor::with_settings(config.extractor_settings()),
    )
    .with_options(config.export_options())
    .with_filename_style(config.export.filename_style);

    let handled = service
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    debug!("Handled {} requests", handled);
    Ok(())
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let cmd_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, cmd_name, &mut std::io::stdout());
}

/// Initialize logging based on verbosity flags, falling back to the
/// configured level. Logs go to stderr so stdout stays usable for output.
pub fn init_logging(debug: bool, verbose: bool, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug);

    let result = if logging.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized");
    Ok(())
}

/// Load the configuration file, or defaults when it does not exist
pub fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    Config::load_or_default(get_config_file(config_path)?)
}

/// Get the configuration file path
fn get_config_file(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => Ok(Config::config_dir()?.join("config.toml")),
    }
}

fn display_title(title: &str) -> &str {
    if title.is_empty() { "Untitled" } else { title }
}

fn mask_token(token: &str) -> String {
    if token.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}

/// Create default configuration content
fn create_default_config() -> String {
    format!(r#"# medium-export configuration file
# Generated on {}

[export]
# Emit the frontmatter header block
include_frontmatter = true

# Keep images; captions are kept either way
include_images = true

# og:site_name value that identifies supported pages
publisher = "Medium"

# "title" for <title>.md, "dated" for <date> - <slug>.md
filename_style = "title"

[output]
# Where extracted articles are saved
directory = "."

[remote]
# PUT target for uploads, e.g. "http://127.0.0.1:27123/vault"
endpoint = ""

# Sent as a bearer token when set
token = ""

# Folder below the endpoint
folder = ""

[http]
user_agent = "medium-export/{}"

# Request timeout in seconds
timeout = 30

[logging]
# Log level: error, warn, info, debug, trace
level = "warn"

# Emit logs as JSON lines
json_format = false
"#,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_default_config() {
        let content = create_default_config();
        assert!(content.contains("[export]"));
        assert!(content.contains("[remote]"));

        let config: Config = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.remote_enabled());
        assert_eq!(config.logging.level, "warn");
    }

    #[tokio::test]
    async fn test_init_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("conf").join("config.toml");

        init(Some(config_file.clone()), false).await.unwrap();
        assert!(config_file.exists());

        // Running init again keeps the file
        std::fs::write(&config_file, "[export]\ninclude_images = false\n").unwrap();
        init(Some(config_file.clone()), false).await.unwrap();
        let config = Config::load(&config_file).unwrap();
        assert!(!config.export.include_images);

        init(Some(config_file.clone()), true).await.unwrap();
        assert!(Config::load(&config_file).unwrap().export.include_images);
    }

    #[test]
    fn test_config_set_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");

        config_set("remote.folder".into(), "Clippings".into(), Some(config_file.clone())).unwrap();
        let config = Config::load(&config_file).unwrap();
        assert_eq!(config.remote.folder, "Clippings");

        let result = config_set("remote.nope".into(), "x".into(), Some(config_file));
        assert!(matches!(result, Err(Error::Invalid(_))));
    }

    #[test]
    fn test_load_config_defaults_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(Some(temp_dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.export.publisher, "Medium");
    }

    #[tokio::test]
    async fn test_upload_without_endpoint_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "").unwrap();
        let markdown = temp_dir.path().join("a.md");
        std::fs::write(&markdown, "# A\n").unwrap();

        let result = upload(markdown, None, Some(config_file)).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token(""), "");
        assert_eq!(mask_token("secret"), "********");
    }

    #[test]
    fn test_init_logging() {
        // Another test may have installed a subscriber already
        let _ = init_logging(false, false, &LoggingConfig::default());
    }
}
