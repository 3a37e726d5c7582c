use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

use dav_trust::{Credentials, TransportOptions, WebDavClient, parse_listing};

#[derive(Parser)]
#[command(name = "dav-trust")]
#[command(version, about = "WebDAV client with a configurable TLS trust policy")]
#[command(propagate_version = true)]
struct Cli {
    /// Basic-auth user name
    #[arg(short, long, env = "DAV_USER", global = true)]
    user: Option<String>,

    /// Basic-auth password (prefer the DAV_PASSWORD env var)
    #[arg(long, env = "DAV_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Accept any certificate and hostname. Unsafe.
    #[arg(long, global = true, conflicts_with = "ca_cert")]
    insecure: bool,

    /// Trust only chains rooted at this certificate (DER, PEM or Base64)
    #[arg(long, value_name = "FILE", global = true)]
    ca_cert: Option<PathBuf>,

    /// Connect and read timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    timeout: u64,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a collection (MKCOL)
    Mkcol { url: String },

    /// Check that a collection exists (PROPFIND, Depth 0)
    Exists { url: String },

    /// List a collection (PROPFIND, Depth 1)
    Ls {
        url: String,

        /// Print one entry per line instead of the raw multistatus XML
        #[arg(long)]
        parse: bool,
    },

    /// Upload a local file (PUT)
    Put { url: String, file: PathBuf },

    /// Download a resource (GET) to stdout or a file
    Get {
        url: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a resource (DELETE)
    Rm { url: String },
}

fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let timeout = Duration::from_secs(cli.timeout);
    let client = WebDavClient::with_options(
        TransportOptions::default()
            .with_connect_timeout(timeout)
            .with_read_timeout(timeout),
    );

    if cli.insecure {
        client.set_insecure_mode(true);
    }
    if let Some(path) = &cli.ca_cert {
        let certificate = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        client.set_pinned_authority(&certificate)?;
    }

    let credentials = credentials(cli.user, cli.password)?;
    let (user, pass) = (credentials.username.as_str(), credentials.password.as_str());

    match cli.command {
        Commands::Mkcol { url } => {
            println!("{}", client.create_collection(&url, user, pass).await?);
        }
        Commands::Exists { url } => {
            println!("{}", client.collection_exists(&url, user, pass).await?);
        }
        Commands::Ls { url, parse } => {
            let listing = client.list_contents(&url, user, pass).await?;
            if parse {
                for entry in parse_listing(&listing)? {
                    let kind = if entry.is_collection { "d" } else { "-" };
                    let size = entry
                        .content_length
                        .map(|len| len.to_string())
                        .unwrap_or_default();
                    println!("{kind} {size:>10} {}", entry.name);
                }
            } else {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&listing).await?;
                stdout.flush().await?;
            }
        }
        Commands::Put { url, file } => {
            let content = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            println!("{}", client.upload_file(&url, user, pass, content).await?);
        }
        Commands::Get { url, output } => {
            let body = client.download_file(&url, user, pass).await?;
            match output {
                Some(path) => tokio::fs::write(&path, &body)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?,
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&body).await?;
                    stdout.flush().await?;
                }
            }
        }
        Commands::Rm { url } => {
            println!("{}", client.delete_resource(&url, user, pass).await?);
        }
    }

    Ok(())
}

fn credentials(user: Option<String>, password: Option<String>) -> Result<Credentials> {
    match (user, password) {
        (Some(user), Some(password)) => Ok(Credentials::new(user, password)),
        (None, _) => bail!("a user name is required (--user or DAV_USER)"),
        (_, None) => bail!("a password is required (--password or DAV_PASSWORD)"),
    }
}
