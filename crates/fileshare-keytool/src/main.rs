//! Fileshare key tool.
//!
//! # Usage
//!
//! ```bash
//! # Certificate and key only
//! fileshare-keytool identity --name alice --dir ./certs
//!
//! # First run: register the owner and create the identity
//! FILESHARE_PASSWORD=... fileshare-keytool init --name alice --data-dir ./data
//!
//! # Seal and open files as the registered owner
//! FILESHARE_PASSWORD=... fileshare-keytool seal --data-dir ./data --input a.pdf --output a.sealed
//! FILESHARE_PASSWORD=... fileshare-keytool open --data-dir ./data --input a.sealed --output a.pdf
//!
//! # Verifier for a password and seed
//! FILESHARE_PASSWORD=... fileshare-keytool verifier --seed 0101..01
//! ```

use std::{
    fmt,
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use fileshare_crypto::{
    HASH_ITERATIONS, KdfParams, SealedTransfer, Seed, derive_token_with, verifier_of,
};
use fileshare_identity::{
    IdentityBootstrap, IdentityConfig, Installation, OpenSslGenerator, RedbOwnerStore,
};
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Owner database inside the data directory
const OWNER_DB_FILE: &str = "owner.redb";

/// Identity directory inside the data directory
const CERTS_DIR: &str = "certs";

/// Fileshare identity and key tool
#[derive(Parser, Debug)]
#[command(name = "fileshare-keytool")]
#[command(about = "Identity bootstrap, password verifiers and sealed files for fileshare")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a self-signed certificate and private key
    Identity {
        /// Certificate common name
        #[arg(long)]
        name: String,

        /// Output directory for rsa.key and rsa.crt
        #[arg(long)]
        dir: PathBuf,

        #[command(flatten)]
        tool: ToolArgs,
    },

    /// Register the owner and create the installation identity
    Init {
        /// Owner display name, also the certificate common name
        #[arg(long)]
        name: String,

        #[command(flatten)]
        install: InstallArgs,
    },

    /// Print the verifier for a password and installation seed
    Verifier {
        /// Hex seed; a fresh one is generated when omitted
        #[arg(long)]
        seed: Option<String>,

        /// Token stretching rounds
        #[arg(long, default_value_t = HASH_ITERATIONS)]
        iterations: u32,

        #[command(flatten)]
        password: PasswordArgs,
    },

    /// Seal a file as the registered owner
    Seal {
        #[command(flatten)]
        files: FileArgs,

        #[command(flatten)]
        install: InstallArgs,
    },

    /// Open a sealed file as the registered owner
    Open {
        #[command(flatten)]
        files: FileArgs,

        #[command(flatten)]
        install: InstallArgs,
    },
}

/// External certificate tool settings
#[derive(Args, Debug)]
struct ToolArgs {
    /// Path to the openssl binary
    #[arg(long, default_value = "openssl")]
    openssl: PathBuf,

    /// RSA key size
    #[arg(long, default_value_t = 4096)]
    key_bits: u32,

    /// Certificate validity in days
    #[arg(long, default_value_t = 3650)]
    days: u32,
}

impl ToolArgs {
    fn config(&self) -> IdentityConfig {
        IdentityConfig {
            openssl: self.openssl.clone(),
            key_bits: self.key_bits,
            validity_days: self.days,
            ..IdentityConfig::default()
        }
    }
}

#[derive(Args)]
struct PasswordArgs {
    /// Owner password
    #[arg(long, env = "FILESHARE_PASSWORD", hide_env_values = true)]
    password: String,
}

impl fmt::Debug for PasswordArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordArgs(<redacted>)")
    }
}

/// Installation location and credentials
#[derive(Args, Debug)]
struct InstallArgs {
    /// Directory holding the owner database and certificates
    #[arg(long)]
    data_dir: PathBuf,

    #[command(flatten)]
    password: PasswordArgs,

    #[command(flatten)]
    tool: ToolArgs,
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Input file
    #[arg(long)]
    input: PathBuf,

    /// Output file
    #[arg(long)]
    output: PathBuf,
}

type Keytool = Installation<RedbOwnerStore, OpenSslGenerator>;

async fn open_installation(install: &InstallArgs) -> Result<Keytool, Box<dyn std::error::Error>> {
    tokio::fs::create_dir_all(&install.data_dir).await?;
    let store = RedbOwnerStore::open(install.data_dir.join(OWNER_DB_FILE))?;
    let bootstrap = IdentityBootstrap::openssl(install.tool.config());
    Ok(Installation::new(store, bootstrap, install.data_dir.join(CERTS_DIR)))
}

fn print_line(line: &str) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{line}")
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry().with(log_fmt::layer().with_writer(io::stderr)).with(filter).init();

    match cli.command {
        Command::Identity { name, dir, tool } => {
            let identity = fileshare_identity::create_identity(&tool.config(), &name, &dir).await?;
            print_line(&format!("certificate: {}", display(&identity.certificate)))?;
            print_line(&format!("private key: {}", display(&identity.private_key)))?;
        },
        Command::Init { name, install } => {
            let installation = open_installation(&install).await?;
            let (session, identity) =
                installation.first_init(&name, &install.password.password).await?;
            print_line(&format!("verifier: {}", session.verifier().to_hex()))?;
            print_line(&format!("certificate: {}", display(&identity.certificate)))?;
        },
        Command::Verifier { seed, iterations, password } => {
            let seed = match seed {
                Some(hex) => Seed::from_hex(&hex)?,
                None => Seed::generate()?,
            };
            let params = KdfParams { iterations };
            let token = derive_token_with(&params, &password.password, seed.as_bytes());
            print_line(&format!("seed: {}", seed.to_hex()))?;
            print_line(&format!("verifier: {}", verifier_of(&token).to_hex()))?;
        },
        Command::Seal { files, install } => {
            let session = open_installation(&install).await?.unlock(&install.password.password)?;
            let plaintext = tokio::fs::read(&files.input).await?;
            let transfer = session.seal_transfer(&plaintext)?;
            tokio::fs::write(&files.output, transfer.to_bytes()).await?;
            tracing::info!(
                "Sealed {} bytes from {} into {}",
                plaintext.len(),
                files.input.display(),
                files.output.display()
            );
        },
        Command::Open { files, install } => {
            let session = open_installation(&install).await?.unlock(&install.password.password)?;
            let sealed = tokio::fs::read(&files.input).await?;
            let plaintext = session.open_transfer(&SealedTransfer::from_bytes(&sealed)?)?;
            tokio::fs::write(&files.output, &plaintext).await?;
            tracing::info!("Opened {} bytes into {}", plaintext.len(), files.output.display());
        },
    }

    Ok(())
}
