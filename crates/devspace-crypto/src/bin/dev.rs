//! dev: Command-line tool for devspace searchable encryption.
//!
//! Generates user and server keys, builds searchable ciphertexts and
//! trapdoors, and runs the server-side test. Results are printed as JSON on
//! stdout; logs go to stderr.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use devspace_crypto::config::{CliConfig, LogFormat};
use devspace_crypto::peks::{
    derive_shared, find_matching_tag, peks, read_input, read_key, save_key, test, trapdoor, Key,
    KeyKind, SecretKey, ServerKeypair, ServerPublicKey, Source, TagRecord, UserKeypair,
    UserPublicKey,
};
use devspace_crypto::{hex_encode, CryptoError};
use rand::rngs::OsRng;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dev")]
#[command(author, version, about = "Searchable encryption for devspace")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a user key pair, or a server key pair with --server
    Keygen {
        /// Write the secret key to this file
        #[arg(short = 's', long = "skey")]
        skey: Option<PathBuf>,

        /// Write the public key to this file
        #[arg(short = 'p', long = "pkey")]
        pkey: Option<PathBuf>,

        /// Generate server keys (public key in GT)
        #[arg(short = 'r', long)]
        server: bool,

        /// Optional label stored in the key files
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Derive the public key of a secret key
    Pubkey {
        #[command(flatten)]
        skey: SecretKeyArg,

        /// Derive the server public key (GT) instead of the user public key
        #[arg(short = 'r', long)]
        server: bool,
    },

    /// Derive the shared secret of two users
    Sharedkey {
        #[command(flatten)]
        skey: SecretKeyArg,

        #[command(flatten)]
        pkey: PublicKeyArg,

        /// Write the shared secret as hex to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the searchable ciphertext of a keyword (sender side)
    Peks {
        // Sender's secret key
        #[command(flatten)]
        skey: SecretKeyArg,

        // Receiver's public key
        #[command(flatten)]
        pkey: PublicKeyArg,

        #[command(flatten)]
        server: ServerKeyArg,

        #[command(flatten)]
        keyword: KeywordArg,

        /// Write the ciphertext as hex to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the trapdoor of a keyword (receiver side)
    Trapdoor {
        // Receiver's secret key
        #[command(flatten)]
        skey: SecretKeyArg,

        // Sender's public key
        #[command(flatten)]
        pkey: PublicKeyArg,

        #[command(flatten)]
        server: ServerKeyArg,

        #[command(flatten)]
        keyword: KeywordArg,

        /// Write the trapdoor as hex to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Test a ciphertext against a trapdoor (server side)
    Test {
        #[command(flatten)]
        ciphertext: CiphertextArg,

        #[command(flatten)]
        trapdoor: TrapdoorArg,

        // Server secret key
        #[command(flatten)]
        skey: SecretKeyArg,
    },

    /// Find the tag a ciphertext belongs to (server side)
    Match {
        #[command(flatten)]
        ciphertext: CiphertextArg,

        /// JSON file with a list of {"name", "trapdoor"} records
        #[arg(short, long)]
        tags: PathBuf,

        // Server secret key
        #[command(flatten)]
        skey: SecretKeyArg,
    },
}

/// Secret key, from a file ("-" for stdin) or inline hex.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct SecretKeyArg {
    /// Secret key file (JSON key file or hex)
    #[arg(short = 's', long = "skey")]
    skey: Option<PathBuf>,

    /// Secret key as hex
    #[arg(long = "skey-hex")]
    skey_hex: Option<String>,
}

/// User public key, from a file ("-" for stdin) or inline hex.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct PublicKeyArg {
    /// Public key file (JSON key file or hex)
    #[arg(short = 'p', long = "pkey")]
    pkey: Option<PathBuf>,

    /// Public key as hex
    #[arg(long = "pkey-hex")]
    pkey_hex: Option<String>,
}

/// Server public key, from a file ("-" for stdin) or inline hex.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct ServerKeyArg {
    /// Server public key file (JSON key file or hex)
    #[arg(short = 'r', long = "server")]
    server: Option<PathBuf>,

    /// Server public key as hex
    #[arg(long = "server-hex")]
    server_hex: Option<String>,
}

/// Keyword, inline or from a file ("-" for stdin).
#[derive(Args)]
#[group(required = true, multiple = false)]
struct KeywordArg {
    /// Keyword text
    #[arg(short, long)]
    keyword: Option<String>,

    /// Read the keyword bytes from this file
    #[arg(short, long)]
    file: Option<PathBuf>,
}

/// Ciphertext hex, inline or from a file ("-" for stdin).
#[derive(Args)]
#[group(required = true, multiple = false)]
struct CiphertextArg {
    /// Ciphertext as hex
    #[arg(short, long)]
    ciphertext: Option<String>,

    /// Read the ciphertext hex from this file
    #[arg(long = "ciphertext-file")]
    ciphertext_file: Option<PathBuf>,
}

/// Trapdoor hex, inline or from a file ("-" for stdin).
#[derive(Args)]
#[group(required = true, multiple = false)]
struct TrapdoorArg {
    /// Trapdoor as hex
    #[arg(short, long)]
    trapdoor: Option<String>,

    /// Read the trapdoor hex from this file
    #[arg(long = "trapdoor-file")]
    trapdoor_file: Option<PathBuf>,
}

fn source(path: Option<PathBuf>, inline: Option<String>) -> anyhow::Result<Source> {
    match (path, inline) {
        (Some(path), None) if path.as_os_str() == "-" => Ok(Source::Stdin),
        (Some(path), None) => Ok(Source::File(path)),
        (None, Some(text)) => Ok(Source::Inline(text)),
        // clap enforces exactly one
        _ => bail!("exactly one input source must be given"),
    }
}

impl SecretKeyArg {
    fn load(self) -> anyhow::Result<SecretKey> {
        let key = read_key(KeyKind::Secret, &source(self.skey, self.skey_hex)?)
            .context("Failed to read secret key")?;
        Ok(key.into_secret()?)
    }
}

impl PublicKeyArg {
    fn load(self) -> anyhow::Result<UserPublicKey> {
        let key = read_key(KeyKind::User, &source(self.pkey, self.pkey_hex)?)
            .context("Failed to read public key")?;
        Ok(key.into_user()?)
    }
}

impl ServerKeyArg {
    fn load(self) -> anyhow::Result<ServerPublicKey> {
        let key = read_key(KeyKind::Server, &source(self.server, self.server_hex)?)
            .context("Failed to read server public key")?;
        Ok(key.into_server()?)
    }
}

impl KeywordArg {
    fn load(self) -> anyhow::Result<Vec<u8>> {
        let bytes = match (self.keyword, self.file) {
            (Some(keyword), None) => keyword.into_bytes(),
            (None, path) => read_input(&source(path, None)?).context("Failed to read keyword")?,
            _ => bail!("exactly one keyword source must be given"),
        };
        Ok(bytes)
    }
}

impl CiphertextArg {
    fn load(self) -> anyhow::Result<Vec<u8>> {
        Ok(source(self.ciphertext_file, self.ciphertext)?.read_hex("ciphertext")?)
    }
}

impl TrapdoorArg {
    fn load(self) -> anyhow::Result<Vec<u8>> {
        Ok(source(self.trapdoor_file, self.trapdoor)?.read_hex("trapdoor")?)
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = CliConfig::from_env();
    init_tracing(&config);

    let cli = Cli::parse();

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
///
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "devspace_crypto=info,dev=info")
fn init_tracing(config: &CliConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "devspace_crypto=info,dev=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = config.log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
    }
}

fn run(cli: Cli, config: &CliConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Keygen {
            skey,
            pkey,
            server,
            label,
        } => cmd_keygen(
            config,
            skey.as_deref(),
            pkey.as_deref(),
            server,
            label.as_deref(),
        ),
        Commands::Pubkey { skey, server } => cmd_pubkey(skey.load()?, server),
        Commands::Sharedkey { skey, pkey, output } => {
            cmd_sharedkey(skey.load()?, pkey.load()?, output.as_deref())
        }
        Commands::Peks {
            skey,
            pkey,
            server,
            keyword,
            output,
        } => {
            let ct = peks(
                &keyword.load()?,
                &server.load()?,
                &pkey.load()?,
                &skey.load()?,
                &mut OsRng,
            )?;
            emit_hex("ciphertext", &ct, output.as_deref())
        }
        Commands::Trapdoor {
            skey,
            pkey,
            server,
            keyword,
            output,
        } => {
            let td = trapdoor(
                &keyword.load()?,
                &server.load()?,
                &pkey.load()?,
                &skey.load()?,
                &mut OsRng,
            )?;
            emit_hex("trapdoor", &td, output.as_deref())
        }
        Commands::Test {
            ciphertext,
            trapdoor,
            skey,
        } => {
            let matched = test(&ciphertext.load()?, &trapdoor.load()?, &skey.load()?)?;
            print_json(&serde_json::json!({ "matched": matched }))
        }
        Commands::Match {
            ciphertext,
            tags,
            skey,
        } => cmd_match(ciphertext.load()?, &tags, skey.load()?),
    }
}

fn cmd_keygen(
    config: &CliConfig,
    skey_path: Option<&Path>,
    pkey_path: Option<&Path>,
    server: bool,
    label: Option<&str>,
) -> anyhow::Result<()> {
    let (secret, public) = if server {
        let kp = ServerKeypair::generate(&mut OsRng)?;
        (kp.secret.clone(), Key::Server(kp.public.clone()))
    } else {
        let kp = UserKeypair::generate(&mut OsRng)?;
        (kp.secret.clone(), Key::User(kp.public.clone()))
    };
    let kind = public.kind();

    let mut output = serde_json::json!({
        "kind": kind.to_string(),
        "public_key": hex_encode(&public.to_bytes()),
    });

    match skey_path {
        Some(path) => {
            let path = config.key_path(path);
            save_key(&Key::Secret(secret), &path, label)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output["secret_key_path"] = path.to_string_lossy().into();
        }
        None => output["secret_key"] = hex_encode(&secret.to_bytes()).into(),
    }

    if let Some(path) = pkey_path {
        let path = config.key_path(path);
        save_key(&public, &path, label)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        output["public_key_path"] = path.to_string_lossy().into();
    }

    info!(kind = %kind, "Generated key pair");
    print_json(&output)
}

fn cmd_pubkey(secret: SecretKey, server: bool) -> anyhow::Result<()> {
    let kind = if server {
        KeyKind::Server
    } else {
        KeyKind::User
    };
    let public = Key::derive_from_secret(kind, &secret);

    print_json(&serde_json::json!({
        "kind": kind.to_string(),
        "public_key": hex_encode(&public.to_bytes()),
    }))
}

fn cmd_sharedkey(
    secret: SecretKey,
    public: UserPublicKey,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let shared = derive_shared(&public, &secret);
    emit_hex("shared_key", shared.as_bytes(), output)
}

fn cmd_match(ciphertext: Vec<u8>, tags_path: &Path, server: SecretKey) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(tags_path)
        .with_context(|| format!("Failed to read {}", tags_path.display()))?;
    let tags: Vec<TagRecord> = serde_json::from_str(&json).map_err(CryptoError::from)?;
    debug!(tag_count = tags.len(), "Loaded tags");

    let tag = find_matching_tag(&ciphertext, &server, &tags)?;
    print_json(&serde_json::json!({ "tag": tag }))
}

/// Print `{field: hex}`, or write the hex to `output` and print its path.
fn emit_hex(field: &str, bytes: &[u8], output: Option<&Path>) -> anyhow::Result<()> {
    let hex = hex_encode(bytes);
    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", hex))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_json(&serde_json::json!({ "output": path.to_string_lossy() }))
        }
        None => {
            let mut value = serde_json::json!({});
            value[field] = hex.into();
            print_json(&value)
        }
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
