//! ledger-identity CLI: the `lid` command.
//!
//! Operator tool over the file-backed user store: import an enrollment
//! certificate as an identity, inspect stored identities, export their
//! certificates, and remove them. Never touches private key material.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use ledger_identity::time::micros_to_rfc3339;
use ledger_identity::{FileUserStore, IdentityContext, User, UserIdentity, UserKey, UserStore};

// ── Directory helpers ─────────────────────────────────────────────────────────

const HOME_ENV: &str = "LEDGER_IDENTITY_HOME";

/// Store directory: `--store-dir`, then `$LEDGER_IDENTITY_HOME`, then
/// `$HOME/.ledger-identity/users`.
fn store_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Ok(dir) = std::env::var(HOME_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").map_err(|_| anyhow!("HOME not set; pass --store-dir"))?;
    Ok(PathBuf::from(home).join(".ledger-identity").join("users"))
}

fn open_store(dir: &Path) -> Result<FileUserStore> {
    FileUserStore::open(dir)
        .with_context(|| format!("failed to open user store at {}", dir.display()))
}

/// Open a store that must already exist. Commands that only read or delete
/// records never create the directory.
fn open_existing_store(dir: &Path) -> Result<FileUserStore> {
    if !dir.is_dir() {
        return Err(anyhow!("no user store at {}", dir.display()));
    }
    open_store(dir)
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// ledger-identity CLI: manage stored client identities.
#[derive(Parser, Debug)]
#[command(
    name = "lid",
    about = "ledger-identity CLI",
    version,
    long_about = "lid: ledger-identity CLI\n\nImport, inspect, export and remove client identities\n(membership id, name, enrollment certificate, roles) in a file-backed store."
)]
struct Cli {
    /// User store directory
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store an enrollment certificate as an identity (overwrites)
    Import {
        /// Membership service provider id
        #[arg(long)]
        msp_id: String,

        /// Identity name within the MSP
        #[arg(long)]
        name: String,

        /// Path to the enrollment certificate (PEM or DER)
        #[arg(long)]
        cert: PathBuf,

        /// Role label; repeat for several
        #[arg(long = "role")]
        roles: Vec<String>,
    },

    /// Display a stored identity
    Show {
        #[arg(long)]
        msp_id: String,

        #[arg(long)]
        name: String,
    },

    /// List all stored identities
    List {
        /// Print the keys as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Write a stored identity's certificate or serialized identity
    Export {
        #[arg(long)]
        msp_id: String,

        #[arg(long)]
        name: String,

        /// Export the serialized identity instead of the raw certificate
        #[arg(long)]
        serialized: bool,

        /// Output file path (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Remove a stored identity
    Remove {
        #[arg(long)]
        msp_id: String,

        #[arg(long)]
        name: String,
    },
}

// ── Main entry point ──────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = store_dir(cli.store_dir).and_then(|dir| {
        log::debug!("using user store at {}", dir.display());
        match cli.command {
            Commands::Import {
                msp_id,
                name,
                cert,
                roles,
            } => cmd_import(&dir, &msp_id, &name, &cert, roles, verbose),
            Commands::Show { msp_id, name } => cmd_show(&dir, &UserKey::new(msp_id, name), verbose),
            Commands::List { json } => cmd_list(&dir, json, verbose),
            Commands::Export {
                msp_id,
                name,
                serialized,
                output,
            } => cmd_export(
                &dir,
                &UserKey::new(msp_id, name),
                serialized,
                output.as_deref(),
            ),
            Commands::Remove { msp_id, name } => cmd_remove(&dir, &UserKey::new(msp_id, name)),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `lid import --msp-id MSP --name NAME --cert FILE [--role ROLE]...`
fn cmd_import(
    dir: &Path,
    msp_id: &str,
    name: &str,
    cert_path: &Path,
    roles: Vec<String>,
    verbose: bool,
) -> Result<()> {
    let cert = std::fs::read(cert_path)
        .with_context(|| format!("failed to read certificate {}", cert_path.display()))?;
    if cert.is_empty() {
        return Err(anyhow!("certificate file {} is empty", cert_path.display()));
    }

    let user = UserIdentity::builder(msp_id, name)
        .enrollment_certificate(cert)
        .roles(roles)
        .build()
        .context("invalid identity")?;

    let store = open_store(dir)?;
    store.store(&user).context("failed to store identity")?;

    println!("Stored identity '{}'", user.user_key());
    if verbose {
        println!("  File: {}", store.user_path(&user.user_key()).display());
        println!("  Certificate: {} bytes", user.enrollment_certificate().len());
    }

    Ok(())
}

/// `lid show --msp-id MSP --name NAME`
fn cmd_show(dir: &Path, key: &UserKey, verbose: bool) -> Result<()> {
    let store = open_existing_store(dir)?;
    let user = match store.load(key) {
        Ok(user) => user,
        Err(e) if e.is_not_found() => {
            return Err(anyhow!("identity '{key}' not found in {}", dir.display()))
        }
        Err(e) => return Err(e).context("failed to load identity"),
    };
    let record = store.record(key).context("failed to read identity record")?;

    println!("Identity: {}", user.user_key());
    println!("  MSP ID:      {}", user.msp_id());
    println!("  Name:        {}", user.name());
    if user.roles().is_empty() {
        println!("  Roles:       none");
    } else {
        println!("  Roles:       {}", user.roles().join(", "));
    }
    println!(
        "  Certificate: {} bytes",
        user.enrollment_certificate().len()
    );
    match record.key_ski.as_deref() {
        Some(ski) => println!("  Key SKI:     {ski}"),
        None => println!("  Key SKI:     none"),
    }
    println!("  Stored:      {}", micros_to_rfc3339(record.stored_at));

    if verbose {
        println!("  File:        {}", store.user_path(key).display());
        match user.identity() {
            Ok(bytes) => println!("  Serialized:  {} bytes", bytes.len()),
            Err(e) => println!("  Serialized:  unavailable ({e})"),
        }
    }

    Ok(())
}

/// `lid list [--json]`
fn cmd_list(dir: &Path, json: bool, verbose: bool) -> Result<()> {
    if !dir.exists() {
        if json {
            println!("[]");
        } else {
            println!(
                "No identities found (directory {} does not exist)",
                dir.display()
            );
        }
        return Ok(());
    }

    let store = open_store(dir)?;
    let keys = store.keys().context("failed to list identities")?;

    if json {
        let out = serde_json::to_string_pretty(&keys).context("failed to serialize keys")?;
        println!("{out}");
        return Ok(());
    }

    if keys.is_empty() {
        println!("No identities found in {}", dir.display());
        return Ok(());
    }

    println!("Identities ({}):", keys.len());
    for key in &keys {
        if verbose {
            let record = store.record(key).context("failed to read identity record")?;
            println!(
                "  {key}  roles=[{}]  stored={}",
                record.roles.join(","),
                micros_to_rfc3339(record.stored_at)
            );
        } else {
            println!("  {key}");
        }
    }

    Ok(())
}

/// `lid export --msp-id MSP --name NAME [--serialized] [-o FILE]`
fn cmd_export(dir: &Path, key: &UserKey, serialized: bool, output: Option<&Path>) -> Result<()> {
    let store = open_existing_store(dir)?;
    let user = store
        .load(key)
        .with_context(|| format!("failed to load identity '{key}'"))?;

    let bytes = if serialized {
        user.identity().context("serialized identity unavailable")?
    } else {
        user.enrollment_certificate().to_vec()
    };

    if let Some(out_path) = output {
        std::fs::write(out_path, &bytes)
            .with_context(|| format!("failed to write to {}", out_path.display()))?;
        println!("Exported '{key}' to {}", out_path.display());
    } else {
        use std::io::Write;
        std::io::stdout()
            .write_all(&bytes)
            .context("failed to write to stdout")?;
    }

    Ok(())
}

/// `lid remove --msp-id MSP --name NAME`
fn cmd_remove(dir: &Path, key: &UserKey) -> Result<()> {
    let store = open_existing_store(dir)?;
    store
        .remove(key)
        .with_context(|| format!("failed to remove identity '{key}'"))?;
    println!("Removed identity '{key}'");
    Ok(())
}
