//! jbundle CLI
//!
//! Command-line interface for inspecting and editing bundle files.

use std::fs;
use std::io::Write;
use std::process::exit;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use jbundle::{BundleStore, Config, Result, StdFs};

/// jbundle CLI
#[derive(Parser, Debug)]
#[command(name = "jbundle")]
#[command(about = "Single-file bundle container tool")]
#[command(version)]
struct Args {
    /// Path to the bundle file
    bundle: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new, empty bundle
    Create {
        /// Hash bucket count (fixed for the bundle's lifetime)
        #[arg(short, long, default_value = "64")]
        buckets: u32,
    },

    /// List files, optionally filtered by a name prefix
    List {
        /// Case-insensitive name prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// List the derived directory prefixes
    Dirs,

    /// Add a local file under the given bundle name
    Add {
        /// Name to store under (backslash-separated path)
        name: String,

        /// Local file to read content from
        input: String,
    },

    /// Extract a bundle file to a local path
    Extract {
        /// Name to extract
        name: String,

        /// Local file to write content to
        output: String,
    },

    /// Delete a file from the bundle
    Rm {
        /// Name to delete
        name: String,
    },

    /// Print size and modified timestamp of a file
    Stat {
        /// Name to stat
        name: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,jbundle=info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let vfs = StdFs;

    let command = match args.command {
        Commands::Create { buckets } => {
            let config = Config::builder().bucket_count(buckets).build();
            BundleStore::create(&args.bundle, &vfs, config)?;
            println!("created {} ({buckets} buckets)", args.bundle);
            return Ok(());
        }
        command => command,
    };

    let mut store = BundleStore::open(&args.bundle, &vfs, Config::default())?;

    match command {
        Commands::Create { .. } => unreachable!("handled above"),

        Commands::List { prefix } => {
            for entry in store.get_files(prefix.as_deref())? {
                println!("{:>10}  {:>13}  {}", entry.size, entry.modified, entry.name);
            }
        }

        Commands::Dirs => {
            for dir in store.get_directories()? {
                println!("{dir}");
            }
        }

        Commands::Add { name, input } => {
            let content = fs::read(&input)?;
            let mut writer = store.create_file(&name)?;
            writer.write_all(&content)?;
            writer.close()?;
            println!("added {name} ({} bytes)", content.len());
        }

        Commands::Extract { name, output } => match store.read_file(&name)? {
            Some(content) => {
                fs::write(&output, &content)?;
                println!("extracted {name} ({} bytes)", content.len());
            }
            None => {
                eprintln!("not found: {name}");
                exit(1);
            }
        },

        Commands::Rm { name } => {
            if store.delete_file(&name)? {
                println!("deleted {name}");
            } else {
                eprintln!("not found: {name}");
                exit(1);
            }
        }

        Commands::Stat { name } => {
            match (store.get_size(&name)?, store.get_modified(&name)?) {
                (Some(size), Some(modified)) => {
                    println!("{name}: {size} bytes, modified {modified}");
                }
                _ => {
                    eprintln!("not found: {name}");
                    exit(1);
                }
            }
        }
    }

    Ok(())
}
