//! Binary entrypoint for the darkadv CLI.
//!
//! Commands:
//! - `play [--ephemeral]` - interactive terminal (default when no command is given)
//! - `init` - write a starter `config.toml`
//! - `compile-locks <adventure>` - lower exit metadata of an adventure into effect scripts
//!
//! See the library crate docs for module‑level details: `darkadv::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use darkadv::adventure::content::AdventureManifest;
use darkadv::adventure::lock_compiler::{compile_exit_locks, ContentBundle};
use darkadv::config::Config;
use darkadv::shell::Shell;

#[derive(Parser)]
#[command(name = "darkadv")]
#[command(about = "A German text-adventure engine for the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Player name used for the save key (overrides the config file)
    #[arg(short, long, global = true)]
    player: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive terminal
    Play {
        /// Keep saves in memory only
        #[arg(long)]
        ephemeral: bool,
    },
    /// Initialize a new configuration file
    Init,
    /// Compile exit locks of an adventure folder in place
    CompileLocks {
        /// Adventure id (folder name below the adventure root)
        adventure: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Play { ephemeral: false });

    if let Commands::Init = command {
        init_logging(&None, cli.verbose);
        info!("Initializing new darkadv configuration");
        Config::create_default(&cli.config).await?;
        info!("Configuration file created at {}", cli.config);
        return Ok(());
    }

    // A missing config file is not fatal; defaults apply.
    let mut config = if tokio::fs::try_exists(&cli.config).await.unwrap_or(false) {
        Some(Config::load(&cli.config).await?)
    } else {
        None
    };
    init_logging(&config, cli.verbose);
    if config.is_none() {
        warn!("No config at {}; using defaults", cli.config);
    }
    let config = config.get_or_insert_with(Config::default);
    if let Some(player) = cli.player {
        config.player.name = Some(player);
    }

    match command {
        Commands::Play { ephemeral } => {
            info!("Starting darkadv v{}", env!("CARGO_PKG_VERSION"));
            let mut shell = Shell::from_config(config, ephemeral)?;
            run_terminal(&mut shell).await?;
        }
        Commands::CompileLocks { adventure } => {
            let root = std::path::Path::new(&config.adventure.root);
            let manifest = AdventureManifest::load(root, &adventure)?;
            let mut bundle = ContentBundle::load_dir(&manifest.data_path)?;
            let warnings = compile_exit_locks(&mut bundle);
            bundle.write_dir(&manifest.data_path)?;
            info!(
                "Compiled exit locks for {} rooms in {}",
                bundle.rooms.len(),
                manifest.data_path.display()
            );
            for warning in &warnings {
                println!("Warnung: {}", warning);
            }
        }
        Commands::Init => {}
    }

    Ok(())
}

/// Read stdin line by line until EOF or `quit`.
async fn run_terminal(shell: &mut Shell) -> Result<()> {
    let interactive = atty::is(atty::Stream::Stdin);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write_lines(&mut stdout, &shell.banner()).await?;
    loop {
        if interactive {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let reply = shell.handle_line(&line);
        write_lines(&mut stdout, &reply.lines).await?;
        if reply.quit {
            break;
        }
    }
    info!("Terminal closed");
    Ok(())
}

async fn write_lines(stdout: &mut tokio::io::Stdout, lines: &[String]) -> Result<()> {
    for line in lines {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match (verbosity, config) {
        (0, Some(cfg)) => cfg.logging.level_filter(),
        (0, None) => log::LevelFilter::Info,
        (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Log records share the terminal with the game only when stderr is a TTY
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty && record.level() <= log::Level::Warn {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
