//! psh console entry point.
//!
//! Reads command lines from stdin and runs them through a shell session.
//! `psh -c "<line>"` runs a single line and exits. Type `exit` to quit.

mod console;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use psh_terminal::Shell;
use psh_types::clock::SystemClock;
use psh_types::config::ShellConfig;
use psh_types::storage::{BlobStore, DirBlobStore, MemoryBlobStore};

use console::ConsoleSink;

/// Config from `PSH_CONFIG`, then `./psh.toml`, then defaults.
fn load_config() -> Result<ShellConfig> {
    if let Ok(path) = std::env::var("PSH_CONFIG") {
        return ShellConfig::load(Path::new(&path))
            .with_context(|| format!("loading config from {path}"));
    }
    let local = PathBuf::from("psh.toml");
    if local.is_file() {
        return ShellConfig::load(&local).context("loading psh.toml");
    }
    Ok(ShellConfig::default())
}

fn open_store(config: &ShellConfig) -> Result<Box<dyn BlobStore>> {
    match &config.data_dir {
        Some(dir) => {
            let store = DirBlobStore::open(dir)
                .with_context(|| format!("opening data directory {}", dir.display()))?;
            log::info!("Persisting session state in {}", dir.display());
            Ok(Box::new(store))
        },
        None => Ok(Box::new(MemoryBlobStore::new())),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = load_config()?;
    let store = open_store(&config)?;
    let mut shell = Shell::new(config, store, Arc::new(SystemClock));

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut sink = ConsoleSink::new(stdout, color);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [flag, line] = args.as_slice()
        && flag == "-c"
    {
        shell.submit(line, &mut sink);
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("{}", shell.prompt());
        io::stdout().flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }
        shell.submit(trimmed, &mut sink);
    }

    log::info!("psh session ended");
    Ok(())
}
