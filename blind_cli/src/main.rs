mod cli;
mod drive;
mod error_fmt;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

fn load_config(path: &Path) -> eyre::Result<blind_config::Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(blind_config::Config::default());
    }
    let text = fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config {}: {e}", path.display()))?;
    let cfg = blind_config::load_toml(&text)
        .map_err(|e| eyre::eyre!("failed to parse config {}: {e}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn init_tracing(log_level: &str, json: bool, logging: &blind_config::Logging) {
    let level = logging.level.as_deref().unwrap_or(log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(file) = &logging.file {
        let path = Path::new(file);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let name = path.file_name().unwrap_or_else(|| "blind.log".as_ref());
        let appender = tracing_appender::rolling::never(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        if json {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .json()
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
        }
    } else if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn dispatch(args: &Cli, cfg: &blind_config::Config) -> eyre::Result<()> {
    let store_path = args.store_path.as_deref();

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        let _ = ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
        });
    }

    match args.cmd {
        Commands::Run { tick_ms } => {
            let ctl = drive::build_controller(cfg, store_path)?;
            let tick = tick_ms.unwrap_or(cfg.input.poll_ms);
            drive::run_loop(ctl, tick, shutdown)
        }
        Commands::Move { position } => {
            let ctl = drive::build_controller(cfg, store_path)?;
            let final_position = drive::run_move(ctl, position, cfg.input.poll_ms, &shutdown)?;
            if args.json {
                println!("{}", serde_json::json!({ "position": final_position }));
            } else {
                println!("position: {final_position:.1}");
            }
            Ok(())
        }
        Commands::Status => {
            let ctl = drive::build_controller(cfg, store_path)?;
            let timing = ctl.timing();
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "position": ctl.position(),
                        "state": format!("{:?}", ctl.state()),
                        "seconds_to_open": timing.seconds_to_open,
                        "seconds_to_close": timing.seconds_to_close,
                    })
                );
            } else {
                println!("position: {:.1}", ctl.position());
                println!("state: {:?}", ctl.state());
                println!("seconds to open: {}", timing.seconds_to_open);
                println!("seconds to close: {}", timing.seconds_to_close);
            }
            Ok(())
        }
        Commands::Timing {
            seconds_to_open,
            seconds_to_close,
        } => {
            let mut ctl = drive::build_controller(cfg, store_path)?;
            ctl.set_timing(seconds_to_open, seconds_to_close)?;
            let timing = ctl.timing();
            println!(
                "seconds to open: {}\nseconds to close: {}",
                timing.seconds_to_open, timing.seconds_to_close
            );
            Ok(())
        }
        Commands::SelfCheck => {
            drive::self_check(cfg)?;
            println!("ok");
            Ok(())
        }
    }
}

fn main() {
    let _ = color_eyre::install();
    let args = Cli::parse();

    let cfg = match load_config(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", error_fmt::humanize(&e));
            std::process::exit(1);
        }
    };
    init_tracing(&args.log_level, args.json, &cfg.logging);

    if let Err(e) = dispatch(&args, &cfg) {
        tracing::error!(error = %e, "command failed");
        eprintln!("{}", error_fmt::humanize(&e));
        std::process::exit(1);
    }
}
