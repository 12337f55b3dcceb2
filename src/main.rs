/// Entry point and program launcher.

mod config;
mod domain;
mod logging;
mod programs;
mod sim;
mod ui;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context as _;

use config::GameConfig;
use programs::{Context, REGISTRY};
use ui::style::{self, CYAN, GREEN, RED, YELLOW};
use ui::term;

fn main() -> ExitCode {
    let config = GameConfig::load();
    let _log_guard = logging::init(&config);
    tracing::debug!(?config, "configuration");
    install_panic_hook();

    let interrupt = Arc::new(AtomicBool::new(false));
    if let Err(e) = register_interrupt(&interrupt) {
        tracing::warn!(error = %e, "signal handlers unavailable");
    }

    match launcher(&config, interrupt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            term::restore_best_effort();
            tracing::error!(error = %format!("{e:#}"), "fatal");
            eprintln!("termarcade: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn launcher(config: &GameConfig, interrupt: Arc<AtomicBool>) -> anyhow::Result<()> {
    let ctx = Context { interrupt };
    print_help()?;

    loop {
        if ctx.interrupted() {
            break;
        }
        print!("{}", style::painted(&[GREEN], "arcade> "));
        io::stdout().flush()?;

        let mut line = String::new();
        let read = match io::stdin().read_line(&mut line) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("reading a command"),
        };
        if read == 0 {
            println!();
            break;
        }
        if ctx.interrupted() {
            break;
        }

        let command = line.trim().to_ascii_lowercase();
        match command.as_str() {
            "" => {}
            "quit" | "q" | "exit" => break,
            "help" | "?" => print_help()?,
            name => match programs::lookup(name) {
                Some(entry) => {
                    tracing::info!(program = entry.name, "launching");
                    let mut program = (entry.build)(config);
                    if let Err(e) = program.run(&ctx) {
                        term::restore_best_effort();
                        tracing::error!(program = entry.name, error = %format!("{e:#}"), "program failed");
                        println!("{}", style::painted(&[RED], format!("{} stopped: {e:#}", entry.name)));
                    }
                }
                None => {
                    println!("{}", style::painted(&[RED], format!("Unknown command: {name}")));
                    println!("{}", style::painted(&[YELLOW], "Type 'help' for available commands"));
                }
            },
        }
    }

    println!("{}", style::painted(&[GREEN], "Thanks for playing!"));
    tracing::info!("launcher closed");
    Ok(())
}

fn print_help() -> io::Result<()> {
    let mut out = io::stdout();
    writeln!(out, "{}", style::painted(&[CYAN], "Available programs:"))?;
    for entry in REGISTRY {
        writeln!(out, "  {:<8} {}", entry.name, entry.about)?;
    }
    writeln!(out, "  {:<8} {}", "quit", "leave the arcade")?;
    out.flush()
}

/// Put the terminal back before the default hook prints the panic.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        term::restore_best_effort();
        default_hook(info);
    }));
}

/// What to tell the player after the first interrupt. A raw-mode activity
/// notices the flag within one frame; a cooked prompt stays blocked in its
/// line read until Enter arrives.
#[cfg_attr(not(unix), allow(dead_code))]
fn interrupt_notice(raw_held: bool) -> Option<&'static str> {
    if raw_held {
        None
    } else {
        Some("\r\nInterrupted. Press Enter to leave, or Ctrl+C again to quit now.\r\n")
    }
}

/// First SIGINT/SIGTERM sets the flag and lets the current activity wind
/// down; a second one while the flag is set exits with 128 + signal.
#[cfg(unix)]
fn register_interrupt(interrupt: &Arc<AtomicBool>) -> io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::flag;
    use signal_hook::iterator::Signals;

    for sig in [SIGINT, SIGTERM] {
        flag::register_conditional_shutdown(sig, 128 + sig, Arc::clone(interrupt))?;
        flag::register(sig, Arc::clone(interrupt))?;
    }

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("interrupt-notice".into())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                tracing::info!(signal = sig, "interrupt received");
                if let Some(notice) = interrupt_notice(term::raw_mode_held()) {
                    eprint!("{notice}");
                }
            }
        })?;
    Ok(())
}

#[cfg(not(unix))]
fn register_interrupt(_interrupt: &Arc<AtomicBool>) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooked_prompt_gets_an_interrupt_hint() {
        let notice = interrupt_notice(false).unwrap();
        assert!(notice.contains("Press Enter"));
        assert!(notice.contains("Ctrl+C again"));
    }

    #[test]
    fn raw_activity_winds_down_silently() {
        assert_eq!(interrupt_notice(true), None);
    }
}
