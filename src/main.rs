//! Requester - pick a named request, fire it, archive the response
//!
//! Flow:
//! - settings.yaml + flags → effective settings
//! - namespace chosen (fixed or prompted) and loaded into a Session
//! - read-eval-print loop: one request fully handled before the next prompt

use std::fs;
use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use crossterm::style::Stylize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use requester::constants::LOG_FILE;
use requester::messages::parse_input;
use requester::settings::{resolve_home, write_samples};
use requester::{ui, Cli, ConfigStore, Feedback, RequesterError, Session, Settings, UiEvent};

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{}", format!("{:#}", e).red());
        let fatal = e
            .downcast_ref::<RequesterError>()
            .map_or(false, RequesterError::is_fatal);
        std::process::exit(if fatal { 2 } else { 1 });
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.init {
        let home = resolve_home(cli.home.as_deref());
        let written = write_samples(&home)?;
        if written.is_empty() {
            println!("Nothing to do, {} already set up", home.display());
        }
        for path in written {
            println!("Wrote {}", path.display());
        }
        return Ok(());
    }

    let settings = Settings::load(&cli)?;

    // Initialize logging to file
    fs::create_dir_all(&settings.home)
        .with_context(|| format!("creating {}", settings.home.display()))?;
    let file_appender = tracing_appender::rolling::never(&settings.home, LOG_FILE);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(settings.log_level)
        .init();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();

    let namespace = match &settings.namespace {
        Some(name) => name.clone(),
        None => match choose_namespace(&settings, &mut lines, &mut stdout).await? {
            Some(name) => name,
            None => return Ok(()),
        },
    };

    let mut session = Session::from_settings(&settings, &namespace)?;
    redraw(&mut stdout, &session)?;

    loop {
        ui::prompt(&mut stdout, "Request:")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let event = parse_input(&line);
        if event == UiEvent::Redraw {
            redraw(&mut stdout, &session)?;
            continue;
        }

        let feedback = session
            .handle_event(event, |call| {
                if let Err(e) = ui::draw_sending(&mut stdout, call) {
                    tracing::warn!(error = %e, "Could not write to terminal");
                }
            })
            .await;
        match &feedback {
            Feedback::Quit => break,
            Feedback::Reloaded { .. } => {
                redraw(&mut stdout, &session)?;
                ui::draw_feedback(&mut stdout, &feedback)?;
            }
            _ => ui::draw_feedback(&mut stdout, &feedback)?,
        }
    }

    tracing::info!("Session ended");
    Ok(())
}

fn redraw(out: &mut impl Write, session: &Session) -> io::Result<()> {
    ui::clear_screen(out)?;
    ui::draw_banner(out, &session.namespace().name, session.mode(), session.live_reload())?;
    ui::draw_menu(out, &session.menu())
}

/// Ask for a namespace by number. `None` when input ends.
async fn choose_namespace(
    settings: &Settings,
    lines: &mut InputLines,
    out: &mut impl Write,
) -> anyhow::Result<Option<String>> {
    let store = ConfigStore::new(settings.namespaces_dir());
    let namespaces = store.list_namespaces()?;
    if namespaces.is_empty() {
        anyhow::bail!(
            "No namespaces found in {} (run with --init for a sample)",
            store.dir().display()
        );
    }
    if let [only] = namespaces.as_slice() {
        return Ok(Some(only.clone()));
    }

    ui::draw_namespaces(out, &namespaces)?;
    loop {
        ui::prompt(out, "Namespace:")?;
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let input = line.trim();
        let chosen = match input.parse::<usize>() {
            Ok(n) => n.checked_sub(1).and_then(|i| namespaces.get(i)),
            Err(_) => namespaces.iter().find(|n| n.as_str() == input),
        };
        match chosen {
            Some(name) => return Ok(Some(name.clone())),
            None => writeln!(out, "{}", format!("Invalid namespace '{}'", input).red())?,
        }
    }
}
