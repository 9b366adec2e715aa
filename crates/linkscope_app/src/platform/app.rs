use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use linkscope_client::{ClientSettings, DEFAULT_BASE_URL};
use linkscope_core::{session_start, update, AppState, Msg, POLL_INTERVAL};
use url::Url;

use super::effects::EffectRunner;
use super::ui;
use super::ui::input::Command;

/// Everything the shell loop reacts to.
pub(crate) enum ShellEvent {
    Core(Msg),
    /// Text for the terminal that bypasses the state machine (help, hints).
    Print(String),
    Quit,
}

/// Agent address resolution: `LINKSCOPE_URL`, then the first argument,
/// then the built-in default.
pub(crate) fn agent_settings() -> anyhow::Result<ClientSettings> {
    let raw = std::env::var("LINKSCOPE_URL")
        .ok()
        .or_else(|| std::env::args().nth(1))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base = Url::parse(&raw).with_context(|| format!("invalid agent url {raw:?}"))?;
    Ok(ClientSettings::with_base(base))
}

pub(crate) fn run_app(settings: ClientSettings) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<ShellEvent>();
    let runner = EffectRunner::new(settings, event_tx.clone())?;
    spawn_input_thread(event_tx.clone());
    spawn_poll_thread(event_tx);

    let (mut state, boot_effects) = session_start();
    runner.enqueue(boot_effects);
    println!("{}", ui::input::help_text());

    while let Ok(event) = event_rx.recv() {
        let mut quit = process(&mut state, &runner, event);
        // Drain whatever queued up behind the first event (stream replay
        // arrives in bursts) so the redraw below covers the whole batch.
        while let Ok(event) = event_rx.try_recv() {
            quit = process(&mut state, &runner, event) || quit;
        }
        if quit {
            break;
        }
        if state.consume_dirty() {
            print!("{}", ui::render::render(&state.view()));
            let _ = io::stdout().flush();
        }
    }
    Ok(())
}

fn process(state: &mut AppState, runner: &EffectRunner, event: ShellEvent) -> bool {
    match event {
        ShellEvent::Quit => true,
        ShellEvent::Print(text) => {
            println!("{text}");
            false
        }
        ShellEvent::Core(msg) => {
            let (next, effects) = update(std::mem::take(state), msg);
            *state = next;
            runner.enqueue(effects);
            false
        }
    }
}

/// Fixed-interval poll tick. The state machine decides whether a tick
/// turns into a status fetch.
fn spawn_poll_thread(event_tx: mpsc::Sender<ShellEvent>) {
    thread::spawn(move || {
        while event_tx.send(ShellEvent::Core(Msg::PollTick)).is_ok() {
            thread::sleep(POLL_INTERVAL);
        }
    });
}

fn spawn_input_thread(event_tx: mpsc::Sender<ShellEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            let sent = match ui::input::parse(&line) {
                Ok(None) => Ok(()),
                Ok(Some(Command::Help)) => {
                    event_tx.send(ShellEvent::Print(ui::input::help_text().to_string()))
                }
                Ok(Some(Command::Quit)) => {
                    let _ = event_tx.send(ShellEvent::Quit);
                    return;
                }
                Ok(Some(Command::Dispatch(msg))) => event_tx.send(ShellEvent::Core(msg)),
                Err(hint) => event_tx.send(ShellEvent::Print(hint)),
            };
            if sent.is_err() {
                return;
            }
        }
        // stdin closed; take the shell down with it.
        let _ = event_tx.send(ShellEvent::Quit);
    });
}
