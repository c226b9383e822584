//! Interactive playback on an output device.
//!
//! Commands are read line by line from stdin on a helper thread and handed
//! to the control loop over a channel; the loop also polls the controller so
//! a pending fade-out teardown runs on time. Ctrl+C fades out and exits, a
//! second Ctrl+C exits immediately.

use super::common::{load_catalog, load_config, stream_config};
use clap::Args;
use crossbeam_channel::RecvTimeoutError;
use resona_core::{Clock, EngineProvider, LifecycleState, PlaybackController};
use resona_io::CpalEngineProvider;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Args)]
pub struct PlayArgs {
    /// Preset to select (defaults to the configured or first preset)
    #[arg(short, long)]
    preset: Option<String>,

    /// Output device (index, exact name, or partial name)
    #[arg(short, long)]
    output: Option<String>,

    /// Config file (defaults to the user config)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Start playing immediately
    #[arg(long)]
    autoplay: bool,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Play,
    Stop,
    Preset(String),
    Status,
    List,
    Help,
    Quit,
}

impl Input {
    /// Parse a command line. Blank lines parse to `None`.
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        let input = match (cmd.to_ascii_lowercase().as_str(), arg) {
            ("play" | "start" | "p", None) => Self::Play,
            ("stop" | "s", None) => Self::Stop,
            ("preset" | "select", Some(id)) => Self::Preset(id.to_string()),
            ("preset" | "select", None) => return Err("usage: preset <id>".into()),
            ("status", None) => Self::Status,
            ("list" | "ls", None) => Self::List,
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit" | "q", None) => Self::Quit,
            (
                "play" | "start" | "p" | "stop" | "s" | "status" | "list" | "ls" | "help" | "?"
                | "quit" | "exit" | "q",
                Some(_),
            ) => return Err(format!("'{cmd}' takes no arguments")),
            (other, _) => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        if words.next().is_some() {
            return Err(format!("too many arguments for '{cmd}'"));
        }
        Ok(Some(input))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Prompt listing the commands enabled in `state`.
fn prompt(state: LifecycleState) -> String {
    let mut triggers = Vec::new();
    if state.can_start() {
        triggers.push("play");
    }
    if state.can_stop() {
        triggers.push("stop");
    }
    triggers.extend(["preset <id>", "list", "status", "quit"]);
    format!("[{state}] {} > ", triggers.join(" | "))
}

fn show_prompt(state: LifecycleState) {
    print!("{}", prompt(state));
    let _ = std::io::stdout().flush();
}

fn handle<P: EngineProvider, C: Clock>(
    controller: &mut PlaybackController<P, C>,
    input: Input,
) -> Flow {
    match input {
        Input::Play => {
            if !controller.state().can_start() {
                println!("Already {}.", controller.state());
            } else if let Err(err) = controller.start_selected() {
                eprintln!("error: {err}");
            } else {
                println!(
                    "Playing '{}' ({} tones).",
                    controller.selected_preset().unwrap_or("?"),
                    controller.generator_count()
                );
            }
        }
        Input::Stop => {
            if controller.state().can_stop() {
                controller.stop();
                println!("Fading out...");
            } else {
                println!("Not playing.");
            }
        }
        Input::Preset(id) => {
            let was_playing = controller.state() == LifecycleState::Playing;
            match controller.select_preset(&id) {
                Ok(()) if was_playing => println!("Selected '{id}'; fading out, then 'play'."),
                Ok(()) => println!("Selected '{id}'."),
                Err(err) => eprintln!("error: {err}"),
            }
        }
        Input::Status => print_status(controller),
        Input::List => {
            let selected = controller.selected_preset();
            for preset in controller.presets().iter() {
                let marker = if Some(preset.id()) == selected { "*" } else { " " };
                println!(
                    " {marker} {:20} {:3} tones",
                    preset.id(),
                    preset.frequencies().len()
                );
            }
        }
        Input::Help => {
            println!("  play          start the selected preset");
            println!("  stop          fade out and release the device");
            println!("  preset <id>   select a preset (stops playback)");
            println!("  list          list presets");
            println!("  status        show playback state");
            println!("  quit          fade out and exit");
        }
        Input::Quit => return Flow::Quit,
    }
    Flow::Continue
}

fn print_status<P: EngineProvider, C: Clock>(controller: &PlaybackController<P, C>) {
    println!("State:      {}", controller.state());
    println!(
        "Preset:     {}",
        controller.selected_preset().unwrap_or("(none)")
    );
    println!("Generators: {}", controller.generator_count());
    if let Some(remaining) = controller.time_until_teardown() {
        println!("Teardown:   in {:.2}s", remaining.as_secs_f64());
    }
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let catalog = load_catalog(&config, args.preset.as_deref())?;
    let settings = config.playback_settings()?;
    let provider = CpalEngineProvider::new(stream_config(&config, args.output));

    let mut controller = PlaybackController::new(provider, catalog.into_table(), settings);
    if let Some(id) = args.preset.as_deref().or(config.playback.default_preset.as_deref()) {
        controller.select_preset(id)?;
    }

    // Set up Ctrl+C handler
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })?;

    let (tx, rx) = crossbeam_channel::unbounded::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    println!("resona - type 'help' for commands, Ctrl+C to quit.\n");
    if args.autoplay {
        handle(&mut controller, Input::Play);
    }
    show_prompt(controller.state());

    let mut quitting = false;
    let mut stdin_open = true;
    loop {
        if interrupted.swap(false, Ordering::SeqCst) {
            if quitting {
                println!("\nStopping now.");
                break;
            }
            println!("\nFading out... (Ctrl+C again to exit now)");
            quitting = true;
            controller.stop();
        }

        let before = controller.state();
        if stdin_open {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(line) => {
                    match Input::parse(&line) {
                        Ok(Some(input)) => {
                            if handle(&mut controller, input) == Flow::Quit {
                                quitting = true;
                                controller.stop();
                            }
                        }
                        Ok(None) => {}
                        Err(msg) => eprintln!("{msg}"),
                    }
                    if !quitting {
                        show_prompt(controller.state());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    stdin_open = false;
                    quitting = true;
                    controller.stop();
                }
            }
        } else {
            std::thread::sleep(POLL_INTERVAL);
        }

        let after = controller.poll();
        if quitting && after == LifecycleState::Idle {
            break;
        }
        if after != before && after == LifecycleState::Idle {
            println!("\nStopped.");
            show_prompt(after);
        }
    }

    controller.shutdown();
    println!("Bye.");
    Ok(())
}
