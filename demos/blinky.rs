//! Blinky
//!
//! This demo drives a three-level machine from a periodic tick while a
//! second task reads commands from stdin.
//!
//! Key concepts:
//! - Composite states (Root -> Enabled -> BlinkSlow/BlinkFast)
//! - Commands injected from another task through a `CommandInjector`
//! - A shared LED variable injected once at the root
//! - Path-change observers and a checkpoint taken on exit
//!
//! Commands: `e` enable, `d` disable, `f` fast, `s` slow, `q` quit.
//!
//! Run with: cargo run --example blinky

use emsm::builder::TransitionTable;
use emsm::checkpoint::Checkpoint;
use emsm::command_set;
use emsm::core::{PathHistory, StateError, Transition};
use emsm::machine::{Behavior, CycleContext, State};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

command_set! {
    enum BlinkyCommands {
        None,
        Enable,
        Disable,
        Fast,
        Slow,
    }
    none: None
}

#[derive(Debug, PartialEq)]
enum BlinkyTransitions {
    Initial,
    Enable,
    Disable,
    Fast,
    Slow,
}

type Led = Arc<Mutex<bool>>;

const LED: &str = "led";

fn set_led(cx: &CycleContext<'_>, on: impl FnOnce(bool) -> bool) -> Result<(), StateError> {
    let led = cx.get_var::<Led>(LED)?;
    let mut state = led.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let next = on(*state);
    if next != *state {
        *state = next;
        println!("LED {}", if next { "ON" } else { "off" });
    }
    Ok(())
}

struct Blinky;

impl Behavior for Blinky {
    fn transition_table(&self) -> TransitionTable {
        TransitionTable::new()
            .initial(BlinkyTransitions::Initial, "Disabled", || Disabled)
            .on(BlinkyTransitions::Enable, "Enabled", || Enabled)
            .on(BlinkyTransitions::Disable, "Disabled", || Disabled)
    }
}

struct Disabled;

impl Behavior for Disabled {
    fn entry(&mut self, cx: &CycleContext<'_>) -> Result<(), StateError> {
        set_led(cx, |_| false)
    }

    fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
        Ok(match cx.get_command::<BlinkyCommands>()? {
            BlinkyCommands::Enable => Some(Transition::to(BlinkyTransitions::Enable)),
            _ => None,
        })
    }
}

struct Enabled;

impl Behavior for Enabled {
    fn transition_table(&self) -> TransitionTable {
        TransitionTable::new()
            .initial(BlinkyTransitions::Initial, "BlinkSlow", || Blink::every(8))
            .on(BlinkyTransitions::Fast, "BlinkFast", || Blink::every(2))
            .on(BlinkyTransitions::Slow, "BlinkSlow", || Blink::every(8))
    }

    fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
        Ok(match cx.get_command::<BlinkyCommands>()? {
            BlinkyCommands::Disable => Some(Transition::to(BlinkyTransitions::Disable)),
            _ => None,
        })
    }
}

struct Blink {
    period: u32,
    ticks: u32,
}

impl Blink {
    fn every(period: u32) -> Self {
        Self { period, ticks: 0 }
    }
}

impl Behavior for Blink {
    fn entry(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
        self.ticks = 0;
        Ok(())
    }

    fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
        self.ticks += 1;
        if self.ticks % self.period == 0 {
            set_led(cx, |on| !on)?;
        }

        Ok(match cx.get_command::<BlinkyCommands>()? {
            BlinkyCommands::Fast => Some(Transition::to(BlinkyTransitions::Fast)),
            BlinkyCommands::Slow => Some(Transition::to(BlinkyTransitions::Slow)),
            _ => None,
        })
    }

    fn exit(&mut self, cx: &CycleContext<'_>) -> Result<(), StateError> {
        set_led(cx, |_| false)
    }
}

fn parse_command(line: &str) -> Option<BlinkyCommands> {
    match line.trim() {
        "e" => Some(BlinkyCommands::Enable),
        "d" => Some(BlinkyCommands::Disable),
        "f" => Some(BlinkyCommands::Fast),
        "s" => Some(BlinkyCommands::Slow),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut blinky = State::new("Blinky", Blinky)?;
    blinky.inject_variable(LED, Led::default())?;

    let history = Arc::new(Mutex::new(PathHistory::new()));
    blinky.on_state_path_changed(PathHistory::bounded_recorder(&history, 64));
    blinky.on_state_path_changed(|change| {
        info!(from = %change.old_path, to = %change.new_path, "state path changed");
    });

    let injector = blinky.injector();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    println!("=== Blinky ===");
    println!("e: enable, d: disable, f: fast, s: slow, q: quit\n");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                blinky.run_cycle()?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim() == "q" {
                    break;
                }
                match parse_command(&line) {
                    Some(command) if !injector.inject(command) => {
                        println!("busy, command dropped");
                    }
                    Some(_) => {}
                    None => println!("unknown command: {}", line.trim()),
                }
            }
        }
    }

    let history = history
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone();
    let checkpoint = Checkpoint::capture(&blinky).with_history(history);
    println!("\nFinal path: {}", blinky.state_path());
    println!("Checkpoint:\n{}", checkpoint.to_json()?);

    Ok(())
}
