//! Shared fixtures: a two-level test machine and a blinky machine.

#![allow(dead_code)]

use emsm::builder::TransitionTable;
use emsm::command_set;
use emsm::core::{StateError, Transition};
use emsm::machine::{Behavior, CycleContext, State};
use std::sync::{Arc, Mutex};

command_set! {
    pub enum TestCommands {
        None,
        Enable,
        Disable,
        InnerEnable,
        InnerDisable,
    }
    none: None
}

command_set! {
    pub enum NoNoneCommands {
        Ping,
    }
}

#[derive(Debug, PartialEq)]
pub enum TestTransitions {
    Initial,
    Enable,
    Disable,
    InnerEnable,
    InnerDisable,
    Undeclared,
}

/// Callback order across the whole machine, e.g. `"Enabled entry"`.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn drain(log: &EventLog) -> Vec<String> {
    std::mem::take(&mut *log.lock().unwrap())
}

/// Per-instance callback counters.
#[derive(Debug, Default, Clone)]
pub struct Counters {
    pub entries: usize,
    pub dos: usize,
    pub exits: usize,
    pub commands: Vec<TestCommands>,
}

struct Tracked {
    name: &'static str,
    log: EventLog,
    counters: Counters,
}

impl Tracked {
    fn new(name: &'static str, log: &EventLog) -> Self {
        Self {
            name,
            log: log.clone(),
            counters: Counters::default(),
        }
    }

    fn entry(&mut self) {
        self.counters.entries += 1;
        self.log.lock().unwrap().push(format!("{} entry", self.name));
    }

    fn step(&mut self, cx: &CycleContext<'_>) -> Result<TestCommands, StateError> {
        let command = cx.get_command::<TestCommands>()?;
        self.counters.dos += 1;
        self.counters.commands.push(command);
        self.log.lock().unwrap().push(format!("{} do", self.name));
        Ok(command)
    }

    fn exit(&mut self) {
        self.counters.exits += 1;
        self.log.lock().unwrap().push(format!("{} exit", self.name));
    }
}

macro_rules! tracked_state {
    ($name:ident, |$command:ident| $on_command:expr) => {
        pub struct $name {
            tracked: Tracked,
        }

        impl $name {
            pub fn new(log: &EventLog) -> Self {
                Self {
                    tracked: Tracked::new(stringify!($name), log),
                }
            }

            pub fn counters(&self) -> &Counters {
                &self.tracked.counters
            }
        }

        impl Behavior for $name {
            fn entry(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
                self.tracked.entry();
                Ok(())
            }

            fn do_step(
                &mut self,
                cx: &CycleContext<'_>,
            ) -> Result<Option<Transition>, StateError> {
                let $command = self.tracked.step(cx)?;
                Ok($on_command)
            }

            fn exit(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
                self.tracked.exit();
                Ok(())
            }
        }
    };
}

pub struct TestSm {
    tracked: Tracked,
}

impl TestSm {
    pub fn new(log: &EventLog) -> Self {
        Self {
            tracked: Tracked::new("TestSM", log),
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.tracked.counters
    }
}

impl Behavior for TestSm {
    fn transition_table(&self) -> TransitionTable {
        let (disabled, enabled) = (self.tracked.log.clone(), self.tracked.log.clone());
        TransitionTable::new()
            .on(TestTransitions::Enable, "Enabled", move || Enabled::new(&enabled))
            .on(TestTransitions::Disable, "Disabled", {
                let log = disabled.clone();
                move || Disabled::new(&log)
            })
            .initial(TestTransitions::Initial, "Disabled", move || {
                Disabled::new(&disabled)
            })
    }

    fn entry(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
        self.tracked.entry();
        Ok(())
    }

    fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
        self.tracked.step(cx)?;
        Ok(None)
    }

    fn exit(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
        self.tracked.exit();
        Ok(())
    }
}

tracked_state!(Disabled, |command| match command {
    TestCommands::Enable => Some(Transition::to(TestTransitions::Enable)),
    TestCommands::InnerEnable => Some(Transition::to(TestTransitions::Undeclared)),
    _ => None,
});

pub struct Enabled {
    tracked: Tracked,
}

impl Enabled {
    pub fn new(log: &EventLog) -> Self {
        Self {
            tracked: Tracked::new("Enabled", log),
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.tracked.counters
    }
}

impl Behavior for Enabled {
    fn transition_table(&self) -> TransitionTable {
        let (inner_disabled, inner_enabled) = (self.tracked.log.clone(), self.tracked.log.clone());
        TransitionTable::new()
            .initial(TestTransitions::Initial, "InnerDisabled", {
                let log = inner_disabled.clone();
                move || InnerDisabled::new(&log)
            })
            .on(TestTransitions::InnerEnable, "InnerEnabled", move || {
                InnerEnabled::new(&inner_enabled)
            })
            .on(TestTransitions::InnerDisable, "InnerDisabled", move || {
                InnerDisabled::new(&inner_disabled)
            })
    }

    fn entry(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
        self.tracked.entry();
        Ok(())
    }

    fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
        Ok(match self.tracked.step(cx)? {
            TestCommands::Disable => Some(Transition::to(TestTransitions::Disable)),
            _ => None,
        })
    }

    fn exit(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
        self.tracked.exit();
        Ok(())
    }
}

tracked_state!(InnerDisabled, |command| match command {
    TestCommands::InnerEnable => Some(Transition::to(TestTransitions::InnerEnable)),
    _ => None,
});

tracked_state!(InnerEnabled, |command| match command {
    TestCommands::InnerDisable => Some(Transition::to(TestTransitions::InnerDisable)),
    _ => None,
});

/// `TestSM` with `Disabled` and `Enabled`; `Enabled` nests `InnerDisabled`
/// and `InnerEnabled`.
pub fn test_machine() -> (State, EventLog) {
    let log = EventLog::default();
    let root = State::new("TestSM", TestSm::new(&log)).unwrap();
    (root, log)
}

/// A state whose table lacks an initial entry.
pub struct Headless;

impl Behavior for Headless {
    fn transition_table(&self) -> TransitionTable {
        TransitionTable::new().on(TestTransitions::Enable, "Enabled", || {
            Enabled::new(&EventLog::default())
        })
    }
}

/// A leaf that reads a command set without a "none" member.
pub struct NoNoneReader;

impl Behavior for NoNoneReader {
    fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
        cx.get_command::<NoNoneCommands>()?;
        Ok(None)
    }
}

command_set! {
    pub enum BlinkyCommands {
        None,
        Enable,
        Disable,
        Fast,
        Slow,
    }
    none: None
}

#[derive(Debug, PartialEq)]
pub enum BlinkyTransitions {
    Initial,
    Enable,
    Disable,
    Fast,
    Slow,
}

/// Shared output pin, toggled by the blinking states.
pub type Led = Arc<Mutex<bool>>;

pub const LED_VAR: &str = "led";

pub struct BlinkyRoot;

impl Behavior for BlinkyRoot {
    fn transition_table(&self) -> TransitionTable {
        TransitionTable::new()
            .initial(BlinkyTransitions::Initial, "Disabled", || BlinkyDisabled)
            .on(BlinkyTransitions::Enable, "Enabled", || BlinkyEnabled)
            .on(BlinkyTransitions::Disable, "Disabled", || BlinkyDisabled)
    }
}

pub struct BlinkyDisabled;

impl Behavior for BlinkyDisabled {
    fn entry(&mut self, cx: &CycleContext<'_>) -> Result<(), StateError> {
        *cx.get_var::<Led>(LED_VAR)?.lock().unwrap() = false;
        Ok(())
    }

    fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
        Ok(match cx.get_command::<BlinkyCommands>()? {
            BlinkyCommands::Enable => Some(Transition::to(BlinkyTransitions::Enable)),
            _ => None,
        })
    }
}

pub struct BlinkyEnabled;

impl Behavior for BlinkyEnabled {
    fn transition_table(&self) -> TransitionTable {
        TransitionTable::new()
            .initial(BlinkyTransitions::Initial, "BlinkSlow", || Blink::new(4))
            .on(BlinkyTransitions::Fast, "BlinkFast", || Blink::new(1))
            .on(BlinkyTransitions::Slow, "BlinkSlow", || Blink::new(4))
    }

    fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
        Ok(match cx.get_command::<BlinkyCommands>()? {
            BlinkyCommands::Disable => Some(Transition::to(BlinkyTransitions::Disable)),
            _ => None,
        })
    }
}

/// Toggles the LED every `period` cycles.
pub struct Blink {
    period: u32,
    ticks: u32,
}

impl Blink {
    pub fn new(period: u32) -> Self {
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
            let led = cx.get_var::<Led>(LED_VAR)?;
            let mut on = led.lock().unwrap();
            *on = !*on;
        }
        Ok(match cx.get_command::<BlinkyCommands>()? {
            BlinkyCommands::Fast => Some(Transition::to(BlinkyTransitions::Fast)),
            BlinkyCommands::Slow => Some(Transition::to(BlinkyTransitions::Slow)),
            _ => None,
        })
    }
}

/// Blinky machine rooted at `Root`, with its LED variable injected.
pub fn blinky_machine() -> (State, Led) {
    let led = Led::default();
    let mut root = State::new("Root", BlinkyRoot).unwrap();
    root.inject_variable(LED_VAR, led.clone()).unwrap();
    (root, led)
}
