//! State: one node of the hierarchy.
//!
//! A state wraps a user [`Behavior`], owns the single-slot mailbox commands
//! are injected into, an optional [`VariableScope`] and, when its behavior
//! declares inner states, the context that runs them.

use super::behavior::{AsAny, Behavior, CycleContext};
use super::context::Context;
use crate::builder::TransitionEntry;
use crate::config::MachineConfig;
use crate::core::{
    Command, CommandInjector, Mailbox, StateError, StatePath, StatePathChange, Tag, Transition,
    VariableScope, STATE_PATH_SEPARATOR,
};
use crate::validation::ConfigViolation;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

type PathObserver = Box<dyn FnMut(&StatePathChange) + Send>;

/// A running node of a hierarchical state machine.
///
/// The root of a machine is built with [`State::new`]; every inner state is
/// built from its parent's transition table. Driving the root with
/// [`State::run_cycle`] runs the whole active chain from the root down to a
/// leaf once.
///
/// # Example
///
/// ```rust
/// use emsm::builder::TransitionTable;
/// use emsm::command_set;
/// use emsm::core::{StateError, Transition};
/// use emsm::machine::{Behavior, CycleContext, State};
///
/// command_set! {
///     enum Commands { None, Enable, Disable }
///     none: None
/// }
///
/// #[derive(Debug, PartialEq)]
/// enum Transitions { Initial, Enable, Disable }
///
/// struct Root;
/// impl Behavior for Root {
///     fn transition_table(&self) -> TransitionTable {
///         TransitionTable::new()
///             .initial(Transitions::Initial, "Disabled", || Disabled)
///             .on(Transitions::Enable, "Enabled", || Enabled)
///     }
/// }
///
/// struct Disabled;
/// impl Behavior for Disabled {
///     fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
///         Ok((cx.get_command::<Commands>()? == Commands::Enable)
///             .then(|| Transition::to(Transitions::Enable)))
///     }
/// }
///
/// struct Enabled;
/// impl Behavior for Enabled {}
///
/// let mut root = State::new("Root", Root).unwrap();
/// root.run_cycle().unwrap();
/// assert_eq!(root.state_path(), "Root->Disabled");
///
/// root.inject_command(Commands::Enable);
/// root.run_cycle().unwrap();
/// assert_eq!(root.state_path(), "Root->Enabled");
/// ```
pub struct State {
    name: String,
    type_name: &'static str,
    running: bool,
    mailbox: Arc<Mailbox>,
    active_command: Option<Command>,
    scope: Option<VariableScope>,
    context: Option<Context>,
    behavior: Box<dyn Behavior>,
    observers: Vec<PathObserver>,
}

impl State {
    /// Build a root state with the default configuration.
    pub fn new<B: Behavior>(name: impl Into<String>, behavior: B) -> Result<Self, StateError> {
        Self::with_config(name, behavior, MachineConfig::default())
    }

    /// Build a root state; `config` applies to every state beneath it too.
    pub fn with_config<B: Behavior>(
        name: impl Into<String>,
        behavior: B,
        config: MachineConfig,
    ) -> Result<Self, StateError> {
        let name = name.into();
        if name.is_empty() || name.contains(STATE_PATH_SEPARATOR) {
            return Err(StateError::InvalidConfiguration {
                state: name.clone(),
                violations: vec![ConfigViolation::InvalidRootName { name }],
            });
        }
        Self::build(name, Box::new(behavior), type_name::<B>(), &config)
    }

    pub(crate) fn from_entry(
        entry: &TransitionEntry,
        config: &MachineConfig,
    ) -> Result<Self, StateError> {
        Self::build(
            entry.state_name().to_string(),
            entry.instantiate(),
            entry.state_type(),
            config,
        )
    }

    fn build(
        name: String,
        behavior: Box<dyn Behavior>,
        type_name: &'static str,
        config: &MachineConfig,
    ) -> Result<Self, StateError> {
        let table = behavior.transition_table();
        let context = if table.is_empty() {
            None
        } else {
            Some(Context::new(&name, &table, config)?)
        };

        Ok(Self {
            name,
            type_name,
            running: false,
            mailbox: Arc::new(Mailbox::new(config.mailbox_policy)),
            active_command: None,
            scope: None,
            context,
            behavior,
            observers: Vec::new(),
        })
    }

    /// Run one cycle of this state and, recursively, its active inner states.
    ///
    /// The pending command is moved into this cycle, `entry` fires if the
    /// state is not running yet, then `do_step`, then the command is handed
    /// down and the inner context operates. The returned transition is
    /// meant for the owning context; at the root it is informational.
    ///
    /// Path observers are notified of a changed path even when the cycle
    /// fails.
    pub fn run_cycle(&mut self) -> Result<Option<Transition>, StateError> {
        let old_path = (!self.observers.is_empty()).then(|| self.state_path());

        self.active_command = self.mailbox.take();
        let result = self.step();
        self.active_command = None;

        // A failing cycle may already have switched deeper levels.
        if let Some(old_path) = old_path {
            let new_path = self.state_path();
            if new_path != old_path {
                let change = StatePathChange::new(old_path, new_path);
                for observer in &mut self.observers {
                    observer(&change);
                }
            }
        }

        result
    }

    fn step(&mut self) -> Result<Option<Transition>, StateError> {
        let cx = CycleContext::new(&self.name, self.active_command.as_ref(), self.scope.as_ref());

        if !self.running {
            trace!(state = %self.name, "entry");
            self.behavior.entry(&cx)?;
            self.running = true;
        }

        trace!(state = %self.name, "do");
        let requested = self.behavior.do_step(&cx)?;

        if let Some(context) = self.context.as_mut() {
            context.deliver(self.active_command.clone());
            context.operate()?;
        }

        Ok(requested)
    }

    /// Queue a command for the next cycle. Returns `false` if the mailbox
    /// dropped it.
    ///
    /// A command queued on an inner state that is not active is discarded
    /// when that state is entered or reset.
    pub fn inject_command(&self, command: impl Into<Command>) -> bool {
        self.mailbox.post(command.into())
    }

    /// Queue a command carrying a payload for the next cycle.
    pub fn inject_command_with_args<T: Tag, A: Any + Send + Sync>(&self, tag: T, args: A) -> bool {
        self.mailbox.post(Command::with_args(tag, args))
    }

    /// Handle for injecting commands from another thread.
    pub fn injector(&self) -> CommandInjector {
        CommandInjector::new(Arc::clone(&self.mailbox))
    }

    /// Whether a command is waiting for the next cycle.
    pub fn has_pending_command(&self) -> bool {
        !self.mailbox.is_empty()
    }

    /// Hand the parent's cycle command down, overwriting anything pending.
    pub(crate) fn deliver_command(&self, command: Command) {
        self.mailbox.replace(command);
    }

    /// Drop a command injected while this state was not active.
    pub(crate) fn discard_pending(&self) {
        if let Some(command) = self.mailbox.take() {
            debug!(state = %self.name, command = ?command, "stale command discarded");
        }
    }

    /// Add a variable to this state's scope, creating the scope on first use.
    ///
    /// Inner states without a scope of their own are linked to this one, so
    /// they see the variable too. Variables are never replaced: a name that
    /// is already present yields [`StateError::DuplicateVariable`].
    pub fn inject_variable<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<(), StateError> {
        let name = name.into();
        let scope = self.scope.get_or_insert_with(VariableScope::new).clone();

        if !scope.insert(name.clone(), value) {
            return Err(StateError::DuplicateVariable {
                state: self.name.clone(),
                name,
            });
        }

        if let Some(context) = self.context.as_mut() {
            context.attach_scope(&scope);
        }
        debug!(state = %self.name, variable = %name, "variable injected");
        Ok(())
    }

    pub(crate) fn inherit_scope(&mut self, scope: &VariableScope) {
        if self.scope.is_some() {
            return;
        }
        trace!(state = %self.name, "scope attached");
        self.scope = Some(scope.clone());
        if let Some(context) = self.context.as_mut() {
            context.attach_scope(scope);
        }
    }

    /// Clone a variable out of the scope this state sees.
    pub fn get_var<T: Any + Clone>(&self, name: &str) -> Result<T, StateError> {
        CycleContext::new(&self.name, None, self.scope.as_ref()).get_var(name)
    }

    pub fn scope(&self) -> Option<&VariableScope> {
        self.scope.as_ref()
    }

    /// Names of the active chain joined by `->`, starting at this state.
    pub fn state_path(&self) -> String {
        let mut path = self.name.clone();
        let mut state = self;
        while let Some(child) = state.active_child() {
            path.push_str(STATE_PATH_SEPARATOR);
            path.push_str(&child.name);
            state = child;
        }
        path
    }

    /// Select the active chain named by `path` without firing callbacks.
    ///
    /// The whole path is resolved before anything changes, so a failing
    /// path leaves the hierarchy as it was. Levels whose selection changes
    /// are deactivated quietly; the selected states fire `entry` on their
    /// next cycle. Segments may stop short of a leaf, in which case the
    /// remaining levels keep their current selection.
    pub fn set_state_path(&mut self, path: &str) -> Result<(), StateError> {
        let parsed = StatePath::parse(path)?;
        if parsed.root() != self.name {
            return Err(StateError::InvalidStatePath {
                path: path.to_string(),
                reason: format!(
                    "root segment '{}' does not name state '{}'",
                    parsed.root(),
                    self.name
                ),
            });
        }

        let inner = &parsed.segments()[1..];
        self.check_path(path, inner)?;
        self.apply_path(inner)?;
        debug!(state = %self.name, path, "state path restored");
        Ok(())
    }

    fn check_path(&self, path: &str, segments: &[String]) -> Result<(), StateError> {
        let Some((first, rest)) = segments.split_first() else {
            return Ok(());
        };
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| StateError::InvalidStatePath {
                path: path.to_string(),
                reason: format!("state '{}' has no inner state '{first}'", self.name),
            })?;
        context.state_named(first)?.check_path(path, rest)
    }

    fn apply_path(&mut self, segments: &[String]) -> Result<(), StateError> {
        let (Some((first, rest)), Some(context)) = (segments.split_first(), self.context.as_mut())
        else {
            return Ok(());
        };
        context.set_current_by_name(first)?;
        context.current_mut().apply_path(rest)
    }

    /// Fire `exit` if running, then reset the inner context to its initial
    /// state. A command still waiting in the mailbox is discarded.
    pub fn reset(&mut self) -> Result<(), StateError> {
        self.discard_pending();
        if self.running {
            trace!(state = %self.name, "exit");
            let cx = CycleContext::new(&self.name, None, self.scope.as_ref());
            self.behavior.exit(&cx)?;
        }
        if let Some(context) = self.context.as_mut() {
            context.reset()?;
        }
        self.running = false;
        debug!(state = %self.name, "reset");
        Ok(())
    }

    pub(crate) fn deactivate(&mut self) {
        self.discard_pending();
        self.running = false;
        if let Some(context) = self.context.as_mut() {
            context.deactivate();
        }
    }

    /// Register a callback fired after any cycle that changed the state path.
    pub fn on_state_path_changed<F>(&mut self, observer: F)
    where
        F: FnMut(&StatePathChange) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn active_child(&self) -> Option<&State> {
        self.context.as_ref().map(Context::current)
    }

    pub fn active_child_mut(&mut self) -> Option<&mut State> {
        self.context.as_mut().map(Context::current_mut)
    }

    /// Inner state named `name`, whether active or not.
    pub fn inner_state(&self, name: &str) -> Option<&State> {
        self.context.as_ref()?.state_named(name).ok()
    }

    /// Whether the inner context currently sits at its initial state.
    /// Leaf states always report `true`.
    pub fn is_at_initial(&self) -> bool {
        self.context.as_ref().map_or(true, Context::is_at_initial)
    }

    pub fn behavior<B: Behavior>(&self) -> Option<&B> {
        AsAny::as_any(&*self.behavior).downcast_ref::<B>()
    }

    pub fn behavior_mut<B: Behavior>(&mut self) -> Option<&mut B> {
        AsAny::as_any_mut(&mut *self.behavior).downcast_mut::<B>()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type name of the behavior this state was built from.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether `entry` has fired and `exit` has not since.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_leaf(&self) -> bool {
        self.context.is_none()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("running", &self.running)
            .field("path", &self.state_path())
            .field("scope", &self.scope)
            .field("observers", &self.observers.len())
            .finish()
    }
}
