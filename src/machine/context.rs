//! Context: the sibling states of one hierarchy level and the active one.

use super::factory::StateFactory;
use super::state::State;
use crate::builder::TransitionTable;
use crate::config::MachineConfig;
use crate::core::{Command, StateError, Transition, VariableScope};
use crate::validation::{duplicate_transitions, ConfigViolation, TableRules};
use std::fmt;
use stillwater::validation::Validation;
use tracing::{debug, warn};

/// Owns one transition table's worth of state instances and switches
/// between them.
///
/// Invariant: `current` always indexes an instance of the factory; after
/// construction and after every reset it equals `initial`.
pub(crate) struct Context {
    owner: String,
    factory: StateFactory,
    routes: Vec<(Transition, usize)>,
    initial: usize,
    current: usize,
}

impl Context {
    /// Build every target of `table` up front and select the initial one.
    pub(crate) fn new(
        owner: &str,
        table: &TransitionTable,
        config: &MachineConfig,
    ) -> Result<Self, StateError> {
        if let Validation::Failure(errors) = TableRules::from_config(config).check(table) {
            return Err(StateError::InvalidConfiguration {
                state: owner.to_string(),
                violations: errors.iter().cloned().collect(),
            });
        }

        for transition in duplicate_transitions(table) {
            warn!(owner, %transition, "transition declared more than once, last entry wins");
        }

        let mut factory = StateFactory::new(owner);
        let mut routes = Vec::with_capacity(table.len());
        let mut initial = None;
        for entry in table.entries() {
            let index = factory.create(entry, config)?;
            if entry.is_initial() {
                initial.get_or_insert(index);
            }
            routes.push((entry.transition().clone(), index));
        }

        let initial = initial.ok_or_else(|| StateError::InvalidConfiguration {
            state: owner.to_string(),
            violations: vec![ConfigViolation::MissingInitialTransition],
        })?;

        Ok(Self {
            owner: owner.to_string(),
            factory,
            routes,
            initial,
            current: initial,
        })
    }

    /// Run the current state's cycle and follow the transition it requests.
    pub(crate) fn operate(&mut self) -> Result<(), StateError> {
        let Some(transition) = self.factory.state_mut(self.current).run_cycle()? else {
            return Ok(());
        };

        let target = self
            .target_of(&transition)
            .ok_or_else(|| StateError::UnknownTransition {
                parent: self.owner.clone(),
                state: self.current().name().to_string(),
                transition: transition.label(),
            })?;

        self.factory.state_mut(self.current).reset()?;
        debug!(
            owner = %self.owner,
            from = self.current().name(),
            to = self.factory.state(target).name(),
            transition = ?transition,
            "transition"
        );
        self.current = target;
        self.factory.state(target).discard_pending();
        Ok(())
    }

    /// Reset the current state and fall back to the initial one.
    pub(crate) fn reset(&mut self) -> Result<(), StateError> {
        self.factory.state_mut(self.current).reset()?;
        self.current = self.initial;
        self.factory.state(self.initial).discard_pending();
        Ok(())
    }

    /// Select the state named `name` without firing entry or exit.
    ///
    /// The outgoing state is deactivated quietly; the selected one fires
    /// `entry` on its next cycle.
    pub(crate) fn set_current_by_name(&mut self, name: &str) -> Result<(), StateError> {
        let index = self.factory.get(name)?;
        if index != self.current {
            self.factory.state_mut(self.current).deactivate();
            debug!(
                owner = %self.owner,
                from = self.current().name(),
                to = name,
                "current state retargeted"
            );
            self.current = index;
            self.factory.state(index).discard_pending();
        }
        Ok(())
    }

    /// Quietly return to the initial state, recursively.
    pub(crate) fn deactivate(&mut self) {
        self.factory.state_mut(self.current).deactivate();
        self.current = self.initial;
        self.factory.state(self.initial).discard_pending();
    }

    /// Hand this cycle's command to the current state. Delivery ignores the
    /// mailbox policy: the parent's command always replaces a pending one.
    pub(crate) fn deliver(&self, command: Option<Command>) {
        if let Some(command) = command {
            self.factory.state(self.current).deliver_command(command);
        }
    }

    /// Link `scope` into every instance that has none of its own yet.
    pub(crate) fn attach_scope(&mut self, scope: &VariableScope) {
        for state in self.factory.states_mut() {
            state.inherit_scope(scope);
        }
    }

    pub(crate) fn state_named(&self, name: &str) -> Result<&State, StateError> {
        self.factory.get(name).map(|index| self.factory.state(index))
    }

    pub(crate) fn current(&self) -> &State {
        self.factory.state(self.current)
    }

    pub(crate) fn current_mut(&mut self) -> &mut State {
        self.factory.state_mut(self.current)
    }

    pub(crate) fn initial(&self) -> &State {
        self.factory.state(self.initial)
    }

    pub(crate) fn is_at_initial(&self) -> bool {
        self.current == self.initial
    }

    fn target_of(&self, transition: &Transition) -> Option<usize> {
        self.routes
            .iter()
            .rev()
            .find(|(tag, _)| tag.matches(transition))
            .map(|(_, index)| *index)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("owner", &self.owner)
            .field("initial", &self.initial().name())
            .field("current", &self.current().name())
            .field("states", &self.factory.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CommandSet;
    use crate::machine::{Behavior, CycleContext};

    #[derive(Clone, Debug, PartialEq)]
    enum Commands {
        None,
        Enable,
        Disable,
    }

    impl CommandSet for Commands {
        fn none() -> Option<Self> {
            Some(Commands::None)
        }
    }

    #[derive(Debug, PartialEq)]
    enum Transitions {
        Initial,
        Enable,
        Disable,
        Undeclared,
    }

    #[derive(Default)]
    struct Switch {
        entries: usize,
        exits: usize,
    }

    impl Behavior for Switch {
        fn entry(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
            self.entries += 1;
            Ok(())
        }

        fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
            Ok(match cx.get_command::<Commands>()? {
                Commands::Enable => Some(Transition::to(Transitions::Enable)),
                Commands::Disable => Some(Transition::to(Transitions::Disable)),
                Commands::None => None,
            })
        }

        fn exit(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
            self.exits += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Rogue;

    impl Behavior for Rogue {
        fn do_step(&mut self, _cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
            Ok(Some(Transition::to(Transitions::Undeclared)))
        }
    }

    fn table() -> TransitionTable {
        TransitionTable::new()
            .initial(Transitions::Initial, "Disabled", Switch::default)
            .on(Transitions::Enable, "Enabled", Switch::default)
            .on(Transitions::Disable, "Disabled", Switch::default)
    }

    fn context() -> Context {
        Context::new("Root", &table(), &MachineConfig::default()).unwrap()
    }

    fn switch(context: &Context) -> &Switch {
        context.current().behavior::<Switch>().unwrap()
    }

    #[test]
    fn starts_at_initial_state() {
        let context = context();
        assert_eq!(context.current().name(), "Disabled");
        assert!(context.is_at_initial());
    }

    #[test]
    fn table_without_initial_is_rejected() {
        let table = TransitionTable::new().on(Transitions::Enable, "Enabled", Switch::default);
        let err = Context::new("Root", &table, &MachineConfig::default()).unwrap_err();
        assert!(matches!(err, StateError::InvalidConfiguration { .. }));
    }

    #[test]
    fn operate_without_transition_stays() {
        let mut context = context();
        context.operate().unwrap();
        context.operate().unwrap();

        assert_eq!(context.current().name(), "Disabled");
        assert_eq!(switch(&context).entries, 1);
    }

    #[test]
    fn operate_follows_transition_and_resets_old_state() {
        let mut context = context();
        context.operate().unwrap();

        context.deliver(Some(Command::new(Commands::Enable)));
        context.operate().unwrap();

        assert_eq!(context.current().name(), "Enabled");
        let disabled = context.state_named("Disabled").unwrap();
        assert_eq!(disabled.behavior::<Switch>().unwrap().exits, 1);
        assert!(!disabled.is_running());
    }

    #[test]
    fn reset_returns_to_initial() {
        let mut context = context();
        context.operate().unwrap();
        context.deliver(Some(Command::new(Commands::Enable)));
        context.operate().unwrap();
        context.operate().unwrap();

        context.reset().unwrap();
        assert!(context.is_at_initial());
        let enabled = context.state_named("Enabled").unwrap();
        assert_eq!(enabled.behavior::<Switch>().unwrap().exits, 1);
    }

    #[test]
    fn set_current_by_name_skips_callbacks() {
        let mut context = context();
        context.operate().unwrap();

        context.set_current_by_name("Enabled").unwrap();
        assert_eq!(context.current().name(), "Enabled");

        let disabled = context.state_named("Disabled").unwrap();
        assert_eq!(disabled.behavior::<Switch>().unwrap().exits, 0);
        assert!(!disabled.is_running());
        assert_eq!(switch(&context).entries, 0);
    }

    #[test]
    fn set_current_by_unknown_name_fails() {
        let mut context = context();
        let err = context.set_current_by_name("Innerisabled").unwrap_err();
        assert!(matches!(err, StateError::StateNotFound { .. }));
        assert_eq!(context.current().name(), "Disabled");
    }

    #[test]
    fn undeclared_transition_is_reported() {
        let table = TransitionTable::new().initial(Transitions::Initial, "Rogue", Rogue::default);
        let mut context = Context::new("Root", &table, &MachineConfig::default()).unwrap();

        let err = context.operate().unwrap_err();
        match err {
            StateError::UnknownTransition {
                parent,
                state,
                transition,
            } => {
                assert_eq!(parent, "Root");
                assert_eq!(state, "Rogue");
                assert_eq!(transition, "Undeclared");
            }
            other => panic!("Expected UnknownTransition, got {other:?}"),
        }
    }
}
