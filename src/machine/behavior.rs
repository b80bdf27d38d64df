//! State behavior: the lifecycle callbacks a concrete state supplies.

use crate::builder::TransitionTable;
use crate::core::{Command, CommandSet, StateError, Tag, Transition, VariableScope};
use crate::validation::ConfigViolation;
use std::any::{type_name, Any};

/// Downcasting support for boxed behaviors.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Entry/do/exit behavior of a concrete state.
///
/// Every method has a default: an implementor that overrides nothing is a
/// leaf state that never requests a transition. Returning a non-empty
/// [`TransitionTable`] turns the state into a composite with its own inner
/// states.
///
/// # Example
///
/// ```rust
/// use emsm::command_set;
/// use emsm::core::{StateError, Transition};
/// use emsm::machine::{Behavior, CycleContext};
///
/// command_set! {
///     enum Commands { None, Enable }
///     none: None
/// }
///
/// #[derive(Debug, PartialEq)]
/// enum Transitions { Initial, EnableBlink }
///
/// struct Disabled;
///
/// impl Behavior for Disabled {
///     fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
///         if cx.get_command::<Commands>()? == Commands::Enable {
///             return Ok(Some(Transition::to(Transitions::EnableBlink)));
///         }
///         Ok(None)
///     }
/// }
/// ```
pub trait Behavior: AsAny + Send {
    /// Inner states of this state. Empty means leaf.
    fn transition_table(&self) -> TransitionTable {
        TransitionTable::new()
    }

    /// Fired on the first cycle of every activation span, before `do_step`.
    fn entry(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
        Ok(())
    }

    /// Fired exactly once per cycle. A returned transition is handled by
    /// the owning context.
    fn do_step(&mut self, _cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
        Ok(None)
    }

    /// Fired when the owning context switches away from this state.
    fn exit(&mut self, _cx: &CycleContext<'_>) -> Result<(), StateError> {
        Ok(())
    }
}

/// What a behavior can see during one callback: its name, the command
/// delivered for this cycle and the attached variable scope.
#[derive(Debug, Clone, Copy)]
pub struct CycleContext<'a> {
    name: &'a str,
    command: Option<&'a Command>,
    scope: Option<&'a VariableScope>,
}

impl<'a> CycleContext<'a> {
    pub(crate) fn new(
        name: &'a str,
        command: Option<&'a Command>,
        scope: Option<&'a VariableScope>,
    ) -> Self {
        Self {
            name,
            command,
            scope,
        }
    }

    /// Name of the state being run.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Raw command delivered for this cycle.
    pub fn command(&self) -> Option<&'a Command> {
        self.command
    }

    /// Whether this cycle's command belongs to the set `T`.
    pub fn is_command_available<T: Tag>(&self) -> bool {
        self.command
            .is_some_and(|command| command.tag_as::<T>().is_some())
    }

    /// This cycle's command if it belongs to `T`, otherwise `T`'s "none" member.
    ///
    /// Fails with [`StateError::InvalidConfiguration`] if `T` has no "none" member.
    pub fn get_command<T: CommandSet>(&self) -> Result<T, StateError> {
        let none = T::none().ok_or_else(|| StateError::InvalidConfiguration {
            state: self.name.to_string(),
            violations: vec![ConfigViolation::MissingNoneCommand {
                command_set: type_name::<T>(),
            }],
        })?;

        Ok(self
            .command
            .and_then(|command| command.tag_as::<T>())
            .cloned()
            .unwrap_or(none))
    }

    /// Payload of this cycle's command, if present and of type `A`.
    pub fn get_command_args<A: Any>(&self) -> Option<&'a A> {
        self.command.and_then(|command| command.args::<A>())
    }

    /// Type name of this cycle's command payload, if any.
    pub fn command_args_type(&self) -> Option<&'static str> {
        self.command.and_then(Command::args_type)
    }

    /// Clone a variable out of the attached scope.
    pub fn get_var<T: Any + Clone>(&self, name: &str) -> Result<T, StateError> {
        let not_found = || StateError::VarNotFound {
            state: self.name.to_string(),
            name: name.to_string(),
        };

        self.scope
            .ok_or_else(not_found)?
            .get::<T>(name)
            .ok_or_else(not_found)?
            .map_err(|_| StateError::VarTypeMismatch {
                state: self.name.to_string(),
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.scope.is_some_and(|scope| scope.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_set;

    command_set! {
        enum Commands {
            None,
            Enable,
            Disable,
        }
        none: None
    }

    command_set! {
        enum CommandsWithoutNone {
            Enable,
            Disable,
        }
    }

    #[test]
    fn no_command_reads_as_none() {
        let cx = CycleContext::new("Root", None, None);
        assert_eq!(cx.get_command::<Commands>().unwrap(), Commands::None);
        assert!(!cx.is_command_available::<Commands>());
    }

    #[test]
    fn command_of_other_set_reads_as_none() {
        let command = Command::new(CommandsWithoutNone::Disable);
        let cx = CycleContext::new("Root", Some(&command), None);

        assert_eq!(cx.get_command::<Commands>().unwrap(), Commands::None);
        assert!(cx.is_command_available::<CommandsWithoutNone>());
    }

    #[test]
    fn matching_command_is_returned() {
        let command = Command::new(Commands::Enable);
        let cx = CycleContext::new("Root", Some(&command), None);
        assert_eq!(cx.get_command::<Commands>().unwrap(), Commands::Enable);
    }

    #[test]
    fn set_without_none_fails_on_read() {
        let command = Command::new(CommandsWithoutNone::Disable);
        let cx = CycleContext::new("Root", Some(&command), None);

        let err = cx.get_command::<CommandsWithoutNone>().unwrap_err();
        match err {
            StateError::InvalidConfiguration { state, violations } => {
                assert_eq!(state, "Root");
                assert!(matches!(
                    violations.as_slice(),
                    [ConfigViolation::MissingNoneCommand { .. }]
                ));
            }
            other => panic!("Expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn command_args_are_typed() {
        let command = Command::with_args(Commands::Disable, 6_i32);
        let cx = CycleContext::new("Root", Some(&command), None);

        assert_eq!(cx.get_command_args::<i32>(), Some(&6));
        assert!(cx.get_command_args::<String>().is_none());
        assert_eq!(cx.command_args_type(), Some("i32"));
    }

    #[test]
    fn var_lookup_without_scope_fails() {
        let cx = CycleContext::new("Leaf", None, None);
        let err = cx.get_var::<i32>("testVar").unwrap_err();
        assert!(matches!(err, StateError::VarNotFound { .. }));
        assert!(!cx.has_var("testVar"));
    }

    #[test]
    fn var_lookup_reports_type_mismatch() {
        let scope = VariableScope::new();
        scope.insert("testVar", 0x55AA_55AA_i32);
        let cx = CycleContext::new("Leaf", None, Some(&scope));

        assert_eq!(cx.get_var::<i32>("testVar").unwrap(), 0x55AA_55AA);
        assert!(matches!(
            cx.get_var::<u64>("testVar"),
            Err(StateError::VarTypeMismatch { .. })
        ));
        assert!(matches!(
            cx.get_var::<i32>("other"),
            Err(StateError::VarNotFound { .. })
        ));
    }
}
