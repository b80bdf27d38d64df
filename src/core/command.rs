//! Commands and the single-slot command mailbox.

use super::transition::Tag;
use serde::{Deserialize, Serialize};
use std::any::{type_name, Any};
use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// A command enumeration that can be read with `get_command`.
///
/// Every command set must declare a member meaning "nothing delivered".
/// The runtime checks for it lazily, on the first `get_command` call, and
/// fails with an invalid-configuration error if [`CommandSet::none`] returns
/// `None`. Use the [`command_set!`](crate::command_set) macro to derive it.
pub trait CommandSet: Tag + Clone {
    /// The "no command" member, if the set declares one.
    fn none() -> Option<Self>;
}

/// Immutable command value: a tag plus an optional payload.
///
/// # Example
///
/// ```rust
/// use emsm::core::Command;
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Commands {
///     None,
///     Blink,
/// }
///
/// let command = Command::with_args(Commands::Blink, 250_u32);
/// assert_eq!(command.tag_as::<Commands>(), Some(&Commands::Blink));
/// assert_eq!(command.args::<u32>(), Some(&250));
/// assert!(command.args::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct Command {
    tag: Arc<dyn Tag>,
    args: Option<Arc<dyn Any + Send + Sync>>,
    args_type: Option<&'static str>,
}

impl Command {
    /// A command without payload.
    pub fn new<T: Tag>(tag: T) -> Self {
        Self {
            tag: Arc::new(tag),
            args: None,
            args_type: None,
        }
    }

    /// A command carrying a typed payload.
    pub fn with_args<T: Tag, A: Any + Send + Sync>(tag: T, args: A) -> Self {
        Self {
            tag: Arc::new(tag),
            args: Some(Arc::new(args)),
            args_type: Some(type_name::<A>()),
        }
    }

    pub fn tag(&self) -> &dyn Tag {
        self.tag.as_ref()
    }

    /// The tag, if it belongs to the enumeration `T`.
    pub fn tag_as<T: Tag>(&self) -> Option<&T> {
        Tag::as_any(self.tag.as_ref()).downcast_ref::<T>()
    }

    /// The payload, if present and of type `A`.
    pub fn args<A: Any>(&self) -> Option<&A> {
        self.args.as_ref()?.downcast_ref::<A>()
    }

    /// Type name of the payload, if any.
    pub fn args_type(&self) -> Option<&'static str> {
        self.args_type
    }
}

impl<T: CommandSet> From<T> for Command {
    fn from(tag: T) -> Self {
        Command::new(tag)
    }
}

impl Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("tag", &self.tag)
            .field("args_type", &self.args_type)
            .finish()
    }
}

/// What a mailbox does when a command arrives while another one is pending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailboxPolicy {
    /// Keep the pending command, drop the new one.
    #[default]
    KeepPending,
    /// Replace the pending command with the new one.
    ReplacePending,
}

/// Single-slot holding area for a command awaiting delivery.
#[derive(Debug)]
pub(crate) struct Mailbox {
    slot: Mutex<Option<Command>>,
    policy: MailboxPolicy,
}

impl Mailbox {
    pub(crate) fn new(policy: MailboxPolicy) -> Self {
        Self {
            slot: Mutex::new(None),
            policy,
        }
    }

    /// Offer a command. Returns `false` if it was dropped.
    pub(crate) fn post(&self, command: Command) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match (&*slot, self.policy) {
            (Some(pending), MailboxPolicy::KeepPending) => {
                debug!(pending = ?pending.tag, dropped = ?command.tag, "mailbox occupied, command dropped");
                false
            }
            _ => {
                *slot = Some(command);
                true
            }
        }
    }

    /// Store a command regardless of policy, discarding any pending one.
    pub(crate) fn replace(&self, command: Command) -> Option<Command> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(command)
    }

    /// Remove the pending command, leaving the slot empty.
    pub(crate) fn take(&self) -> Option<Command> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Cloneable handle for injecting commands from another thread.
///
/// Obtained from [`State::injector`](crate::machine::State::injector); it
/// shares the state's mailbox, so the same delivery policy applies.
#[derive(Clone, Debug)]
pub struct CommandInjector {
    mailbox: Arc<Mailbox>,
}

impl CommandInjector {
    pub(crate) fn new(mailbox: Arc<Mailbox>) -> Self {
        Self { mailbox }
    }

    /// Inject a command. Returns `false` if the mailbox dropped it.
    pub fn inject(&self, command: impl Into<Command>) -> bool {
        self.mailbox.post(command.into())
    }

    /// Inject a command carrying a payload.
    pub fn inject_with_args<T: Tag, A: Any + Send + Sync>(&self, tag: T, args: A) -> bool {
        self.mailbox.post(Command::with_args(tag, args))
    }

    /// Whether a command is waiting for the next cycle.
    pub fn is_pending(&self) -> bool {
        !self.mailbox.is_empty()
    }
}
