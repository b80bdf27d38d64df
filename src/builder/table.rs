//! Transition tables: one level of a state hierarchy.

use crate::core::{Tag, Transition};
use crate::machine::Behavior;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// Zero-argument constructor producing a fresh state behavior.
pub type StateConstructor = Arc<dyn Fn() -> Box<dyn Behavior> + Send + Sync>;

/// One `tag -> (target type, target name)` row of a transition table.
#[derive(Clone)]
pub struct TransitionEntry {
    transition: Transition,
    state_name: String,
    state_type: &'static str,
    constructor: StateConstructor,
    initial: bool,
}

impl TransitionEntry {
    /// Create an entry whose target is built by `constructor`.
    pub fn new<T, B, F>(tag: T, state_name: impl Into<String>, constructor: F) -> Self
    where
        T: Tag,
        B: Behavior,
        F: Fn() -> B + Send + Sync + 'static,
    {
        Self {
            transition: Transition::to(tag),
            state_name: state_name.into(),
            state_type: type_name::<B>(),
            constructor: Arc::new(move || Box::new(constructor()) as Box<dyn Behavior>),
            initial: false,
        }
    }

    /// Mark this entry as the one selected when the context is (re)set.
    pub fn as_initial(mut self) -> Self {
        self.initial = true;
        self
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    pub fn state_name(&self) -> &str {
        &self.state_name
    }

    /// Type name of the behavior the constructor produces.
    pub fn state_type(&self) -> &'static str {
        self.state_type
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub(crate) fn instantiate(&self) -> Box<dyn Behavior> {
        (self.constructor)()
    }
}

impl fmt::Debug for TransitionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEntry")
            .field("transition", &self.transition)
            .field("state_name", &self.state_name)
            .field("state_type", &self.state_type)
            .field("initial", &self.initial)
            .finish()
    }
}

/// Ordered list of transition entries, built with a fluent API.
///
/// The initial entry is marked explicitly and may appear anywhere in the list.
///
/// # Example
///
/// ```rust
/// use emsm::builder::TransitionTable;
/// use emsm::machine::Behavior;
///
/// #[derive(Debug, PartialEq)]
/// enum Transitions {
///     Initial,
///     EnableBlink,
///     DisableBlink,
/// }
///
/// #[derive(Default)]
/// struct Disabled;
/// impl Behavior for Disabled {}
///
/// #[derive(Default)]
/// struct Enabled;
/// impl Behavior for Enabled {}
///
/// let table = TransitionTable::new()
///     .initial(Transitions::Initial, "Disabled", Disabled::default)
///     .on(Transitions::EnableBlink, "Enabled", Enabled::default)
///     .on(Transitions::DisableBlink, "Disabled", Disabled::default);
///
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.initial_entry().unwrap().state_name(), "Disabled");
/// ```
#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
    entries: Vec<TransitionEntry>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add the initial entry.
    pub fn initial<T, B, F>(self, tag: T, state_name: impl Into<String>, constructor: F) -> Self
    where
        T: Tag,
        B: Behavior,
        F: Fn() -> B + Send + Sync + 'static,
    {
        self.entry(TransitionEntry::new(tag, state_name, constructor).as_initial())
    }

    /// Add a regular entry.
    pub fn on<T, B, F>(self, tag: T, state_name: impl Into<String>, constructor: F) -> Self
    where
        T: Tag,
        B: Behavior,
        F: Fn() -> B + Send + Sync + 'static,
    {
        self.entry(TransitionEntry::new(tag, state_name, constructor))
    }

    /// Add a pre-built entry.
    pub fn entry(mut self, entry: TransitionEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn entries(&self) -> &[TransitionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry marked as initial.
    pub fn initial_entry(&self) -> Option<&TransitionEntry> {
        self.entries.iter().find(|entry| entry.is_initial())
    }
}
