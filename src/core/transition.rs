//! Type-erased transition tags.
//!
//! Every level of a hierarchy is free to use its own tag enumeration. The
//! runtime only needs to compare tags for equality and print them, so tags
//! are stored behind the object-safe [`Tag`] trait.

use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// An opaque, comparable tag value.
///
/// Implemented automatically for every `'static` type that is `Debug`,
/// `PartialEq`, `Send` and `Sync`, which covers plain fieldless enums.
pub trait Tag: Any + Debug + Send + Sync {
    /// Borrow the tag as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Compare against another tag. Tags of different types are never equal.
    fn eq_tag(&self, other: &dyn Tag) -> bool;
}

impl<T> Tag for T
where
    T: Any + Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_tag(&self, other: &dyn Tag) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

/// A request, returned from a state's step, naming which sibling becomes active.
///
/// # Example
///
/// ```rust
/// use emsm::core::Transition;
///
/// #[derive(Debug, PartialEq)]
/// enum Transitions {
///     Initial,
///     EnableBlink,
/// }
///
/// let transition = Transition::to(Transitions::EnableBlink);
/// assert!(transition.is(&Transitions::EnableBlink));
/// assert!(!transition.is(&Transitions::Initial));
/// ```
#[derive(Clone)]
pub struct Transition {
    tag: Arc<dyn Tag>,
}

impl Transition {
    /// Create a transition request for `tag`.
    pub fn to<T: Tag>(tag: T) -> Self {
        Self { tag: Arc::new(tag) }
    }

    /// The underlying tag.
    pub fn tag(&self) -> &dyn Tag {
        self.tag.as_ref()
    }

    /// Downcast the tag to its concrete enumeration.
    pub fn tag_as<T: Tag>(&self) -> Option<&T> {
        Tag::as_any(self.tag.as_ref()).downcast_ref::<T>()
    }

    /// Check whether this transition carries exactly `tag`.
    pub fn is<T: Tag>(&self, tag: &T) -> bool {
        tag.eq_tag(self.tag.as_ref())
    }

    /// Tag equality across transitions.
    pub fn matches(&self, other: &Transition) -> bool {
        self.tag.as_ref().eq_tag(other.tag.as_ref())
    }

    /// Printable form of the tag, used in errors and logs.
    pub fn label(&self) -> String {
        format!("{:?}", self.tag)
    }
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transition").field(&self.tag).finish()
    }
}
