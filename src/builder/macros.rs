//! Macros for ergonomic command-set declaration.

/// Declare a command enumeration and its [`CommandSet`](crate::core::CommandSet)
/// implementation.
///
/// The `none:` clause names the member meaning "nothing delivered". Leaving it
/// out declares a set without one; reading such a set with `get_command`
/// fails with an invalid-configuration error.
///
/// # Example
///
/// ```
/// use emsm::command_set;
/// use emsm::core::CommandSet;
///
/// command_set! {
///     pub enum BlinkyCommands {
///         None,
///         Enable,
///         Disable,
///     }
///     none: None
/// }
///
/// assert_eq!(BlinkyCommands::none(), Some(BlinkyCommands::None));
/// ```
#[macro_export]
macro_rules! command_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(none: $none:ident)?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::CommandSet for $name {
            #[allow(unreachable_code)]
            fn none() -> ::core::option::Option<Self> {
                $(return ::core::option::Option::Some(Self::$none);)?
                ::core::option::Option::None
            }
        }
    };
}
