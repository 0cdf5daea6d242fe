//! Macros for declaring event types.

/// Generate an event enum together with its [`Event`](crate::core::Event)
/// implementation.
///
/// Each variant's dispatch tag is its own name.
///
/// # Example
///
/// ```
/// use statecraft::events;
/// use statecraft::core::Event;
///
/// events! {
///     pub enum PlayerEvent {
///         Play,
///         Pause,
///         Stop,
///     }
/// }
///
/// assert_eq!(PlayerEvent::Pause.name(), "Pause");
/// ```
#[macro_export]
macro_rules! events {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Event for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
