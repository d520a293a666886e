//! Macros for declaring state and trigger ids.

/// Declare an enum of state or trigger ids.
///
/// The enum converts into the chosen id type (`StateId` or `TriggerId`),
/// converts back with `TryFrom`, and gets a `name()` returning the variant
/// name. Discriminants follow declaration order starting at 0, or can be
/// given explicitly.
///
/// # Example
///
/// ```
/// use trigger_fsm::core::{StateId, TriggerId};
/// use trigger_fsm::fsm_ids;
///
/// fsm_ids! {
///     pub enum Light: StateId {
///         Red,
///         Green,
///         Yellow,
///     }
/// }
///
/// fsm_ids! {
///     pub enum Signal: TriggerId {
///         Timer = 100,
///         Emergency = 200,
///     }
/// }
///
/// assert_eq!(StateId::from(Light::Green), StateId::new(1));
/// assert_eq!(TriggerId::from(Signal::Emergency), TriggerId::new(200));
/// assert_eq!(Light::try_from(StateId::new(2)), Ok(Light::Yellow));
/// assert_eq!(Light::Red.name(), "Red");
/// ```
#[macro_export]
macro_rules! fsm_ids {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $id:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $value:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        #[repr(u64)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $(= $value)?
            ),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }

        impl ::core::convert::From<$name> for $crate::core::$id {
            fn from(value: $name) -> Self {
                $crate::core::$id::new(value as u64)
            }
        }

        impl ::core::convert::TryFrom<$crate::core::$id> for $name {
            type Error = $crate::core::$id;

            fn try_from(id: $crate::core::$id) -> ::core::result::Result<Self, Self::Error> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|variant| *variant as u64 == id.raw())
                    .ok_or(id)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{StateId, TriggerId};

    fsm_ids! {
        enum TestState: StateId {
            Initial,
            Processing,
            Complete,
        }
    }

    fsm_ids! {
        enum TestTrigger: TriggerId {
            Go = 10,
            Stop = 20,
        }
    }

    #[test]
    fn implicit_discriminants_follow_declaration_order() {
        assert_eq!(StateId::from(TestState::Initial), StateId::new(0));
        assert_eq!(StateId::from(TestState::Complete), StateId::new(2));
    }

    #[test]
    fn explicit_discriminants_are_kept() {
        assert_eq!(TriggerId::from(TestTrigger::Go), TriggerId::new(10));
        assert_eq!(TriggerId::from(TestTrigger::Stop), TriggerId::new(20));
    }

    #[test]
    fn try_from_round_trips_known_ids() {
        assert_eq!(
            TestState::try_from(StateId::new(1)),
            Ok(TestState::Processing)
        );
        assert_eq!(
            TestState::try_from(StateId::UNDEFINED),
            Err(StateId::UNDEFINED)
        );
    }

    #[test]
    fn names_match_variants() {
        let names: Vec<_> = TestState::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Initial", "Processing", "Complete"]);
    }

    #[test]
    fn fsm_ids_supports_visibility() {
        fsm_ids! {
            pub enum PublicState: StateId {
                A,
                B,
            }
        }

        assert_eq!(PublicState::B.name(), "B");
    }
}
