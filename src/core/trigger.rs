//! Triggers: the events fed into a machine.

use super::id::TriggerId;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque payload carried by a trigger.
pub type Attachment = Arc<dyn Any + Send + Sync>;

/// An event submitted to a machine.
///
/// A trigger is immutable once built. Cloning is cheap: the attachment is
/// shared, not copied.
///
/// # Example
///
/// ```rust
/// use trigger_fsm::core::{Trigger, TriggerId};
///
/// let tick = Trigger::with_attachment(TriggerId::new(1), 250u64);
/// assert_eq!(tick.id(), TriggerId::new(1));
/// assert_eq!(tick.attachment::<u64>(), Some(&250));
/// assert!(tick.attachment::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct Trigger {
    id: TriggerId,
    attachment: Option<Attachment>,
}

impl Trigger {
    pub fn new(id: impl Into<TriggerId>) -> Self {
        Self {
            id: id.into(),
            attachment: None,
        }
    }

    /// Build a trigger carrying `value` as its attachment.
    pub fn with_attachment<T>(id: impl Into<TriggerId>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            id: id.into(),
            attachment: Some(Arc::new(value)),
        }
    }

    /// Build a trigger from an already shared attachment.
    pub fn with_shared(id: impl Into<TriggerId>, attachment: Attachment) -> Self {
        Self {
            id: id.into(),
            attachment: Some(attachment),
        }
    }

    pub fn id(&self) -> TriggerId {
        self.id
    }

    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }

    /// Borrow the attachment as `T`, if present and of that type.
    pub fn attachment<T: Any>(&self) -> Option<&T> {
        self.attachment.as_deref()?.downcast_ref::<T>()
    }

    pub fn raw_attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("id", &self.id)
            .field("has_attachment", &self.attachment.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_trigger_has_no_attachment() {
        let trigger = Trigger::new(10u64);
        assert_eq!(trigger.id(), TriggerId::new(10));
        assert!(!trigger.has_attachment());
        assert!(trigger.attachment::<u32>().is_none());
    }

    #[test]
    fn clones_share_the_attachment() {
        let trigger = Trigger::with_attachment(TriggerId::new(1), String::from("payload"));
        let cloned = trigger.clone();

        let a = trigger.raw_attachment().unwrap();
        let b = cloned.raw_attachment().unwrap();
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(cloned.attachment::<String>().map(String::as_str), Some("payload"));
    }

    #[test]
    fn debug_output_hides_the_payload() {
        let trigger = Trigger::with_attachment(TriggerId::new(2), 5u8);
        let rendered = format!("{trigger:?}");
        assert!(rendered.contains("has_attachment: true"));
    }
}
