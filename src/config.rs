//! Machine configuration.

use serde::{Deserialize, Serialize};

fn default_name() -> String {
    "fsm".to_string()
}

fn default_history_capacity() -> usize {
    64
}

/// Settings applied when a machine is created.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```rust
/// use trigger_fsm::MachineConfig;
///
/// let config = MachineConfig::from_json(r#"{ "name": "tictoc" }"#).unwrap();
/// assert_eq!(config.name, "tictoc");
/// assert_eq!(config.history_capacity, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Name used in log events and as the default worker thread name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Number of committed transitions kept in the history. 0 disables it.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Worker thread name. Derived from `name` when unset.
    #[serde(default)]
    pub worker_thread_name: Option<String>,
}

impl MachineConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub(crate) fn thread_name(&self) -> String {
        self.worker_thread_name
            .clone()
            .unwrap_or_else(|| format!("{}-worker", self.name))
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            history_capacity: default_history_capacity(),
            worker_thread_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = MachineConfig::from_json("{}").unwrap();
        assert_eq!(config, MachineConfig::default());
    }

    #[test]
    fn thread_name_derives_from_machine_name() {
        let config = MachineConfig::named("door");
        assert_eq!(config.thread_name(), "door-worker");

        let config = MachineConfig {
            worker_thread_name: Some("custom".into()),
            ..config
        };
        assert_eq!(config.thread_name(), "custom");
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(MachineConfig::from_json(r#"{ "history_capacity": "many" }"#).is_err());
    }
}
