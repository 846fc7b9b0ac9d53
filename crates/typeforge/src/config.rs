//! Registry configuration

/// Container used when a type is opened without an explicit container name
pub const DEFAULT_CONTAINER: &str = "DynamicAssembly";

/// Prefix of generated backing slot names
pub const DEFAULT_SLOT_PREFIX: &str = "_";

/// Options for creating a [`crate::ClassRegistry`]
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    /// Container used when none is specified
    pub default_container: String,

    /// Prefix prepended to the lower-camel-cased property name to form the
    /// backing slot name
    pub backing_slot_prefix: String,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            default_container: DEFAULT_CONTAINER.to_string(),
            backing_slot_prefix: DEFAULT_SLOT_PREFIX.to_string(),
        }
    }
}

impl SynthesisOptions {
    /// Override the default container name
    pub fn with_default_container(mut self, name: impl Into<String>) -> Self {
        self.default_container = name.into();
        self
    }

    /// Override the backing slot prefix
    pub fn with_backing_slot_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.backing_slot_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SynthesisOptions::default();
        assert_eq!(options.default_container, "DynamicAssembly");
        assert_eq!(options.backing_slot_prefix, "_");
    }

    #[test]
    fn test_overrides() {
        let options = SynthesisOptions::default()
            .with_default_container("Generated")
            .with_backing_slot_prefix("m_");
        assert_eq!(options.default_container, "Generated");
        assert_eq!(options.backing_slot_prefix, "m_");
    }
}
