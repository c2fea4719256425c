//! Configuration for the layout engine and its host tree

use serde::Deserialize;

/// What an engine does when an assertion references a view that is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Skip the assertion, record a diagnostic, keep resolving
    #[default]
    Skip,
    /// Abort the pass with the error
    Abort,
}

/// Configuration options for layout passes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Run the passes of subviews after a container's own pass
    pub recursive: bool,

    /// Deepest nesting level a recursive layout may reach
    pub max_depth: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: 64,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether subviews are laid out after their container
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the nesting limit for recursive layout
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert!(config.recursive);
        assert_eq!(config.max_depth, 64);
        assert_eq!(DanglingPolicy::default(), DanglingPolicy::Skip);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new()
            .with_recursive(false)
            .with_max_depth(3);

        assert!(!config.recursive);
        assert_eq!(config.max_depth, 3);
    }

    #[test]
    fn test_deserialize_partial_table() {
        let config: LayoutConfig = toml::from_str("max_depth = 8").unwrap();
        assert_eq!(config, LayoutConfig::new().with_max_depth(8));
    }
}
