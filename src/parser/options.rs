//! Parsing options and configuration.

/// Options for parsing flat text.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether image directives naming an unknown id are dropped
    pub drop_stale_images: bool,

    /// Whether figure cell images are copied into the document resources
    pub hydrate_figures: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip undecodable directives).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable strict mode (fail on the first undecodable directive).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Keep image blocks whose id is missing from the side-table.
    pub fn keep_stale_images(mut self) -> Self {
        self.drop_stale_images = false;
        self
    }

    /// Enable or disable figure resource hydration.
    pub fn with_figure_hydration(mut self, hydrate: bool) -> Self {
        self.hydrate_figures = hydrate;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            drop_stale_images: true,
            hydrate_figures: true,
        }
    }
}

/// Error handling mode during parsing and emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    Strict,
    /// Skip the offending directive, record a diagnostic and continue
    #[default]
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .strict()
            .keep_stale_images()
            .with_figure_hydration(false);

        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(!options.drop_stale_images);
        assert!(!options.hydrate_figures);
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(options.drop_stale_images);
        assert!(options.hydrate_figures);
    }
}
