//! Rendering options and configuration.

use super::CleanupOptions;
use crate::parser::ErrorMode;

/// Options for emitting LaTeX.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Wrap the body in a document class, packages and theorem definitions
    pub include_preamble: bool,

    /// Prefix for image paths in output (e.g., "images/")
    pub image_path_prefix: String,

    /// Width of standalone images, as a fraction of `\linewidth`
    pub image_width: f64,

    /// Upper bound for subfigure widths, as a fraction of `\textwidth`
    pub figure_width_cap: f64,

    /// Float placement specifier for figure and table environments
    pub float_placement: String,

    /// Escape `&`, `%`, `#` and `_` in plain text
    pub escape_special_chars: bool,

    /// What to do with undecodable code and image payloads
    pub error_mode: ErrorMode,

    /// Name of the bibliography database (without `.bib`)
    pub bibliography_name: String,

    /// Bibliography style
    pub bibliography_style: String,

    /// Text cleanup options
    pub cleanup: Option<CleanupOptions>,

    /// Collect emission statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the preamble and postamble.
    pub fn with_preamble(mut self, include: bool) -> Self {
        self.include_preamble = include;
        self
    }

    /// Emit only the document body.
    pub fn body_only(mut self) -> Self {
        self.include_preamble = false;
        self
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Set the standalone image width.
    pub fn with_image_width(mut self, width: f64) -> Self {
        self.image_width = width.clamp(0.05, 1.0);
        self
    }

    /// Set the subfigure width cap.
    pub fn with_figure_width_cap(mut self, cap: f64) -> Self {
        self.figure_width_cap = cap.clamp(0.05, 1.0);
        self
    }

    /// Set the float placement specifier.
    pub fn with_float_placement(mut self, placement: impl Into<String>) -> Self {
        self.float_placement = placement.into();
        self
    }

    /// Enable or disable special character escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Set the bibliography database name.
    pub fn with_bibliography(mut self, name: impl Into<String>) -> Self {
        self.bibliography_name = name.into();
        self
    }

    /// Set the bibliography style.
    pub fn with_bibliography_style(mut self, style: impl Into<String>) -> Self {
        self.bibliography_style = style.into();
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: super::CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_preamble: true,
            image_path_prefix: "images/".to_string(),
            image_width: 0.8,
            figure_width_cap: 0.95,
            float_placement: "h".to_string(),
            escape_special_chars: true,
            error_mode: ErrorMode::Lenient,
            bibliography_name: "references".to_string(),
            bibliography_style: "plain".to_string(),
            cleanup: None,
            collect_stats: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .body_only()
            .with_image_prefix("fig/")
            .with_figure_width_cap(3.0)
            .with_bibliography("refs");

        assert!(!options.include_preamble);
        assert_eq!(options.image_path_prefix, "fig/");
        assert_eq!(options.figure_width_cap, 1.0);
        assert_eq!(options.bibliography_name, "refs");
    }

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert!(options.include_preamble);
        assert!(options.escape_special_chars);
        assert_eq!(options.image_path_prefix, "images/");
        assert_eq!(options.figure_width_cap, 0.95);
        assert_eq!(options.error_mode, ErrorMode::Lenient);
    }
}
