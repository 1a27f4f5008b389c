//! Rendering module: flat-text serialization, LaTeX emission and JSON.

mod cleanup;
mod figure;
mod flat;
mod grid;
mod json;
mod latex;
mod options;
mod preamble;
mod references;
mod result;
mod table;

pub use cleanup::{strip_zero_width, CleanupOptions, CleanupPipeline, CleanupPreset};
pub use figure::{figure_image_ids, FigureCell, FigureLayout};
pub use flat::{inline_to_flat_text, to_flat_text, FlatTextSerializer};
pub use grid::CellSpec;
pub use json::{from_json, to_json, JsonFormat};
pub use latex::{document_to_latex, escape_latex, to_latex, to_latex_with_images, LatexRenderer};
pub use options::RenderOptions;
pub use references::{RefKind, ReferenceIndex};
pub use result::{EmitStats, RenderResult};
pub use table::{render_table, RowRule, Slot, TableLayout};
