//! CLI command implementations.

mod check;
mod list;
mod render;

pub use check::{run_check, CheckArgs};
pub use list::{run_list, ListArgs};
pub use render::{run_render, RenderArgs};

use std::path::Path;

use miette::{miette, Result};
use tmo::{JsonFile, TemplateRegistry, TemplateSource};

/// Load a JSON template file into a registry.
pub(crate) fn load_registry(path: &Path) -> Result<TemplateRegistry> {
    let mapping = JsonFile::new(path)
        .load()
        .map_err(|e| miette!("Failed to load templates: {}", e))?;
    TemplateRegistry::from_mapping(mapping)
        .map_err(|e| miette!("Failed to register templates from {}: {}", path.display(), e))
}
