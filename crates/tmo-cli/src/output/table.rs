//! Table formatting utilities for CLI output.

use comfy_table::{presets, ContentArrangement, Table};
use serde::Serialize;

/// One template as shown by `tmo list`.
#[derive(Debug, Serialize)]
pub struct TemplateRow {
    /// Full template id.
    pub id: String,
    /// Id without the variant suffix.
    pub base: String,
    /// Variant suffix, if any.
    pub variant: Option<String>,
    /// Number of fields, including fields nested in format specs.
    /// `None` when the template does not parse.
    pub fields: Option<usize>,
}

/// Format template rows as a table.
pub fn format_template_table(rows: &[TemplateRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Base", "Variant", "Fields"]);

    for row in rows {
        table.add_row(vec![
            row.id.clone(),
            row.base.clone(),
            row.variant.clone().unwrap_or_else(|| "-".to_string()),
            row.fields
                .map_or_else(|| "syntax error".to_string(), |count| count.to_string()),
        ]);
    }

    table
}
