mod arguments;
mod template_id;
mod value;

pub use arguments::Arguments;
pub use template_id::{FILTER_SEPARATOR, TemplateId, VARIANT_SEPARATOR};
pub use value::Value;
