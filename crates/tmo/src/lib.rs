pub mod interpreter;
pub mod parser;
pub mod types;

pub use interpreter::{
    Engine, EvalContext, FieldError, FilterError, FilterRegistry, FormatError, GetTextOptions,
    JsonFile, JsonStr, LoadError, TemplateRegistry, TemplateSource, TemplateWarning,
    compute_suggestions,
};
pub use parser::ParseError;
pub use types::{Arguments, TemplateId, Value};

/// Creates an [`Arguments`] set of named values from key-value pairs.
///
/// Values are converted via `Into<Value>`, so integers, floats, strings and
/// vectors of those can be passed directly.
///
/// # Example
///
/// ```
/// use tmo::{args, Value};
///
/// let a = args! { "count" => 3, "color" => vec!["red", "blue"] };
/// assert_eq!(a.get("count"), Some(&Value::Number(3)));
/// assert_eq!(a.get("color").and_then(Value::list_len), Some(2));
/// ```
#[macro_export]
macro_rules! args {
    {} => {
        $crate::Arguments::new()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut args = $crate::Arguments::new();
            $(
                args.insert($key, ::std::convert::Into::<$crate::Value>::into($value));
            )+
            args
        }
    };
}
