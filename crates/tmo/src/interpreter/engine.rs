//! The engine value and the public formatting call.
//!
//! An [`Engine`] owns the template set and the filter registry. It is built
//! once by the caller and shared by reference; every formatting call keeps
//! its state in a fresh [`EvalContext`], so a populated engine can serve any
//! number of threads.

use bon::Builder;
use tracing::debug;

use crate::interpreter::context::DEFAULT_MAX_DEPTH;
use crate::interpreter::evaluator::format_template;
use crate::interpreter::filters::{DEFAULT_CONNECTOR, DEFAULT_SEPARATOR, FilterRegistry};
use crate::interpreter::lint::{TemplateWarning, validate_templates};
use crate::interpreter::plural::select_template_id;
use crate::interpreter::registry::TemplateRegistry;
use crate::interpreter::source::TemplateSource;
use crate::interpreter::{EvalContext, FormatError, LoadError};
use crate::types::{Arguments, TemplateId};

/// Templated message formatter.
///
/// # Example
///
/// ```
/// use tmo::{Engine, GetTextOptions, TemplateRegistry, args};
///
/// let templates = TemplateRegistry::from_mapping([
///     ("fav_color", "My favourite color is {color}."),
///     ("fav_color#colors", "My favourite colors are {color}."),
/// ])
/// .unwrap();
/// let engine = Engine::builder()
///     .templates(templates)
///     .filters(tmo::FilterRegistry::builtin())
///     .build();
///
/// let text = engine
///     .gettext("fav_color", &GetTextOptions::default(), &args! { "color" => vec!["red", "blue", "green"] })
///     .unwrap();
/// assert_eq!(text, "My favourite colors are red, blue and green.");
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct Engine {
    /// Templates available to [`Engine::gettext`].
    templates: Option<TemplateRegistry>,

    /// Filters available to every field.
    filters: Option<FilterRegistry>,

    /// Bound on fields nested inside format specs.
    #[builder(default = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Connector word of the implicit join.
    #[builder(default = DEFAULT_CONNECTOR.to_string())]
    connector_word: String,

    /// Separator of the implicit join.
    #[builder(default = DEFAULT_SEPARATOR.to_string())]
    separator_char: String,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with the built-in filters and no templates.
    pub fn new() -> Self {
        Engine::builder().filters(FilterRegistry::builtin()).build()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// The loaded templates, if any.
    pub fn templates(&self) -> Option<&TemplateRegistry> {
        self.templates.as_ref()
    }

    /// Mutable access to the templates, creating an empty set if none exists.
    pub fn templates_mut(&mut self) -> &mut TemplateRegistry {
        self.templates.get_or_insert_with(TemplateRegistry::new)
    }

    /// The filter registry, if configured.
    pub fn filters(&self) -> Option<&FilterRegistry> {
        self.filters.as_ref()
    }

    /// Mutable access to the filters, creating an empty registry if none
    /// exists.
    pub fn filters_mut(&mut self) -> &mut FilterRegistry {
        self.filters.get_or_insert_with(FilterRegistry::new)
    }

    /// Bound on fields nested inside format specs.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Connector word of the implicit join.
    pub fn connector_word(&self) -> &str {
        &self.connector_word
    }

    /// Separator of the implicit join.
    pub fn separator_char(&self) -> &str {
        &self.separator_char
    }

    /// Load templates from a source.
    ///
    /// Loading **replaces** the whole template set. On error the previous set
    /// is kept unchanged. Returns the number of templates loaded.
    ///
    /// # Example
    ///
    /// ```
    /// use tmo::{Engine, JsonStr};
    ///
    /// let mut engine = Engine::new();
    /// let count = engine
    ///     .load_templates(&JsonStr::new(r#"{"hello": "Hello, {name}!"}"#))
    ///     .unwrap();
    /// assert_eq!(count, 1);
    /// ```
    pub fn load_templates(&mut self, source: &impl TemplateSource) -> Result<usize, LoadError> {
        let registry = TemplateRegistry::from_mapping(source.load()?)?;
        let count = registry.len();
        self.templates = Some(registry);
        debug!(count, "loaded templates");
        Ok(count)
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    /// Format the template registered under `id` with the given arguments.
    ///
    /// The plural variant is chosen from the shape of the named arguments;
    /// if it is not registered, the base template is used.
    ///
    /// # Errors
    ///
    /// Fails with [`FormatError::TemplatesNotInitialized`] or
    /// [`FormatError::FormatterNotConfigured`] before any lookup when the
    /// engine lacks templates or filters, with
    /// [`FormatError::TemplateNotFound`] when neither the selected id nor its
    /// base is registered, and with any formatting error of the template.
    pub fn gettext(
        &self,
        id: &str,
        options: &GetTextOptions,
        args: &Arguments,
    ) -> Result<String, FormatError> {
        let templates = self
            .templates
            .as_ref()
            .ok_or(FormatError::TemplatesNotInitialized)?;
        let filters = self
            .filters
            .as_ref()
            .ok_or(FormatError::FormatterNotConfigured)?;

        let candidate = select_template_id(&TemplateId::new(id), args);
        let (selected, raw) = templates.resolve(candidate.as_str())?;
        debug!(requested = id, candidate = %candidate, selected = %selected, "selected template");

        self.render(raw, filters, options, args)
    }

    /// Format a raw template without registry lookup.
    pub fn format(
        &self,
        template: &str,
        options: &GetTextOptions,
        args: &Arguments,
    ) -> Result<String, FormatError> {
        let filters = self
            .filters
            .as_ref()
            .ok_or(FormatError::FormatterNotConfigured)?;
        self.render(template, filters, options, args)
    }

    /// Run the static checks over every loaded template.
    ///
    /// Without templates there is nothing to check; without filters every
    /// named filter is reported as unknown.
    pub fn validate(&self) -> Vec<TemplateWarning> {
        let Some(templates) = &self.templates else {
            return Vec::new();
        };
        let empty = FilterRegistry::new();
        validate_templates(templates, self.filters.as_ref().unwrap_or(&empty))
    }

    fn render(
        &self,
        template: &str,
        filters: &FilterRegistry,
        options: &GetTextOptions,
        args: &Arguments,
    ) -> Result<String, FormatError> {
        let mut ctx = EvalContext::with_max_depth(args, self.max_depth).with_join_defaults(
            options.connector_word.as_deref().unwrap_or(&self.connector_word),
            options.separator_char.as_deref().unwrap_or(&self.separator_char),
        );
        format_template(template, &mut ctx, filters)
    }
}

/// Per-call overrides of the implicit join.
///
/// Explicit `@join(...)` arguments in a template take precedence over these.
///
/// ```
/// use tmo::GetTextOptions;
///
/// let options = GetTextOptions::builder().connector_word(" or ").build();
/// assert_eq!(options.connector_word.as_deref(), Some(" or "));
/// assert_eq!(options.separator_char, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct GetTextOptions {
    /// Replaces the engine's connector word.
    pub connector_word: Option<String>,
    /// Replaces the engine's separator.
    pub separator_char: Option<String>,
}
