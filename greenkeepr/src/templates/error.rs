//! Template rendering error types.

/// Template rendering error.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Handlebars rendering error, including unknown variables.
    #[error("Template rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),
}
