//! Template renderer.

use super::TemplateError;
use crate::config::LanguageSettings;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde::Serialize;

/// Placeholder of the marker block in body templates.
const MARKER_PLACEHOLDER: &str = "marker";

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    // Disable HTML escaping for markdown output
    hbs.register_escape_fn(no_escape);

    // Enable strict mode to catch missing variables
    hbs.set_strict_mode(true);

    hbs.register_helper("eq", Box::new(eq_helper));

    hbs
}

/// Helper function for equality comparison in templates.
///
/// Usage: `{{#if (eq language "ruby")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// Variables available to title, body and commit message templates.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateContext<'a> {
    /// Language name, e.g. "ruby".
    pub language: &'a str,

    /// Module path as configured.
    pub path: &'a str,

    /// Updated dependency names.
    pub dependencies: &'a [String],

    /// Rendered marker block.
    pub marker: &'a str,

    /// Repository full name.
    pub repository: &'a str,
}

/// Renders the configured pull request texts.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders the pull request title.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_pr_title(
        &self,
        settings: &LanguageSettings,
        context: &UpdateContext<'_>,
    ) -> Result<String, TemplateError> {
        Ok(self
            .handlebars
            .render_template(&settings.pr_title_format, context)?
            .trim()
            .to_string())
    }

    /// Renders the pull request body.
    ///
    /// The marker block is appended if the template does not place it.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_pr_body(
        &self,
        settings: &LanguageSettings,
        context: &UpdateContext<'_>,
    ) -> Result<String, TemplateError> {
        let mut body = self
            .handlebars
            .render_template(&settings.pr_body_format, context)?;

        if !settings.pr_body_format.contains(MARKER_PLACEHOLDER) || !body.contains(context.marker) {
            if !body.is_empty() && !body.ends_with('\n') {
                body.push('\n');
            }
            body.push('\n');
            body.push_str(context.marker);
        }

        Ok(body)
    }

    /// Renders the commit message.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_commit_message(
        &self,
        settings: &LanguageSettings,
        context: &UpdateContext<'_>,
    ) -> Result<String, TemplateError> {
        Ok(self
            .handlebars
            .render_template(&settings.commit_message_format, context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Language;

    const MARKER: &str = "```\n# ruby dependencies in .\n[\n\t\"rails\"\n]\n```";

    fn context(dependencies: &[String]) -> UpdateContext<'_> {
        UpdateContext {
            language: "ruby",
            path: ".",
            dependencies,
            marker: MARKER,
            repository: "acme/app",
        }
    }

    #[test]
    fn test_render_default_texts() {
        let renderer = TemplateRenderer::new();
        let settings = LanguageSettings::builtin(Language::Ruby);
        let dependencies = vec!["rails".to_string()];
        let context = context(&dependencies);

        assert_eq!(
            renderer.render_pr_title(&settings, &context).unwrap(),
            "Update your RB dependencies"
        );
        assert_eq!(
            renderer.render_commit_message(&settings, &context).unwrap(),
            "update rb dependencies"
        );
        assert_eq!(
            renderer.render_pr_body(&settings, &context).unwrap(),
            format!(
                "This PR updates dependencies, which have not been covered by your versions so far:\n\n{MARKER}"
            )
        );
    }

    #[test]
    fn test_body_without_marker_placeholder_gets_marker() {
        let renderer = TemplateRenderer::new();
        let mut settings = LanguageSettings::builtin(Language::Ruby);
        settings.pr_body_format = "Bumps {{#each dependencies}}`{{this}}` {{/each}}".to_string();
        let dependencies = vec!["rails".to_string()];

        let body = renderer.render_pr_body(&settings, &context(&dependencies)).unwrap();

        assert_eq!(body, format!("Bumps `rails` \n\n{MARKER}"));
    }

    #[test]
    fn test_render_conditional_eq() {
        let renderer = TemplateRenderer::new();
        let mut settings = LanguageSettings::builtin(Language::Ruby);
        settings.pr_title_format =
            r#"{{#if (eq language "ruby")}}Bundle update{{else}}npm update{{/if}} in {{repository}}"#
                .to_string();
        let dependencies = vec![];

        let title = renderer.render_pr_title(&settings, &context(&dependencies)).unwrap();

        assert_eq!(title, "Bundle update in acme/app");
    }

    #[test]
    fn test_strict_mode_rejects_unknown_variables() {
        let renderer = TemplateRenderer::new();
        let mut settings = LanguageSettings::builtin(Language::Ruby);
        settings.commit_message_format = "update {{nope}}".to_string();
        let dependencies = vec![];

        assert!(renderer
            .render_commit_message(&settings, &context(&dependencies))
            .is_err());
    }

    #[test]
    fn test_no_html_escaping() {
        let renderer = TemplateRenderer::new();
        let mut settings = LanguageSettings::builtin(Language::Ruby);
        settings.pr_title_format = "<{{path}}> & {{language}}".to_string();
        let dependencies = vec![];

        let title = renderer.render_pr_title(&settings, &context(&dependencies)).unwrap();

        assert_eq!(title, "<.> & ruby");
    }
}
