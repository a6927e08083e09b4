//! Prompt templating via `minijinja`.
//!
//! The emoji model was fine-tuned with a trigger token, so the caller's
//! text is wrapped in a fixed sentence before it is sent.

use minijinja::{Environment, context};

use crate::error::InferenceError;

/// Template applied to every caller prompt by default.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "A TOK emoji of {{ prompt }}";

/// Name the template is registered under.
const TEMPLATE_NAME: &str = "emoji";

/// A compiled prompt template.
pub struct PromptTemplate {
    env: Environment<'static>,
}

impl PromptTemplate {
    /// Compile a template. The caller text is available as `prompt`.
    pub fn new(source: &str) -> Result<Self, InferenceError> {
        let mut env = Environment::new();
        env.add_template_owned(TEMPLATE_NAME, source.to_owned())
            .map_err(|e| InferenceError::Template(format!("failed to add prompt template: {e}")))?;
        Ok(Self { env })
    }

    /// Render the model prompt for a caller's text.
    pub fn render(&self, prompt: &str) -> Result<String, InferenceError> {
        self.env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| InferenceError::Template(format!("missing prompt template: {e}")))?
            .render(context! { prompt => prompt })
            .map_err(|e| InferenceError::Template(format!("prompt render failed: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_template_wraps_prompt() {
        let template = PromptTemplate::new(DEFAULT_PROMPT_TEMPLATE).unwrap();
        let rendered = template.render("a happy cat").unwrap_or_default();
        assert_eq!(rendered, "A TOK emoji of a happy cat");
    }

    #[test]
    fn custom_template_is_used() {
        let template = PromptTemplate::new("emoji: {{ prompt | upper }}");
        assert!(template.is_ok());
        let rendered = template
            .and_then(|t| t.render("dog"))
            .unwrap_or_default();
        assert_eq!(rendered, "emoji: DOG");
    }

    #[test]
    fn broken_template_is_rejected() {
        let template = PromptTemplate::new("{{ prompt ");
        assert!(matches!(template, Err(InferenceError::Template(_))));
    }

    #[test]
    fn prompt_is_not_html_escaped() {
        let template = PromptTemplate::new(DEFAULT_PROMPT_TEMPLATE).unwrap();
        let rendered = template.render("fish & chips").unwrap_or_default();
        assert_eq!(rendered, "A TOK emoji of fish & chips");
    }
}
