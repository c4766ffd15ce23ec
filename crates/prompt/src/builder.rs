//! Prompt builder: dated system instruction plus the grounded user turn.

use crate::loader::load_prompt;
use crate::types::{SystemPromptVars, WeekWindow};
use askdocs_core::config::PromptConfig;
use askdocs_core::{AppError, AppResult};
use askdocs_llm::ChatMessage;
use chrono::{Local, Locale, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use handlebars::Handlebars;

/// Long date pattern, e.g. "Wednesday, 14 October 2026".
const LONG_DATE_FORMAT: &str = "%A, %d %B %Y";

const SYSTEM_TEMPLATE_NAME: &str = "system";

/// Render the user turn exactly as the completion model expects it.
pub fn user_message(question: &str, context: &str) -> String {
    format!("[Question] {} \r\n\r\n[Context] {} \r\n", question, context)
}

/// Builds the two-message conversation sent to the completion backend.
///
/// The system template is compiled once; each build only renders it with
/// the current dates.
#[derive(Debug)]
pub struct PromptBuilder {
    registry: Handlebars<'static>,
    locale: Locale,
}

impl PromptBuilder {
    /// Compile `template` and resolve `locale` (e.g. "en_US", "tr_TR").
    ///
    /// Rendering is strict: a variable other than `today`, `week_start`
    /// and `week_end` fails the build instead of rendering as blank.
    /// Positional `{0}`-style placeholders are rejected up front.
    pub fn new(template: &str, locale: &str) -> AppResult<Self> {
        let locale = Locale::try_from(locale)
            .map_err(|_| AppError::Prompt(format!("Unknown locale: {}", locale)))?;

        if has_positional_placeholder(template) {
            return Err(AppError::Prompt(
                "Template uses positional placeholders; use {{today}}, {{week_start}} and {{week_end}}"
                    .to_string(),
            ));
        }

        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);

        // Disable HTML escaping for plain text
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(SYSTEM_TEMPLATE_NAME, template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self { registry, locale })
    }

    /// Build from the `prompt` configuration section.
    ///
    /// A `templateFile` wins over the inline template, and a locale set in
    /// that file wins over the configured one.
    pub fn from_config(config: &PromptConfig) -> AppResult<Self> {
        match &config.template_file {
            Some(path) => {
                let definition = load_prompt(path)?;
                let locale = definition.locale.as_deref().unwrap_or(&config.locale);
                Self::new(&definition.template, locale)
            }
            None => Self::new(&config.template, &config.locale),
        }
    }

    /// Build the messages for today's date in the local time zone.
    pub fn build(&self, question: &str, context: &str) -> AppResult<Vec<ChatMessage>> {
        self.build_for_date(question, context, Local::now().date_naive())
    }

    /// Build the messages as if `today` were the current date.
    pub fn build_for_date(
        &self,
        question: &str,
        context: &str,
        today: NaiveDate,
    ) -> AppResult<Vec<ChatMessage>> {
        let system = self.render_system(WeekWindow::for_date(today))?;
        tracing::debug!(
            system_len = system.len(),
            context_len = context.len(),
            "Built prompt"
        );

        Ok(vec![
            ChatMessage::system(system),
            ChatMessage::user(user_message(question, context)),
        ])
    }

    fn render_system(&self, window: WeekWindow) -> AppResult<String> {
        let vars = SystemPromptVars {
            today: self.long_date(window.today.and_time(NaiveTime::default())),
            week_start: self.long_date(window.week_start.and_time(NaiveTime::default())),
            week_end: self.long_date(window.week_end),
        };

        self.registry
            .render(SYSTEM_TEMPLATE_NAME, &vars)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
    }

    fn long_date(&self, at: NaiveDateTime) -> String {
        Utc.from_utc_datetime(&at)
            .format_localized(LONG_DATE_FORMAT, self.locale)
            .to_string()
    }
}

/// `{0}`, `{1}`, ... outside of a `{{` expression.
fn has_positional_placeholder(template: &str) -> bool {
    let bytes = template.as_bytes();
    bytes.windows(3).enumerate().any(|(i, w)| {
        w[0] == b'{' && w[1].is_ascii_digit() && w[2] == b'}' && (i == 0 || bytes[i - 1] != b'{')
    })
}
