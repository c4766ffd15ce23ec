//! Markdown link normalisation.

use askdocs_core::{AppError, AppResult};
use regex::{Captures, Regex};

/// `[text](/path)`: a markdown link whose target is site-relative.
const RELATIVE_LINK_PATTERN: &str = r"\[(.*?)\]\((/[^)]*)\)";

/// Rewrites site-relative markdown links to absolute documentation URLs.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    pattern: Regex,
    docs_host: String,
}

impl LinkRewriter {
    /// `docs_host` is a bare host name such as `docs.example.com`.
    pub fn new(docs_host: impl Into<String>) -> AppResult<Self> {
        let pattern = Regex::new(RELATIVE_LINK_PATTERN)
            .map_err(|e| AppError::Other(format!("Invalid link pattern: {}", e)))?;

        Ok(Self {
            pattern,
            docs_host: docs_host.into(),
        })
    }

    pub fn docs_host(&self) -> &str {
        &self.docs_host
    }

    /// Prefix every `[text](/path)` with `https://{docs_host}`.
    ///
    /// Absolute links and all other text are left as they are, so a
    /// second pass changes nothing.
    pub fn rewrite(&self, answer: &str) -> String {
        self.pattern
            .replace_all(answer, |caps: &Captures| {
                format!("[{}](https://{}{})", &caps[1], self.docs_host, &caps[2])
            })
            .into_owned()
    }
}
