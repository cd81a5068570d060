//! Recorder settings
//!
//! Per-recorder options. There is no process-wide configuration.

use serde::{Deserialize, Serialize};

/// Environment variable that disables colorized failure output when set.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Options captured by a recorder at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderSettings {
    /// Wrap response bodies in a dim style when printing failures.
    #[serde(default = "default_colorize")]
    pub colorize: bool,
    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_colorize() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("wirecheck/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            colorize: default_colorize(),
            user_agent: default_user_agent(),
        }
    }
}

impl RecorderSettings {
    /// Defaults, with colorization turned off when `NO_COLOR` is set to a
    /// non-empty value.
    #[must_use]
    pub fn from_env() -> Self {
        let no_color = std::env::var_os(NO_COLOR_ENV).is_some_and(|v| !v.is_empty());
        Self::default().with_colorize(!no_color)
    }

    /// Set colorization.
    #[must_use]
    pub const fn with_colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    /// Set the User-Agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
