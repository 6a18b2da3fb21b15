use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

pub static DEFAULT_REST_URL: &'static str = "https://discord.com/api/v9";
pub static DEFAULT_WEB_ORIGIN: &'static str = "https://discord.com";
pub static DEFAULT_LOCALE: &'static str = "en-US";
pub static DEFAULT_DEBUG_OPTIONS: &'static str = "bugReporterEnabled";
pub static DEFAULT_USER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) discord/1.0.9163 Chrome/124.0.6367.243 \
Electron/30.2.0 Safari/537.36";

/// Anything that can be rendered as the `x-super-properties` JSON record.
pub trait EncodeProperties: Send + Sync + fmt::Debug {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T> EncodeProperties for T
where
    T: Serialize + Send + Sync + fmt::Debug,
{
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Client metadata describing the desktop client the requests present as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProperties {
    pub os: String,
    pub browser: String,
    pub release_channel: String,
    pub client_version: String,
    pub os_version: String,
    pub os_arch: String,
    pub app_arch: String,
    pub system_locale: String,
    pub browser_user_agent: String,
    pub browser_version: String,
    pub client_build_number: u64,
    pub native_build_number: u64,
    pub client_event_source: Option<String>,
}

impl Default for ClientProperties {
    fn default() -> Self {
        Self {
            os: "Windows".to_string(),
            browser: "Discord Client".to_string(),
            release_channel: "stable".to_string(),
            client_version: "1.0.9163".to_string(),
            os_version: "10.0.22631".to_string(),
            os_arch: "x64".to_string(),
            app_arch: "x64".to_string(),
            system_locale: DEFAULT_LOCALE.to_string(),
            browser_user_agent: DEFAULT_USER_AGENT.to_string(),
            browser_version: "30.2.0".to_string(),
            client_build_number: 346437,
            native_build_number: 54993,
            client_event_source: None,
        }
    }
}

fn default_client_properties() -> Arc<dyn EncodeProperties> {
    Arc::new(ClientProperties::default())
}

/// Process-wide settings read by every request. Treated as immutable once a
/// [`crate::Client`] holds it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub rest_url: String,
    pub web_origin: String,
    pub user_agent: String,
    pub locale: String,
    pub debug_options: String,
    #[serde(skip, default = "default_client_properties")]
    pub client_properties: Arc<dyn EncodeProperties>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rest_url: DEFAULT_REST_URL.to_string(),
            web_origin: DEFAULT_WEB_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            debug_options: DEFAULT_DEBUG_OPTIONS.to_string(),
            client_properties: default_client_properties(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rest_url(mut self, rest_url: impl Into<String>) -> Self {
        self.rest_url = rest_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_web_origin(mut self, web_origin: impl Into<String>) -> Self {
        self.web_origin = web_origin.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_debug_options(mut self, debug_options: impl Into<String>) -> Self {
        self.debug_options = debug_options.into();
        self
    }

    /// Replace the record sent as `x-super-properties`. It is encoded on every
    /// request, so a record that cannot be serialized fails each request with
    /// `HeaderEncodingFailure` rather than here.
    pub fn with_client_properties<P>(mut self, properties: P) -> Self
    where
        P: EncodeProperties + 'static,
    {
        self.client_properties = Arc::new(properties);
        self
    }
}

/// Bearer token for the session, plus whether it belongs to a bot account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    is_bot: bool,
}

impl Credential {
    pub fn new(token: impl Into<String>, is_bot: bool) -> Self {
        Self {
            token: token.into(),
            is_bot,
        }
    }

    pub fn bot(token: impl Into<String>) -> Self {
        Self::new(token, true)
    }

    pub fn user(token: impl Into<String>) -> Self {
        Self::new(token, false)
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    /// Value of the `authorization` header.
    pub fn authorization(&self) -> String {
        if self.is_bot {
            format!("Bot {}", self.token)
        } else {
            self.token.clone()
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("is_bot", &self.is_bot)
            .finish()
    }
}
