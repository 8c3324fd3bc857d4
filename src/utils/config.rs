use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Language codes accepted by the translation service.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "af", "sq", "am", "ar", "hy", "az", "eu", "be", "bn", "bs", "bg", "ca", "ceb", "ny", "zh-CN",
    "zh-TW", "co", "hr", "cs", "da", "nl", "en", "eo", "et", "tl", "fi", "fr", "fy", "gl", "ka",
    "de", "el", "gu", "ht", "ha", "haw", "iw", "hi", "hmn", "hu", "is", "ig", "id", "ga", "it",
    "ja", "jw", "kn", "kk", "km", "ko", "ku", "ky", "lo", "la", "lv", "lt", "lb", "mk", "mg",
    "ms", "ml", "mt", "mi", "mr", "mn", "my", "ne", "no", "ps", "fa", "pl", "pt", "pa", "ro",
    "ru", "sm", "gd", "sr", "st", "sn", "sd", "si", "sk", "sl", "so", "es", "su", "sw", "sv",
    "tg", "ta", "te", "th", "tr", "uk", "ur", "uz", "vi", "cy", "xh", "yi", "yo", "zu",
];

pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MIN_RESPONSE_SIZE: usize = 100;
pub const REQUEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_THREADS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub max_file_size: u64,
    pub min_response_size: usize,
    pub request_timeout_secs: u64,
    pub concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            min_response_size: MIN_RESPONSE_SIZE,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            concurrency: DEFAULT_THREADS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMethod {
    Google,
    Google2,
    Bing,
}

impl TranslationMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Google2 => "google2",
            Self::Bing => "bing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Openrouter,
    Ollama,
}

impl AiProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Openrouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }
}

/// Translation options forwarded to the service as form fields. The client
/// never interprets these beyond serializing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionParams {
    pub backup_fallback: bool,
    pub retry_ceiling: u32,
    pub method: TranslationMethod,
    pub source_lang: String,
    pub target_lang: String,
    pub provider: AiProvider,
}

impl SubmissionParams {
    /// Wire names match the server contract: fb, cl, m, f, t, aiProvider.
    pub fn to_form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("fb", if self.backup_fallback { "yes" } else { "no" }.to_string()),
            ("cl", self.retry_ceiling.to_string()),
            ("m", self.method.as_str().to_string()),
            ("f", self.source_lang.clone()),
            ("t", self.target_lang.clone()),
            ("aiProvider", self.provider.as_str().to_string()),
        ]
    }
}

impl Default for SubmissionParams {
    fn default() -> Self {
        Self {
            backup_fallback: true,
            retry_ceiling: 3,
            method: TranslationMethod::Bing,
            source_lang: "en".to_string(),
            target_lang: "ru".to_string(),
            provider: AiProvider::Openrouter,
        }
    }
}

/// Validate a language code against the supported table.
pub fn parse_language(input: &str) -> std::result::Result<String, String> {
    if SUPPORTED_LANGUAGES.contains(&input) {
        Ok(input.to_string())
    } else {
        Err(format!("unsupported language code '{input}'"))
    }
}
