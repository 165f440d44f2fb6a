use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::extract::{
    extract_json_or_fallback, str_field, ExtractMode, Extracted, ExtractionError,
};

pub const NO_TEXT_PLACEHOLDER: &str = "(Nu a fost recunoscut niciun text)";
pub const MIN_QUIZ_TEXT_CHARS: usize = 50;

static LINE_BREAKS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").unwrap());

// ── Media types ──────────────────────────────────────────────────────────────

/// Image formats the vision model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl MediaType {
    #[cfg(test)]
    pub const ALL: [MediaType; 4] = [
        MediaType::Jpeg,
        MediaType::Png,
        MediaType::Gif,
        MediaType::Webp,
    ];

    /// Exact match against the declared MIME type; anything else is rejected.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(MediaType::Jpeg),
            "image/png" => Some(MediaType::Png),
            "image/gif" => Some(MediaType::Gif),
            "image/webp" => Some(MediaType::Webp),
            _ => None,
        }
    }

    pub fn as_mime(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Gif => "image/gif",
            MediaType::Webp => "image/webp",
        }
    }
}

// ── Requests ─────────────────────────────────────────────────────────────────

/// An uploaded image, validated and ready to forward.
#[derive(Debug)]
pub struct ImageOcrRequest {
    pub file_name: Option<String>,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Unknown labels fall back to `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Difficulty::Easy => "Creează întrebări simple și directe, potrivite pentru începători.",
            Difficulty::Medium => {
                "Creează întrebări de dificultate medie care testează înțelegerea conceptelor."
            }
            Difficulty::Hard => {
                "Creează întrebări complexe care necesită gândire critică și analiza profundă."
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    pub text: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_num_questions")]
    pub num_questions: u32,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_num_questions() -> u32 {
    5
}

impl QuizRequest {
    pub fn has_enough_text(&self) -> bool {
        self.text.trim().chars().count() >= MIN_QUIZ_TEXT_CHARS
    }
}

// ── Results ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct OcrResult {
    pub text: String,
    pub summary: String,
}

impl OcrResult {
    /// Lenient: prose without JSON becomes the extracted text.
    pub fn from_completion(raw: &str) -> Self {
        let (text, summary) = match extract_json_or_fallback(raw, ExtractMode::Lenient) {
            Ok(Extracted::Object(object)) => (
                str_field(&object, "text_extras").unwrap_or(raw).to_string(),
                str_field(&object, "summary").unwrap_or_default().to_string(),
            ),
            Ok(Extracted::RawText(text)) => (text, String::new()),
            // Lenient mode does not fail.
            Err(_) => (raw.to_string(), String::new()),
        };

        let text = if text.trim().is_empty() {
            NO_TEXT_PLACEHOLDER.to_string()
        } else {
            text
        };

        OcrResult { text, summary }
    }

    /// Same text with every run of line breaks replaced by one space.
    pub fn single_line_text(&self) -> String {
        LINE_BREAKS_RE.replace_all(&self.text, " ").into_owned()
    }
}

/// One quiz question as the model wrote it. Fields with a missing, null or
/// wrong-typed value take their default; keys the model adds are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(default, deserialize_with = "lenient")]
    pub question: String,
    /// Four entries when the model follows instructions; not enforced.
    #[serde(default, deserialize_with = "lenient_strings")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "lenient_index")]
    pub correct_answer: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub explanation: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The parsed quiz object. `questions` is `None` when the model sent no
/// question list; every other top-level key passes through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuizQuestion>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuizResult {
    /// Strict: a completion without a readable JSON object is an error.
    pub fn from_completion(raw: &str) -> Result<Self, ExtractionError> {
        let mut object = match extract_json_or_fallback(raw, ExtractMode::Strict)? {
            Extracted::Object(object) => object,
            Extracted::RawText(_) => return Err(ExtractionError::NoJsonObject),
        };

        let questions = match object.remove("questions") {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match serde_json::from_value::<QuizQuestion>(item) {
                        Ok(question) => Some(question),
                        Err(e) => {
                            tracing::warn!(error = %e, "skipping quiz entry that is not an object");
                            None
                        }
                    })
                    .collect(),
            ),
            Some(other) => {
                object.insert("questions".to_string(), other);
                None
            }
            None => None,
        };

        Ok(QuizResult {
            questions,
            extra: object,
        })
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        self.questions.as_deref().unwrap_or_default()
    }
}

// ── Grammar check ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GrammarRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrammarResult {
    pub corrected_text: String,
    pub corrections: Vec<String>,
}

impl GrammarResult {
    /// Lenient, like OCR: a reply without JSON is taken as the corrected text.
    pub fn from_completion(raw: &str) -> Self {
        match extract_json_or_fallback(raw, ExtractMode::Lenient) {
            Ok(Extracted::Object(object)) => GrammarResult {
                corrected_text: str_field(&object, "corrected_text")
                    .unwrap_or(raw)
                    .to_string(),
                corrections: object
                    .get("corrections")
                    .map(strings_from)
                    .unwrap_or_default(),
            },
            Ok(Extracted::RawText(text)) => GrammarResult {
                corrected_text: text,
                corrections: Vec::new(),
            },
            Err(_) => GrammarResult {
                corrected_text: raw.to_string(),
                corrections: Vec::new(),
            },
        }
    }
}

// ── Lenient field readers ────────────────────────────────────────────────────

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Accepts `2`, `2.0` and `"2"`.
fn lenient_index<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let index = match &value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(index.and_then(|i| u32::try_from(i).ok()).unwrap_or_default())
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(strings_from(&Value::deserialize(deserializer)?))
}

/// Strings kept as is, numbers and booleans stringified, anything else dropped.
fn strings_from(value: &Value) -> Vec<String> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

// ── Responses ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub file_name: Option<String>,
    pub content_type: String,
    pub text_extras: String,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub mesaj: &'static str,
}
