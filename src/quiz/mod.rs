pub mod library;
pub mod preview;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Quiz {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_questions")]
    pub questions: Vec<Question>,
}

impl Quiz {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            questions,
        }
    }

    pub fn has_questions(&self) -> bool {
        !self.questions.is_empty()
    }
}

// Anything other than an array is treated as "no questions".
fn lenient_questions<'de, D>(deserializer: D) -> Result<Vec<Question>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.into_iter().map(Question::from).collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerMatchType {
    #[default]
    Exact,
    Contains,
}

/// A quiz question as stored in a quiz document.
///
/// Documents are written by other tools and may be incomplete, so every
/// type-specific field is optional and decoding a question never fails.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum Question {
    MultipleChoice {
        text: String,
        options: Option<Vec<String>>,
        correct_answer: Option<usize>,
    },
    ShortAnswer {
        text: String,
        correct_answer_text: Option<String>,
        additional_answers: Vec<String>,
        answer_match_type: AnswerMatchType,
    },
    Opinion {
        text: String,
        is_anonymous: bool,
    },
    /// Legacy or unrecognised `type` tag.
    Unknown {
        type_tag: String,
        text: String,
        has_options: bool,
    },
}

impl Question {
    pub fn text(&self) -> &str {
        match self {
            Question::MultipleChoice { text, .. }
            | Question::ShortAnswer { text, .. }
            | Question::Opinion { text, .. }
            | Question::Unknown { text, .. } => text,
        }
    }
}

impl From<Value> for Question {
    fn from(value: Value) -> Self {
        let text = value
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let options = value.get("options").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
        });

        match value.get("type").and_then(Value::as_str) {
            Some("multiple-choice") => Question::MultipleChoice {
                text,
                options,
                correct_answer: value
                    .get("correctAnswer")
                    .and_then(Value::as_u64)
                    .map(|i| i as usize),
            },
            Some("short-answer") => Question::ShortAnswer {
                text,
                correct_answer_text: value
                    .get("correctAnswerText")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                additional_answers: value
                    .get("additionalAnswers")
                    .and_then(Value::as_array)
                    .map(|answers| {
                        answers
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_owned)
                            .collect()
                    })
                    .unwrap_or_default(),
                answer_match_type: match value.get("answerMatchType").and_then(Value::as_str) {
                    Some("contains") => AnswerMatchType::Contains,
                    _ => AnswerMatchType::Exact,
                },
            },
            Some("opinion") => Question::Opinion {
                text,
                is_anonymous: value
                    .get("isAnonymous")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            other => Question::Unknown {
                type_tag: other.unwrap_or_default().to_owned(),
                text,
                has_options: options.is_some(),
            },
        }
    }
}
