use serde::{Deserialize, Serialize};
use teloxide::types::KeyboardButton;

pub const HOUR_MS: u64 = 60 * 60 * 1000;

const MIN_EXPIRY_HOURS: u64 = 1;
const MAX_EXPIRY_HOURS: u64 = 168;
const MIN_QUESTION_SECONDS: u32 = 10;
const MAX_QUESTION_SECONDS: u32 = 60;
const QUESTION_STEP_SECONDS: u32 = 5;

const EXPIRY_LABEL: &str = "만료 기간";
const QUESTION_TIME_LABEL: &str = "문제 시간";
const RANDOMIZE_LABEL: &str = "문제 랜덤 출제";
const SINGLE_ATTEMPT_LABEL: &str = "한 번만 참가";

const MINUS: &str = "➖";
const PLUS: &str = "➕";
const TURN_ON: &str = "켜기";
const TURN_OFF: &str = "끄기";

/// Rules of a hosted quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    /// Milliseconds.
    pub expires_in: u64,
    pub randomize_questions: bool,
    pub single_attempt: bool,
    /// Seconds.
    pub question_time_limit: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            expires_in: 24 * HOUR_MS,
            randomize_questions: false,
            single_attempt: true,
            question_time_limit: 30,
        }
    }
}

/// Formats an expiry as "N시간" below a day, otherwise "D일" or "D일 H시간".
/// Partial hours are truncated.
pub fn format_expiry(ms: u64) -> String {
    let hours = ms / HOUR_MS;
    if hours >= 24 {
        let days = hours / 24;
        let remaining = hours % 24;
        if remaining == 0 {
            return format!("{}일", days);
        }
        return format!("{}일 {}시간", days, remaining);
    }
    format!("{}시간", hours)
}

impl SessionSettings {
    /// Hour steps below half a day, then a snap to a full day, then day steps.
    /// Stepping up then down is not an identity around 12h/24h: 23h goes up
    /// to 24h and back down to 12h.
    pub fn step_expiry(&self, increment: bool) -> Self {
        let current = self.expires_in;
        let next = if increment {
            if current < 12 * HOUR_MS {
                current + HOUR_MS
            } else if current < 24 * HOUR_MS {
                24 * HOUR_MS
            } else {
                (current + 24 * HOUR_MS).min(MAX_EXPIRY_HOURS * HOUR_MS)
            }
        } else if current > 24 * HOUR_MS {
            current - 24 * HOUR_MS
        } else if current > 12 * HOUR_MS {
            12 * HOUR_MS
        } else {
            current
                .saturating_sub(HOUR_MS)
                .max(MIN_EXPIRY_HOURS * HOUR_MS)
        };

        Self {
            expires_in: next.clamp(MIN_EXPIRY_HOURS * HOUR_MS, MAX_EXPIRY_HOURS * HOUR_MS),
            ..*self
        }
    }

    pub fn step_question_time(&self, increment: bool) -> Self {
        let next = if increment {
            self.question_time_limit.saturating_add(QUESTION_STEP_SECONDS)
        } else {
            self.question_time_limit.saturating_sub(QUESTION_STEP_SECONDS)
        };
        Self {
            question_time_limit: next.clamp(MIN_QUESTION_SECONDS, MAX_QUESTION_SECONDS),
            ..*self
        }
    }

    pub fn toggle(&self, field: RuleToggle, value: bool) -> Self {
        match field {
            RuleToggle::RandomizeQuestions => Self {
                randomize_questions: value,
                ..*self
            },
            RuleToggle::SingleAttempt => Self {
                single_attempt: value,
                ..*self
            },
        }
    }

    pub fn apply(&self, edit: RuleEdit) -> Self {
        match edit {
            RuleEdit::Expiry { increment } => self.step_expiry(increment),
            RuleEdit::QuestionTime { increment } => self.step_question_time(increment),
            RuleEdit::Toggle(field, value) => self.toggle(field, value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleToggle {
    RandomizeQuestions,
    SingleAttempt,
}

impl RuleToggle {
    fn label(self) -> &'static str {
        match self {
            RuleToggle::RandomizeQuestions => RANDOMIZE_LABEL,
            RuleToggle::SingleAttempt => SINGLE_ATTEMPT_LABEL,
        }
    }
}

/// One press of a rules control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleEdit {
    Expiry { increment: bool },
    QuestionTime { increment: bool },
    Toggle(RuleToggle, bool),
}

impl RuleEdit {
    pub fn button_text(&self) -> String {
        match self {
            RuleEdit::Expiry { increment } => format!("{} {}", EXPIRY_LABEL, sign(*increment)),
            RuleEdit::QuestionTime { increment } => {
                format!("{} {}", QUESTION_TIME_LABEL, sign(*increment))
            }
            RuleEdit::Toggle(field, value) => format!(
                "{} {}",
                field.label(),
                if *value { TURN_ON } else { TURN_OFF }
            ),
        }
    }

    pub fn from_button(text: &str) -> Option<Self> {
        let (label, action) = text.trim().rsplit_once(' ')?;
        match (label, action) {
            (EXPIRY_LABEL, MINUS) => Some(RuleEdit::Expiry { increment: false }),
            (EXPIRY_LABEL, PLUS) => Some(RuleEdit::Expiry { increment: true }),
            (QUESTION_TIME_LABEL, MINUS) => Some(RuleEdit::QuestionTime { increment: false }),
            (QUESTION_TIME_LABEL, PLUS) => Some(RuleEdit::QuestionTime { increment: true }),
            (RANDOMIZE_LABEL, TURN_ON) => Some(RuleEdit::Toggle(RuleToggle::RandomizeQuestions, true)),
            (RANDOMIZE_LABEL, TURN_OFF) => {
                Some(RuleEdit::Toggle(RuleToggle::RandomizeQuestions, false))
            }
            (SINGLE_ATTEMPT_LABEL, TURN_ON) => Some(RuleEdit::Toggle(RuleToggle::SingleAttempt, true)),
            (SINGLE_ATTEMPT_LABEL, TURN_OFF) => {
                Some(RuleEdit::Toggle(RuleToggle::SingleAttempt, false))
            }
            _ => None,
        }
    }
}

fn sign(increment: bool) -> &'static str {
    if increment {
        PLUS
    } else {
        MINUS
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "켬"
    } else {
        "끔"
    }
}

/// Controlled editor over a [`SessionSettings`] owned by the caller.
///
/// The editor keeps no state of its own: every edit produces a new value
/// that is handed to the caller's `on_change`, and nothing happens at all
/// while the editor is disabled.
pub struct RulesEditor<'a> {
    value: &'a SessionSettings,
    disabled: bool,
}

impl<'a> RulesEditor<'a> {
    pub fn new(value: &'a SessionSettings) -> Self {
        Self {
            value,
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn apply<F>(&self, edit: RuleEdit, on_change: F)
    where
        F: FnOnce(SessionSettings),
    {
        if self.disabled {
            return;
        }
        on_change(self.value.apply(edit));
    }

    pub fn to_html(&self) -> String {
        [
            format!("📅 {}: <b>{}</b>", EXPIRY_LABEL, format_expiry(self.value.expires_in)),
            format!(
                "⏱ {}: <b>{}초</b>",
                QUESTION_TIME_LABEL, self.value.question_time_limit
            ),
            format!(
                "🔀 {}: <b>{}</b>",
                RANDOMIZE_LABEL,
                on_off(self.value.randomize_questions)
            ),
            format!(
                "👤 {}: <b>{}</b>",
                SINGLE_ATTEMPT_LABEL,
                on_off(self.value.single_attempt)
            ),
        ]
        .join("\n")
    }

    /// Control rows; empty while disabled.
    pub fn keyboard(&self) -> Vec<Vec<KeyboardButton>> {
        if self.disabled {
            return Vec::new();
        }
        let rows = [
            vec![
                RuleEdit::Expiry { increment: false },
                RuleEdit::Expiry { increment: true },
            ],
            vec![
                RuleEdit::QuestionTime { increment: false },
                RuleEdit::QuestionTime { increment: true },
            ],
            vec![
                RuleEdit::Toggle(
                    RuleToggle::RandomizeQuestions,
                    !self.value.randomize_questions,
                ),
                RuleEdit::Toggle(RuleToggle::SingleAttempt, !self.value.single_attempt),
            ],
        ];
        rows.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|edit| KeyboardButton::new(edit.button_text()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(h: u64) -> SessionSettings {
        SessionSettings {
            expires_in: h * HOUR_MS,
            ..SessionSettings::default()
        }
    }

    #[test]
    fn formats_every_hour_in_range() {
        for h in 1..=168u64 {
            let expected = if h < 24 {
                format!("{}시간", h)
            } else if h % 24 == 0 {
                format!("{}일", h / 24)
            } else {
                format!("{}일 {}시간", h / 24, h % 24)
            };
            assert_eq!(format_expiry(h * HOUR_MS), expected, "{}h", h);
        }
    }

    #[test]
    fn partial_hours_are_truncated() {
        assert_eq!(format_expiry(HOUR_MS + HOUR_MS / 2), "1시간");
        assert_eq!(format_expiry(25 * HOUR_MS + HOUR_MS - 1), "1일 1시간");
        assert_eq!(format_expiry(HOUR_MS / 2), "0시간");
    }

    #[test]
    fn expiry_steps_are_hourly_then_daily() {
        assert_eq!(hours(5).step_expiry(true).expires_in, 6 * HOUR_MS);
        assert_eq!(hours(11).step_expiry(true).expires_in, 12 * HOUR_MS);
        assert_eq!(hours(12).step_expiry(true).expires_in, 24 * HOUR_MS);
        assert_eq!(hours(18).step_expiry(true).expires_in, 24 * HOUR_MS);
        assert_eq!(hours(30).step_expiry(true).expires_in, 54 * HOUR_MS);
        assert_eq!(hours(150).step_expiry(true).expires_in, 168 * HOUR_MS);

        assert_eq!(hours(72).step_expiry(false).expires_in, 48 * HOUR_MS);
        assert_eq!(hours(30).step_expiry(false).expires_in, 6 * HOUR_MS);
        assert_eq!(hours(24).step_expiry(false).expires_in, 12 * HOUR_MS);
        assert_eq!(hours(13).step_expiry(false).expires_in, 12 * HOUR_MS);
        assert_eq!(hours(12).step_expiry(false).expires_in, 11 * HOUR_MS);
        assert_eq!(hours(1).step_expiry(false).expires_in, HOUR_MS);
    }

    #[test]
    fn expiry_steps_are_not_inverse_around_a_day() {
        let up = hours(23).step_expiry(true);
        assert_eq!(up.expires_in, 24 * HOUR_MS);
        let down = up.step_expiry(false);
        assert_eq!(down.expires_in, 12 * HOUR_MS);
        assert_ne!(down, hours(23));
    }

    #[test]
    fn expiry_never_leaves_range() {
        for h in 1..=168u64 {
            for increment in [false, true] {
                let next = hours(h).step_expiry(increment).expires_in;
                assert!(
                    (HOUR_MS..=168 * HOUR_MS).contains(&next),
                    "{}h {} -> {}",
                    h,
                    increment,
                    next
                );
            }
        }
        assert_eq!(hours(200).step_expiry(false).expires_in, 168 * HOUR_MS);
        assert_eq!(hours(0).step_expiry(false).expires_in, HOUR_MS);
    }

    #[test]
    fn question_time_steps_by_five_within_bounds() {
        let base = SessionSettings::default();
        assert_eq!(base.step_question_time(true).question_time_limit, 35);
        assert_eq!(base.step_question_time(false).question_time_limit, 25);

        for seconds in 0..=80u32 {
            for increment in [false, true] {
                let settings = SessionSettings {
                    question_time_limit: seconds,
                    ..base
                };
                let next = settings.step_question_time(increment).question_time_limit;
                assert!((10..=60).contains(&next), "{} {} -> {}", seconds, increment, next);
            }
        }

        let top = SessionSettings {
            question_time_limit: 60,
            ..base
        };
        assert_eq!(top.step_question_time(true).question_time_limit, 60);
        let bottom = SessionSettings {
            question_time_limit: 10,
            ..base
        };
        assert_eq!(bottom.step_question_time(false).question_time_limit, 10);
    }

    #[test]
    fn repeated_increments_from_23_hours_cap_at_a_week() {
        let mut settings = SessionSettings {
            expires_in: 82_800_000,
            randomize_questions: false,
            single_attempt: true,
            question_time_limit: 30,
        };

        settings = settings.step_expiry(true);
        assert_eq!(settings.expires_in, 86_400_000);
        assert_eq!(format_expiry(settings.expires_in), "1일");

        settings = settings.step_expiry(true);
        assert_eq!(settings.expires_in, 172_800_000);

        for _ in 0..10 {
            settings = settings.step_expiry(true);
        }
        assert_eq!(settings.expires_in, 168 * HOUR_MS);
        assert_eq!(format_expiry(settings.expires_in), "7일");
        assert!(!settings.randomize_questions);
        assert!(settings.single_attempt);
        assert_eq!(settings.question_time_limit, 30);
    }

    #[test]
    fn editor_hands_back_a_new_value() {
        let value = SessionSettings::default();
        let editor = RulesEditor::new(&value);

        let mut changed = None;
        editor.apply(
            RuleEdit::Toggle(RuleToggle::RandomizeQuestions, true),
            |next| changed = Some(next),
        );
        assert_eq!(
            changed,
            Some(SessionSettings {
                randomize_questions: true,
                ..value
            })
        );
        assert!(!value.randomize_questions);

        editor.apply(
            RuleEdit::Toggle(RuleToggle::SingleAttempt, false),
            |next| changed = Some(next),
        );
        assert_eq!(changed.map(|s| s.single_attempt), Some(false));
    }

    #[test]
    fn disabled_editor_is_inert() {
        let value = SessionSettings::default();
        let editor = RulesEditor::new(&value).disabled(true);
        let mut calls = 0;
        for edit in [
            RuleEdit::Expiry { increment: true },
            RuleEdit::QuestionTime { increment: false },
            RuleEdit::Toggle(RuleToggle::RandomizeQuestions, true),
        ] {
            editor.apply(edit, |_| calls += 1);
        }
        assert_eq!(calls, 0);
        assert!(editor.keyboard().is_empty());
        assert!(editor.to_html().contains("1일"));
    }

    #[test]
    fn buttons_parse_back_into_edits() {
        let value = SessionSettings::default();
        let keyboard = RulesEditor::new(&value).keyboard();
        let edits: Vec<_> = keyboard
            .iter()
            .flatten()
            .map(|button| RuleEdit::from_button(&button.text))
            .collect();
        assert_eq!(
            edits,
            vec![
                Some(RuleEdit::Expiry { increment: false }),
                Some(RuleEdit::Expiry { increment: true }),
                Some(RuleEdit::QuestionTime { increment: false }),
                Some(RuleEdit::QuestionTime { increment: true }),
                Some(RuleEdit::Toggle(RuleToggle::RandomizeQuestions, true)),
                Some(RuleEdit::Toggle(RuleToggle::SingleAttempt, false)),
            ]
        );
        assert_eq!(RuleEdit::from_button("확인"), None);
        assert_eq!(RuleEdit::from_button("만료 기간"), None);
        assert_eq!(RuleEdit::from_button("만료 기간 ✖"), None);
    }

    #[test]
    fn renders_current_values() {
        let value = SessionSettings {
            expires_in: 50 * HOUR_MS,
            randomize_questions: true,
            single_attempt: false,
            question_time_limit: 45,
        };
        let html = RulesEditor::new(&value).to_html();
        assert!(html.contains("만료 기간: <b>2일 2시간</b>"));
        assert!(html.contains("문제 시간: <b>45초</b>"));
        assert!(html.contains("문제 랜덤 출제: <b>켬</b>"));
        assert!(html.contains("한 번만 참가: <b>끔</b>"));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(SessionSettings::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "expiresIn": 86_400_000u64,
                "randomizeQuestions": false,
                "singleAttempt": true,
                "questionTimeLimit": 30
            })
        );
    }
}
