use serde::{Deserialize, Serialize};
use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::host::modes::{self, ModeDefinition, NORMAL_MODE};
use crate::host::rules::{RuleEdit, RulesEditor, SessionSettings};

const TITLE: &str = "활동 설정";
const RULES_TITLE: &str = "노말 모드 규칙";
const CANCEL: &str = "취소";
const CONFIRM: &str = "확인";
const SELECTED: &str = "🔘";
const UNSELECTED: &str = "⚪";

/// Result handed to the host when the dialog is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSelection {
    pub mode: String,
    pub options: SessionSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    SelectMode(&'static str),
    Rules(RuleEdit),
    Close,
    Confirm,
}

impl ModalAction {
    pub fn from_button(text: &str) -> Option<Self> {
        let text = text.trim();
        match text {
            CANCEL => return Some(ModalAction::Close),
            CONFIRM => return Some(ModalAction::Confirm),
            _ => {}
        }

        let name = text
            .strip_prefix(SELECTED)
            .or_else(|| text.strip_prefix(UNSELECTED))
            .map(str::trim_start)
            .unwrap_or(text);
        if let Some(mode) = modes::all().iter().find(|mode| mode.display_name == name) {
            return Some(ModalAction::SelectMode(mode.id));
        }

        RuleEdit::from_button(text).map(ModalAction::Rules)
    }
}

fn mode_line(mode: &ModeDefinition, selected: bool) -> String {
    let marker = if selected { SELECTED } else { UNSELECTED };
    let flags = mode.enabled_flags().collect::<Vec<_>>();
    if flags.is_empty() {
        format!("{} {}", marker, mode.display_name)
    } else {
        format!(
            "{} {} <i>({})</i>",
            marker,
            mode.display_name,
            flags.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    Open(ModeSelect),
    Closed,
    Confirmed(ModeSelection),
}

/// The open game-mode dialog. Its selection and rules are local to one
/// open/close cycle: closing drops them, confirming hands them over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSelect {
    selected_mode: String,
    options: SessionSettings,
}

impl Default for ModeSelect {
    fn default() -> Self {
        Self::open()
    }
}

impl ModeSelect {
    pub fn open() -> Self {
        Self {
            selected_mode: NORMAL_MODE.to_owned(),
            options: SessionSettings::default(),
        }
    }

    pub fn selected_mode(&self) -> &str {
        &self.selected_mode
    }

    pub fn options(&self) -> &SessionSettings {
        &self.options
    }

    /// The rules editor is only shown for the normal mode.
    pub fn shows_rules(&self) -> bool {
        self.selected_mode == NORMAL_MODE
    }

    pub fn handle(mut self, action: ModalAction) -> ModalOutcome {
        match action {
            ModalAction::SelectMode(mode) => {
                self.selected_mode = mode.to_owned();
                ModalOutcome::Open(self)
            }
            ModalAction::Rules(edit) => {
                if self.shows_rules() {
                    let mut next = self.options;
                    RulesEditor::new(&self.options).apply(edit, |changed| next = changed);
                    self.options = next;
                }
                ModalOutcome::Open(self)
            }
            ModalAction::Close => ModalOutcome::Closed,
            ModalAction::Confirm => ModalOutcome::Confirmed(ModeSelection {
                mode: self.selected_mode,
                options: self.options,
            }),
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = format!("<b>{}</b>\n", TITLE);
        for mode in modes::all() {
            html.push_str(&mode_line(mode, mode.id == self.selected_mode));
            html.push('\n');
        }
        if self.shows_rules() {
            html.push_str(&format!(
                "\n<b>{}</b>\n{}",
                RULES_TITLE,
                RulesEditor::new(&self.options).to_html()
            ));
        }
        html.trim_end().to_owned()
    }

    pub fn keyboard(&self) -> KeyboardMarkup {
        let mut rows: Vec<Vec<KeyboardButton>> = modes::all()
            .iter()
            .map(|mode| {
                let marker = if mode.id == self.selected_mode {
                    SELECTED
                } else {
                    UNSELECTED
                };
                vec![KeyboardButton::new(format!("{} {}", marker, mode.display_name))]
            })
            .collect();
        if self.shows_rules() {
            rows.extend(RulesEditor::new(&self.options).keyboard());
        }
        rows.push(vec![KeyboardButton::new(CANCEL), KeyboardButton::new(CONFIRM)]);
        KeyboardMarkup::new(rows).resize_keyboard(true)
    }
}
