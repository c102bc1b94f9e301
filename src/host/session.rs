use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use teloxide::utils::html;

use crate::host::mode_select::ModeSelection;
use crate::host::modes;
use crate::host::rules::{RulesEditor, SessionSettings};
use crate::quiz::Quiz;

/// A quiz the host has opened to participants with confirmed rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedSession {
    pub quiz_id: String,
    pub quiz_title: String,
    pub mode: String,
    pub settings: SessionSettings,
    /// Indexes into the quiz's questions, in play order.
    pub question_order: Vec<usize>,
}

impl HostedSession {
    pub fn start(quiz: &Quiz, selection: ModeSelection) -> Self {
        Self::start_with_rng(quiz, selection, &mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(
        quiz: &Quiz,
        selection: ModeSelection,
        rng: &mut R,
    ) -> Self {
        let mut question_order: Vec<usize> = (0..quiz.questions.len()).collect();
        if selection.options.randomize_questions {
            question_order.shuffle(rng);
        }

        Self {
            quiz_id: quiz.id.clone(),
            quiz_title: quiz.title.clone(),
            mode: selection.mode,
            settings: selection.options,
            question_order,
        }
    }

    pub fn summary_html(&self) -> String {
        let mode_name = modes::get(&self.mode)
            .map(|mode| mode.display_name.to_owned())
            .unwrap_or_else(|| self.mode.clone());
        let title = if self.quiz_title.is_empty() {
            &self.quiz_id
        } else {
            &self.quiz_title
        };
        format!(
            "🎮 <b>{}</b>\n모드: <b>{}</b>\n문제 수: <b>{}</b>\n\n{}",
            html::escape(title),
            html::escape(&mode_name),
            self.question_order.len(),
            RulesEditor::new(&self.settings).disabled(true).to_html()
        )
    }
}
