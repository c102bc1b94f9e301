use teloxide::utils::html;

use crate::quiz::{AnswerMatchType, Question, Quiz};

/// Telegram rejects messages longer than this.
pub const MESSAGE_LIMIT: usize = 4096;

const NO_QUESTIONS: &str = "등록된 문제가 없습니다";
const MASKED_ANSWER: &str = "정답이 가려진 상태입니다";
const UNKNOWN_FORMAT: &str = "알 수 없는 문제 형식입니다";
const MISSING_ANSWER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Blue,
    Green,
    Orange,
}

impl Tone {
    fn badge(self) -> &'static str {
        match self {
            Tone::Blue => "🟦",
            Tone::Green => "🟩",
            Tone::Orange => "🟧",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionLine {
    pub number: usize,
    pub text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortAnswerBody {
    Masked,
    Revealed {
        answer: Option<String>,
        additional: Vec<String>,
        match_label: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBody {
    Options(Vec<OptionLine>),
    ShortAnswer(ShortAnswerBody),
    Opinion { anonymous: bool },
    UnknownFormat,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCard {
    pub number: usize,
    pub label: &'static str,
    pub tone: Tone,
    pub text: String,
    pub body: CardBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Empty,
    Cards(Vec<QuestionCard>),
}

/// Builds the read-only preview of a quiz. Missing data never fails, it
/// renders as a placeholder instead.
pub fn render(quiz: Option<&Quiz>, reveal_answers: bool) -> Preview {
    match quiz {
        Some(quiz) if quiz.has_questions() => Preview::Cards(
            quiz.questions
                .iter()
                .enumerate()
                .map(|(index, question)| render_card(index + 1, question, reveal_answers))
                .collect(),
        ),
        _ => Preview::Empty,
    }
}

fn render_card(number: usize, question: &Question, reveal_answers: bool) -> QuestionCard {
    let (label, tone) = match question {
        Question::ShortAnswer { .. } => ("주관식", Tone::Green),
        Question::Opinion { .. } => ("의견 수집", Tone::Orange),
        // Unknown tags borrow the multiple-choice badge.
        Question::MultipleChoice { .. } | Question::Unknown { .. } => ("객관식", Tone::Blue),
    };

    let body = match question {
        Question::MultipleChoice {
            options,
            correct_answer,
            ..
        } => match options {
            Some(options) => CardBody::Options(
                options
                    .iter()
                    .enumerate()
                    .map(|(i, text)| OptionLine {
                        number: i + 1,
                        text: text.clone(),
                        correct: reveal_answers && *correct_answer == Some(i),
                    })
                    .collect(),
            ),
            None => CardBody::Nothing,
        },
        Question::ShortAnswer {
            correct_answer_text,
            additional_answers,
            answer_match_type,
            ..
        } => {
            if reveal_answers {
                CardBody::ShortAnswer(ShortAnswerBody::Revealed {
                    answer: correct_answer_text.clone(),
                    additional: additional_answers.clone(),
                    match_label: match answer_match_type {
                        AnswerMatchType::Contains => "포함",
                        AnswerMatchType::Exact => "정확히 일치",
                    },
                })
            } else {
                CardBody::ShortAnswer(ShortAnswerBody::Masked)
            }
        }
        Question::Opinion { is_anonymous, .. } => CardBody::Opinion {
            anonymous: *is_anonymous,
        },
        Question::Unknown { has_options, .. } => {
            if *has_options {
                CardBody::UnknownFormat
            } else {
                CardBody::Nothing
            }
        }
    };

    QuestionCard {
        number,
        label,
        tone,
        text: question.text().to_owned(),
        body,
    }
}

impl QuestionCard {
    pub fn to_html(&self) -> String {
        let mut lines = vec![
            format!(
                "{} <b>문제 {} - {}</b>",
                self.tone.badge(),
                self.number,
                self.label
            ),
            format!("<b>{}</b>", html::escape(&self.text)),
        ];

        match &self.body {
            CardBody::Options(options) => {
                for option in options {
                    if option.correct {
                        lines.push(format!(
                            "✅ <b>{}. {}</b>  <i>정답</i>",
                            option.number,
                            html::escape(&option.text)
                        ));
                    } else {
                        lines.push(format!("▫️ {}. {}", option.number, html::escape(&option.text)));
                    }
                }
            }
            CardBody::ShortAnswer(ShortAnswerBody::Masked) => {
                lines.push(format!("<i>{}</i>", MASKED_ANSWER));
            }
            CardBody::ShortAnswer(ShortAnswerBody::Revealed {
                answer,
                additional,
                match_label,
            }) => {
                lines.push("정답:".to_owned());
                lines.push(format!(
                    "  <b>{}</b>",
                    html::escape(answer.as_deref().unwrap_or(MISSING_ANSWER))
                ));
                if !additional.is_empty() {
                    lines.push("추가 정답:".to_owned());
                    for extra in additional {
                        lines.push(format!("  • {}", html::escape(extra)));
                    }
                }
                lines.push(format!("<i>정답 인정 방식: {}</i>", match_label));
            }
            CardBody::Opinion { anonymous } => {
                lines.push("💬 <b>자유로운 의견 수집</b>".to_owned());
                lines.push("<i>정답이 없으며 점수에 영향을 주지 않습니다</i>".to_owned());
                if *anonymous {
                    lines.push("🟠 <b>익명 수집</b>".to_owned());
                } else {
                    lines.push("⚪ 익명 수집".to_owned());
                }
            }
            CardBody::UnknownFormat => {
                lines.push(format!("<i>{}</i>", UNKNOWN_FORMAT));
            }
            CardBody::Nothing => {}
        }

        lines.join("\n")
    }
}

impl Preview {
    pub fn to_html(&self) -> String {
        match self {
            Preview::Empty => format!("👁 <i>{}</i>", NO_QUESTIONS),
            Preview::Cards(cards) => cards
                .iter()
                .map(QuestionCard::to_html)
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    /// Splits the preview into messages that fit under [`MESSAGE_LIMIT`].
    /// Cards are kept whole where possible; an oversized card is split
    /// between lines, and a line that alone is too long is cut between
    /// characters with its open tags closed and reopened.
    pub fn to_messages(&self) -> Vec<String> {
        let cards = match self {
            Preview::Empty => return vec![self.to_html()],
            Preview::Cards(cards) => cards,
        };

        let mut messages = Vec::new();
        let mut current = String::new();
        for card in cards {
            let card_html = card.to_html();
            if fits(&current, &card_html, "\n\n") {
                push_with(&mut current, &card_html, "\n\n");
                continue;
            }
            if !current.is_empty() {
                messages.push(std::mem::take(&mut current));
            }
            if utf16_len(&card_html) <= MESSAGE_LIMIT {
                current = card_html;
                continue;
            }
            for line in card_html.lines() {
                for piece in split_line(line) {
                    if !current.is_empty() && !fits(&current, &piece, "\n") {
                        messages.push(std::mem::take(&mut current));
                    }
                    push_with(&mut current, &piece, "\n");
                }
            }
        }
        if !current.is_empty() {
            messages.push(current);
        }
        messages
    }
}

/// Telegram measures message length in UTF-16 code units.
fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn fits(current: &str, next: &str, separator: &str) -> bool {
    let separator_len = if current.is_empty() {
        0
    } else {
        utf16_len(separator)
    };
    utf16_len(current) + separator_len + utf16_len(next) <= MESSAGE_LIMIT
}

fn push_with(current: &mut String, next: &str, separator: &str) {
    if !current.is_empty() {
        current.push_str(separator);
    }
    current.push_str(next);
}

/// Length of the leading tag, entity or character of `rest`. Tags and
/// entities are never cut.
fn atom_len(rest: &str) -> usize {
    let closing = match rest.as_bytes().first() {
        Some(b'<') => rest.find('>'),
        Some(b'&') => rest.find(';').filter(|end| *end <= 8),
        _ => None,
    };
    match closing {
        Some(end) => end + 1,
        None => rest.chars().next().map_or(0, char::len_utf8),
    }
}

fn tag_name(tag: &str) -> &str {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .trim_end_matches('>')
        .split_whitespace()
        .next()
        .unwrap_or_default()
}

fn closing_tags(open: &[&str]) -> String {
    open.iter().rev().map(|tag| format!("</{}>", tag)).collect()
}

// Room for the closing tags an opening tag in the current atom adds.
const TAG_RESERVE: usize = 16;

fn split_line(line: &str) -> Vec<String> {
    if utf16_len(line) <= MESSAGE_LIMIT {
        return vec![line.to_owned()];
    }

    let mut pieces = Vec::new();
    let mut open: Vec<&str> = Vec::new();
    let mut current = String::new();
    let mut rest = line;
    while !rest.is_empty() {
        let (atom, tail) = rest.split_at(atom_len(rest));
        rest = tail;

        let closing = closing_tags(&open);
        // A closing tag is already counted in `closing`.
        if !current.is_empty()
            && !atom.starts_with("</")
            && utf16_len(&current) + utf16_len(atom) + utf16_len(&closing)
                > MESSAGE_LIMIT - TAG_RESERVE
        {
            current.push_str(&closing);
            pieces.push(std::mem::take(&mut current));
            current = open.iter().map(|tag| format!("<{}>", tag)).collect();
        }

        if atom.starts_with("</") {
            open.pop();
        } else if atom.starts_with('<') {
            open.push(tag_name(atom));
        }
        current.push_str(atom);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
