use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application_form::ApplicationQuestion;

pub const MAX_QUESTIONS: usize = 50;
pub const MAX_QUESTION_LEN: usize = 500;
pub const MAX_ANSWER_LEN: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Select,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Boolean => "boolean",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "text" => Ok(FieldType::Text),
            "textarea" => Ok(FieldType::Textarea),
            "select" => Ok(FieldType::Select),
            "boolean" => Ok(FieldType::Boolean),
            other => Err(Error::Internal(format!("Unknown field type '{}'", other))),
        }
    }
}

/// Question as submitted by a recruiter building the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionInput {
    pub question_text: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPlan {
    pub question_text: String,
    pub field_type: FieldType,
    pub options: Option<Vec<String>>,
    pub is_required: bool,
    pub order_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: Uuid,
    pub answer: String,
}

/// Normalizes a whole form. Questions come back sorted by `order_index`.
pub fn plan_form(questions: &[QuestionInput]) -> Result<Vec<QuestionPlan>> {
    if questions.len() > MAX_QUESTIONS {
        return Err(Error::BadRequest(format!(
            "A form can have at most {} questions",
            MAX_QUESTIONS
        )));
    }

    let mut planned = Vec::with_capacity(questions.len());
    for (idx, q) in questions.iter().enumerate() {
        let text = q.question_text.trim();
        if text.is_empty() {
            return Err(Error::BadRequest(format!(
                "Question {} needs some text",
                idx + 1
            )));
        }
        if text.chars().count() > MAX_QUESTION_LEN {
            return Err(Error::BadRequest(format!(
                "Question {} is longer than {} characters",
                idx + 1,
                MAX_QUESTION_LEN
            )));
        }
        if q.order_index < 0 {
            return Err(Error::BadRequest(format!(
                "Question {} has a negative order",
                idx + 1
            )));
        }

        let options = match q.field_type {
            FieldType::Select => {
                let mut seen = HashSet::new();
                let options: Vec<String> = q
                    .options
                    .iter()
                    .flatten()
                    .map(|o| o.trim())
                    .filter(|o| !o.is_empty() && seen.insert(o.to_string()))
                    .map(str::to_string)
                    .collect();
                if options.is_empty() {
                    return Err(Error::BadRequest(format!(
                        "Question {} is a select and needs at least one option",
                        idx + 1
                    )));
                }
                Some(options)
            }
            _ => None,
        };

        planned.push(QuestionPlan {
            question_text: text.to_string(),
            field_type: q.field_type,
            options,
            is_required: q.is_required,
            order_index: q.order_index,
        });
    }
    planned.sort_by_key(|q| q.order_index);
    Ok(planned)
}

/// Checks a candidate's answers against the job's form and returns the
/// normalized `(question_id, answer)` pairs worth storing.
pub fn check_answers(
    questions: &[ApplicationQuestion],
    answers: &[AnswerInput],
) -> Result<Vec<(Uuid, String)>> {
    let mut given: Vec<(&ApplicationQuestion, &str)> = Vec::with_capacity(answers.len());
    for answer in answers {
        let question = questions
            .iter()
            .find(|q| q.id == answer.question_id)
            .ok_or_else(|| {
                Error::BadRequest(format!(
                    "Question {} is not part of this job's form",
                    answer.question_id
                ))
            })?;
        if given.iter().any(|(q, _)| q.id == question.id) {
            return Err(Error::BadRequest(format!(
                "Question '{}' was answered twice",
                question.question_text
            )));
        }
        given.push((question, answer.answer.trim()));
    }

    let mut out = Vec::new();
    for question in questions {
        let field_type = FieldType::parse(&question.field_type)?;
        let raw = given
            .iter()
            .find(|(q, _)| q.id == question.id)
            .map(|(_, a)| *a)
            .filter(|a| !a.is_empty());

        let value = match (field_type, raw) {
            (_, None) => None,
            (FieldType::Boolean, Some(raw)) => Some(parse_flag(raw, question)?.to_string()),
            (FieldType::Select, Some(raw)) => {
                let allowed = question.options.as_deref().unwrap_or_default();
                if !allowed.iter().any(|o| o == raw) {
                    return Err(Error::BadRequest(format!(
                        "'{}' is not an option for '{}'",
                        raw, question.question_text
                    )));
                }
                Some(raw.to_string())
            }
            (FieldType::Text | FieldType::Textarea, Some(raw)) => {
                if raw.chars().count() > MAX_ANSWER_LEN {
                    return Err(Error::BadRequest(format!(
                        "Answer to '{}' is longer than {} characters",
                        question.question_text, MAX_ANSWER_LEN
                    )));
                }
                Some(raw.to_string())
            }
        };

        // a required checkbox has to be ticked
        let satisfied = match (field_type, value.as_deref()) {
            (_, None) => false,
            (FieldType::Boolean, Some(v)) => v == "true",
            _ => true,
        };
        if question.is_required && !satisfied {
            return Err(Error::BadRequest(format!(
                "'{}' is required",
                question.question_text
            )));
        }

        if let Some(value) = value {
            out.push((question.id, value));
        }
    }
    Ok(out)
}

fn parse_flag(raw: &str, question: &ApplicationQuestion) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => Err(Error::BadRequest(format!(
            "Answer to '{}' must be true or false",
            question.question_text
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn input(text: &str, field_type: FieldType, order_index: i32) -> QuestionInput {
        QuestionInput {
            question_text: text.into(),
            field_type,
            options: None,
            is_required: false,
            order_index,
        }
    }

    fn question(text: &str, field_type: &str, required: bool, options: Option<&[&str]>) -> ApplicationQuestion {
        ApplicationQuestion {
            id: Uuid::new_v4(),
            job_id: Uuid::nil(),
            question_text: text.into(),
            field_type: field_type.into(),
            options: options.map(|o| o.iter().map(|s| s.to_string()).collect()),
            is_required: required,
            order_index: 0,
            created_at: Utc::now(),
        }
    }

    fn answer(q: &ApplicationQuestion, value: &str) -> AnswerInput {
        AnswerInput {
            question_id: q.id,
            answer: value.into(),
        }
    }

    #[test]
    fn form_is_sorted_and_select_options_cleaned() {
        let mut notice = input("Notice period", FieldType::Select, 1);
        notice.options = Some(vec![" 15 days".into(), "".into(), "15 days".into(), "30 days".into()]);
        let plan = plan_form(&[notice, input("  Why us? ", FieldType::Textarea, 0)]).unwrap();

        assert_eq!(plan[0].question_text, "Why us?");
        assert_eq!(plan[0].options, None);
        assert_eq!(
            plan[1].options,
            Some(vec!["15 days".to_string(), "30 days".to_string()])
        );
    }

    #[test]
    fn malformed_forms_are_rejected() {
        assert!(plan_form(&[input("  ", FieldType::Text, 0)]).is_err());
        assert!(plan_form(&[input("Pick one", FieldType::Select, 0)]).is_err());
        assert!(plan_form(&[input("Age", FieldType::Text, -1)]).is_err());
        let many: Vec<_> = (0..=MAX_QUESTIONS as i32)
            .map(|i| input("Q", FieldType::Text, i))
            .collect();
        assert!(plan_form(&many).is_err());
        assert!(plan_form(&[]).unwrap().is_empty());
    }

    #[test]
    fn required_answers_must_be_present() {
        let why = question("Why us?", "textarea", true, None);
        let form = vec![why.clone()];
        assert!(check_answers(&form, &[]).is_err());
        assert!(check_answers(&form, &[answer(&why, "   ")]).is_err());
        assert_eq!(
            check_answers(&form, &[answer(&why, " Great team ")]).unwrap(),
            vec![(why.id, "Great team".to_string())]
        );
    }

    #[test]
    fn select_and_boolean_answers_are_checked() {
        let notice = question("Notice", "select", false, Some(&["15 days", "30 days"]));
        let consent = question("Consent", "boolean", true, None);
        let form = vec![notice.clone(), consent.clone()];

        assert!(check_answers(&form, &[answer(&notice, "90 days"), answer(&consent, "true")]).is_err());
        assert!(check_answers(&form, &[answer(&consent, "False")]).is_err());
        assert!(check_answers(&form, &[answer(&consent, "maybe")]).is_err());

        let stored = check_answers(&form, &[answer(&consent, "Yes"), answer(&notice, "30 days")]).unwrap();
        assert_eq!(
            stored,
            vec![
                (notice.id, "30 days".to_string()),
                (consent.id, "true".to_string())
            ]
        );
    }

    #[test]
    fn unknown_or_repeated_questions_are_rejected() {
        let why = question("Why us?", "text", false, None);
        let stray = question("Other job", "text", false, None);
        let form = vec![why.clone()];
        assert!(check_answers(&form, &[answer(&stray, "x")]).is_err());
        assert!(check_answers(&form, &[answer(&why, "a"), answer(&why, "b")]).is_err());
    }

    #[test]
    fn job_without_form_accepts_no_answers() {
        assert!(check_answers(&[], &[]).unwrap().is_empty());
    }
}
