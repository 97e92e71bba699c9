use serde_json::Value;

use crate::db::{question_type, Question};

/// Decides whether a submitted answer is correct for a question. Pure
/// comparison, no side effects.
///
/// Correct-answer encodings are heterogeneous (authored over several
/// client generations), so each type tolerates both the canonical encoding
/// and the legacy one: choice answers may be stored as an option index
/// while the client submits the option text, true/false may be stored as
/// 0/1, and multiple-select may be stored as an index array.
pub fn is_correct(question: &Question, submitted: &Value) -> bool {
    let Some(correct) = question.correct_answer.as_ref() else {
        return false;
    };

    match question.question_type.as_str() {
        question_type::SINGLE_CHOICE | question_type::MULTIPLE_CHOICE => {
            grade_choice(question, correct, submitted)
        }
        question_type::MULTIPLE_SELECT => grade_multiple_select(question, correct, submitted),
        question_type::TRUE_FALSE => grade_true_false(correct, submitted),
        question_type::FILL_IN_BLANK | question_type::SHORT_ANSWER => {
            grade_text(correct, submitted)
        }
        // Essays require manual grading; unknown types never auto-grade.
        question_type::ESSAY => false,
        _ => false,
    }
}

fn grade_choice(question: &Question, correct: &Value, submitted: &Value) -> bool {
    if let (Some(index), Some(text)) = (correct.as_u64(), submitted.as_str()) {
        return question
            .options
            .as_ref()
            .and_then(|options| options.get(index as usize))
            .map(|option| option == text)
            .unwrap_or(false);
    }
    correct == submitted
}

fn grade_multiple_select(question: &Question, correct: &Value, submitted: &Value) -> bool {
    let (Some(correct_items), Some(submitted_items)) = (correct.as_array(), submitted.as_array())
    else {
        return false;
    };

    // Index array against text array: resolve the indices through the
    // option list first.
    let stored_as_indices =
        !correct_items.is_empty() && correct_items.iter().all(|item| item.as_u64().is_some());
    let submitted_as_text = submitted_items.iter().all(|item| item.is_string());

    if stored_as_indices && submitted_as_text {
        let Some(options) = question.options.as_ref() else {
            return false;
        };
        let mut expected: Vec<String> = Vec::with_capacity(correct_items.len());
        for item in correct_items {
            match item.as_u64().and_then(|i| options.get(i as usize)) {
                Some(option) => expected.push(option.clone()),
                None => return false,
            }
        }
        let mut given: Vec<String> = submitted_items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect();
        expected.sort();
        given.sort();
        return expected == given;
    }

    // Same-typed arrays: order-independent, duplicate-sensitive equality
    // over serialized elements.
    let mut expected: Vec<String> = correct_items.iter().map(|item| item.to_string()).collect();
    let mut given: Vec<String> = submitted_items.iter().map(|item| item.to_string()).collect();
    expected.sort();
    given.sort();
    expected == given
}

fn grade_true_false(correct: &Value, submitted: &Value) -> bool {
    if let (Some(number), Some(answer)) = (correct.as_i64(), submitted.as_bool()) {
        return (number == 1) == answer;
    }
    correct == submitted
}

fn grade_text(correct: &Value, submitted: &Value) -> bool {
    match (correct.as_str(), submitted.as_str()) {
        (Some(expected), Some(given)) => {
            expected.trim().to_lowercase() == given.trim().to_lowercase()
        }
        _ => false,
    }
}
