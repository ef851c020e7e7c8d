//! Questionnaire flow: a cursor over the fixed question list plus an answers
//! buffer, one slot per question.

use crate::model::Question;

pub struct Questionnaire {
    questions: Vec<Question>,
    cursor: usize,
    answers: Vec<String>,
    /// Live input buffer for the question under the cursor.
    pub input: String,
}

/// Outcome of committing the current input and advancing.
#[derive(Debug, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question.
    Next,
    /// Was on the last question; the full answers vector is the submission.
    Submitted(Vec<String>),
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Self {
        let answers = vec![String::new(); questions.len()];
        Self {
            questions,
            cursor: 0,
            answers,
            input: String::new(),
        }
    }

    pub fn current(&self) -> &Question {
        &self.questions[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.questions.len()
    }

    /// Percent of questions completed before the cursor.
    pub fn progress(&self) -> f64 {
        (self.cursor as f64 / self.questions.len() as f64) * 100.0
    }

    /// Commit the input buffer into the answer slot at the cursor, then either
    /// move forward (preloading the input with any previously entered answer)
    /// or, on the last question, emit the full answers vector.
    ///
    /// Empty answers are allowed; the flow performs no content validation.
    pub fn advance(&mut self) -> Advance {
        self.answers[self.cursor] = std::mem::take(&mut self.input);
        if self.cursor + 1 == self.questions.len() {
            let answers = self.answers.clone();
            self.input = self.answers[self.cursor].clone();
            Advance::Submitted(answers)
        } else {
            self.cursor += 1;
            self.input = self.answers[self.cursor].clone();
            Advance::Next
        }
    }

    /// Move the cursor backward if not at the first question. The current
    /// input is committed first so nothing typed is lost on the way back.
    pub fn back(&mut self) {
        if self.cursor > 0 {
            self.answers[self.cursor] = std::mem::take(&mut self.input);
            self.cursor -= 1;
            self.input = self.answers[self.cursor].clone();
        }
    }
}
