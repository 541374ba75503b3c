use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::ContentError;

/// Which name a flashcard shows on its front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Brand,
    Generic,
}

impl Side {
    /// Label for the name printed on the back of the card.
    pub fn answer_label(self) -> &'static str {
        match self {
            Side::Brand => "Generic Name",
            Side::Generic => "Brand Name",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Brand => f.write_str("Brand"),
            Side::Generic => f.write_str("Generic"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub term: String,
    #[serde(rename = "type")]
    pub side: Side,
    pub answer: String,
    pub drug_class: String,
    pub indication: String,
    #[serde(default)]
    pub generic_name: String,
}

pub const QUIZ_OPTION_COUNT: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    #[serde(default)]
    pub subject_drug: String,
}

impl QuizQuestion {
    /// Rejects questions that can't be answered as presented.
    pub fn validate(self) -> Result<Self, ContentError> {
        if self.options.len() != QUIZ_OPTION_COUNT {
            return Err(ContentError::Malformed(format!(
                "expected {QUIZ_OPTION_COUNT} options, got {}",
                self.options.len()
            )));
        }
        if self.correct_index().is_none() {
            return Err(ContentError::Malformed(format!(
                "correct answer {:?} is not one of the options",
                self.correct_answer
            )));
        }
        Ok(self)
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|option| *option == self.correct_answer)
    }

    pub fn is_correct(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|option| *option == self.correct_answer)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailSheet {
    pub brand_name: String,
    pub generic_name: String,
    pub drug_class: String,
    pub indication: String,
    pub side_effects: Vec<String>,
    pub schedule: String,
}
