//! FAQ entries shown in the about section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswerPair {
    pub id: String,
    pub question: String,
    pub answer: String,
    /// 0-based display position, dense across all entries
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswerInput {
    pub question: String,
    pub answer: String,
}
