use crate::{
    db::models::{QuestionAnswerInput, QuestionAnswerPair},
    AppState,
};

pub async fn get_qaps(state: &AppState) -> Result<Vec<QuestionAnswerPair>, String> {
    state.db.get_qaps().await.map_err(|e| e.to_string())
}

pub async fn create_qap(
    state: &AppState,
    input: QuestionAnswerInput,
) -> Result<QuestionAnswerPair, String> {
    state.db.create_qap(input).await.map_err(|e| e.to_string())
}

pub async fn update_qap(
    state: &AppState,
    qap_id: String,
    input: QuestionAnswerInput,
) -> Result<QuestionAnswerPair, String> {
    state
        .db
        .update_qap(&qap_id, input)
        .await
        .map_err(|e| e.to_string())
}

pub async fn delete_qap(state: &AppState, qap_id: String) -> Result<(), String> {
    state.db.delete_qap(&qap_id).await.map_err(|e| e.to_string())
}

/// Drag-and-drop reorder from the FAQ page
pub async fn move_qap(
    state: &AppState,
    qap_id: String,
    new_index: i64,
) -> Result<Vec<QuestionAnswerPair>, String> {
    state
        .db
        .move_qap(&qap_id, new_index)
        .await
        .map_err(|e| e.to_string())
}
