use crate::{
    db::models::{Label, LabelInput, LabelUpdate},
    AppState,
};

pub async fn create_label(state: &AppState, input: LabelInput) -> Result<Label, String> {
    let db = &state.db;
    db.create_label(input).await.map_err(|e| e.to_string())
}

pub async fn get_labels(state: &AppState) -> Result<Vec<Label>, String> {
    let db = &state.db;
    db.get_labels().await.map_err(|e| e.to_string())
}

/// Labels for the public submission form
pub async fn get_form_labels(state: &AppState) -> Result<Vec<Label>, String> {
    let db = &state.db;
    db.get_form_labels().await.map_err(|e| e.to_string())
}

pub async fn update_label(
    state: &AppState,
    label_id: i64,
    update: LabelUpdate,
) -> Result<Label, String> {
    let db = &state.db;
    db.update_label(label_id, update)
        .await
        .map_err(|e| e.to_string())
}

pub async fn delete_label(state: &AppState, label_id: i64) -> Result<(), String> {
    let db = &state.db;
    db.delete_label(label_id).await.map_err(|e| e.to_string())
}
