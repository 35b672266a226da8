use crate::{settings::AppSettings, AppState};

pub fn get_app_settings(state: &AppState) -> AppSettings {
    state.settings.get()
}

pub fn set_app_settings(state: &AppState, settings: AppSettings) -> Result<AppSettings, String> {
    state.settings.update(settings).map_err(|e| e.to_string())
}
