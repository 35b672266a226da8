//! App-wide settings edited from the admin panel: footer links and the text
//! of the about section. Persisted as a JSON file next to the database.

use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

const DEFAULT_CONTACT_LINK: &str = "https://mathphys.stura.uni-heidelberg.de/kontakt/";
const DEFAULT_LEGAL_NOTICE_LINK: &str = "https://mathphys.stura.uni-heidelberg.de/";
const DEFAULT_ABOUT_TEXT: &str = "Der Kummerkasten ist das Feedbacksammlungssystem der Fachschaft. \
Er hilft bei Problemen in Vorlesungen und bei Problemen mit anderen Institutionen, denen \
Studierende im Unialltag begegnen.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub footer_contact_link: String,
    pub footer_legal_notice_link: String,
    pub about_section_text: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            footer_contact_link: DEFAULT_CONTACT_LINK.into(),
            footer_legal_notice_link: DEFAULT_LEGAL_NOTICE_LINK.into(),
            about_section_text: DEFAULT_ABOUT_TEXT.into(),
        }
    }
}

impl AppSettings {
    fn validate(&self) -> Result<()> {
        for (field, link) in [
            ("footerContactLink", &self.footer_contact_link),
            ("footerLegalNoticeLink", &self.footer_legal_notice_link),
        ] {
            if !(link.starts_with("https://") || link.starts_with("http://")) {
                bail!("{field} must be an http(s) URL");
            }
        }
        Ok(())
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring unreadable settings file {}: {err}",
                    path.display()
                );
                AppSettings::default()
            })
        } else {
            AppSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> AppSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update(&self, settings: AppSettings) -> Result<AppSettings> {
        settings.validate()?;
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        self.persist(&settings)?;
        *guard = settings.clone();
        Ok(settings)
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
