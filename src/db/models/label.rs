//! Label-related data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LABEL_COLOR: &str = "#7a7777";

/// A named, colored tag attachable to tickets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub color: String,
    /// Whether submitters can pick this label on the public form
    pub form_label: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelInput {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub form_label: bool,
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub form_label: Option<bool>,
}

impl LabelUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.form_label.is_none()
    }
}

pub mod validation {
    use anyhow::{bail, Result};

    const MAX_NAME_LENGTH: usize = 64;

    pub fn validate_color(color: &str) -> Result<()> {
        let Some(hex_part) = color.strip_prefix('#') else {
            bail!("Invalid color format. Must be hex (#RRGGBB)");
        };

        if hex_part.len() != 6 && hex_part.len() != 8 {
            bail!("Invalid color format. Must be hex (#RRGGBB or #RRGGBBAA)");
        }

        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("Invalid color format. Must be hex (#RRGGBB)");
        }

        Ok(())
    }

    pub fn validate_name(name: &str) -> Result<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            bail!("Label name must not be empty");
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            bail!("Label name too long (max {MAX_NAME_LENGTH} chars)");
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn accepts_rgb_and_rgba_hex() {
            assert!(validate_color("#7a7777").is_ok());
            assert!(validate_color("#A1869EFF").is_ok());
        }

        #[test]
        fn rejects_malformed_colors() {
            assert!(validate_color("7a7777").is_err());
            assert!(validate_color("#7a77").is_err());
            assert!(validate_color("#zzzzzz").is_err());
        }

        #[test]
        fn rejects_blank_names() {
            assert!(validate_name("   ").is_err());
            assert!(validate_name("fachschaft").is_ok());
        }
    }
}
