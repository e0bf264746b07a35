//! The singleton PDF/email settings record edited by staff.

use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DeliveryConfig;
use crate::documents::{DEFAULT_PDF_TEMPLATE, DEFAULT_SUBJECT_LINE};
use crate::snapshot::{SnapshotError, SnapshotFile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfSettings {
    pub pdf_api_key: Option<String>,
    pub email_api_key: Option<String>,
    pub template_html: String,
    pub sender_name: String,
    pub sender_email: Option<String>,
    pub subject_line: String,
}

impl PdfSettings {
    /// Settings used before anything has been saved: stock templates plus configured credentials.
    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self {
            pdf_api_key: config.api2pdf_api_key.clone(),
            email_api_key: config.brevo_api_key.clone(),
            template_html: DEFAULT_PDF_TEMPLATE.to_string(),
            sender_name: config.sender_name.clone(),
            sender_email: config.sender_email.clone(),
            subject_line: DEFAULT_SUBJECT_LINE.to_string(),
        }
    }

    /// Applies the fields present in `update`. Blank keys clear the stored key.
    pub fn apply(&self, update: PdfSettingsUpdate) -> Result<Self, SettingsError> {
        let mut next = self.clone();

        if let Some(key) = update.pdf_api_key {
            next.pdf_api_key = non_blank(key);
        }
        if let Some(key) = update.email_api_key {
            next.email_api_key = non_blank(key);
        }
        if let Some(template) = update.template_html {
            if template.trim().is_empty() {
                return Err(SettingsError::EmptyTemplate);
            }
            next.template_html = template;
        }
        if let Some(name) = update.sender_name {
            next.sender_name = name.trim().to_string();
        }
        if let Some(email) = update.sender_email {
            next.sender_email = match non_blank(email) {
                Some(email) if !is_valid_email(&email) => {
                    return Err(SettingsError::InvalidSenderEmail(email))
                }
                other => other,
            };
        }
        if let Some(subject) = update.subject_line {
            if subject.trim().is_empty() {
                return Err(SettingsError::EmptySubject);
            }
            next.subject_line = subject;
        }

        Ok(next)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Partial update accepted by the settings-save operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdfSettingsUpdate {
    #[serde(default, alias = "api_key")]
    pub pdf_api_key: Option<String>,
    #[serde(default)]
    pub email_api_key: Option<String>,
    #[serde(default)]
    pub template_html: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub subject_line: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("template_html must not be empty")]
    EmptyTemplate,
    #[error("subject_line must not be empty")]
    EmptySubject,
    #[error("sender_email '{0}' is not a valid email address")]
    InvalidSenderEmail(String),
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// A deliberately small check: one `@`, a non-empty local part, and a dotted domain.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Persistence for the settings record. `update` applies a partial edit atomically, so two
/// concurrent edits are both kept and the stored copy always matches what is served.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<PdfSettings, SettingsError>;
    fn update(&self, update: PdfSettingsUpdate) -> Result<PdfSettings, SettingsError>;
}

#[derive(Debug)]
pub struct InMemorySettingsStore {
    settings: RwLock<PdfSettings>,
}

impl InMemorySettingsStore {
    pub fn new(settings: PdfSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Applies `update` under the write lock and runs `persist` before the new record is visible.
    fn update_with(
        &self,
        update: PdfSettingsUpdate,
        persist: impl FnOnce(&PdfSettings) -> Result<(), SettingsError>,
    ) -> Result<PdfSettings, SettingsError> {
        let mut guard = self
            .settings
            .write()
            .map_err(|_| SettingsError::Unavailable("settings lock poisoned".to_string()))?;
        let next = guard.apply(update)?;
        persist(&next)?;
        *guard = next.clone();
        Ok(next)
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self) -> Result<PdfSettings, SettingsError> {
        self.settings
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| SettingsError::Unavailable("settings lock poisoned".to_string()))
    }

    fn update(&self, update: PdfSettingsUpdate) -> Result<PdfSettings, SettingsError> {
        self.update_with(update, |_| Ok(()))
    }
}

/// Settings persisted as a JSON snapshot, falling back to `defaults` until first saved.
#[derive(Debug)]
pub struct FileSettingsStore {
    cache: InMemorySettingsStore,
    file: SnapshotFile,
}

impl FileSettingsStore {
    pub fn open(data_dir: &Path, defaults: PdfSettings) -> Result<Self, SettingsError> {
        let file = SnapshotFile::new(data_dir.join("pdf_settings.json"));
        let stored = file.read::<PdfSettings>()?;
        if stored.is_some() {
            info!(path = %file.path().display(), "loaded saved pdf settings");
        }

        Ok(Self {
            cache: InMemorySettingsStore::new(stored.unwrap_or(defaults)),
            file,
        })
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<PdfSettings, SettingsError> {
        self.cache.load()
    }

    fn update(&self, update: PdfSettingsUpdate) -> Result<PdfSettings, SettingsError> {
        self.cache
            .update_with(update, |next| Ok(self.file.write(next)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::scratch_dir;

    fn defaults() -> PdfSettings {
        PdfSettings::from_config(&DeliveryConfig {
            api2pdf_api_key: Some("pdf-key".to_string()),
            ..DeliveryConfig::default()
        })
    }

    #[test]
    fn defaults_use_stock_template_and_configured_keys() {
        let settings = defaults();
        assert_eq!(settings.pdf_api_key.as_deref(), Some("pdf-key"));
        assert!(settings.email_api_key.is_none());
        assert_eq!(settings.sender_name, "Bond Calculator");
        assert!(settings.template_html.contains("[TRANSFER_SECTION_START]"));
        assert_eq!(settings.subject_line, DEFAULT_SUBJECT_LINE);
    }

    #[test]
    fn apply_overwrites_only_present_fields() {
        let updated = defaults()
            .apply(PdfSettingsUpdate {
                email_api_key: Some("xkeysib-1".to_string()),
                pdf_api_key: Some("  ".to_string()),
                sender_email: Some("quotes@dvh.co.za".to_string()),
                ..PdfSettingsUpdate::default()
            })
            .expect("valid update");

        assert!(updated.pdf_api_key.is_none());
        assert_eq!(updated.email_api_key.as_deref(), Some("xkeysib-1"));
        assert_eq!(updated.sender_email.as_deref(), Some("quotes@dvh.co.za"));
        assert_eq!(updated.template_html, defaults().template_html);
    }

    #[test]
    fn apply_rejects_blank_template_and_bad_sender() {
        let blank = defaults().apply(PdfSettingsUpdate {
            template_html: Some("   ".to_string()),
            ..PdfSettingsUpdate::default()
        });
        assert!(matches!(blank, Err(SettingsError::EmptyTemplate)));

        let bad_sender = defaults().apply(PdfSettingsUpdate {
            sender_email: Some("not-an-email".to_string()),
            ..PdfSettingsUpdate::default()
        });
        assert!(matches!(bad_sender, Err(SettingsError::InvalidSenderEmail(_))));
    }

    #[test]
    fn legacy_api_key_field_maps_to_pdf_key() {
        let update: PdfSettingsUpdate =
            serde_json::from_str(r#"{"api_key":"legacy","template_html":"<p>[TOTAL]</p>"}"#)
                .expect("decode");
        assert_eq!(update.pdf_api_key.as_deref(), Some("legacy"));
    }

    #[test]
    fn email_validation_covers_common_mistakes() {
        assert!(is_valid_email("test@udit.co.za"));
        assert!(is_valid_email("first.last+quotes@example.com"));
        assert!(!is_valid_email("missing-at.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email("user@.example.com"));
    }

    #[test]
    fn file_store_persists_saved_settings() {
        let dir = scratch_dir("settings");
        let store = FileSettingsStore::open(&dir, defaults()).expect("open");
        assert_eq!(store.load().expect("load"), defaults());

        let saved = store
            .update(PdfSettingsUpdate {
                sender_name: Some("DVH Conveyancing".to_string()),
                ..PdfSettingsUpdate::default()
            })
            .expect("save");
        assert_eq!(saved.sender_name, "DVH Conveyancing");

        let reopened = FileSettingsStore::open(&dir, defaults()).expect("reopen");
        assert_eq!(reopened.load().expect("load"), saved);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn rejected_update_leaves_the_stored_settings_alone() {
        let dir = scratch_dir("settings-rejected");
        let store = FileSettingsStore::open(&dir, defaults()).expect("open");
        let result = store.update(PdfSettingsUpdate {
            sender_name: Some("Changed".to_string()),
            template_html: Some(String::new()),
            ..PdfSettingsUpdate::default()
        });

        assert!(matches!(result, Err(SettingsError::EmptyTemplate)));
        assert_eq!(store.load().expect("load"), defaults());
        assert!(!dir.join("pdf_settings.json").exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn concurrent_partial_updates_are_both_kept() {
        let dir = scratch_dir("settings-concurrent");
        let store = FileSettingsStore::open(&dir, defaults()).expect("open");

        for round in 0..50 {
            let name = format!("Firm {round}");
            let email = format!("quotes{round}@firm.co.za");
            std::thread::scope(|scope| {
                let first = scope.spawn(|| {
                    store.update(PdfSettingsUpdate {
                        sender_name: Some(name.clone()),
                        ..PdfSettingsUpdate::default()
                    })
                });
                let second = scope.spawn(|| {
                    store.update(PdfSettingsUpdate {
                        sender_email: Some(email.clone()),
                        ..PdfSettingsUpdate::default()
                    })
                });
                first.join().expect("first writer").expect("first update");
                second.join().expect("second writer").expect("second update");
            });

            let served = store.load().expect("load");
            assert_eq!(served.sender_name, name);
            assert_eq!(served.sender_email.as_deref(), Some(email.as_str()));
            let reopened = FileSettingsStore::open(&dir, defaults()).expect("reopen");
            assert_eq!(reopened.load().expect("load"), served);
        }
        let _ = std::fs::remove_dir_all(dir);
    }
}
