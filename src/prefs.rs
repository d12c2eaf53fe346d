use crate::error::AuditError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Namespace for every preference this tool writes.
pub const FEATURE_KEY: &str = "tag_audit";
pub const ABBREVIATE_TAGS: &str = "abbreviate_tags";

/// Key-value persistence owned by the host.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), AuditError>;
}

fn scoped(key: &str) -> String {
    format!("{FEATURE_KEY}.{key}")
}

/// Display settings shared by every audit session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayPreferences {
    pub abbreviate_tags: bool,
}

impl DisplayPreferences {
    pub fn load<P: PreferenceStore + ?Sized>(store: &P) -> Self {
        let abbreviate_tags = store
            .get(&scoped(ABBREVIATE_TAGS))
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false);
        Self { abbreviate_tags }
    }

    pub fn save<P: PreferenceStore + ?Sized>(
        &self,
        store: &mut P,
    ) -> Result<(), AuditError> {
        store.set(&scoped(ABBREVIATE_TAGS), &self.abbreviate_tags.to_string())
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Preferences kept as `key: value` lines in one file. The file is re-read on
/// every access so concurrent sessions see the last write.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(dir: &Path) -> Self {
        Self { path: dir.join("prefs") }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        raw.lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect()
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AuditError> {
        let mut all = self.read_all();
        all.insert(key.to_string(), value.to_string());
        let content: String =
            all.iter().map(|(k, v)| format!("{k}: {v}\n")).collect();
        fs::write(&self.path, content).map_err(|err| {
            AuditError::PreferencePersist {
                key: key.to_string(),
                reason: err.to_string(),
            }
        })
    }
}

/// In-process preferences; `read_only` makes every write fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryPreferences {
    pub fn read_only() -> Self {
        Self { read_only: true, ..Self::default() }
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AuditError> {
        if self.read_only {
            return Err(AuditError::PreferencePersist {
                key: key.to_string(),
                reason: "store is read-only".to_string(),
            });
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
