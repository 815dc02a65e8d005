use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter};

/// User-facing message surfaced by the dashboard's toast area.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: String, // "default" or "destructive"
}

impl Notice {
    pub fn validation_error(description: &str) -> Self {
        Notice {
            title: "Validation Error".to_string(),
            description: description.to_string(),
            variant: "destructive".to_string(),
        }
    }
}

/// Fire-and-forget notification collaborator. No return value is
/// consumed by callers; delivery failure is swallowed and logged.
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

impl Notifier for AppHandle {
    fn notify(&self, notice: &Notice) {
        if let Err(e) = self.emit("notice", notice) {
            log::warn!("failed to emit notice '{}': {}", notice.title, e);
        }
    }
}
