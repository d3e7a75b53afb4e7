//! The OCR workflow as plain state: one selected image, one mode, one result.
//!
//! Every user action is a method on [`Session`] and returns the [`Notice`]
//! the user should see (if any). The window re-renders from the session after
//! each call; nothing here touches GTK.

mod mode;
mod notice;
mod result;
mod submission;
mod upload;

pub use mode::RecognitionMode;
pub use notice::{Notice, NoticeLevel};
use result::RecognitionResult;
use upload::{SelectedFile, UploadManager};
pub use upload::{PreviewHandle, PreviewStore};

#[cfg(test)]
pub(crate) use upload::tests as upload_fixtures;

use crate::clipboard::Clipboard;

pub struct Session<P> {
    uploads: UploadManager<P>,
    mode: RecognitionMode,
    result: RecognitionResult,
    /// Outstanding submissions. Overlapping submits are possible, so the
    /// in-flight flag stays up until the last of them completes.
    pending: usize,
}

impl<P: PreviewStore> Session<P> {
    pub fn new(previews: P, mode: RecognitionMode) -> Self {
        Self {
            uploads: UploadManager::new(previews),
            mode,
            result: RecognitionResult::default(),
            pending: 0,
        }
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.uploads.selected()
    }

    pub fn previews(&self) -> &P {
        self.uploads.previews()
    }

    pub fn mode(&self) -> RecognitionMode {
        self.mode
    }

    pub fn result(&self) -> &RecognitionResult {
        &self.result
    }

    pub fn is_in_flight(&self) -> bool {
        self.pending > 0
    }

    /// Pick a new image. A rejected file leaves the session untouched.
    pub fn select_file(&mut self, name: &str, content: Vec<u8>) -> Option<Notice> {
        match self.uploads.select(name, content) {
            Ok(_) => {
                self.result.clear();
                None
            }
            Err(notice) => Some(notice),
        }
    }

    pub fn remove_file(&mut self) {
        if self.uploads.remove() {
            log::info!("Selection cleared");
        }
        self.result.clear();
    }

    pub fn set_mode(&mut self, mode: RecognitionMode) {
        if self.mode != mode {
            log::info!("Recognition mode set to {}", mode.wire_value());
            self.mode = mode;
        }
    }

    /// Copy the raw result. Empty results are a silent no-op.
    pub fn copy_result(&self, clipboard: &dyn Clipboard) -> Option<Notice> {
        if self.result.is_empty() {
            return None;
        }
        let notice = match clipboard.copy(self.result.raw()) {
            Ok(()) => Notice::success("Copied to clipboard"),
            Err(e) => Notice::error(format!("Copy failed: {e}")),
        };
        Some(notice)
    }
}
