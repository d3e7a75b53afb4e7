use super::notice::Notice;

/// Opaque reference to a preview allocated by a [`PreviewStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(pub u64);

/// Owner of preview resources derived from in-memory image bytes.
///
/// Every handle returned by `allocate` is passed to `release` exactly once.
pub trait PreviewStore {
    /// Returns `None` when no preview can be produced for the bytes.
    fn allocate(&mut self, name: &str, content: &[u8]) -> Option<PreviewHandle>;
    fn release(&mut self, handle: PreviewHandle);
}

/// The single image picked for recognition.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content: Vec<u8>,
    pub mime: &'static str,
    pub preview: Option<PreviewHandle>,
}

/// Holds at most one [`SelectedFile`] and the preview derived from it.
pub struct UploadManager<P> {
    previews: P,
    selected: Option<SelectedFile>,
}

impl<P: PreviewStore> UploadManager<P> {
    pub fn new(previews: P) -> Self {
        Self {
            previews,
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    /// Replace the current selection. Content that does not sniff as an image
    /// is rejected and the previous selection stays in place.
    pub fn select(&mut self, name: &str, content: Vec<u8>) -> Result<&SelectedFile, Notice> {
        let format = image::guess_format(&content).map_err(|_| {
            Notice::warning(format!("\"{name}\" is not a supported image file"))
        })?;

        self.release_current();
        let preview = self.previews.allocate(name, &content);
        if preview.is_none() {
            log::warn!("No preview available for {name}");
        }
        log::info!(
            "Selected {name} ({} bytes, {})",
            content.len(),
            format.to_mime_type()
        );

        Ok(&*self.selected.insert(SelectedFile {
            name: name.to_string(),
            content,
            mime: format.to_mime_type(),
            preview,
        }))
    }

    /// Drop the selection. Returns whether anything was selected.
    pub fn remove(&mut self) -> bool {
        let had_selection = self.selected.is_some();
        self.release_current();
        had_selection
    }

    fn release_current(&mut self) {
        if let Some(file) = self.selected.take() {
            if let Some(handle) = file.preview {
                self.previews.release(handle);
            }
        }
    }
}
