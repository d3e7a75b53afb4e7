use crate::render::{render, Block};

use super::mode::RecognitionMode;

/// Recognized text and its rendered form. The rendered blocks are rebuilt
/// on every write, so they always match `raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognitionResult {
    raw: String,
    rendered: Vec<Block>,
    mode: Option<RecognitionMode>,
}

impl RecognitionResult {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn rendered(&self) -> &[Block] {
        &self.rendered
    }

    /// Mode of the submission that produced the text.
    pub fn mode(&self) -> Option<RecognitionMode> {
        self.mode
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn replace(&mut self, raw: String, mode: RecognitionMode) {
        self.rendered = render(&raw);
        self.raw = raw;
        self.mode = Some(mode);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
