use serde::{Deserialize, Serialize};

/// Output style requested from the OCR backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionMode {
    /// Layout-aware conversion to markdown.
    #[default]
    Markdown,
    /// Free OCR, plain text only.
    PlainText,
}

impl RecognitionMode {
    /// Value of the `mode` form field understood by the backend.
    pub fn wire_value(self) -> &'static str {
        match self {
            RecognitionMode::Markdown => "markdown",
            RecognitionMode::PlainText => "ocr",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecognitionMode::Markdown => "Markdown",
            RecognitionMode::PlainText => "Plain Text",
        }
    }

    /// File extension used when exporting a result produced in this mode.
    pub fn file_extension(self) -> &'static str {
        match self {
            RecognitionMode::Markdown => "md",
            RecognitionMode::PlainText => "txt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_markdown() {
        assert_eq!(RecognitionMode::default(), RecognitionMode::Markdown);
    }

    #[test]
    fn plain_text_maps_to_free_ocr_prompt() {
        assert_eq!(RecognitionMode::Markdown.wire_value(), "markdown");
        assert_eq!(RecognitionMode::PlainText.wire_value(), "ocr");
    }

    #[test]
    fn config_spelling_is_kebab_case() {
        let json = serde_json::to_string(&RecognitionMode::PlainText).unwrap();
        assert_eq!(json, "\"plain-text\"");
        let mode: RecognitionMode = serde_json::from_str("\"markdown\"").unwrap();
        assert_eq!(mode, RecognitionMode::Markdown);
    }
}
