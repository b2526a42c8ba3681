//! Clipboard collaborator: multi-format payloads with graceful downgrade.

use svgeo_core::ExportError;

/// One clipboard representation, richest first in a write request.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardPayload {
    /// Raw RGBA pixels.
    Image {
        width: usize,
        height: usize,
        rgba: Vec<u8>,
    },
    /// Styled markup plus its plain-text alternate, written as one entry.
    Html { html: String, alt_text: String },
    /// Escape-coded rich text; not every platform clipboard has a slot for
    /// it, in which case the writer falls through to the next payload.
    Rtf(String),
    Text(String),
}

impl ClipboardPayload {
    fn kind(&self) -> &'static str {
        match self {
            Self::Image { .. } => "image",
            Self::Html { .. } => "html",
            Self::Rtf(_) => "rtf",
            Self::Text(_) => "text",
        }
    }
}

/// Writes the richest supported payload from an ordered list, degrading to
/// plainer representations rather than aborting.
pub trait ClipboardWriter {
    fn write(&mut self, payloads: &[ClipboardPayload]) -> Result<(), ExportError>;
}

/// Native clipboard via arboard. A fresh handle per write: holding one open
/// keeps the selection owned on some platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArboardClipboard;

impl ClipboardWriter for ArboardClipboard {
    fn write(&mut self, payloads: &[ClipboardPayload]) -> Result<(), ExportError> {
        if payloads.is_empty() {
            return Err(ExportError::Empty);
        }
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;

        let mut last_err = None;
        for payload in payloads {
            let result = match payload {
                ClipboardPayload::Image {
                    width,
                    height,
                    rgba,
                } => clipboard.set_image(arboard::ImageData {
                    width: *width,
                    height: *height,
                    bytes: std::borrow::Cow::Borrowed(rgba),
                }),
                ClipboardPayload::Html { html, alt_text } => {
                    clipboard.set_html(html, Some(alt_text))
                }
                ClipboardPayload::Rtf(_) => {
                    log::debug!("platform clipboard has no RTF slot, downgrading");
                    continue;
                }
                ClipboardPayload::Text(text) => clipboard.set_text(text),
            };
            match result {
                Ok(()) => return Ok(()),
                Err(e) => {
                    log::warn!("clipboard write failed ({} tier): {e}, downgrading", payload.kind());
                    last_err = Some(e);
                }
            }
        }
        Err(ExportError::Clipboard(
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no writable payload".to_string()),
        ))
    }
}

/// Shared handles stay usable after being boxed into a viewer.
impl<W: ClipboardWriter> ClipboardWriter for std::rc::Rc<std::cell::RefCell<W>> {
    fn write(&mut self, payloads: &[ClipboardPayload]) -> Result<(), ExportError> {
        self.borrow_mut().write(payloads)
    }
}

/// In-memory writer for tests and headless use; records every request.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub writes: Vec<Vec<ClipboardPayload>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&[ClipboardPayload]> {
        self.writes.last().map(Vec::as_slice)
    }
}

impl ClipboardWriter for MemoryClipboard {
    fn write(&mut self, payloads: &[ClipboardPayload]) -> Result<(), ExportError> {
        if payloads.is_empty() {
            return Err(ExportError::Empty);
        }
        self.writes.push(payloads.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_records_writes() {
        let mut clipboard = MemoryClipboard::new();
        clipboard
            .write(&[ClipboardPayload::Text("hello".to_string())])
            .unwrap();
        assert_eq!(
            clipboard.last(),
            Some(&[ClipboardPayload::Text("hello".to_string())][..])
        );
    }

    #[test]
    fn test_empty_write_is_an_error() {
        let mut clipboard = MemoryClipboard::new();
        assert!(matches!(clipboard.write(&[]), Err(ExportError::Empty)));
    }
}
