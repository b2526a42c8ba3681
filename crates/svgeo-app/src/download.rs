//! File-save collaborator and PNG encoding for image exports.

use std::path::PathBuf;
use svgeo_core::ExportError;

/// Accepts (filename, MIME type, payload) and triggers a save.
pub trait FileDownloader {
    fn save(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> Result<(), ExportError>;
}

/// Writes into a fixed directory, for headless/CLI use.
#[derive(Debug, Clone)]
pub struct FsDownloader {
    pub dir: PathBuf,
}

impl FsDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileDownloader for FsDownloader {
    fn save(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> Result<(), ExportError> {
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes).map_err(|e| ExportError::Io(e.to_string()))?;
        log::info!("saved {mime} export to {path:?}");
        Ok(())
    }
}

/// Prompts with a native save dialog. Cancelling the dialog is not an
/// error, just a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogDownloader;

impl FileDownloader for DialogDownloader {
    fn save(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> Result<(), ExportError> {
        let dialog = rfd::FileDialog::new()
            .set_title("Save export")
            .set_file_name(filename);

        match dialog.save_file() {
            Some(path) => {
                std::fs::write(&path, bytes).map_err(|e| ExportError::Io(e.to_string()))?;
                log::info!("saved {mime} export to {path:?}");
                Ok(())
            }
            None => {
                log::info!("save dialog cancelled");
                Ok(())
            }
        }
    }
}

/// Shared handles stay usable after being boxed into a viewer.
impl<D: FileDownloader> FileDownloader for std::rc::Rc<std::cell::RefCell<D>> {
    fn save(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> Result<(), ExportError> {
        self.borrow_mut().save(filename, mime, bytes)
    }
}

/// Records saves in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryDownloader {
    pub saved: Vec<(String, String, Vec<u8>)>,
}

impl MemoryDownloader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileDownloader for MemoryDownloader {
    fn save(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> Result<(), ExportError> {
        self.saved
            .push((filename.to_string(), mime.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Encode an RGBA buffer as PNG.
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }
    Ok(out)
}
