//! Application shell for SVGEO documents: the interactive viewer plus its
//! platform collaborators (clipboard, file saving, clock, notices, events).

pub mod clipboard;
pub mod clock;
pub mod download;
pub mod events;
pub mod notify;
pub mod viewer;

pub use clipboard::{ArboardClipboard, ClipboardPayload, ClipboardWriter, MemoryClipboard};
pub use clock::{Clock, ManualClock, SystemClock};
pub use download::{DialogDownloader, FileDownloader, FsDownloader, MemoryDownloader};
pub use events::{EventBus, HandlerId};
pub use notify::{Notice, NoticeKind, NotificationCenter};
pub use viewer::{
    ExportKind, GeoViewer, LayerInfo, LayerState, RasterImage, Rasterizer, ViewerOptions,
};
