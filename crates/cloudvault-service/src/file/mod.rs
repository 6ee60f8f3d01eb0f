//! File upload, download and archive export.

pub mod download;
pub mod upload;

pub use download::{DownloadService, ZipExport};
pub use upload::UploadService;
