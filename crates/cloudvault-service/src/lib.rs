//! # cloudvault-service
//!
//! Drive operations over the node tree. Each service receives its
//! collaborators at construction time as `Arc` handles; [`DriveService`]
//! bundles them into the full operation surface.
//!
//! Every mutation is authorized once, at the node named in the request, by
//! the [`AccessResolver`](cloudvault_auth::AccessResolver). Subtree work is
//! then carried out by the [`CascadeEngine`] without re-checking
//! descendants.

pub mod cascade;
pub mod context;
pub mod drive;
pub mod file;
pub mod folder;
pub mod node;
pub mod share;
pub mod storage;
pub mod trash;

pub use cascade::{CascadeEngine, CascadeReport, ExportEntry};
pub use context::RequestContext;
pub use drive::DriveService;
pub use file::{DownloadService, UploadService, ZipExport};
pub use folder::{FolderListing, FolderService};
pub use node::NodeService;
pub use share::{ShareService, SharedListing};
pub use storage::StorageService;
pub use trash::{SweepReport, TrashListing, TrashService, TrashSweeper};
