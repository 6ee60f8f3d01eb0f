//! File download and zip export.

use std::io::{Cursor, Write};
use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use cloudvault_auth::{AccessResolver, Operation};
use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::{BlobStore, ByteStream};
use cloudvault_core::types::FileId;
use cloudvault_database::store::TreeStore;
use cloudvault_entity::file::File;
use cloudvault_entity::node::{Node, NodeId};

use crate::cascade::{CascadeEngine, ExportEntry};
use crate::context::RequestContext;
use crate::node::lookup::load_live_node;

/// A finished archive.
#[derive(Debug, Clone)]
pub struct ZipExport {
    /// Suggested archive file name.
    pub file_name: String,
    /// Number of files written.
    pub file_count: usize,
    /// Archive bytes.
    pub data: Bytes,
}

/// Serves file content and archives.
#[derive(Clone)]
pub struct DownloadService {
    tree: TreeStore,
    blobs: Arc<dyn BlobStore>,
    resolver: AccessResolver,
    cascade: CascadeEngine,
}

impl std::fmt::Debug for DownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadService").finish()
    }
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        tree: TreeStore,
        blobs: Arc<dyn BlobStore>,
        resolver: AccessResolver,
        cascade: CascadeEngine,
    ) -> Self {
        Self {
            tree,
            blobs,
            resolver,
            cascade,
        }
    }

    /// Opens a live file for reading.
    pub async fn open_file(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
    ) -> AppResult<(File, ByteStream)> {
        let file = self.readable_file(ctx, file_id).await?;
        let stream = self.blobs.open_read(&file.content_handle).await?;
        Ok((file, stream))
    }

    /// Zips a file, or a folder's readable live subtree.
    pub async fn export_zip(&self, ctx: &RequestContext, id: NodeId) -> AppResult<ZipExport> {
        let node = load_live_node(&self.tree, id).await?;
        self.resolver
            .require(ctx.user_id, &node, &Operation::Read)
            .await?;
        let base = node.name().to_string();

        let entries = match node {
            Node::File(file) => vec![ExportEntry::File {
                path: file.name.clone(),
                file,
            }],
            Node::Folder(folder) => self.cascade.export_entries(&folder, ctx.user_id).await?,
        };

        let mut contents = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                ExportEntry::Directory { path } => contents.push((path, None)),
                ExportEntry::File { path, file } => {
                    let data = self.blobs.read_bytes(&file.content_handle).await?;
                    contents.push((path, Some(data)));
                }
            }
        }

        let file_count = contents.iter().filter(|(_, d)| d.is_some()).count();
        let data = write_archive(&contents)?;

        info!(
            user_id = %ctx.user_id,
            node = %id,
            files = file_count,
            bytes = data.len(),
            "Zip export created"
        );

        Ok(ZipExport {
            file_name: format!("{base}.zip"),
            file_count,
            data: Bytes::from(data),
        })
    }

    async fn readable_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        let node = load_live_node(&self.tree, file_id.into()).await?;
        self.resolver
            .require(ctx.user_id, &node, &Operation::Read)
            .await?;
        match node {
            Node::File(file) => Ok(file),
            Node::Folder(_) => Err(AppError::internal("File lookup returned a folder")),
        }
    }
}

fn zip_error(e: zip::result::ZipError) -> AppError {
    AppError::with_source(ErrorKind::Internal, "Failed to write zip archive", e)
}

fn write_archive(contents: &[(String, Option<Bytes>)]) -> AppResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (path, data) in contents {
        match data {
            None => zip.add_directory(path.as_str(), options).map_err(zip_error)?,
            Some(data) => {
                zip.start_file(path.as_str(), options).map_err(zip_error)?;
                zip.write_all(data).map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Failed to write zip entry", e)
                })?;
            }
        }
    }

    Ok(zip.finish().map_err(zip_error)?.into_inner())
}
