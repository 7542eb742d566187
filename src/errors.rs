pub use anyhow::Error;
pub use anyhow::Result;

use crate::{FileId, PageId, Rid};

// Conditions callers need to tell apart; recover them with `storage_error`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("file {0:?} already exists")]
    FileExists(String),
    #[error("file {0:?} not found")]
    FileNotFound(String),
    #[error("file {0:?} is still open")]
    FileOpen(String),
    #[error("invalid file name {0:?}")]
    InvalidFileName(String),
    #[error("file id {0} is not open")]
    FileNotOpen(FileId),
    #[error("bad scan parameter: {0}")]
    BadScanParameter(&'static str),
    #[error("invalid record length {0}")]
    InvalidRecordLength(usize),
    #[error("record {0:?} not found")]
    RecordNotFound(Rid),
    #[error("buffer pool exceeded: all frames pinned")]
    BufferExceeded,
    #[error("page {page_id} of file {file_id} is not pinned")]
    PageNotPinned { file_id: FileId, page_id: PageId },
    #[error("page {page_id} of file {file_id} is past end of file")]
    InvalidPage { file_id: FileId, page_id: PageId },
    #[error("no current page: scan is not positioned")]
    NoCurrentPage,
}

pub fn storage_error(err: &Error) -> Option<&StorageError> {
    err.downcast_ref::<StorageError>()
}
