mod buffer;
pub mod errors;
mod heap;
mod storage;

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate slog;
extern crate slog_async;
extern crate slog_term;

pub use self::buffer::buffer_pool_manager::{BufferPoolManager, SharedBufferPool};
pub use self::buffer::clock_replacer::ClockReplacer;
pub use self::buffer::replace::Replacer;
pub use self::heap::heap_file::{create_heap_file, destroy_heap_file, HeapFile};
pub use self::heap::heap_file_scan::{HeapFileScan, ScanIter};
pub use self::heap::insert_file_scan::InsertFileScan;
pub use self::heap::predicate::{Datatype, Operator, ScanPredicate};
pub use self::storage::disk::disk_manager;
pub use self::storage::disk::disk_manager::DiskManager;
pub use self::storage::page::file_header_page::FileHeaderPage;
pub use self::storage::page::table_page::{DP_FIXED, MAX_RECORD_LEN};
pub use self::storage::page::Page;

pub fn default_logger() -> slog::Logger {
    use slog::Drain;

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    slog::Logger::root(drain, o!())
}

pub const PAGE_SIZE: usize = 4096;
// Page 0 of every file is reserved for file metadata, so 0 doubles as "no page".
pub const INVALID_PAGE_ID: PageId = 0;
pub const MAX_NAME_SIZE: usize = 50;

pub type FrameId = u32;
pub type PageId = u32; // modify it will break `FileHeaderPage` and the data page layout
pub type FileId = u32;
pub type SlotId = u16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rid {
    pub page_no: PageId,
    pub slot_no: SlotId,
}

impl Rid {
    pub fn new(page_no: PageId, slot_no: SlotId) -> Self {
        Self { page_no, slot_no }
    }
}

#[cfg(test)]
pub(crate) fn test_buffer_pool(
    dir: &std::path::Path,
    pool_size: usize,
) -> errors::Result<SharedBufferPool> {
    use std::cell::RefCell;
    use std::rc::Rc;

    let logger = default_logger();
    let disk_manager = DiskManager::new(dir, &logger)?;
    Ok(Rc::new(RefCell::new(BufferPoolManager::new(
        pool_size,
        disk_manager,
        &logger,
    ))))
}
