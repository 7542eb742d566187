pub mod file_header_page;
pub mod table_page;

#[cfg(test)]
mod file_header_page_test;

use crate::{FileId, PageId, INVALID_PAGE_ID, PAGE_SIZE};

#[derive(Debug)]
pub struct Page {
    data: [u8; PAGE_SIZE],
    file_id: FileId,
    page_id: PageId,
    pin_count: u32,
    is_dirty: bool,
}

impl Page {
    pub fn new(file_id: FileId, page_id: PageId) -> Self {
        Self {
            data: [0; PAGE_SIZE],
            file_id,
            page_id,
            pin_count: 0,
            is_dirty: false,
        }
    }
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }
    pub fn get_data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
    pub fn get_file_id(&self) -> FileId {
        self.file_id
    }
    pub fn get_id(&self) -> PageId {
        self.page_id
    }
    pub fn get_pin_count(&self) -> u32 {
        self.pin_count
    }
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub(crate) fn reset(&mut self, file_id: FileId, page_id: PageId) {
        self.data = [0; PAGE_SIZE];
        self.file_id = file_id;
        self.page_id = page_id;
        self.pin_count = 0;
        self.is_dirty = false;
    }
    pub(crate) fn pin(&mut self) {
        self.pin_count += 1;
    }
    pub(crate) fn unpin(&mut self) {
        self.pin_count -= 1;
    }
    pub(crate) fn mark_dirty(&mut self, dirty: bool) {
        self.is_dirty = dirty;
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, INVALID_PAGE_ID)
    }
}
