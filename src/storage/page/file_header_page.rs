use crate::{PageId, MAX_NAME_SIZE};

/**
 *
 * Header Page for a heap file.
 *
 * Header format (size in byte, 68 bytes in total):
 * ------------------------------------------------------------------------------------------
 * | FileName (50) | (2) | FirstPage (4) | LastPage (4) | PageCnt (4) | RecCnt (4)
 * ------------------------------------------------------------------------------------------
 */
const OFFSET_FIRST_PAGE: usize = 52;
const OFFSET_LAST_PAGE: usize = 56;
const OFFSET_PAGE_CNT: usize = 60;
const OFFSET_REC_CNT: usize = 64;
pub const FILE_HEADER_SIZE: usize = 68;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileHeaderPage {
    file_name: String,
    first_page: PageId,
    last_page: PageId,
    page_cnt: u32,
    rec_cnt: u32,
}

impl FileHeaderPage {
    pub fn new(file_name: &str) -> Self {
        let mut header = Self::default();
        header.set_file_name(file_name);
        header
    }
    pub fn get_file_name(&self) -> &str {
        &self.file_name
    }
    // Keeps at most MAX_NAME_SIZE - 1 bytes so the stored name stays NUL terminated.
    pub fn set_file_name(&mut self, file_name: &str) {
        let mut end = file_name.len().min(MAX_NAME_SIZE - 1);
        while !file_name.is_char_boundary(end) {
            end -= 1;
        }
        self.file_name = file_name[..end].to_string();
    }
    pub fn get_first_page(&self) -> PageId {
        self.first_page
    }
    pub fn set_first_page(&mut self, page_id: PageId) {
        self.first_page = page_id
    }
    pub fn get_last_page(&self) -> PageId {
        self.last_page
    }
    pub fn set_last_page(&mut self, page_id: PageId) {
        self.last_page = page_id
    }
    pub fn get_page_cnt(&self) -> u32 {
        self.page_cnt
    }
    pub fn set_page_cnt(&mut self, page_cnt: u32) {
        self.page_cnt = page_cnt
    }
    pub fn get_rec_cnt(&self) -> u32 {
        self.rec_cnt
    }
    pub fn set_rec_cnt(&mut self, rec_cnt: u32) {
        self.rec_cnt = rec_cnt
    }

    pub fn write_to(&self, page: &mut [u8]) {
        let name = &mut page[..MAX_NAME_SIZE];
        name.iter_mut().for_each(|b| *b = 0);
        name[..self.file_name.len()].copy_from_slice(self.file_name.as_bytes());

        page[MAX_NAME_SIZE..OFFSET_FIRST_PAGE]
            .iter_mut()
            .for_each(|b| *b = 0);
        page[OFFSET_FIRST_PAGE..OFFSET_LAST_PAGE].copy_from_slice(&self.first_page.to_le_bytes());
        page[OFFSET_LAST_PAGE..OFFSET_PAGE_CNT].copy_from_slice(&self.last_page.to_le_bytes());
        page[OFFSET_PAGE_CNT..OFFSET_REC_CNT].copy_from_slice(&self.page_cnt.to_le_bytes());
        page[OFFSET_REC_CNT..FILE_HEADER_SIZE].copy_from_slice(&self.rec_cnt.to_le_bytes());
    }
}

impl From<&[u8]> for FileHeaderPage {
    fn from(page: &[u8]) -> Self {
        let name = &page[..MAX_NAME_SIZE];
        let name_len = name.iter().position(|&b| b == 0).unwrap_or(MAX_NAME_SIZE);
        let file_name = String::from_utf8_lossy(&name[..name_len]).into_owned();

        let mut first_page: [u8; 4] = Default::default();
        first_page.copy_from_slice(&page[OFFSET_FIRST_PAGE..OFFSET_LAST_PAGE]);

        let mut last_page: [u8; 4] = Default::default();
        last_page.copy_from_slice(&page[OFFSET_LAST_PAGE..OFFSET_PAGE_CNT]);

        let mut page_cnt: [u8; 4] = Default::default();
        page_cnt.copy_from_slice(&page[OFFSET_PAGE_CNT..OFFSET_REC_CNT]);

        let mut rec_cnt: [u8; 4] = Default::default();
        rec_cnt.copy_from_slice(&page[OFFSET_REC_CNT..FILE_HEADER_SIZE]);

        Self {
            file_name,
            first_page: u32::from_le_bytes(first_page),
            last_page: u32::from_le_bytes(last_page),
            page_cnt: u32::from_le_bytes(page_cnt),
            rec_cnt: u32::from_le_bytes(rec_cnt),
        }
    }
}
