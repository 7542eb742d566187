use crate::buffer::buffer_pool_manager::SharedBufferPool;
use crate::errors::{Result, StorageError};
use crate::storage::page::file_header_page::FileHeaderPage;
use crate::storage::page::Page;
use crate::{FileId, PageId, Rid};
use slog::Logger;

pub fn create_heap_file(bpm: &SharedBufferPool, file_name: &str, logger: &Logger) -> Result<()> {
    let mut bpm = bpm.borrow_mut();
    if let Ok(file_id) = bpm.open_file(file_name) {
        bpm.close_file(file_id)?;
        bail!(StorageError::FileExists(file_name.to_string()));
    }

    bpm.create_file(file_name)?;
    let file_id = bpm.open_file(file_name)?;

    let header_page_no = match bpm.new_page(file_id) {
        Ok((page_no, _)) => page_no,
        Err(e) => {
            bpm.close_file(file_id)?;
            return Err(e);
        }
    };
    let data_page_no = match bpm.new_page(file_id) {
        Ok((page_no, page)) => {
            page.init(page_no);
            page_no
        }
        Err(e) => {
            bpm.unpin_page(file_id, header_page_no, false)?;
            bpm.close_file(file_id)?;
            return Err(e);
        }
    };

    let mut header = FileHeaderPage::new(file_name);
    header.set_first_page(data_page_no);
    header.set_last_page(data_page_no);
    header.set_page_cnt(1);
    header.set_rec_cnt(0);
    header.write_to(bpm.page_mut(file_id, header_page_no)?.get_data_mut());

    bpm.unpin_page(file_id, header_page_no, true)?;
    bpm.unpin_page(file_id, data_page_no, true)?;
    bpm.close_file(file_id)?;

    info!(logger, "created heap file"; "file" => file_name, "header_page" => header_page_no, "first_page" => data_page_no);
    Ok(())
}

pub fn destroy_heap_file(bpm: &SharedBufferPool, file_name: &str) -> Result<()> {
    bpm.borrow_mut().destroy_file(file_name)
}

// The data page an open heap file holds pinned, with whether it was modified since it was pinned.
#[derive(Debug)]
struct CurrentPage {
    page_no: PageId,
    dirty: bool,
}

// The header page stays pinned for the lifetime of the value, plus at most one data page.
pub struct HeapFile {
    bpm: SharedBufferPool,
    file_id: FileId,
    header_page_no: PageId,
    header: FileHeaderPage,
    hdr_dirty: bool,
    cur_page: Option<CurrentPage>,
    pub(crate) cur_rec: Option<Rid>,
    pub(crate) logger: Logger,
}

impl HeapFile {
    pub fn open(bpm: &SharedBufferPool, file_name: &str, logger: &Logger) -> Result<Self> {
        let mut pool = bpm.borrow_mut();
        let file_id = match pool.open_file(file_name) {
            Ok(file_id) => file_id,
            Err(e) => {
                error!(logger, "open of heap file failed"; "file" => file_name, "error" => %e);
                return Err(e);
            }
        };

        let header_page_no = match pool.first_page(file_id) {
            Ok(page_no) => page_no,
            Err(e) => {
                pool.close_file(file_id)?;
                return Err(e);
            }
        };
        let header = match pool.fetch_page(file_id, header_page_no) {
            Ok(page) => FileHeaderPage::from(page.get_data()),
            Err(e) => {
                pool.close_file(file_id)?;
                return Err(e);
            }
        };
        if let Err(e) = pool.fetch_page(file_id, header.get_first_page()) {
            pool.unpin_page(file_id, header_page_no, false)?;
            pool.close_file(file_id)?;
            return Err(e);
        }
        drop(pool);

        info!(logger, "opened heap file"; "file" => file_name, "records" => header.get_rec_cnt());
        Ok(Self {
            bpm: bpm.clone(),
            file_id,
            header_page_no,
            cur_page: Some(CurrentPage {
                page_no: header.get_first_page(),
                dirty: false,
            }),
            header,
            hdr_dirty: false,
            cur_rec: None,
            logger: logger.clone(),
        })
    }

    pub fn rec_cnt(&self) -> u32 {
        self.header.get_rec_cnt()
    }

    pub fn page_cnt(&self) -> u32 {
        self.header.get_page_cnt()
    }

    pub fn first_page(&self) -> PageId {
        self.header.get_first_page()
    }

    pub fn last_page(&self) -> PageId {
        self.header.get_last_page()
    }

    pub fn file_name(&self) -> &str {
        self.header.get_file_name()
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn current_page(&self) -> Option<PageId> {
        self.cur_page.as_ref().map(|cur| cur.page_no)
    }

    // On a failed pin the old current page is already released and no data page is held.
    pub fn get_record(&mut self, rid: Rid) -> Result<Vec<u8>> {
        self.transfer(rid.page_no)?;
        let record = self.with_current_page(|page| Ok(page.get_record(rid)?.to_vec()))?;
        self.cur_rec = Some(rid);
        Ok(record)
    }

    pub(crate) fn transfer(&mut self, page_no: PageId) -> Result<()> {
        if self.current_page() == Some(page_no) {
            return Ok(());
        }
        self.release_current()?;
        self.bpm.borrow_mut().fetch_page(self.file_id, page_no)?;
        self.cur_page = Some(CurrentPage {
            page_no,
            dirty: false,
        });
        Ok(())
    }

    // The file holds no data page afterwards even when the unpin fails.
    pub(crate) fn release_current(&mut self) -> Result<()> {
        match self.cur_page.take() {
            Some(cur) => self
                .bpm
                .borrow_mut()
                .unpin_page(self.file_id, cur.page_no, cur.dirty),
            None => Ok(()),
        }
    }

    pub(crate) fn mark_current_dirty(&mut self) -> Result<()> {
        match self.cur_page.as_mut() {
            Some(cur) => {
                cur.dirty = true;
                Ok(())
            }
            None => bail!(StorageError::NoCurrentPage),
        }
    }

    pub(crate) fn with_current_page<R>(&self, f: impl FnOnce(&Page) -> Result<R>) -> Result<R> {
        let page_no = match self.current_page() {
            Some(page_no) => page_no,
            None => bail!(StorageError::NoCurrentPage),
        };
        let bpm = self.bpm.borrow();
        let page = bpm.page(self.file_id, page_no)?;
        f(page)
    }

    pub(crate) fn with_current_page_mut<R>(
        &self,
        f: impl FnOnce(&mut Page) -> Result<R>,
    ) -> Result<R> {
        let page_no = match self.current_page() {
            Some(page_no) => page_no,
            None => bail!(StorageError::NoCurrentPage),
        };
        let mut bpm = self.bpm.borrow_mut();
        let page = bpm.page_mut(self.file_id, page_no)?;
        f(page)
    }

    pub(crate) fn bpm(&self) -> &SharedBufferPool {
        &self.bpm
    }

    pub(crate) fn update_header(&mut self, f: impl FnOnce(&mut FileHeaderPage)) -> Result<()> {
        f(&mut self.header);
        self.hdr_dirty = true;
        let mut bpm = self.bpm.borrow_mut();
        let page = bpm.page_mut(self.file_id, self.header_page_no)?;
        self.header.write_to(page.get_data_mut());
        Ok(())
    }
}

impl Drop for HeapFile {
    fn drop(&mut self) {
        debug!(self.logger, "closing heap file"; "file" => self.header.get_file_name());

        if let Err(e) = self.release_current() {
            error!(self.logger, "error in unpin of data page"; "error" => %e);
        }

        let mut bpm = self.bpm.borrow_mut();
        if let Err(e) = bpm.unpin_page(self.file_id, self.header_page_no, self.hdr_dirty) {
            error!(self.logger, "error in unpin of header page"; "error" => %e);
        }
        if let Err(e) = bpm.close_file(self.file_id) {
            error!(self.logger, "error in close file"; "error" => %e);
        }
    }
}
