use crate::buffer::buffer_pool_manager::SharedBufferPool;
use crate::errors::{Result, StorageError};
use crate::heap::heap_file::HeapFile;
use crate::storage::page::table_page::MAX_RECORD_LEN;
use crate::Rid;
use slog::Logger;

pub struct InsertFileScan {
    file: HeapFile,
}

impl InsertFileScan {
    pub fn open(bpm: &SharedBufferPool, file_name: &str, logger: &Logger) -> Result<Self> {
        Ok(Self {
            file: HeapFile::open(bpm, file_name, logger)?,
        })
    }

    pub fn file(&self) -> &HeapFile {
        &self.file
    }

    pub fn file_mut(&mut self) -> &mut HeapFile {
        &mut self.file
    }

    pub fn rec_cnt(&self) -> u32 {
        self.file.rec_cnt()
    }

    pub fn insert_record(&mut self, record: &[u8]) -> Result<Rid> {
        if record.len() > MAX_RECORD_LEN {
            bail!(StorageError::InvalidRecordLength(record.len()));
        }

        let last_page = self.file.last_page();
        self.file.transfer(last_page)?;

        let inserted = self
            .file
            .with_current_page_mut(|page| Ok(page.insert_record(record)))?;
        if let Some(rid) = inserted {
            return self.record_inserted(rid);
        }

        // Tail is full. Only one data page is held at a time: the old tail is
        // released while the new page is allocated, then pinned again to link it.
        self.file.release_current()?;
        let file_id = self.file.file_id();
        let new_page_no = {
            let mut bpm = self.file.bpm().borrow_mut();
            let (new_page_no, new_page) = bpm.new_page(file_id)?;
            new_page.init(new_page_no);
            bpm.unpin_page(file_id, new_page_no, true)?;
            new_page_no
        };

        self.file.transfer(last_page)?;
        self.file.with_current_page_mut(|page| {
            page.set_next_page(new_page_no);
            Ok(())
        })?;
        self.file.mark_current_dirty()?;
        self.file.update_header(|header| {
            header.set_last_page(new_page_no);
            header.set_page_cnt(header.get_page_cnt() + 1);
        })?;
        debug!(self.file.logger, "extended page chain"; "file" => self.file.file_name(), "from" => last_page, "to" => new_page_no);

        self.file.transfer(new_page_no)?;
        let inserted = self
            .file
            .with_current_page_mut(|page| Ok(page.insert_record(record)))?;
        match inserted {
            Some(rid) => self.record_inserted(rid),
            None => bail!(StorageError::InvalidRecordLength(record.len())),
        }
    }

    fn record_inserted(&mut self, rid: Rid) -> Result<Rid> {
        self.file.cur_rec = Some(rid);
        self.file.mark_current_dirty()?;
        self.file
            .update_header(|header| header.set_rec_cnt(header.get_rec_cnt() + 1))?;
        Ok(rid)
    }
}

impl Drop for InsertFileScan {
    // The tail page is always released dirty, whatever the last insert did.
    fn drop(&mut self) {
        if self.file.current_page().is_some() {
            if let Err(e) = self.file.mark_current_dirty() {
                warn!(self.file.logger, "could not mark tail page dirty"; "error" => %e);
            }
        }
    }
}
