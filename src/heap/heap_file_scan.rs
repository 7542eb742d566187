use crate::buffer::buffer_pool_manager::SharedBufferPool;
use crate::errors::{Result, StorageError};
use crate::heap::heap_file::HeapFile;
use crate::heap::predicate::{Datatype, Operator, ScanPredicate};
use crate::{PageId, Rid, INVALID_PAGE_ID};
use slog::Logger;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    // Not advanced yet; the next call starts at the first data page.
    Idle,
    // Walking the chain; `cur_rec` is the last record looked at.
    Positioned,
    // Ran off the end of the chain.
    Exhausted,
}

#[derive(Clone, Copy, Debug)]
struct ScanMark {
    page_no: Option<PageId>,
    rec: Option<Rid>,
    state: ScanState,
}

pub struct HeapFileScan {
    file: HeapFile,
    filter: Option<ScanPredicate>,
    state: ScanState,
    mark: Option<ScanMark>,
}

impl HeapFileScan {
    pub fn open(bpm: &SharedBufferPool, file_name: &str, logger: &Logger) -> Result<Self> {
        Ok(Self {
            file: HeapFile::open(bpm, file_name, logger)?,
            filter: None,
            state: ScanState::Idle,
            mark: None,
        })
    }

    pub fn file(&self) -> &HeapFile {
        &self.file
    }

    // Point lookups through the file move the scan onto the looked-up record.
    pub fn file_mut(&mut self) -> &mut HeapFile {
        &mut self.file
    }

    pub fn rec_cnt(&self) -> u32 {
        self.file.rec_cnt()
    }

    // On a bad parameter the previous filter and position are kept.
    pub fn start_scan(
        &mut self,
        offset: i32,
        length: i32,
        datatype: Datatype,
        filter: Option<&[u8]>,
        op: Operator,
    ) -> Result<()> {
        self.filter = match filter {
            Some(value) => Some(ScanPredicate::new(offset, length, datatype, value, op)?),
            None => None,
        };
        self.state = ScanState::Idle;
        self.file.cur_rec = None;
        Ok(())
    }

    pub fn scan_next(&mut self) -> Result<Option<Rid>> {
        match self.state {
            ScanState::Exhausted => return Ok(None),
            ScanState::Idle => {
                let first = self.file.first_page();
                self.file.transfer(first)?;
                self.file.cur_rec = None;
                self.state = ScanState::Positioned;
            }
            ScanState::Positioned => {}
        }

        loop {
            let cur_rec = self.file.cur_rec;
            let candidate = self.file.with_current_page(|page| {
                Ok(match cur_rec {
                    Some(rid) => page.next_record(rid),
                    None => page.first_record(),
                })
            })?;

            match candidate {
                Some(rid) => {
                    self.file.cur_rec = Some(rid);
                    let filter = &self.filter;
                    let matched = self.file.with_current_page(|page| {
                        let record = page.get_record(rid)?;
                        Ok(filter.as_ref().map_or(true, |f| f.matches(record)))
                    })?;
                    if matched {
                        return Ok(Some(rid));
                    }
                }
                None => {
                    let next_page = self.file.with_current_page(|page| Ok(page.next_page()))?;
                    self.file.release_current()?;
                    self.file.cur_rec = None;
                    if next_page == INVALID_PAGE_ID {
                        self.state = ScanState::Exhausted;
                        return Ok(None);
                    }
                    // a failed move leaves no page held; the scan starts over
                    if let Err(e) = self.file.transfer(next_page) {
                        self.state = ScanState::Idle;
                        return Err(e);
                    }
                }
            }
        }
    }

    pub fn get_record(&self) -> Result<Vec<u8>> {
        let rid = self.positioned_rid()?;
        self.file
            .with_current_page(|page| Ok(page.get_record(rid)?.to_vec()))
    }

    pub fn with_record_mut<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R> {
        let rid = self.positioned_rid()?;
        self.file
            .with_current_page_mut(|page| Ok(f(page.get_record_mut(rid)?)))
    }

    pub fn delete_record(&mut self) -> Result<()> {
        let rid = self.positioned_rid()?;
        self.file
            .with_current_page_mut(|page| page.delete_record(rid))?;
        self.file.mark_current_dirty()?;
        self.file
            .update_header(|header| header.set_rec_cnt(header.get_rec_cnt().saturating_sub(1)))
    }

    pub fn mark_dirty(&mut self) -> Result<()> {
        self.file.mark_current_dirty()
    }

    pub fn mark_scan(&mut self) {
        self.mark = Some(ScanMark {
            page_no: self.file.current_page(),
            rec: self.file.cur_rec,
            state: self.state,
        });
    }

    // Without a mark the scan is rewound to the start.
    pub fn reset_scan(&mut self) -> Result<()> {
        let mark = match self.mark {
            Some(mark) => mark,
            None => {
                self.state = ScanState::Idle;
                self.file.cur_rec = None;
                return Ok(());
            }
        };

        if mark.page_no != self.file.current_page() {
            match mark.page_no {
                Some(page_no) => self.file.transfer(page_no)?,
                None => self.file.release_current()?,
            }
        }
        self.file.cur_rec = mark.rec;
        self.state = mark.state;
        Ok(())
    }

    pub fn end_scan(&mut self) -> Result<()> {
        let released = self.file.release_current();
        self.file.cur_rec = None;
        self.state = ScanState::Idle;
        released
    }

    pub fn iter(&mut self) -> ScanIter<'_> {
        ScanIter { scan: self }
    }

    fn positioned_rid(&self) -> Result<Rid> {
        match (self.state, self.file.cur_rec) {
            (ScanState::Positioned, Some(rid)) => Ok(rid),
            _ => bail!(StorageError::NoCurrentPage),
        }
    }
}

pub struct ScanIter<'a> {
    scan: &'a mut HeapFileScan,
}

impl<'a> Iterator for ScanIter<'a> {
    type Item = Result<Rid>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.scan.scan_next() {
            Ok(Some(rid)) => Some(Ok(rid)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
