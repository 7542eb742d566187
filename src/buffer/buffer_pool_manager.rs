use crate::buffer::clock_replacer::ClockReplacer;
use crate::buffer::replace::Replacer;
use crate::errors::{Result, StorageError};
use crate::storage::disk::disk_manager::DiskManager;
use crate::storage::page::Page;
use crate::{FileId, FrameId, PageId};
use slog::Logger;
use std::cell::RefCell;
use std::collections::{HashMap, LinkedList};
use std::rc::Rc;

pub type SharedBufferPool = Rc<RefCell<BufferPoolManager>>;

pub struct BufferPoolManager {
    // Array of buffer pool pages, indexed by frame id.
    pages: Vec<Page>,
    // Page table for keeping track of buffer pool pages
    page_table: HashMap<(FileId, PageId), FrameId>,
    replacer: ClockReplacer,
    free_list: LinkedList<FrameId>,
    disk_manager: DiskManager,
    logger: Logger,
}

impl BufferPoolManager {
    pub fn new(pool_size: usize, disk_manager: DiskManager, logger: &Logger) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");
        let mut free_list = LinkedList::new();

        for i in 0..pool_size {
            free_list.push_back(i as FrameId);
        }

        Self {
            pages: (0..pool_size).map(|_| Page::default()).collect(),
            page_table: Default::default(),
            replacer: ClockReplacer::new(pool_size),
            free_list,
            disk_manager,
            logger: logger.clone(),
        }
    }

    pub fn disk_manager(&self) -> &DiskManager {
        &self.disk_manager
    }

    pub fn create_file(&mut self, name: &str) -> Result<()> {
        self.disk_manager.create_file(name)
    }

    pub fn open_file(&mut self, name: &str) -> Result<FileId> {
        self.disk_manager.open_file(name)
    }

    // The last close writes back the file's dirty pages and drops them from the pool.
    pub fn close_file(&mut self, file_id: FileId) -> Result<()> {
        if self.disk_manager.open_count(file_id) == 1 {
            self.flush_file(file_id)?;
            self.discard_file(file_id);
        }
        self.disk_manager.close_file(file_id)
    }

    pub fn destroy_file(&mut self, name: &str) -> Result<()> {
        self.disk_manager.destroy_file(name)
    }

    pub fn first_page(&self, file_id: FileId) -> Result<PageId> {
        self.disk_manager.first_page(file_id)
    }

    pub fn fetch_page(&mut self, file_id: FileId, page_id: PageId) -> Result<&mut Page> {
        if let Some(&frame_id) = self.page_table.get(&(file_id, page_id)) {
            self.replacer.pin(frame_id);
            let page = &mut self.pages[frame_id as usize];
            page.pin();
            debug!(self.logger, "pin"; "file_id" => file_id, "page_id" => page_id, "pin_count" => page.get_pin_count());
            return Ok(page);
        }

        let frame_id = self.find_replacement()?;
        let page = &mut self.pages[frame_id as usize];
        page.reset(file_id, page_id);
        if let Err(e) = self
            .disk_manager
            .read_page(file_id, page_id, page.get_data_mut())
        {
            self.free_list.push_back(frame_id);
            return Err(e);
        }
        page.pin();
        self.replacer.pin(frame_id);
        self.page_table.insert((file_id, page_id), frame_id);
        debug!(self.logger, "pin"; "file_id" => file_id, "page_id" => page_id, "frame_id" => frame_id);
        Ok(page)
    }

    pub fn new_page(&mut self, file_id: FileId) -> Result<(PageId, &mut Page)> {
        let frame_id = self.find_replacement()?;
        let page_id = match self.disk_manager.allocate_page(file_id) {
            Ok(page_id) => page_id,
            Err(e) => {
                self.free_list.push_back(frame_id);
                return Err(e);
            }
        };

        debug!(self.logger, "page_id: {:?}", page_id);

        let page = &mut self.pages[frame_id as usize];
        page.reset(file_id, page_id);
        page.pin();
        self.replacer.pin(frame_id);
        self.page_table.insert((file_id, page_id), frame_id);
        Ok((page_id, page))
    }

    // A clean unpin never clears an earlier dirty mark.
    pub fn unpin_page(&mut self, file_id: FileId, page_id: PageId, is_dirty: bool) -> Result<()> {
        let frame_id = self.pinned_frame(file_id, page_id)?;
        let page = &mut self.pages[frame_id as usize];
        page.unpin();
        if is_dirty {
            page.mark_dirty(true);
        }
        if page.get_pin_count() == 0 {
            self.replacer.unpin(frame_id);
        }
        debug!(self.logger, "unpin"; "file_id" => file_id, "page_id" => page_id, "dirty" => is_dirty);
        Ok(())
    }

    pub fn page(&self, file_id: FileId, page_id: PageId) -> Result<&Page> {
        let frame_id = self.pinned_frame(file_id, page_id)?;
        Ok(&self.pages[frame_id as usize])
    }

    pub fn page_mut(&mut self, file_id: FileId, page_id: PageId) -> Result<&mut Page> {
        let frame_id = self.pinned_frame(file_id, page_id)?;
        Ok(&mut self.pages[frame_id as usize])
    }

    pub fn flush_page(&mut self, file_id: FileId, page_id: PageId) -> Result<()> {
        if let Some(&frame_id) = self.page_table.get(&(file_id, page_id)) {
            let page = &mut self.pages[frame_id as usize];
            if page.is_dirty() {
                self.disk_manager
                    .write_page(file_id, page_id, page.get_data())?;
                page.mark_dirty(false);
            }
        }
        Ok(())
    }

    pub fn flush_file(&mut self, file_id: FileId) -> Result<()> {
        let resident: Vec<PageId> = self
            .page_table
            .keys()
            .filter(|(f, _)| *f == file_id)
            .map(|&(_, p)| p)
            .collect();
        for page_id in resident {
            let frame_id = self.page_table[&(file_id, page_id)];
            if self.pages[frame_id as usize].get_pin_count() > 0 {
                warn!(self.logger, "flushing file with pinned page"; "file_id" => file_id, "page_id" => page_id);
                bail!(StorageError::FileOpen(format!("file id {}", file_id)));
            }
            self.flush_page(file_id, page_id)?;
        }
        Ok(())
    }

    pub fn pin_count(&self, file_id: FileId, page_id: PageId) -> u32 {
        self.page_table
            .get(&(file_id, page_id))
            .map_or(0, |&frame_id| self.pages[frame_id as usize].get_pin_count())
    }

    pub fn pinned_count(&self) -> u32 {
        self.pages.iter().map(|page| page.get_pin_count()).sum()
    }

    fn pinned_frame(&self, file_id: FileId, page_id: PageId) -> Result<FrameId> {
        match self.page_table.get(&(file_id, page_id)) {
            Some(&frame_id) if self.pages[frame_id as usize].get_pin_count() > 0 => Ok(frame_id),
            _ => bail!(StorageError::PageNotPinned { file_id, page_id }),
        }
    }

    fn discard_file(&mut self, file_id: FileId) {
        let frames: Vec<FrameId> = self
            .page_table
            .iter()
            .filter(|((f, _), _)| *f == file_id)
            .map(|(_, &frame_id)| frame_id)
            .collect();
        self.page_table.retain(|(f, _), _| *f != file_id);
        for frame_id in frames {
            self.replacer.remove(frame_id);
            self.pages[frame_id as usize] = Page::default();
            self.free_list.push_back(frame_id);
        }
    }

    // find in free lists first, then replacer; a dirty victim is written back before reuse
    fn find_replacement(&mut self) -> Result<FrameId> {
        if let Some(frame_id) = self.free_list.pop_front() {
            return Ok(frame_id);
        }
        let frame_id = match self.replacer.victim() {
            Some(frame_id) => frame_id,
            // all the pages in buffer pool are pinned
            None => bail!(StorageError::BufferExceeded),
        };

        let page = &mut self.pages[frame_id as usize];
        let key = (page.get_file_id(), page.get_id());
        if page.is_dirty() {
            debug!(self.logger, "evict dirty"; "file_id" => key.0, "page_id" => key.1);
            if let Err(e) = self.disk_manager.write_page(key.0, key.1, page.get_data()) {
                self.replacer.unpin(frame_id);
                return Err(e);
            }
            page.mark_dirty(false);
        }
        self.page_table.remove(&key);
        Ok(frame_id)
    }
}
