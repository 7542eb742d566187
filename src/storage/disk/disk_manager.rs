use crate::errors::{Result, StorageError};
use crate::{FileId, PageId, INVALID_PAGE_ID, PAGE_SIZE};
use slog::Logger;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

// Page 0 of every file holds the file-level metadata: the first page pointer.
const META_PAGE_ID: PageId = 0;

struct OpenFile {
    name: String,
    file: File,
    open_count: u32,
    first_page: PageId,
    num_pages: u32,
}

// DiskManager is the file layer of the database. It creates, opens, closes and destroys named files
// under a base directory, allocates pages within them, and performs whole-page reads and writes.
pub struct DiskManager {
    base_dir: PathBuf,
    files: HashMap<FileId, OpenFile>,
    file_ids: HashMap<String, FileId>,
    next_file_id: FileId,
    num_writes: u32,
    logger: Logger,
}

impl DiskManager {
    // Creates a new disk manager that keeps its files in `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>, logger: &Logger) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        debug!(logger, "base_dir: {:?}", base_dir);

        Ok(Self {
            base_dir,
            files: HashMap::new(),
            file_ids: HashMap::new(),
            next_file_id: 1,
            num_writes: 0,
            logger: logger.clone(),
        })
    }

    fn file_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(|c: char| c == '/' || c == '\\')
        {
            bail!(StorageError::InvalidFileName(name.to_string()));
        }
        Ok(self.base_dir.join(name))
    }

    pub fn create_file(&mut self, name: &str) -> Result<()> {
        let path = self.file_path(name)?;
        if path.exists() {
            bail!(StorageError::FileExists(name.to_string()));
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;
        let mut meta = [0u8; PAGE_SIZE];
        meta[..4].copy_from_slice(&INVALID_PAGE_ID.to_le_bytes());
        file.write_all(&meta)?;
        file.flush()?;

        info!(self.logger, "created file"; "name" => name);
        Ok(())
    }

    // Opening an already open file hands back the same id.
    pub fn open_file(&mut self, name: &str) -> Result<FileId> {
        let path = self.file_path(name)?;
        if let Some(&file_id) = self.file_ids.get(name) {
            if let Some(open) = self.files.get_mut(&file_id) {
                open.open_count += 1;
                return Ok(file_id);
            }
        }
        if !path.exists() {
            bail!(StorageError::FileNotFound(name.to_string()));
        }

        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;
        let len = file.metadata()?.len();
        if len < PAGE_SIZE as u64 {
            bail!("file {:?} is missing its metadata page", name);
        }
        let mut first_page: [u8; 4] = Default::default();
        file.seek(SeekFrom::Start(META_PAGE_ID as u64))?;
        file.read_exact(&mut first_page)?;

        let file_id = self.next_file_id;
        self.next_file_id += 1;
        self.files.insert(
            file_id,
            OpenFile {
                name: name.to_string(),
                file,
                open_count: 1,
                first_page: PageId::from_le_bytes(first_page),
                num_pages: (len / PAGE_SIZE as u64) as u32,
            },
        );
        self.file_ids.insert(name.to_string(), file_id);
        debug!(self.logger, "opened file"; "name" => name, "file_id" => file_id);
        Ok(file_id)
    }

    pub fn close_file(&mut self, file_id: FileId) -> Result<()> {
        let open = self.open(file_id)?;
        open.open_count -= 1;
        if open.open_count == 0 {
            if let Some(open) = self.files.remove(&file_id) {
                self.file_ids.remove(&open.name);
                open.file.sync_all()?;
                debug!(self.logger, "closed file"; "name" => open.name, "file_id" => file_id);
            }
        }
        Ok(())
    }

    pub fn destroy_file(&mut self, name: &str) -> Result<()> {
        let path = self.file_path(name)?;
        if self.file_ids.contains_key(name) {
            bail!(StorageError::FileOpen(name.to_string()));
        }
        if !path.exists() {
            bail!(StorageError::FileNotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        info!(self.logger, "destroyed file"; "name" => name);
        Ok(())
    }

    pub fn open_count(&self, file_id: FileId) -> u32 {
        self.files.get(&file_id).map_or(0, |open| open.open_count)
    }

    // The first page ever allocated in the file, `INVALID_PAGE_ID` for a file with no pages.
    pub fn first_page(&self, file_id: FileId) -> Result<PageId> {
        match self.files.get(&file_id) {
            Some(open) => Ok(open.first_page),
            None => bail!(StorageError::FileNotOpen(file_id)),
        }
    }

    // Number of pages in the file, including the metadata page.
    pub fn num_pages(&self, file_id: FileId) -> Result<u32> {
        match self.files.get(&file_id) {
            Some(open) => Ok(open.num_pages),
            None => bail!(StorageError::FileNotOpen(file_id)),
        }
    }

    fn open(&mut self, file_id: FileId) -> Result<&mut OpenFile> {
        match self.files.get_mut(&file_id) {
            Some(open) => Ok(open),
            None => bail!(StorageError::FileNotOpen(file_id)),
        }
    }

    fn check_page(&mut self, file_id: FileId, page_id: PageId) -> Result<&mut OpenFile> {
        let open = self.open(file_id)?;
        if page_id == META_PAGE_ID || page_id >= open.num_pages {
            bail!(StorageError::InvalidPage { file_id, page_id });
        }
        Ok(open)
    }

    // Write the contents of the specified page into disk file
    pub fn write_page(&mut self, file_id: FileId, page_id: PageId, page_data: &[u8]) -> Result<()> {
        let open = self.check_page(file_id, page_id)?;
        let offset = page_id as u64 * PAGE_SIZE as u64;
        open.file.seek(SeekFrom::Start(offset))?;
        open.file.write_all(page_data)?;
        open.file.flush()?;
        self.num_writes += 1;
        debug!(self.logger, "num_writes: {:?}", self.num_writes);
        Ok(())
    }

    // Read the contents of the specified page into the given memory area
    pub fn read_page(
        &mut self,
        file_id: FileId,
        page_id: PageId,
        page_data: &mut [u8],
    ) -> Result<()> {
        let open = self.check_page(file_id, page_id)?;
        let offset = page_id as u64 * PAGE_SIZE as u64;
        open.file.seek(SeekFrom::Start(offset))?;
        open.file.read_exact(page_data)?;
        Ok(())
    }

    // Extends the file by one zeroed page and returns its id.
    pub fn allocate_page(&mut self, file_id: FileId) -> Result<PageId> {
        let open = self.open(file_id)?;
        let page_id = open.num_pages;
        let offset = page_id as u64 * PAGE_SIZE as u64;
        open.file.seek(SeekFrom::Start(offset))?;
        open.file.write_all(&[0u8; PAGE_SIZE])?;
        open.num_pages += 1;

        if open.first_page == INVALID_PAGE_ID {
            open.first_page = page_id;
            open.file.seek(SeekFrom::Start(META_PAGE_ID as u64))?;
            open.file.write_all(&page_id.to_le_bytes())?;
        }
        open.file.flush()?;

        debug!(self.logger, "allocated page"; "file_id" => file_id, "page_id" => page_id);
        Ok(page_id)
    }

    pub fn num_writes(&self) -> u32 {
        self.num_writes
    }
}
