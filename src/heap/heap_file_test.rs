use crate::errors::{storage_error, Result, StorageError};
use crate::heap::heap_file::{create_heap_file, destroy_heap_file, HeapFile};
use crate::heap::insert_file_scan::InsertFileScan;
use crate::{default_logger, test_buffer_pool, Rid, SharedBufferPool, INVALID_PAGE_ID};
use tempfile::TempDir;

const POOL_SIZE: usize = 8;

fn setup(file_name: &str) -> Result<(TempDir, SharedBufferPool)> {
    let dir = tempfile::tempdir()?;
    let bpm = test_buffer_pool(dir.path(), POOL_SIZE)?;
    create_heap_file(&bpm, file_name, &default_logger())?;
    Ok((dir, bpm))
}

// 1000-byte records fit four to a page.
fn insert_numbered(bpm: &SharedBufferPool, file_name: &str, count: u8) -> Result<Vec<Rid>> {
    let mut inserter = InsertFileScan::open(bpm, file_name, &default_logger())?;
    let mut rids = Vec::new();
    for i in 0..count {
        rids.push(inserter.insert_record(&[i; 1000])?);
    }
    Ok(rids)
}

#[test]
fn create_then_open_empty_file() -> Result<()> {
    let (_dir, bpm) = setup("empty")?;
    assert_eq!(bpm.borrow().pinned_count(), 0);

    let file = HeapFile::open(&bpm, "empty", &default_logger())?;
    assert_eq!(file.rec_cnt(), 0);
    assert_eq!(file.page_cnt(), 1);
    assert_eq!(file.first_page(), file.last_page());
    assert_eq!(file.file_name(), "empty");
    assert_eq!(file.current_page(), Some(file.first_page()));
    // header page plus the first data page
    assert_eq!(bpm.borrow().pinned_count(), 2);

    let file_id = file.file_id();
    let first = file.first_page();
    {
        let bpm = bpm.borrow();
        let page = bpm.page(file_id, first)?;
        assert_eq!(page.first_record(), None);
        assert_eq!(page.next_page(), INVALID_PAGE_ID);
    }

    drop(file);
    assert_eq!(bpm.borrow().pinned_count(), 0);
    Ok(())
}

#[test]
fn create_existing_file_fails() -> Result<()> {
    let (_dir, bpm) = setup("dup")?;
    let err = create_heap_file(&bpm, "dup", &default_logger()).unwrap_err();
    assert_eq!(
        storage_error(&err),
        Some(&StorageError::FileExists("dup".into()))
    );
    // the probe open did not leave the file open
    destroy_heap_file(&bpm, "dup")?;
    Ok(())
}

#[test]
fn destroy_removes_file() -> Result<()> {
    let (_dir, bpm) = setup("gone")?;
    destroy_heap_file(&bpm, "gone")?;

    let err = HeapFile::open(&bpm, "gone", &default_logger()).err().unwrap();
    assert_eq!(
        storage_error(&err),
        Some(&StorageError::FileNotFound("gone".into()))
    );
    let err = destroy_heap_file(&bpm, "gone").unwrap_err();
    assert_eq!(
        storage_error(&err),
        Some(&StorageError::FileNotFound("gone".into()))
    );
    assert_eq!(bpm.borrow().pinned_count(), 0);
    Ok(())
}

#[test]
fn destroy_open_file_is_refused() -> Result<()> {
    let (_dir, bpm) = setup("busy")?;
    let file = HeapFile::open(&bpm, "busy", &default_logger())?;
    assert!(destroy_heap_file(&bpm, "busy").is_err());
    drop(file);
    destroy_heap_file(&bpm, "busy")?;
    Ok(())
}

#[test]
fn get_record_moves_current_page() -> Result<()> {
    let (_dir, bpm) = setup("lookup")?;
    let rids = insert_numbered(&bpm, "lookup", 10)?;
    assert_eq!(bpm.borrow().pinned_count(), 0);

    let mut file = HeapFile::open(&bpm, "lookup", &default_logger())?;
    assert_eq!(file.rec_cnt(), 10);
    assert_eq!(file.page_cnt(), 3);

    for (i, rid) in rids.iter().enumerate().rev() {
        let record = file.get_record(*rid)?;
        assert_eq!(record, vec![i as u8; 1000]);
        assert_eq!(file.current_page(), Some(rid.page_no));
        assert_eq!(bpm.borrow().pinned_count(), 2);
    }

    drop(file);
    assert_eq!(bpm.borrow().pinned_count(), 0);
    Ok(())
}

#[test]
fn get_record_of_missing_slot_keeps_page() -> Result<()> {
    let (_dir, bpm) = setup("missing")?;
    let rids = insert_numbered(&bpm, "missing", 2)?;

    let mut file = HeapFile::open(&bpm, "missing", &default_logger())?;
    let bogus = Rid::new(rids[0].page_no, 40);
    let err = file.get_record(bogus).unwrap_err();
    assert_eq!(
        storage_error(&err),
        Some(&StorageError::RecordNotFound(bogus))
    );
    assert_eq!(file.current_page(), Some(rids[0].page_no));
    assert_eq!(bpm.borrow().pinned_count(), 2);
    Ok(())
}

#[test]
fn get_record_on_unknown_page_releases_current() -> Result<()> {
    let (_dir, bpm) = setup("nopage")?;
    let mut file = HeapFile::open(&bpm, "nopage", &default_logger())?;

    let err = file.get_record(Rid::new(999, 0)).unwrap_err();
    assert!(matches!(
        storage_error(&err),
        Some(StorageError::InvalidPage { page_id: 999, .. })
    ));
    assert_eq!(file.current_page(), None);
    // only the header page is still pinned
    assert_eq!(bpm.borrow().pinned_count(), 1);

    drop(file);
    assert_eq!(bpm.borrow().pinned_count(), 0);
    Ok(())
}

#[test]
fn open_failure_leaves_nothing_pinned() -> Result<()> {
    let (_dir, bpm) = setup("present")?;
    assert!(HeapFile::open(&bpm, "absent", &default_logger()).is_err());
    assert_eq!(bpm.borrow().pinned_count(), 0);
    Ok(())
}

#[test]
fn header_survives_reopen_and_new_pool() -> Result<()> {
    let (dir, bpm) = setup("durable")?;
    insert_numbered(&bpm, "durable", 9)?;
    drop(bpm);

    let bpm = test_buffer_pool(dir.path(), POOL_SIZE)?;
    let file = HeapFile::open(&bpm, "durable", &default_logger())?;
    assert_eq!(file.rec_cnt(), 9);
    assert_eq!(file.page_cnt(), 3);
    assert_ne!(file.first_page(), file.last_page());
    Ok(())
}

#[test]
fn two_instances_on_one_file_balance_pins() -> Result<()> {
    let (_dir, bpm) = setup("shared")?;
    let rids = insert_numbered(&bpm, "shared", 6)?;

    let mut a = HeapFile::open(&bpm, "shared", &default_logger())?;
    let mut b = HeapFile::open(&bpm, "shared", &default_logger())?;
    a.get_record(rids[5])?;
    b.get_record(rids[0])?;
    assert_eq!(bpm.borrow().pinned_count(), 4);

    drop(a);
    assert_eq!(bpm.borrow().pinned_count(), 2);
    assert_eq!(b.get_record(rids[1])?, vec![1u8; 1000]);
    drop(b);
    assert_eq!(bpm.borrow().pinned_count(), 0);
    Ok(())
}
