use crate::errors::Result;
use crate::storage::page::file_header_page::{FileHeaderPage, FILE_HEADER_SIZE};
use crate::{test_buffer_pool, MAX_NAME_SIZE, PAGE_SIZE};

#[test]
fn header_page_sample() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let bpm = test_buffer_pool(dir.path(), 5)?;
    let mut bpm = bpm.borrow_mut();
    bpm.create_file("header_page_sample")?;
    let file_id = bpm.open_file("header_page_sample")?;

    let (page_id, page) = bpm.new_page(file_id)?;

    let mut header_page = FileHeaderPage::new("header_page_sample");
    for i in 1..11 {
        header_page.set_first_page(i);
        assert_eq!(header_page.get_first_page(), i);
        header_page.set_last_page(i + 1);
        assert_eq!(header_page.get_last_page(), i + 1);
        header_page.set_page_cnt(i * 2);
        assert_eq!(header_page.get_page_cnt(), i * 2);
        header_page.set_rec_cnt(i * 3);
        assert_eq!(header_page.get_rec_cnt(), i * 3);
    }

    header_page.write_to(page.get_data_mut());
    let page_data = page.get_data().to_vec();

    bpm.unpin_page(file_id, page_id, true)?;
    bpm.flush_page(file_id, page_id)?;

    let page = bpm.fetch_page(file_id, page_id)?;
    assert_eq!(page.get_data().to_vec(), page_data);

    let reloaded = FileHeaderPage::from(page.get_data());
    assert_eq!(reloaded, header_page);
    assert_eq!(reloaded.get_file_name(), "header_page_sample");

    bpm.unpin_page(file_id, page_id, false)?;
    bpm.close_file(file_id)?;
    Ok(())
}

#[test]
fn header_layout_has_fixed_offsets() {
    let mut header = FileHeaderPage::new("rel");
    header.set_first_page(2);
    header.set_last_page(7);
    header.set_page_cnt(6);
    header.set_rec_cnt(0x0102_0304);

    let mut page = [0xAAu8; PAGE_SIZE];
    header.write_to(&mut page);

    assert_eq!(&page[..4], b"rel\0");
    assert!(page[3..52].iter().all(|&b| b == 0));
    assert_eq!(&page[52..56], &2u32.to_le_bytes());
    assert_eq!(&page[56..60], &7u32.to_le_bytes());
    assert_eq!(&page[60..64], &6u32.to_le_bytes());
    assert_eq!(&page[64..68], &[4, 3, 2, 1]);
    // bytes past the header are left alone
    assert_eq!(page[FILE_HEADER_SIZE], 0xAA);
}

#[test]
fn long_names_are_truncated() {
    let long = "n".repeat(MAX_NAME_SIZE * 2);
    let header = FileHeaderPage::new(&long);
    assert_eq!(header.get_file_name().len(), MAX_NAME_SIZE - 1);

    let mut page = [0u8; PAGE_SIZE];
    header.write_to(&mut page);
    assert_eq!(FileHeaderPage::from(&page[..]).get_file_name(), header.get_file_name());

    // never split a multi-byte character
    let wide = "é".repeat(MAX_NAME_SIZE);
    let header = FileHeaderPage::new(&wide);
    assert_eq!(header.get_file_name().len(), MAX_NAME_SIZE - 2);
}
