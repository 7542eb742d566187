use crate::errors::{Result, StorageError};
use crate::storage::page::Page;
use crate::{PageId, Rid, SlotId, INVALID_PAGE_ID, PAGE_SIZE};

/**
 *
 * Slotted data page of a heap file.
 *
 * Header format (size in byte, 16 bytes in total):
 * ----------------------------------------------------------------------------
 * | PageId (4) | NextPageId (4) | SlotCnt (2) | FreePtr (2) | FreeSpace (2) | (2)
 * ----------------------------------------------------------------------------
 *
 * Record bytes grow upward from the end of the header, the slot directory
 * grows downward from the end of the page:
 * ----------------------------------------------------------------------------
 * | HEADER | RECORD 0 | RECORD 1 | ... free ... | SLOT 1 | SLOT 0 |
 * ----------------------------------------------------------------------------
 *
 * Slot format (4 bytes): | Offset (2) | Length (2) |
 * A deleted slot has offset `EMPTY_SLOT`.
 */
const OFFSET_PAGE_ID: usize = 0;
const OFFSET_NEXT_PAGE: usize = 4;
const OFFSET_SLOT_CNT: usize = 8;
const OFFSET_FREE_PTR: usize = 10;
const OFFSET_FREE_SPACE: usize = 12;
const PAGE_HEADER_SIZE: usize = 16;
const SLOT_SIZE: usize = 4;
const EMPTY_SLOT: u16 = u16::MAX;

pub const DP_FIXED: usize = PAGE_HEADER_SIZE + SLOT_SIZE;
pub const MAX_RECORD_LEN: usize = PAGE_SIZE - DP_FIXED;

fn read_u16(data: &[u8], offset: usize) -> u16 {
    let mut bytes: [u8; 2] = Default::default();
    bytes.copy_from_slice(&data[offset..offset + 2]);
    u16::from_le_bytes(bytes)
}

fn write_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes: [u8; 4] = Default::default();
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

fn write_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn slot_position(slot_no: SlotId) -> usize {
    PAGE_SIZE - (slot_no as usize + 1) * SLOT_SIZE
}

impl Page {
    pub fn init(&mut self, page_no: PageId) {
        let data = self.get_data_mut();
        data.iter_mut().for_each(|b| *b = 0);
        write_u32(data, OFFSET_PAGE_ID, page_no);
        write_u32(data, OFFSET_NEXT_PAGE, INVALID_PAGE_ID);
        write_u16(data, OFFSET_SLOT_CNT, 0);
        write_u16(data, OFFSET_FREE_PTR, PAGE_HEADER_SIZE as u16);
        write_u16(data, OFFSET_FREE_SPACE, (PAGE_SIZE - PAGE_HEADER_SIZE) as u16);
    }

    pub fn page_no(&self) -> PageId {
        read_u32(self.get_data(), OFFSET_PAGE_ID)
    }

    pub fn next_page(&self) -> PageId {
        read_u32(self.get_data(), OFFSET_NEXT_PAGE)
    }

    pub fn set_next_page(&mut self, page_no: PageId) {
        write_u32(self.get_data_mut(), OFFSET_NEXT_PAGE, page_no)
    }

    pub fn free_space(&self) -> usize {
        read_u16(self.get_data(), OFFSET_FREE_SPACE) as usize
    }

    fn slot_cnt(&self) -> SlotId {
        read_u16(self.get_data(), OFFSET_SLOT_CNT)
    }

    fn slot(&self, slot_no: SlotId) -> (u16, u16) {
        let pos = slot_position(slot_no);
        let data = self.get_data();
        (read_u16(data, pos), read_u16(data, pos + 2))
    }

    fn set_slot(&mut self, slot_no: SlotId, offset: u16, length: u16) {
        let pos = slot_position(slot_no);
        let data = self.get_data_mut();
        write_u16(data, pos, offset);
        write_u16(data, pos + 2, length);
    }

    fn is_live(&self, slot_no: SlotId) -> bool {
        slot_no < self.slot_cnt() && self.slot(slot_no).0 != EMPTY_SLOT
    }

    pub fn record_count(&self) -> usize {
        (0..self.slot_cnt()).filter(|&s| self.is_live(s)).count()
    }

    pub fn insert_record(&mut self, record: &[u8]) -> Option<Rid> {
        let slot_cnt = self.slot_cnt();
        let reusable = (0..slot_cnt).find(|&s| self.slot(s).0 == EMPTY_SLOT);
        let needed = record.len() + if reusable.is_some() { 0 } else { SLOT_SIZE };
        if needed > self.free_space() {
            return None;
        }

        let slot_no = reusable.unwrap_or(slot_cnt);
        let data = self.get_data_mut();
        let free_ptr = read_u16(data, OFFSET_FREE_PTR);
        let free_space = read_u16(data, OFFSET_FREE_SPACE);
        let start = free_ptr as usize;
        data[start..start + record.len()].copy_from_slice(record);
        write_u16(data, OFFSET_FREE_PTR, free_ptr + record.len() as u16);
        write_u16(data, OFFSET_FREE_SPACE, free_space - needed as u16);
        if reusable.is_none() {
            write_u16(data, OFFSET_SLOT_CNT, slot_cnt + 1);
        }
        self.set_slot(slot_no, free_ptr, record.len() as u16);

        Some(Rid::new(self.page_no(), slot_no))
    }

    // Compacts the record area; slot numbers of the remaining records do not change.
    pub fn delete_record(&mut self, rid: Rid) -> Result<()> {
        self.check_live(rid)?;
        let (offset, length) = self.slot(rid.slot_no);
        let slot_cnt = self.slot_cnt();

        let data = self.get_data_mut();
        let free_ptr = read_u16(data, OFFSET_FREE_PTR);
        let tail_start = (offset + length) as usize;
        data.copy_within(tail_start..free_ptr as usize, offset as usize);
        write_u16(data, OFFSET_FREE_PTR, free_ptr - length);

        for s in 0..slot_cnt {
            let (o, l) = self.slot(s);
            if o != EMPTY_SLOT && o > offset {
                self.set_slot(s, o - length, l);
            }
        }
        self.set_slot(rid.slot_no, EMPTY_SLOT, 0);

        let mut reclaimed = length as usize;
        let mut slot_cnt = slot_cnt;
        while slot_cnt > 0 && self.slot(slot_cnt - 1).0 == EMPTY_SLOT {
            slot_cnt -= 1;
            reclaimed += SLOT_SIZE;
        }
        let data = self.get_data_mut();
        let free_space = read_u16(data, OFFSET_FREE_SPACE);
        write_u16(data, OFFSET_SLOT_CNT, slot_cnt);
        write_u16(data, OFFSET_FREE_SPACE, free_space + reclaimed as u16);
        Ok(())
    }

    pub fn get_record(&self, rid: Rid) -> Result<&[u8]> {
        self.check_live(rid)?;
        let (offset, length) = self.slot(rid.slot_no);
        let start = offset as usize;
        Ok(&self.get_data()[start..start + length as usize])
    }

    pub fn get_record_mut(&mut self, rid: Rid) -> Result<&mut [u8]> {
        self.check_live(rid)?;
        let (offset, length) = self.slot(rid.slot_no);
        let start = offset as usize;
        Ok(&mut self.get_data_mut()[start..start + length as usize])
    }

    pub fn first_record(&self) -> Option<Rid> {
        self.live_from(0)
    }

    // `rid` itself need not be live.
    pub fn next_record(&self, rid: Rid) -> Option<Rid> {
        self.live_from(rid.slot_no as u32 + 1)
    }

    fn live_from(&self, start: u32) -> Option<Rid> {
        let page_no = self.page_no();
        (start..self.slot_cnt() as u32)
            .map(|s| s as SlotId)
            .find(|&s| self.is_live(s))
            .map(|s| Rid::new(page_no, s))
    }

    fn check_live(&self, rid: Rid) -> Result<()> {
        if rid.page_no != self.page_no() || !self.is_live(rid.slot_no) {
            bail!(StorageError::RecordNotFound(rid));
        }
        Ok(())
    }
}
