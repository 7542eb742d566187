use crate::buffer::replace::Replacer;
use crate::FrameId;

// Second-chance clock over the frames of the pool. A frame is a candidate
// only while it is unpinned; a candidate whose reference bit is set is
// skipped once, clearing the bit.
pub struct ClockReplacer {
    candidate: Vec<bool>,
    referenced: Vec<bool>,
    hand: usize,
    size: usize,
}

impl ClockReplacer {
    pub fn new(num_pages: usize) -> Self {
        Self {
            candidate: vec![false; num_pages],
            referenced: vec![false; num_pages],
            hand: 0,
            size: 0,
        }
    }
}

impl Replacer for ClockReplacer {
    fn victim(&mut self) -> Option<FrameId> {
        if self.size == 0 {
            return None;
        }
        // two sweeps are enough: the first clears every reference bit
        loop {
            let frame = self.hand;
            self.hand = (self.hand + 1) % self.candidate.len();
            if !self.candidate[frame] {
                continue;
            }
            if self.referenced[frame] {
                self.referenced[frame] = false;
                continue;
            }
            self.candidate[frame] = false;
            self.size -= 1;
            return Some(frame as FrameId);
        }
    }

    fn pin(&mut self, frame_id: FrameId) {
        let frame = frame_id as usize;
        if self.candidate[frame] {
            self.candidate[frame] = false;
            self.size -= 1;
        }
    }

    fn unpin(&mut self, frame_id: FrameId) {
        let frame = frame_id as usize;
        if !self.candidate[frame] {
            self.candidate[frame] = true;
            self.size += 1;
        }
        self.referenced[frame] = true;
    }

    fn remove(&mut self, frame_id: FrameId) {
        self.pin(frame_id);
        self.referenced[frame_id as usize] = false;
    }

    fn size(&self) -> usize {
        self.size
    }
}
