//! Single-slot "most recent message" cache.
//!
//! The CAN receive handler is the only producer and the main loop the
//! only consumer. The producer always fills the buffer the consumer is
//! not pointed at, then flips the index; a generation counter (odd while
//! a write is in flight) lets the consumer detect the rare case where a
//! handler lapped it mid-copy and simply read again. Every field is an
//! atomic, so there is no `unsafe` and no lock.
//!
//! Unread messages are overwritten silently. Consumers must tolerate
//! seeing the same message on consecutive polls.

use core::sync::atomic::{fence, AtomicU16, AtomicU32, AtomicU8, Ordering};

use super::{Message, FRAME_CAPACITY};

struct FrameCell {
    id: AtomicU16,
    len: AtomicU8,
    data: [AtomicU8; FRAME_CAPACITY],
}

impl FrameCell {
    const fn new() -> Self {
        Self {
            id: AtomicU16::new(0),
            len: AtomicU8::new(0),
            data: [const { AtomicU8::new(0) }; FRAME_CAPACITY],
        }
    }

    fn store(&self, message: &Message) {
        self.id.store(message.id(), Ordering::Relaxed);
        self.len.store(message.len() as u8, Ordering::Relaxed);
        for (cell, byte) in self.data.iter().zip(message.data()) {
            cell.store(*byte, Ordering::Relaxed);
        }
    }

    fn load(&self) -> Message {
        let mut data = [0u8; FRAME_CAPACITY];
        for (byte, cell) in data.iter_mut().zip(&self.data) {
            *byte = cell.load(Ordering::Relaxed);
        }
        Message::from_raw(
            self.id.load(Ordering::Relaxed),
            self.len.load(Ordering::Relaxed),
            data,
        )
    }
}

/// Lock-free double-buffered message cache.
pub struct MessageSlot {
    frames: [FrameCell; 2],
    /// Index of the buffer holding the latest complete message.
    active: AtomicU8,
    /// 0 = never written; odd = write in progress; even = stable.
    generation: AtomicU32,
}

impl MessageSlot {
    pub const fn new() -> Self {
        Self {
            frames: [FrameCell::new(), FrameCell::new()],
            active: AtomicU8::new(0),
            generation: AtomicU32::new(0),
        }
    }

    /// Overwrite the cached message. Producer side (receive handler).
    pub fn publish(&self, message: &Message) {
        let generation = self.generation.load(Ordering::Relaxed);
        self.generation
            .store(generation.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        let next = 1 - (self.active.load(Ordering::Relaxed) & 1);
        self.frames[next as usize].store(message);
        self.active.store(next, Ordering::Release);

        self.generation
            .store(generation.wrapping_add(2), Ordering::Release);
    }

    /// Copy out the latest message, if any has ever arrived. Consumer side.
    pub fn latest(&self) -> Option<Message> {
        loop {
            let before = self.generation.load(Ordering::Acquire);
            if before == 0 {
                return None;
            }
            if before & 1 == 1 {
                core::hint::spin_loop();
                continue;
            }

            let index = self.active.load(Ordering::Acquire) & 1;
            let message = self.frames[index as usize].load();

            fence(Ordering::Acquire);
            if self.generation.load(Ordering::Relaxed) == before {
                return Some(message);
            }
        }
    }

    /// Number of messages published so far (wrapping).
    ///
    /// Lets a consumer tell a fresh message from a repeat of the last one.
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire) / 2
    }
}

impl Default for MessageSlot {
    fn default() -> Self {
        Self::new()
    }
}
