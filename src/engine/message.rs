#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::params::Param;

/// Control traffic from a non-real-time thread to the audio callback.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineMessage {
    NoteOn { note: u8, velocity: f32, offset: usize },
    NoteOff { note: u8, offset: usize },
    AllNotesOff,
    PitchBend(f32),
    SetParam(Param, f32),
    ClearTape,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        Consumer::pop(self).ok()
    }
}

/// Lock-free single-producer/single-consumer control queue.
#[cfg(feature = "rtrb")]
pub fn message_channel(capacity: usize) -> (Producer<EngineMessage>, Consumer<EngineMessage>) {
    RingBuffer::new(capacity)
}
