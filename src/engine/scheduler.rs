/// A note event waiting for its sample offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEvent {
    On { note: u8, velocity: f32 },
    Off { note: u8 },
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    offset: usize,
    event: NoteEvent,
}

/// Fixed-capacity queue of note events keyed by sample offset into the
/// current host block.
///
/// Storage is reserved up front; `enqueue` never grows it. Events at the same
/// offset come out in the order they went in.
pub struct Scheduler {
    events: Vec<Scheduled>,
}

impl Scheduler {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Queue `event` for `offset`. Hands the event back when full.
    pub fn enqueue(&mut self, offset: usize, event: NoteEvent) -> Result<(), NoteEvent> {
        if self.events.len() == self.events.capacity() {
            return Err(event);
        }
        let at = self.events.partition_point(|e| e.offset <= offset);
        self.events.insert(at, Scheduled { offset, event });
        Ok(())
    }

    /// Offset of the earliest pending event.
    pub fn next_offset(&self) -> Option<usize> {
        self.events.first().map(|e| e.offset)
    }

    /// Take the earliest event if it is due at or before `position`.
    pub fn pop_due(&mut self, position: usize) -> Option<NoteEvent> {
        match self.events.first() {
            Some(e) if e.offset <= position => Some(self.events.remove(0).event),
            _ => None,
        }
    }

    /// Shift every pending offset back by `frames` after a chunk is rendered.
    pub fn advance(&mut self, frames: usize) {
        for e in &mut self.events {
            e.offset = e.offset.saturating_sub(frames);
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
