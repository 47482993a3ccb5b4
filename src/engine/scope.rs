use crate::SCOPE_SIZE;

/// Mono snapshot of the most recent output, for display only.
pub struct Scope {
    buffer: [f32; SCOPE_SIZE],
    len: usize,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            buffer: [0.0; SCOPE_SIZE],
            len: 0,
        }
    }

    /// Keep the tail of the block as `(L + R) / 2`.
    pub fn capture(&mut self, left: &[f32], right: &[f32]) {
        let n = left.len().min(right.len());
        let start = n.saturating_sub(SCOPE_SIZE);
        let frames = left[start..n].iter().zip(&right[start..n]);

        self.len = n - start;
        for (slot, (l, r)) in self.buffer.iter_mut().zip(frames) {
            *slot = (l + r) * 0.5;
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.buffer[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
