//! The ping-pong buffer pair that closes the feedback loop.
//!
//! ```text
//! frame k:    read = A ──sample──▶ shader ──draw──▶ write = B
//! swap
//! frame k+1:  read = B ──sample──▶ shader ──draw──▶ write = A
//! ```
//!
//! The pair owns both targets and only hands out the role-specific one, so
//! the same buffer can never be sampled and rendered to in one frame.

/// Identifies one of the two physical buffers, independent of its role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// Two equally sized render targets with alternating read/write roles.
///
/// Generic over the target type so the swap discipline does not depend on a
/// particular graphics backend.
#[derive(Debug)]
pub struct FeedbackPair<T> {
    a: T,
    b: T,
    read: Slot,
    width: u32,
    height: u32,
}

impl<T> FeedbackPair<T> {
    /// Allocate both targets at `width` x `height`. Slot `A` starts as the read
    /// buffer.
    pub fn allocate<F>(width: u32, height: u32, mut alloc: F) -> Self
    where
        F: FnMut(&str, u32, u32) -> T,
    {
        Self {
            a: alloc("Feedback Target A", width, height),
            b: alloc("Feedback Target B", width, height),
            read: Slot::A,
            width,
            height,
        }
    }

    /// Reallocate both targets at the new size, keeping role assignment.
    ///
    /// Returns `false` without touching the targets when the size is unchanged.
    pub fn resize<F>(&mut self, width: u32, height: u32, mut alloc: F) -> bool
    where
        F: FnMut(&str, u32, u32) -> T,
    {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.a = alloc("Feedback Target A", width, height);
        self.b = alloc("Feedback Target B", width, height);
        self.width = width;
        self.height = height;
        true
    }

    /// The buffer sampled by this frame's shader stage.
    pub fn read(&self) -> &T {
        self.slot(self.read)
    }

    /// The buffer this frame's shader stage renders into.
    pub fn write(&self) -> &T {
        self.slot(self.read.other())
    }

    /// Both buffers as `(read, write)`.
    pub fn split(&self) -> (&T, &T) {
        (self.read(), self.write())
    }

    pub fn read_slot(&self) -> Slot {
        self.read
    }

    pub fn write_slot(&self) -> Slot {
        self.read.other()
    }

    /// Access a buffer by physical slot.
    pub fn slot(&self, slot: Slot) -> &T {
        match slot {
            Slot::A => &self.a,
            Slot::B => &self.b,
        }
    }

    /// Exchange read and write roles.
    pub fn swap(&mut self) {
        self.read = self.read.other();
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Fake {
        label: String,
        size: (u32, u32),
    }

    fn fake(label: &str, w: u32, h: u32) -> Fake {
        Fake {
            label: label.to_string(),
            size: (w, h),
        }
    }

    #[test]
    fn roles_alternate_with_parity() {
        let mut pair = FeedbackPair::allocate(4, 4, fake);
        for n in 0..9 {
            let expected = if n % 2 == 0 { Slot::A } else { Slot::B };
            assert_eq!(pair.read_slot(), expected, "after {n} swaps");
            assert_ne!(pair.read_slot(), pair.write_slot());
            pair.swap();
        }
    }

    #[test]
    fn write_becomes_read_after_swap() {
        let mut pair = FeedbackPair::allocate(4, 4, fake);
        let written = pair.write().label.clone();
        pair.swap();
        assert_eq!(pair.read().label, written);
    }

    #[test]
    fn resize_keeps_roles() {
        let mut pair = FeedbackPair::allocate(4, 4, fake);
        pair.swap();
        assert!(pair.resize(8, 2, fake));
        assert_eq!(pair.read_slot(), Slot::B);
        assert_eq!(pair.dimensions(), (8, 2));
        assert_eq!(pair.read().size, (8, 2));
        assert_eq!(pair.write().size, (8, 2));
    }

    #[test]
    fn resize_to_same_size_is_noop() {
        let mut allocations = 0;
        let mut pair = FeedbackPair::allocate(4, 4, |l, w, h| {
            allocations += 1;
            fake(l, w, h)
        });
        assert!(!pair.resize(4, 4, |l, w, h| {
            allocations += 1;
            fake(l, w, h)
        }));
        assert_eq!(allocations, 2);
    }
}
