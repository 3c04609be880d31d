//! Per-component dirty mask.
//!
//! Field `i` of a component's state maps to bit `i % 32` of word `i / 32`.
//! A mask with no bits set means the component has no pending update.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyMask {
    words: Vec<u32>,
}

impl DirtyMask {
    pub const fn clean() -> Self {
        Self { words: Vec::new() }
    }

    /// Mask with the first `fields` bits set.
    pub fn all(fields: usize) -> Self {
        let mut mask = Self::clean();
        for field in 0..fields {
            mask.mark(field);
        }
        mask
    }

    pub fn is_clean(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    pub fn mark(&mut self, field: usize) {
        let word = field / 32;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (field % 32);
    }

    pub fn contains(&self, field: usize) -> bool {
        self.words
            .get(field / 32)
            .is_some_and(|word| word & (1 << (field % 32)) != 0)
    }

    /// True if any of `fields` is marked.
    pub fn any(&self, fields: &[usize]) -> bool {
        fields.iter().any(|field| self.contains(*field))
    }

    /// Take the current bits, leaving the mask clean.
    pub fn take(&mut self) -> DirtyMask {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_contains() {
        let mut mask = DirtyMask::clean();
        assert!(mask.is_clean());

        mask.mark(0);
        mask.mark(33);
        assert!(!mask.is_clean());
        assert!(mask.contains(0));
        assert!(mask.contains(33));
        assert!(!mask.contains(1));
        assert!(!mask.contains(200));
        assert!(mask.any(&[5, 33]));
    }

    #[test]
    fn test_take_leaves_clean() {
        let mut mask = DirtyMask::all(3);
        let taken = mask.take();
        assert!(mask.is_clean());
        assert!(taken.contains(2));
        assert!(!taken.contains(3));
    }
}
