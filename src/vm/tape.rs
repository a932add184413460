use std::ops::{Index, IndexMut};

/// Fixed-length circular memory. Cells hold values in `[0, cell_size)`
/// except right after an input, which is stored unreduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u32>,
    cell_size: u32,
}

impl Tape {
    /// Both `len` and `cell_size` must be positive; `Vm::new` checks this.
    pub fn alloc(len: usize, cell_size: u32) -> Tape {
        Tape {
            cells: vec![0; len],
            cell_size,
        }
    }

    pub fn reset(&mut self) {
        for it in self.cells.iter_mut() {
            *it = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Adds `delta` to a cell modulo the cell size.
    pub fn add(&mut self, index: usize, delta: i64) {
        let sum = i64::from(self.cells[index]) + delta;
        self.cells[index] = sum.rem_euclid(i64::from(self.cell_size)) as u32;
    }

    /// Moves `ptr` by `delta` modulo the tape length.
    pub fn offset(&self, ptr: usize, delta: i64) -> usize {
        (ptr as i64 + delta).rem_euclid(self.cells.len() as i64) as usize
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }
}

impl Index<usize> for Tape {
    type Output = u32;

    fn index(&self, index: usize) -> &u32 {
        &self.cells[index]
    }
}

impl IndexMut<usize> for Tape {
    fn index_mut(&mut self, index: usize) -> &mut u32 {
        &mut self.cells[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_wraps_both_ways() {
        let mut tape = Tape::alloc(4, 256);
        tape.add(0, -1);
        assert_eq!(tape[0], 255);
        tape.add(0, 3);
        assert_eq!(tape[0], 2);
        tape.add(1, -513);
        assert_eq!(tape[1], 255);
    }

    #[test]
    fn test_add_reduces_unreduced_input() {
        let mut tape = Tape::alloc(1, 256);
        tape[0] = 0x263a;
        tape.add(0, 0x100);
        assert_eq!(tape[0], 0x3a);
    }

    #[test]
    fn test_offset_wraps() {
        let tape = Tape::alloc(10, 256);
        assert_eq!(tape.offset(0, -1), 9);
        assert_eq!(tape.offset(9, 1), 0);
        assert_eq!(tape.offset(3, -25), 8);
        assert_eq!(tape.offset(3, 20), 3);
    }

    #[test]
    fn test_reset() {
        let mut tape = Tape::alloc(3, 2);
        tape.add(2, 1);
        tape.reset();
        assert_eq!(tape.cells(), &[0, 0, 0]);
        assert_eq!(tape.cell_size(), 2);
        assert_eq!(tape.len(), 3);
    }
}
