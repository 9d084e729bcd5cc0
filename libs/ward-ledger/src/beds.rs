//! Bed occupancy table.
//!
//! Occupancy is derived state: it is rebuilt from the active patient records
//! on load and only changed by the ward alongside the matching record.

/// Fixed-capacity occupancy map. Bed numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedTable {
    occupied: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedConflict {
    /// Bed number is 0 or beyond capacity.
    OutOfRange,
    AlreadyOccupied,
}

impl BedTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            occupied: vec![false; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.occupied.len()
    }

    /// Lowest-numbered free bed.
    pub fn first_free(&self) -> Option<u32> {
        self.occupied
            .iter()
            .position(|taken| !taken)
            .and_then(|index| u32::try_from(index + 1).ok())
    }

    pub fn is_occupied(&self, bed: u32) -> bool {
        self.slot(bed).is_some_and(|index| self.occupied[index])
    }

    pub fn occupy(&mut self, bed: u32) -> Result<(), BedConflict> {
        let index = self.slot(bed).ok_or(BedConflict::OutOfRange)?;
        if self.occupied[index] {
            return Err(BedConflict::AlreadyOccupied);
        }
        self.occupied[index] = true;
        Ok(())
    }

    /// Occupy the lowest-numbered free bed.
    pub fn claim_first_free(&mut self) -> Option<u32> {
        let bed = self.first_free()?;
        self.occupied[bed as usize - 1] = true;
        Some(bed)
    }

    /// Returns whether the bed was occupied.
    pub fn release(&mut self, bed: u32) -> bool {
        match self.slot(bed) {
            Some(index) => std::mem::replace(&mut self.occupied[index], false),
            None => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|taken| **taken).count()
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.occupied_count()
    }

    fn slot(&self, bed: u32) -> Option<usize> {
        let index = usize::try_from(bed).ok()?.checked_sub(1)?;
        (index < self.occupied.len()).then_some(index)
    }
}
