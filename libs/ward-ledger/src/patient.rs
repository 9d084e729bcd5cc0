//! A single admission episode and its bill.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Room charge applied for every day of a stay.
pub const DAILY_RATE: f64 = 3000.0;

/// Youngest and oldest age accepted at admission.
pub const MIN_AGE: i32 = 1;
pub const MAX_AGE: i32 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: u32,
    pub name: String,
    pub age: i32,
    pub contact: String,
    pub disease: String,
    pub bed_number: u32,
    pub additional_charges: f64,
    pub days_admitted: u32,
    pub is_admitted: bool,
    /// Sum of accepted payments. Not part of the legacy store format.
    #[serde(default)]
    pub amount_paid: f64,
}

impl Patient {
    /// Fresh admission: day one, no extra charges.
    pub fn admitted(
        id: u32,
        name: String,
        age: i32,
        contact: String,
        disease: String,
        bed_number: u32,
    ) -> Self {
        Self {
            id,
            name,
            age,
            contact,
            disease,
            bed_number,
            additional_charges: 0.0,
            days_admitted: 1,
            is_admitted: true,
            amount_paid: 0.0,
        }
    }

    pub fn room_charge(&self) -> f64 {
        f64::from(self.days_admitted) * DAILY_RATE
    }

    /// Room charge plus additional charges. Negative when charges were forced below zero.
    pub fn total_bill(&self) -> f64 {
        self.room_charge() + self.additional_charges
    }

    pub fn is_settled(&self) -> bool {
        self.total_bill() == 0.0
    }

    /// Callers reject negative amounts before getting here.
    pub fn add_charge(&mut self, amount: f64) {
        self.additional_charges += amount;
    }

    pub fn increment_day(&mut self) {
        self.days_admitted = self.days_admitted.saturating_add(1);
    }

    /// Forces the total to exactly zero by offsetting the room charge.
    pub fn clear_bill(&mut self) {
        self.additional_charges = -self.room_charge();
    }

    /// Bed release is the ward's job.
    pub fn discharge(&mut self) {
        self.is_admitted = false;
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID:{} Name:{} Bed:{}", self.id, self.name, self.bed_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asha() -> Patient {
        Patient::admitted(1, "Asha".into(), 30, "555".into(), "flu".into(), 1)
    }

    #[test]
    fn new_admission_bills_one_day() {
        let p = asha();
        assert_eq!(p.days_admitted, 1);
        assert!(p.is_admitted);
        assert_eq!(p.total_bill(), 3000.0);
    }

    #[test]
    fn bill_tracks_days_and_charges() {
        let mut p = asha();
        p.increment_day();
        p.increment_day();
        p.add_charge(450.5);
        assert_eq!(p.room_charge(), 9000.0);
        assert_eq!(p.total_bill(), 9450.5);
        assert_eq!(
            p.total_bill(),
            f64::from(p.days_admitted) * DAILY_RATE + p.additional_charges
        );
    }

    #[test]
    fn clear_bill_zeroes_total_regardless_of_charges() {
        let mut p = asha();
        p.add_charge(1234.75);
        p.increment_day();
        p.clear_bill();
        assert_eq!(p.additional_charges, -6000.0);
        assert_eq!(p.total_bill(), 0.0);
        assert!(p.is_settled());

        // Another day after settling reopens the bill at the daily rate.
        p.increment_day();
        assert_eq!(p.total_bill(), 3000.0);
    }

    #[test]
    fn discharge_only_flips_status() {
        let mut p = asha();
        p.discharge();
        assert!(!p.is_admitted);
        assert_eq!(p.bed_number, 1);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(asha().to_string(), "ID:1 Name:Asha Bed:1");
    }
}
