//! Console rendering of patients, bills and operator-facing errors.

use std::io::{self, Write};
use ward_ledger::{Error, Patient, DAILY_RATE};

const RULE_WIDTH: usize = 90;

/// Every amount shown to the operator uses two decimals.
pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

pub fn patient_header(out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{:<6}{:<18}{:<5}{:<13}{:<18}{:<6}{:<6}{:<10}",
        "ID", "Name", "Age", "Contact", "Disease", "Bed", "Days", "Bill"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

/// One table row.
pub fn patient_row(out: &mut impl Write, p: &Patient) -> io::Result<()> {
    writeln!(
        out,
        "{:<6}{:<18}{:<5}{:<13}{:<18}{:<6}{:<6}{:<10}",
        p.id,
        p.name,
        p.age,
        p.contact,
        p.disease,
        p.bed_number,
        p.days_admitted,
        money(p.total_bill())
    )
}

pub fn patient_table<'a>(
    out: &mut impl Write,
    patients: impl IntoIterator<Item = &'a Patient>,
) -> io::Result<()> {
    let mut patients = patients.into_iter().peekable();
    if patients.peek().is_none() {
        return writeln!(out, "\nNo patients!");
    }
    writeln!(out, "\n--- All Patients ---")?;
    patient_header(out)?;
    for p in patients {
        patient_row(out, p)?;
    }
    Ok(())
}

pub fn bill_breakdown(out: &mut impl Write, p: &Patient) -> io::Result<()> {
    writeln!(out, "\n--- Bill Breakdown ---")?;
    writeln!(
        out,
        "Room: {} days x Rs.{} = Rs.{}",
        p.days_admitted,
        money(DAILY_RATE),
        money(p.room_charge())
    )?;
    writeln!(out, "Additional: Rs.{}", money(p.additional_charges))?;
    writeln!(out, "TOTAL: Rs.{}", money(p.total_bill()))
}

pub fn patient_details(out: &mut impl Write, p: &Patient) -> io::Result<()> {
    writeln!(out, "\n--- Patient Found ---")?;
    patient_row(out, p)?;
    bill_breakdown(out, p)
}

/// Operator-facing message for a failed ward operation.
pub fn describe(err: &Error) -> String {
    match err {
        Error::NotFound(_) => "Patient not found!".to_string(),
        Error::InvalidAmount(_) => "Invalid!".to_string(),
        Error::AlreadyPaid(_) => "Bill already cleared!".to_string(),
        Error::InsufficientPayment { required, .. } => {
            format!("Partial payment not allowed! Need Rs.{}", money(*required))
        }
        Error::BillNotCleared { .. } => "Cannot discharge! Clear bill first!".to_string(),
        other => format!("Error: {other}"),
    }
}
