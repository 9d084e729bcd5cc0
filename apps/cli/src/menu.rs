//! Interactive nine-choice menu driving the ward.
//!
//! Each choice maps to one ward operation. Refusals are printed and the menu is
//! shown again; only console I/O failures end the loop with an error. End of
//! input behaves like Exit.

use std::io::{self, BufRead, Write};
use ward_ledger::{Error, RecordStore, Ward};

use crate::render::{self, money};

pub struct Menu<'w, S: RecordStore, R, W> {
    ward: &'w mut Ward<S>,
    input: R,
    out: W,
    eof: bool,
}

impl<'w, S: RecordStore, R: BufRead, W: Write> Menu<'w, S, R, W> {
    pub fn new(ward: &'w mut Ward<S>, input: R, out: W) -> Self {
        Self {
            ward,
            input,
            out,
            eof: false,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.show_choices()?;
            let Some(choice) = self.prompt("Choice: ")? else {
                break;
            };
            match choice.parse::<u32>() {
                Ok(1) => self.admit()?,
                Ok(2) => render::patient_table(&mut self.out, self.ward.list_active())?,
                Ok(3) => self.search()?,
                Ok(4) => self.update_disease()?,
                Ok(5) => self.add_to_bill()?,
                Ok(6) => self.increment_day()?,
                Ok(7) => self.pay_bill()?,
                Ok(8) => self.discharge()?,
                Ok(9) => break,
                _ => writeln!(self.out, "\nInvalid choice!")?,
            }
            if self.eof {
                break;
            }
        }
        writeln!(self.out, "\nThank you!")?;
        self.out.flush()
    }

    fn show_choices(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n=== Hospital Management System ===")?;
        writeln!(self.out, "1. Admit Patient\n2. View Patients\n3. Search Patient")?;
        writeln!(self.out, "4. Update Patient\n5. Add to Bill\n6. Increment Days")?;
        writeln!(self.out, "7. Pay Bill\n8. Discharge Patient\n9. Exit")
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.eof = true;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt for a number. Unparseable input is reported and yields `None`.
    fn prompt_number<T: std::str::FromStr>(&mut self, label: &str) -> io::Result<Option<T>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.out, "\nInvalid number: '{raw}'")?;
                Ok(None)
            }
        }
    }

    fn prompt_id(&mut self) -> io::Result<Option<u32>> {
        self.prompt_number("\nPatient ID: ")
    }

    fn report(&mut self, err: &Error) -> io::Result<()> {
        if !err.is_domain() {
            tracing::error!(error = %err, "Ward operation failed");
        }
        writeln!(self.out, "\n{}", render::describe(err))
    }

    fn admit(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n--- Admit Patient ---")?;
        let Some(name) = self.prompt("Name: ")? else {
            return Ok(());
        };
        let Some(age) = self.prompt_number::<i32>("Age: ")? else {
            return Ok(());
        };
        let Some(contact) = self.prompt("Contact: ")? else {
            return Ok(());
        };
        let Some(disease) = self.prompt("Disease: ")? else {
            return Ok(());
        };

        match self.ward.admit(name, age, contact, disease) {
            Ok(p) => writeln!(
                self.out,
                "\nAdmitted! ID:{} Bed:{} Charge:Rs.{}/day",
                p.id,
                p.bed_number,
                money(ward_ledger::DAILY_RATE)
            ),
            Err(err) => self.report(&err),
        }
    }

    fn search(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id()? else {
            return Ok(());
        };
        match self.ward.find_active(id) {
            Some(p) => render::patient_details(&mut self.out, p),
            None => self.report(&Error::NotFound(id)),
        }
    }

    fn update_disease(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id()? else {
            return Ok(());
        };
        if self.ward.find_active(id).is_none() {
            return self.report(&Error::NotFound(id));
        }
        let Some(disease) = self.prompt("New disease: ")? else {
            return Ok(());
        };
        match self.ward.update_disease(id, disease) {
            Ok(()) => writeln!(self.out, "\nUpdated!"),
            Err(err) => self.report(&err),
        }
    }

    fn add_to_bill(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id()? else {
            return Ok(());
        };
        let Some(p) = self.ward.find_active(id) else {
            return self.report(&Error::NotFound(id));
        };
        render::bill_breakdown(&mut self.out, p)?;
        let Some(amount) = self.prompt_number::<f64>("\nAdd amount: Rs.")? else {
            return Ok(());
        };
        match self.ward.add_charges(id, amount) {
            Ok(total) => writeln!(self.out, "\nAdded! New total: Rs.{}", money(total)),
            Err(err) => self.report(&err),
        }
    }

    fn increment_day(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id()? else {
            return Ok(());
        };
        let outcome = self
            .ward
            .increment_stay(id)
            .map(|p| (p.days_admitted, p.total_bill()));
        match outcome {
            Ok((days, bill)) => writeln!(
                self.out,
                "\nDay incremented! Days:{days} Bill:Rs.{}",
                money(bill)
            ),
            Err(err) => self.report(&err),
        }
    }

    fn pay_bill(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id()? else {
            return Ok(());
        };
        let Some(p) = self.ward.find_active(id) else {
            return self.report(&Error::NotFound(id));
        };
        render::bill_breakdown(&mut self.out, p)?;
        if p.is_settled() {
            return self.report(&Error::AlreadyPaid(id));
        }
        let Some(payment) = self.prompt_number::<f64>("\nPayment: Rs.")? else {
            return Ok(());
        };
        match self.ward.pay_bill(id, payment) {
            Ok(receipt) => {
                if receipt.change > 0.0 {
                    writeln!(self.out, "Change: Rs.{}", money(receipt.change))?;
                }
                writeln!(self.out, "\n*** PAID! Patient can be discharged ***")
            }
            Err(err) => self.report(&err),
        }
    }

    fn discharge(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_id()? else {
            return Ok(());
        };
        match self.ward.discharge(id) {
            Ok(summary) => {
                writeln!(self.out, "\n--- Discharge ---")?;
                writeln!(self.out, "Name: {}", summary.name)?;
                writeln!(self.out, "Days: {}", summary.days_admitted)?;
                writeln!(self.out, "Bill: Rs.{} (PAID)", money(0.0))?;
                writeln!(self.out, "\nDischarged!")
            }
            Err(err @ Error::BillNotCleared { .. }) => {
                self.report(&err)?;
                match self.ward.find_active(id) {
                    Some(p) => render::bill_breakdown(&mut self.out, p),
                    None => Ok(()),
                }
            }
            Err(err) => self.report(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ward_ledger::{MemoryStore, StoreFormat, WardConfig};

    fn ward(capacity: usize) -> Ward<MemoryStore> {
        let config = WardConfig {
            capacity,
            ..WardConfig::default()
        };
        Ward::with_store(MemoryStore::new(StoreFormat::Legacy), &config).unwrap()
    }

    fn run_script(ward: &mut Ward<MemoryStore>, script: &str) -> String {
        let mut out = Vec::new();
        Menu::new(ward, script.as_bytes(), &mut out).run().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn admission_to_discharge_run() {
        let mut ward = ward(2);
        let script = "1\nAsha\n30\n555\nflu\n\
                      6\n1\n\
                      6\n1\n\
                      7\n1\n5000\n\
                      8\n1\n\
                      7\n1\n9500\n\
                      8\n1\n\
                      2\n\
                      9\n";
        let out = run_script(&mut ward, script);

        assert!(out.contains("Admitted! ID:1 Bed:1 Charge:Rs.3000.00/day"), "{out}");
        assert!(out.contains("Day incremented! Days:3 Bill:Rs.9000.00"));
        assert!(out.contains("Partial payment not allowed! Need Rs.9000.00"));
        assert!(out.contains("Cannot discharge! Clear bill first!"));
        assert!(out.contains("Change: Rs.500.00"));
        assert!(out.contains("*** PAID! Patient can be discharged ***"));
        assert!(out.contains("--- Discharge ---\nName: Asha\nDays: 3\nBill: Rs.0.00 (PAID)"));
        assert!(out.contains("No patients!"));
        assert!(out.ends_with("\nThank you!\n"));

        assert_eq!(ward.list_active().count(), 0);
        assert!(!ward.is_bed_occupied(1));
        assert_eq!(ward.patients()[0].amount_paid, 9000.0);
    }

    #[test]
    fn invalid_choices_reprompt_and_eof_exits() {
        let mut ward = ward(1);
        let out = run_script(&mut ward, "0\nabc\n12\n");
        assert_eq!(out.matches("Invalid choice!").count(), 3);
        assert_eq!(out.matches("Choice: ").count(), 4);
        assert!(out.ends_with("\nThank you!\n"));
    }

    #[test]
    fn refusals_are_reported_without_changes() {
        let mut ward = ward(1);
        let script = "1\nOld\n150\n1\nx\n\
                      1\nAsha\nthirty\n\
                      3\n7\n\
                      5\n7\n\
                      9\n";
        let out = run_script(&mut ward, script);
        assert!(out.contains("Error: Invalid age: 150"));
        assert!(out.contains("Invalid number: 'thirty'"));
        assert_eq!(out.matches("Patient not found!").count(), 2);
        assert!(ward.patients().is_empty());
        assert_eq!(ward.next_patient_id(), 1);
    }

    #[test]
    fn full_ward_and_settled_bill_messages() {
        let mut ward = ward(1);
        let script = "1\nAsha\n30\n555\nflu\n\
                      1\nRavi\n40\n556\ncold\n\
                      7\n1\n3000\n\
                      7\n1\n\
                      5\n1\n-5\n\
                      4\n1\npneumonia\n\
                      3\n1\n\
                      9\n";
        let out = run_script(&mut ward, script);
        assert!(out.contains("Error: No beds available (all 1 beds occupied)"));
        assert!(out.contains("Bill already cleared!"));
        assert!(out.contains("\nInvalid!\n"));
        assert!(out.contains("Updated!"));
        assert!(out.contains("--- Patient Found ---"));
        assert_eq!(
            ward.find_active(1).map(|p| p.disease.as_str()),
            Some("pneumonia")
        );
        assert_eq!(ward.patients().len(), 1);
    }
}
