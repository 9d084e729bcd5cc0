//! Ward registry: admissions, billing, discharge and write-through persistence.
//!
//! Every mutating operation validates first, then mutates, then writes the
//! whole ledger to the store before returning. Under the strict persistence
//! policy a failed write rolls the in-memory change back.

use crate::beds::{BedConflict, BedTable};
use crate::codec::{legacy, Ledger, LoadMode};
use crate::config::{PersistencePolicy, WardConfig};
use crate::error::{Error, Result};
use crate::patient::{Patient, MAX_AGE, MIN_AGE};
use crate::store::{FileStore, RecordStore};

/// Outcome of a settled bill.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub patient_id: u32,
    pub billed: f64,
    pub tendered: f64,
    /// Overpayment handed back.
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DischargeSummary {
    pub patient_id: u32,
    pub name: String,
    pub days_admitted: u32,
    pub bed_number: u32,
}

pub struct Ward<S: RecordStore> {
    ledger: Ledger,
    beds: BedTable,
    store: S,
    policy: PersistencePolicy,
    /// Set when a best-effort write failed; flushed again on drop.
    dirty: bool,
}

impl Ward<FileStore> {
    /// Open the ward backed by the configured data file.
    pub fn open(config: &WardConfig) -> Result<Self> {
        let store = FileStore::new(config.data_file.clone(), config.format, config.load_mode);
        Self::with_store(store, config)
    }
}

impl<S: RecordStore> Ward<S> {
    /// Load prior state from `store` and rebuild bed occupancy. Only capacity,
    /// load mode and persistence policy are taken from `config`.
    pub fn with_store(store: S, config: &WardConfig) -> Result<Self> {
        config.validate()?;
        let ledger = store.load()?.unwrap_or_default();
        let beds = rebuild_beds(config.capacity, &ledger.patients, config.load_mode)?;
        tracing::info!(
            capacity = config.capacity,
            occupied = beds.occupied_count(),
            records = ledger.patients.len(),
            "Ward opened"
        );
        Ok(Self {
            ledger,
            beds,
            store,
            policy: config.persistence,
            dirty: false,
        })
    }

    pub fn admit(
        &mut self,
        name: impl Into<String>,
        age: i32,
        contact: impl Into<String>,
        disease: impl Into<String>,
    ) -> Result<Patient> {
        let (name, contact, disease) = (name.into(), contact.into(), disease.into());
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(Error::InvalidAge(age));
        }
        check_text("name", &name)?;
        check_text("contact", &contact)?;
        check_text("disease", &disease)?;

        let patient = self.transact(move |ledger, beds| {
            let id = ledger.next_patient_id;
            let next_id = id.checked_add(1).ok_or_else(|| Error::CorruptStore {
                line: 1,
                message: "patient ID counter exhausted".into(),
            })?;
            let bed = beds.claim_first_free().ok_or(Error::BedUnavailable {
                capacity: beds.capacity(),
            })?;
            ledger.next_patient_id = next_id;
            let patient = Patient::admitted(id, name, age, contact, disease, bed);
            ledger.patients.push(patient.clone());
            Ok(patient)
        })?;

        tracing::info!(id = patient.id, bed = patient.bed_number, "Patient admitted");
        Ok(patient)
    }

    /// Active patient with this ID. Discharged records are never matched.
    pub fn find_active(&self, id: u32) -> Option<&Patient> {
        self.ledger
            .patients
            .iter()
            .find(|p| p.is_admitted && p.id == id)
    }

    /// Active patients in admission order.
    pub fn list_active(&self) -> impl Iterator<Item = &Patient> {
        self.ledger.patients.iter().filter(|p| p.is_admitted)
    }

    /// Every record ever admitted, discharged ones included.
    pub fn patients(&self) -> &[Patient] {
        &self.ledger.patients
    }

    pub fn update_disease(&mut self, id: u32, disease: impl Into<String>) -> Result<()> {
        let disease = disease.into();
        check_text("disease", &disease)?;
        self.transact(move |ledger, _| {
            let index = active_index(ledger, id)?;
            ledger.patients[index].disease = disease;
            Ok(())
        })?;
        tracing::info!(id, "Diagnosis updated");
        Ok(())
    }

    /// Add to the patient's charges and return the new total.
    pub fn add_charges(&mut self, id: u32, amount: f64) -> Result<f64> {
        let total = self.transact(|ledger, _| {
            let index = active_index(ledger, id)?;
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::InvalidAmount(amount));
            }
            let patient = &mut ledger.patients[index];
            let charges = patient.additional_charges + amount;
            if !charges.is_finite() || !(patient.room_charge() + charges).is_finite() {
                return Err(Error::InvalidAmount(amount));
            }
            patient.add_charge(amount);
            Ok(patient.total_bill())
        })?;
        tracing::info!(id, amount, total, "Charge added");
        Ok(total)
    }

    pub fn increment_stay(&mut self, id: u32) -> Result<&Patient> {
        let index = self.transact(|ledger, _| {
            let index = active_index(ledger, id)?;
            ledger.patients[index].increment_day();
            Ok(index)
        })?;
        let patient = &self.ledger.patients[index];
        tracing::info!(id, days = patient.days_admitted, "Stay extended");
        Ok(patient)
    }

    /// Settle the whole bill. Partial payments are refused without changing anything.
    pub fn pay_bill(&mut self, id: u32, payment: f64) -> Result<PaymentReceipt> {
        let receipt = self.transact(|ledger, _| {
            let index = active_index(ledger, id)?;
            let patient = &mut ledger.patients[index];
            let billed = patient.total_bill();
            if billed == 0.0 {
                return Err(Error::AlreadyPaid(id));
            }
            if !payment.is_finite() {
                return Err(Error::InvalidAmount(payment));
            }
            if payment < billed {
                return Err(Error::InsufficientPayment {
                    required: billed,
                    tendered: payment,
                });
            }
            let paid = patient.amount_paid + billed;
            if !paid.is_finite() {
                return Err(Error::InvalidAmount(payment));
            }
            patient.amount_paid = paid;
            patient.clear_bill();
            Ok(PaymentReceipt {
                patient_id: id,
                billed,
                tendered: payment,
                change: payment - billed,
            })
        })?;
        tracing::info!(
            id,
            billed = receipt.billed,
            change = receipt.change,
            "Bill settled"
        );
        Ok(receipt)
    }

    /// Release the bed and close the episode in one step. The bill must be zero.
    pub fn discharge(&mut self, id: u32) -> Result<DischargeSummary> {
        let summary = self.transact(|ledger, beds| {
            let index = active_index(ledger, id)?;
            let patient = &mut ledger.patients[index];
            let outstanding = patient.total_bill();
            if outstanding != 0.0 {
                return Err(Error::BillNotCleared { id, outstanding });
            }
            patient.discharge();
            let summary = DischargeSummary {
                patient_id: id,
                name: patient.name.clone(),
                days_admitted: patient.days_admitted,
                bed_number: patient.bed_number,
            };

            // A damaged store can leave two active records on one bed.
            let bed = summary.bed_number;
            let shared = ledger
                .patients
                .iter()
                .any(|p| p.is_admitted && p.bed_number == bed);
            if shared {
                tracing::warn!(id, bed, "Bed kept occupied by another active record");
            } else if !beds.release(bed) {
                tracing::warn!(id, bed, "Discharged patient's bed was not marked occupied");
            }
            Ok(summary)
        })?;
        tracing::info!(id, bed = summary.bed_number, "Patient discharged");
        Ok(summary)
    }

    pub fn capacity(&self) -> usize {
        self.beds.capacity()
    }

    pub fn occupied_beds(&self) -> usize {
        self.beds.occupied_count()
    }

    pub fn free_beds(&self) -> usize {
        self.beds.free_count()
    }

    pub fn is_bed_occupied(&self, bed: u32) -> bool {
        self.beds.is_occupied(bed)
    }

    pub fn next_patient_id(&self) -> u32 {
        self.ledger.next_patient_id
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Write the current state regardless of policy.
    pub fn flush(&mut self) -> Result<()> {
        self.store.save(&self.ledger)?;
        self.dirty = false;
        Ok(())
    }

    fn transact<T>(
        &mut self,
        op: impl FnOnce(&mut Ledger, &mut BedTable) -> Result<T>,
    ) -> Result<T> {
        let snapshot = match self.policy {
            PersistencePolicy::Strict => Some((self.ledger.clone(), self.beds.clone())),
            PersistencePolicy::BestEffort => None,
        };

        let out = op(&mut self.ledger, &mut self.beds)?;

        match self.store.save(&self.ledger) {
            Ok(()) => {
                self.dirty = false;
                Ok(out)
            }
            Err(err) => match snapshot {
                Some((ledger, beds)) => {
                    tracing::error!(error = %err, "Failed to persist ward state, change rolled back");
                    self.ledger = ledger;
                    self.beds = beds;
                    Err(err)
                }
                None => {
                    tracing::warn!(error = %err, "Failed to persist ward state, change kept in memory");
                    self.dirty = true;
                    Ok(out)
                }
            },
        }
    }
}

impl<S: RecordStore> Drop for Ward<S> {
    fn drop(&mut self) {
        if !self.dirty {
            return;
        }
        match self.store.save(&self.ledger) {
            Ok(()) => tracing::info!("Unsaved ward state written at shutdown"),
            Err(err) => tracing::error!(error = %err, "Ward state lost at shutdown"),
        }
    }
}

fn active_index(ledger: &Ledger, id: u32) -> Result<usize> {
    ledger
        .patients
        .iter()
        .position(|p| p.is_admitted && p.id == id)
        .ok_or(Error::NotFound(id))
}

fn check_text(field: &'static str, value: &str) -> Result<()> {
    if legacy::is_encodable(value) {
        Ok(())
    } else {
        Err(Error::UnencodableText { field })
    }
}

/// Derive occupancy from the admission flags of loaded records.
fn rebuild_beds(capacity: usize, patients: &[Patient], mode: LoadMode) -> Result<BedTable> {
    let mut beds = BedTable::new(capacity);
    for p in patients.iter().filter(|p| p.is_admitted) {
        let Err(conflict) = beds.occupy(p.bed_number) else {
            continue;
        };
        let message = match conflict {
            BedConflict::OutOfRange => {
                format!("bed {} is outside the ward (1..={capacity})", p.bed_number)
            }
            BedConflict::AlreadyOccupied => {
                format!("bed {} is already held by another patient", p.bed_number)
            }
        };
        match mode {
            LoadMode::Strict => return Err(Error::CorruptRecord { id: p.id, message }),
            LoadMode::Lenient => tracing::warn!(
                id = p.id,
                bed = p.bed_number,
                "Skipping bed for loaded record: {message}"
            ),
        }
    }
    Ok(beds)
}
