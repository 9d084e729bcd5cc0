//! Admission-to-discharge scenarios against the public ward API.

use std::fs;
use tempfile::tempdir;
use ward_ledger::{
    Error, LoadMode, MemoryStore, PersistencePolicy, StoreFormat, Ward, WardConfig,
};

fn ward_with_beds(capacity: usize) -> Ward<MemoryStore> {
    let config = WardConfig {
        capacity,
        ..WardConfig::default()
    };
    Ward::with_store(MemoryStore::new(StoreFormat::Legacy), &config).expect("ward opens")
}

#[test]
fn first_admission_takes_bed_one() -> anyhow::Result<()> {
    let mut ward = ward_with_beds(2);
    let asha = ward.admit("Asha", 30, "555", "flu")?;

    assert_eq!(asha.id, 1);
    assert_eq!(asha.bed_number, 1);
    assert_eq!(asha.days_admitted, 1);
    assert!(asha.is_admitted);
    assert_eq!(asha.total_bill(), 3000.0);
    assert!(ward.is_bed_occupied(1));
    Ok(())
}

#[test]
fn full_stay_lifecycle() -> anyhow::Result<()> {
    let mut ward = ward_with_beds(2);
    ward.admit("Asha", 30, "555", "flu")?;

    ward.increment_stay(1)?;
    let asha = ward.increment_stay(1)?;
    assert_eq!(asha.days_admitted, 3);
    assert_eq!(asha.total_bill(), 9000.0);

    let before = ward.find_active(1).cloned();
    match ward.pay_bill(1, 5000.0) {
        Err(Error::InsufficientPayment { required, tendered }) => {
            assert_eq!(required, 9000.0);
            assert_eq!(tendered, 5000.0);
        }
        other => panic!("expected InsufficientPayment, got {other:?}"),
    }
    assert_eq!(ward.find_active(1).cloned(), before);

    let receipt = ward.pay_bill(1, 9000.0)?;
    assert_eq!(receipt.change, 0.0);
    assert_eq!(ward.find_active(1).map(|p| p.total_bill()), Some(0.0));

    let summary = ward.discharge(1)?;
    assert_eq!(summary.name, "Asha");
    assert_eq!(summary.days_admitted, 3);
    assert_eq!(summary.bed_number, 1);
    assert!(!ward.is_bed_occupied(1));
    assert!(ward.find_active(1).is_none());
    assert!(!ward.patients()[0].is_admitted);
    Ok(())
}

#[test]
fn invalid_age_creates_nothing() {
    let mut ward = ward_with_beds(2);
    assert!(matches!(
        ward.admit("Old", 150, "1", "x"),
        Err(Error::InvalidAge(150))
    ));
    assert!(matches!(
        ward.admit("Newborn", 0, "1", "x"),
        Err(Error::InvalidAge(0))
    ));
    assert!(ward.patients().is_empty());
    assert_eq!(ward.next_patient_id(), 1);
    assert_eq!(ward.occupied_beds(), 0);
}

#[test]
fn age_bounds_are_inclusive() -> anyhow::Result<()> {
    let mut ward = ward_with_beds(2);
    ward.admit("Infant", 1, "1", "x")?;
    ward.admit("Elder", 120, "2", "y")?;
    assert_eq!(ward.list_active().count(), 2);
    Ok(())
}

#[test]
fn full_ward_refuses_admission() -> anyhow::Result<()> {
    let mut ward = ward_with_beds(2);
    ward.admit("A", 30, "1", "x")?;
    ward.admit("B", 30, "2", "y")?;

    for _ in 0..3 {
        assert!(matches!(
            ward.admit("C", 30, "3", "z"),
            Err(Error::BedUnavailable { capacity: 2 })
        ));
    }
    assert_eq!(ward.next_patient_id(), 3);
    assert_eq!(ward.free_beds(), 0);
    Ok(())
}

#[test]
fn discharged_bed_is_reused_but_id_is_not() -> anyhow::Result<()> {
    let mut ward = ward_with_beds(2);
    ward.admit("A", 30, "1", "x")?;
    ward.admit("B", 30, "2", "y")?;
    ward.pay_bill(1, 3000.0)?;
    ward.discharge(1)?;

    let c = ward.admit("C", 30, "3", "z")?;
    assert_eq!(c.id, 3);
    assert_eq!(c.bed_number, 1);

    let active: Vec<u32> = ward.list_active().map(|p| p.id).collect();
    assert_eq!(active, vec![2, 3]);
    assert_eq!(ward.patients().len(), 3);
    Ok(())
}

#[test]
fn discharge_requires_cleared_bill() -> anyhow::Result<()> {
    let mut ward = ward_with_beds(1);
    ward.admit("A", 30, "1", "x")?;
    ward.add_charges(1, 250.0)?;

    match ward.discharge(1) {
        Err(Error::BillNotCleared { id, outstanding }) => {
            assert_eq!(id, 1);
            assert_eq!(outstanding, 3250.0);
        }
        other => panic!("expected BillNotCleared, got {other:?}"),
    }
    assert!(ward.find_active(1).is_some());
    assert!(ward.is_bed_occupied(1));

    let receipt = ward.pay_bill(1, 5000.0)?;
    assert_eq!(receipt.billed, 3250.0);
    assert_eq!(receipt.change, 1750.0);
    ward.discharge(1)?;
    Ok(())
}

#[test]
fn settled_bill_cannot_be_paid_twice() -> anyhow::Result<()> {
    let mut ward = ward_with_beds(1);
    ward.admit("A", 30, "1", "x")?;
    ward.pay_bill(1, 3000.0)?;
    assert!(matches!(ward.pay_bill(1, 3000.0), Err(Error::AlreadyPaid(1))));

    // A further day reopens the bill.
    ward.increment_stay(1)?;
    assert_eq!(ward.find_active(1).map(|p| p.total_bill()), Some(3000.0));
    assert!(matches!(ward.discharge(1), Err(Error::BillNotCleared { .. })));
    Ok(())
}

#[test]
fn negative_charges_are_rejected() -> anyhow::Result<()> {
    let mut ward = ward_with_beds(1);
    ward.admit("A", 30, "1", "x")?;
    assert!(matches!(
        ward.add_charges(1, -10.0),
        Err(Error::InvalidAmount(_))
    ));
    assert_eq!(ward.add_charges(1, 0.0)?, 3000.0);
    Ok(())
}

#[test]
fn operations_on_unknown_or_discharged_patients_fail() -> anyhow::Result<()> {
    let mut ward = ward_with_beds(1);
    ward.admit("A", 30, "1", "x")?;
    ward.pay_bill(1, 3000.0)?;
    ward.discharge(1)?;

    for id in [1, 42] {
        assert!(ward.find_active(id).is_none());
        assert!(matches!(ward.update_disease(id, "y"), Err(Error::NotFound(_))));
        assert!(matches!(ward.add_charges(id, 1.0), Err(Error::NotFound(_))));
        assert!(matches!(ward.increment_stay(id), Err(Error::NotFound(_))));
        assert!(matches!(ward.pay_bill(id, 1.0), Err(Error::NotFound(_))));
        assert!(matches!(ward.discharge(id), Err(Error::NotFound(_))));
    }
    Ok(())
}

#[test]
fn disease_update_is_visible() -> anyhow::Result<()> {
    let mut ward = ward_with_beds(1);
    ward.admit("A", 30, "1", "flu")?;
    ward.update_disease(1, "pneumonia")?;
    assert_eq!(
        ward.find_active(1).map(|p| p.disease.as_str()),
        Some("pneumonia")
    );
    Ok(())
}

#[test]
fn state_survives_reopening_the_file_store() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let config = WardConfig {
        capacity: 3,
        data_file: dir.path().join("hospital_data.txt"),
        ..WardConfig::default()
    };

    {
        let mut ward = Ward::open(&config)?;
        ward.admit("Asha", 30, "555", "flu")?;
        ward.admit("Ravi", 62, "556", "fracture")?;
        ward.add_charges(2, 1500.5)?;
        ward.pay_bill(1, 3000.0)?;
        ward.discharge(1)?;
    }

    let text = fs::read_to_string(&config.data_file)?;
    assert_eq!(
        text,
        "3\n2\n1|Asha|30|555|flu|1|-3000|1|0\n2|Ravi|62|556|fracture|2|1500.5|1|1\n"
    );

    let mut ward = Ward::open(&config)?;
    assert_eq!(ward.next_patient_id(), 3);
    assert!(!ward.is_bed_occupied(1));
    assert!(ward.is_bed_occupied(2));
    assert_eq!(ward.find_active(2).map(|p| p.total_bill()), Some(4500.5));

    let next = ward.admit("Meera", 8, "557", "dengue")?;
    assert_eq!(next.id, 3);
    assert_eq!(next.bed_number, 1);
    Ok(())
}

#[test]
fn json_store_keeps_payment_history() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let config = WardConfig {
        capacity: 2,
        data_file: dir.path().join("ward.json"),
        format: StoreFormat::Json,
        load_mode: LoadMode::Strict,
        persistence: PersistencePolicy::Strict,
    };

    {
        let mut ward = Ward::open(&config)?;
        ward.admit("Asha", 30, "555", "flu")?;
        ward.pay_bill(1, 3500.0)?;
    }

    let ward = Ward::open(&config)?;
    let asha = ward.find_active(1).expect("still admitted");
    assert_eq!(asha.amount_paid, 3000.0);
    assert_eq!(asha.total_bill(), 0.0);
    Ok(())
}

#[test]
fn missing_store_starts_empty() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let config = WardConfig {
        data_file: dir.path().join("absent.txt"),
        ..WardConfig::default()
    };
    let ward = Ward::open(&config)?;
    assert_eq!(ward.next_patient_id(), 1);
    assert_eq!(ward.capacity(), 50);
    assert_eq!(ward.free_beds(), 50);
    assert!(ward.patients().is_empty());
    assert!(!config.data_file.exists());
    Ok(())
}

#[test]
fn best_effort_write_failure_is_flushed_on_drop() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let blocked = dir.path().join("blocked");
    let config = WardConfig {
        data_file: blocked.join("hospital_data.txt"),
        ..WardConfig::default()
    };

    {
        let mut ward = Ward::open(&config)?;
        ward.admit("Asha", 30, "555", "flu")?;
        assert!(ward.find_active(1).is_some());
        assert!(!config.data_file.exists());

        // The directory appears before shutdown; the pending state is written then.
        fs::create_dir(&blocked)?;
    }

    let ward = Ward::open(&config)?;
    assert!(ward.find_active(1).is_some());
    Ok(())
}

#[test]
fn closing_without_changes_leaves_the_store_untouched() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let config = WardConfig {
        data_file: dir.path().join("hospital_data.txt"),
        ..WardConfig::default()
    };
    // Stale counter: repaired in memory, written only with the next change.
    let stored = "1\n1\n1|Asha|30|555|flu|1|0|1|1\n";
    fs::write(&config.data_file, stored)?;

    {
        let ward = Ward::open(&config)?;
        assert_eq!(ward.next_patient_id(), 2);
    }
    assert_eq!(fs::read_to_string(&config.data_file)?, stored);

    {
        let mut ward = Ward::open(&config)?;
        ward.increment_stay(1)?;
    }
    assert!(fs::read_to_string(&config.data_file)?.starts_with("2\n1\n"));
    Ok(())
}
