//! Pipe-delimited line format.
//!
//! ```text
//! <nextPatientID>
//! <patientCount>
//! id|name|age|contact|disease|bedNumber|additionalCharges|daysAdmitted|isAdmitted
//! ```
//!
//! The admission flag is `1` for admitted; any other value reads as discharged.
//! Text fields are stored unescaped, so they must not contain `|` or line breaks.

use super::{Ledger, LoadMode};
use crate::error::{Error, Result};
use crate::patient::Patient;

pub const DELIMITER: char = '|';
const FIELD_COUNT: usize = 9;

/// Whether a free-text value survives a round trip through this format.
pub fn is_encodable(text: &str) -> bool {
    !text.contains([DELIMITER, '\n', '\r'])
}

pub fn encode(ledger: &Ledger) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("{}\n{}\n", ledger.next_patient_id, ledger.patients.len()));
    for p in &ledger.patients {
        out.push_str(&encode_record(p)?);
        out.push('\n');
    }
    Ok(out)
}

fn encode_record(p: &Patient) -> Result<String> {
    for (field, value) in [("name", &p.name), ("contact", &p.contact), ("disease", &p.disease)] {
        if !is_encodable(value) {
            return Err(Error::UnencodableText { field });
        }
    }
    Ok(format!(
        "{}|{}|{}|{}|{}|{}|{}|{}|{}",
        p.id,
        p.name,
        p.age,
        p.contact,
        p.disease,
        p.bed_number,
        p.additional_charges,
        p.days_admitted,
        if p.is_admitted { "1" } else { "0" }
    ))
}

pub fn decode(text: &str, mode: LoadMode) -> Result<Ledger> {
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

    let next_patient_id = match lines.next() {
        Some((n, line)) => FieldReader::new(n, mode).unsigned(line, "nextPatientID")?,
        None if mode == LoadMode::Strict => return Err(corrupt(1, "store is empty")),
        None => 0,
    };
    let count = match lines.next() {
        Some((n, line)) => FieldReader::new(n, mode).count(line)?,
        None if mode == LoadMode::Strict => return Err(corrupt(2, "missing patient count")),
        None => 0,
    };

    let mut patients = Vec::with_capacity(count.min(1024));
    for expected in 0..count {
        let Some((n, line)) = lines.next() else {
            if mode == LoadMode::Strict {
                return Err(corrupt(
                    expected + 3,
                    format!("expected {count} patient records, found {expected}"),
                ));
            }
            tracing::warn!(
                expected = count,
                found = expected,
                "Store ended before all patient records were read"
            );
            break;
        };
        patients.push(decode_record(line, FieldReader::new(n, mode))?);
    }

    Ok(Ledger {
        next_patient_id,
        patients,
    })
}

fn decode_record(line: &str, reader: FieldReader) -> Result<Patient> {
    let fields: Vec<&str> = line.splitn(FIELD_COUNT, DELIMITER).collect();
    if fields.len() < FIELD_COUNT && reader.mode == LoadMode::Strict {
        return Err(corrupt(
            reader.line,
            format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        ));
    }
    let field = |i: usize| fields.get(i).copied().unwrap_or("");

    Ok(Patient {
        id: reader.unsigned(field(0), "id")?,
        name: field(1).to_string(),
        age: reader.age(field(2))?,
        contact: field(3).to_string(),
        disease: field(4).to_string(),
        bed_number: reader.unsigned(field(5), "bedNumber")?,
        additional_charges: reader.real(field(6), "additionalCharges")?,
        days_admitted: reader.unsigned(field(7), "daysAdmitted")?,
        is_admitted: field(8) == "1",
        amount_paid: 0.0,
    })
}

/// Parses numeric fields of one line according to the load mode.
#[derive(Debug, Clone, Copy)]
struct FieldReader {
    line: usize,
    mode: LoadMode,
}

impl FieldReader {
    fn new(line: usize, mode: LoadMode) -> Self {
        Self { line, mode }
    }

    fn integer(&self, raw: &str, name: &str) -> Result<i64> {
        match self.mode {
            LoadMode::Lenient => Ok(atoi(raw)),
            LoadMode::Strict => raw
                .trim()
                .parse()
                .map_err(|_| corrupt(self.line, format!("{name} is not an integer: '{raw}'"))),
        }
    }

    fn unsigned(&self, raw: &str, name: &str) -> Result<u32> {
        let value = self.integer(raw, name)?;
        match u32::try_from(value) {
            Ok(v) => Ok(v),
            Err(_) if self.mode == LoadMode::Lenient => Ok(0),
            Err(_) => Err(corrupt(self.line, format!("{name} out of range: {value}"))),
        }
    }

    fn count(&self, raw: &str) -> Result<usize> {
        self.unsigned(raw, "patientCount").map(|c| c as usize)
    }

    fn age(&self, raw: &str) -> Result<i32> {
        let value = self.integer(raw, "age")?;
        match i32::try_from(value) {
            Ok(v) => Ok(v),
            Err(_) if self.mode == LoadMode::Lenient => Ok(0),
            Err(_) => Err(corrupt(self.line, format!("age out of range: {value}"))),
        }
    }

    fn real(&self, raw: &str, name: &str) -> Result<f64> {
        match self.mode {
            LoadMode::Lenient => Ok(atof(raw)),
            LoadMode::Strict => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| corrupt(self.line, format!("{name} is not a number: '{raw}'"))),
        }
    }
}

fn corrupt(line: usize, message: impl Into<String>) -> Error {
    Error::CorruptStore {
        line,
        message: message.into(),
    }
}

/// C `atoi` semantics: optional leading whitespace and sign, then the longest
/// digit run. No digits yields 0. Saturates instead of overflowing.
pub(crate) fn atoi(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// C `atof` semantics restricted to finite decimal input: the longest prefix
/// that forms a number is parsed, anything else yields 0.
pub(crate) fn atof(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        let frac_digits = frac_end - (end + 1);
        if mantissa_digits + frac_digits > 0 {
            mantissa_digits += frac_digits;
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_start = end + 1 + sign;
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
