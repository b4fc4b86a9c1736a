//! Per-document metadata and the canonical ordered list of document numbers.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 0-based position of a document in build order.
pub type Ordinal = u32;

/// Publication date encoded in a document number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocDate {
    pub day: String,
    pub month: String,
    pub year: String,
    /// Display form, e.g. `January 1, 1989`.
    pub full: String,
}

impl DocDate {
    /// Derives the date from a document number such as `LA010189-0001`,
    /// whose characters 2..8 hold `MMDDYY`.
    pub fn from_docno(docno: &str) -> Result<Self> {
        let digits = docno
            .get(2..8)
            .ok_or_else(|| Error::parse(docno, "document number too short for a date"))?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::parse(docno, format!("date field {digits:?} is not numeric")));
        }

        let (month, day, year) = (&digits[0..2], &digits[2..4], &digits[4..6]);
        let parse = |s: &str| s.parse::<u32>().map_err(|e| Error::parse(docno, e.to_string()));
        let (mm, dd, yy) = (parse(month)?, parse(day)?, parse(year)?);

        let date = NaiveDate::from_ymd_opt(1900 + yy as i32, mm, dd).ok_or_else(|| {
            Error::parse(docno, format!("{month}/{day}/{year} is not a calendar date"))
        })?;

        Ok(Self {
            day: day.to_string(),
            month: month.to_string(),
            year: year.to_string(),
            full: date.format("%B %-d, %Y").to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    pub ordinal: Ordinal,
    /// Token count of the indexable text, repeats included.
    pub length: u32,
    pub date: DocDate,
    pub headline: String,
}

/// Metadata keyed by document number plus the build-order sequence of
/// document numbers (`docnos[ordinal]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataStore {
    entries: HashMap<String, DocEntry>,
    docnos: Vec<String>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, docno: &str) -> bool {
        self.entries.contains_key(docno)
    }

    /// Next ordinal to hand out.
    pub(crate) fn next_ordinal(&self) -> Ordinal {
        self.docnos.len() as Ordinal
    }

    /// Appends a fully prepared entry. The caller guarantees `docno` is new
    /// and `entry.ordinal == next_ordinal()`.
    pub(crate) fn push(&mut self, docno: String, entry: DocEntry) {
        debug_assert_eq!(entry.ordinal, self.next_ordinal());
        self.docnos.push(docno.clone());
        self.entries.insert(docno, entry);
    }

    pub fn get(&self, docno: &str) -> Result<&DocEntry> {
        self.entries
            .get(docno)
            .ok_or_else(|| Error::DocumentNotFound(docno.to_string()))
    }

    pub fn docno(&self, ordinal: Ordinal) -> Result<&str> {
        self.docnos
            .get(ordinal as usize)
            .map(String::as_str)
            .ok_or(Error::OrdinalOutOfRange {
                ordinal: ordinal as usize,
                len: self.docnos.len(),
            })
    }

    pub fn by_ordinal(&self, ordinal: Ordinal) -> Result<&DocEntry> {
        self.get(self.docno(ordinal)?)
    }

    pub fn docnos(&self) -> &[String] {
        &self.docnos
    }

    pub fn len(&self) -> usize {
        self.docnos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docnos.is_empty()
    }

    /// Document lengths indexed by ordinal.
    pub fn lengths(&self) -> Vec<u32> {
        self.docnos
            .iter()
            .map(|docno| self.entries.get(docno).map_or(0, |e| e.length))
            .collect()
    }

    /// Arithmetic mean of all document lengths, 0.0 for an empty store.
    pub fn average_length(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let total: u64 = self.entries.values().map(|e| u64::from(e.length)).sum();
        total as f64 / self.entries.len() as f64
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.entries.len() != self.docnos.len() {
            return Err(Error::malformed(format!(
                "metadata holds {} entries for {} document numbers",
                self.entries.len(),
                self.docnos.len()
            )));
        }
        for (position, docno) in self.docnos.iter().enumerate() {
            let entry = self.entries.get(docno).ok_or_else(|| {
                Error::malformed(format!("document {docno:?} has no metadata entry"))
            })?;
            if entry.ordinal as usize != position {
                return Err(Error::malformed(format!(
                    "document {docno:?} sits at position {position} but records ordinal {}",
                    entry.ordinal
                )));
            }
        }
        Ok(())
    }
}
