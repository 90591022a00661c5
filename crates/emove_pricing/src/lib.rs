//! Price schedule engine.
//!
//! Owns the tariff list and enforces the exclusivity invariant: at most one
//! non-expired entry is Active at any time. Expiry is derived from
//! `valid_to` at day granularity and never stored; expired entries present
//! as Deactive and are immutable except for being superseded.
//!
//! Every operation takes `today` explicitly so the state machine is
//! deterministic under test; callers pass the current local date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use emove_core::{PriceEntry, PriceStatus};

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("price {price_id} not found")]
    NotFound { price_id: u32 },
    #[error("price {price_id} expired on {valid_to}")]
    Expired { price_id: u32, valid_to: NaiveDate },
}

/// Fields of a create or update call; the ID and status are managed by the
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInput {
    pub price_per_kwh: f64,
    pub penalty_fee_per_minute: f64,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

impl PriceInput {
    fn validate(&self) -> Result<(), PricingError> {
        if !(self.price_per_kwh.is_finite() && self.price_per_kwh >= 0.0) {
            return Err(PricingError::Validation {
                field: "pricePerKWh",
                reason: "must be a non-negative number".to_string(),
            });
        }
        if !(self.penalty_fee_per_minute.is_finite() && self.penalty_fee_per_minute >= 0.0) {
            return Err(PricingError::Validation {
                field: "penaltyFeePerMinute",
                reason: "must be a non-negative number".to_string(),
            });
        }
        if self.valid_to <= self.valid_from {
            return Err(PricingError::Validation {
                field: "validTo",
                reason: format!("must be after validFrom ({})", self.valid_from),
            });
        }
        Ok(())
    }
}

/// Exclusive owner of the price schedule.
#[derive(Debug, Default)]
pub struct PriceBook {
    entries: Vec<PriceEntry>,
}

impl PriceBook {
    pub fn new() -> Self {
        PriceBook::default()
    }

    /// Replace the schedule with a freshly loaded snapshot.
    pub fn replace_all(&mut self, entries: Vec<PriceEntry>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn entry(&self, price_id: u32) -> Result<&PriceEntry, PricingError> {
        self.entries
            .iter()
            .find(|e| e.id == price_id)
            .ok_or(PricingError::NotFound { price_id })
    }

    /// Creates a new entry. Policy: the new entry starts Active, and any
    /// other currently active, non-expired entry is deactivated in the
    /// same operation, so the exclusivity invariant holds on exit.
    pub fn create(
        &mut self,
        input: PriceInput,
        today: NaiveDate,
    ) -> Result<PriceEntry, PricingError> {
        tracing::info!("Creating price entry valid {} to {}", input.valid_from, input.valid_to);
        input.validate()?;

        for entry in &mut self.entries {
            if entry.status == PriceStatus::Active && !entry.is_expired(today) {
                entry.status = PriceStatus::Deactive;
            }
        }

        let entry = PriceEntry {
            id: self.next_id(),
            price_per_kwh: input.price_per_kwh,
            penalty_fee_per_minute: input.penalty_fee_per_minute,
            valid_from: input.valid_from,
            valid_to: input.valid_to,
            status: PriceStatus::Active,
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Makes one entry the single active tariff. Every other entry, expired
    /// or not, is forced Deactive before the target is flipped Active;
    /// callers never observe two active entries.
    pub fn activate(
        &mut self,
        price_id: u32,
        today: NaiveDate,
    ) -> Result<PriceEntry, PricingError> {
        tracing::info!("Activating price {}", price_id);
        let target = self.entry(price_id)?;
        if target.is_expired(today) {
            return Err(PricingError::Expired {
                price_id,
                valid_to: target.valid_to,
            });
        }

        for entry in &mut self.entries {
            entry.status = if entry.id == price_id {
                PriceStatus::Active
            } else {
                PriceStatus::Deactive
            };
        }
        self.entry(price_id).cloned()
    }

    /// Edits an entry's amounts and validity window. Status is untouched;
    /// expired entries are refused.
    pub fn update(
        &mut self,
        price_id: u32,
        input: PriceInput,
        today: NaiveDate,
    ) -> Result<PriceEntry, PricingError> {
        tracing::info!("Updating price {}", price_id);
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == price_id)
            .ok_or(PricingError::NotFound { price_id })?;
        if self.entries[idx].is_expired(today) {
            return Err(PricingError::Expired {
                price_id,
                valid_to: self.entries[idx].valid_to,
            });
        }
        input.validate()?;

        let entry = &mut self.entries[idx];
        entry.price_per_kwh = input.price_per_kwh;
        entry.penalty_fee_per_minute = input.penalty_fee_per_minute;
        entry.valid_from = input.valid_from;
        entry.valid_to = input.valid_to;
        Ok(entry.clone())
    }

    fn next_id(&self) -> u32 {
        self.entries.iter().map(|e| e.id).max().map_or(1, |max| max + 1)
    }
}
