//! Appointment-duration policy: slot length and the services that fit it.

use serde::{Deserialize, Serialize};

use crate::domain::{ShiftAssignment, TimeOfDay};
use crate::error::ScheduleError;

/// Longest slot the policy accepts (12 hours).
pub const MAX_SLOT_MINUTES: u32 = 720;

/// Fixed-length slot policy.
///
/// Slots start at the shift start and advance by the slot length. A slot
/// is offered only if it ends at or before the shift end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPolicy {
    slot_minutes: u32,
}

impl SlotPolicy {
    /// Hourly slots.
    pub const HOURLY: Self = Self { slot_minutes: 60 };

    /// Builds a policy with the given slot length.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] unless
    /// `1 <= slot_minutes <= MAX_SLOT_MINUTES`.
    pub fn new(slot_minutes: u32) -> Result<Self, ScheduleError> {
        if slot_minutes == 0 || slot_minutes > MAX_SLOT_MINUTES {
            return Err(ScheduleError::Validation(format!(
                "slot duration must be between 1 and {MAX_SLOT_MINUTES} minutes, got {slot_minutes}"
            )));
        }
        Ok(Self { slot_minutes })
    }

    /// Slot length in minutes.
    #[must_use]
    pub const fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    /// Start times of every slot that fits inside the shift, ascending.
    #[must_use]
    pub fn slot_starts(&self, shift: &ShiftAssignment) -> Vec<TimeOfDay> {
        let end = shift.end_time();
        let mut slots = Vec::new();
        let mut current = shift.start_time();
        while let Some(slot_end) = current.checked_add_minutes(self.slot_minutes) {
            if slot_end > end {
                break;
            }
            slots.push(current);
            current = slot_end;
        }
        slots
    }
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self::HOURLY
    }
}

/// A bookable service and how long it takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOffering {
    /// Label shown to customers.
    pub label: String,
    /// Typical duration in minutes.
    pub duration_minutes: u32,
}

/// Static catalogue of services, filtered by slot length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCatalog {
    offerings: Vec<ServiceOffering>,
}

impl ServiceCatalog {
    /// Builds a catalogue from explicit offerings.
    #[must_use]
    pub fn new(offerings: Vec<ServiceOffering>) -> Self {
        Self { offerings }
    }

    /// Parses `label:minutes` pairs separated by commas.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] on a malformed pair.
    pub fn parse(spec: &str) -> Result<Self, ScheduleError> {
        let mut offerings = Vec::new();
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((label, minutes)) = pair.rsplit_once(':') else {
                return Err(ScheduleError::Validation(format!(
                    "service entry '{pair}' must be label:minutes"
                )));
            };
            let duration_minutes = minutes.trim().parse::<u32>().map_err(|_| {
                ScheduleError::Validation(format!("service entry '{pair}' has a bad duration"))
            })?;
            offerings.push(ServiceOffering {
                label: label.trim().to_string(),
                duration_minutes,
            });
        }
        Ok(Self { offerings })
    }

    /// Labels of services that fit in one slot, in catalogue order.
    #[must_use]
    pub fn labels_for(&self, policy: SlotPolicy) -> Vec<String> {
        self.offerings
            .iter()
            .filter(|o| o.duration_minutes <= policy.slot_minutes())
            .map(|o| o.label.clone())
            .collect()
    }

    /// All offerings.
    #[must_use]
    pub fn offerings(&self) -> &[ServiceOffering] {
        &self.offerings
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        let entry = |label: &str, duration_minutes| ServiceOffering {
            label: label.to_string(),
            duration_minutes,
        };
        Self::new(vec![
            entry("Eye Examination", 60),
            entry("Contact Lens Fitting", 60),
            entry("Follow-up", 30),
            entry("Consultation", 30),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::BranchId;

    fn shift(start: &str, end: &str) -> ShiftAssignment {
        let (Ok(s), Ok(e)) = (start.parse(), end.parse()) else {
            panic!("valid times");
        };
        let Ok(shift) = ShiftAssignment::new(BranchId::new(1), s, e) else {
            panic!("valid shift");
        };
        shift
    }

    fn labels(times: &[TimeOfDay]) -> Vec<String> {
        times.iter().map(|t| t.to_24h()).collect()
    }

    #[test]
    fn hourly_slots_exclude_end() {
        let slots = SlotPolicy::HOURLY.slot_starts(&shift("09:00", "12:00"));
        assert_eq!(labels(&slots), vec!["09:00", "10:00", "11:00"]);
    }

    #[test]
    fn partial_trailing_slot_is_dropped() {
        let slots = SlotPolicy::HOURLY.slot_starts(&shift("09:00", "11:30"));
        assert_eq!(labels(&slots), vec!["09:00", "10:00"]);
    }

    #[test]
    fn shift_shorter_than_slot_has_no_slots() {
        assert!(SlotPolicy::HOURLY.slot_starts(&shift("09:00", "09:45")).is_empty());
    }

    #[test]
    fn half_hour_policy() {
        let Ok(policy) = SlotPolicy::new(30) else {
            panic!("30 is valid");
        };
        let slots = policy.slot_starts(&shift("13:00", "14:30"));
        assert_eq!(labels(&slots), vec!["13:00", "13:30", "14:00"]);
    }

    #[test]
    fn late_shift_stops_before_midnight() {
        let slots = SlotPolicy::HOURLY.slot_starts(&shift("21:00", "23:59"));
        assert_eq!(labels(&slots), vec!["21:00", "22:00"]);
    }

    #[test]
    fn rejects_zero_and_oversized_slots() {
        assert!(SlotPolicy::new(0).is_err());
        assert!(SlotPolicy::new(MAX_SLOT_MINUTES + 1).is_err());
    }

    #[test]
    fn catalogue_filters_by_slot_length() {
        let catalog = ServiceCatalog::default();
        assert_eq!(catalog.labels_for(SlotPolicy::HOURLY).len(), 4);
        let Ok(half) = SlotPolicy::new(30) else {
            panic!("30 is valid");
        };
        assert_eq!(catalog.labels_for(half), vec!["Follow-up", "Consultation"]);
    }

    #[test]
    fn parses_catalogue_spec() {
        let Ok(catalog) = ServiceCatalog::parse("Eye Exam:45, Frame Fitting:20") else {
            panic!("valid spec");
        };
        assert_eq!(catalog.offerings().len(), 2);
        assert!(ServiceCatalog::parse("Eye Exam").is_err());
        assert!(ServiceCatalog::parse("Eye Exam:soon").is_err());
    }
}
