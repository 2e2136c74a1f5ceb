use crate::calendar::WeekdayTable;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    /// One flag per configured role, in configuration order.
    pub eligible_roles: Vec<bool>,
    pub availability: WeekdayTable<bool>,
    pub preferences: WeekdayTable<f64>,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        eligible_roles: Vec<bool>,
        availability: WeekdayTable<bool>,
        preferences: WeekdayTable<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            eligible_roles,
            availability,
            preferences,
        }
    }

    /// Eligible for every one of `role_count` roles, available all week, neutral preferences.
    pub fn unrestricted(name: impl Into<String>, role_count: usize) -> Self {
        Self::new(
            name,
            vec![true; role_count],
            WeekdayTable::filled(true),
            WeekdayTable::filled(0.0),
        )
    }

    pub fn with_eligibility(mut self, eligible_roles: Vec<bool>) -> Self {
        self.eligible_roles = eligible_roles;
        self
    }

    pub fn with_availability(mut self, availability: WeekdayTable<bool>) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_preferences(mut self, preferences: WeekdayTable<f64>) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn is_eligible(&self, role_idx: usize) -> bool {
        self.eligible_roles.get(role_idx).copied().unwrap_or(false)
    }

    pub fn is_available(&self, day: Weekday) -> bool {
        self.availability[day]
    }

    pub fn preference(&self, day: Weekday) -> f64 {
        self.preferences[day]
    }

    pub fn can_work(&self, role_idx: usize, day: Weekday) -> bool {
        self.is_eligible(role_idx) && self.is_available(day)
    }
}
