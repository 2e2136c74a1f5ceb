use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleQuota {
    pub name: String,
    pub quota: u32,
}

impl RoleQuota {
    pub fn new(name: impl Into<String>, quota: u32) -> Self {
        Self {
            name: name.into(),
            quota,
        }
    }
}

/// Everything the planner needs besides the employee and date tables.
///
/// `preference_bonus` has no default: it is added to every preference score
/// in the objective and must be chosen deliberately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    pub roles: Vec<RoleQuota>,
    #[serde(default = "default_window_half_width_days")]
    pub window_half_width_days: u32,
    #[serde(default = "default_max_assignments_per_window")]
    pub max_assignments_per_window: u32,
    pub preference_bonus: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<f64>,
    #[serde(default)]
    pub accept_timeout_incumbent: bool,
}

fn default_window_half_width_days() -> u32 {
    RosterConfig::DEFAULT_WINDOW_HALF_WIDTH_DAYS
}

fn default_max_assignments_per_window() -> u32 {
    RosterConfig::DEFAULT_MAX_ASSIGNMENTS_PER_WINDOW
}

impl RosterConfig {
    pub const DEFAULT_WINDOW_HALF_WIDTH_DAYS: u32 = 10;
    pub const DEFAULT_MAX_ASSIGNMENTS_PER_WINDOW: u32 = 2;

    pub fn new(roles: Vec<RoleQuota>, preference_bonus: f64) -> Self {
        Self {
            roles,
            window_half_width_days: Self::DEFAULT_WINDOW_HALF_WIDTH_DAYS,
            max_assignments_per_window: Self::DEFAULT_MAX_ASSIGNMENTS_PER_WINDOW,
            preference_bonus,
            time_limit_secs: None,
            accept_timeout_incumbent: false,
        }
    }

    /// Manager-on-duty, house-on-call, three overnight and one swing slot per night.
    pub fn overnight(preference_bonus: f64) -> Self {
        Self::new(
            vec![
                RoleQuota::new("MOD", 1),
                RoleQuota::new("HON", 1),
                RoleQuota::new("ON", 3),
                RoleQuota::new("SW", 1),
            ],
            preference_bonus,
        )
    }

    pub fn with_window(mut self, half_width_days: u32, max_assignments: u32) -> Self {
        self.window_half_width_days = half_width_days;
        self.max_assignments_per_window = max_assignments;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_secs = Some(limit.as_secs_f64());
        self
    }

    pub fn accepting_timeout_incumbent(mut self, accept: bool) -> Self {
        self.accept_timeout_incumbent = accept;
        self
    }

    /// `None` when no limit is set or the value cannot be a positive [`Duration`];
    /// [`RosterConfig::validate`] rejects the latter.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|role| role.name.clone()).collect()
    }

    pub fn quota(&self, role_idx: usize) -> u32 {
        self.roles.get(role_idx).map(|role| role.quota).unwrap_or(0)
    }

    pub fn total_quota(&self) -> u32 {
        self.roles.iter().map(|role| role.quota).sum()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.roles.is_empty() {
            return Err(ValidationError::new("configuration must name at least one role"));
        }
        let mut seen = HashSet::with_capacity(self.roles.len());
        for role in &self.roles {
            let name = role.name.trim();
            if name.is_empty() {
                return Err(ValidationError::new("role names must not be blank"));
            }
            if name != role.name {
                return Err(ValidationError::new(format!(
                    "role name '{}' has surrounding whitespace",
                    role.name
                )));
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(ValidationError::new(format!("duplicate role '{name}'")));
            }
        }
        if !self.preference_bonus.is_finite() {
            return Err(ValidationError::new(format!(
                "preference_bonus must be finite (got {})",
                self.preference_bonus
            )));
        }
        if let Some(secs) = self.time_limit_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ValidationError::new(format!(
                    "time_limit_secs must be positive (got {secs})"
                )));
            }
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(ValidationError::new(format!(
                    "time_limit_secs is too large (got {secs})"
                )));
            }
        }
        Ok(())
    }
}
