use crate::error::{LoadNotice, PlannerError, PlannerResult};
use crate::persistence::{KeyValueStore, PROFILE_KEY, decode_json, encode_json};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whole years between the birth date and `on`. `None` without a birth
    /// date or when `on` precedes it.
    pub fn age_on(&self, on: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        if on < birth {
            return None;
        }
        let mut years = on.year() - birth.year();
        if (on.month(), on.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if let Some(weight) = self.weight_kg {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(PlannerError::Validation(format!(
                    "weight must be a positive number of kilograms (got {weight})"
                )));
            }
        }
        Ok(())
    }
}

pub struct ProfileStore<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    notices: Vec<LoadNotice>,
}

impl<S: KeyValueStore + ?Sized> ProfileStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            notices: Vec::new(),
        }
    }

    /// The stored profile, or an empty one on first run or unreadable data.
    pub fn load(&mut self) -> UserProfile {
        let decoded = match self.store.load(PROFILE_KEY) {
            Ok(None) => return UserProfile::default(),
            Ok(Some(bytes)) => decode_json::<UserProfile>(&bytes).map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };
        decoded.unwrap_or_else(|message| {
            warn!(error = %message, "stored profile is unreadable; using an empty profile");
            self.notices.push(LoadNotice::new(PROFILE_KEY, message));
            UserProfile::default()
        })
    }

    pub fn save(&self, profile: &UserProfile) -> PlannerResult<()> {
        profile.validate()?;
        let bytes = encode_json(profile)?;
        self.store.save(PROFILE_KEY, &bytes)?;
        Ok(())
    }

    pub fn take_notices(&mut self) -> Vec<LoadNotice> {
        std::mem::take(&mut self.notices)
    }
}
