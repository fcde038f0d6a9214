//! Filers: the members of Congress whose reports are tracked.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tracking status of a filer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilerStatus {
    /// Reports are fetched and notified.
    #[default]
    Active,
    /// Registered but not fetched.
    Inactive,
    /// Fetched, notifications go to a test channel.
    Testing,
}

impl FilerStatus {
    /// Storage / wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            FilerStatus::Active => "active",
            FilerStatus::Inactive => "inactive",
            FilerStatus::Testing => "testing",
        }
    }
}

impl FromStr for FilerStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(FilerStatus::Active),
            "inactive" => Ok(FilerStatus::Inactive),
            "testing" => Ok(FilerStatus::Testing),
            other => Err(Error::validation(format!("unknown filer status '{other}'"))),
        }
    }
}

impl fmt::Display for FilerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chamber the filer reports to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chamber {
    #[default]
    House,
    Senate,
}

impl Chamber {
    /// Storage / display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Chamber::House => "House",
            Chamber::Senate => "Senate",
        }
    }
}

impl FromStr for Chamber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "house" => Ok(Chamber::House),
            "senate" => Ok(Chamber::Senate),
            other => Err(Error::validation(format!("unknown chamber '{other}'"))),
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked filer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filer {
    /// Registry key, lowercase (e.g. "pelosi"). Filings and trades are
    /// tagged with it.
    pub name: String,
    /// Display name (e.g. "Nancy Pelosi").
    pub full_name: String,
    /// Name as the Clerk's disclosure search lists it (e.g. "Pelosi, Nancy").
    pub search_name: String,
    #[serde(default)]
    pub party: String,
    /// State abbreviation.
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub chamber: Chamber,
    #[serde(default)]
    pub status: FilerStatus,
}

impl Filer {
    /// Create an active House filer.
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        search_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            search_name: search_name.into(),
            party: String::new(),
            state: String::new(),
            chamber: Chamber::House,
            status: FilerStatus::Active,
        }
    }

    /// Is this filer currently tracked?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == FilerStatus::Active
    }

    /// Check the registry key and the required names.
    pub fn validate(&self) -> Result<()> {
        validate_filer_name(&self.name)?;
        if self.full_name.trim().is_empty() {
            return Err(Error::validation(format!("filer '{}' has no full name", self.name)));
        }
        if self.search_name.trim().is_empty() {
            return Err(Error::validation(format!("filer '{}' has no search name", self.name)));
        }
        Ok(())
    }
}

/// A registry key is non-empty lowercase ASCII letters, digits, `_` or `-`.
pub fn validate_filer_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "filer name '{name}' must be lowercase letters, digits, '_' or '-'"
        )))
    }
}
