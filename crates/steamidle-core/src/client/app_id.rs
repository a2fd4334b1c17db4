use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Most apps the network accepts in a single "games played" declaration.
pub const MAX_APP_IDS: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppIdError {
    #[error("App ID is required")]
    Empty,

    #[error("App ID must be a number, got {0:?}")]
    NotANumber(String),

    #[error("App ID must be a positive number, got {0}")]
    NotPositive(i64),

    #[error("App ID {0} is out of range")]
    OutOfRange(String),

    #[error("At most {max} app IDs can be idled at once, got {0}", max = MAX_APP_IDS)]
    TooMany(usize),
}

/// A positive application identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AppId(u32);

impl AppId {
    pub fn new(id: u32) -> Result<Self, AppIdError> {
        if id == 0 {
            return Err(AppIdError::NotPositive(0));
        }
        Ok(Self(id))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for AppId {
    type Error = AppIdError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<AppId> for u32 {
    fn from(id: AppId) -> u32 {
        id.0
    }
}

impl FromStr for AppId {
    type Err = AppIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AppIdError::Empty);
        }

        let value: i64 = match s.parse() {
            Ok(v) => v,
            Err(_) => {
                let digits = s.strip_prefix('-').unwrap_or(s);
                return if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                    Err(AppIdError::OutOfRange(s.to_string()))
                } else {
                    Err(AppIdError::NotANumber(s.to_string()))
                };
            }
        };

        if value <= 0 {
            return Err(AppIdError::NotPositive(value));
        }
        let id = u32::try_from(value).map_err(|_| AppIdError::OutOfRange(s.to_string()))?;
        Ok(Self(id))
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of apps a session declares as "currently playing".
///
/// Ordered and de-duplicated so that announcing the same set twice sends
/// the same declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppIdSet(BTreeSet<AppId>);

impl AppIdSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(id: AppId) -> Self {
        Self(BTreeSet::from([id]))
    }

    pub fn from_ids(ids: impl IntoIterator<Item = AppId>) -> Result<Self, AppIdError> {
        let set: BTreeSet<AppId> = ids.into_iter().collect();
        if set.len() > MAX_APP_IDS {
            return Err(AppIdError::TooMany(set.len()));
        }
        Ok(Self(set))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = AppId> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<AppId> {
        self.iter().collect()
    }
}

/// Parses `"730"`, `"730,440"` or `"730 440"`.
impl FromStr for AppIdSet {
    type Err = AppIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(AppId::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if ids.is_empty() {
            return Err(AppIdError::Empty);
        }
        Self::from_ids(ids)
    }
}

impl fmt::Display for AppIdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.iter().map(|id| id.to_string()).collect();
        write!(f, "{}", joined.join(", "))
    }
}
