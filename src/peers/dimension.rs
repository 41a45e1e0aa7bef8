//! Similarity dimensions and the active dimension set

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A comparison dimension, listed in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Size,
    Industry,
    PlanType,
    Carrier,
    Network,
}

impl Dimension {
    /// All dimensions in evaluation order
    pub const ALL: [Dimension; 5] = [
        Dimension::Size,
        Dimension::Industry,
        Dimension::PlanType,
        Dimension::Carrier,
        Dimension::Network,
    ];

    /// Points awarded when the dimension matches
    pub fn weight(self) -> u32 {
        match self {
            Dimension::Size | Dimension::Industry => 25,
            Dimension::PlanType => 20,
            Dimension::Carrier | Dimension::Network => 15,
        }
    }

    /// Reason reported to the user when the dimension matches
    pub fn match_factor(self) -> &'static str {
        match self {
            Dimension::Size => "Similar size",
            Dimension::Industry => "Same industry",
            Dimension::PlanType => "Same plan type",
            Dimension::Carrier => "Same carrier",
            Dimension::Network => "Same network",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Dimension::Size => "size",
            Dimension::Industry => "industry",
            Dimension::PlanType => "planType",
            Dimension::Carrier => "carrier",
            Dimension::Network => "network",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dimension: {0}")]
pub struct ParseDimensionError(String);

impl FromStr for Dimension {
    type Err = ParseDimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(|c: char| c == '_' || c == '-' || c == ' ', "").as_str() {
            "size" => Ok(Dimension::Size),
            "industry" => Ok(Dimension::Industry),
            "plantype" => Ok(Dimension::PlanType),
            "carrier" => Ok(Dimension::Carrier),
            "network" => Ok(Dimension::Network),
            _ => Err(ParseDimensionError(s.to_string())),
        }
    }
}

/// Set of active dimensions; iterates in evaluation order
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DimensionSet(u8);

impl DimensionSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Dimension::ALL.into_iter().collect()
    }

    pub fn contains(&self, dimension: Dimension) -> bool {
        self.0 & dimension.bit() != 0
    }

    pub fn insert(&mut self, dimension: Dimension) {
        self.0 |= dimension.bit();
    }

    pub fn remove(&mut self, dimension: Dimension) {
        self.0 &= !dimension.bit();
    }

    /// Flip a dimension on or off
    pub fn toggle(&mut self, dimension: Dimension) {
        self.0 ^= dimension.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Dimension> + '_ {
        Dimension::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// Highest score reachable with this set
    pub fn max_score(&self) -> u32 {
        self.iter().map(Dimension::weight).sum()
    }

    /// Size, industry and plan type
    pub fn default_active() -> Self {
        [Dimension::Size, Dimension::Industry, Dimension::PlanType]
            .into_iter()
            .collect()
    }
}

impl FromIterator<Dimension> for DimensionSet {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        let mut set = Self::empty();
        for dimension in iter {
            set.insert(dimension);
        }
        set
    }
}

impl fmt::Debug for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for DimensionSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for DimensionSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dimensions = Vec::<Dimension>::deserialize(deserializer)?;
        Ok(dimensions.into_iter().collect())
    }
}
