//! Fuel types and confirmed prices.
//!
//! The set of fuels is closed: every station lists at most one confirmed price
//! per [`FuelType`], held in the fixed-shape [`FuelPrices`] record.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fuels a station can price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Gasoline,
    Ethanol,
    Diesel,
}

impl FuelType {
    /// Every fuel type, in display order.
    pub const ALL: [FuelType; 3] = [FuelType::Gasoline, FuelType::Ethanol, FuelType::Diesel];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gasoline => "gasoline",
            Self::Ethanol => "ethanol",
            Self::Diesel => "diesel",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = ValidationError;

    /// Accepts the canonical names plus the short/Portuguese aliases used by
    /// station listings (`gas`, `gasolina`, `etanol`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gasoline" | "gas" | "gasolina" => Ok(Self::Gasoline),
            "ethanol" | "etanol" => Ok(Self::Ethanol),
            "diesel" => Ok(Self::Diesel),
            _ => Err(ValidationError::UnknownFuelType(s.to_string())),
        }
    }
}

/// A positive, finite price per litre.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidPrice(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Price {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Confirmed prices, one optional slot per fuel type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelPrices {
    pub gasoline: Option<Price>,
    pub ethanol: Option<Price>,
    pub diesel: Option<Price>,
}

impl FuelPrices {
    pub fn get(&self, fuel: FuelType) -> Option<Price> {
        match fuel {
            FuelType::Gasoline => self.gasoline,
            FuelType::Ethanol => self.ethanol,
            FuelType::Diesel => self.diesel,
        }
    }

    /// Set the confirmed price for `fuel`, returning the previous one.
    pub fn set(&mut self, fuel: FuelType, price: Price) -> Option<Price> {
        self.slot_mut(fuel).replace(price)
    }

    /// Number of fuel types that currently have a confirmed price.
    pub fn confirmed_count(&self) -> usize {
        FuelType::ALL
            .iter()
            .filter(|fuel| self.get(**fuel).is_some())
            .count()
    }

    /// Iterate over the confirmed prices in display order.
    pub fn iter(&self) -> impl Iterator<Item = (FuelType, Price)> + '_ {
        FuelType::ALL
            .into_iter()
            .filter_map(move |fuel| self.get(fuel).map(|price| (fuel, price)))
    }

    fn slot_mut(&mut self, fuel: FuelType) -> &mut Option<Price> {
        match fuel {
            FuelType::Gasoline => &mut self.gasoline,
            FuelType::Ethanol => &mut self.ethanol,
            FuelType::Diesel => &mut self.diesel,
        }
    }
}
