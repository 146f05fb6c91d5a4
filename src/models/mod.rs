use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Fuel type vocabulary as it appears in listing metadata.
pub const FUEL_LABELS: &[(&str, FuelType)] = &[
    ("бензин", FuelType::Gasoline),
    ("дизель", FuelType::Diesel),
    ("гибрид", FuelType::Hybrid),
    ("электро", FuelType::Electric),
];

/// Transmission vocabulary as it appears in listing metadata.
pub const TRANSMISSION_LABELS: &[(&str, Transmission)] = &[
    ("механика", Transmission::Manual),
    ("АКПП", Transmission::Automatic),
    ("вариатор", Transmission::Cvt),
    ("робот", Transmission::Robotized),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FuelType {
    #[serde(rename = "бензин")]
    Gasoline,
    #[serde(rename = "дизель")]
    Diesel,
    #[serde(rename = "гибрид")]
    Hybrid,
    #[serde(rename = "электро")]
    Electric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transmission {
    #[serde(rename = "механика")]
    Manual,
    #[serde(rename = "АКПП")]
    Automatic,
    #[serde(rename = "вариатор")]
    Cvt,
    #[serde(rename = "робот")]
    Robotized,
}

fn label_of<T: Copy + PartialEq>(table: &[(&'static str, T)], value: T) -> &'static str {
    table
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(label, _)| *label)
        .unwrap_or("")
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(label_of(FUEL_LABELS, *self))
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(label_of(TRANSMISSION_LABELS, *self))
    }
}

/// One parsed vehicle listing. Immutable after construction; field names
/// and order match the exported CSV columns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub brand: String,
    /// Model name with the brand prefix already stripped.
    pub name: String,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub fuel_type: Option<FuelType>,
    pub year: Option<i32>,
    /// Kilometers; only filled from a fragment carrying the "тыс" unit marker.
    pub mileage: Option<u64>,
    pub transmission: Option<Transmission>,
    /// Horsepower, 1..=2000; out-of-range values collapse to `None`.
    pub power: Option<u32>,
    /// Numeric amount kept as text, currency suffix and separators removed.
    pub price: String,
    pub vehicle_configuration: Option<String>,
    pub engine_name: Option<String>,
    /// Free text in the source metadata, kept verbatim.
    pub engine_displacement: Option<String>,
    pub date: NaiveDate,
    pub location: String,
    pub link: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_labels_round_trip_through_display() {
        for (label, fuel) in FUEL_LABELS {
            assert_eq!(&fuel.to_string(), label);
        }
    }

    #[test]
    fn transmission_labels_round_trip_through_display() {
        for (label, transmission) in TRANSMISSION_LABELS {
            assert_eq!(&transmission.to_string(), label);
        }
    }
}
