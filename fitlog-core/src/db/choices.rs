//! Closed choice sets stored as their short value and shown by label.

use std::fmt;

use serde::{Deserialize, Serialize};

pub trait Choice: Copy + Sized + 'static {
    const ALL: &'static [Self];

    /// Stored representation.
    fn value(self) -> &'static str;

    /// Human-readable label.
    fn label(self) -> &'static str;

    fn from_value(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.value() == value)
    }

    fn choices() -> Vec<(&'static str, &'static str)> {
        Self::ALL.iter().map(|c| (c.value(), c.label())).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Choice for Gender {
    const ALL: &'static [Self] = &[Gender::Male, Gender::Female];

    fn value(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl Choice for WeightUnit {
    const ALL: &'static [Self] = &[WeightUnit::Kg, WeightUnit::Lb];

    fn value(self) -> &'static str {
        match self {
            WeightUnit::Kg => "KG",
            WeightUnit::Lb => "LB",
        }
    }

    fn label(self) -> &'static str {
        match self {
            WeightUnit::Kg => "Kilograms",
            WeightUnit::Lb => "Pounds",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ServingType {
    Ounce,
    Cup,
    Pound,
    Pint,
    Tablespoon,
    Teaspoon,
    Gram,
    #[serde(rename = "CUSTOM")]
    #[sqlx(rename = "CUSTOM")]
    Custom,
}

impl Choice for ServingType {
    const ALL: &'static [Self] = &[
        ServingType::Ounce,
        ServingType::Cup,
        ServingType::Pound,
        ServingType::Pint,
        ServingType::Tablespoon,
        ServingType::Teaspoon,
        ServingType::Gram,
        ServingType::Custom,
    ];

    fn value(self) -> &'static str {
        match self {
            ServingType::Ounce => "ounce",
            ServingType::Cup => "cup",
            ServingType::Pound => "pound",
            ServingType::Pint => "pint",
            ServingType::Tablespoon => "tablespoon",
            ServingType::Teaspoon => "teaspoon",
            ServingType::Gram => "gram",
            ServingType::Custom => "CUSTOM",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ServingType::Ounce => "Ounce",
            ServingType::Cup => "Cup",
            ServingType::Pound => "Pound",
            ServingType::Pint => "Pint",
            ServingType::Tablespoon => "Tablespoon",
            ServingType::Teaspoon => "Teaspoon",
            ServingType::Gram => "Gram",
            ServingType::Custom => "CUSTOM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    Y,
    N,
}

impl Choice for YesNo {
    const ALL: &'static [Self] = &[YesNo::Y, YesNo::N];

    fn value(self) -> &'static str {
        match self {
            YesNo::Y => "Y",
            YesNo::N => "N",
        }
    }

    fn label(self) -> &'static str {
        self.value()
    }
}

/// Activity tiers and their energy multipliers. Reference data only: no
/// stored field uses it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

impl ActivityLevel {
    pub const ALL: &'static [Self] = &[
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtremelyActive,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.25,
            ActivityLevel::LightlyActive => 1.3,
            ActivityLevel::ModeratelyActive => 1.5,
            ActivityLevel::VeryActive => 1.7,
            ActivityLevel::ExtremelyActive => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly Active",
            ActivityLevel::ModeratelyActive => "Moderately Active",
            ActivityLevel::VeryActive => "Very Active",
            ActivityLevel::ExtremelyActive => "Extremely Active",
        }
    }

    pub fn from_multiplier(multiplier: f64) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| (level.multiplier() - multiplier).abs() < f64::EPSILON)
    }
}

macro_rules! display_by_value {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.value())
            }
        })+
    };
}

display_by_value!(Gender, WeightUnit, ServingType, YesNo);

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_round_trip_through_lookup() {
        assert_eq!(ServingType::from_value("CUSTOM"), Some(ServingType::Custom));
        assert_eq!(ServingType::from_value("custom"), None);
        assert_eq!(WeightUnit::from_value("LB"), Some(WeightUnit::Lb));
        assert_eq!(Gender::from_value("female"), Some(Gender::Female));
    }

    #[test]
    fn weight_unit_defaults_to_kilograms() {
        assert_eq!(WeightUnit::default(), WeightUnit::Kg);
        assert_eq!(WeightUnit::default().label(), "Kilograms");
    }

    #[test]
    fn serving_type_choices_keep_declared_order() {
        let values: Vec<&str> = ServingType::choices().into_iter().map(|(v, _)| v).collect();
        assert_eq!(
            values,
            ["ounce", "cup", "pound", "pint", "tablespoon", "teaspoon", "gram", "CUSTOM"]
        );
    }

    #[test]
    fn activity_levels_span_expected_multipliers() {
        assert_eq!(ActivityLevel::ALL.len(), 5);
        assert_eq!(ActivityLevel::ALL[0].multiplier(), 1.25);
        assert_eq!(ActivityLevel::ALL[4].multiplier(), 2.0);
        assert_eq!(
            ActivityLevel::from_multiplier(1.5),
            Some(ActivityLevel::ModeratelyActive)
        );
        assert_eq!(ActivityLevel::from_multiplier(1.4), None);
    }
}
