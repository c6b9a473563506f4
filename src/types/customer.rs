//! Bank customer records as they appear in the churn dataset

use anyhow::{bail, ensure, Result};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bounds enforced on editable customer fields.
pub const CREDIT_SCORE_RANGE: (u32, u32) = (300, 850);
pub const AGE_RANGE: (u32, u32) = (18, 100);
pub const TENURE_RANGE: (u32, u32) = (0, 50);
pub const NUM_PRODUCTS_RANGE: (u32, u32) = (1, 10);

/// Country the customer banks in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Geography {
    France,
    Germany,
    Spain,
}

impl Geography {
    pub const ALL: [Geography; 3] = [Geography::France, Geography::Germany, Geography::Spain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Geography::France => "France",
            Geography::Germany => "Germany",
            Geography::Spain => "Spain",
        }
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Geography {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "france" => Ok(Geography::France),
            "germany" => Ok(Geography::Germany),
            "spain" => Ok(Geography::Spain),
            other => bail!("Unknown geography '{}' (expected France, Germany or Spain)", other),
        }
    }
}

/// Customer gender as recorded by the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => bail!("Unknown gender '{}' (expected Male or Female)", other),
        }
    }
}

/// A single row of the churn dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Position in the source file, if present
    #[serde(rename = "RowNumber", default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<u64>,

    #[serde(rename = "CustomerId")]
    pub customer_id: u64,

    #[serde(rename = "Surname")]
    pub surname: String,

    #[serde(rename = "CreditScore")]
    pub credit_score: u32,

    #[serde(rename = "Geography")]
    pub geography: Geography,

    #[serde(rename = "Gender")]
    pub gender: Gender,

    /// Age in years
    #[serde(rename = "Age")]
    pub age: u32,

    /// Years with the bank
    #[serde(rename = "Tenure")]
    pub tenure: u32,

    #[serde(rename = "Balance")]
    pub balance: f64,

    #[serde(rename = "NumOfProducts")]
    pub num_of_products: u32,

    #[serde(rename = "HasCrCard", deserialize_with = "deserialize_flag")]
    pub has_cr_card: bool,

    #[serde(rename = "IsActiveMember", deserialize_with = "deserialize_flag")]
    pub is_active_member: bool,

    #[serde(rename = "EstimatedSalary")]
    pub estimated_salary: f64,

    /// Churn label (only present in historical data)
    #[serde(
        rename = "Exited",
        default,
        deserialize_with = "deserialize_optional_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub exited: Option<bool>,
}

impl CustomerRecord {
    /// Create a record with required identity fields and neutral defaults
    pub fn new(customer_id: u64, surname: impl Into<String>, age: u32) -> Self {
        Self {
            row_number: None,
            customer_id,
            surname: surname.into(),
            credit_score: 650,
            geography: Geography::France,
            gender: Gender::Female,
            age,
            tenure: 0,
            balance: 0.0,
            num_of_products: 1,
            has_cr_card: false,
            is_active_member: false,
            estimated_salary: 0.0,
            exited: None,
        }
    }

    /// Selection label shown to the user, e.g. `15634602 - Hargrave`
    pub fn option_label(&self) -> String {
        format!("{} - {}", self.customer_id, self.surname)
    }

    /// Check every field against its domain before encoding.
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = CREDIT_SCORE_RANGE;
        ensure!(
            (lo..=hi).contains(&self.credit_score),
            "CreditScore {} outside {}..={}",
            self.credit_score,
            lo,
            hi
        );

        let (lo, hi) = AGE_RANGE;
        ensure!(
            (lo..=hi).contains(&self.age),
            "Age {} outside {}..={}",
            self.age,
            lo,
            hi
        );

        let (lo, hi) = TENURE_RANGE;
        ensure!(
            (lo..=hi).contains(&self.tenure),
            "Tenure {} outside {}..={}",
            self.tenure,
            lo,
            hi
        );

        let (lo, hi) = NUM_PRODUCTS_RANGE;
        ensure!(
            (lo..=hi).contains(&self.num_of_products),
            "NumOfProducts {} outside {}..={}",
            self.num_of_products,
            lo,
            hi
        );

        ensure!(
            self.balance.is_finite() && self.balance >= 0.0,
            "Balance must be a non-negative number, got {}",
            self.balance
        );
        ensure!(
            self.estimated_salary.is_finite() && self.estimated_salary >= 0.0,
            "EstimatedSalary must be a non-negative number, got {}",
            self.estimated_salary
        );

        Ok(())
    }
}

/// The dataset stores booleans as `0`/`1`; JSON input may use `true`/`false`.
struct Flag(bool);

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagVisitor;

        impl<'de> Visitor<'de> for FlagVisitor {
            type Value = Flag;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("0, 1, true or false")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Flag, E> {
                Ok(Flag(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Flag, E> {
                match v {
                    0 => Ok(Flag(false)),
                    1 => Ok(Flag(true)),
                    _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Flag, E> {
                match v {
                    0 => Ok(Flag(false)),
                    1 => Ok(Flag(true)),
                    _ => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Flag, E> {
                if v == 0.0 {
                    Ok(Flag(false))
                } else if v == 1.0 {
                    Ok(Flag(true))
                } else {
                    Err(E::invalid_value(de::Unexpected::Float(v), &self))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Flag, E> {
                match v.trim() {
                    "0" | "0.0" | "false" | "False" => Ok(Flag(false)),
                    "1" | "1.0" | "true" | "True" => Ok(Flag(true)),
                    _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
                }
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Flag::deserialize(deserializer).map(|f| f.0)
}

fn deserialize_optional_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    Option::<Flag>::deserialize(deserializer).map(|f| f.map(|f| f.0))
}
