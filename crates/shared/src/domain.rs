use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label used by every category for "no filter".
pub const ALL_LABEL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {category} '{value}'")]
pub struct UnknownCategory {
    pub category: &'static str,
    pub value: String,
}

macro_rules! category_enum {
    ($name:ident, $category:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownCategory;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let trimmed = value.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownCategory {
                        category: $category,
                        value: value.to_string(),
                    })
            }
        }
    };
}

category_enum!(BusinessFunction, "function" {
    Aml => "AML",
    Fraud => "Fraud",
    CreditRisk => "Credit Risk",
    Underwriting => "Underwriting",
    Trading => "Trading",
    PortfolioOptimization => "Portfolio Optimization",
    Kyc => "KYC",
    Compliance => "Compliance",
    Churn => "Churn",
    Personalization => "Personalization",
});

category_enum!(Technique, "technique" {
    Transformer => "Transformer",
    Graph => "Graph",
    GradientBoosting => "Gradient Boosting",
    RandomForest => "Random Forest",
    Lstm => "LSTM",
    Cnn => "CNN",
    XgBoost => "XGBoost",
    LogisticRegression => "Logistic Regression",
    Other => "Other",
});

category_enum!(Industry, "industry" {
    Banking => "Banking",
    Insurance => "Insurance",
    Fintech => "Fintech",
    AssetManagement => "Asset Management",
    Payments => "Payments",
});

category_enum!(Stage, "stage" {
    Research => "Research",
    Pilot => "Pilot",
    Production => "Production",
});

/// A category selection: either the `All` sentinel or one concrete tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryFilter<T> {
    All,
    Only(T),
}

impl<T: Copy> CategoryFilter<T> {
    pub fn selected(&self) -> Option<T> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(value) => Some(*value),
        }
    }
}

impl<T> CategoryFilter<T>
where
    T: FromStr<Err = UnknownCategory>,
{
    /// Parses a user-facing label, where `All` (any case) or an empty string
    /// selects the sentinel.
    pub fn parse_label(value: &str) -> Result<Self, UnknownCategory> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_LABEL) {
            return Ok(CategoryFilter::All);
        }
        trimmed.parse().map(CategoryFilter::Only)
    }
}

impl<T: fmt::Display> fmt::Display for CategoryFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_LABEL),
            CategoryFilter::Only(value) => value.fmt(f),
        }
    }
}
