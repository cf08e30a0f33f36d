//! Defines the closed set of categories that classify a transaction's purpose,
//! along with the fixed display color assigned to each category.
//!
//! Stored records may contain tags written by older clients, so deserialization
//! never fails: anything unrecognized collapses into [Category::Other].

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// What a transaction was for, e.g. groceries, rent or wages.
///
/// The set is closed: every category has a display color via
/// [Category::color], and unknown values fall back to [Category::Other].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Groceries and eating out.
    Food,
    /// Public transport, fuel, vehicle maintenance.
    Transportation,
    /// Rent or mortgage payments.
    Housing,
    /// Power, water, internet, phone.
    Utilities,
    /// Movies, games, events.
    Entertainment,
    /// Doctor visits, medication, insurance.
    Healthcare,
    /// Tuition, courses, books.
    Education,
    /// Clothing, electronics, household goods.
    Shopping,
    /// Haircuts, gym memberships, subscriptions.
    Personal,
    /// Loan and credit card repayments.
    Debt,
    /// Transfers into savings.
    Savings,
    /// Presents and donations.
    Gifts,
    /// Wages and salary payments.
    Salary,
    /// Dividends, interest, capital gains.
    Investments,
    /// Anything that does not fit the categories above.
    Other,
}

/// Every category in display order.
pub const ALL_CATEGORIES: [Category; 15] = [
    Category::Food,
    Category::Transportation,
    Category::Housing,
    Category::Utilities,
    Category::Entertainment,
    Category::Healthcare,
    Category::Education,
    Category::Shopping,
    Category::Personal,
    Category::Debt,
    Category::Savings,
    Category::Gifts,
    Category::Salary,
    Category::Investments,
    Category::Other,
];

impl Category {
    /// The fixed display color for this category as a hex string, e.g.
    /// `"#F87171"`.
    ///
    /// The mapping is total: every category, including [Category::Other], has
    /// a color.
    pub fn color(self) -> &'static str {
        match self {
            Category::Food => "#F87171",
            Category::Transportation => "#60A5FA",
            Category::Housing => "#34D399",
            Category::Utilities => "#A78BFA",
            Category::Entertainment => "#FBBF24",
            Category::Healthcare => "#EC4899",
            Category::Education => "#8B5CF6",
            Category::Shopping => "#F472B6",
            Category::Personal => "#14B8A6",
            Category::Debt => "#EF4444",
            Category::Savings => "#22C55E",
            Category::Gifts => "#F59E0B",
            Category::Salary => "#3B82F6",
            Category::Investments => "#10B981",
            Category::Other => "#6B7280",
        }
    }

    /// The lowercase tag used when storing this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transportation => "transportation",
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Healthcare => "healthcare",
            Category::Education => "education",
            Category::Shopping => "shopping",
            Category::Personal => "personal",
            Category::Debt => "debt",
            Category::Savings => "savings",
            Category::Gifts => "gifts",
            Category::Salary => "salary",
            Category::Investments => "investments",
            Category::Other => "other",
        }
    }

    /// A capitalized label for display, e.g. `"Food"`.
    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::Housing => "Housing",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::Shopping => "Shopping",
            Category::Personal => "Personal",
            Category::Debt => "Debt",
            Category::Savings => "Savings",
            Category::Gifts => "Gifts",
            Category::Salary => "Salary",
            Category::Investments => "Investments",
            Category::Other => "Other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        match tag {
            "food" => Category::Food,
            "transportation" => Category::Transportation,
            "housing" => Category::Housing,
            "utilities" => Category::Utilities,
            "entertainment" => Category::Entertainment,
            "healthcare" => Category::Healthcare,
            "education" => Category::Education,
            "shopping" => Category::Shopping,
            "personal" => Category::Personal,
            "debt" => Category::Debt,
            "savings" => Category::Savings,
            "gifts" => Category::Gifts,
            "salary" => Category::Salary,
            "investments" => Category::Investments,
            _ => Category::Other,
        }
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(Category::from(tag))
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Category::from(tag.as_str()))
    }
}
