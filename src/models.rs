use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::date::date_only;
use crate::filters::Metadata;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    #[serde(skip, default = "unix_epoch")]
    pub created_at: OffsetDateTime,
    #[serde(with = "date_only")]
    pub date: Date,
    pub spent_at: String,
    pub notes: String,
    pub category: String,
    pub payment_method: String,
    pub iso_currency_code: String,
    pub amount: f64,
    pub version: i32,
}

fn unix_epoch() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

/// Caller-supplied fields of an expense. The store assigns the rest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewExpense {
    #[serde(with = "date_only")]
    pub date: Date,
    pub spent_at: String,
    #[serde(default)]
    pub notes: String,
    pub category: String,
    pub payment_method: String,
    pub iso_currency_code: String,
    pub amount: f64,
}

impl NewExpense {
    /// Draft entity used for validation before the store assigns identity.
    pub fn draft(&self) -> Expense {
        Expense {
            id: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
            date: self.date,
            spent_at: self.spent_at.clone(),
            notes: self.notes.clone(),
            category: self.category.clone(),
            payment_method: self.payment_method.clone(),
            iso_currency_code: self.iso_currency_code.clone(),
            amount: self.amount,
            version: 0,
        }
    }
}

/// Partial update. Fields left as `None` keep their current value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    #[serde(default, with = "optional_date_only")]
    pub date: Option<Date>,
    pub spent_at: Option<String>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub iso_currency_code: Option<String>,
    pub amount: Option<f64>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.spent_at.is_none()
            && self.notes.is_none()
            && self.category.is_none()
            && self.payment_method.is_none()
            && self.iso_currency_code.is_none()
            && self.amount.is_none()
    }

    /// Merges the patch into `expense`. Identity and version are untouched.
    pub fn apply_to(self, expense: &mut Expense) {
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(spent_at) = self.spent_at {
            expense.spent_at = spent_at;
        }
        if let Some(notes) = self.notes {
            expense.notes = notes;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(payment_method) = self.payment_method {
            expense.payment_method = payment_method;
        }
        if let Some(iso_currency_code) = self.iso_currency_code {
            expense.iso_currency_code = iso_currency_code;
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
    }
}

mod optional_date_only {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use crate::date::{format_date, parse_date};

    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_some(&format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_date(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExpenseList {
    pub expenses: Vec<Expense>,
    pub metadata: Metadata,
}
