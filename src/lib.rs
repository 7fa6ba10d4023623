//! Record-keeping core of a personal expense tracker.
//!
//! Callers authenticate the owner, build an expense or listing filters,
//! validate them with [`validator::Validator`], and hand them to
//! [`expenses::ExpenseStore`]. Every store operation is scoped by owner id.

pub mod config;
pub mod constants;
pub mod database;
pub mod date;
pub mod error;
pub mod expenses;
pub mod filters;
pub mod models;
pub mod validator;

pub use error::{ExpenseError, ExpenseResult, StoreError};
pub use expenses::ExpenseStore;
pub use filters::{Filters, Metadata, MonthYearFilter};
pub use models::{Expense, ExpenseList, ExpensePatch, NewExpense};
pub use validator::Validator;
