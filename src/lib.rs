//! Compile human search-box query strings into SQL WHERE predicates.
//!
//! One predicate is generated per declared table field, conjoined with
//! `AND`. Each field's input is lexed and parsed under the field's
//! declared type (string, number, boolean, money, datetime), so `12/2006`
//! against a datetime column becomes a half-open calendar range while
//! `12/2006` against a string column is a substring match.
//!
//! ```
//! use user_query::prelude::*;
//!
//! let schema = Schema::for_table("entries")
//!     .field(("n", FieldType::Number))
//!     .field(("memo", FieldType::String));
//!
//! let params = [("n", ">500"), ("memo", "urgent")];
//! let mut errors = FieldErrors::new();
//! let sql = schema.sql(&params[..], &mut errors).unwrap();
//! assert_eq!(sql, "(entries.n > 500) AND (entries.memo LIKE '%urgent%')");
//! assert!(errors.is_empty());
//! ```

pub mod ast;
pub mod clock;
pub mod error;
pub mod money;
pub mod datetime;
pub mod lexer;
pub mod parser;
pub mod generator;
pub mod schema;

pub use parser::Parser;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::clock::Clock;
    pub use crate::datetime::{DateTimePartial, Precision};
    pub use crate::error::*;
    pub use crate::generator::{Generator, SqlValue};
    pub use crate::money::Money;
    pub use crate::parser::Parser;
    pub use crate::schema::{ErrorSink, Field, FieldErrors, ParameterSource, Schema, TableDesc};
}
