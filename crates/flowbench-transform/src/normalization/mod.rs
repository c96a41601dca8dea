//! Cell-level normalization functions.

mod date;
mod email;
mod name;

pub use date::{is_us_date, normalize_date, normalize_document_date};
pub use email::{
    EmailCheck, EmailIssue, FREE_EMAIL_PROVIDERS, is_free_provider, normalize_email,
    validate_email,
};
pub use name::normalize_name;
