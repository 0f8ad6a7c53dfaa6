mod admin;
mod contact;
mod project;
mod quote;

pub use admin::Admin;
pub use contact::{Contact, ContactMethod};
pub use project::Project;
pub use quote::{Quote, QuoteStatus};
