mod builder;
mod components;

pub use builder::TransactionBuilder;
pub use components::{SignedTransaction, TransactionDraft, UnsignedTransaction};
