//! Billing module: member payments and the derived dues ledger.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. Balances
//! are recomputed from a payment snapshot on every read and never stored.

pub mod amount;
pub mod format;
pub mod ledger;
pub mod member;
pub mod payment;

pub use format::{CurrencyFormat, DigitGrouping};
pub use ledger::{
    balance_as_of, dues_at_payment, payment_balances, record_entries, running_balance,
    BalanceStatus, DuesAtPayment, EntrySide, LedgerEntry, MemberLedger, PaymentBalance,
    RecordEntries, RunningBalanceRow,
};
pub use member::{BranchProfile, Member};
pub use payment::{PaymentMethod, PaymentRecord, PaymentStatus};
