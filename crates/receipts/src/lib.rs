//! Derived outputs over the member ledger: CSV exports, printable receipts and
//! WhatsApp receipt messages.
//!
//! Everything here renders values computed by `gymdesk-billing`; nothing is
//! persisted.

pub mod csv_export;
pub mod error;
pub mod html;
pub mod receipt;
pub mod whatsapp;

pub use csv_export::{ledger_csv, payments_csv};
pub use error::RenderError;
pub use html::receipt_html;
pub use receipt::Receipt;
pub use whatsapp::{normalize_phone, whatsapp_link, whatsapp_text};
