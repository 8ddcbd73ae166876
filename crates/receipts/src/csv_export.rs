//! CSV exports of a member's ledger and payment list.
//!
//! Ledger header: `date,particular,debit,credit,balance`, one row per entry in
//! chronological order (a payment's debit before its credits) and a trailing
//! `Total` row. Amounts are plain decimals (`1234.50`) so spreadsheets parse them.

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;

use gymdesk_billing::{ledger::chronological, record_entries, EntrySide, PaymentBalance, PaymentRecord};
use gymdesk_core::Money;

use crate::error::RenderError;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize)]
struct LedgerCsvRow<'a> {
    date: String,
    particular: &'a str,
    debit: String,
    credit: String,
    balance: String,
}

#[derive(Serialize)]
struct PaymentCsvRow<'a> {
    date: String,
    description: &'a str,
    method: &'a str,
    payable: String,
    received: String,
    discount: String,
    status: &'a str,
    balance_as_of: String,
}

fn blank_if_zero(m: Money) -> String {
    if m.is_zero() { String::new() } else { m.to_string() }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, RenderError> {
    let bytes = wtr.into_inner().map_err(|e| RenderError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Ledger export, optionally as of `cutoff`.
pub fn ledger_csv(
    payments: &[PaymentRecord],
    cutoff: Option<DateTime<Utc>>,
) -> Result<String, RenderError> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());

    let mut total_debit = Money::ZERO;
    let mut total_credit = Money::ZERO;

    for record in chronological(payments, cutoff) {
        let entries = record_entries(record);
        for entry in entries.debit.iter().chain(entries.credits.iter()) {
            let (debit, credit) = match entry.side {
                EntrySide::Debit => {
                    total_debit += entry.amount;
                    (entry.amount.to_string(), String::new())
                }
                EntrySide::Credit => {
                    total_credit += entry.amount;
                    (String::new(), entry.amount.to_string())
                }
            };

            wtr.serialize(LedgerCsvRow {
                date: entry.date.format(DATE_FORMAT).to_string(),
                particular: &entry.particular,
                debit,
                credit,
                balance: (total_debit - total_credit).to_string(),
            })?;
        }
    }

    wtr.serialize(LedgerCsvRow {
        date: String::new(),
        particular: "Total",
        debit: total_debit.to_string(),
        credit: total_credit.to_string(),
        balance: (total_debit - total_credit).to_string(),
    })?;

    finish(wtr)
}

/// Payment list export with the point-in-time balance of each row.
pub fn payments_csv(rows: &[PaymentBalance]) -> Result<String, RenderError> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());

    for row in rows {
        let p = &row.payment;
        wtr.serialize(PaymentCsvRow {
            date: p.created_at.format(DATE_FORMAT).to_string(),
            description: p.description_text().unwrap_or(""),
            method: p.payment_method.label(),
            payable: blank_if_zero(p.payable_amount),
            received: blank_if_zero(p.amount),
            discount: blank_if_zero(p.extra_discount),
            status: p.status.as_str(),
            balance_as_of: row.balance_as_of.to_string(),
        })?;
    }

    if rows.is_empty() {
        // serde-driven headers are only emitted with the first record
        wtr.write_record([
            "date",
            "description",
            "method",
            "payable",
            "received",
            "discount",
            "status",
            "balance_as_of",
        ])?;
    }

    finish(wtr)
}
