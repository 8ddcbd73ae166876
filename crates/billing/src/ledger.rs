use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gymdesk_core::{Money, PaymentId};

use crate::payment::PaymentRecord;

/// Particular used for a charge without a description.
pub const DEFAULT_CHARGE_PARTICULAR: &str = "Membership Plan Charge";

/// Particular used for the `extra_discount` credit.
pub const DISCOUNT_PARTICULAR: &str = "Additional Discount Applied";

/// Which side of the member's ledger an entry sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Charge owed by the member.
    Debit,
    /// Payment or discount reducing what the member owes.
    Credit,
}

/// One derived ledger line. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub payment_id: PaymentId,
    pub date: DateTime<Utc>,
    pub particular: String,
    pub amount: Money,
    pub side: EntrySide,
}

/// How a balance reads to the front desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    /// Positive balance: the member owes the gym.
    Receivable,
    /// Negative balance: the gym owes the member (overpayment).
    Payable,
    Settled,
}

impl BalanceStatus {
    pub fn of(balance: Money) -> Self {
        if balance.is_positive() {
            BalanceStatus::Receivable
        } else if balance.is_negative() {
            BalanceStatus::Payable
        } else {
            BalanceStatus::Settled
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BalanceStatus::Receivable => "Due",
            BalanceStatus::Payable => "Advance",
            BalanceStatus::Settled => "Settled",
        }
    }
}

/// Debit and credit entries contributed by a single payment record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntries {
    pub debit: Option<LedgerEntry>,
    pub credits: Vec<LedgerEntry>,
}

impl RecordEntries {
    pub fn debit_total(&self) -> Money {
        self.debit.as_ref().map(|e| e.amount).unwrap_or(Money::ZERO)
    }

    pub fn credit_total(&self) -> Money {
        self.credits.iter().map(|e| e.amount).sum()
    }
}

/// Partition one record into its debit entry and up to two credit entries.
pub fn record_entries(record: &PaymentRecord) -> RecordEntries {
    let debit = record.payable_amount.is_positive().then(|| LedgerEntry {
        payment_id: record.id,
        date: record.created_at,
        particular: record
            .description_text()
            .unwrap_or(DEFAULT_CHARGE_PARTICULAR)
            .to_string(),
        amount: record.payable_amount,
        side: EntrySide::Debit,
    });

    let mut credits = Vec::with_capacity(2);
    if record.amount.is_positive() {
        credits.push(LedgerEntry {
            payment_id: record.id,
            date: record.created_at,
            particular: format!("Payment Received ({})", record.payment_method.label()),
            amount: record.amount,
            side: EntrySide::Credit,
        });
    }
    if record.extra_discount.is_positive() {
        credits.push(LedgerEntry {
            payment_id: record.id,
            date: record.created_at,
            particular: DISCOUNT_PARTICULAR.to_string(),
            amount: record.extra_discount,
            side: EntrySide::Credit,
        });
    }

    RecordEntries { debit, credits }
}

/// Records at or before `cutoff`, ascending by `created_at`.
///
/// The sort is stable: records sharing a timestamp keep their input order.
pub fn chronological(
    payments: &[PaymentRecord],
    cutoff: Option<DateTime<Utc>>,
) -> Vec<&PaymentRecord> {
    let mut selected: Vec<&PaymentRecord> = payments
        .iter()
        .filter(|p| cutoff.is_none_or(|c| p.created_at <= c))
        .collect();
    selected.sort_by_key(|p| p.created_at);
    selected
}

/// Partitioned ledger for one member, optionally as of a cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLedger {
    pub as_of: Option<DateTime<Utc>>,
    pub debits: Vec<LedgerEntry>,
    pub credits: Vec<LedgerEntry>,
    pub total_debit: Money,
    pub total_credit: Money,
    /// `total_debit - total_credit`. Positive: member owes the gym.
    pub balance: Money,
}

impl MemberLedger {
    /// Build the ledger from a snapshot of one member's payments.
    ///
    /// Records created strictly after `cutoff` are ignored. Input order does
    /// not matter; output entries are chronological.
    pub fn build(payments: &[PaymentRecord], cutoff: Option<DateTime<Utc>>) -> Self {
        let mut debits = Vec::new();
        let mut credits = Vec::new();

        for record in chronological(payments, cutoff) {
            let entries = record_entries(record);
            debits.extend(entries.debit);
            credits.extend(entries.credits);
        }

        let total_debit: Money = debits.iter().map(|e| e.amount).sum();
        let total_credit: Money = credits.iter().map(|e| e.amount).sum();

        Self {
            as_of: cutoff,
            debits,
            credits,
            total_debit,
            total_credit,
            balance: total_debit - total_credit,
        }
    }

    pub fn status(&self) -> BalanceStatus {
        BalanceStatus::of(self.balance)
    }

    pub fn is_empty(&self) -> bool {
        self.debits.is_empty() && self.credits.is_empty()
    }
}

/// Net balance over the snapshot, optionally as of `cutoff`.
pub fn balance_as_of(payments: &[PaymentRecord], cutoff: Option<DateTime<Utc>>) -> Money {
    chronological(payments, cutoff)
        .into_iter()
        .map(|p| {
            let e = record_entries(p);
            e.debit_total() - e.credit_total()
        })
        .sum()
}

/// One row of the running-balance walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalanceRow {
    pub payment_id: PaymentId,
    pub created_at: DateTime<Utc>,
    pub debit: Money,
    pub credit: Money,
    pub cumulative_debit: Money,
    pub cumulative_credit: Money,
    /// `cumulative_debit - cumulative_credit` after this record.
    pub remaining: Money,
}

/// Walk the payments in ascending time order, emitting the balance after each.
pub fn running_balance(payments: &[PaymentRecord]) -> Vec<RunningBalanceRow> {
    let mut cumulative_debit = Money::ZERO;
    let mut cumulative_credit = Money::ZERO;

    chronological(payments, None)
        .into_iter()
        .map(|p| {
            let entries = record_entries(p);
            let debit = entries.debit_total();
            let credit = entries.credit_total();
            cumulative_debit += debit;
            cumulative_credit += credit;
            RunningBalanceRow {
                payment_id: p.id,
                created_at: p.created_at,
                debit,
                credit,
                cumulative_debit,
                cumulative_credit,
                remaining: cumulative_debit - cumulative_credit,
            }
        })
        .collect()
}

/// Dues around one payment, as printed on its receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuesAtPayment {
    /// Balance before this payment's own debit and credits.
    pub previous: Money,
    /// Balance right after this payment in the chronological walk.
    pub remaining: Money,
}

impl From<&RunningBalanceRow> for DuesAtPayment {
    fn from(row: &RunningBalanceRow) -> Self {
        Self {
            previous: row.remaining - row.debit + row.credit,
            remaining: row.remaining,
        }
    }
}

/// Receipt figures for `payment_id`, or `None` if it is not in the snapshot.
///
/// Taken from the payment's own running-balance row, so records sharing its
/// timestamp but walked after it do not count.
pub fn dues_at_payment(payments: &[PaymentRecord], payment_id: PaymentId) -> Option<DuesAtPayment> {
    running_balance(payments)
        .iter()
        .find(|row| row.payment_id == payment_id)
        .map(DuesAtPayment::from)
}

/// A payment alongside the balance badge shown next to it in payment lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBalance {
    pub payment: PaymentRecord,
    /// Running balance right after this payment.
    pub balance_as_of: Money,
    pub status: BalanceStatus,
}

/// Every payment in chronological order with its point-in-time balance.
pub fn payment_balances(payments: &[PaymentRecord]) -> Vec<PaymentBalance> {
    chronological(payments, None)
        .into_iter()
        .zip(running_balance(payments))
        .map(|(p, row)| PaymentBalance {
            payment: p.clone(),
            balance_as_of: row.remaining,
            status: BalanceStatus::of(row.remaining),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::PaymentMethod;
    use chrono::{Duration, TimeZone};
    use gymdesk_core::{MemberId, TenantId};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn payment(payable: i64, received: i64, discount: i64, at: DateTime<Utc>) -> PaymentRecord {
        PaymentRecord::new(TenantId::new(), MemberId::new(), at)
            .with_payable(Money::from_major(payable))
            .with_received(Money::from_major(received))
            .with_discount(Money::from_major(discount))
    }

    fn sum(entries: &[LedgerEntry]) -> Money {
        entries.iter().map(|e| e.amount).sum()
    }

    #[test]
    fn empty_snapshot_is_settled() {
        let ledger = MemberLedger::build(&[], None);
        assert!(ledger.is_empty());
        assert_eq!(ledger.balance, Money::ZERO);
        assert_eq!(ledger.status(), BalanceStatus::Settled);
        assert!(running_balance(&[]).is_empty());
    }

    #[test]
    fn full_payment_nets_to_zero() {
        let ledger = MemberLedger::build(&[payment(500, 500, 0, t0())], None);
        assert_eq!(ledger.debits.len(), 1);
        assert_eq!(ledger.credits.len(), 1);
        assert_eq!(ledger.debits[0].amount, Money::from_major(500));
        assert_eq!(ledger.credits[0].amount, Money::from_major(500));
        assert_eq!(ledger.balance, Money::ZERO);
    }

    #[test]
    fn discount_is_a_separate_credit() {
        let ledger = MemberLedger::build(&[payment(1000, 600, 400, t0())], None);
        assert_eq!(ledger.debits.len(), 1);
        assert_eq!(ledger.credits.len(), 2);
        assert_eq!(ledger.credits[0].amount, Money::from_major(600));
        assert_eq!(ledger.credits[1].amount, Money::from_major(400));
        assert_eq!(ledger.credits[1].particular, DISCOUNT_PARTICULAR);
        assert_eq!(ledger.balance, Money::ZERO);
    }

    #[test]
    fn receipt_without_charge_is_payable_to_member() {
        let ledger = MemberLedger::build(&[payment(0, 300, 0, t0())], None);
        assert!(ledger.debits.is_empty());
        assert_eq!(ledger.credits.len(), 1);
        assert_eq!(ledger.balance, Money::from_major(-300));
        assert_eq!(ledger.status(), BalanceStatus::Payable);
    }

    #[test]
    fn particulars_use_description_and_method() {
        let record = payment(1200, 1200, 0, t0())
            .with_description("Quarterly plan")
            .with_method(PaymentMethod::Upi);
        let entries = record_entries(&record);
        assert_eq!(entries.debit.unwrap().particular, "Quarterly plan");
        assert_eq!(entries.credits[0].particular, "Payment Received (UPI)");

        let blank = payment(100, 0, 0, t0()).with_description("   ");
        assert_eq!(
            record_entries(&blank).debit.unwrap().particular,
            DEFAULT_CHARGE_PARTICULAR
        );
    }

    #[test]
    fn negative_amounts_contribute_nothing() {
        let ledger = MemberLedger::build(&[payment(-100, -50, -10, t0())], None);
        assert!(ledger.is_empty());
        assert_eq!(ledger.balance, Money::ZERO);
    }

    #[test]
    fn as_of_ignores_later_payments_regardless_of_input_order() {
        let first = payment(1000, 400, 0, t0());
        let second = payment(0, 600, 0, t0() + Duration::days(3));
        let snapshot = vec![second.clone(), first.clone()];

        let ledger = MemberLedger::build(&snapshot, Some(first.created_at));
        assert_eq!(ledger.balance, Money::from_major(600));
        assert_eq!(ledger.credits.len(), 1);
        assert_eq!(ledger.credits[0].payment_id, first.id);

        assert_eq!(balance_as_of(&snapshot, Some(first.created_at)), Money::from_major(600));
        assert_eq!(balance_as_of(&snapshot, None), Money::ZERO);
    }

    #[test]
    fn cutoff_is_inclusive() {
        let p = payment(700, 0, 0, t0());
        assert_eq!(balance_as_of(&[p.clone()], Some(t0())), Money::from_major(700));
        assert_eq!(
            balance_as_of(&[p], Some(t0() - Duration::seconds(1))),
            Money::ZERO
        );
    }

    #[test]
    fn entries_are_chronological() {
        let late = payment(300, 0, 0, t0() + Duration::days(30));
        let early = payment(500, 0, 0, t0());
        let ledger = MemberLedger::build(&[late.clone(), early.clone()], None);
        assert_eq!(ledger.debits[0].payment_id, early.id);
        assert_eq!(ledger.debits[1].payment_id, late.id);
    }

    #[test]
    fn running_balance_accumulates_in_time_order() {
        let a = payment(1000, 0, 0, t0());
        let b = payment(0, 400, 100, t0() + Duration::days(1));
        let c = payment(500, 500, 0, t0() + Duration::days(2));
        let rows = running_balance(&[c.clone(), a.clone(), b.clone()]);

        let remaining: Vec<Money> = rows.iter().map(|r| r.remaining).collect();
        assert_eq!(
            remaining,
            vec![Money::from_major(1000), Money::from_major(500), Money::from_major(500)]
        );
        assert_eq!(rows[1].payment_id, b.id);
        assert_eq!(rows[1].credit, Money::from_major(500));
        assert_eq!(rows[2].cumulative_debit, Money::from_major(1500));
        assert_eq!(rows[2].cumulative_credit, Money::from_major(1000));
    }

    #[test]
    fn dues_at_payment_reports_previous_and_remaining() {
        let plan = payment(3000, 1000, 0, t0());
        let instalment = payment(0, 1500, 0, t0() + Duration::days(10));
        let later = payment(0, 500, 0, t0() + Duration::days(20));
        let snapshot = vec![later, instalment.clone(), plan];

        let dues = dues_at_payment(&snapshot, instalment.id).unwrap();
        assert_eq!(dues.previous, Money::from_major(2000));
        assert_eq!(dues.remaining, Money::from_major(500));
        assert!(dues_at_payment(&snapshot, PaymentId::new()).is_none());
    }

    #[test]
    fn payment_balances_badge_each_row() {
        let a = payment(2000, 500, 0, t0());
        let b = payment(0, 1500, 0, t0() + Duration::days(7));
        let c = payment(0, 200, 0, t0() + Duration::days(8));
        let rows = payment_balances(&[c, b, a]);

        let badges: Vec<(Money, BalanceStatus)> = rows.iter().map(|r| (r.balance_as_of, r.status)).collect();
        assert_eq!(
            badges,
            vec![
                (Money::from_major(1500), BalanceStatus::Receivable),
                (Money::ZERO, BalanceStatus::Settled),
                (Money::from_major(-200), BalanceStatus::Payable),
            ]
        );
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let charge = payment(1000, 0, 0, t0()).with_description("Monthly plan");
        let settle = payment(0, 1000, 0, t0());
        let snapshot = vec![charge.clone(), settle.clone()];

        let ledger = MemberLedger::build(&snapshot, None);
        assert_eq!(ledger.debits[0].payment_id, charge.id);
        assert_eq!(ledger.credits[0].payment_id, settle.id);

        let rows = running_balance(&snapshot);
        assert_eq!(rows[0].payment_id, charge.id);
        assert_eq!(rows[0].remaining, Money::from_major(1000));
        assert_eq!(rows[1].payment_id, settle.id);
        assert_eq!(rows[1].remaining, Money::ZERO);

        let reversed: Vec<PaymentRecord> = snapshot.iter().rev().cloned().collect();
        let rows_rev = running_balance(&reversed);
        assert_eq!(rows_rev[0].payment_id, settle.id);
        assert_eq!(rows_rev[0].remaining, Money::from_major(-1000));
    }

    #[test]
    fn same_instant_payments_do_not_leak_into_each_others_dues() {
        let charge = payment(1000, 0, 0, t0());
        let settle = payment(0, 1000, 0, t0());
        let snapshot = vec![charge.clone(), settle.clone()];
        let rows = running_balance(&snapshot);

        let charge_dues = dues_at_payment(&snapshot, charge.id).unwrap();
        assert_eq!(charge_dues.previous, Money::ZERO);
        assert_eq!(charge_dues.remaining, Money::from_major(1000));
        assert_eq!(charge_dues.remaining, rows[0].remaining);

        let settle_dues = dues_at_payment(&snapshot, settle.id).unwrap();
        assert_eq!(settle_dues.previous, Money::from_major(1000));
        assert_eq!(settle_dues.remaining, Money::ZERO);

        let badges: Vec<Money> = payment_balances(&snapshot).iter().map(|r| r.balance_as_of).collect();
        assert_eq!(badges, vec![Money::from_major(1000), Money::ZERO]);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let snapshot = vec![payment(1000, 200, 50, t0()), payment(0, 300, 0, t0() + Duration::hours(5))];
        assert_eq!(MemberLedger::build(&snapshot, None), MemberLedger::build(&snapshot, None));
        assert_eq!(running_balance(&snapshot), running_balance(&snapshot));
    }

    fn arb_payment() -> impl Strategy<Value = PaymentRecord> {
        (-1_000_000i64..10_000_000, -1_000_000i64..10_000_000, -1_000_000i64..1_000_000, 0i64..1_000)
            .prop_map(|(payable, received, discount, offset_hours)| {
                PaymentRecord::new(TenantId::new(), MemberId::new(), t0() + Duration::hours(offset_hours))
                    .with_payable(Money::from_minor(payable))
                    .with_received(Money::from_minor(received))
                    .with_discount(Money::from_minor(discount))
            })
    }

    /// Only three distinct instants, so ties are the norm.
    fn arb_tied_payment() -> impl Strategy<Value = PaymentRecord> {
        (0i64..500_000, 0i64..500_000, 0i64..3).prop_map(|(payable, received, slot)| {
            PaymentRecord::new(TenantId::new(), MemberId::new(), t0() + Duration::days(slot))
                .with_payable(Money::from_minor(payable))
                .with_received(Money::from_minor(received))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: balance is exactly debits minus credits.
        #[test]
        fn balance_is_debits_minus_credits(payments in prop::collection::vec(arb_payment(), 0..20)) {
            let ledger = MemberLedger::build(&payments, None);
            prop_assert_eq!(ledger.total_debit, sum(&ledger.debits));
            prop_assert_eq!(ledger.total_credit, sum(&ledger.credits));
            prop_assert_eq!(ledger.balance, sum(&ledger.debits) - sum(&ledger.credits));
            prop_assert_eq!(ledger.balance, balance_as_of(&payments, None));
        }

        /// Property: the last running row lands on the full balance.
        #[test]
        fn running_balance_ends_at_total(payments in prop::collection::vec(arb_payment(), 1..20)) {
            let rows = running_balance(&payments);
            prop_assert_eq!(rows.len(), payments.len());
            prop_assert_eq!(rows.last().map(|r| r.remaining), Some(balance_as_of(&payments, None)));
        }

        /// Property: input order never changes the result.
        #[test]
        fn order_independent(mut payments in prop::collection::vec(arb_payment(), 0..20), cutoff_hours in 0i64..1_000) {
            let cutoff = Some(t0() + Duration::hours(cutoff_hours));
            let before = balance_as_of(&payments, cutoff);
            payments.reverse();
            prop_assert_eq!(balance_as_of(&payments, cutoff), before);
        }

        /// Property: receipt dues and list badges match each payment's running row,
        /// even when many records share a timestamp.
        #[test]
        fn dues_follow_running_rows(payments in prop::collection::vec(arb_tied_payment(), 1..12)) {
            let rows = running_balance(&payments);
            let badges = payment_balances(&payments);
            for (row, badge) in rows.iter().zip(&badges) {
                let dues = dues_at_payment(&payments, row.payment_id).unwrap();
                prop_assert_eq!(dues.remaining, row.remaining);
                prop_assert_eq!(dues.previous, row.remaining - row.debit + row.credit);
                prop_assert_eq!(badge.payment.id, row.payment_id);
                prop_assert_eq!(badge.balance_as_of, row.remaining);
            }
        }

        /// Property: a record yields at most one debit and two credits.
        #[test]
        fn entry_counts_are_bounded(p in arb_payment()) {
            let e = record_entries(&p);
            prop_assert!(e.credits.len() <= 2);
            prop_assert_eq!(e.debit.is_some(), p.payable_amount.is_positive());
        }
    }
}
