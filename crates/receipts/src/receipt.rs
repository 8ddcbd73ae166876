use chrono::{DateTime, Utc};
use serde::Serialize;

use gymdesk_billing::{
    dues_at_payment, record_entries, BranchProfile, CurrencyFormat, DuesAtPayment, LedgerEntry,
    Member, PaymentRecord,
};
use gymdesk_core::{Money, PaymentId};

/// Everything a printed or messaged receipt shows for one payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub receipt_no: String,
    pub payment_id: PaymentId,
    pub paid_at: DateTime<Utc>,
    pub branch: Option<BranchProfile>,
    pub member_name: String,
    pub member_phone: Option<String>,
    /// This payment's own ledger lines (charge first, then credits).
    pub lines: Vec<LedgerEntry>,
    pub payment_method: String,
    pub amount_received: Money,
    pub discount: Money,
    pub charge: Money,
    pub dues: DuesAtPayment,
    #[serde(skip)]
    pub format: CurrencyFormat,
}

impl Receipt {
    /// Build the receipt for `payment_id` from the member's payment history.
    ///
    /// Dues come from the payment's own running-balance row, so later
    /// payments in `history` never leak onto an older receipt, including ones
    /// sharing its timestamp. Returns `None` when the payment is not part of
    /// `history`.
    pub fn assemble(
        payment_id: PaymentId,
        history: &[PaymentRecord],
        member: &Member,
        branch: Option<&BranchProfile>,
        format: CurrencyFormat,
    ) -> Option<Self> {
        let payment = history.iter().find(|p| p.id == payment_id)?;
        let dues = dues_at_payment(history, payment_id)?;
        let entries = record_entries(payment);

        Some(Self {
            receipt_no: receipt_number(payment.id),
            payment_id: payment.id,
            paid_at: payment.created_at,
            branch: branch.cloned(),
            member_name: member.name.clone(),
            member_phone: member.phone.clone(),
            lines: entries.debit.into_iter().chain(entries.credits).collect(),
            payment_method: payment.payment_method.label().to_string(),
            amount_received: payment.amount,
            discount: payment.extra_discount,
            charge: payment.payable_amount,
            dues,
            format,
        })
    }

    pub fn money(&self, amount: Money) -> String {
        self.format.format(amount)
    }

    /// Header line, e.g. `Iron Temple - Andheri`.
    pub fn title(&self) -> String {
        self.branch
            .as_ref()
            .map(BranchProfile::display_name)
            .unwrap_or_else(|| "Payment Receipt".to_string())
    }
}

/// Short human-facing receipt number derived from the payment id.
///
/// Uses the random tail of the UUIDv7 rather than its timestamp prefix.
pub fn receipt_number(id: PaymentId) -> String {
    let simple = id.as_uuid().simple().to_string();
    let tail = &simple[simple.len() - 8..];
    format!("RCPT-{}", tail.to_uppercase())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::Duration;

    #[test]
    fn remaining_dues_stop_at_the_payment() {
        let f = fixture();
        let r = receipt(&f);
        assert_eq!(r.dues.previous, Money::from_major(7_000));
        assert_eq!(r.dues.remaining, Money::from_major(2_500));
        assert_eq!(r.amount_received, Money::from_major(4_000));
        assert_eq!(r.discount, Money::from_major(500));
        assert_eq!(r.lines.len(), 2);
        assert_eq!(r.title(), "Iron Temple - Andheri");
    }

    #[test]
    fn same_instant_settlement_does_not_show_on_the_charge_receipt() {
        let f = fixture();
        let at = f.history[0].created_at + Duration::days(1);
        let charge = PaymentRecord::new(f.member.tenant_id, f.member.id, at)
            .with_payable(Money::from_major(1000))
            .with_description("Locker rent");
        let settle = PaymentRecord::new(f.member.tenant_id, f.member.id, at)
            .with_received(Money::from_major(1000));
        let history = vec![charge.clone(), settle.clone()];

        let r = Receipt::assemble(charge.id, &history, &f.member, None, CurrencyFormat::default()).unwrap();
        assert_eq!(r.dues.previous, Money::ZERO);
        assert_eq!(r.dues.remaining, Money::from_major(1000));

        let r = Receipt::assemble(settle.id, &history, &f.member, None, CurrencyFormat::default()).unwrap();
        assert_eq!(r.dues.previous, Money::from_major(1000));
        assert_eq!(r.dues.remaining, Money::ZERO);
    }

    #[test]
    fn unknown_payment_yields_none() {
        let f = fixture();
        assert!(
            Receipt::assemble(PaymentId::new(), &f.history, &f.member, None, CurrencyFormat::default())
                .is_none()
        );
    }

    #[test]
    fn receipt_number_is_stable() {
        let id = PaymentId::new();
        assert_eq!(receipt_number(id), receipt_number(id));
        assert!(receipt_number(id).starts_with("RCPT-"));
        assert_eq!(receipt_number(id).len(), 13);
    }
}
