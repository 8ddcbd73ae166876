//! WhatsApp receipt message and click-to-chat link.

use url::Url;

use gymdesk_billing::BalanceStatus;

use crate::receipt::Receipt;

const WA_BASE: &str = "https://wa.me/";

/// Plain-text receipt, one fact per line.
pub fn whatsapp_text(r: &Receipt) -> String {
    let mut lines = vec![
        format!("*{}*", r.title()),
        format!("Payment receipt {}", r.receipt_no),
        String::new(),
        format!("Hi {}, thank you for your payment.", r.member_name),
        format!("Date: {}", r.paid_at.format("%d %b %Y")),
    ];

    if r.charge.is_positive() {
        lines.push(format!("Charge: {}", r.money(r.charge)));
    }
    if r.amount_received.is_positive() {
        lines.push(format!("Received: {} ({})", r.money(r.amount_received), r.payment_method));
    }
    if r.discount.is_positive() {
        lines.push(format!("Discount: {}", r.money(r.discount)));
    }

    lines.push(match BalanceStatus::of(r.dues.remaining) {
        BalanceStatus::Receivable => format!("Remaining dues: {}", r.money(r.dues.remaining)),
        BalanceStatus::Payable => format!("Advance with us: {}", r.money(r.dues.remaining.abs())),
        BalanceStatus::Settled => "No dues remaining.".to_string(),
    });

    lines.join("\n")
}

/// Digits-only international number, or `None` if there is nothing dialable.
///
/// Ten-digit local numbers get `default_country_code`; a leading trunk `0` on
/// an 11-digit number is dropped first.
pub fn normalize_phone(phone: &str, default_country_code: &str) -> Option<String> {
    let mut digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if digits.len() == 11 && digits.starts_with('0') {
        digits.remove(0);
    }
    if digits.len() == 10 {
        digits.insert_str(0, default_country_code);
    }

    (digits.len() >= 8).then_some(digits)
}

/// `https://wa.me/<number>?text=<encoded>`.
pub fn whatsapp_link(phone: &str, default_country_code: &str, text: &str) -> Option<String> {
    let number = normalize_phone(phone, default_country_code)?;
    let mut url = Url::parse(WA_BASE).ok()?.join(&number).ok()?;
    url.query_pairs_mut().append_pair("text", text);
    tracing::debug!(number = %number, "composed whatsapp link");
    Some(url.into())
}
