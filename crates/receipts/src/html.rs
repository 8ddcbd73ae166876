//! Printable HTML receipt (the browser's print dialog or an HTML-to-PDF step
//! takes it from here).

use maud::{html, Markup, DOCTYPE};

use gymdesk_billing::{BalanceStatus, EntrySide};

use crate::receipt::Receipt;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:640px;margin:24px auto;color:#222}\
header{border-bottom:2px solid #222;margin-bottom:16px}\
table{width:100%;border-collapse:collapse}\
td,th{padding:6px 4px;border-bottom:1px solid #ddd;text-align:left}\
td.amount,th.amount{text-align:right}\
.summary td{font-weight:600}\
@media print{body{margin:0}}";

pub fn receipt_html(receipt: &Receipt) -> String {
    receipt_page(receipt).into_string()
}

fn receipt_page(r: &Receipt) -> Markup {
    let status = BalanceStatus::of(r.dues.remaining);

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Receipt " (r.receipt_no) }
                style { (STYLE) }
            }
            body {
                header {
                    h2 { (r.title()) }
                    @if let Some(branch) = &r.branch {
                        @if let Some(address) = &branch.address {
                            p { (address) }
                        }
                        @if let Some(phone) = &branch.phone {
                            p { "Phone: " (phone) }
                        }
                    }
                }

                section {
                    p { "Receipt No: " strong { (r.receipt_no) } }
                    p { "Date: " (r.paid_at.format("%d %b %Y, %I:%M %p")) }
                    p { "Member: " strong { (r.member_name) } }
                    @if let Some(phone) = &r.member_phone {
                        p { "Mobile: " (phone) }
                    }
                    p { "Payment Mode: " (r.payment_method) }
                }

                table {
                    thead {
                        tr {
                            th { "Particular" }
                            th class="amount" { "Debit" }
                            th class="amount" { "Credit" }
                        }
                    }
                    tbody {
                        @for line in &r.lines {
                            tr {
                                td { (line.particular) }
                                @match line.side {
                                    EntrySide::Debit => {
                                        td class="amount" { (r.money(line.amount)) }
                                        td {}
                                    }
                                    EntrySide::Credit => {
                                        td {}
                                        td class="amount" { (r.money(line.amount)) }
                                    }
                                }
                            }
                        }
                    }
                    tfoot class="summary" {
                        tr {
                            td { "Previous Dues" }
                            td {}
                            td class="amount" { (r.money(r.dues.previous)) }
                        }
                        tr {
                            td { "Remaining Dues (" (status.label()) ")" }
                            td {}
                            td class="amount" { (r.money(r.dues.remaining)) }
                        }
                    }
                }

                p { small { "This is a computer generated receipt." } }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::fixtures::{fixture, receipt};

    #[test]
    fn renders_header_lines_and_dues() {
        let f = fixture();
        let out = receipt_html(&receipt(&f));

        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("Iron Temple - Andheri"));
        assert!(out.contains("Asha Verma"));
        assert!(out.contains("Payment Received (UPI)"));
        assert!(out.contains("Additional Discount Applied"));
        assert!(out.contains("₹4,000.00"));
        assert!(out.contains("₹7,000.00"));
        assert!(out.contains("₹2,500.00"));
        assert!(out.contains("Remaining Dues (Due)"));
    }

    #[test]
    fn escapes_member_supplied_text() {
        let mut f = fixture();
        f.member.name = "<script>alert(1)</script>".to_string();
        let out = receipt_html(&receipt(&f));
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
    }
}
