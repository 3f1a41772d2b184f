use crate::models::{Quotation, QuotationStatus};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: QuotationStatus,
    pub count: usize,
    /// Share of all quotations, 0 to 100, for the bar chart.
    pub percent: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuotationStats {
    pub total_quotations: usize,
    pub in_process_count: usize,
    pub won_count: usize,
    pub lost_count: usize,
    pub total_value_won: Decimal,
    pub average_quotation_value: Decimal,
    pub by_status: Vec<StatusCount>,
}

impl QuotationStats {
    pub fn from_quotations(quotations: &[Quotation]) -> Self {
        let total = quotations.len();
        let count_of =
            |status: QuotationStatus| quotations.iter().filter(|q| q.status == status).count();

        let total_value_won: Decimal = quotations
            .iter()
            .filter(|q| q.status == QuotationStatus::Won)
            .map(|q| q.grand_total)
            .sum();

        let average_quotation_value = if total == 0 {
            Decimal::ZERO
        } else {
            let sum: Decimal = quotations.iter().map(|q| q.grand_total).sum();
            sum / Decimal::from(total)
        };

        let by_status = QuotationStatus::ALL
            .into_iter()
            .map(|status| {
                let count = count_of(status);
                let percent = if total == 0 {
                    0
                } else {
                    (count * 100 / total) as u32
                };
                StatusCount {
                    status,
                    count,
                    percent,
                }
            })
            .collect();

        Self {
            total_quotations: total,
            in_process_count: count_of(QuotationStatus::InProcess),
            won_count: count_of(QuotationStatus::Won),
            lost_count: count_of(QuotationStatus::Lost),
            total_value_won,
            average_quotation_value,
            by_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyInfo, Customer, LineItem, NewQuotation, PaymentInstructions};
    use chrono::NaiveDate;

    fn quotation(price: i64, status: QuotationStatus) -> Quotation {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Quotation::from_new(NewQuotation {
            quotation_number: "QUO-0001".to_string(),
            relationship_manager: "Priya".to_string(),
            status,
            issue_date: day,
            due_date: day,
            customer: Customer::default(),
            items: vec![
                LineItem::new("P", "Product", "", 1, Decimal::from(price), Decimal::ZERO).unwrap(),
            ],
            company_info: CompanyInfo::default(),
            payment_instructions: PaymentInstructions::default(),
            thank_you_message: None,
        })
    }

    #[test]
    fn empty_history_has_zero_average() {
        let stats = QuotationStats::from_quotations(&[]);
        assert_eq!(stats.total_quotations, 0);
        assert_eq!(stats.average_quotation_value, Decimal::ZERO);
        assert!(stats.by_status.iter().all(|s| s.count == 0 && s.percent == 0));
    }

    #[test]
    fn counts_and_values_per_status() {
        let stats = QuotationStats::from_quotations(&[
            quotation(100, QuotationStatus::Won),
            quotation(300, QuotationStatus::Won),
            quotation(200, QuotationStatus::Lost),
            quotation(400, QuotationStatus::InProcess),
        ]);

        assert_eq!(stats.total_quotations, 4);
        assert_eq!(stats.won_count, 2);
        assert_eq!(stats.lost_count, 1);
        assert_eq!(stats.in_process_count, 1);
        assert_eq!(stats.total_value_won, Decimal::from(400));
        assert_eq!(stats.average_quotation_value, Decimal::from(250));
        assert_eq!(stats.by_status[0].status, QuotationStatus::InProcess);
        assert_eq!(stats.by_status[1].percent, 50);
    }
}
