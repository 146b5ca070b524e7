//! Statement parser dispatching on the detected OU company.

use tracing::debug;

use super::company::{OuCompany, detect_company_name};
use super::lines::StatementLines;
use super::rules::RULES;
use crate::models::record::InvoiceRecord;

/// Turns the layout text of one statement into a record.
pub trait StatementParser: Send + Sync {
    /// Parse statement text. Problems are reported on the record, never
    /// as an error.
    fn parse(&self, text: &str, filename: &str) -> InvoiceRecord;
}

/// Parser for Klarna payout statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayoutParser;

impl PayoutParser {
    pub fn new() -> Self {
        Self
    }
}

impl StatementParser for PayoutParser {
    fn parse(&self, text: &str, filename: &str) -> InvoiceRecord {
        let lines = StatementLines::new(text);
        let name = detect_company_name(&lines);
        let company = OuCompany::from_name(&name);
        debug!("{}: detected {} ({})", filename, name, company);

        let mut record = InvoiceRecord::for_company(name);
        record.filename = filename.to_string();

        if !company.is_supported() {
            let message = format!("unsupported company: {}", record.our_company_name);
            record.push_error(message);
            return record;
        }

        for rule in RULES {
            rule(&lines, company, &mut record);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    /// Lay out a one-page statement the way the converter does: the page
    /// header is line 1, the invoice number line 5, our company lines 8
    /// and 9, the payout date line 10.
    fn statement(company: &str, address: &str, currency: &str, body: &[&str]) -> String {
        let mut lines = vec![
            "--- Page 1 ---".to_string(),
            String::new(),
            "                                                  Settlement statement".to_string(),
            String::new(),
            "  Klarna Bank AB (publ)                            Statement no.     KP-2025-0001"
                .to_string(),
            String::new(),
            "  Billed to".to_string(),
            format!("  {}       Klarna", company),
            format!("  {}", address),
            "  Payout date: 15 Jan 2025".to_string(),
            String::new(),
            format!("  Payout amount                                      {}     1,046.50", currency),
        ];
        lines.extend(body.iter().map(|l| format!("  {}", l)));
        lines.push(String::new());
        lines.join("\n")
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_australia() {
        let text = statement(
            "SHEIN DISTRIBUTION AUSTRALIA PTY LIMITED",
            "Level 10, 1 Market St, Sydney NSW 2000       ABN: 77601234567",
            "AUD",
            &[
                "Fees 1                     Transactions                      1,234.56",
                "GST on fees (10.00%)                                           -12.35",
                "Total costs and fees                                          -135.80",
                "",
                "Need support? Contact us at klarna.com/merchant-support",
                "Klarna Australia Pty Ltd, Level 3, 9 Castlereagh St, Sydney NSW • ABN 30600903287",
            ],
        );

        let record = PayoutParser.parse(&text, "au.txt");

        assert_eq!(record.invoice_number, "KP-2025-0001");
        assert_eq!(record.our_company_name, "SHEIN DISTRIBUTION AUSTRALIA PTY LIMITED");
        assert_eq!(record.our_company_address, "Level 10, 1 Market St, Sydney NSW 2000");
        assert_eq!(record.our_tax_id, "77601234567");
        assert_eq!(record.invoice_date, "15 Jan 2025");
        assert_eq!(record.net_amount, Some(dec("1234.56")));
        assert_eq!(record.tax_rate, "10.00%");
        assert_eq!(record.tax_amount, Some(dec("12.35")));
        assert_eq!(record.total_amount, Some(dec("135.80")));
        assert_eq!(record.currency, "AUD");
        assert_eq!(record.vendor_name, "Klarna Australia Pty Ltd");
        assert_eq!(record.vendor_address, "Level 3, 9 Castlereagh St, Sydney NSW");
        assert_eq!(record.vendor_tax_id, "30600903287");
        assert_eq!(record.filename, "au.txt");
        assert!(record.is_success());
    }

    #[test]
    fn test_uk() {
        let text = statement(
            "SHEIN DISTRIBUTION UK LIMITED",
            "1 Canada Square, London E14 5AB       VAT ID: GB340216113",
            "GBP",
            &[
                "Fees 1                     Transactions                      2,000.00",
                "VAT on fees (20%)                                              -40.00",
                "Total costs and fees                                          -240.00",
                "Need support? Visit the merchant portal",
                "Klarna Bank AB (publ), Sveavägen 46, 111 34 Stockholm • VAT numbers SE556737043101, GB123456789",
            ],
        );

        let record = PayoutParser.parse(&text, "uk.txt");

        assert_eq!(record.our_company_address, "1 Canada Square, London E14 5AB");
        assert_eq!(record.our_tax_id, "GB340216113");
        assert_eq!(record.tax_rate, "20%");
        assert_eq!(record.tax_amount, Some(dec("40.00")));
        assert_eq!(record.total_amount, Some(dec("240.00")));
        assert_eq!(record.currency, "GBP");
        assert_eq!(record.vendor_name, "Klarna Bank AB (publ)");
        assert_eq!(record.vendor_address, "Sveavägen 46, 111 34 Stockholm");
        assert_eq!(record.vendor_tax_id, "GB123456789");
        assert!(record.is_success());
    }

    #[test]
    fn test_ireland() {
        let text = statement(
            "INFINITE STYLES ECOMMERCE CO., LIMITED",
            "Unit 2, Block 3, Dublin 2, IE VAT ID: IE3668997OH",
            "EUR",
            &[
                "Fees 1                     Transactions                        500.00",
                "Total costs and fees                                           -25.00",
                "Need support? Visit the merchant portal",
                "Klarna Bank AB (publ), Sveavägen 46, Stockholm • VAT numbers SE556737043101 • Registration number 556737-",
                "0431       Page 1 of 1",
            ],
        );

        let record = PayoutParser.parse(&text, "ie.txt");

        assert_eq!(record.our_company_address, "Unit 2, Block 3, Dublin 2");
        assert_eq!(record.our_tax_id, "IE3668997OH");
        assert_eq!(record.net_amount, Some(dec("500.00")));
        assert_eq!(record.tax_rate, "0%");
        assert_eq!(record.tax_amount, Some(Decimal::ZERO));
        assert_eq!(record.currency, "EUR");
        assert_eq!(record.vendor_address, "Sveavägen 46, Stockholm");
        assert_eq!(record.vendor_tax_id, "556737-0431");
    }

    #[test]
    fn test_corporation() {
        let text = statement(
            "SHEIN DISTRIBUTION CORPORATION",
            "757 S Alameda St, Los Angeles, CA 90021, US VAT ID: 82-3961498",
            "USD",
            &[
                "Fees                       Transactions                      3,000.00",
                "Total costs and fees                                           -90.00",
                "Need support? Visit the merchant portal",
                "Klarna Inc., 629 N High St, Columbus, OH 43215 • TIN 47-2532123",
            ],
        );

        let record = PayoutParser.parse(&text, "us.txt");

        assert_eq!(record.our_company_address, "757 S Alameda St, Los Angeles, CA 90021");
        assert_eq!(record.our_tax_id, "82-3961498");
        assert_eq!(record.net_amount, Some(dec("3000.00")));
        assert_eq!(record.currency, "USD");
        assert_eq!(record.vendor_name, "Klarna Inc.");
        assert_eq!(record.vendor_address, "629 N High St, Columbus, OH 43215");
        assert_eq!(record.vendor_tax_id, "47-2532123");
    }

    #[test]
    fn test_canada() {
        let text = statement(
            "Shein Distribution Canada Limited",
            "100 King St W, Toronto, ON M5X 1A9 GST/HST/QST number: 789456123RT0001",
            "CAD",
            &[
                "Fees                       Transactions                        800.00",
                "Total costs and fees                                           -24.00",
                "Need support? Visit the merchant portal",
                "Klarna Canada Inc., 1 Yonge St, Toronto, ON • GST/HST/QST",
                "number 709133730 RT0001       Page 1 of 1",
            ],
        );

        let record = PayoutParser.parse(&text, "ca.txt");

        assert_eq!(record.our_company_address, "100 King St W, Toronto, ON M5X 1A9");
        assert_eq!(record.our_tax_id, "789456123RT0001");
        assert_eq!(record.currency, "CAD");
        assert_eq!(record.vendor_address, "1 Yonge St, Toronto, ON");
        assert_eq!(record.vendor_tax_id, "709133730 RT0001");
        assert!(record.is_success());
    }

    #[test]
    fn test_styles_services() {
        let text = statement(
            "INFINITE STYLES SERVICES CO., LIMITED",
            "Unit 5, Block 1, Dublin 2, IE VAT ID: IE4125789WH",
            "EUR",
            &[
                "Fees 1                     Transactions                        750.00",
                "Total costs and fees                                           -30.00",
                "Need support? Visit the merchant portal",
                "Klarna Bank AB (publ), Sveavägen 46, Stockholm • VAT numbers SE556737043101 • Registration number 556737-",
                "0431       Page 1 of 1",
            ],
        );

        let record = PayoutParser.parse(&text, "styles.txt");

        assert_eq!(record.our_company_name, "INFINITE STYLES SERVICES CO., LIMITED");
        assert_eq!(record.our_company_address, "Unit 5, Block 1, Dublin 2");
        assert_eq!(record.our_tax_id, "IE4125789WH");
        assert_eq!(record.net_amount, Some(dec("750.00")));
        assert_eq!(record.tax_rate, "0%");
        assert_eq!(record.total_amount, Some(dec("30.00")));
        assert_eq!(record.currency, "EUR");
        assert_eq!(record.vendor_name, "Klarna Bank AB (publ)");
        assert_eq!(record.vendor_address, "Sveavägen 46, Stockholm");
        assert_eq!(record.vendor_tax_id, "556737-0431");
        assert!(record.is_success());
    }

    #[test]
    fn test_us_services() {
        let text = statement(
            "SHEIN US Services, LLC",
            "777 S Alameda St, Los Angeles, CA 90021, US  VAT ID: 85-1234567",
            "USD",
            &[
                "Fees                       Transactions                      1,500.00",
                "Total costs and fees                                           -45.00",
                "Need support? Visit the merchant portal",
                "Klarna Inc., 629 N High St, Columbus, OH 43215 • TIN 47-2532123",
            ],
        );

        let record = PayoutParser.parse(&text, "us_services.txt");

        assert_eq!(record.our_company_name, "SHEIN US Services, LLC");
        assert_eq!(record.our_company_address, "777 S Alameda St, Los Angeles, CA 90021");
        assert_eq!(record.our_tax_id, "85-1234567");
        assert_eq!(record.net_amount, Some(dec("1500.00")));
        assert_eq!(record.total_amount, Some(dec("45.00")));
        assert_eq!(record.currency, "USD");
        assert_eq!(record.vendor_name, "Klarna Inc.");
        assert_eq!(record.vendor_address, "629 N High St, Columbus, OH 43215");
        assert_eq!(record.vendor_tax_id, "47-2532123");
        assert!(record.is_success());
    }

    #[test]
    fn test_unknown_company() {
        let text = statement("ACME TRADING GMBH", "Somewhere 1", "EUR", &[]);
        let record = PayoutParser.parse(&text, "acme.txt");

        assert_eq!(record.our_company_name, "ACME TRADING GMBH");
        assert_eq!(record.processing_errors, vec!["unsupported company: ACME TRADING GMBH"]);
        assert_eq!(record.invoice_number, "");
        assert_eq!(record.currency, "");
    }

    #[test]
    fn test_unreadable_layout_is_unknown() {
        let record = PayoutParser.parse("too short", "short.txt");
        assert_eq!(record.our_company_name, "UNKNOWN COMPANY");
        assert_eq!(record.processing_errors, vec!["unsupported company: UNKNOWN COMPANY"]);
    }

    #[test]
    fn test_missing_vendor_block() {
        let text = statement(
            "SHEIN DISTRIBUTION UK LIMITED",
            "1 Canada Square, London       VAT ID: GB340216113",
            "GBP",
            &["Fees 1   Transactions   10.00"],
        );
        let record = PayoutParser.parse(&text, "uk.txt");

        assert_eq!(record.net_amount, Some(dec("10.00")));
        assert_eq!(record.processing_errors, vec!["'Need support' line not found"]);
        assert!(!record.is_success());
    }
}
