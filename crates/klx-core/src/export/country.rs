//! Vendor country resolution for the ISO code column.

use tracing::debug;

use crate::models::record::InvoiceRecord;

/// Code used when nothing else matches.
pub const DEFAULT_COUNTRY: &str = "US";

/// Country names and well-known places, checked in order.
const COUNTRIES: &[(&str, &str)] = &[
    ("United Kingdom", "GB"),
    ("UK", "GB"),
    ("England", "GB"),
    ("Scotland", "GB"),
    ("Wales", "GB"),
    ("Northern Ireland", "GB"),
    ("Great Britain", "GB"),
    ("Britain", "GB"),
    ("Sweden", "SE"),
    ("Swedish", "SE"),
    ("Sverige", "SE"),
    ("Stockholm", "SE"),
    ("Gothenburg", "SE"),
    ("Malmo", "SE"),
    ("Germany", "DE"),
    ("France", "FR"),
    ("Italy", "IT"),
    ("Spain", "ES"),
    ("Netherlands", "NL"),
    ("Belgium", "BE"),
    ("Poland", "PL"),
    ("Denmark", "DK"),
    ("Norway", "NO"),
    ("Finland", "FI"),
    ("Austria", "AT"),
    ("Switzerland", "CH"),
    ("Ireland", "IE"),
    ("Portugal", "PT"),
    ("Czech Republic", "CZ"),
    ("Hungary", "HU"),
    ("Romania", "RO"),
    ("Bulgaria", "BG"),
    ("Greece", "GR"),
    ("Croatia", "HR"),
    ("Slovakia", "SK"),
    ("Slovenia", "SI"),
    ("Estonia", "EE"),
    ("Latvia", "LV"),
    ("Lithuania", "LT"),
    ("Luxembourg", "LU"),
    ("Malta", "MT"),
    ("Cyprus", "CY"),
    ("United States", "US"),
    ("USA", "US"),
    ("America", "US"),
    ("Canada", "CA"),
    ("Mexico", "MX"),
    ("China", "CN"),
    ("PRC", "CN"),
    ("People's Republic of China", "CN"),
    ("Japan", "JP"),
    ("South Korea", "KR"),
    ("Korea", "KR"),
    ("Singapore", "SG"),
    ("Hong Kong", "HK"),
    ("Taiwan", "TW"),
    ("India", "IN"),
    ("Indonesia", "ID"),
    ("Thailand", "TH"),
    ("Malaysia", "MY"),
    ("Philippines", "PH"),
    ("Vietnam", "VN"),
    ("Turkey", "TR"),
    ("Israel", "IL"),
    ("UAE", "AE"),
    ("United Arab Emirates", "AE"),
    ("Saudi Arabia", "SA"),
    ("Australia", "AU"),
    ("New Zealand", "NZ"),
    ("Russia", "RU"),
    ("Brazil", "BR"),
    ("Argentina", "AR"),
    ("Chile", "CL"),
    ("South Africa", "ZA"),
    ("Egypt", "EG"),
    ("Nigeria", "NG"),
    ("Kenya", "KE"),
];

/// Keyword guesses tried after the table.
const KEYWORDS: &[(&[&str], &str)] = &[
    (&["uk", "britain", "england", "scotland", "wales"], "GB"),
    (&["china", "chinese"], "CN"),
    (&["america", "usa", "states"], "US"),
    (&["australia", "australian"], "AU"),
    (&["canada", "canadian"], "CA"),
];

/// ISO country code for a record: the vendor address when it names a
/// country other than the US, else the payout currency, else `US`.
pub fn country_iso_code(record: &InvoiceRecord) -> &'static str {
    let address = record.vendor_address.trim();
    if !address.is_empty() {
        let code = country_code_for(address);
        if code != DEFAULT_COUNTRY {
            return code;
        }
    }

    currency_country(&record.currency).unwrap_or(DEFAULT_COUNTRY)
}

/// Map a free-form country name or address to an ISO code.
pub fn country_code_for(name: &str) -> &'static str {
    let name = name.trim();
    if let Some((_, code)) = COUNTRIES.iter().find(|(country, _)| *country == name) {
        return code;
    }

    let cleaned = strip_punctuation(&name.to_lowercase());
    if !cleaned.trim().is_empty() {
        for (country, code) in COUNTRIES {
            let key = strip_punctuation(&country.to_lowercase());
            if cleaned.contains(&key) || key.contains(&cleaned) {
                return code;
            }
        }
    }

    let lower = name.to_lowercase();
    for (words, code) in KEYWORDS {
        if words.iter().any(|w| lower.contains(w)) {
            return code;
        }
    }

    debug!("No country recognised in {:?}, using {}", name, DEFAULT_COUNTRY);
    DEFAULT_COUNTRY
}

/// Country implied by a currency code or symbol.
pub fn currency_country(currency: &str) -> Option<&'static str> {
    let code = match currency.trim().to_uppercase().as_str() {
        "USD" | "$" => "US",
        "EUR" | "€" => "DE",
        "GBP" | "£" => "GB",
        "CNY" | "RMB" => "CN",
        "JPY" | "¥" => "JP",
        "AUD" => "AU",
        "CAD" => "CA",
        "CHF" => "CH",
        "SEK" => "SE",
        "DKK" => "DK",
        "NOK" => "NO",
        "INR" => "IN",
        "KRW" => "KR",
        "SGD" => "SG",
        "HKD" => "HK",
        "MYR" => "MY",
        "THB" => "TH",
        "PHP" => "PH",
        "VND" => "VN",
        "TRY" => "TR",
        "ILS" => "IL",
        "AED" => "AE",
        "SAR" => "SA",
        "NZD" => "NZ",
        "RUB" => "RU",
        "BRL" => "BR",
        "ARS" => "AR",
        "CLP" => "CL",
        "ZAR" => "ZA",
        "EGP" => "EG",
        "NGN" => "NG",
        "KES" => "KE",
        _ => return None,
    };
    Some(code)
}

fn strip_punctuation(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}
