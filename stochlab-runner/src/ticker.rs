//! Ticker input parsing and exchange-suffix resolution.
//!
//! Korean listings are entered as bare six-digit codes. A code is tried on
//! KOSPI (`.KS`) first, then KOSDAQ (`.KQ`), then as typed. Everything else
//! resolves to itself.

use serde::{Deserialize, Serialize};

pub const KOSPI_SUFFIX: &str = ".KS";
pub const KOSDAQ_SUFFIX: &str = ".KQ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Krw,
    Usd,
}

impl Currency {
    /// Prices in won are shown without decimals.
    pub fn format_price(self, price: f64) -> String {
        match self {
            Currency::Krw => format!("{price:.0} KRW"),
            Currency::Usd => format!("${price:.2}"),
        }
    }
}

/// Split comma- or newline-separated input into canonical codes.
///
/// Entries are trimmed and upper-cased, empties dropped, exchange suffixes
/// stripped, and repeats removed keeping the first occurrence.
pub fn parse_tickers(input: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in input.split([',', '\n']) {
        let code = canonical_code(raw);
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

/// Trim, upper-case and drop any `.KS` / `.KQ` suffix.
pub fn canonical_code(raw: &str) -> String {
    let mut code = raw.trim().to_ascii_uppercase();
    while let Some(stripped) = code
        .strip_suffix(KOSPI_SUFFIX)
        .or_else(|| code.strip_suffix(KOSDAQ_SUFFIX))
    {
        code = stripped.trim_end().to_string();
    }
    code
}

pub fn is_korean_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

/// Symbols to try, in order, when fetching `code`.
pub fn resolve_candidates(code: &str) -> Vec<String> {
    let code = canonical_code(code);
    if is_korean_code(&code) {
        vec![
            format!("{code}{KOSPI_SUFFIX}"),
            format!("{code}{KOSDAQ_SUFFIX}"),
            code,
        ]
    } else {
        vec![code]
    }
}

const KOREAN_NAMES: [(&str, &str); 31] = [
    ("005930", "Samsung Electronics"),
    ("000660", "SK hynix"),
    ("035720", "Kakao"),
    ("035420", "NAVER"),
    ("005380", "Hyundai Motor"),
    ("000270", "Kia"),
    ("051910", "LG Chem"),
    ("006400", "Samsung SDI"),
    ("207940", "Samsung Biologics"),
    ("068270", "Celltrion"),
    ("028260", "Samsung C&T"),
    ("042700", "Hanmi Semiconductor"),
    ("009150", "Samsung Electro-Mechanics"),
    ("012330", "Hyundai Mobis"),
    ("003550", "LG Corp"),
    ("017670", "SK Telecom"),
    ("033780", "KT&G"),
    ("018260", "Samsung SDS"),
    ("096770", "SK Innovation"),
    ("373220", "LG Energy Solution"),
    ("352820", "HYBE"),
    ("247540", "EcoPro BM"),
    ("086520", "EcoPro"),
    ("066970", "L&F"),
    ("161390", "Hankook Tire"),
    ("326030", "SK Biopharm"),
    ("091990", "Celltrion Healthcare"),
    ("055550", "Shinhan Financial"),
    ("086790", "Hana Financial"),
    ("105560", "KB Financial"),
    ("316140", "Woori Financial"),
];

/// Company name for well-known KRX codes, otherwise the code itself.
pub fn display_name(code: &str) -> String {
    let code = canonical_code(code);
    KOREAN_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or(code)
}

/// Quote currency of a resolved symbol.
pub fn currency_of(symbol: &str) -> Currency {
    let upper = symbol.to_ascii_uppercase();
    if upper.ends_with(KOSPI_SUFFIX) || upper.ends_with(KOSDAQ_SUFFIX) || is_korean_code(&upper) {
        Currency::Krw
    } else {
        Currency::Usd
    }
}
