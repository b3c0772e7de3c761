//! Reference data joined onto scorer output for display.

use chrono::NaiveDate;

/// Company/listing details for one symbol. Never used in scoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolProfile {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub exchange: Option<String>,
    pub market_cap: Option<i64>,
    pub quote_type: Option<String>,
    pub delisted_date: Option<NaiveDate>,
}

impl SymbolProfile {
    /// A profile carrying only the symbol, for stores without reference data.
    pub fn bare(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }
}
