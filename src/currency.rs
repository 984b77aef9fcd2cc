use std::collections::HashMap;

/// Currency code the upstream uses for roubles. All salaries are converted into it.
pub const BASE_CURRENCY: &str = "RUR";

/// Static exchange table: units of a currency per one unit of the base currency.
/// An amount in currency `c` converts to base as `amount / rate(c)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyTable {
    base: String,
    rates: HashMap<String, f64>,
}

/// Outcome of looking up a currency code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRate<'a> {
    pub code: &'a str,
    pub rate: f64,
    /// True when the requested code was unknown and the base rate was used instead.
    pub fallback: bool,
}

impl CurrencyTable {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let mut rates = HashMap::new();
        rates.insert(base.clone(), 1.0);
        Self { base, rates }
    }

    /// Adds or replaces a rate. Non-finite and non-positive rates are ignored.
    pub fn with_rate(mut self, code: impl Into<String>, rate: f64) -> Self {
        let code = code.into();
        if rate.is_finite() && rate > 0.0 {
            self.rates.insert(code, rate);
        } else {
            log::warn!("ignoring unusable exchange rate {rate} for {code}");
        }
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Missing codes mean base currency; unknown codes fall back to the base rate.
    pub fn resolve<'a>(&'a self, code: Option<&'a str>) -> ResolvedRate<'a> {
        let code = code.unwrap_or(self.base.as_str());
        match self.rates.get(code) {
            Some(rate) => ResolvedRate {
                code,
                rate: *rate,
                fallback: false,
            },
            None => ResolvedRate {
                code: &self.base,
                rate: self.rates.get(&self.base).copied().unwrap_or(1.0),
                fallback: true,
            },
        }
    }
}

impl Default for CurrencyTable {
    fn default() -> Self {
        CurrencyTable::new(BASE_CURRENCY)
            .with_rate("USD", 0.01264)
            .with_rate("EUR", 0.01083)
    }
}
