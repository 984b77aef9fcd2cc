use crate::currency::CurrencyTable;
use crate::data_models::RawSalary;

/// Share of a gross salary that reaches the employee after income tax.
pub const GROSS_TO_NET: f64 = 0.87;

/// Salary bounds in base currency, net of tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalaryRange {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

/// Converts raw upstream salaries into net base-currency integers.
#[derive(Debug, Clone, Default)]
pub struct SalaryNormalizer {
    table: CurrencyTable,
}

impl SalaryNormalizer {
    pub fn new(table: CurrencyTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CurrencyTable {
        &self.table
    }

    /// Absent salaries stay absent and so do absent bounds; nothing is defaulted to zero.
    pub fn normalize(&self, raw: Option<&RawSalary>) -> SalaryRange {
        let Some(raw) = raw else {
            return SalaryRange::default();
        };

        let resolved = self.table.resolve(raw.currency.as_deref());
        if resolved.fallback {
            log::warn!(
                "unsupported currency {:?}, converting as {}",
                raw.currency.as_deref().unwrap_or_default(),
                resolved.code
            );
        }

        let factor = if raw.gross.unwrap_or(false) {
            GROSS_TO_NET
        } else {
            1.0
        };
        let convert = |amount: f64| -> u64 {
            // `as` truncates toward zero and maps NaN to 0
            (factor * amount / resolved.rate).max(0.0) as u64
        };

        SalaryRange {
            from: raw.from.map(convert),
            to: raw.to.map(convert),
        }
    }
}
