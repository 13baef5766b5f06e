//! Progressive income-tax bracket schedules

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// One bracket of a progressive schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Upper cumulative-income threshold (inclusive). `None` = unbounded.
    pub upper_limit: Option<f64>,
    /// Marginal rate as a decimal (0.15 = 15%)
    pub rate: f64,
}

impl TaxBracket {
    pub const fn bounded(upper_limit: f64, rate: f64) -> Self {
        Self { upper_limit: Some(upper_limit), rate }
    }

    pub const fn unbounded(rate: f64) -> Self {
        Self { upper_limit: None, rate }
    }

    /// Whether a cumulative income falls at or below this bracket's threshold
    fn covers(&self, cumulative_income: f64) -> bool {
        match self.upper_limit {
            Some(limit) => cumulative_income <= limit,
            None => true,
        }
    }
}

/// Ordered bracket table partitioning [0, ∞)
///
/// Finite thresholds are strictly increasing, rates are non-decreasing and
/// only the last bracket is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSchedule {
    brackets: Vec<TaxBracket>,
}

impl TaxSchedule {
    /// Build a schedule, checking the partition invariants
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, LoadError> {
        let Some(last) = brackets.last() else {
            return Err(LoadError::InvalidSchedule("schedule has no brackets".into()));
        };
        if last.upper_limit.is_some() {
            return Err(LoadError::InvalidSchedule(
                "last bracket must be unbounded".into(),
            ));
        }

        let mut prev_limit = 0.0_f64;
        let mut prev_rate = 0.0_f64;
        for (i, bracket) in brackets.iter().enumerate() {
            if bracket.rate < prev_rate {
                return Err(LoadError::InvalidSchedule(format!(
                    "bracket {} rate {} is lower than the previous rate {}",
                    i + 1,
                    bracket.rate,
                    prev_rate
                )));
            }
            prev_rate = bracket.rate;

            if i + 1 == brackets.len() {
                break;
            }
            match bracket.upper_limit {
                Some(limit) if limit > prev_limit || (i == 0 && limit >= 0.0) => prev_limit = limit,
                Some(limit) => {
                    return Err(LoadError::InvalidSchedule(format!(
                        "bracket {} threshold {} does not increase",
                        i + 1,
                        limit
                    )))
                }
                None => {
                    return Err(LoadError::InvalidSchedule(format!(
                        "bracket {} is unbounded but is not the last bracket",
                        i + 1
                    )))
                }
            }
        }

        Ok(Self { brackets })
    }

    /// 2025 income-tax schedule (wage income)
    pub fn income_tax_2025() -> Self {
        Self {
            brackets: vec![
                TaxBracket::bounded(158_000.0, 0.15),
                TaxBracket::bounded(330_000.0, 0.20),
                TaxBracket::bounded(1_200_000.0, 0.27),
                TaxBracket::bounded(4_300_000.0, 0.35),
                TaxBracket::unbounded(0.40),
            ],
        }
    }

    /// 2023 income-tax schedule, used by the single-year calculator
    pub fn income_tax_2023() -> Self {
        Self {
            brackets: vec![
                TaxBracket::bounded(70_000.0, 0.15),
                TaxBracket::bounded(150_000.0, 0.20),
                TaxBracket::bounded(550_000.0, 0.27),
                TaxBracket::bounded(1_900_000.0, 0.35),
                TaxBracket::unbounded(0.40),
            ],
        }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Highest marginal rate in the schedule
    pub fn top_rate(&self) -> f64 {
        self.brackets.last().map(|b| b.rate).unwrap_or(0.0)
    }

    /// Marginal rate for a cumulative annual income
    pub fn resolve_rate(&self, cumulative_income: f64) -> f64 {
        resolve_rate(cumulative_income, &self.brackets)
    }

    /// Copy of the schedule with every finite threshold multiplied by `factor`.
    /// The unbounded top bracket stays unbounded.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            brackets: self
                .brackets
                .iter()
                .map(|b| TaxBracket {
                    upper_limit: b.upper_limit.map(|limit| limit * factor),
                    rate: b.rate,
                })
                .collect(),
        }
    }
}

impl Default for TaxSchedule {
    fn default() -> Self {
        Self::income_tax_2025()
    }
}

/// Rate of the first bracket whose threshold is at or above `cumulative_income`,
/// or the last bracket's rate when every finite threshold is exceeded.
pub fn resolve_rate(cumulative_income: f64, brackets: &[TaxBracket]) -> f64 {
    brackets
        .iter()
        .find(|b| b.covers(cumulative_income))
        .or_else(|| brackets.last())
        .map(|b| b.rate)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resolve_rate_thresholds_are_inclusive() {
        let schedule = TaxSchedule::income_tax_2025();

        assert_eq!(schedule.resolve_rate(0.0), 0.15);
        assert_eq!(schedule.resolve_rate(100_000.0), 0.15);
        assert_eq!(schedule.resolve_rate(158_000.0), 0.15);
        assert_eq!(schedule.resolve_rate(158_000.01), 0.20);
        assert_eq!(schedule.resolve_rate(1_200_000.0), 0.27);
        assert_eq!(schedule.resolve_rate(4_300_001.0), 0.40);
        assert_eq!(schedule.resolve_rate(1e12), 0.40);
    }

    #[test]
    fn test_resolve_rate_falls_back_to_last_bracket() {
        // A table without an unbounded top bracket still resolves
        let brackets = [TaxBracket::bounded(10.0, 0.1), TaxBracket::bounded(20.0, 0.2)];
        assert_eq!(resolve_rate(25.0, &brackets), 0.2);
        assert_eq!(resolve_rate(5.0, &[]), 0.0);
    }

    #[test]
    fn test_rate_is_monotone_in_income() {
        let schedule = TaxSchedule::income_tax_2025();
        let mut prev = schedule.resolve_rate(0.0);
        let mut income = 0.0;
        while income < 6_000_000.0 {
            income += 12_345.0;
            let rate = schedule.resolve_rate(income);
            assert!(rate >= prev, "rate fell from {} to {} at {}", prev, rate, income);
            prev = rate;
        }
    }

    #[test]
    fn test_scaled_leaves_canonical_and_unbounded_alone() {
        let canonical = TaxSchedule::income_tax_2025();
        let scaled = canonical.scaled(1.15);

        assert_eq!(canonical, TaxSchedule::income_tax_2025());
        for (orig, grown) in canonical.brackets().iter().zip(scaled.brackets()) {
            match (orig.upper_limit, grown.upper_limit) {
                (Some(a), Some(b)) => assert_relative_eq!(b, a * 1.15),
                (None, None) => {}
                other => panic!("bracket boundedness changed: {:?}", other),
            }
            assert_eq!(orig.rate, grown.rate);
        }
        assert_relative_eq!(scaled.brackets()[0].upper_limit.unwrap(), 181_700.0, epsilon = 1e-6);
    }

    #[test]
    fn test_new_rejects_broken_tables() {
        assert!(TaxSchedule::new(vec![]).is_err());
        assert!(TaxSchedule::new(vec![TaxBracket::bounded(10.0, 0.1)]).is_err());
        assert!(TaxSchedule::new(vec![
            TaxBracket::bounded(20.0, 0.1),
            TaxBracket::bounded(10.0, 0.2),
            TaxBracket::unbounded(0.3),
        ])
        .is_err());
        assert!(TaxSchedule::new(vec![
            TaxBracket::bounded(10.0, 0.3),
            TaxBracket::unbounded(0.2),
        ])
        .is_err());
        assert!(TaxSchedule::new(vec![
            TaxBracket::unbounded(0.1),
            TaxBracket::unbounded(0.2),
        ])
        .is_err());

        let built = TaxSchedule::new(TaxSchedule::income_tax_2023().brackets().to_vec()).unwrap();
        assert_eq!(built, TaxSchedule::income_tax_2023());
    }
}
