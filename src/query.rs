//! Search query model and its encoding into request parameters.

use crate::error::ScrapeError;
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Days covered by the default search window, ending today.
pub const DEFAULT_WINDOW_DAYS: i64 = 50;

/// Industry sectors understood by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndustrySector {
    BankingCreditMortgages,
    InvestmentPensions,
    Insurance,
    PaymentProtectionInsurance,
    ClaimsManagementOmbudsmanDecisions,
    FuneralPlans,
}

impl IndustrySector {
    pub const ALL: [IndustrySector; 6] = [
        IndustrySector::BankingCreditMortgages,
        IndustrySector::InvestmentPensions,
        IndustrySector::Insurance,
        IndustrySector::PaymentProtectionInsurance,
        IndustrySector::ClaimsManagementOmbudsmanDecisions,
        IndustrySector::FuneralPlans,
    ];

    /// Numeric id expected by the endpoint.
    pub fn id(self) -> u8 {
        match self {
            IndustrySector::BankingCreditMortgages => 1,
            IndustrySector::InvestmentPensions => 2,
            IndustrySector::Insurance => 3,
            IndustrySector::PaymentProtectionInsurance => 4,
            IndustrySector::ClaimsManagementOmbudsmanDecisions => 5,
            IndustrySector::FuneralPlans => 6,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            IndustrySector::BankingCreditMortgages => "banking-credit-mortgages",
            IndustrySector::InvestmentPensions => "investment-pensions",
            IndustrySector::Insurance => "insurance",
            IndustrySector::PaymentProtectionInsurance => "payment-protection-insurance",
            IndustrySector::ClaimsManagementOmbudsmanDecisions => {
                "claims-management-ombudsman-decisions"
            }
            IndustrySector::FuneralPlans => "funeral-plans",
        }
    }

    /// Parse a comma-separated list of sector slugs. Blank items are ignored.
    pub fn parse_list(s: &str) -> Result<BTreeSet<IndustrySector>, ScrapeError> {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(IndustrySector::from_str)
            .collect()
    }
}

impl fmt::Display for IndustrySector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for IndustrySector {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        IndustrySector::ALL
            .into_iter()
            .find(|sector| sector.slug() == wanted)
            .ok_or_else(|| ScrapeError::UnknownSector(s.to_string()))
    }
}

/// Tri-state filter on the decision outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpheldFilter {
    /// Upheld and not upheld decisions (default).
    #[default]
    Either,
    Upheld,
    NotUpheld,
}

impl From<Option<bool>> for UpheldFilter {
    fn from(v: Option<bool>) -> Self {
        match v {
            None => UpheldFilter::Either,
            Some(true) => UpheldFilter::Upheld,
            Some(false) => UpheldFilter::NotUpheld,
        }
    }
}

/// A decisions search, fixed for the duration of one harvest run.
///
/// # Example
/// ```rust
/// use ombudsman_decisions::{IndustrySector, SearchQuery, UpheldFilter};
///
/// let query = SearchQuery::builder()
///     .keyword("subsidence")
///     .upheld(UpheldFilter::Upheld)
///     .sector(IndustrySector::Insurance)
///     .build()
///     .unwrap();
/// assert_eq!(query.sectors.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub upheld: UpheldFilter,
    pub sectors: BTreeSet<IndustrySector>,
}

impl SearchQuery {
    pub fn builder() -> SearchQueryBuilder {
        SearchQueryBuilder::default()
    }

    /// Request parameters for the page starting at `start`.
    ///
    /// Order: sort, offset, sectors by ascending id, upheld flags, dates,
    /// keyword.
    pub fn to_params(&self, start: usize) -> Vec<(String, String)> {
        let mut params = vec![
            ("Sort".to_string(), "date".to_string()),
            ("Start".to_string(), start.to_string()),
        ];

        let mut ids: Vec<u8> = self.sectors.iter().map(|s| s.id()).collect();
        ids.sort_unstable();
        for id in ids {
            params.push((format!("IndustrySectorID[{id}]"), id.to_string()));
        }

        match self.upheld {
            UpheldFilter::Either => {
                params.push(("IsUpheld[0]".to_string(), "0".to_string()));
                params.push(("IsUpheld[1]".to_string(), "1".to_string()));
            }
            UpheldFilter::Upheld => {
                params.push(("IsUpheld[1]".to_string(), "1".to_string()));
            }
            UpheldFilter::NotUpheld => {
                params.push(("IsUpheld[0]".to_string(), "0".to_string()));
            }
        }

        params.push(("DateFrom".to_string(), self.date_from.format("%Y-%m-%d").to_string()));
        params.push(("DateTo".to_string(), self.date_to.format("%Y-%m-%d").to_string()));

        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            params.push(("Keywords".to_string(), keyword.to_string()));
        }

        params
    }
}

/// Builder for [`SearchQuery`]. Unset fields take the defaults: the last
/// fifty days through today, either outcome, every sector.
#[derive(Debug, Default)]
pub struct SearchQueryBuilder {
    keyword: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    upheld: UpheldFilter,
    sectors: BTreeSet<IndustrySector>,
}

impl SearchQueryBuilder {
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn upheld(mut self, filter: UpheldFilter) -> Self {
        self.upheld = filter;
        self
    }

    pub fn sector(mut self, sector: IndustrySector) -> Self {
        self.sectors.insert(sector);
        self
    }

    pub fn sectors(mut self, sectors: impl IntoIterator<Item = IndustrySector>) -> Self {
        self.sectors.extend(sectors);
        self
    }

    pub fn build(self) -> Result<SearchQuery, ScrapeError> {
        self.build_on(Local::now().date_naive())
    }

    /// Build with `today` as the reference date for the default window.
    pub fn build_on(self, today: NaiveDate) -> Result<SearchQuery, ScrapeError> {
        let date_to = self.date_to.unwrap_or(today);
        let date_from = self
            .date_from
            .unwrap_or(today - Duration::days(DEFAULT_WINDOW_DAYS));

        if date_from > date_to {
            return Err(ScrapeError::InvalidConfig(format!(
                "Start date {date_from} is after end date {date_to}"
            )));
        }

        let sectors = if self.sectors.is_empty() {
            IndustrySector::ALL.into_iter().collect()
        } else {
            self.sectors
        };

        Ok(SearchQuery {
            keyword: self.keyword.filter(|k| !k.trim().is_empty()),
            date_from,
            date_to,
            upheld: self.upheld,
            sectors,
        })
    }
}
