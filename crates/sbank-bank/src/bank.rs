use sbank_core::errors::{ErrorInfo, SbankError};
use sbank_core::NeighborhoodKey;

use crate::metric::Metric;
use crate::nhood::KeyView;
use crate::template::Template;

/// Answer to a coverage query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    /// Smallest distance found, or the first distance below the threshold.
    /// `+inf` when no candidate was inspected.
    pub min_distance: f64,
    /// Template that produced `min_distance`.
    pub witness: Option<Template>,
}

impl Coverage {
    /// Result for a proposal with no candidate in its neighbourhood.
    pub fn uncovered() -> Self {
        Self {
            min_distance: f64::INFINITY,
            witness: None,
        }
    }

    /// Whether the proposal is already represented within `max_distance`.
    pub fn is_covered(&self, max_distance: f64) -> bool {
        self.min_distance <= max_distance
    }
}

/// Growing template collection kept sorted by its neighbourhood key.
#[derive(Debug, Clone)]
pub struct Bank {
    nhood_size: f64,
    nhood_key: NeighborhoodKey,
    metric: Metric,
    templates: Vec<Template>,
    distance_evaluations: u64,
}

impl Bank {
    /// Creates an empty bank.
    pub fn new(
        nhood_size: f64,
        nhood_key: NeighborhoodKey,
        metric: Metric,
    ) -> Result<Self, SbankError> {
        check_nhood_size(nhood_size)?;
        Ok(Self {
            nhood_size,
            nhood_key,
            metric,
            templates: Vec::new(),
            distance_evaluations: 0,
        })
    }

    /// Creates a bank pre-populated with seed coordinates.
    pub fn from_coordinates(
        coordinates: &[[f64; 2]],
        nhood_size: f64,
        nhood_key: NeighborhoodKey,
        metric: Metric,
    ) -> Result<Self, SbankError> {
        let mut bank = Self::new(nhood_size, nhood_key, metric)?;
        bank.seed_bulk(coordinates)?;
        Ok(bank)
    }

    /// Half-width of the neighbourhood window.
    pub fn nhood_size(&self) -> f64 {
        self.nhood_size
    }

    /// Key the bank is sorted by.
    pub fn nhood_key(&self) -> NeighborhoodKey {
        self.nhood_key
    }

    /// Metric used for every distance evaluation.
    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` when the bank holds no template.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates in bank order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Iterates over templates in bank order.
    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }

    /// Zero-copy view of the neighbourhood keys.
    pub fn keys(&self) -> KeyView<'_> {
        KeyView::new(&self.templates, self.nhood_key)
    }

    /// Total number of distance evaluations performed by [`Bank::covers`].
    pub fn distance_evaluations(&self) -> u64 {
        self.distance_evaluations
    }

    /// Number of templates loaded through [`Bank::seed_bulk`].
    pub fn seed_count(&self) -> usize {
        self.templates.iter().filter(|t| t.is_seed_point()).count()
    }

    /// Builds a template for `(x1, x2)` under the bank metric.
    pub fn template(&self, x1: f64, x2: f64) -> Template {
        Template::new(x1, x2, &self.metric)
    }

    /// Decides whether `proposal` is already represented by the bank.
    ///
    /// Candidates come from the key window `[key - h, key + h]` and are
    /// visited closest key first. The scan stops at the first distance
    /// strictly below `max_distance`, so for a covered proposal the returned
    /// distance is that first hit rather than the window minimum.
    pub fn covers(&mut self, proposal: &Template, max_distance: f64) -> Coverage {
        let center = proposal.key(self.nhood_key);
        let window = self.keys().range_query(center, self.nhood_size);
        if window.is_empty() {
            return Coverage::uncovered();
        }

        let mut candidates: Vec<(f64, usize)> = window
            .map(|index| {
                let offset = (self.templates[index].key(self.nhood_key) - center).abs();
                (offset, index)
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut coverage = Coverage::uncovered();
        for (_, index) in candidates {
            let candidate = &self.templates[index];
            self.distance_evaluations += 1;
            let distance = self.metric.distance(candidate, proposal);
            if distance < coverage.min_distance {
                coverage = Coverage {
                    min_distance: distance,
                    witness: Some(*candidate),
                };
            }
            if distance < max_distance {
                break;
            }
        }
        coverage
    }

    /// Splices `template` in at its insertion rank and returns that rank.
    pub fn insert(&mut self, template: Template) -> usize {
        let rank = self.keys().insertion_rank(template.key(self.nhood_key));
        self.templates.insert(rank, template);
        rank
    }

    /// Loads seed coordinates, flags them as seed points and re-sorts once.
    pub fn seed_bulk(&mut self, coordinates: &[[f64; 2]]) -> Result<usize, SbankError> {
        if let Some((index, point)) = coordinates
            .iter()
            .enumerate()
            .find(|(_, point)| !(point[0].is_finite() && point[1].is_finite()))
        {
            return Err(SbankError::Config(
                ErrorInfo::new("seed-non-finite", "seed coordinates must be finite")
                    .with_context("index", index.to_string())
                    .with_context("point", format!("{point:?}")),
            ));
        }
        let metric = self.metric;
        self.templates.extend(
            coordinates
                .iter()
                .map(|[x1, x2]| Template::seed(*x1, *x2, &metric)),
        );
        let key = self.nhood_key;
        self.templates
            .sort_by(|a, b| a.key(key).total_cmp(&b.key(key)));
        Ok(coordinates.len())
    }

    /// Confirms the bank is still sorted by its key.
    pub fn check_invariants(&self) -> Result<(), SbankError> {
        self.keys().check_sorted()
    }

    /// Final template coordinates in bank order.
    pub fn coordinates(&self) -> Vec<[f64; 2]> {
        self.templates.iter().map(Template::params).collect()
    }
}

pub(crate) fn check_nhood_size(nhood_size: f64) -> Result<(), SbankError> {
    if nhood_size.is_finite() && nhood_size > 0.0 {
        return Ok(());
    }
    Err(SbankError::Config(
        ErrorInfo::new("nhood-size", "neighbourhood size must be positive and finite")
            .with_context("nhood_size", nhood_size.to_string()),
    ))
}

impl<'a> IntoIterator for &'a Bank {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.templates.iter()
    }
}
