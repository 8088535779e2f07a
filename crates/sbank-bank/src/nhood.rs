use std::cmp::Ordering;
use std::ops::Range;

use sbank_core::errors::{ErrorInfo, SbankError};
use sbank_core::NeighborhoodKey;

use crate::template::Template;

/// Read-only projection of a sorted template slice through a neighbourhood key.
///
/// Keys are read on demand from the backing slice; no key list is ever
/// materialised. All searches assume the slice is sorted ascending by `key`.
#[derive(Debug, Clone, Copy)]
pub struct KeyView<'a> {
    templates: &'a [Template],
    key: NeighborhoodKey,
}

impl<'a> KeyView<'a> {
    /// Wraps a template slice sorted by `key`.
    pub fn new(templates: &'a [Template], key: NeighborhoodKey) -> Self {
        Self { templates, key }
    }

    /// Number of keys in the view.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` when the view is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Key of the template at `index`.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.templates.get(index).map(|t| t.key(self.key))
    }

    /// Iterates over the keys in bank order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + 'a {
        let key = self.key;
        self.templates.iter().map(move |t| t.key(key))
    }

    /// Leftmost index at which `value` could be inserted keeping the order.
    pub fn lower_bound(&self, value: f64) -> usize {
        self.partition(|key| key < value)
    }

    /// Rightmost index at which `value` could be inserted keeping the order.
    pub fn upper_bound(&self, value: f64) -> usize {
        self.partition(|key| key <= value)
    }

    /// Index range of all keys inside `[center - half_width, center + half_width]`.
    pub fn range_query(&self, center: f64, half_width: f64) -> Range<usize> {
        let low = self.lower_bound(center - half_width);
        let high = self.upper_bound(center + half_width);
        low..high.max(low)
    }

    /// Position at which a template with `key` is spliced in; ties go first.
    pub fn insertion_rank(&self, key: f64) -> usize {
        self.lower_bound(key)
    }

    /// Verifies the view is non-decreasing.
    pub fn check_sorted(&self) -> Result<(), SbankError> {
        for (index, pair) in self.templates.windows(2).enumerate() {
            let (left, right) = (pair[0].key(self.key), pair[1].key(self.key));
            if !matches!(left.partial_cmp(&right), Some(Ordering::Less | Ordering::Equal)) {
                return Err(SbankError::Invariant(
                    ErrorInfo::new("unsorted-bank", "bank is not sorted by its neighbourhood key")
                        .with_context("nhood_param", self.key.as_str())
                        .with_context("index", (index + 1).to_string())
                        .with_context("previous", left.to_string())
                        .with_context("value", right.to_string()),
                ));
            }
        }
        Ok(())
    }

    // First index whose key fails `pred`; `pred` must hold on a prefix.
    fn partition(&self, pred: impl Fn(f64) -> bool) -> usize {
        let (mut low, mut high) = (0, self.templates.len());
        while low < high {
            let mid = low + (high - low) / 2;
            if pred(self.templates[mid].key(self.key)) {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low
    }
}
