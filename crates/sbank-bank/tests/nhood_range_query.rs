use proptest::prelude::*;
use sbank_bank::{KeyView, Metric, Template};
use sbank_core::NeighborhoodKey;

fn sorted_templates(values: &[f64]) -> Vec<Template> {
    let metric = Metric::identity();
    let mut templates: Vec<Template> = values
        .iter()
        .map(|value| Template::new(*value, 0.0, &metric))
        .collect();
    templates.sort_by(|a, b| a.x1().total_cmp(&b.x1()));
    templates
}

fn brute_force(templates: &[Template], center: f64, half_width: f64) -> Vec<usize> {
    templates
        .iter()
        .enumerate()
        .filter(|(_, t)| t.x1() >= center - half_width && t.x1() <= center + half_width)
        .map(|(index, _)| index)
        .collect()
}

proptest! {
    #[test]
    fn range_query_matches_linear_scan(
        values in prop::collection::vec(-10.0f64..10.0, 0..500),
        center in -12.0f64..12.0,
        half_width in 0.0f64..5.0,
    ) {
        let templates = sorted_templates(&values);
        let view = KeyView::new(&templates, NeighborhoodKey::X1);
        let found: Vec<usize> = view.range_query(center, half_width).collect();
        prop_assert_eq!(found, brute_force(&templates, center, half_width));
    }

    #[test]
    fn bounds_bracket_every_key(
        values in prop::collection::vec(0u8..20, 0..200),
        needle in 0u8..20,
    ) {
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        let templates = sorted_templates(&values);
        let view = KeyView::new(&templates, NeighborhoodKey::X1);
        let needle = f64::from(needle);
        let low = view.lower_bound(needle);
        let high = view.upper_bound(needle);
        prop_assert!(low <= high);
        prop_assert!(view.iter().take(low).all(|key| key < needle));
        prop_assert!(view.iter().skip(low).take(high - low).all(|key| key == needle));
        prop_assert!(view.iter().skip(high).all(|key| key > needle));
    }
}

#[test]
fn empty_view_yields_empty_range() {
    let view = KeyView::new(&[], NeighborhoodKey::Norm);
    assert!(view.is_empty());
    assert!(view.range_query(0.0, 1.0).is_empty());
    assert_eq!(view.insertion_rank(3.0), 0);
}

#[test]
fn insertion_rank_places_ties_first() {
    let templates = sorted_templates(&[0.1, 0.5, 0.5, 0.9]);
    let view = KeyView::new(&templates, NeighborhoodKey::X1);
    assert_eq!(view.insertion_rank(0.5), 1);
    assert_eq!(view.upper_bound(0.5), 3);
    assert_eq!(view.insertion_rank(1.0), 4);
}

#[test]
fn range_query_includes_both_edges() {
    let templates = sorted_templates(&[0.25, 0.5, 0.75]);
    let view = KeyView::new(&templates, NeighborhoodKey::X1);
    assert_eq!(view.range_query(0.5, 0.25), 0..3);
    assert_eq!(view.range_query(0.5, 0.0), 1..2);
}

#[test]
fn views_follow_the_selected_key() {
    let metric = Metric::identity();
    let templates = vec![
        Template::new(0.9, 0.1, &metric),
        Template::new(0.2, 0.4, &metric),
    ];
    let by_x2 = KeyView::new(&templates, NeighborhoodKey::X2);
    assert!(by_x2.check_sorted().is_ok());
    assert_eq!(by_x2.get(1), Some(0.4));

    let by_x1 = KeyView::new(&templates, NeighborhoodKey::X1);
    let err = by_x1.check_sorted().unwrap_err();
    assert_eq!(err.info().code, "unsorted-bank");
    assert_eq!(err.info().context.get("index").map(String::as_str), Some("1"));
}
