use rand::RngCore;
use sbank_core::rng::RngHandle;

#[test]
fn rng_emits_reproducible_sequence() {
    let mut rng_a = RngHandle::from_seed(1234);
    let mut rng_b = RngHandle::from_seed(1234);

    let seq_a: Vec<u64> = (0..100).map(|_| rng_a.next_u64()).collect();
    let seq_b: Vec<u64> = (0..100).map(|_| rng_b.next_u64()).collect();

    assert_eq!(seq_a, seq_b);
    assert_eq!(rng_a.seed(), 1234);
}

#[test]
fn distinct_seeds_diverge() {
    let mut rng_a = RngHandle::from_seed(1);
    let mut rng_b = RngHandle::from_seed(2);
    let seq_a: Vec<u64> = (0..8).map(|_| rng_a.next_u64()).collect();
    let seq_b: Vec<u64> = (0..8).map(|_| rng_b.next_u64()).collect();
    assert_ne!(seq_a, seq_b);
}
