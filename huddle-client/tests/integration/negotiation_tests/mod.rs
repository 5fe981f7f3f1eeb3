pub mod test_early_candidates_buffered;
pub mod test_failure_closes_peer;
