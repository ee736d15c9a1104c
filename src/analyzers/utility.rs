/// Arithmetic mean of integer scores using truncating division.
/// Returns 0 for empty input.
pub fn truncated_mean(values: &[i32]) -> i32 {
    if values.is_empty() {
        return 0;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    (sum / values.len() as i64) as i32
}
