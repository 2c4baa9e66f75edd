/// Mean of `-log_prob * weight`: the REINFORCE surrogate whose gradient is the
/// policy gradient when `weights` are returns.
pub fn policy_gradient_loss(log_probs: &[f32], weights: &[f32]) -> f32 {
    let n = log_probs.len();
    if n == 0 {
        return 0.0;
    }
    let sum: f32 = log_probs
        .iter()
        .zip(weights)
        .map(|(&l, &w)| -l * w)
        .sum();
    sum / n as f32
}
