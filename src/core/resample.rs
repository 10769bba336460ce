//! Linear-interpolation resampling used by the resynthesis tail.

/// Resamples a mono signal to an exact output length by linear interpolation.
///
/// Source positions advance by `input.len() / output_len` per output sample;
/// reads past the final source sample clamp to it.
pub fn resample_linear(input: &[f32], output_len: usize) -> Vec<f32> {
    if input.is_empty() || output_len == 0 {
        return vec![];
    }
    let ratio = input.len() as f64 / output_len as f64;
    let last = input.len() - 1;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let pos = i as f64 * ratio;
        let idx = (pos as usize).min(last);
        let next = (idx + 1).min(last);
        let frac = (pos - idx as f64) as f32;
        output.push(input[idx] * (1.0 - frac) + input[next] * frac);
    }

    output
}
