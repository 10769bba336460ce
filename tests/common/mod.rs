use std::f32::consts::PI;

/// Mono sine with a per-sample amplitude function.
pub fn gen_sine<F>(freq_hz: f32, sr: u32, n: usize, amp_fn: F) -> Vec<f32>
where
    F: Fn(usize) -> f32,
{
    (0..n)
        .map(|i| {
            let phase = 2.0 * PI * freq_hz * i as f32 / sr as f32;
            amp_fn(i) * phase.sin()
        })
        .collect()
}

/// Phase-continuous tone sequence: one `(freq_hz, secs)` pair per note.
pub fn gen_melody_line(notes: &[(f32, f32)], sr: u32, amp: f32) -> Vec<f32> {
    let mut out = Vec::new();
    let mut phase = 0.0f32;
    for &(freq_hz, secs) in notes {
        let n = (secs * sr as f32).round() as usize;
        let step = 2.0 * PI * freq_hz / sr as f32;
        for _ in 0..n {
            out.push(amp * phase.sin());
            phase += step;
            if phase > 2.0 * PI {
                phase -= 2.0 * PI;
            }
        }
    }
    out
}

/// RMS over `signal[start..start + len]`, clamped to the signal bounds.
pub fn windowed_rms(signal: &[f32], start: usize, len: usize) -> f64 {
    if signal.is_empty() || len == 0 {
        return 0.0;
    }
    let start = start.min(signal.len());
    let end = (start + len).min(signal.len());
    if end <= start {
        return 0.0;
    }
    let sum_sq: f64 = signal[start..end]
        .iter()
        .map(|&s| {
            let v = s as f64;
            v * v
        })
        .sum();
    (sum_sq / (end - start) as f64).sqrt()
}

/// Largest absolute sample value.
pub fn peak_abs(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
}
