use anyhow::ensure;

/// Trailing-window simple moving average over an ordered sequence.
///
/// A circular buffer of the last `window` values and a running sum make this
/// O(1) per element; values are emitted once the buffer is full, so the
/// output holds `n - window + 1` means (empty when `window > n`).
pub fn moving_average(values: &[f64], window: usize) -> anyhow::Result<Vec<f64>> {
    ensure!(window >= 1, "moving-average window must be at least 1, got {window}");

    if values.len() < window {
        return Ok(Vec::new());
    }

    let mut ring = vec![0.0; window];
    let mut sum = 0.0;
    let mut idx = 0;
    let mut out = Vec::with_capacity(values.len() - window + 1);

    for (i, &v) in values.iter().enumerate() {
        sum -= ring[idx];
        ring[idx] = v;
        sum += v;
        idx = (idx + 1) % window;
        if i + 1 >= window {
            out.push(sum / window as f64);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_of_two() {
        let out = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
        assert_eq!(out, vec![1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn window_of_one_is_identity() {
        let out = moving_average(&[3.0, 1.0, 4.0], 1).unwrap();
        assert_eq!(out, vec![3.0, 1.0, 4.0]);
    }

    #[test]
    fn window_longer_than_input_is_empty() {
        assert!(moving_average(&[1.0, 2.0], 3).unwrap().is_empty());
        assert!(moving_average(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(moving_average(&[1.0], 0).is_err());
    }

    #[test]
    fn full_window_yields_single_mean() {
        let out = moving_average(&[2.0, 4.0, 6.0], 3).unwrap();
        assert_eq!(out, vec![4.0]);
    }
}
