use ndarray::{Array2, Axis};

/// The logistic function, `1 / (1 + e^-z)`.
pub fn sigmoid(z: f32) -> f32 {
    1. / (1. + (-z).exp())
}

/// The derivative of the logistic function given its *output* `a = sigmoid(z)`.
pub fn sigmoid_df(a: f32) -> f32 {
    a * (1. - a)
}

/// Applies a numerically stable softmax to every row of `z` in place.
///
/// # Arguments
/// * `z` - The pre-activations, one example per row.
///
/// # Returns
/// The row-wise class probabilities.
pub fn softmax(mut z: Array2<f32>) -> Array2<f32> {
    for mut row in z.axis_iter_mut(Axis(0)) {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }

    z
}

/// Returns the index of the greatest value of every row, ties resolved to the lowest index.
pub fn argmax_rows(p: &Array2<f32>) -> Vec<usize> {
    p.axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |(best, max), (i, &v)| {
                    if v > max {
                        (i, v)
                    } else {
                        (best, max)
                    }
                })
                .0
        })
        .collect()
}
