use super::types::{Histogram, Table};

pub const DEFAULT_MAX_BINS: usize = 20;

/// Histogram bins for a numeric series: min(max_bins, ceil(sqrt(N))) bins of
/// equal width, with values at the exact maximum clamped into the last bin.
/// Degenerate inputs (empty, zero spread) yield a well-formed result instead
/// of failing.
pub fn histogram_bins(values: &[f64], max_bins: usize) -> Histogram {
    let clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if clean.is_empty() || max_bins == 0 {
        return Histogram::default();
    }

    let min = clean.iter().copied().fold(f64::INFINITY, f64::min);
    let max = clean.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let bin_count = max_bins.min((clean.len() as f64).sqrt().ceil() as usize).max(1);
    if max == min {
        return Histogram {
            labels: vec![format!("{:.2}-{:.2}", min, max)],
            counts: vec![clean.len()],
        };
    }

    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    for v in &clean {
        let mut idx = ((v - min) / width) as usize;
        if idx >= bin_count {
            idx = bin_count - 1;
        }
        counts[idx] += 1;
    }

    let labels = (0..bin_count)
        .map(|i| {
            let start = min + width * i as f64;
            format!("{:.2}-{:.2}", start, start + width)
        })
        .collect();

    Histogram { labels, counts }
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    if xs.len() < 2 {
        return 0.0;
    }
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    // A zero-variance partner has no defined correlation; report 0 instead of
    // dividing by zero.
    if var_x == 0.0 || var_y == 0.0 {
        0.0
    } else {
        cov / (var_x.sqrt() * var_y.sqrt())
    }
}

/// Pairwise Pearson correlation over the named numeric columns. Each pair is
/// computed over the rows where both cells parse as numbers; the diagonal is
/// exactly 1.
pub fn correlation_matrix(table: &Table, numeric_columns: &[String]) -> Vec<Vec<f64>> {
    let series: Vec<Vec<Option<f64>>> = numeric_columns
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .map(|idx| {
                    table
                        .rows
                        .iter()
                        .map(|row| row.get(idx).and_then(|c| c.as_number()))
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();

    let n = numeric_columns.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                matrix[i][j] = 1.0;
                continue;
            }
            if j < i {
                matrix[i][j] = matrix[j][i];
                continue;
            }
            let (xs, ys): (Vec<f64>, Vec<f64>) = series[i]
                .iter()
                .zip(&series[j])
                .filter_map(|(a, b)| a.zip(*b))
                .unzip();
            matrix[i][j] = pearson(&xs, &ys);
        }
    }
    matrix
}
