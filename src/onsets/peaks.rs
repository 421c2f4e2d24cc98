// Peak detection
// Local maxima of the energy signal above a height threshold with minimum separation

use serde::{Deserialize, Serialize};

/// Configuration for peak picking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Minimum distance in samples between two reported peaks
    pub min_separation: usize,

    /// Minimum peak value
    /// None uses the mean of the energy sequence
    pub height: Option<f64>,
}

impl Default for PeakConfig {
    fn default() -> Self {
        PeakConfig {
            min_separation: 100,
            height: None,
        }
    }
}

/// Find peaks in an energy sequence
///
/// Algorithm:
/// 1. Collect local maxima (first and last samples never qualify; a flat
///    plateau yields its middle sample)
/// 2. Drop maxima below the height threshold
/// 3. Visit the remaining maxima from highest to lowest and suppress every
///    weaker neighbour closer than `min_separation`
///
/// Returned indices are ascending. Identical input gives identical output.
pub fn find_peaks(energy: &[f64], config: &PeakConfig) -> Vec<usize> {
    if energy.is_empty() {
        return Vec::new();
    }

    let height = config.height.unwrap_or_else(|| mean(energy));

    let candidates: Vec<usize> = local_maxima(energy)
        .into_iter()
        .filter(|&p| energy[p] >= height)
        .collect();

    select_by_distance(&candidates, energy, config.min_separation)
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if x.len() < 3 {
        return maxima;
    }

    let last = x.len() - 1;
    let mut i = 1;

    while i < last {
        if x[i - 1] < x[i] {
            // Walk across a plateau of equal values
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }

            if x[ahead] < x[i] {
                let right = ahead - 1;
                maxima.push((i + right) / 2);
                i = ahead;
            }
        }
        i += 1;
    }

    maxima
}

fn select_by_distance(peaks: &[usize], energy: &[f64], min_separation: usize) -> Vec<usize> {
    if min_separation <= 1 || peaks.len() < 2 {
        return peaks.to_vec();
    }

    let mut keep = vec![true; peaks.len()];

    // Stable ascending sort, visited in reverse: ties go to the later peak
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| energy[peaks[a]].total_cmp(&energy[peaks[b]]));

    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < min_separation {
            keep[k - 1] = false;
            k -= 1;
        }

        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < min_separation {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}
