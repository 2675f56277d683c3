//! Picking the total among candidate amounts.
//!
//! A receipt usually repeats its total (subtotal equals total, the summary
//! line repeats the charge). So the most frequent figure wins, and among
//! equally frequent figures the largest wins, since a grand total dominates
//! the partial charges around it.

use std::collections::HashMap;

use crate::error::NoCandidateError;

/// Select the most frequent amount, breaking ties by magnitude.
///
/// # Example
///
/// ```
/// use mailtally_core::find_highest_count;
///
/// assert_eq!(find_highest_count(&[4500, 4500, 1250]).unwrap(), 4500);
/// assert_eq!(find_highest_count(&[100, 200]).unwrap(), 200);
/// assert!(find_highest_count(&[]).is_err());
/// ```
pub fn find_highest_count(amounts: &[i64]) -> Result<i64, NoCandidateError> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &amount in amounts {
        *counts.entry(amount).or_default() += 1;
    }

    let mut best: Option<(usize, i64)> = None;
    for (value, count) in counts {
        let better = match best {
            None => true,
            Some((best_count, best_value)) => {
                count > best_count || (count == best_count && value > best_value)
            }
        };
        if better {
            best = Some((count, value));
        }
    }

    best.map(|(_, value)| value).ok_or(NoCandidateError)
}

/// Occurrence count of each distinct amount, most frequent first.
///
/// Ties are ordered by descending value, so the first entry is always the
/// one [`find_highest_count`] picks.
#[must_use]
pub fn tally(amounts: &[i64]) -> Vec<(i64, usize)> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &amount in amounts {
        *counts.entry(amount).or_default() += 1;
    }
    let mut entries: Vec<(i64, usize)> = counts.into_iter().collect();
    entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    entries
}
