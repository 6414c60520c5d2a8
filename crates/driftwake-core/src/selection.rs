//! Roulette-wheel selection over weighted candidates.
//!
//! One uniform draw in `[0, total)` is walked down the candidate list,
//! subtracting each weight until the remainder reaches zero. Negative and
//! NaN weights count as zero, and zero-weight candidates can never be
//! picked. An empty list or a list whose weights sum to zero yields `None`.

use driftwake_types::EventDefinition;
use rand::Rng;

use crate::conditions::EligibleEvent;

/// Pick one event with probability proportional to its weight.
pub fn select_weighted_event<'a, R>(
    candidates: &[EligibleEvent<'a>],
    rng: &mut R,
) -> Option<&'a EventDefinition>
where
    R: Rng + ?Sized,
{
    let total: f64 = candidates.iter().map(|c| usable_weight(c.weight)).sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    let mut remainder = rng.random::<f64>() * total;
    for candidate in candidates {
        let weight = usable_weight(candidate.weight);
        if weight <= 0.0 {
            continue;
        }
        remainder -= weight;
        if remainder <= 0.0 {
            return Some(candidate.event);
        }
    }

    // Rounding left a sliver of the draw unaccounted for.
    candidates
        .iter()
        .find(|c| usable_weight(c.weight) > 0.0)
        .map(|c| c.event)
}

/// Weight as used by the wheel: finite and non-negative.
fn usable_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn candidates<'a>(events: &'a [EventDefinition], weights: &[f64]) -> Vec<EligibleEvent<'a>> {
        events
            .iter()
            .zip(weights.iter().copied())
            .map(|(event, weight)| EligibleEvent { event, weight })
            .collect()
    }

    fn catalog(n: usize) -> Vec<EventDefinition> {
        (0..n)
            .map(|i| EventDefinition::new(format!("event_{i}"), "dynamic"))
            .collect()
    }

    #[test]
    fn empty_input_selects_nothing() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(select_weighted_event(&[], &mut rng).is_none());
    }

    #[test]
    fn all_zero_weights_select_nothing() {
        let mut rng = SmallRng::seed_from_u64(2);
        let events = catalog(3);
        let list = candidates(&events, &[0.0, 0.0, 0.0]);
        assert!(select_weighted_event(&list, &mut rng).is_none());
    }

    #[test]
    fn degenerate_weights_are_ignored() {
        let mut rng = SmallRng::seed_from_u64(3);
        let events = catalog(4);
        let list = candidates(&events, &[-5.0, f64::NAN, 0.0, 1.0]);
        for _ in 0..200 {
            let picked = select_weighted_event(&list, &mut rng).map(|e| e.id.as_str());
            assert_eq!(picked, Some("event_3"));
        }

        let list = candidates(&events, &[-1.0, f64::NAN]);
        assert!(select_weighted_event(&list, &mut rng).is_none());
    }

    #[test]
    fn single_candidate_is_always_selected() {
        let mut rng = SmallRng::seed_from_u64(4);
        let events = catalog(1);
        let list = candidates(&events, &[0.25]);
        for _ in 0..100 {
            assert_eq!(
                select_weighted_event(&list, &mut rng).map(|e| e.id.as_str()),
                Some("event_0")
            );
        }
    }

    #[test]
    fn selection_follows_weights() {
        // Weights 1 and 3: the heavy candidate should win about 75% of draws.
        let mut rng = SmallRng::seed_from_u64(42);
        let events = catalog(2);
        let list = candidates(&events, &[1.0, 3.0]);
        let draws = 10_000_u32;
        let mut heavy = 0_u32;
        for _ in 0..draws {
            if select_weighted_event(&list, &mut rng).map(|e| e.id.as_str()) == Some("event_1") {
                heavy += 1;
            }
        }
        let share = f64::from(heavy) / f64::from(draws);
        // Binomial std-dev at n=10000, p=0.75 is ~0.0043; allow ~5 sigma.
        assert!((share - 0.75).abs() < 0.025, "heavy share was {share}");
    }
}
