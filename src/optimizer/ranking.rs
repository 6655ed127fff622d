use rust_decimal::Decimal;

/// Index of the highest scored item, skipping items without a score.
/// Ties keep the earliest item, so enumeration order decides.
pub fn first_best<T, F>(items: &[T], score: F) -> Option<usize>
where
    F: Fn(&T) -> Option<Decimal>,
{
    let mut best: Option<(usize, Decimal)> = None;
    for (index, item) in items.iter().enumerate() {
        let Some(value) = score(item) else {
            continue;
        };
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earliest_maximum_wins_ties() {
        let scores = [Some(Decimal::ONE), Some(Decimal::TWO), Some(Decimal::TWO)];
        assert_eq!(first_best(&scores, |s| *s), Some(1));
    }

    #[test]
    fn unscored_items_are_skipped() {
        let scores = [None, Some(Decimal::NEGATIVE_ONE), None];
        assert_eq!(first_best(&scores, |s| *s), Some(1));
    }

    #[test]
    fn nothing_scored_yields_none() {
        let scores: [Option<Decimal>; 2] = [None, None];
        assert_eq!(first_best(&scores, |s| *s), None);
        assert_eq!(first_best(&[] as &[Option<Decimal>], |s| *s), None);
    }
}
