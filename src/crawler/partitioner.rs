//! Range partitioning of the price-ordered result space
//!
//! Results are sorted by ascending price and every query is truncated to the
//! page ceiling, so the next slice starts just above the highest price already
//! retrieved. Lower bounds must strictly increase from one batch to the next.

use crate::query::Query;

/// Decision for the batch following a completed one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionStep {
    /// Continue with this query
    Advance(Query),

    /// The computed bound does not move past the previous one
    Stalled { bound: u64 },

    /// The computed bound lies above the query's upper bound
    BeyondUpperBound { bound: u64 },
}

/// Lower bound addressing prices strictly above `batch_max_price`
pub fn next_lower_bound(batch_max_price: f64) -> u64 {
    // `as` saturates: negatives map to 0, huge values to u64::MAX
    (batch_max_price.floor() as u64).saturating_add(1)
}

/// Computes the next query from the previous one and its batch's highest price
pub fn next_query(previous: &Query, batch_max_price: f64) -> PartitionStep {
    let bound = next_lower_bound(batch_max_price);

    if previous.min_price().is_some_and(|prev| bound <= prev) {
        return PartitionStep::Stalled { bound };
    }

    if previous.max_price().is_some_and(|max| bound > max) {
        return PartitionStep::BeyondUpperBound { bound };
    }

    PartitionStep::Advance(previous.with_min_price(bound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SearchFilters;
    use url::Url;

    fn query(min: Option<u64>, max: Option<u64>) -> Query {
        Query::new(
            Url::parse("https://api.example.com/search").unwrap(),
            SearchFilters {
                region: "lom".to_string(),
                province: None,
                municipality: None,
                nation: "IT".to_string(),
                contract: "1".to_string(),
                category: "1".to_string(),
                language: "it".to_string(),
            },
            min,
            max,
        )
    }

    #[test]
    fn test_next_lower_bound() {
        assert_eq!(next_lower_bound(340000.0), 340001);
        assert_eq!(next_lower_bound(340000.75), 340001);
        assert_eq!(next_lower_bound(0.0), 1);
        assert_eq!(next_lower_bound(-5.0), 1);
    }

    #[test]
    fn test_advances_past_batch_maximum() {
        let previous = query(None, Some(1_000_000));
        match next_query(&previous, 340000.0) {
            PartitionStep::Advance(next) => {
                assert_eq!(next.min_price(), Some(340001));
                assert_eq!(next.max_price(), Some(1_000_000));
                assert_eq!(next.filters(), previous.filters());
            }
            other => panic!("expected advance, got {:?}", other),
        }
    }

    #[test]
    fn test_successive_bounds_strictly_increase() {
        let mut current = query(Some(0), None);
        let mut bounds = vec![current.min_price().unwrap()];

        for max_seen in [1200.0, 1200.5, 5000.0, 5001.0, 90000.9] {
            if let PartitionStep::Advance(next) = next_query(&current, max_seen) {
                current = next;
                bounds.push(current.min_price().unwrap());
            }
        }

        assert!(bounds.windows(2).all(|w| w[1] > w[0]), "{:?}", bounds);
        assert_eq!(bounds, vec![0, 1201, 5001, 5002, 90001]);
    }

    #[test]
    fn test_repeated_maximum_stalls() {
        let previous = query(Some(340001), None);
        assert_eq!(
            next_query(&previous, 340000.0),
            PartitionStep::Stalled { bound: 340001 }
        );
    }

    #[test]
    fn test_bound_beyond_upper_limit() {
        let previous = query(Some(0), Some(500_000));
        assert_eq!(
            next_query(&previous, 500_000.0),
            PartitionStep::BeyondUpperBound { bound: 500_001 }
        );
    }
}
