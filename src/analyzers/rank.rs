/// Assigns competition ranks, highest value first.
///
/// Tied values share the lowest rank of their group and the next distinct
/// value skips ahead by the group size:
///
/// | values            | ranks        |
/// |-------------------|--------------|
/// | 30, 20, 20, 10    | 1, 2, 2, 4   |
/// | 5, 5, 5           | 1, 1, 1      |
pub fn competition_ranks(values: &[f64]) -> Vec<u32> {
    values
        .iter()
        .map(|v| 1 + values.iter().filter(|other| *other > v).count() as u32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_values() {
        assert_eq!(competition_ranks(&[10.0, 30.0, 20.0]), vec![3, 1, 2]);
    }

    #[test]
    fn test_ties_share_lowest_rank() {
        assert_eq!(competition_ranks(&[30.0, 20.0, 20.0, 10.0]), vec![1, 2, 2, 4]);
        assert_eq!(competition_ranks(&[7.0, 9.0, 9.0, 9.0]), vec![4, 1, 1, 1]);
    }

    #[test]
    fn test_full_tie() {
        assert_eq!(competition_ranks(&[350.0; 13]), vec![1; 13]);
    }

    #[test]
    fn test_empty() {
        assert!(competition_ranks(&[]).is_empty());
    }

    #[test]
    fn test_monotonic() {
        let values = [3.5, 1.0, 8.25, 3.5, 0.0, 8.25, 2.0];
        let ranks = competition_ranks(&values);
        for (a, ra) in values.iter().zip(&ranks) {
            for (b, rb) in values.iter().zip(&ranks) {
                if a > b {
                    assert!(ra < rb);
                }
                if a == b {
                    assert_eq!(ra, rb);
                }
            }
        }
    }
}
