use std::cmp::Reverse;

use super::Seat;

/// Assigns finishing ranks 1-4 to raw scores given in seat order.
///
/// Equal scores are broken by seat order: East outranks South, South
/// outranks West, West outranks North. Ordering by `(score desc, seat asc)`
/// is the exact form of giving each seat a strictly decreasing epsilon.
pub fn resolve_ranks(scores: [i64; 4]) -> [u8; 4] {
    let mut order = Seat::ALL;
    order.sort_by_key(|seat| (Reverse(scores[seat.index()]), *seat));

    let mut ranks = [0u8; 4];
    for (position, seat) in order.iter().enumerate() {
        ranks[seat.index()] = position as u8 + 1;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case([5, -15, 20, -10], [2, 3, 1, 4])]
    #[case([250, 250, 250, 250], [1, 2, 3, 4])]
    #[case([100, 300, 300, 300], [4, 1, 2, 3])]
    #[case([-50, 400, 0, 650], [4, 2, 3, 1])]
    #[case([300, 200, 300, 200], [1, 3, 2, 4])]
    fn resolves_ranks(#[case] scores: [i64; 4], #[case] expected: [u8; 4]) {
        assert_eq!(resolve_ranks(scores), expected);
    }

    #[test]
    fn always_a_bijection() {
        let values = [-20, 0, 250, 250, 400];
        for a in values {
            for b in values {
                for c in values {
                    for d in values {
                        let mut ranks = resolve_ranks([a, b, c, d]).to_vec();
                        ranks.sort();
                        assert_eq!(ranks, vec![1, 2, 3, 4], "scores {a} {b} {c} {d}");
                    }
                }
            }
        }
    }

    #[test]
    fn earlier_seat_wins_ties() {
        let scores = [100, 250, 100, 250];
        let ranks = resolve_ranks(scores);
        for i in 0..4 {
            for j in (i + 1)..4 {
                if scores[i] == scores[j] {
                    assert!(ranks[i] < ranks[j]);
                }
            }
        }
    }
}
