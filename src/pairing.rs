use crate::competitor::Competitor;

/// One table for one round: indices into the standings snapshot the pairing
/// was built from. `second` is `None` for a bye.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pairing {
    pub first: usize,
    pub second: Option<usize>,
}

impl Pairing {
    pub fn is_bye(&self) -> bool {
        self.second.is_none()
    }
}

/// Pair a round from the current standings order.
///
/// Greedy single pass: each unpaired competitor takes the first unpaired
/// competitor below it that it has not played yet. A competitor with no
/// such opponent gets a bye. This does not backtrack, so it can hand out
/// byes that a full rearrangement would avoid.
///
/// Every competitor appears in exactly one pairing, and pairings come out
/// in the order of their first member.
pub fn find_pairings(standings: &[Competitor]) -> Vec<Pairing> {
    let mut paired = vec![false; standings.len()];
    let mut pairings = Vec::with_capacity(standings.len() / 2 + 1);

    for i in 0..standings.len() {
        if paired[i] {
            continue;
        }
        paired[i] = true;

        let player = &standings[i];
        let opponent = (i + 1..standings.len())
            .find(|&j| !paired[j] && !player.has_played(standings[j].id()));

        if let Some(j) = opponent {
            paired[j] = true;
        }
        pairings.push(Pairing {
            first: i,
            second: opponent,
        });
    }

    pairings
}

/// Number of byes in a set of pairings.
pub fn count_byes(pairings: &[Pairing]) -> usize {
    pairings.iter().filter(|p| p.is_bye()).count()
}
