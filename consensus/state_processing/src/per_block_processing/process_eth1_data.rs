use types::{BeaconState, Eth1Data};

/// Records the block's eth1 vote and, once a simple majority of the voting period has voted for
/// the same `Eth1Data`, adopts it as `state.eth1_data`.
///
/// The real majority rule is keyed off `SLOTS_PER_ETH1_VOTING_PERIOD`; committee/shuffling-scale
/// concerns are out of this core's scope, so the period length is passed in by the caller rather
/// than derived from a typenum constant.
pub fn process_eth1_data(state: &mut BeaconState, eth1_data: &Eth1Data, voting_period_slots: u64) {
    state.eth1_data_votes.push(eth1_data.clone());

    let votes_for_this_data = state
        .eth1_data_votes
        .iter()
        .filter(|vote| *vote == eth1_data)
        .count();

    if (votes_for_this_data as u64) * 2 > voting_period_slots {
        state.eth1_data = eth1_data.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Hash256;

    fn state() -> BeaconState {
        crate::test_utils::empty_state(4)
    }

    #[test]
    fn adopts_majority_vote() {
        let mut state = state();
        let data = Eth1Data {
            deposit_root: Hash256::from_slice(&[1; 32]),
            deposit_count: 1,
            block_hash: Hash256::from_slice(&[2; 32]),
        };
        process_eth1_data(&mut state, &data, 4);
        process_eth1_data(&mut state, &data, 4);
        process_eth1_data(&mut state, &data, 4);
        assert_eq!(state.eth1_data, data);
    }

    #[test]
    fn does_not_adopt_minority_vote() {
        let mut state = state();
        let data = Eth1Data {
            deposit_root: Hash256::from_slice(&[1; 32]),
            deposit_count: 1,
            block_hash: Hash256::from_slice(&[2; 32]),
        };
        process_eth1_data(&mut state, &data, 4);
        assert_ne!(state.eth1_data, data);
    }
}
