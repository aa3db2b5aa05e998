//! Greedy Uno bot: plays the playable card worth the most points and draws
//! when nothing fits. Facing a pending penalty it stacks a draw card if it
//! holds one. Among equal points a WildDrawFour beats a Wild, and otherwise
//! the card held longest goes first. Wild colours are declared at random.

use crate::games::uno::{Card, CardColor, CardValue, UnoMove, UnoState};
use crate::GameState;
use rand::seq::IndexedRandom;
use rand::Rng;

fn tie_rank(card: &Card) -> u8 {
    match card.value {
        CardValue::WildDrawFour => 2,
        CardValue::Wild => 1,
        _ => 0,
    }
}

/// Chooses the bot's action, or `None` when the game is over.
pub fn choose_move<R: Rng + ?Sized>(state: &UnoState, rng: &mut R) -> Option<UnoMove> {
    if state.is_terminal() {
        return None;
    }
    let mut best: Option<&Card> = None;
    for card in state.current().hand.iter().filter(|c| state.can_play(c)) {
        let better = match best {
            None => true,
            Some(b) => (card.points, tie_rank(card)) > (b.points, tie_rank(b)),
        };
        if better {
            best = Some(card);
        }
    }

    let Some(card) = best else {
        return Some(UnoMove::Draw);
    };
    let color = if card.value.is_wild() {
        CardColor::DECLARABLE.choose(rng).copied()
    } else {
        None
    };
    Some(UnoMove::Play { card_id: card.id, color })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_bot_moves_are_legal_through_a_game() {
        let mut state = UnoState::new(21);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
        let mut plies = 0;
        while let Some(mv) = choose_move(&state, &mut rng) {
            state.apply_move(&mv).unwrap();
            assert_eq!(state.total_cards(), 108);
            plies += 1;
            if plies > 5_000 {
                break;
            }
        }
        assert!(plies > 0);
    }

    #[test]
    fn test_pending_penalty_stacks_or_draws() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut answered = 0;
        for seed in 0..20 {
            let mut state = UnoState::new(seed);
            for _ in 0..2_000 {
                let Some(mv) = choose_move(&state, &mut rng) else { break };
                if state.draw_count() > 0 {
                    answered += 1;
                    let holds_draw_card = state.current().hand.iter().any(|c| state.can_play(c));
                    match mv {
                        UnoMove::Draw => assert!(!holds_draw_card),
                        UnoMove::Play { card_id, .. } => {
                            let card = state.current().hand.iter().find(|c| c.id == card_id).unwrap();
                            assert!(card.value.penalty() > 0);
                        }
                    }
                }
                state.apply_move(&mv).unwrap();
            }
        }
        assert!(answered > 0);
    }

    #[test]
    fn test_wild_gets_a_colour() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        for seed in 0..50 {
            let state = UnoState::new(seed);
            if let Some(UnoMove::Play { card_id, color }) = choose_move(&state, &mut rng) {
                let card = state.current().hand.iter().find(|c| c.id == card_id).unwrap();
                assert_eq!(card.value.is_wild(), color.is_some());
                assert!(state.is_legal(&UnoMove::Play { card_id, color }));
            }
        }
    }
}
