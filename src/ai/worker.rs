use std::sync::mpsc::{self, Receiver};
use std::thread;

use crate::ai::eval::{EvalWeights, Evaluator};
use crate::ai::search::{SearchResult, Searcher};
use crate::board::BoardState;
use crate::config::TierSettings;
use crate::types::Color;

/// Runs one search on its own thread so an interactive loop never blocks.
///
/// The result arrives on the returned channel; hand it to
/// `GameController::apply_search_result` on the owning thread.
pub fn spawn_search(
    state: BoardState,
    player: Color,
    settings: TierSettings,
    weights: EvalWeights,
) -> Receiver<SearchResult> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let evaluator = Evaluator::new(weights);
        let mut searcher = Searcher::with_timeout(&evaluator, settings.time_budget());
        let result = searcher.choose_move(&state, player, settings.depth);
        if tx.send(result).is_err() {
            log::debug!("search result for {:?} dropped: receiver gone", player);
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::SessionConfig;
    use crate::game::GameController;
    use crate::types::Position;

    #[test]
    fn result_arrives_over_channel_and_applies_like_a_human_move() {
        let mut game = GameController::new_with_default_selector(SessionConfig::default());
        game.place(2, 3).unwrap();

        let rx = spawn_search(
            game.state().position,
            game.state().side_to_move(),
            TierSettings::new(3, 5_000),
            EvalWeights::default(),
        );
        let result = rx
            .recv_timeout(Duration::from_secs(30))
            .expect("search finishes");

        let pos = result.best_move.expect("white can move").pos;
        let legal: Vec<Position> = game.get_legal_moves();
        assert!(legal.contains(&pos));

        game.apply_search_result(&result).unwrap();
        assert_eq!(game.last_move, Some(pos));
        assert_eq!(game.decision_log().len(), 3);
    }
}
