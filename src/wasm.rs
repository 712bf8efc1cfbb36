use std::fmt::Display;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::{DifficultyTier, SessionConfig};
use crate::game::GameController;

/// Browser-facing handle on one game.
#[wasm_bindgen]
pub struct WasmGame {
    inner: GameController,
}

#[wasm_bindgen]
impl WasmGame {
    /// New game at a named difficulty (`easy`, `medium`, `hard`, `expert`).
    #[wasm_bindgen(constructor)]
    pub fn new(difficulty: &str) -> Result<WasmGame, JsValue> {
        let tier: DifficultyTier = difficulty.parse().map_err(js_error)?;
        Ok(Self {
            inner: GameController::new_with_default_selector(SessionConfig::new(tier)),
        })
    }

    /// New game from a session object; omitted fields take their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<WasmGame, JsValue> {
        let config: SessionConfig = serde_wasm_bindgen::from_value(config)?;
        config.tiers.validate().map_err(js_error)?;
        Ok(Self {
            inner: GameController::new_with_default_selector(config),
        })
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.to_snapshot())
    }

    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.get_legal_moves())
    }

    /// Plays a human move and returns the new state.
    pub fn place(&mut self, row: u8, col: u8) -> Result<JsValue, JsValue> {
        self.inner.place(row, col).map_err(js_error)?;
        self.state()
    }

    pub fn pass(&mut self) -> Result<JsValue, JsValue> {
        self.inner.pass().map_err(js_error)?;
        self.state()
    }

    /// Runs the search for the side to move and returns its report.
    #[wasm_bindgen(js_name = aiMove)]
    pub fn ai_move(&mut self) -> Result<JsValue, JsValue> {
        let result = self.inner.play_ai_move().map_err(js_error)?;
        to_js(&result)
    }

    /// Final result, or `undefined` while the game is running.
    pub fn result(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.to_game_result())
    }

    #[wasm_bindgen(js_name = decisionLog)]
    pub fn decision_log(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.decision_log())
    }

    #[wasm_bindgen(js_name = setDifficulty)]
    pub fn set_difficulty(&mut self, difficulty: &str) -> Result<(), JsValue> {
        let tier: DifficultyTier = difficulty.parse().map_err(js_error)?;
        self.inner.set_difficulty(tier);
        Ok(())
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
