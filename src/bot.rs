use crate::game::GameState;
use crate::settings::GameSettings;


// Whether the server should be asked to move on the bot's behalf right now. The caller is
// responsible for not having another request outstanding.
pub fn bot_to_move(settings: &GameSettings, state: &GameState) -> bool {
    !state.is_over() && settings.is_bot(state.current_turn)
}
