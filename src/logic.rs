//! Dispatch of client messages onto the engine state.
//!
//! Each message yields zero or more replies, in sending order. Board moves that
//! arrive at the wrong time produce nothing rather than an error.

use tracing::{info, instrument};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// What the driver should do after a message.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Quit,
}

#[instrument(level = "info", skip(state))]
pub fn handle_client_message(msg: ClientMessage, state: &mut AppState) -> (Vec<ServerMessage>, Flow) {
  let replies = match msg {
    ClientMessage::Ping => vec![ServerMessage::Pong],

    ClientMessage::GetProgress => vec![state.progress_message()],

    ClientMessage::Generate { activity, level, seed } => {
      info!(target: "activity", ?activity, world = activity.world(), level, seeded = seed.is_some(), "Raw generate served");
      vec![state.generate(activity, level, seed)]
    }

    ClientMessage::StartLevel { world, level, seed } => state.start_level(&world, level, seed),

    ClientMessage::SubmitAnswer { answer } => state.submit_answer(answer),

    ClientMessage::FlipCard { index } => state.flip_card(index),

    ClientMessage::PlaceShape { piece_id, slot_id } => state.place_shape(&piece_id, &slot_id),

    ClientMessage::PaintCell { row, col, color } => state.paint_cell(row, col, color),

    ClientMessage::ResetCanvas => state.reset_canvas(),

    ClientMessage::NextLevel => state.next_level(),

    ClientMessage::Leave => state.leave(),

    ClientMessage::Quit => {
      let mut out = state.leave();
      out.push(ServerMessage::Bye);
      return (out, Flow::Quit);
    }
  };
  (replies, Flow::Continue)
}
