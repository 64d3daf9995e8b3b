// Selection state machine: which piece the user picked and where it may go.
//
// Transitions:
//   Idle --(own piece)--> Selected --(candidate square)--> Moving --(board swapped)--> Idle
// Selected also re-selects on another own piece. Everything else is a no-op. The machine never
// talks to the server itself: it tells the caller what to request.

use crate::coord::{PixelOffset, Square};
use crate::force::Force;


#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SquareClick {
    pub square: Square,
    pub offset: PixelOffset,
    // Color of the piece on the square, if any.
    pub piece: Option<Force>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Selection {
    pub origin: Square,
    pub offset: PixelOffset,
    // Legal destinations; `None` until the server answers.
    pub candidates: Option<Vec<Square>>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Interaction {
    Idle,
    Selected(Selection),
    // `glide` is the on-screen translation the piece is animated by.
    Moving { from: Square, to: Square, glide: (f64, f64) },
}

#[derive(Clone, PartialEq, Debug)]
pub enum ClickOutcome {
    Ignored,
    // A piece was picked: legal destinations must be requested.
    Selected { origin: Square },
    // A destination was picked: the move must be submitted. `glide` is the on-screen
    // translation from the origin square to the destination square.
    Submitted { from: Square, to: Square, glide: (f64, f64) },
}

impl Interaction {
    pub fn is_idle(&self) -> bool { matches!(self, Interaction::Idle) }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            Interaction::Selected(selection) => Some(selection),
            _ => None,
        }
    }

    pub fn click(&mut self, click: SquareClick, current_turn: Force) -> ClickOutcome {
        if let Interaction::Moving { .. } = self {
            return ClickOutcome::Ignored;
        }
        match click.piece {
            Some(force) if force == current_turn => {
                *self = Interaction::Selected(Selection {
                    origin: click.square,
                    offset: click.offset,
                    candidates: None,
                });
                ClickOutcome::Selected { origin: click.square }
            }
            Some(_) => ClickOutcome::Ignored,
            None => {
                let Interaction::Selected(selection) = self else {
                    return ClickOutcome::Ignored;
                };
                let is_candidate = selection
                    .candidates
                    .as_ref()
                    .is_some_and(|candidates| candidates.contains(&click.square));
                if !is_candidate {
                    return ClickOutcome::Ignored;
                }
                let from = selection.origin;
                let glide = selection.offset.translation_to(click.offset);
                *self = Interaction::Moving { from, to: click.square, glide };
                ClickOutcome::Submitted { from, to: click.square, glide }
            }
        }
    }

    // Returns false if the answer is for a selection that is no longer current.
    pub fn set_candidates(&mut self, origin: Square, candidates: Vec<Square>) -> bool {
        match self {
            Interaction::Selected(selection) if selection.origin == origin => {
                selection.candidates = Some(candidates);
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) { *self = Interaction::Idle; }

    pub fn should_highlight_hover(&self, piece: Option<Force>, current_turn: Force) -> bool {
        self.is_idle() && piece == Some(current_turn)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn click(x: u32, y: u32, piece: Option<Force>) -> SquareClick {
        SquareClick {
            square: Square::new(x, y),
            offset: PixelOffset::new(x as f64 * 50.0, y as f64 * 50.0),
            piece,
        }
    }

    fn selected_with_candidates(candidates: Vec<Square>) -> Interaction {
        let mut interaction = Interaction::Idle;
        interaction.click(click(1, 4, Some(Force::Light)), Force::Light);
        assert!(interaction.set_candidates(Square::new(1, 4), candidates));
        interaction
    }

    #[test]
    fn select_own_piece() {
        let mut interaction = Interaction::Idle;
        let outcome = interaction.click(click(1, 4, Some(Force::Light)), Force::Light);
        assert_eq!(outcome, ClickOutcome::Selected { origin: Square::new(1, 4) });
        let selection = interaction.selection().unwrap();
        assert_eq!(selection.origin, Square::new(1, 4));
        assert_eq!(selection.offset, PixelOffset::new(50.0, 200.0));
        assert_eq!(selection.candidates, None);
    }

    #[test]
    fn idle_ignores_wrong_color_and_empty_squares() {
        let mut interaction = Interaction::Idle;
        assert_eq!(interaction.click(click(1, 0, Some(Force::Dark)), Force::Light), ClickOutcome::Ignored);
        assert_eq!(interaction.click(click(2, 2, None), Force::Light), ClickOutcome::Ignored);
        assert_eq!(interaction, Interaction::Idle);
    }

    #[test]
    fn wrong_color_keeps_selection() {
        let mut interaction = selected_with_candidates(vec![Square::new(1, 3)]);
        let before = interaction.clone();
        assert_eq!(interaction.click(click(1, 0, Some(Force::Dark)), Force::Light), ClickOutcome::Ignored);
        assert_eq!(interaction, before);
    }

    #[test]
    fn non_candidate_keeps_selection() {
        let mut interaction = selected_with_candidates(vec![Square::new(1, 3)]);
        let before = interaction.clone();
        assert_eq!(interaction.click(click(3, 3, None), Force::Light), ClickOutcome::Ignored);
        assert_eq!(interaction, before);
    }

    #[test]
    fn destination_before_candidates_is_ignored() {
        let mut interaction = Interaction::Idle;
        interaction.click(click(1, 4, Some(Force::Light)), Force::Light);
        assert_eq!(interaction.click(click(1, 3, None), Force::Light), ClickOutcome::Ignored);
        assert!(interaction.selection().is_some());
    }

    #[test]
    fn submit_candidate() {
        let mut interaction = selected_with_candidates(vec![Square::new(1, 3), Square::new(1, 2)]);
        let outcome = interaction.click(click(1, 2, None), Force::Light);
        assert_eq!(outcome, ClickOutcome::Submitted {
            from: Square::new(1, 4),
            to: Square::new(1, 2),
            glide: (0.0, -100.0),
        });
        assert_eq!(interaction, Interaction::Moving {
            from: Square::new(1, 4),
            to: Square::new(1, 2),
            glide: (0.0, -100.0),
        });
        // Nothing is accepted until the board is swapped.
        assert_eq!(interaction.click(click(0, 4, Some(Force::Light)), Force::Light), ClickOutcome::Ignored);
        interaction.reset();
        assert!(interaction.is_idle());
    }

    #[test]
    fn reselect_drops_old_candidates() {
        let mut interaction = selected_with_candidates(vec![Square::new(1, 3)]);
        let outcome = interaction.click(click(0, 4, Some(Force::Light)), Force::Light);
        assert_eq!(outcome, ClickOutcome::Selected { origin: Square::new(0, 4) });
        assert_eq!(interaction.selection().unwrap().candidates, None);
        // Late answer for the previous piece.
        assert!(!interaction.set_candidates(Square::new(1, 4), vec![Square::new(1, 3)]));
        assert_eq!(interaction.selection().unwrap().candidates, None);
    }

    #[test]
    fn hover() {
        let mut interaction = Interaction::Idle;
        assert!(interaction.should_highlight_hover(Some(Force::Dark), Force::Dark));
        assert!(!interaction.should_highlight_hover(Some(Force::Light), Force::Dark));
        assert!(!interaction.should_highlight_hover(None, Force::Dark));
        interaction.click(click(0, 0, Some(Force::Dark)), Force::Dark);
        assert!(!interaction.should_highlight_hover(Some(Force::Dark), Force::Dark));
    }
}
