pub mod club;
pub mod event;

pub use club::{Club, ClubFilter, ClubPlacement, ClubView, InvitationState, NewClub};
pub use event::{Event, EventInput};
