//! Reveal core: phases, labels, the state machine and its session timers.

mod machine;
mod session;
pub mod state;

pub use machine::RevealMachine;
pub use state::{Label, Phase, REVEAL_OUTCOME, RevealSnapshot, Transition, TransitionReason};
