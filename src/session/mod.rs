pub mod controller;
pub mod deck;

pub use controller::{Draw, Generation, Progress, SessionController, SharedSession};
pub use deck::Deck;
