mod center;
mod lookup;

pub use self::{center::*, lookup::*};
