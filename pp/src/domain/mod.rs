//! Domain records for PawPal
//!
//! Owner → Pet → Task is a strict ownership tree. A task points back to its
//! pet only through a `PetId` handle resolved via the owner's pet list.

mod id;
mod owner;
mod pet;
mod priority;
mod task;
mod time;

pub use id::{PetId, TaskId, generate_id};
pub use owner::Owner;
pub use pet::Pet;
pub use priority::Priority;
pub use task::{Frequency, Task, TaskStatus, TaskUpdate};
pub use time::{MINUTES_PER_DAY, TimeOfDay, TimeSlot};
