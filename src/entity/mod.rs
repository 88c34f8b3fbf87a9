pub mod prelude;

pub mod actor;
pub mod creator;
pub mod film;
pub mod film_actor;
