pub use super::actor::Entity as Actor;
pub use super::creator::Entity as Creator;
pub use super::film::Entity as Film;
pub use super::film_actor::Entity as FilmActor;
