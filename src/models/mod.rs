pub mod auth;
pub mod paged;
pub mod pet;
pub mod photo;
pub mod tutor;

pub use auth::{AuthRequest, AuthResponse};
pub use paged::Paged;
pub use pet::{Pet, PetDetails, PetRequest};
pub use photo::{Photo, PhotoUpload};
pub use tutor::{Tutor, TutorDetails, TutorRequest};
