pub mod cleaning_staff;
pub mod event;
pub mod post_office;
pub mod user;
pub mod waste;

pub use cleaning_staff::CleaningStaff;
pub use event::{Event, EventReport};
pub use post_office::PostOffice;
pub use user::{DivisionalOffice, NewUser, OfficeAssignment, Role, Session, SubDivisionalOffice, User};
pub use waste::{WasteEntry, WasteKind, WasteMeasure};
