//! Client-side half of a search: where the user is, what they filtered on, which
//! response is allowed onto the screen and in what order it is shown.

pub mod filters;
pub mod geolocation;
pub mod presenter;
pub mod session;
