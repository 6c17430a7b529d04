//! App layer - the request menu loop
//!
//! The app owns the loaded project and its variables, shows the request menu,
//! fires the chosen request into the shared display and hands control to the
//! viewer's browse loop until the user returns to the menu.

pub mod runner;

pub use runner::App;
