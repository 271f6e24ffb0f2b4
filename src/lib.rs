//! # Uiwright
//!
//! A fluent UI-testing DSL over accessibility trees.
//!
//! Uiwright lets end-to-end tests describe each screen of an application as a
//! type, then drive it through chains of actions and assertions. Elements are
//! located with composable queries, every check polls a fresh snapshot of the
//! application until it holds or times out, and failures are collected into a
//! report instead of aborting the test.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use uiwright::prelude::*;
//!
//! struct Login;
//!
//! #[derive(Debug)]
//! enum LoginElement {
//!     User,
//!     Submit,
//! }
//!
//! impl ElementRepresentable for LoginElement {
//!     fn query(&self) -> ElementQuery {
//!         let root = Login::root_query();
//!         match self {
//!             LoginElement::User => root.text_field("Login.User"),
//!             LoginElement::Submit => root.button("Submit"),
//!         }
//!     }
//! }
//!
//! impl ScreenSpec for Login {
//!     const IDENTITY: &'static str = "Login";
//!     type Element = LoginElement;
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let tree = Node::load("login.json".as_ref())?;
//!     let driver = Arc::new(MemoryDriver::new(tree));
//!     let session = Session::launch(driver, SessionConfig::new()).await?;
//!
//!     session
//!         .screen::<Login>()
//!         .tap(LoginElement::User)
//!         .await
//!         .type_text("ada")
//!         .await
//!         .assert_enabled([LoginElement::Submit])
//!         .await;
//!
//!     session.verify().await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`tree`]: Accessibility tree snapshots
//! - [`query`]: Element queries and their resolution
//! - [`wait`]: Predicates and the polling waiter
//! - [`driver`]: The seam to the application under test
//! - [`screen`]: Per-screen fluent controllers
//! - [`session`]: Shared state of one automation session
//! - [`report`]: Recorded failures and screenshots
//! - [`config`]: Session configuration
//! - [`input`]: Gesture and keyboard vocabulary
//! - [`output`]: Wireframe screenshots of a tree
//! - [`error`]: Error types
//! - [`prelude`]: Convenient re-exports

pub mod config;
pub mod driver;
pub mod error;
pub mod input;
pub mod output;
pub mod query;
pub mod report;
pub mod screen;
pub mod session;
pub mod tree;
pub mod wait;

pub mod prelude;

// Re-export main types at crate root
pub use error::{Result, UiwrightError};
pub use query::ElementQuery;
pub use screen::{Flow, ScreenSpec};
pub use session::Session;
pub use tree::Node;
