//! The entity catalogue of the graph API.
//!
//! Every type declares its field table through [`GraphEntity::describe`];
//! tagged types are also reachable through [`AnyEntity`] when only the
//! server's `type` field says what a node is.
//!
//! ```rust,ignore
//! let me = User::me(&session).await?;
//! for friend in me.friends.as_ref().unwrap().iter().await? {
//!     let profile = friend?.fetch_user().await?;
//!     println!("{:?}", profile.name);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod any;
pub mod content;
pub mod media;
pub mod social;
pub mod user;

pub use any::{AnyEntity, BasicEntity, materialize_by_tag};
pub use content::{Comment, Link, Message, Note, Post, Status};
pub use fbg_core::GraphEntity;
pub use media::{Album, FriendTag, Photo, Video};
pub use social::{Education, Employment, Event, Friend, Group, Like, Page};
pub use user::{ME, User};
