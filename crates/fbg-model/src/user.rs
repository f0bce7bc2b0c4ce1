//! User profiles.

use chrono::{DateTime, Utc};
use fbg_core::{Connection, EntityHeader, EntitySchema, GraphEntity, GraphResult, Session};

use crate::any::AnyEntity;
use crate::content::{Link, Message, Note, Post, Status};
use crate::media::{Album, Photo, Video};
use crate::social::{Education, Employment, Event, Friend, Group, Like};

/// Alias the API resolves to the user owning the access token.
pub const ME: &str = "me";

#[derive(Debug, Default, PartialEq)]
pub struct User {
    header: EntityHeader,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,
    pub about: Option<String>,
    /// As sent by the API, usually `MM/DD/YYYY` or `MM/DD`.
    pub birthday: Option<String>,
    pub relationship_status: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    /// Offset from UTC in hours.
    pub timezone: i32,
    pub updated_time: DateTime<Utc>,
    pub work: Option<Vec<Employment>>,
    pub education: Option<Vec<Education>>,
    pub significant_other: Option<Friend>,
    pub hometown: Option<Like>,

    pub home: Option<Connection<Post>>,
    pub feed: Option<Connection<Post>>,
    pub posts: Option<Connection<Post>>,
    pub tagged: Option<Connection<AnyEntity>>,
    pub friends: Option<Connection<Friend>>,
    pub family: Option<Connection<Friend>>,
    pub activities: Option<Connection<Like>>,
    pub interests: Option<Connection<Like>>,
    pub music: Option<Connection<Like>>,
    pub books: Option<Connection<Like>>,
    pub movies: Option<Connection<Like>>,
    pub television: Option<Connection<Like>>,
    pub likes: Option<Connection<Like>>,
    pub photos: Option<Connection<Photo>>,
    pub albums: Option<Connection<Album>>,
    pub videos: Option<Connection<Video>>,
    pub groups: Option<Connection<Group>>,
    pub statuses: Option<Connection<Status>>,
    pub links: Option<Connection<Link>>,
    pub notes: Option<Connection<Note>>,
    pub events: Option<Connection<Event>>,
    pub inbox: Option<Connection<Message>>,
    pub outbox: Option<Connection<Message>>,
    pub updates: Option<Connection<Message>>,
}

impl GraphEntity for User {
    const TYPE_TAG: Option<&'static str> = Some("user");
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .string("first_name", |u| &mut u.first_name)
            .string("last_name", |u| &mut u.last_name)
            .string("name", |u| &mut u.name)
            .string("link", |u| &mut u.link)
            .string("about", |u| &mut u.about)
            .string("birthday", |u| &mut u.birthday)
            .string("relationship_status", |u| &mut u.relationship_status)
            .string("email", |u| &mut u.email)
            .string("website", |u| &mut u.website)
            .scalar("timezone", |u| &mut u.timezone)
            .datetime_or_default("updated_time", |u| &mut u.updated_time)
            .entity_array("work", |u| &mut u.work)
            .entity_array("education", |u| &mut u.education)
            .nested("significant_other", |u| &mut u.significant_other)
            .nested("hometown", |u| &mut u.hometown);

        schema
            .connection("home", |u| &mut u.home)
            .connection("feed", |u| &mut u.feed)
            .connection("posts", |u| &mut u.posts)
            .connection("tagged", |u| &mut u.tagged)
            .connection("friends", |u| &mut u.friends)
            .connection("family", |u| &mut u.family)
            .connection("activities", |u| &mut u.activities)
            .connection("interests", |u| &mut u.interests)
            .connection("music", |u| &mut u.music)
            .connection("books", |u| &mut u.books)
            .connection("movies", |u| &mut u.movies)
            .connection("television", |u| &mut u.television)
            .connection("likes", |u| &mut u.likes)
            .connection("photos", |u| &mut u.photos)
            .connection("albums", |u| &mut u.albums)
            .connection("videos", |u| &mut u.videos)
            .connection("groups", |u| &mut u.groups)
            .connection("statuses", |u| &mut u.statuses)
            .connection("links", |u| &mut u.links)
            .connection("notes", |u| &mut u.notes)
            .connection("events", |u| &mut u.events)
            .connection("inbox", |u| &mut u.inbox)
            .connection("outbox", |u| &mut u.outbox)
            .connection("updates", |u| &mut u.updates);
    }
}

impl User {
    /// Request the user owning the session's access token.
    pub async fn me(session: &Session) -> GraphResult<Self> {
        session.request::<Self>(ME).await
    }
}
