//! People, pages, groups and events.

use chrono::{DateTime, Utc};
use fbg_core::{Connection, EntityHeader, EntitySchema, GraphEntity, GraphResult};

use crate::any::AnyEntity;
use crate::content::{Link, Note, Post, Status};
use crate::media::{Album, Photo, Video};
use crate::user::User;

// ─────────────────────────────────────────────────────────────────────────────
// References
// ─────────────────────────────────────────────────────────────────────────────

/// A reference to a user as it appears inside other entities.
#[derive(Debug, Default, PartialEq)]
pub struct Friend {
    header: EntityHeader,
    pub name: Option<String>,
}

impl GraphEntity for Friend {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema.string("name", |f| &mut f.name);
    }
}

impl Friend {
    /// Request the complete user profile this reference points at.
    pub async fn fetch_user(&self) -> GraphResult<User> {
        self.header.fetch_full::<User>().await
    }
}

/// A reference to a page: an employer, a school, an interest.
#[derive(Debug, Default, PartialEq)]
pub struct Like {
    header: EntityHeader,
    pub name: Option<String>,
    pub category: Option<String>,
}

impl GraphEntity for Like {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .string("name", |l| &mut l.name)
            .string("category", |l| &mut l.category);
    }
}

impl Like {
    /// Request the complete page this reference points at.
    pub async fn fetch_page(&self) -> GraphResult<Page> {
        self.header.fetch_full::<Page>().await
    }
}

/// A school entry on a user's profile.
#[derive(Debug, Default, PartialEq)]
pub struct Education {
    header: EntityHeader,
    pub school: Option<Like>,
    pub year: Option<Like>,
    pub degree: Option<Like>,
    pub concentration: Option<Vec<Like>>,
}

impl GraphEntity for Education {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("school", |e| &mut e.school)
            .nested("year", |e| &mut e.year)
            .nested("degree", |e| &mut e.degree)
            .entity_array("concentration", |e| &mut e.concentration);
    }
}

/// A job on a user's profile. Dates are free-form (`2007-02`, `0000-00`).
#[derive(Debug, Default, PartialEq)]
pub struct Employment {
    header: EntityHeader,
    pub employer: Option<Like>,
    pub position: Option<Like>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl GraphEntity for Employment {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("employer", |e| &mut e.employer)
            .nested("position", |e| &mut e.position)
            .string("start_date", |e| &mut e.start_date)
            .string("end_date", |e| &mut e.end_date);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pages
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
pub struct Page {
    header: EntityHeader,
    pub name: Option<String>,
    pub category: Option<String>,
    pub feed: Option<Connection<Post>>,
    pub posts: Option<Connection<Post>>,
    pub tagged: Option<Connection<AnyEntity>>,
    pub links: Option<Connection<Link>>,
    pub photos: Option<Connection<Photo>>,
    pub groups: Option<Connection<Group>>,
    pub albums: Option<Connection<Album>>,
    pub statuses: Option<Connection<Status>>,
    pub videos: Option<Connection<Video>>,
    pub notes: Option<Connection<Note>>,
    pub events: Option<Connection<Event>>,
}

impl GraphEntity for Page {
    const TYPE_TAG: Option<&'static str> = Some("page");
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .string("name", |p| &mut p.name)
            .string("category", |p| &mut p.category)
            .connection("feed", |p| &mut p.feed)
            .connection("posts", |p| &mut p.posts)
            .connection("tagged", |p| &mut p.tagged)
            .connection("links", |p| &mut p.links)
            .connection("photos", |p| &mut p.photos)
            .connection("groups", |p| &mut p.groups)
            .connection("albums", |p| &mut p.albums)
            .connection("statuses", |p| &mut p.statuses)
            .connection("videos", |p| &mut p.videos)
            .connection("notes", |p| &mut p.notes)
            .connection("events", |p| &mut p.events);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Groups and events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
pub struct Group {
    header: EntityHeader,
    pub owner: Option<Friend>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f32>,
    pub longitude: Option<f32>,
    pub privacy: Option<String>,
    pub updated_time: Option<DateTime<Utc>>,
}

impl GraphEntity for Group {
    const TYPE_TAG: Option<&'static str> = Some("group");
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("owner", |g| &mut g.owner)
            .string("name", |g| &mut g.name)
            .string("description", |g| &mut g.description)
            .string("link", |g| &mut g.link)
            .string("venue/street", |g| &mut g.street)
            .string("venue/city", |g| &mut g.city)
            .string("venue/state", |g| &mut g.state)
            .string("venue/zip", |g| &mut g.zip)
            .string("venue/country", |g| &mut g.country)
            .nullable("venue/latitude", |g| &mut g.latitude)
            .nullable("venue/longitude", |g| &mut g.longitude)
            .string("privacy", |g| &mut g.privacy)
            .nullable_datetime("updated_time", |g| &mut g.updated_time);
    }
}

/// An event. The API sends no type tag for events, so they are only reached
/// through typed requests and connections.
#[derive(Debug, Default, PartialEq)]
pub struct Event {
    header: EntityHeader,
    pub owner: Option<Friend>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f32>,
    pub longitude: Option<f32>,
    pub privacy: Option<String>,
    pub updated_time: DateTime<Utc>,
    pub picture: Option<String>,
    pub feed: Option<Connection<Post>>,
    pub invited: Option<Connection<Friend>>,
    pub attending: Option<Connection<Friend>>,
    pub maybe: Option<Connection<Friend>>,
    pub noreply: Option<Connection<Friend>>,
    pub declined: Option<Connection<Friend>>,
}

impl GraphEntity for Event {
    fbg_core::entity_header!(header);

    fn describe(schema: &mut EntitySchema<Self>) {
        schema
            .nested("owner", |e| &mut e.owner)
            .string("name", |e| &mut e.name)
            .string("description", |e| &mut e.description)
            .datetime_or_default("start_time", |e| &mut e.start_time)
            .datetime_or_default("end_time", |e| &mut e.end_time)
            .string("location", |e| &mut e.location)
            .string("venue/street", |e| &mut e.street)
            .string("venue/city", |e| &mut e.city)
            .string("venue/state", |e| &mut e.state)
            .string("venue/zip", |e| &mut e.zip)
            .string("venue/country", |e| &mut e.country)
            .nullable("venue/latitude", |e| &mut e.latitude)
            .nullable("venue/longitude", |e| &mut e.longitude)
            .string("privacy", |e| &mut e.privacy)
            .datetime_or_default("updated_time", |e| &mut e.updated_time)
            .string("metadata/connection/picture", |e| &mut e.picture)
            .connection("feed", |e| &mut e.feed)
            .connection("invited", |e| &mut e.invited)
            .connection("attending", |e| &mut e.attending)
            .connection("maybe", |e| &mut e.maybe)
            .connection("noreply", |e| &mut e.noreply)
            .connection("declined", |e| &mut e.declined);
    }
}
