use homebook_core::model::{
    Book, MediaAttachment, MediaKind, MediaParent, Property, Section, Subsection, SubsectionText,
};
use homebook_store::{db, migrations, SqliteRepo};
use rusqlite::Connection;
use uuid::Uuid;

/// Migrated in-memory database
#[allow(dead_code)]
pub fn setup_db() -> Connection {
    let mut conn = db::open_in_memory().expect("open in-memory db");
    migrations::apply_migrations(&mut conn).expect("apply migrations");
    conn
}

/// Insert a property and a draft book; returns the book id
#[allow(dead_code)]
pub fn seed_book(conn: &Connection, owner: &str, title: &str) -> String {
    let property_id = Uuid::now_v7().to_string();
    let mut property = Property::new(property_id.clone(), owner.to_string(), "Villa Rosa".into());
    property.main_image_url = Some("https://cdn.example/cover.jpg".into());
    SqliteRepo::insert_property(conn, &property).unwrap();

    let book_id = Uuid::now_v7().to_string();
    let mut book = Book::new(book_id.clone(), property_id, title.into(), "classico".into());
    book.public_slug = Some(book_id.replace('-', "")[..10].to_string());
    SqliteRepo::insert_book(conn, &book).unwrap();
    book_id
}

#[allow(dead_code)]
pub fn add_section(conn: &Connection, book_id: &str, title: &str, ordinal: i64) -> String {
    let id = Uuid::now_v7().to_string();
    let section = Section::new(id.clone(), book_id.into(), title.into(), ordinal);
    SqliteRepo::insert_section(conn, &section).unwrap();
    id
}

#[allow(dead_code)]
pub fn add_subsection(conn: &Connection, section_id: &str, title: &str, body: &str) -> String {
    let id = Uuid::now_v7().to_string();
    let sub = Subsection::new(
        id.clone(),
        section_id.into(),
        SubsectionText::new(title, body).pack(),
        None,
    );
    SqliteRepo::insert_subsection(conn, &sub).unwrap();
    id
}

#[allow(dead_code)]
pub fn add_image(conn: &Connection, parent: MediaParent, url: &str, ordinal: i64) -> String {
    let id = Uuid::now_v7().to_string();
    let mut item = MediaAttachment::new(id.clone(), parent, url.into(), MediaKind::Image);
    item.ordinal = Some(ordinal);
    SqliteRepo::insert_media(conn, &item).unwrap();
    id
}
