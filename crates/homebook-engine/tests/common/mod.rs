use homebook_core::model::{MediaParent, SubsectionText};
use homebook_core::notifier::NoopViewNotifier;
use homebook_core::snapshot::PropertyFields;
use homebook_engine::commands::{book, edit};
use homebook_store::{db, migrations, SqliteRepo};
use rusqlite::Connection;

#[allow(dead_code)]
pub const OWNER: &str = "user-owner";
#[allow(dead_code)]
pub const STRANGER: &str = "user-stranger";

/// Migrated in-memory database
#[allow(dead_code)]
pub fn setup_db() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    migrations::apply_migrations(&mut conn).unwrap();
    conn
}

/// Migrated on-disk database, for tests that need several connections
#[allow(dead_code)]
pub fn setup_file_db(path: &std::path::Path) -> Connection {
    let mut conn = db::open(path).unwrap();
    migrations::apply_migrations(&mut conn).unwrap();
    conn
}

#[allow(dead_code)]
pub fn property_named(name: &str) -> PropertyFields {
    PropertyFields {
        name: name.to_string(),
        address: None,
        main_image_url: None,
        short_description: None,
    }
}

/// A property with a cover image and a draft book with no sections
#[allow(dead_code)]
pub fn empty_book(conn: &mut Connection, title: &str) -> String {
    let fields = PropertyFields {
        main_image_url: Some("https://cdn.example/cover.jpg".to_string()),
        ..property_named("Villa Rosa")
    };
    let property = book::create_property(conn, OWNER, &fields).unwrap();
    let created = book::create_book(conn, OWNER, &property.id, title, None).unwrap();
    for section in SqliteRepo::list_sections(conn, &created.id).unwrap() {
        SqliteRepo::delete_section(conn, &section.id).unwrap();
    }
    created.id
}

#[allow(dead_code)]
pub fn section(conn: &mut Connection, book_id: &str, title: &str) -> String {
    edit::add_section(OWNER, book_id, title, &NoopViewNotifier, conn)
        .unwrap()
        .id
}

#[allow(dead_code)]
pub fn subsection(conn: &mut Connection, book_id: &str, section_id: &str, title: &str, body: &str) -> String {
    edit::add_subsection(
        OWNER,
        book_id,
        section_id,
        &SubsectionText::new(title, body),
        &NoopViewNotifier,
        conn,
    )
    .unwrap()
    .id
}

#[allow(dead_code)]
pub fn image(conn: &mut Connection, book_id: &str, parent: MediaParent, url: &str) -> String {
    edit::add_media(
        OWNER,
        book_id,
        edit::NewMedia {
            parent,
            url: url.to_string(),
            kind: homebook_core::model::MediaKind::Image,
            description: None,
        },
        &NoopViewNotifier,
        conn,
    )
    .unwrap()
    .id
}

/// The "Rules" book: one section, two subsections, an image on "Smoking"
#[allow(dead_code)]
pub struct RulesBook {
    pub book_id: String,
    pub rules: String,
    pub smoking: String,
    pub quiet_hours: String,
    pub image: String,
}

#[allow(dead_code)]
pub fn rules_book(conn: &mut Connection) -> RulesBook {
    let book_id = empty_book(conn, "Casa Mare");
    let rules = section(conn, &book_id, "Rules");
    let smoking = subsection(conn, &book_id, &rules, "Smoking", "Not allowed anywhere inside.");
    let quiet_hours = subsection(conn, &book_id, &rules, "Quiet hours", "22:00 to 08:00, please.");
    let image = image(
        conn,
        &book_id,
        MediaParent::Subsection(smoking.clone()),
        "storage://homebook-media/no-smoking.jpg",
    );
    RulesBook {
        book_id,
        rules,
        smoking,
        quiet_hours,
        image,
    }
}

/// Structural view of the live tree with ids stripped
///
/// Each section is (title, visible, subsections); each subsection is
/// (content, media urls).
#[allow(dead_code)]
pub fn tree_shape(conn: &Connection, book_id: &str) -> Vec<(String, bool, Vec<(String, Vec<String>)>)> {
    SqliteRepo::list_sections(conn, book_id)
        .unwrap()
        .into_iter()
        .map(|s| {
            let subs = SqliteRepo::list_subsections(conn, &s.id)
                .unwrap()
                .into_iter()
                .map(|sub| {
                    let urls = SqliteRepo::list_media_for_parent(conn, &MediaParent::Subsection(sub.id.clone()))
                        .unwrap()
                        .into_iter()
                        .map(|m| m.url)
                        .collect();
                    (sub.content_text, urls)
                })
                .collect();
            (s.title.clone(), s.is_visible(), subs)
        })
        .collect()
}

#[allow(dead_code)]
pub fn is_published(conn: &Connection, book_id: &str) -> bool {
    SqliteRepo::get_book(conn, book_id)
        .unwrap()
        .unwrap()
        .is_published()
}
