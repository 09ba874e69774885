//! Section, subsection and media editing

use clap::{Args, Subcommand, ValueEnum};
use homebook_core::model::{MediaKind, MediaParent, SubsectionText};
use homebook_engine::commands::edit::{self, NewMedia};

use super::{print_json, CliResult, Context, LogViewNotifier};

#[derive(Debug, Args)]
pub struct ContentArgs {
    /// Book the edited content belongs to
    #[arg(long)]
    pub book: String,

    #[command(subcommand)]
    pub command: ContentCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    fn visible(self) -> bool {
        matches!(self, Visibility::Shown)
    }
}

#[derive(Debug, Subcommand)]
pub enum ContentCommand {
    AddSection {
        title: String,
    },
    RenameSection {
        section_id: String,
        title: String,
    },
    SectionVisibility {
        section_id: String,
        #[arg(value_enum)]
        visibility: Visibility,
    },
    /// Full new order of the book's sections
    ReorderSections {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    DeleteSection {
        section_id: String,
    },
    AddSubsection {
        section_id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    EditSubsection {
        subsection_id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    SubsectionVisibility {
        subsection_id: String,
        #[arg(value_enum)]
        visibility: Visibility,
    },
    /// Full new order of one section's subsections
    ReorderSubsections {
        section_id: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    DeleteSubsection {
        subsection_id: String,
    },
    /// Attach media to exactly one of --section or --subsection
    AddMedia {
        #[arg(long, conflicts_with = "subsection", required_unless_present = "subsection")]
        section: Option<String>,
        #[arg(long)]
        subsection: Option<String>,
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "image")]
        kind: String,
        #[arg(long)]
        description: Option<String>,
    },
    DescribeMedia {
        media_id: String,
        /// Omit to clear the description
        description: Option<String>,
    },
    RemoveMedia {
        media_id: String,
    },
    /// Full new order of the media under one parent
    ReorderMedia {
        #[arg(long, conflicts_with = "subsection", required_unless_present = "subsection")]
        section: Option<String>,
        #[arg(long)]
        subsection: Option<String>,
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn parent_of(section: Option<String>, subsection: Option<String>) -> CliResult<MediaParent> {
    match (section, subsection) {
        (Some(id), None) => Ok(MediaParent::Section(id)),
        (None, Some(id)) => Ok(MediaParent::Subsection(id)),
        _ => Err("Specify exactly one of --section or --subsection".into()),
    }
}

pub fn execute(args: ContentArgs, ctx: &mut Context) -> CliResult {
    let caller = ctx.caller()?.to_string();
    let book = args.book;
    let conn = &mut ctx.conn;
    let n = &LogViewNotifier;

    match args.command {
        ContentCommand::AddSection { title } => {
            print_json(&edit::add_section(&caller, &book, &title, n, conn)?)?
        }
        ContentCommand::RenameSection { section_id, title } => {
            edit::rename_section(&caller, &book, &section_id, &title, n, conn)?
        }
        ContentCommand::SectionVisibility {
            section_id,
            visibility,
        } => edit::set_section_visibility(&caller, &book, &section_id, visibility.visible(), n, conn)?,
        ContentCommand::ReorderSections { ids } => edit::reorder_sections(&caller, &book, &ids, n, conn)?,
        ContentCommand::DeleteSection { section_id } => {
            edit::delete_section(&caller, &book, &section_id, n, conn)?
        }
        ContentCommand::AddSubsection {
            section_id,
            title,
            body,
        } => {
            let text = SubsectionText::new(title, body);
            print_json(&edit::add_subsection(&caller, &book, &section_id, &text, n, conn)?)?
        }
        ContentCommand::EditSubsection {
            subsection_id,
            title,
            body,
        } => {
            let text = SubsectionText::new(title, body);
            edit::update_subsection_text(&caller, &book, &subsection_id, &text, n, conn)?
        }
        ContentCommand::SubsectionVisibility {
            subsection_id,
            visibility,
        } => edit::set_subsection_visibility(
            &caller,
            &book,
            &subsection_id,
            visibility.visible(),
            n,
            conn,
        )?,
        ContentCommand::ReorderSubsections { section_id, ids } => {
            edit::reorder_subsections(&caller, &book, &section_id, &ids, n, conn)?
        }
        ContentCommand::DeleteSubsection { subsection_id } => {
            edit::delete_subsection(&caller, &book, &subsection_id, n, conn)?
        }
        ContentCommand::AddMedia {
            section,
            subsection,
            url,
            kind,
            description,
        } => {
            let media = NewMedia {
                parent: parent_of(section, subsection)?,
                url,
                kind: MediaKind::parse(&kind)?,
                description,
            };
            print_json(&edit::add_media(&caller, &book, media, n, conn)?)?
        }
        ContentCommand::DescribeMedia {
            media_id,
            description,
        } => edit::update_media_description(&caller, &book, &media_id, description.as_deref(), n, conn)?,
        ContentCommand::RemoveMedia { media_id } => edit::remove_media(&caller, &book, &media_id, n, conn)?,
        ContentCommand::ReorderMedia {
            section,
            subsection,
            ids,
        } => {
            let parent = parent_of(section, subsection)?;
            edit::reorder_media(&caller, &book, &parent, &ids, n, conn)?
        }
    }
    Ok(())
}
