//! Property and book commands

use clap::{Args, Subcommand};
use homebook_core::snapshot::PropertyFields;
use homebook_engine::commands::book;
use homebook_engine::commands::edit::{self, BookDetailsUpdate};

use super::{print_json, CliResult, Context, LogViewNotifier};

#[derive(Debug, Args)]
pub struct PropertyArgs {
    #[command(subcommand)]
    pub command: PropertyCommand,
}

#[derive(Debug, Subcommand)]
pub enum PropertyCommand {
    /// Create a property owned by the acting user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
        /// Cover image url or storage key
        #[arg(long)]
        cover: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
}

pub fn execute_property(args: PropertyArgs, ctx: &mut Context) -> CliResult {
    match args.command {
        PropertyCommand::Create {
            name,
            address,
            cover,
            description,
        } => {
            let caller = ctx.caller()?.to_string();
            let fields = PropertyFields {
                name,
                address,
                main_image_url: cover,
                short_description: description,
            };
            let property = book::create_property(&ctx.conn, &caller, &fields)?;
            print_json(&property)
        }
    }
}

#[derive(Debug, Args)]
pub struct BookArgs {
    #[command(subcommand)]
    pub command: BookCommand,
}

#[derive(Debug, Subcommand)]
pub enum BookCommand {
    /// Create a draft book seeded with the layout's default sections
    Create {
        #[arg(long)]
        property: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        layout: Option<String>,
    },
    /// List the acting user's books
    List,
    /// Print the nested content tree
    Show { book_id: String },
    /// Change title, layout or property display fields
    Update {
        book_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        layout: Option<String>,
        #[arg(long)]
        property_name: Option<String>,
        /// Empty string clears the address
        #[arg(long)]
        address: Option<String>,
        /// Empty string clears the cover image
        #[arg(long)]
        cover: Option<String>,
        /// Empty string clears the description
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a book, its content and its versions
    Delete { book_id: String },
    /// Advisory publish checklist
    Checklist { book_id: String },
    /// Stored versions, newest first
    Versions { book_id: String },
}

pub fn execute(args: BookArgs, ctx: &mut Context) -> CliResult {
    let caller = ctx.caller()?.to_string();
    match args.command {
        BookCommand::Create {
            property,
            title,
            layout,
        } => {
            let created =
                book::create_book(&mut ctx.conn, &caller, &property, &title, layout.as_deref())?;
            print_json(&created)
        }
        BookCommand::List => print_json(&book::list_books(&ctx.conn, &caller)?),
        BookCommand::Show { book_id } => print_json(&book::book_tree(&ctx.conn, &caller, &book_id)?),
        BookCommand::Update {
            book_id,
            title,
            layout,
            property_name,
            address,
            cover,
            description,
        } => {
            let update = BookDetailsUpdate {
                title,
                layout,
                property_name,
                address,
                main_image_url: cover,
                short_description: description,
            };
            edit::update_book_details(&caller, &book_id, &update, &LogViewNotifier, &mut ctx.conn)?;
            println!("Book updated: {book_id}");
            Ok(())
        }
        BookCommand::Delete { book_id } => {
            book::delete_book(&caller, &book_id, &LogViewNotifier, &mut ctx.conn)?;
            println!("Book deleted: {book_id}");
            Ok(())
        }
        BookCommand::Checklist { book_id } => {
            print_json(&book::checklist(&ctx.conn, &caller, &book_id)?)
        }
        BookCommand::Versions { book_id } => {
            print_json(&book::list_versions(&ctx.conn, &caller, &book_id)?)
        }
    }
}
