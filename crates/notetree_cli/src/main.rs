//! Command-line front end for the NoteTree client.
//!
//! # Responsibility
//! - Drive tree, feed and account actions against the remote API, or
//!   against a local SQLite store with `--local`.
//! - Print results as plain text; failures exit non-zero.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use notetree_core::{
    login, open_db, register, ClientConfig, ContentService, DragItem, DropTarget, Feed, FeedApi,
    FeedNote, FeedSort, FolderId, HttpClient, NoteId, Reaction, SqliteContentStore,
    StaticCredential, TreeRow, TreeView,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const LOCAL_TOKEN: &str = "local";
const PREVIEW_CHARS: usize = 80;

/// notetree - folder tree and feed client for the note server
#[derive(Parser, Debug)]
#[command(name = "notetree", version, about, long_about = None)]
struct Cli {
    /// Use a local SQLite database instead of the remote API
    #[arg(long, global = true)]
    local: Option<PathBuf>,

    /// Bearer token
    #[arg(long, env = "NOTETREE_TOKEN", global = true)]
    token: Option<String>,

    /// API base URL (defaults to NOTETREE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Tree(TreeCommand),

    /// List the public feed
    Feed(FeedArgs),

    /// Like a feed note (again to undo)
    Like(ReactArgs),

    /// Dislike a feed note (again to undo)
    Dislike(ReactArgs),

    /// Log in and print the session token
    Login { username: String, password: String },

    /// Create an account
    Register {
        username: String,
        email: String,
        password: String,
    },
}

#[derive(Subcommand, Debug)]
enum TreeCommand {
    /// Print the folder tree and unfiled notes
    Tree,

    /// Create a folder
    Mkdir {
        name: String,
        /// Parent folder; root when omitted
        #[arg(long)]
        parent: Option<FolderId>,
    },

    /// Create an empty note
    Note {
        heading: String,
        /// Containing folder; unfiled when omitted
        #[arg(long)]
        folder: Option<FolderId>,
    },

    /// Move a folder under another folder (root when --to is omitted)
    MvFolder {
        id: FolderId,
        #[arg(long)]
        to: Option<FolderId>,
    },

    /// Move a note into a folder (unfiled when --to is omitted)
    MvNote {
        id: NoteId,
        #[arg(long)]
        to: Option<FolderId>,
    },

    /// Delete a folder with everything inside it
    RmFolder { id: FolderId },

    /// Delete a note
    RmNote { id: NoteId },

    /// Toggle a note between private and public
    Privacy { id: NoteId },
}

#[derive(Args, Debug)]
struct FeedArgs {
    /// Search text; empty lists everything
    #[arg(long, default_value = "")]
    search: String,

    /// most-recent, least-recent, most-likes or least-likes
    #[arg(long, default_value = "most-recent")]
    sort: String,
}

#[derive(Args, Debug)]
struct ReactArgs {
    id: NoteId,
}

fn main() -> ExitCode {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_base_url(url)?;
    }
    start_logging(&config)?;

    let token = cli.token.clone();

    match cli.command {
        Command::Tree(command) => match cli.local.as_deref() {
            Some(path) => run_local(path, token.as_deref(), command),
            None => {
                let client = HttpClient::new(&config)?;
                let credentials = StaticCredential::from_token(token.as_deref());
                run_tree(TreeView::new(client, credentials), command)
            }
        },
        remote => {
            if cli.local.is_some() {
                bail!("this command needs the remote API; drop --local");
            }
            let client = HttpClient::new(&config)?;
            run_remote(&client, token.as_deref(), remote)
        }
    }
}

fn start_logging(config: &ClientConfig) -> Result<()> {
    let Some(dir) = config.log_dir.as_deref() else {
        return Ok(());
    };
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("resolving log directory")?
            .join(dir)
    };
    notetree_core::init_logging(&config.log_level, &dir.to_string_lossy()).map_err(|err| anyhow!(err))
}

fn run_local(path: &Path, token: Option<&str>, command: TreeCommand) -> Result<()> {
    let conn = open_db(path).with_context(|| format!("opening {}", path.display()))?;
    let store = SqliteContentStore::try_new(&conn)?;
    // The local store is single-user; any credential is accepted.
    let credentials = StaticCredential::from_token(Some(token.unwrap_or(LOCAL_TOKEN)));
    info!("event=cli_start module=cli status=ok backend=sqlite");
    run_tree(TreeView::new(store, credentials), command)
}

fn run_tree<S: ContentService>(
    mut view: TreeView<S, StaticCredential>,
    command: TreeCommand,
) -> Result<()> {
    view.refresh()?;
    match command {
        TreeCommand::Tree => {}
        TreeCommand::Mkdir { name, parent } => {
            select_parent(&mut view, parent)?;
            view.create_folder(&name)?;
        }
        TreeCommand::Note { heading, folder } => {
            select_parent(&mut view, folder)?;
            view.create_note(&heading)?;
        }
        TreeCommand::MvFolder { id, to } => {
            view.attempt_move(DragItem::Folder(id), DropTarget::from(to))?;
        }
        TreeCommand::MvNote { id, to } => {
            view.attempt_move(DragItem::Note(id), DropTarget::from(to))?;
        }
        TreeCommand::RmFolder { id } => {
            if !view.select_folder(id) {
                bail!("no folder with id {id}");
            }
            view.delete_selected()?;
        }
        TreeCommand::RmNote { id } => {
            if !view.select_note(id) {
                bail!("no note with id {id}");
            }
            view.delete_selected()?;
        }
        TreeCommand::Privacy { id } => {
            if !view.select_note(id) {
                bail!("no note with id {id}");
            }
            let is_private = view.toggle_privacy()?;
            println!(
                "note {id} is now {}",
                if is_private { "private" } else { "public" }
            );
        }
    }
    print_tree(&view);
    Ok(())
}

fn select_parent<S: ContentService>(
    view: &mut TreeView<S, StaticCredential>,
    parent: Option<FolderId>,
) -> Result<()> {
    match parent {
        Some(id) if !view.select_folder(id) => bail!("no folder with id {id}"),
        Some(_) => Ok(()),
        None => {
            view.click_outside();
            Ok(())
        }
    }
}

fn print_tree<S: ContentService>(view: &TreeView<S, StaticCredential>) {
    let forest = view.forest();
    for row in view.visible_rows() {
        match row {
            TreeRow::Folder {
                id,
                depth,
                expanded,
                has_children,
            } => {
                let name = forest.folder(id).map_or("", |node| node.folder.name.as_str());
                let marker = match (has_children, expanded) {
                    (false, _) => " ",
                    (true, true) => "v",
                    (true, false) => ">",
                };
                println!("{}{marker} [{id}] {name}/", "  ".repeat(depth));
            }
            TreeRow::Note { id, depth } => {
                if let Some(note) = forest.note(id) {
                    println!("{}  ({id}) {}{}", "  ".repeat(depth), note.heading, lock(note.is_private));
                }
            }
        }
    }
    for note in forest.unfiled_notes() {
        println!("  ({}) {}{}", note.id, note.heading, lock(note.is_private));
    }
}

fn lock(is_private: bool) -> &'static str {
    if is_private {
        " [private]"
    } else {
        ""
    }
}

fn run_remote(client: &HttpClient, token: Option<&str>, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let session = login(client, &username, &password)?;
            println!("role={:?}", session.role);
            println!("token={}", session.credential.token());
            Ok(())
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            register(client, &username, &email, &password)?;
            println!("account {username} created");
            Ok(())
        }
        Command::Feed(args) => {
            let sort = FeedSort::parse(&args.sort)
                .ok_or_else(|| anyhow!("unknown sort order `{}`", args.sort))?;
            let mut feed = Feed::new(client.clone(), StaticCredential::from_token(token));
            feed.set_sort(sort);
            feed.load(&args.search)?;
            for note in feed.notes() {
                println!(
                    "({}) {} by {} [+{} -{}]",
                    note.id,
                    note.heading,
                    note.username.as_deref().unwrap_or(notetree_core::feed::UNKNOWN_AUTHOR),
                    note.likes_count,
                    note.dislikes_count
                );
                if let Some(preview) = note.preview(PREVIEW_CHARS) {
                    println!("    {preview}");
                }
            }
            Ok(())
        }
        Command::Like(args) => react(client, token, args.id, Reaction::Like),
        Command::Dislike(args) => react(client, token, args.id, Reaction::Dislike),
        Command::Tree(command) => bail!("unexpected tree command {command:?}"),
    }
}

fn react(client: &HttpClient, token: Option<&str>, id: NoteId, reaction: Reaction) -> Result<()> {
    let feed = Feed::new(client.clone(), StaticCredential::from_token(token));
    let note = apply_reaction(feed, id, reaction)?;
    println!(
        "note {id}: +{} -{} liked={} disliked={}",
        note.likes_count, note.dislikes_count, note.is_liked, note.is_disliked
    );
    Ok(())
}

/// Loads the feed, sends `reaction` for note `id` and returns its updated entry.
fn apply_reaction<A: FeedApi>(
    mut feed: Feed<A, StaticCredential>,
    id: NoteId,
    reaction: Reaction,
) -> Result<FeedNote> {
    feed.load("")?;
    match reaction {
        Reaction::Like => feed.like(id)?,
        Reaction::Dislike => feed.dislike(id)?,
    }
    feed.notes()
        .into_iter()
        .find(|note| note.id == id)
        .ok_or_else(|| anyhow!("note {id} left the feed"))
}
