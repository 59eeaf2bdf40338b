//! # DaDaPlace
//!
//! Command-line entry point: wardrobe commands over a local database, plus
//! `serve` for the HTTP API.

use clap::{Parser, Subcommand};
use dadaplace::api::run_server;
use dadaplace::cli::{
    CliResult, ItemEdit, ListFilter, NewItem, PostDraft, ProfileEdit, cmd_add, cmd_collect,
    cmd_comment, cmd_edit, cmd_export, cmd_favorite, cmd_feed, cmd_gaps, cmd_import,
    cmd_import_items, cmd_init, cmd_like, cmd_list, cmd_look_delete, cmd_look_list, cmd_look_save,
    cmd_look_show, cmd_post, cmd_profile_set, cmd_profile_show, cmd_recommend, cmd_remove,
    cmd_retract, cmd_score, cmd_share, cmd_show, cmd_status, cmd_worn, load_or_create_wardrobe,
};
use dadaplace::config::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RATE_LIMIT, ServerConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dadaplace")]
#[command(author, version, about = "DaDaPlace - wardrobe catalog and outfit recommendations")]
struct Cli {
    /// Database path (snapshot file or redb file).
    #[arg(long, short = 'D', global = true, default_value = "dadaplace.db")]
    database: PathBuf,

    /// Storage backend: file or redb.
    #[arg(long, short = 'B', global = true, default_value = "file")]
    backend: String,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty database.
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Show catalog statistics.
    Status,
    /// Add a clothing item.
    Add {
        /// Kind of item, e.g. "hoodie".
        sub_category: String,
        #[arg(long, short)]
        category: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Seasons, repeatable or comma-separated.
        #[arg(long = "season", short)]
        seasons: Vec<String>,
        /// Occasions, repeatable or comma-separated.
        #[arg(long = "occasion", short)]
        occasions: Vec<String>,
        #[arg(long, default_value_t = 0)]
        volume: u32,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        price_cents: Option<u64>,
        /// Photo of the item; fills category and color when not given.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Add items from a JSON array.
    ImportItems { input: PathBuf },
    /// List items, optionally filtered.
    List {
        #[arg(long, short)]
        keyword: Option<String>,
        #[arg(long, short)]
        category: Option<String>,
        #[arg(long, short)]
        season: Option<String>,
        #[arg(long, short)]
        occasion: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        favorites: bool,
    },
    /// Show one item.
    Show { id: u64 },
    /// Change fields of an item.
    Edit {
        id: u64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        sub_category: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long = "season", num_args = 1..)]
        seasons: Option<Vec<String>>,
        #[arg(long = "occasion", num_args = 1..)]
        occasions: Option<Vec<String>>,
        #[arg(long)]
        volume: Option<u32>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        price_cents: Option<u64>,
    },
    /// Delete an item.
    Remove { id: u64 },
    /// Toggle the favorite flag of an item.
    Favorite { id: u64 },
    /// Record that an item was worn.
    Worn { id: u64 },
    /// Recommend outfits for today's weather and occasion.
    Recommend {
        /// Temperature in °C.
        #[arg(long, short, allow_hyphen_values = true)]
        temperature: i32,
        #[arg(long, short, default_value = "casual")]
        occasion: String,
        /// Build every look around this item.
        #[arg(long)]
        from: Option<u64>,
        #[arg(long)]
        style: Option<String>,
        /// Save the generated looks.
        #[arg(long)]
        save: bool,
    },
    /// Find missing pieces in the wardrobe.
    Gaps {
        #[arg(long, short, allow_hyphen_values = true, default_value_t = 20)]
        temperature: i32,
        #[arg(long, short, default_value = "casual")]
        occasion: String,
    },
    /// Score an arbitrary set of items.
    Score {
        #[arg(required = true)]
        items: Vec<u64>,
        #[arg(long, short, allow_hyphen_values = true)]
        temperature: i32,
        #[arg(long, short, default_value = "casual")]
        occasion: String,
    },
    /// Saved looks.
    Look {
        #[command(subcommand)]
        action: LookCommand,
    },
    /// Publish a post to the community feed.
    Post {
        content: String,
        #[arg(long = "topic")]
        topics: Vec<String>,
        #[arg(long = "image")]
        images: Vec<String>,
        #[arg(long)]
        look: Option<u64>,
        #[arg(long = "tag")]
        tags: Vec<u64>,
    },
    /// Like a post.
    Like { id: u64 },
    /// Save a post to your collection.
    Collect { id: u64 },
    /// Count a share of a post.
    Share { id: u64 },
    /// Take a post out of the feed.
    Hide { id: u64 },
    /// Delete a post. Its comments are kept.
    DeletePost { id: u64 },
    /// Comment on a post.
    Comment {
        post_id: u64,
        content: String,
        #[arg(long)]
        reply_to: Option<u64>,
    },
    /// Show the community feed.
    Feed {
        /// latest, mixed or following.
        #[arg(long, default_value = "mixed")]
        order: String,
        /// Followed user ids for `following`.
        #[arg(long)]
        follow: Vec<u64>,
        #[arg(long)]
        search: Option<String>,
        /// Print comments under each post.
        #[arg(long)]
        comments: bool,
    },
    /// The local user's profile.
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// Export the database as a snapshot.
    Export {
        output: PathBuf,
        #[arg(long, short, default_value = "binary")]
        format: String,
    },
    /// Import a snapshot into an empty database.
    Import {
        input: PathBuf,
        #[arg(long, short, default_value = "binary")]
        format: String,
    },
    /// Serve the HTTP API.
    Serve {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, short, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Required key for every route except /health.
        #[arg(long)]
        api_key: Option<String>,
        /// Allow cross-origin requests from anywhere.
        #[arg(long)]
        cors_any: bool,
        /// Requests per second; 0 disables the limit.
        #[arg(long, default_value_t = DEFAULT_RATE_LIMIT)]
        rate_limit: u32,
    },
}

#[derive(Subcommand, Debug)]
enum LookCommand {
    /// Save a look from item ids.
    Save {
        name: String,
        #[arg(required = true)]
        items: Vec<u64>,
        #[arg(long, short)]
        occasion: Option<String>,
        #[arg(long)]
        public: bool,
    },
    List,
    Show { id: u64 },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    Set {
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        height_cm: Option<u32>,
        #[arg(long)]
        weight_grams: Option<u32>,
        #[arg(long)]
        skin_tone: Option<String>,
        #[arg(long)]
        style: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn serve(db: &Path, backend: &str, config: ServerConfig) -> CliResult<()> {
    let wardrobe = load_or_create_wardrobe(db, backend)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_server(config, wardrobe, db.to_path_buf()))
}

fn run(cli: Cli) -> CliResult<()> {
    let db = cli.database.as_path();
    let backend = cli.backend.as_str();
    let json = cli.json;

    match cli.command {
        Command::Init { force } => cmd_init(db, backend, force),
        Command::Status => cmd_status(db, backend, json),
        Command::Add {
            sub_category,
            category,
            color,
            seasons,
            occasions,
            volume,
            brand,
            note,
            price_cents,
            image,
        } => cmd_add(
            db,
            backend,
            json,
            NewItem {
                category,
                sub_category,
                color,
                seasons,
                occasions,
                volume,
                brand,
                note,
                price_cents,
                image,
            },
        ),
        Command::ImportItems { input } => cmd_import_items(db, backend, json, &input),
        Command::List {
            keyword,
            category,
            season,
            occasion,
            color,
            favorites,
        } => cmd_list(
            db,
            backend,
            json,
            &ListFilter {
                keyword,
                category,
                season,
                occasion,
                color,
                favorites,
            },
        ),
        Command::Show { id } => cmd_show(db, backend, json, id),
        Command::Edit {
            id,
            category,
            sub_category,
            color,
            seasons,
            occasions,
            volume,
            brand,
            note,
            price_cents,
        } => cmd_edit(
            db,
            backend,
            json,
            id,
            ItemEdit {
                category,
                sub_category,
                color,
                seasons,
                occasions,
                volume,
                brand,
                note,
                price_cents,
            },
        ),
        Command::Remove { id } => cmd_remove(db, backend, json, id),
        Command::Favorite { id } => cmd_favorite(db, backend, json, id),
        Command::Worn { id } => cmd_worn(db, backend, json, id),
        Command::Recommend {
            temperature,
            occasion,
            from,
            style,
            save,
        } => cmd_recommend(
            db,
            backend,
            json,
            temperature,
            &occasion,
            from,
            style.as_deref(),
            save,
        ),
        Command::Gaps {
            temperature,
            occasion,
        } => cmd_gaps(db, backend, json, temperature, &occasion),
        Command::Score {
            items,
            temperature,
            occasion,
        } => cmd_score(db, backend, json, &items, temperature, &occasion),
        Command::Look { action } => match action {
            LookCommand::Save {
                name,
                items,
                occasion,
                public,
            } => cmd_look_save(
                db,
                backend,
                json,
                &name,
                &items,
                occasion.as_deref(),
                public,
            ),
            LookCommand::List => cmd_look_list(db, backend, json),
            LookCommand::Show { id } => cmd_look_show(db, backend, json, id),
            LookCommand::Delete { id } => cmd_look_delete(db, backend, json, id),
        },
        Command::Post {
            content,
            topics,
            images,
            look,
            tags,
        } => cmd_post(
            db,
            backend,
            json,
            PostDraft {
                content,
                topics,
                images,
                look,
                tags,
            },
        ),
        Command::Like { id } => cmd_like(db, backend, json, id),
        Command::Collect { id } => cmd_collect(db, backend, json, id),
        Command::Share { id } => cmd_share(db, backend, json, id),
        Command::Hide { id } => cmd_retract(db, backend, json, id, false),
        Command::DeletePost { id } => cmd_retract(db, backend, json, id, true),
        Command::Comment {
            post_id,
            content,
            reply_to,
        } => cmd_comment(db, backend, json, post_id, &content, reply_to),
        Command::Feed {
            order,
            follow,
            search,
            comments,
        } => cmd_feed(
            db,
            backend,
            json,
            &order,
            &follow,
            search.as_deref(),
            comments,
        ),
        Command::Profile { action } => match action {
            ProfileCommand::Show => cmd_profile_show(db, backend, json),
            ProfileCommand::Set {
                nickname,
                avatar,
                gender,
                height_cm,
                weight_grams,
                skin_tone,
                style,
            } => cmd_profile_set(
                db,
                backend,
                json,
                ProfileEdit {
                    nickname,
                    avatar,
                    gender,
                    height_cm,
                    weight_grams,
                    skin_tone,
                    style,
                },
            ),
        },
        Command::Export { output, format } => cmd_export(db, backend, &output, &format),
        Command::Import { input, format } => cmd_import(db, backend, &input, &format),
        Command::Serve {
            host,
            port,
            api_key,
            cors_any,
            rate_limit,
        } => {
            let config = ServerConfig::new(host, port)
                .with_api_key(api_key)
                .with_env_api_key()
                .with_cors_any(cors_any)
                .with_rate_limit(rate_limit);
            serve(db, backend, config)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
