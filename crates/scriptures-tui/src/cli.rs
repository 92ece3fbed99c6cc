use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use scriptures_core::{
    HttpScriptureApi, Scripture, ScriptureApi, ScriptureSearch, ScriptureStore,
};

#[derive(Parser, Debug)]
#[command(name = "fast-scriptures", version)]
#[command(about = "Read and search the scriptures from a Fast Scriptures server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the scripture API (overrides FAST_SCRIPTURES_API_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Without a subcommand the terminal reader starts.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List volumes
    Volumes,
    /// List the books of a volume
    Books {
        volume_id: i64,
    },
    /// List the chapters of a book
    Chapters {
        book_id: i64,
    },
    /// Print the verses of a chapter
    Read {
        chapter_id: i64,
    },
    /// Keyword search
    Search {
        query: String,
        /// Maximum number of results (1-100)
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(long, default_value = "0")]
        offset: u32,
        /// Restrict to one volume by short title, e.g. NT
        #[arg(long, value_name = "SHORT_TITLE")]
        volume: Option<String>,
    },
    /// Look up a reference such as "1 Nephi" 3 7
    Reference {
        book: String,
        chapter: i32,
        verse: Option<i32>,
    },
    /// Print a random verse
    Random,
    /// Check that the server is reachable
    Health,
}

/// Run a one-shot subcommand and print plain text to stdout.
pub async fn run(command: Command, api: &HttpScriptureApi, search_limit: u32) -> Result<()> {
    let mut store = ScriptureStore::new();

    match command {
        Command::Volumes => {
            store.fetch_volumes(api).await;
            check(&store)?;
            for volume in store.volumes() {
                println!(
                    "{:>4}  {:<6} {}",
                    volume.id, volume.volume_short_title, volume.volume_title
                );
            }
        }
        Command::Books { volume_id } => {
            store.fetch_books_by_volume(api, volume_id).await;
            check(&store)?;
            for book in store.books() {
                println!("{:>4}  {}", book.id, book.book_title);
            }
        }
        Command::Chapters { book_id } => {
            store.fetch_chapters_by_book(api, book_id).await;
            check(&store)?;
            for chapter in store.chapters() {
                println!("{:>6}  Chapter {}", chapter.id, chapter.chapter_number);
            }
        }
        Command::Read { chapter_id } => {
            store.fetch_verses_by_chapter(api, chapter_id).await;
            check(&store)?;
            for verse in store.verses() {
                println!("{:>3}  {}", verse.verse_number, verse.scripture_text);
            }
        }
        Command::Search {
            query,
            limit,
            offset,
            volume,
        } => {
            let volume_id = match volume {
                Some(short_title) => {
                    store.fetch_volumes(api).await;
                    check(&store)?;
                    let volume = store
                        .volume_by_short_title(&short_title)
                        .ok_or_else(|| anyhow!("Unknown volume: {}", short_title))?;
                    Some(volume.id)
                }
                None => None,
            };
            let search = ScriptureSearch::new(query)
                .with_page(limit.unwrap_or(search_limit), offset)
                .with_volume(volume_id);
            store.search_scriptures(api, search).await;
            check(&store)?;

            if let Some(results) = store.search_results() {
                for scripture in &results.scriptures {
                    println!("{}", format_scripture(scripture));
                }
                println!(
                    "\n{} of {} results",
                    results.scriptures.len(),
                    results.total
                );
            }
            let counts: Vec<String> = store
                .volume_counts()
                .iter()
                .map(|c| format!("{} {}", c.volume, c.count))
                .collect();
            if !counts.is_empty() {
                println!("{}", counts.join(" | "));
            }
        }
        Command::Reference {
            book,
            chapter,
            verse,
        } => {
            let scriptures = store
                .get_scripture_by_reference(api, &book, chapter, verse)
                .await;
            check(&store)?;
            if scriptures.is_empty() {
                println!("No verses found");
            }
            for scripture in &scriptures {
                println!("{}", format_scripture(scripture));
            }
        }
        Command::Random => {
            let scripture = store.get_random_scripture(api).await;
            check(&store)?;
            if let Some(scripture) = scripture {
                println!("{}", format_scripture(&scripture));
            }
        }
        Command::Health => {
            let health = api.health_check().await?;
            println!("{}: {}", api.base_url(), health.status);
        }
    }

    Ok(())
}

fn check(store: &ScriptureStore) -> Result<()> {
    match store.error() {
        Some(message) => bail!("{}", message),
        None => Ok(()),
    }
}

pub fn format_scripture(scripture: &Scripture) -> String {
    format!("{}  {}", scripture.verse_title, scripture.scripture_text)
}
