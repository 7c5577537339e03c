use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "divar-scout")]
#[command(about = "Collects real-estate ads from divar.ir", long_about = None)]
pub struct Cli {
    /// TOML file overriding the built-in scraper settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the .url and .json files
    #[arg(long, default_value = "data", global = true)]
    pub data_dir: PathBuf,

    #[arg(long, default_value = "isfahan", global = true)]
    pub city: String,

    #[arg(long, default_value = "real-estate", global = true)]
    pub category: String,

    /// Persian calendar date stamp (yyyymmdd) of the files to use; defaults to today
    #[arg(long, global = true)]
    pub stamp: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scroll the listing page and save the post links
    Crawl {
        /// Maximum number of scroll iterations
        #[arg(short, long, default_value_t = 1)]
        max_pages: usize,

        /// Stop once listings show this relative date
        #[arg(short, long, default_value = "دیروز")]
        until: String,

        /// Print the links instead of writing the .url file
        #[arg(long)]
        no_save: bool,
    },
    /// Scrape detail pages for a range of saved links
    Harvest {
        /// First index of the range
        #[arg(short, long, default_value_t = 0)]
        from: usize,

        /// End of the range, exclusive; defaults to the end of the list
        #[arg(short, long)]
        to: Option<usize>,

        /// Also rewrite the result store after every N posts
        #[arg(long)]
        checkpoint_every: Option<usize>,
    },
}
