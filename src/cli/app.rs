use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "innoisp")]
#[command(about = "Offline InnoDB tablespace (.ibd) inspector")]
#[command(version)]
pub struct Cli {
    /// Control colored output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Overview of every page in the tablespace file
    Overview {
        /// Path to InnoDB data file (.ibd)
        #[arg(short, long)]
        file: String,

        /// Display a specific page number
        #[arg(short, long)]
        page: Option<u64>,

        /// Show file header, page header, trailer, and raw directory slots
        #[arg(short, long)]
        verbose: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the directory slots of index pages
    Dslots {
        /// Path to InnoDB data file (.ibd)
        #[arg(short, long)]
        file: String,

        /// Display a specific page number
        #[arg(short, long)]
        page: Option<u64>,

        /// Show the record run each slot owns
        #[arg(short, long)]
        recorders: bool,

        /// Primary key size in bytes
        #[arg(short = 'k', long = "pksize", default_value = "8")]
        pksize: usize,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show table space extent and segment information
    Space {
        /// Path to InnoDB data file (.ibd)
        #[arg(short, long)]
        file: String,

        /// Show a single extent descriptor
        #[arg(short, long)]
        extend: Option<usize>,

        /// Show the per-page free/used state of each extent
        #[arg(short = 'p', long = "pstate")]
        pstate: bool,

        /// Show unused extents too
        #[arg(short, long)]
        unused: bool,

        /// Show the extent descriptor list node
        #[arg(short, long)]
        list: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show file segment inode information
    Inode {
        /// Path to InnoDB data file (.ibd)
        #[arg(short, long)]
        file: String,

        /// Show unused inode entries too
        #[arg(short, long)]
        unused: bool,

        /// Show the fragment array of each inode
        #[arg(short = 'r', long = "fragment")]
        fragment: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Search a primary key in the clustered index
    Search {
        /// Path to InnoDB data file (.ibd)
        #[arg(short, long)]
        file: String,

        /// Primary key to look up (non-negative integer)
        #[arg(short, long)]
        key: u64,

        /// Primary key size in bytes
        #[arg(short = 'p', long = "pksize", default_value = "8")]
        pksize: usize,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}
