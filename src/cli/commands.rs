use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cellar", about = concat!("cellar v", env!("CARGO_PKG_VERSION"), " - your tins, your report"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different cellar directory
    #[arg(short = 'C', long = "cellar-dir", global = true)]
    pub cellar_dir: Option<String>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new cellar in the current directory
    Init(InitArgs),
    /// List items in the collection
    List(ListArgs),
    /// Render the report with the configured (or given) format
    Render(RenderArgs),
    /// Render a format against the built-in three-item sample
    Preview(PreviewArgs),
    /// Show the sort options available for the current format
    Sorts(SortsArgs),
    /// Show every placeholder the format language understands
    Tokens,
    /// Show or change the saved report settings
    Config(ConfigCmd),
    /// Manage the five saved format presets
    Preset(PresetCmd),
}

// ---------------------------------------------------------------------------
// Shared args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct FilterArgs {
    /// Keep items of this brand (repeatable)
    #[arg(long)]
    pub brand: Vec<String>,
    /// Keep items of this type (repeatable)
    #[arg(long = "type")]
    pub kind: Vec<String>,
    /// Keep items of this subgenre (repeatable)
    #[arg(long)]
    pub subgenre: Vec<String>,
    /// Keep items with this cut (repeatable)
    #[arg(long)]
    pub cut: Vec<String>,
    /// Favorites only
    #[arg(long)]
    pub favorites: bool,
    /// Leave out disliked items
    #[arg(long)]
    pub no_disliked: bool,
    /// In-production items only
    #[arg(long, conflicts_with = "discontinued")]
    pub in_production: bool,
    /// Discontinued items only
    #[arg(long)]
    pub discontinued: bool,
    /// Regex matched against brand, blend, and notes
    #[arg(long)]
    pub search: Option<String>,
    /// Component name to match (repeatable)
    #[arg(long)]
    pub component: Vec<String>,
    /// How components match: any, all, only
    #[arg(long, default_value = "any")]
    pub component_mode: String,
    /// Flavoring name to match (repeatable)
    #[arg(long)]
    pub flavor: Vec<String>,
    /// How flavorings match: any, all, only
    #[arg(long, default_value = "any")]
    pub flavor_mode: String,
    /// Leave out finished tins
    #[arg(long)]
    pub hide_finished: bool,
    /// Keep tins of this container type (repeatable)
    #[arg(long)]
    pub container: Vec<String>,
    /// Leave out items with no remaining tins
    #[arg(long)]
    pub has_tins: bool,
}

#[derive(Args, Default)]
pub struct SortArgs {
    /// Sort key (e.g. brand, quantity, tin-label); overrides the saved sort
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long, conflicts_with = "asc")]
    pub desc: bool,
    /// Sort ascending
    #[arg(long)]
    pub asc: bool,
    /// Tiebreak for tin sorts: item-default, tin-default, brand, blend
    #[arg(long)]
    pub sub_sort: Option<String>,
}

// ---------------------------------------------------------------------------
// Command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Collection name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Seed the collection with the sample items
    #[arg(long)]
    pub sample: bool,
    /// Reinitialize even if cellar/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    #[command(flatten)]
    pub sort: SortArgs,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Format template (default: the saved format)
    #[arg(long)]
    pub format: Option<String>,
    /// Record delimiter (default: the saved delimiter)
    #[arg(long)]
    pub delimiter: Option<String>,
    /// Use the format and delimiter saved in this preset slot
    #[arg(long, conflicts_with_all = ["format", "delimiter"])]
    pub preset: Option<u8>,
    /// How @qty is shown: count, tins, ounces, pounds, grams
    #[arg(long)]
    pub quantity: Option<String>,
    #[command(flatten)]
    pub sort: SortArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
    /// Re-render whenever config.toml or collection.toml changes
    #[arg(long)]
    pub watch: bool,
}

#[derive(Args)]
pub struct PreviewArgs {
    /// Format template (default: the saved format)
    #[arg(long)]
    pub format: Option<String>,
    /// Record delimiter (default: the saved delimiter)
    #[arg(long)]
    pub delimiter: Option<String>,
    #[command(flatten)]
    pub sort: SortArgs,
}

#[derive(Args)]
pub struct SortsArgs {
    /// Check against this format instead of the saved one
    #[arg(long)]
    pub format: Option<String>,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the saved report settings
    Show,
    /// Set the format template
    Format {
        /// The new format
        value: String,
    },
    /// Set the record delimiter
    Delimiter {
        /// The new delimiter (`_n_` for a line break)
        value: String,
    },
    /// Set the sort
    Sort(SortArgs),
    /// Set how @qty is shown
    Quantity {
        /// count, tins, ounces, pounds, or grams
        mode: String,
    },
}

#[derive(Args)]
pub struct PresetCmd {
    #[command(subcommand)]
    pub action: Option<PresetAction>,
}

#[derive(Subcommand)]
pub enum PresetAction {
    /// List all preset slots
    List,
    /// Save the current format and delimiter into a slot
    Save {
        /// Slot number (0-4)
        slot: u8,
        /// Display name
        name: String,
    },
    /// Make a preset the current format and delimiter
    Load {
        /// Slot number (0-4)
        slot: u8,
    },
    /// Clear a slot
    Delete {
        /// Slot number (0-4)
        slot: u8,
    },
}
