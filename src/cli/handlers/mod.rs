mod init;
pub use init::cmd_init;

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use regex::RegexBuilder;

/// Global override for the cellar directory (set by -C flag)
static CELLAR_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

/// How long `render --watch` lets a burst of file events settle
const WATCH_SETTLE: Duration = Duration::from_millis(150);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::WriteLock;
use crate::io::store_io::{self, StoreError, atomic_write};
use crate::io::watcher::CellarWatcher;
use crate::model::collection::Cellar;
use crate::model::config::{QuantityDisplay, ReportConfig};
use crate::model::report::RenderedReport;
use crate::model::sort::{SortKey, SortOption, SubSort};
use crate::ops::filter::{ItemFilter, TinFilter, filter_items};
use crate::ops::preset_ops;
use crate::ops::quantity::Quantities;
use crate::ops::render::{available_sort_keys, render_items, render_report};
use crate::ops::sample::sample_items;
use crate::ops::sort::order;
use crate::parse::token::Token;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    // Store -C override for load_cellar_cwd()
    if let Some(ref dir) = cli.cellar_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        let _ = CELLAR_DIR_OVERRIDE.set(abs);
    }

    match cli.command {
        // Init runs before any cellar exists
        Commands::Init(args) => cmd_init(args),

        // Read commands
        Commands::List(args) => cmd_list(args, json),
        Commands::Render(args) => cmd_render(args, json),
        Commands::Preview(args) => cmd_preview(args, json),
        Commands::Sorts(args) => cmd_sorts(args, json),
        Commands::Tokens => cmd_tokens(json),

        // Write commands
        Commands::Config(args) => cmd_config(args, json),
        Commands::Preset(args) => cmd_preset(args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cellar_start() -> Result<PathBuf, StoreError> {
    match CELLAR_DIR_OVERRIDE.get() {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(StoreError::IoError),
    }
}

fn load_cellar_cwd() -> Result<Cellar, StoreError> {
    let root = store_io::discover_cellar(&cellar_start()?)?;
    store_io::load_cellar(&root)
}

/// The saved report settings, or the defaults when no cellar is found.
/// Used by commands that only read settings and never touch user data.
fn report_config_or_default() -> ReportConfig {
    match load_cellar_cwd() {
        Ok(cellar) => cellar.config.report,
        Err(e) => {
            tracing::debug!(error = %e, "no cellar, using default report settings");
            ReportConfig::default()
        }
    }
}

/// Layer command-line sort flags over a saved sort. Picking a new key
/// starts from that key's natural direction.
fn apply_sort_args(args: &SortArgs, base: SortOption) -> Result<SortOption, Box<dyn std::error::Error>> {
    let mut sort = match args.sort.as_deref() {
        Some(key) => SortOption::new(key.parse::<SortKey>()?).with_sub_sort(base.sub_sort),
        None => base,
    };
    if args.desc {
        sort.ascending = false;
    }
    if args.asc {
        sort.ascending = true;
    }
    if let Some(ref sub) = args.sub_sort {
        sort.sub_sort = sub.parse::<SubSort>()?;
    }
    Ok(sort)
}

fn build_filter(args: &FilterArgs) -> Result<ItemFilter, Box<dyn std::error::Error>> {
    let search = args
        .search
        .as_deref()
        .map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build())
        .transpose()?;
    let in_production = if args.in_production {
        Some(true)
    } else if args.discontinued {
        Some(false)
    } else {
        None
    };

    Ok(ItemFilter {
        brands: args.brand.clone(),
        types: args.kind.clone(),
        subgenres: args.subgenre.clone(),
        cuts: args.cut.clone(),
        favorites_only: args.favorites,
        exclude_disliked: args.no_disliked,
        in_production,
        search,
        components: args.component.clone(),
        component_mode: args.component_mode.parse()?,
        flavorings: args.flavor.clone(),
        flavoring_mode: args.flavor_mode.parse()?,
        tins: TinFilter {
            hide_finished: args.hide_finished,
            containers: args.container.clone(),
            has_tins: args.has_tins,
        },
    })
}

/// Tin-level sorts only take effect when the format names a tin field
/// outside a sublist.
fn warn_unavailable_sort(report: &ReportConfig) {
    if !available_sort_keys(&report.format).contains(&report.sort.key) {
        tracing::warn!(
            sort = report.sort.key.name(),
            "format has no direct tin field; tin sort lists items in default order"
        );
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cellar = load_cellar_cwd()?;
    let filter = build_filter(&args.filter)?;
    let sort = apply_sort_args(&args.sort, cellar.config.report.sort)?;

    let items = filter_items(&cellar.collection.items, &filter);
    let quantities = Quantities::compute(&items, cellar.config.report.quantity);
    let ordered = order(&items, &sort, &quantities);

    if json {
        let out: Vec<ItemJson> = ordered
            .items
            .iter()
            .map(|item| item_to_json(item, quantities.display(item.id)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if ordered.items.is_empty() {
        println!("no items");
    } else {
        print!(
            "{}",
            format_item_table(&ordered.items, |id| quantities.display(id))
        );
    }
    Ok(())
}

/// Resolve the report settings for one `render` pass from the saved config
/// plus command-line overrides
fn render_config(cellar: &Cellar, args: &RenderArgs) -> Result<ReportConfig, Box<dyn std::error::Error>> {
    let mut report = cellar.config.report.clone();
    if let Some(slot) = args.preset {
        let preset = preset_ops::get_preset(&cellar.config, slot)?;
        report.format = preset.format.clone();
        report.delimiter = preset.delimiter.clone();
    }
    if let Some(ref format) = args.format {
        report.format = format.clone();
    }
    if let Some(ref delimiter) = args.delimiter {
        report.delimiter = delimiter.clone();
    }
    if let Some(ref quantity) = args.quantity {
        report.quantity = quantity.parse::<QuantityDisplay>()?;
    }
    report.sort = apply_sort_args(&args.sort, report.sort)?;
    Ok(report)
}

fn render_once(cellar: &Cellar, args: &RenderArgs) -> Result<(ReportConfig, RenderedReport), Box<dyn std::error::Error>> {
    let report = render_config(cellar, args)?;
    warn_unavailable_sort(&report);
    let filter = build_filter(&args.filter)?;
    let items = filter_items(&cellar.collection.items, &filter);
    let rendered = render_report(&items, &report);
    Ok((report, rendered))
}

fn emit_report(
    report: &ReportConfig,
    rendered: RenderedReport,
    args: &RenderArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let out = ReportJson {
            format: &report.format,
            delimiter: &report.delimiter,
            sort: report.sort.key.name().to_string(),
            ascending: report.sort.ascending,
            text: rendered.text,
            preview: rendered.preview,
        };
        let text = if args.watch {
            serde_json::to_string(&out)?
        } else {
            serde_json::to_string_pretty(&out)?
        };
        println!("{}", text);
    } else if let Some(ref path) = args.output {
        let mut content = rendered.text;
        content.push('\n');
        atomic_write(std::path::Path::new(path), content.as_bytes())?;
        eprintln!("wrote {}", path);
    } else {
        println!("{}", rendered.text);
    }
    Ok(())
}

fn cmd_render(args: RenderArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cellar = load_cellar_cwd()?;
    let (report, rendered) = render_once(&cellar, &args)?;
    emit_report(&report, rendered, &args, json)?;

    if !args.watch {
        return Ok(());
    }

    let watcher = CellarWatcher::start(&cellar.cellar_dir)?;
    eprintln!("watching {}/ (ctrl-c to stop)", cellar.cellar_dir.display());
    while let Some(changed) = watcher.wait(WATCH_SETTLE) {
        tracing::info!(files = changed.len(), "cellar changed, re-rendering");
        // A half-written file is reported and skipped; the next change retries
        let next = store_io::load_cellar(&cellar.root)
            .map_err(Box::<dyn std::error::Error>::from)
            .and_then(|c| render_once(&c, &args));
        match next {
            Ok((report, rendered)) => {
                if !json && args.output.is_none() {
                    println!();
                }
                emit_report(&report, rendered, &args, json)?;
            }
            Err(e) => eprintln!("error: {}", e),
        }
    }
    Ok(())
}

fn cmd_preview(args: PreviewArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut report = report_config_or_default();
    if let Some(format) = args.format {
        report.format = format;
    }
    if let Some(delimiter) = args.delimiter {
        report.delimiter = delimiter;
    }
    report.sort = apply_sort_args(&args.sort, report.sort)?;
    let preview = render_items(&sample_items(), &report);

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "preview": preview }))?);
    } else {
        println!("{}", preview);
    }
    Ok(())
}

fn cmd_sorts(args: SortsArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let report = report_config_or_default();
    let format = args.format.unwrap_or(report.format);
    let keys = available_sort_keys(&format);

    if json {
        let out: Vec<SortKeyJson> = keys.into_iter().map(sort_key_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", format_sort_keys(&keys, report.sort.key));
    }
    Ok(())
}

fn cmd_tokens(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let out: Vec<TokenJson> = Token::ALL.into_iter().map(token_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", format_tokens());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_config(args: ConfigCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cellar = load_cellar_cwd()?;
    let action = match args.action {
        None | Some(ConfigAction::Show) => {
            let name = &cellar.config.collection.name;
            if json {
                let out = config_to_json(name, &cellar.config.report);
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", format_config(name, &cellar.config.report));
            }
            return Ok(());
        }
        Some(action) => action,
    };

    let _lock = WriteLock::acquire_default(&cellar.cellar_dir)?;
    let (config, mut doc) = config_io::read_config(&cellar.cellar_dir)?;

    match action {
        ConfigAction::Show => {}
        ConfigAction::Format { value } => {
            config_io::set_format(&mut doc, &value);
            println!("format: {}", value);
        }
        ConfigAction::Delimiter { value } => {
            config_io::set_delimiter(&mut doc, &value);
            println!("delimiter: {}", value);
        }
        ConfigAction::Sort(sort_args) => {
            if sort_args.sort.is_none() && !sort_args.desc && !sort_args.asc && sort_args.sub_sort.is_none() {
                return Err("nothing to change: pass a sort key, --asc/--desc, or --sub-sort".into());
            }
            let sort = apply_sort_args(&sort_args, config.report.sort)?;
            config_io::set_sort(&mut doc, &sort);
            let direction = if sort.ascending { "ascending" } else { "descending" };
            println!("sort: {} ({})", sort.key.label(), direction);
        }
        ConfigAction::Quantity { mode } => {
            let quantity: QuantityDisplay = mode.parse()?;
            config_io::set_quantity(&mut doc, quantity);
            println!("quantity: {}", quantity);
        }
    }

    config_io::write_config(&cellar.cellar_dir, &doc)?;
    Ok(())
}

fn cmd_preset(args: PresetCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cellar = load_cellar_cwd()?;
    let action = match args.action {
        None | Some(PresetAction::List) => {
            let slots = preset_ops::list_presets(&cellar.config);
            if json {
                let out: Vec<PresetJson> = slots
                    .iter()
                    .map(|(slot, preset)| preset_to_json(*slot, *preset))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", format_presets(&slots));
            }
            return Ok(());
        }
        Some(action) => action,
    };

    let _lock = WriteLock::acquire_default(&cellar.cellar_dir)?;
    let (mut config, mut doc) = config_io::read_config(&cellar.cellar_dir)?;

    match action {
        PresetAction::List => {}
        PresetAction::Save { slot, name } => {
            let preset = preset_ops::save_preset(&mut doc, &mut config, slot, &name)?;
            println!("saved preset {}: {}", preset.slot, preset.name);
        }
        PresetAction::Load { slot } => {
            let preset = preset_ops::load_preset(&mut doc, &mut config, slot)?;
            println!("loaded preset {}: {}", preset.slot, preset.name);
        }
        PresetAction::Delete { slot } => {
            preset_ops::delete_preset(&mut doc, &mut config, slot)?;
            println!("deleted preset {}", slot);
        }
    }

    config_io::write_config(&cellar.cellar_dir, &doc)?;
    Ok(())
}
