//! # Loot Forge Main Entry Point
//!
//! Command line front end over the in-memory host: draws loot into a world file's
//! inventory, forges equipment items, and prices material and rune choices.

use clap::{Args as ClapArgs, Parser, Subcommand};
use loot_forge::{
    calculate_final_price_and_level, GenerationConfig, ItemBuilder, ItemCategory, ItemRecord,
    LootError, LootGenerator, LootRequest, LootResult, MaterialGrade, MemoryWorld, StdRandom,
};
use log::{error, info};
use std::path::{Path, PathBuf};

/// Command line arguments for Loot Forge.
#[derive(Parser, Debug)]
#[command(name = "loot-forge")]
#[command(about = "Procedural loot generation for tabletop role-playing games")]
#[command(version)]
struct Args {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw loot from the sources stored in a world's actor flags
    Draw(DrawArgs),
    /// Build an equipment item from a base item
    Forge(EquipmentArgs),
    /// Print the level, price and durability of an equipment selection
    Price(EquipmentArgs),
}

#[derive(ClapArgs, Debug)]
struct DrawArgs {
    /// World file holding packs, tables, flags and the inventory
    #[arg(short, long)]
    world: PathBuf,

    /// Category to draw (treasure, permanent, consumable, spell)
    #[arg(short, long, default_value = "treasure")]
    category: ItemCategory,

    /// Number of records to draw
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Generation config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed, overriding the config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the world with its updated inventory here
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct EquipmentArgs {
    /// JSON file holding the base item record
    #[arg(short, long)]
    base: PathBuf,

    /// Precious material slug, e.g. cold-iron
    #[arg(short, long)]
    material: Option<String>,

    /// Material grade (low, standard, high)
    #[arg(short, long, default_value = "standard")]
    grade: MaterialGrade,

    /// Potency rune value
    #[arg(short, long)]
    potency: Option<u8>,

    /// Striking, resilient or reinforcing rune slug
    #[arg(short, long)]
    fundamental: Option<String>,

    /// Property rune slugs, in slot order
    #[arg(long = "property")]
    property: Vec<String>,

    /// Skip builder validation
    #[arg(long)]
    no_checks: bool,
}

#[tokio::main]
async fn main() -> LootResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Loot Forge v{}", loot_forge::VERSION);

    let result = match args.command {
        Command::Draw(draw) => run_draw(draw).await,
        Command::Forge(equipment) => run_forge(equipment),
        Command::Price(equipment) => run_price(equipment),
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
}

async fn run_draw(args: DrawArgs) -> LootResult<()> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let world = MemoryWorld::from_json_file(&args.world)?;
    let packs = world.packs.clone();
    let tables = world.tables.clone();
    let host = world.into_host(config.seed);

    let request = LootRequest::from_flags(&host.flags, args.category, args.count).await?;
    if request.sources.is_empty() {
        return Err(LootError::Configuration(format!(
            "no enabled {} sources in {}",
            args.category,
            args.world.display()
        )));
    }

    let mut random = StdRandom::seeded(config.seed);
    let generator = LootGenerator::new(host.services(), config);
    let loot = generator
        .generate(&request, &host.inventory, &mut random)
        .await?;

    println!("{}", serde_json::to_string_pretty(&loot)?);

    if let Some(output) = &args.output {
        let updated = MemoryWorld {
            packs,
            tables,
            flags: host.flags.snapshot(),
            inventory: host.inventory.snapshot(),
        };
        std::fs::write(output, serde_json::to_string_pretty(&updated)?)?;
        info!("Wrote world to {}", output.display());
    }

    Ok(())
}

fn read_item(path: &Path) -> LootResult<ItemRecord> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn configure_builder(args: &EquipmentArgs) -> LootResult<ItemBuilder> {
    let base = read_item(&args.base)?;
    let mut builder = ItemBuilder::new(base)?;
    builder.set_checks(!args.no_checks);

    if let Some(material) = &args.material {
        builder.set_material(material, args.grade)?;
    }
    if let Some(potency) = args.potency {
        builder.set_potency(potency)?;
    }
    if let Some(rune) = &args.fundamental {
        match builder.kind() {
            loot_forge::BuilderKind::Weapon => builder.set_striking_rune(rune)?,
            loot_forge::BuilderKind::Armor => builder.set_resiliency_rune(rune)?,
            loot_forge::BuilderKind::Shield => builder.set_reinforcing_rune(rune)?,
        };
    }
    for (slot, rune) in args.property.iter().enumerate() {
        builder.set_property_rune(slot, rune)?;
    }

    Ok(builder)
}

fn run_forge(args: EquipmentArgs) -> LootResult<()> {
    let builder = configure_builder(&args)?;
    let item = builder.build()?;
    info!("Forged {} ({})", item.name, item.system.price);
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}

fn run_price(args: EquipmentArgs) -> LootResult<()> {
    let builder = configure_builder(&args)?;
    let pricing = calculate_final_price_and_level(builder.base(), &builder.selection());
    println!("{}", serde_json::to_string_pretty(&pricing)?);
    Ok(())
}
