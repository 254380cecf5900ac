//! CLI - command-line front end for the interaction engine.
//!
//! This is a debugging/driving surface: each subcommand exercises one
//! engine flow end-to-end against the configured service.

use clap::{Args, Parser, Subcommand};
use tracing::warn;

use crate::config::Config;
use crate::domain::PropertyId;
use crate::domain::events::EngineEvent;
use crate::models::{
    AssetKind, CandidateFile, OfferFields, PropertyListing, PropertyType, RoomCount,
    TransactionKind,
};
use crate::services::EngineError;
use crate::state::Engine;
use crate::validate::{SearchForm, validate_search};

/// Domik - real-estate search and offer client
#[derive(Parser)]
#[command(name = "domik")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search listings and page through results
    #[command(alias = "s")]
    Search(SearchArgs),

    /// List the current favorites
    #[command(alias = "f")]
    Favorites,

    /// Toggle one listing's favorite state
    Favorite {
        /// Listing ID
        id: String,
        /// Remove instead of add
        #[arg(long)]
        remove: bool,
    },

    /// Show listings positioned for the map view
    Map,

    /// Submit a property offer with photos and an optional video
    Offer(OfferArgs),

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Buy or rent
    #[arg(long, value_parser = parse_transaction)]
    pub kind: Option<String>,

    /// Property types (apartment, house, commercial); repeatable
    #[arg(long = "type")]
    pub types: Vec<String>,

    /// Room count (1-5; 5 means five or more)
    #[arg(long)]
    pub rooms: Option<u32>,

    #[arg(long)]
    pub district: Option<String>,

    #[arg(long)]
    pub budget_min: Option<f64>,

    #[arg(long)]
    pub budget_max: Option<f64>,

    /// Free-text query
    pub text: Vec<String>,

    /// Contact name (defaults to [contact] in config)
    #[arg(long)]
    pub name: Option<String>,

    /// Contact phone (defaults to [contact] in config)
    #[arg(long)]
    pub phone: Option<String>,

    /// Number of pages to load
    #[arg(long, default_value = "1")]
    pub pages: u32,

    /// Also register this search for notifications
    #[arg(long)]
    pub register: bool,
}

#[derive(Args)]
pub struct OfferArgs {
    /// sell or rent
    #[arg(long, value_parser = parse_transaction)]
    pub kind: String,

    /// apartment, house, or commercial
    #[arg(long = "type", value_parser = parse_property_type)]
    pub property_type: String,

    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub area: Option<String>,

    #[arg(long)]
    pub floors: Option<String>,

    #[arg(long)]
    pub rooms: Option<String>,

    #[arg(long)]
    pub price: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Photo file paths; repeatable
    #[arg(long = "photo")]
    pub photos: Vec<String>,

    /// Video file path
    #[arg(long)]
    pub video: Option<String>,
}

fn parse_transaction(raw: &str) -> Result<String, String> {
    match raw.to_lowercase().as_str() {
        "buy" | "sell" | "rent" => Ok(raw.to_lowercase()),
        _ => Err("expected buy, sell, or rent".to_string()),
    }
}

fn parse_property_type(raw: &str) -> Result<String, String> {
    match raw.to_lowercase().as_str() {
        "apartment" | "house" | "commercial" => Ok(raw.to_lowercase()),
        _ => Err("expected apartment, house, or commercial".to_string()),
    }
}

fn transaction_kind(raw: &str) -> TransactionKind {
    match raw {
        "rent" => TransactionKind::Rent,
        _ => TransactionKind::Buy,
    }
}

fn property_type(raw: &str) -> PropertyType {
    match raw {
        "house" => PropertyType::House,
        "commercial" => PropertyType::Commercial,
        _ => PropertyType::Apartment,
    }
}

const fn room_count(rooms: u32) -> RoomCount {
    match rooms {
        0 | 1 => RoomCount::One,
        2 => RoomCount::Two,
        3 => RoomCount::Three,
        4 => RoomCount::Four,
        _ => RoomCount::FivePlus,
    }
}

fn print_listing(listing: &PropertyListing) {
    let price = listing
        .price_usd
        .map_or_else(|| "n/a".to_string(), |p| format!("${p:.0}"));
    let star = if listing.is_favorite { "*" } else { " " };
    println!(
        "{star} {}  {}  {}  {}",
        listing.id,
        price,
        listing.title,
        listing.address.as_deref().unwrap_or("")
    );
}

fn print_error_map(errors: &std::collections::BTreeMap<&'static str, String>) {
    eprintln!("The form has errors:");
    for (field, message) in errors {
        eprintln!("  {field}: {message}");
    }
}

pub async fn run_search(engine: &Engine, config: &Config, args: SearchArgs) -> anyhow::Result<()> {
    let mut form = SearchForm {
        name: args.name.unwrap_or_else(|| config.contact.name.clone()),
        phone: args.phone.unwrap_or_else(|| config.contact.phone.clone()),
        ..SearchForm::default()
    };
    form.query.transaction_kind = args.kind.as_deref().map(transaction_kind);
    form.query.property_types = args.types.iter().map(|t| property_type(t)).collect();
    form.query.rooms = args.rooms.map(room_count);
    form.query.district = args.district;
    form.query.budget_min = args.budget_min;
    form.query.budget_max = args.budget_max;
    if !args.text.is_empty() {
        form.query.free_text = Some(args.text.join(" "));
    }

    let errors = validate_search(&form);
    if !errors.is_empty() {
        print_error_map(&errors);
        anyhow::bail!("search aborted by validation");
    }
    engine
        .drafts()
        .save(crate::services::SEARCH_FORM, &form);

    let search = engine.search();
    search.start_search(form.query.clone()).await?;
    for _ in 1..args.pages {
        if !search.load_more().await? {
            break;
        }
    }

    let results = search.results().snapshot();
    for listing in &results {
        print_listing(listing);
    }
    println!(
        "{} of {} result(s) loaded",
        results.len(),
        search.total()
    );

    if args.register {
        search.register_saved_search().await?;
        println!("Search registered for notifications");
    }
    Ok(())
}

pub async fn run_favorites(engine: &Engine) -> anyhow::Result<()> {
    let favorites = engine.favorites().load().await?;
    if favorites.is_empty() {
        println!("No favorites yet");
        return Ok(());
    }
    for listing in &favorites {
        print_listing(listing);
    }
    Ok(())
}

pub async fn run_favorite(engine: &Engine, id: &str, desired: bool) -> anyhow::Result<()> {
    let id: PropertyId = id.parse()?;
    // Populate the favorites view first so a removal has something to roll
    // back to if the service rejects it.
    engine.favorites().load().await?;
    match engine.favorites().toggle_favorite(id, desired).await {
        Ok(()) => {
            println!("Favorite {id} -> {desired}");
            Ok(())
        }
        Err(EngineError::TogglePending(_)) => {
            println!("A toggle for {id} is already in flight");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn run_map(engine: &Engine) -> anyhow::Result<()> {
    let pins = engine.map_view().pins().await?;
    for pin in &pins {
        let price = pin
            .price_usd
            .map_or_else(|| "n/a".to_string(), |p| format!("${p:.0}"));
        println!("{} {:.5},{:.5}  {}  {}", pin.id, pin.latitude, pin.longitude, price, pin.title);
    }
    Ok(())
}

fn load_candidate(path: &str) -> anyhow::Result<CandidateFile> {
    let data = std::fs::read(path)?;
    let mime_type = mime_guess::from_path(path).first_or_octet_stream().to_string();
    let file_name = std::path::Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned());
    Ok(CandidateFile {
        file_name,
        mime_type,
        data,
    })
}

pub async fn run_offer(engine: &Engine, args: OfferArgs) -> anyhow::Result<()> {
    let fields = OfferFields {
        transaction_kind: Some(transaction_kind(&args.kind)),
        property_type: Some(property_type(&args.property_type)),
        address: args.address,
        name: args.name,
        phone: args.phone,
        area: args.area,
        floors: args.floors,
        rooms: args.rooms,
        price: args.price,
        description: args.description,
    };

    let offer = engine.offer();
    if !args.photos.is_empty() {
        let candidates = args
            .photos
            .iter()
            .map(|p| load_candidate(p))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let outcome = offer.add_files(AssetKind::Photo, candidates);
        for rejection in &outcome.rejected {
            warn!("{}: {}", rejection.file_name, rejection.reason);
        }
        if let Some(reason) = &outcome.batch_rejected {
            anyhow::bail!("photo batch rejected: {reason}");
        }
    }
    if let Some(path) = &args.video {
        let outcome = offer.add_files(AssetKind::Video, vec![load_candidate(path)?]);
        for rejection in &outcome.rejected {
            warn!("{}: {}", rejection.file_name, rejection.reason);
        }
    }

    // Print transfer progress while the submission is in flight.
    let mut events = engine.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                EngineEvent::UploadProgress { percent } => eprintln!("  {percent}%"),
                EngineEvent::Notice { message } => eprintln!("  {message}"),
                _ => {}
            }
        }
    });

    let outcome = offer.submit(&fields).await;
    printer.abort();
    match outcome {
        Ok(()) => {
            println!("Offer submitted for moderation");
            Ok(())
        }
        Err(EngineError::Validation { errors }) => {
            print_error_map(&errors);
            anyhow::bail!("offer aborted by validation");
        }
        Err(e) => Err(e.into()),
    }
}
