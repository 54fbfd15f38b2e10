use clap::{Parser, Subcommand};
use foundation::LngLat;
use geocoding::{Geocoder, GeocodingConfig, MapboxClient, MemoryGeocoder, Place, SearchOptions};
use mapstate::{ClickOutcome, ClickResolution, HeadlessSurface, MapClick, MapCoordinator};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Place search, reverse lookup and routing from the terminal")]
struct Args {
    /// Service base URL for both geocoding and directions (e.g. the places proxy)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Forward search for a place name
    Search {
        query: String,

        /// Bias results towards lng,lat
        #[arg(long, allow_hyphen_values = true)]
        proximity: Option<LngLat>,
    },

    /// Places containing a coordinate
    #[command(allow_negative_numbers = true)]
    Reverse { lng: f64, lat: f64 },

    /// Driving route between two lng,lat points
    Directions {
        #[arg(allow_hyphen_values = true)]
        from: LngLat,
        #[arg(allow_hyphen_values = true)]
        to: LngLat,
    },

    /// Simulate a map click on a headless map
    #[command(allow_negative_numbers = true)]
    Click {
        lng: f64,
        lat: f64,

        #[arg(long, default_value_t = 12.0)]
        zoom: f64,

        /// Existing list marker at lng,lat (repeatable)
        #[arg(long = "marker", allow_hyphen_values = true)]
        markers: Vec<LngLat>,

        /// Press the popup's Add button afterwards
        #[arg(long)]
        add: bool,

        /// Answer the lookup locally instead of calling the service
        #[arg(long)]
        offline: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let base_url = args.base_url;

    let report = match args.command {
        Command::Search { query, proximity } => {
            let client = online_client(base_url.as_deref())?;
            let options = SearchOptions {
                proximity,
                ..SearchOptions::default()
            };
            let places = client.search_places(&query, &options).await?;
            info!("{} candidates for {query:?}", places.features.len());
            serde_json::to_value(places)?
        }
        Command::Reverse { lng, lat } => {
            let client = online_client(base_url.as_deref())?;
            serde_json::to_value(client.reverse(LngLat::new(lng, lat)).await?)?
        }
        Command::Directions { from, to } => {
            let client = online_client(base_url.as_deref())?;
            serde_json::to_value(client.route(&[from, to]).await?)?
        }
        Command::Click {
            lng,
            lat,
            zoom,
            markers,
            add,
            offline,
        } => {
            let click = MapClick::new(lng, lat);
            let geocoder: Box<dyn Geocoder> = if offline {
                Box::new(offline_geocoder(click.position))
            } else {
                Box::new(online_client(base_url.as_deref())?)
            };
            let report = simulate_click(geocoder.as_ref(), click, zoom, markers, add).await?;
            serde_json::to_value(report)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn online_client(base_url: Option<&str>) -> Result<MapboxClient, Box<dyn std::error::Error>> {
    let mut config = GeocodingConfig::from_env()?;
    if let Some(base) = base_url {
        config = config.with_base_url(base);
    }
    Ok(MapboxClient::new(config))
}

fn offline_geocoder(position: LngLat) -> MemoryGeocoder {
    let geocoder = MemoryGeocoder::new();
    geocoder.set_default_reverse(vec![
        Place::new("offline.0", "Dropped pin", position).with_place_name(position.to_string()),
    ]);
    geocoder
}

#[derive(Debug, Serialize)]
struct ClickReport {
    resolution: &'static str,
    marker: u32,
    place: Place,
    popup_html: String,
    added: bool,
    selected: Vec<geocoding::PlaceDetails>,
    flights: Vec<LngLat>,
}

impl ClickReport {
    fn new(
        outcome: ClickOutcome,
        added: bool,
        coordinator: &MapCoordinator<HeadlessSurface>,
    ) -> Self {
        let resolution = match outcome.resolution {
            ClickResolution::Matched(_) => "matched",
            ClickResolution::Created(_) => "created",
        };
        Self {
            resolution,
            marker: outcome.marker().index(),
            popup_html: outcome.popup.to_html(),
            place: outcome.place,
            added,
            selected: coordinator.selected().details(),
            flights: coordinator
                .surface()
                .map(|s| s.flights().to_vec())
                .unwrap_or_default(),
        }
    }
}

/// Runs one click through the coordinator on a headless surface centered at
/// the click, with `markers` loaded as the places list (and selection).
async fn simulate_click(
    geocoder: &dyn Geocoder,
    click: MapClick,
    zoom: f64,
    markers: Vec<LngLat>,
    add: bool,
) -> Result<ClickReport, Box<dyn std::error::Error>> {
    let mut coordinator = MapCoordinator::default();
    coordinator.set_map(HeadlessSurface::new(click.position, zoom));

    let list = markers
        .into_iter()
        .enumerate()
        .map(|(i, p)| Place::new(format!("list.{i}"), format!("Place {}", i + 1), p))
        .collect();
    coordinator.update_list_places(list)?;

    let outcome = coordinator
        .handle_click(geocoder, click)
        .await?
        .ok_or("clicks are disabled")?;
    let added = add && coordinator.activate_add();
    Ok(ClickReport::new(outcome, added, &coordinator))
}
