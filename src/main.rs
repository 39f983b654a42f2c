use clap::{Parser, Subcommand};
use geo_assistant::config::Config;
use geo_assistant::overpass::OverpassClient;
use geo_assistant::search::GeoSearch;
use geo_assistant::tools;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Geo assistant: amenity search over OpenStreetMap via the Overpass API.
///
/// Resolves a city/district to its boundary or a landmark to a coordinate,
/// then lists named amenities inside that scope. Output is the same string
/// a conversational agent receives from the tool call.
///
/// Examples:
///   geo city Gorakhpur
///   geo city Gorakhpur --amenity hospital
///   geo poi "Eiffel Tower" --amenity cafe
///   geo call '{"name": "city_wide_amenity_search", "arguments": {"city_or_district": "Delhi"}}'
///   geo serve --port 3000
#[derive(Parser)]
#[command(name = "geo", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.geo-assistant/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overpass interpreter URL. Overrides config and GEO_OVERPASS_URL.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Pause between boundary lookups, in milliseconds.
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search amenities across a whole city or district.
    City {
        /// City or district name, e.g. "Gorakhpur".
        name: String,

        /// Amenity type (e.g. hospital, cafe). Omit for all amenities.
        #[arg(long, short = 'a')]
        amenity: Option<String>,
    },

    /// Search amenities near a named landmark.
    Poi {
        /// Landmark or building name, e.g. "Eiffel Tower".
        name: String,

        /// Amenity type (e.g. cafe).
        #[arg(long, short = 'a')]
        amenity: String,

        /// Search radius in meters (default from config, 2000).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        radius: Option<u32>,
    },

    /// Run a tool call given as JSON (use "-" to read stdin).
    Call {
        call: String,
    },

    /// Print the tool definitions as JSON.
    Tools,

    /// Serve the tools over HTTP.
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli);

    match cli.command {
        Command::Tools => {
            let specs = tools::tool_specs();
            match serde_json::to_string_pretty(&specs) {
                Ok(json) => println!("{}", json),
                Err(e) => fail(&format!("cannot encode tool definitions: {}", e)),
            }
        }
        Command::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let runtime = tokio::runtime::Runtime::new()
                .unwrap_or_else(|e| fail(&format!("cannot start runtime: {}", e)));
            if let Err(e) = runtime.block_on(geo_assistant::server::start(&config)) {
                fail(&format!("server error: {}", e));
            }
        }
        Command::City { name, amenity } => {
            let search = build_search(&config);
            println!("{}", search.city_wide_amenity_search(&name, amenity.as_deref()));
        }
        Command::Poi { name, amenity, radius } => {
            let search = build_search(&config);
            let output = match radius {
                Some(r) => tools::render_point(search.search_near_point_within(&name, &amenity, r)),
                None => search.point_of_interest_amenity_search(&name, &amenity),
            };
            println!("{}", output);
        }
        Command::Call { call } => {
            let raw = if call == "-" {
                let mut buf = String::new();
                if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
                    fail(&format!("cannot read stdin: {}", e));
                }
                buf
            } else {
                call
            };
            let search = build_search(&config);
            let output = match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(value) => search.dispatch_value(value),
                Err(e) => format!("Error: Invalid tool call: {}", e),
            };
            println!("{}", output);
        }
    }
}

/// `RUST_LOG` controls verbosity; logs go to stderr so stdout stays the tool output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Config {
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path).map(|mut c| {
            c.apply_env();
            c
        }),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| fail(&e.to_string()));

    if let Some(ref endpoint) = cli.endpoint {
        config.overpass.endpoint = endpoint.clone();
    }
    if let Some(delay) = cli.delay_ms {
        config.search.courtesy_delay_ms = delay;
    }
    if let Err(e) = config.validate() {
        fail(&e.to_string());
    }
    config
}

fn build_search(config: &Config) -> GeoSearch<OverpassClient> {
    GeoSearch::new(OverpassClient::new(&config.overpass), config.search.clone())
}

fn fail(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poi_radius_must_be_positive() {
        assert!(Cli::try_parse_from(["geo", "poi", "Eiffel Tower", "-a", "cafe", "--radius", "0"]).is_err());

        let cli = Cli::try_parse_from(["geo", "poi", "Eiffel Tower", "-a", "cafe", "--radius", "1500"]).unwrap();
        match cli.command {
            Command::Poi { radius, .. } => assert_eq!(radius, Some(1500)),
            _ => panic!("expected poi command"),
        }
    }
}
