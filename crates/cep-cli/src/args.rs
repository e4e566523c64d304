// crates/cep-cli/src/args.rs
use clap::{Parser, Subcommand};

/// CLI arguments for cep-cli
#[derive(Debug, Parser)]
#[command(
    name = "cep",
    version,
    about = "CLI for resolving, searching and geocoding Brazilian postal codes (CEP)"
)]
pub struct CliArgs {
    /// Path to the dataset (.json, .json.gz or a .bin snapshot; default: bundled sample)
    #[arg(short = 'i', long = "input", global = true)]
    pub input: Option<String>,

    /// Optional JSON file with service settings (cache TTLs, limits, jitter)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a summary of the dataset contents
    Stats,

    /// Resolve a CEP to an address
    Lookup {
        /// CEP, with or without hyphen (e.g. 01310-100)
        cep: String,
    },

    /// Check whether a CEP exists and how it classifies
    Validate { cep: String },

    /// Classify a CEP and show the record it matched
    Classify { cep: String },

    /// List every range containing a CEP
    Ranges { cep: String },

    /// Search addresses by CEP, street, neighborhood, locality or UF
    Search {
        #[arg(long)]
        cep: Option<String>,
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        neighborhood: Option<String>,
        #[arg(long)]
        locality: Option<String>,
        #[arg(long)]
        uf: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },

    /// Suggest streets, neighborhoods and localities for a partial name
    Autocomplete {
        /// At least three characters
        term: String,
        /// logradouro, bairro or localidade (default: all three)
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        uf: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Approximate coordinates for a CEP, falling back to street/locality/UF
    Geocode {
        #[arg(long)]
        cep: Option<String>,
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        complement: Option<String>,
        #[arg(long)]
        neighborhood: Option<String>,
        #[arg(long)]
        locality: Option<String>,
        #[arg(long)]
        uf: Option<String>,
    },

    /// Approximate address for a coordinate pair
    Reverse {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },

    /// Distance in km between two endpoints (CEP or "lat,lon")
    Distance {
        #[arg(allow_hyphen_values = true)]
        from: String,
        #[arg(allow_hyphen_values = true)]
        to: String,
    },

    /// Records around an endpoint (CEP or "lat,lon")
    Radius {
        #[arg(allow_hyphen_values = true)]
        origin: String,
        #[arg(long, default_value_t = 10.0)]
        radius_km: f64,
        /// localidade, logradouro, bairro or todos
        #[arg(long, default_value = "todos")]
        kind: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },
}
