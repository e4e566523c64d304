//! cep-cli
//! =======
//!
//! Command-line interface for the `cep-core` postal code service.
//!
//! This crate primarily provides a binary (`cep`). The library target only
//! exists so that docs.rs renders this overview.
//!
//! Quick start
//! -----------
//!
//! ```text
//! cep --help
//! cep stats
//! cep lookup 01310-100
//! cep validate 01310930
//! cep search --uf SP --street paulista
//! cep autocomplete centro --kind bairro
//! cep geocode --street "Rua das Flores" --locality Niterói --uf RJ
//! cep reverse -15.78 -47.93
//! cep distance 01310-100 22021-001
//! cep radius -23.55,-46.63 --radius-km 20 --kind logradouro
//! ```
//!
//! `--input <path>` points to another dataset (`.json`, `.json.gz` or a
//! `.bin` snapshot) and `--config <path>` to a JSON file of service
//! settings. Log verbosity follows `RUST_LOG`.
//!
//! For programmatic access use the `cep-core` crate directly.
#![cfg_attr(docsrs, feature(doc_cfg))]
