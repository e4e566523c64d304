// crates/cep-core/src/model/address.rs
use crate::cep::Cep;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of postal entity a CEP refers to.
///
/// Serialized with the tags used by the published postal tables
/// (`LOCALIDADE`, `LOGRADOURO`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressKind {
    #[serde(rename = "LOCALIDADE")]
    Locality,
    #[serde(rename = "LOGRADOURO")]
    Street,
    #[serde(rename = "BAIRRO")]
    Neighborhood,
    #[serde(rename = "GRANDE_USUARIO")]
    LargeUser,
    #[serde(rename = "UNIDADE_OPERACIONAL")]
    OperationalUnit,
    #[serde(rename = "CAIXA_POSTAL_COMUNITARIA")]
    CommunityPoBox,
    #[serde(rename = "FAIXA_UF")]
    RangeUf,
    #[serde(rename = "FAIXA_LOCALIDADE")]
    RangeLocality,
    #[serde(rename = "FAIXA_BAIRRO")]
    RangeNeighborhood,
    #[serde(rename = "DESCONHECIDO")]
    Unknown,
}

impl AddressKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressKind::Locality => "LOCALIDADE",
            AddressKind::Street => "LOGRADOURO",
            AddressKind::Neighborhood => "BAIRRO",
            AddressKind::LargeUser => "GRANDE_USUARIO",
            AddressKind::OperationalUnit => "UNIDADE_OPERACIONAL",
            AddressKind::CommunityPoBox => "CAIXA_POSTAL_COMUNITARIA",
            AddressKind::RangeUf => "FAIXA_UF",
            AddressKind::RangeLocality => "FAIXA_LOCALIDADE",
            AddressKind::RangeNeighborhood => "FAIXA_BAIRRO",
            AddressKind::Unknown => "DESCONHECIDO",
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag carried by a resolved [`Address`]: the record kind it was built from,
/// or `Approximate` for reverse-geocoded placeholders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressSource {
    Record(AddressKind),
    Approximate(ApproximateTag),
}

/// Single-valued tag serialized as `"APPROXIMATE"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApproximateTag {
    #[serde(rename = "APPROXIMATE")]
    Approximate,
}

impl AddressSource {
    pub const APPROXIMATE: AddressSource = AddressSource::Approximate(ApproximateTag::Approximate);

    pub fn as_str(self) -> &'static str {
        match self {
            AddressSource::Record(kind) => kind.as_str(),
            AddressSource::Approximate(_) => "APPROXIMATE",
        }
    }
}

impl From<AddressKind> for AddressSource {
    fn from(kind: AddressKind) -> Self {
        AddressSource::Record(kind)
    }
}

/// A normalized address assembled from one or more postal records.
///
/// Unset fields stay `None`; nothing is defaulted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub cep: Option<Cep>,
    pub street_type: Option<String>,
    pub street: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub locality: Option<String>,
    pub uf: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub kind: Option<AddressSource>,
}

impl Address {
    /// One-line postal rendering:
    /// `"Avenida Paulista, lado par, Bela Vista, São Paulo, SP, CEP 01310100"`.
    ///
    /// Missing parts are skipped.
    pub fn display_line(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        let street = [self.street_type.as_deref(), self.street.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !street.is_empty() {
            parts.push(street);
        }

        for field in [&self.complement, &self.neighborhood, &self.locality, &self.uf] {
            if let Some(v) = field.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                parts.push(v.to_string());
            }
        }

        if let Some(cep) = &self.cep {
            parts.push(format!("CEP {cep}"));
        }

        parts.join(", ")
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Outcome of a lookup that may legitimately find nothing.
///
/// "No such CEP" is a normal answer, not an error; callers branch on this
/// instead of inspecting an error value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Lookup<T> {
    Found(T),
    NotFound(NotFound),
}

/// Describes what was looked for and not found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFound {
    pub message: String,
}

impl NotFound {
    pub fn new(message: impl Into<String>) -> Self {
        NotFound {
            message: message.into(),
        }
    }
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<T> Lookup<T> {
    pub fn not_found(message: impl Into<String>) -> Self {
        Lookup::NotFound(NotFound::new(message))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound(_) => None,
        }
    }

    pub fn as_found(&self) -> Option<&T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::NotFound(nf) => Lookup::NotFound(nf),
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::not_found("no matching record"),
        }
    }
}

/// Result of [`validate_cep`](crate::CepService::validate_cep).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CepValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<AddressKind>,
}
