// crates/cep-core/src/model/convert.rs
use super::db::PostalDb;
use super::entities::{
    CepRange, CommunityPoBox, LargeUser, Locality, Neighborhood, OperationalUnit, RangeOwner,
    Street,
};
use super::raw::DatasetRaw;
use crate::cep::Cep;
use crate::error::{CepError, Result};
use crate::text::{non_blank, normalize_uf};

/// **Standard Converter:** Raw -> validated in-memory tables.
///
/// Every CEP is normalized and checked, every UF upper-cased and checked,
/// every range must satisfy `start <= end`. Range tables come out sorted by
/// precedence so that the first containing range is the winner.
pub fn from_raw(raw: DatasetRaw) -> Result<PostalDb> {
    let mut db = PostalDb::default();

    for r in raw.localities {
        let ctx = || format!("locality {}", r.id);
        db.localities.push(Locality {
            id: r.id,
            uf: uf(&r.uf, ctx)?,
            cep: non_blank(r.cep.as_deref())
                .map(|c| cep(c, ctx))
                .transpose()?,
            name: r.name,
            ibge_code: r.ibge_code,
            situation: r.situation.unwrap_or_else(|| "0".to_string()),
            locality_type: r.locality_type.unwrap_or_else(|| "M".to_string()),
            parent_id: r.parent_id,
            abbreviation: r.abbreviation,
        });
    }

    for r in raw.neighborhoods {
        db.neighborhoods.push(Neighborhood {
            id: r.id,
            uf: uf(&r.uf, || format!("neighborhood {}", r.id))?,
            locality_id: r.locality_id,
            name: r.name,
            abbreviation: r.abbreviation,
        });
    }

    for r in raw.streets {
        let ctx = || format!("street {}", r.id);
        db.streets.push(Street {
            id: r.id,
            uf: uf(&r.uf, ctx)?,
            cep: cep(&r.cep, ctx)?,
            locality_id: r.locality_id,
            start_neighborhood_id: r.start_neighborhood_id,
            end_neighborhood_id: r.end_neighborhood_id,
            name: r.name,
            complement: r.complement.filter(|c| !c.trim().is_empty()),
            type_prefix: r.type_prefix.unwrap_or_default(),
            abbreviation: r.abbreviation,
        });
    }

    for r in raw.large_users {
        let ctx = || format!("large user {}", r.id);
        db.large_users.push(LargeUser {
            id: r.id,
            uf: uf(&r.uf, ctx)?,
            cep: cep(&r.cep, ctx)?,
            locality_id: r.locality_id,
            neighborhood_id: r.neighborhood_id,
            street_id: r.street_id,
            name: r.name,
            address: r.address.unwrap_or_default(),
            abbreviation: r.abbreviation,
        });
    }

    for r in raw.operational_units {
        let ctx = || format!("operational unit {}", r.id);
        db.operational_units.push(OperationalUnit {
            id: r.id,
            uf: uf(&r.uf, ctx)?,
            cep: cep(&r.cep, ctx)?,
            locality_id: r.locality_id,
            neighborhood_id: r.neighborhood_id,
            street_id: r.street_id,
            name: r.name,
            address: r.address.unwrap_or_default(),
            po_box_flag: r.po_box_flag,
            abbreviation: r.abbreviation,
        });
    }

    for r in raw.community_boxes {
        let ctx = || format!("community box {}", r.id);
        db.community_boxes.push(CommunityPoBox {
            id: r.id,
            uf: uf(&r.uf, ctx)?,
            cep: cep(&r.cep, ctx)?,
            locality_id: r.locality_id,
            name: r.name,
            address: r.address.unwrap_or_default(),
        });
    }

    for r in raw.uf_ranges {
        let owner = RangeOwner::Uf(uf(&r.uf, || format!("UF range {}", r.uf))?);
        db.uf_ranges.push(range(owner, &r.start, &r.end, None)?);
    }
    for r in raw.locality_ranges {
        let owner = RangeOwner::Locality(r.locality_id);
        db.locality_ranges
            .push(range(owner, &r.start, &r.end, r.range_type)?);
    }
    for r in raw.neighborhood_ranges {
        let owner = RangeOwner::Neighborhood(r.neighborhood_id);
        db.neighborhood_ranges.push(range(owner, &r.start, &r.end, None)?);
    }
    for r in raw.operational_unit_ranges {
        let owner = RangeOwner::OperationalUnit(r.operational_unit_id);
        db.operational_unit_ranges
            .push(range(owner, &r.start, &r.end, None)?);
    }

    for table in [
        &mut db.uf_ranges,
        &mut db.locality_ranges,
        &mut db.neighborhood_ranges,
        &mut db.operational_unit_ranges,
    ] {
        sort_by_precedence(table);
    }

    Ok(db)
}

pub(crate) fn sort_by_precedence(ranges: &mut [CepRange]) {
    ranges.sort_by(|a, b| a.precedence_key().cmp(&b.precedence_key()));
}

fn uf(raw: &str, ctx: impl Fn() -> String) -> Result<String> {
    normalize_uf(raw)
        .ok_or_else(|| CepError::InvalidData(format!("{}: invalid UF {raw:?}", ctx())))
}

fn cep(raw: &str, ctx: impl Fn() -> String) -> Result<Cep> {
    Cep::parse(raw).map_err(|e| CepError::InvalidData(format!("{}: {e}", ctx())))
}

fn range(owner: RangeOwner, start: &str, end: &str, range_type: Option<String>) -> Result<CepRange> {
    let ctx = || format!("{owner:?} range");
    let start = cep(start, ctx)?;
    let end = cep(end, ctx)?;
    if start > end {
        return Err(CepError::InvalidData(format!(
            "{}: start {start} is after end {end}",
            ctx()
        )));
    }
    Ok(CepRange {
        owner,
        start,
        end,
        range_type,
    })
}
