// crates/cep-core/tests/search.rs
mod common;

use cep_core::{
    AddressKind, AddressQuery, AddressSource, AutocompleteKind, CepError, LocalityQuery, Lookup,
    NeighborhoodQuery, StreetQuery,
};
use common::{cep, service, token};

fn query() -> AddressQuery {
    AddressQuery::default()
}

#[tokio::test]
async fn street_search_scoped_to_uf() {
    let svc = service();
    let q = AddressQuery {
        uf: Some("SP".into()),
        street: Some("paulista".into()),
        ..query()
    };
    let page = svc.search_addresses(&q, 1, 10, &token()).await.unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 10);
    let ceps: Vec<_> = page.items.iter().map(|a| a.cep.clone().unwrap()).collect();
    assert_eq!(ceps, vec![cep("01310100"), cep("01310200")]);
    for address in &page.items {
        assert_eq!(address.uf.as_deref(), Some("SP"));
        assert_eq!(address.street.as_deref(), Some("Paulista"));
        assert_eq!(address.kind, Some(AddressSource::Record(AddressKind::Street)));
    }
}

#[tokio::test]
async fn street_search_ignores_type_prefix() {
    let svc = service();
    let q = AddressQuery {
        street: Some("Avenida Paulista".into()),
        ..query()
    };
    let page = svc.search_addresses(&q, 1, 10, &token()).await.unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn street_search_narrows_by_neighborhood_and_locality() {
    let svc = service();
    let q = AddressQuery {
        street: Some("a".into()),
        neighborhood: Some("cerqueira cesar".into()),
        locality: Some("sao paulo".into()),
        ..query()
    };
    let page = svc.search_addresses(&q, 1, 10, &token()).await.unwrap();
    let names: Vec<_> = page
        .items
        .iter()
        .map(|a| a.street.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Oscar Freire", "Paulista", "Paulista"]);
}

#[tokio::test]
async fn neighborhood_search_orders_by_name() {
    let svc = service();
    let q = AddressQuery {
        neighborhood: Some("asa".into()),
        ..query()
    };
    let page = svc.search_addresses(&q, 1, 10, &token()).await.unwrap();
    let names: Vec<_> = page
        .items
        .iter()
        .map(|a| a.neighborhood.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Asa Norte", "Asa Sul"]);
    assert!(page
        .items
        .iter()
        .all(|a| a.locality.as_deref() == Some("Brasília") && a.uf.as_deref() == Some("DF")));
}

#[tokio::test]
async fn uf_only_search_lists_localities() {
    let svc = service();
    let q = AddressQuery {
        uf: Some("mg".into()),
        ..query()
    };
    let page = svc.search_addresses(&q, 1, 10, &token()).await.unwrap();
    let names: Vec<_> = page
        .items
        .iter()
        .map(|a| a.locality.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Belo Horizonte", "Santana do Riacho", "Serra do Cipó"]);
    assert!(page
        .items
        .iter()
        .all(|a| a.kind == Some(AddressSource::Record(AddressKind::Locality))));
}

#[tokio::test]
async fn pages_partition_the_result_set() {
    let svc = service();
    let q = AddressQuery {
        uf: Some("SP".into()),
        ..query()
    };
    let first = svc.search_addresses(&q, 1, 3, &token()).await.unwrap();
    let second = svc.search_addresses(&q, 2, 3, &token()).await.unwrap();
    let beyond = svc.search_addresses(&q, 3, 3, &token()).await.unwrap();

    assert_eq!(first.total, 4);
    assert_eq!(first.total_pages(), 2);
    assert!(first.has_next());
    assert!(!second.has_next());
    assert_eq!(first.items.len(), 3);
    assert_eq!(second.items.len(), 1);
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 4);
    assert_eq!(second.items[0].locality.as_deref(), Some("São Paulo"));
}

#[tokio::test]
async fn cep_filter_wins_over_everything_else() {
    let svc = service();
    let q = AddressQuery {
        cep: Some("01310-200".into()),
        street: Some("Augusta".into()),
        ..query()
    };
    let page = svc.search_addresses(&q, 1, 10, &token()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].neighborhood.as_deref(), Some("Cerqueira César"));

    let q = AddressQuery {
        cep: Some("50000000".into()),
        ..query()
    };
    let page = svc.search_addresses(&q, 1, 10, &token()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn search_input_is_validated() {
    let svc = service();
    let empty = AddressQuery {
        street: Some("  ".into()),
        ..query()
    };
    assert!(matches!(
        svc.search_addresses(&empty, 1, 10, &token()).await,
        Err(CepError::Format(_))
    ));

    let q = AddressQuery {
        uf: Some("SP".into()),
        ..query()
    };
    for (page, size) in [(0, 10), (1, 0), (1, 101)] {
        assert!(matches!(
            svc.search_addresses(&q, page, size, &token()).await,
            Err(CepError::Format(_))
        ));
    }

    let bad_uf = AddressQuery {
        uf: Some("Sao Paulo".into()),
        ..query()
    };
    assert!(matches!(
        svc.search_addresses(&bad_uf, 1, 10, &token()).await,
        Err(CepError::Format(_))
    ));
}

#[tokio::test]
async fn autocomplete_mixes_kinds_in_order() {
    let svc = service();
    let results = svc
        .autocomplete("paulista", None, None, 9, &token())
        .await
        .unwrap();

    let kinds: Vec<_> = results.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            Some(AddressSource::Record(AddressKind::Street)),
            Some(AddressSource::Record(AddressKind::Street)),
            Some(AddressSource::Record(AddressKind::Locality)),
        ]
    );
    assert_eq!(results[2].locality.as_deref(), Some("Distrito Paulista"));
}

#[tokio::test]
async fn autocomplete_splits_the_limit_without_a_kind() {
    let svc = service();
    let results = svc
        .autocomplete("centro", None, Some("rs"), 3, &token())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].neighborhood.as_deref(), Some("Centro Histórico"));
    assert_eq!(results[0].locality.as_deref(), Some("Porto Alegre"));

    // limit / 3 rounds down to zero per kind
    let results = svc
        .autocomplete("paulista", None, None, 2, &token())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn autocomplete_with_kind_queries_one_table() {
    let svc = service();
    let results = svc
        .autocomplete("CENTRO", Some(AutocompleteKind::Neighborhood), None, 10, &token())
        .await
        .unwrap();
    let names: Vec<_> = results
        .iter()
        .map(|a| a.neighborhood.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Centro", "Centro Histórico"]);

    let results = svc
        .autocomplete("sao", Some(AutocompleteKind::Locality), None, 1, &token())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].locality.as_deref(), Some("São Paulo"));
}

#[tokio::test]
async fn autocomplete_input_is_validated() {
    let svc = service();
    let cancel = token();
    for (term, limit, uf) in [("pa", 10, None), ("  pa  ", 10, None), ("paulista", 0, None), ("paulista", 51, None), ("paulista", 10, Some("XYZ"))] {
        assert!(
            matches!(
                svc.autocomplete(term, None, uf, limit, &cancel).await,
                Err(CepError::Format(_))
            ),
            "term {term:?} limit {limit} uf {uf:?}"
        );
    }
}

#[tokio::test]
async fn catalog_street_search_matches_type_prefix() {
    let svc = service();
    let q = StreetQuery {
        name: Some("avenida paulista".into()),
        ..StreetQuery::default()
    };
    let page = svc.search_streets(&q, 1, 10, &token()).await.unwrap();
    let ids: Vec<u32> = page.items.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![100, 101]);

    let q = StreetQuery {
        cep: Some("01426-001".into()),
        ..StreetQuery::default()
    };
    let page = svc.search_streets(&q, 1, 10, &token()).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Oscar Freire");
}

#[tokio::test]
async fn catalog_lookups_by_id_and_relation() {
    let svc = service();
    let cancel = token();

    let sp = svc.locality_by_id(1, &cancel).await.unwrap();
    assert_eq!(sp.as_found().map(|l| l.name.as_str()), Some("São Paulo"));
    assert!(matches!(svc.locality_by_id(12345, &cancel).await.unwrap(), Lookup::NotFound(_)));

    let localities = svc.localities_by_uf("sp", &cancel).await.unwrap();
    assert_eq!(localities.len(), 4);
    assert!(localities.iter().all(|l| l.uf == "SP"));

    let neighborhoods = svc.neighborhoods_by_locality(1, &cancel).await.unwrap();
    assert_eq!(neighborhoods.len(), 4);

    let mut touching: Vec<u32> = svc
        .streets_by_neighborhood(11, &cancel)
        .await
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    touching.sort_unstable();
    assert_eq!(touching, vec![100, 101, 104]);

    let streets = svc.streets_by_locality(2, &cancel).await.unwrap();
    assert_eq!(streets.len(), 1);

    let street = svc.street_by_cep("01426-001", &cancel).await.unwrap();
    assert_eq!(street.as_found().map(|s| s.id), Some(104));
    assert!(!svc.street_by_cep("01310-922", &cancel).await.unwrap().is_found());

    let n = svc.neighborhood_by_id(20, &cancel).await.unwrap();
    assert_eq!(n.as_found().map(|n| n.locality_id), Some(8));
    assert!(svc.street_by_id(112, &cancel).await.unwrap().is_found());
}

#[tokio::test]
async fn catalog_filters_combine() {
    let svc = service();
    let cancel = token();

    let q = LocalityQuery {
        ibge_code: Some(3550308),
        ..LocalityQuery::default()
    };
    let page = svc.search_localities(&q, 1, 10, &cancel).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, 1);

    let q = NeighborhoodQuery {
        locality: Some("são paulo".into()),
        ..NeighborhoodQuery::default()
    };
    let page = svc.search_neighborhoods(&q, 1, 10, &cancel).await.unwrap();
    let names: Vec<_> = page.items.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Bela Vista", "Cerqueira César", "Consolação", "Sé"]);

    let q = NeighborhoodQuery {
        name: Some("centro".into()),
        uf: Some("RJ".into()),
        ..NeighborhoodQuery::default()
    };
    let page = svc.search_neighborhoods(&q, 1, 10, &cancel).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, 16);
}
