//! Upstream query-string encoding

use super::Query;
use url::Url;

/// Sort criterion understood by the API ("prezzo" = price)
const SORT_CRITERION: &str = "prezzo";

/// Sort direction; partitioning depends on ascending price order
const SORT_ORDER: &str = "asc";

/// Encodes `query` at `page` as a request URL
///
/// Parameters already present on the endpoint are preserved. Optional filters
/// and open price bounds are omitted rather than sent empty.
pub(super) fn encode(query: &Query, page: u32) -> Url {
    let mut url = query.endpoint.clone();
    let filters = &query.filters;

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("fkRegione", &filters.region);
        if let Some(province) = &filters.province {
            pairs.append_pair("idProvincia", province);
        }
        if let Some(municipality) = &filters.municipality {
            pairs.append_pair("idComune", municipality);
        }
        pairs.append_pair("idNazione", &filters.nation);
        pairs.append_pair("idContratto", &filters.contract);
        pairs.append_pair("idCategoria", &filters.category);
        if let Some(min) = query.min_price {
            pairs.append_pair("prezzoMinimo", &min.to_string());
        }
        if let Some(max) = query.max_price {
            pairs.append_pair("prezzoMassimo", &max.to_string());
        }
        pairs.append_pair("criterio", SORT_CRITERION);
        pairs.append_pair("ordine", SORT_ORDER);
        pairs.append_pair("__lang", &filters.language);
        pairs.append_pair("path", "/");
        pairs.append_pair("pag", &page.to_string());
    }

    url
}
