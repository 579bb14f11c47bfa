use crate::models::{
    MetricResult, MetricSpec, MetricValue, CURRENCY_SUFFIX, NOT_AVAILABLE, PRICE_FALLBACK,
};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

pub const NAME_SELECTOR: &str = "h1.headline";
pub const PRICE_SELECTOR: &str = "span.price";
pub const CELL_SELECTOR: &str = "td";

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("invalid selector {}: {:?}", css, e);
            None
        }
    }
}

/// All descendant text of `element`, trimmed.
pub fn normalized_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first element matching `css`, or `None` when nothing matches.
pub fn find_first_text(document: &Html, css: &str) -> Option<String> {
    let selector = parse_selector(css)?;
    document
        .select(&selector)
        .next()
        .map(|element| normalized_text(&element))
}

/// The next `td` in the same row, skipping text nodes and any other element.
pub fn next_sibling_cell<'a>(cell: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    cell.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == CELL_SELECTOR)
}

struct Cell<'a> {
    element: ElementRef<'a>,
    text: String,
}

fn table_cells(document: &Html) -> Vec<Cell<'_>> {
    let Some(selector) = parse_selector(CELL_SELECTOR) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|element| Cell {
            text: normalized_text(&element),
            element,
        })
        .collect()
}

// Substring match: the first cell in document order containing `label` wins,
// even when a later cell would match it more precisely.
fn lookup(cells: &[Cell], label: &str) -> Option<String> {
    let cell = cells.iter().find(|cell| cell.text.contains(label))?;
    let value = next_sibling_cell(&cell.element).map(|sibling| normalized_text(&sibling))?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Pulls name, price and every metric in `spec` out of `document`.
///
/// Never fails: anything missing becomes [`NOT_AVAILABLE`], a missing price
/// becomes [`PRICE_FALLBACK`]. The price always gets [`CURRENCY_SUFFIX`].
pub fn extract(document: &Html, spec: &MetricSpec) -> MetricResult {
    let name = find_first_text(document, NAME_SELECTOR).unwrap_or_else(|| {
        debug!("no element for {}", NAME_SELECTOR);
        NOT_AVAILABLE.to_string()
    });
    let price = find_first_text(document, PRICE_SELECTOR).unwrap_or_else(|| {
        debug!("no element for {}", PRICE_SELECTOR);
        PRICE_FALLBACK.to_string()
    });

    let cells = table_cells(document);
    let metrics = spec
        .labels()
        .iter()
        .map(|metric| {
            let value = lookup(&cells, &metric.label).unwrap_or_else(|| {
                debug!("no value for {} (label {:?})", metric.key, metric.label);
                NOT_AVAILABLE.to_string()
            });
            MetricValue {
                key: metric.key.clone(),
                value,
            }
        })
        .collect();

    MetricResult {
        name,
        price: format!("{}{}", price, CURRENCY_SUFFIX),
        metrics,
    }
}

/// Parses `html` and runs [`extract`] on it.
pub fn extract_from_str(html: &str, spec: &MetricSpec) -> MetricResult {
    let document = Html::parse_document(html);
    extract(&document, spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricLabel;

    fn page(body: &str) -> String {
        format!("<!DOCTYPE html><html><head><title>t</title></head><body>{}</body></html>", body)
    }

    fn rows(rows: &[(&str, &str)]) -> String {
        let mut html = String::from("<table><tbody>");
        for (label, value) in rows {
            html.push_str(&format!("<tr><td>{}</td><td>{}</td></tr>", label, value));
        }
        html.push_str("</tbody></table>");
        html
    }

    #[test]
    fn basf_page_with_one_row() {
        let html = page(&format!(
            r#"<h1 class="headline"> BASF SE </h1><span class="price">62,50</span>{}"#,
            rows(&[("KGV (aktuell)", "11,2")])
        ));
        let result = extract_from_str(&html, &MetricSpec::value_investor());

        assert_eq!(result.name, "BASF SE");
        assert_eq!(result.price, "62,50 €");
        assert_eq!(result.get("KGV"), Some("11,2"));
        assert_eq!(result.get("KBV"), Some("N/A"));
        assert_eq!(result.get("KUV"), Some("N/A"));
        assert_eq!(result.get("Dividendenrendite"), Some("N/A"));
        assert_eq!(result.get("Eigenkapitalrendite"), Some("N/A"));
        assert_eq!(result.get("Marktkapitalisierung"), Some("N/A"));
    }

    #[test]
    fn empty_document_is_all_sentinels() {
        let spec = MetricSpec::value_investor();
        let result = extract_from_str("", &spec);

        assert_eq!(result.name, "N/A");
        assert_eq!(result.price, "0,00 €");
        assert_eq!(result.metrics.len(), spec.len());
        assert!(result.metrics.iter().all(|m| m.value == "N/A"));
    }

    #[test]
    fn every_spec_key_is_present_in_order() {
        let spec = MetricSpec::value_investor();
        let result = extract_from_str(&page("<p>login required</p>"), &spec);
        let keys: Vec<_> = result.metrics.iter().map(|m| m.key.as_str()).collect();
        let expected: Vec<_> = spec.labels().iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn first_matching_row_wins() {
        let html = page(&rows(&[
            ("Dividendenrendite", "3,10 %"),
            ("Dividendenrendite", "4,20 %"),
        ]));
        let spec = MetricSpec::new(vec![MetricLabel::new("Dividendenrendite", "Dividendenrendite")])
            .unwrap();
        let result = extract_from_str(&html, &spec);
        assert_eq!(result.get("Dividendenrendite"), Some("3,10 %"));
    }

    #[test]
    fn longer_label_skips_earlier_shorter_cell() {
        let html = page(&rows(&[
            ("Dividendenrendite", "3,10 %"),
            ("Dividendenrendite (erwartet)", "3,40 %"),
        ]));
        let spec = MetricSpec::new(vec![
            MetricLabel::new("Erwartet", "Dividendenrendite (erwartet)"),
            MetricLabel::new("Aktuell", "Dividendenrendite"),
        ])
        .unwrap();
        let result = extract_from_str(&html, &spec);
        assert_eq!(result.get("Erwartet"), Some("3,40 %"));
        assert_eq!(result.get("Aktuell"), Some("3,10 %"));
    }

    #[test]
    fn shorter_label_matches_inside_longer_cell_text() {
        let html = page(&rows(&[("KBV (Buchwert je Aktie)", "1,3"), ("KBV", "9,9")]));
        let spec = MetricSpec::new(vec![MetricLabel::new("KBV", "KBV")]).unwrap();
        assert_eq!(extract_from_str(&html, &spec).get("KBV"), Some("1,3"));
    }

    #[test]
    fn missing_or_empty_sibling_is_sentinel() {
        let html = page(
            "<table><tr><td>KUV</td></tr><tr><td>KBV</td><td>   </td></tr></table>",
        );
        let spec = MetricSpec::new(vec![
            MetricLabel::new("KUV", "KUV"),
            MetricLabel::new("KBV", "KBV"),
        ])
        .unwrap();
        let result = extract_from_str(&html, &spec);
        assert_eq!(result.get("KUV"), Some("N/A"));
        assert_eq!(result.get("KBV"), Some("N/A"));
    }

    #[test]
    fn sibling_lookup_skips_header_cells_and_trims_nested_text() {
        let html = page(
            "<table><tr><td>Marktkapitalisierung</td><th>Mrd.</th>\n\
             <td> <span>45,1</span> <span>Mrd. €</span> </td></tr></table>",
        );
        let document = Html::parse_document(&html);
        assert_eq!(
            lookup(&table_cells(&document), "Marktkapitalisierung").as_deref(),
            Some("45,1 Mrd. €")
        );
    }

    #[test]
    fn outer_cell_is_matched_before_nested_cell() {
        let html = page(
            "<table><tr>\
             <td><table><tr><td>KGV (aktuell)</td><td>9,0</td></tr></table></td>\
             <td>outer</td>\
             </tr></table>",
        );
        let spec = MetricSpec::new(vec![MetricLabel::new("KGV", "KGV (aktuell)")]).unwrap();
        assert_eq!(extract_from_str(&html, &spec).get("KGV"), Some("outer"));
    }

    #[test]
    fn present_but_empty_name_and_price_are_kept_empty() {
        let html = page(r#"<h1 class="headline">  </h1><span class="price"></span>"#);
        let result = extract_from_str(&html, &MetricSpec::value_investor());
        assert_eq!(result.name, "");
        assert_eq!(result.price, " €");
    }

    #[test]
    fn name_and_price_use_first_element_only() {
        let html = page(
            r#"<h1>Other</h1><h1 class="headline">Siemens AG</h1><h1 class="headline">Second</h1>
               <span class="price">180,04</span><span class="price">1,00</span>"#,
        );
        let result = extract_from_str(&html, &MetricSpec::value_investor());
        assert_eq!(result.name, "Siemens AG");
        assert_eq!(result.price, "180,04 €");
    }

    #[test]
    fn repeated_extraction_is_deterministic() {
        let html = page(&format!(
            r#"<h1 class="headline">Allianz SE</h1>{}"#,
            rows(&[("KGV (aktuell)", "12,0"), ("Eigenkapitalrendite", "14,5 %")])
        ));
        let document = Html::parse_document(&html);
        let spec = MetricSpec::value_investor();
        assert_eq!(extract(&document, &spec), extract(&document, &spec));
    }
}
