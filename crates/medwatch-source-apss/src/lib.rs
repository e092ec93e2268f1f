// # APSS Registry Source
//
// This crate provides a RegistrySource implementation backed by the public
// APSS general-practitioner registry.
//
// ## Architecture
//
// Two pages are consumed:
// - The listing page (`listamedici.php`), one request per run, queried by
//   health district or by municipality. Its result table is the source of
//   truth for ids, names and availability.
// - The per-doctor detail page (`medico.php`), one request per cache miss,
//   from which practice locations are extracted.
//
// ## Parsing contract
//
// The listing parser is strict: a missing table, a short row, or a detail
// link without a doctor code is an error, because a structurally changed
// page means the scrape can no longer be trusted and the run must abort
// rather than report the whole registry as removed. The detail parser's
// failures, by contrast, are degraded to an empty location list by the
// caller.

use async_trait::async_trait;
use medwatch_core::config::SourceConfig;
use medwatch_core::model::Doctor;
use medwatch_core::traits::RegistrySource;
use medwatch_core::{Error, Result};
use scraper::{Html, Selector};
use std::time::Duration;

/// Listing page for the registry search
const LISTING_URL: &str = "https://servizi.apss.tn.it/ricmedico/listamedici.php";

/// Per-doctor detail page
const DETAIL_URL: &str = "https://servizi.apss.tn.it/ricmedico/medico.php";

/// Default HTTP timeout for registry requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// RegistrySource implementation for the APSS public registry
#[derive(Debug)]
pub struct ApssSource {
    /// Full listing URL for the configured query mode
    search_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl ApssSource {
    /// Create a source for the given query mode
    pub fn new(config: &SourceConfig) -> Self {
        let search_url = match config {
            SourceConfig::District { district_id } => format!(
                "{}?tipoRicerca=ambito&tipoMedico=MMG&ambito={}",
                LISTING_URL, district_id
            ),
            SourceConfig::Municipality { code } => format!(
                "{}?tipoMedico=MMG&tipoRicerca=comune&comune={}&Ricerca=ricerca",
                LISTING_URL, code
            ),
        };

        Self {
            search_url,
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// The listing URL for the configured query mode.
    ///
    /// Also useful as the link target in notifications.
    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Detail page URL for a doctor
    pub fn detail_url(doctor_id: &str) -> String {
        format!("{}?codMedicoMg={}", DETAIL_URL, doctor_id)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::http(format!("failed to read response from {}: {}", url, e)))
    }
}

#[async_trait]
impl RegistrySource for ApssSource {
    async fn fetch_listing(&self) -> Result<Vec<Doctor>> {
        tracing::debug!("fetching listing from {}", self.search_url);
        let body = self
            .get_text(&self.search_url)
            .await
            .map_err(|e| Error::listing(e.to_string()))?;
        parse_listing(&body)
    }

    async fn fetch_locations(&self, doctor_id: &str) -> Result<Vec<String>> {
        let url = Self::detail_url(doctor_id);
        tracing::debug!("fetching detail page {}", url);
        let body = self
            .get_text(&url)
            .await
            .map_err(|e| Error::detail(e.to_string()))?;
        Ok(parse_locations(&body))
    }

    fn source_name(&self) -> &'static str {
        "apss"
    }
}

/// Parse the listing page's result table into doctor records.
///
/// Expected row layout: first name, last name, availability, detail link
/// carrying the doctor code in its `codMedicoMg` query parameter.
fn parse_listing(html: &str) -> Result<Vec<Doctor>> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("static selector");
    let tbody_sel = Selector::parse("tbody").expect("static selector");
    let row_sel = Selector::parse("tr").expect("static selector");
    let cell_sel = Selector::parse("td").expect("static selector");
    let link_sel = Selector::parse("a").expect("static selector");

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| Error::listing("doctor table not found in page"))?;

    let tbody = table
        .select(&tbody_sel)
        .next()
        .ok_or_else(|| Error::listing("table body (tbody) not found in doctor table"))?;

    let mut doctors = Vec::new();

    for row in tbody.select(&row_sel) {
        let cells: Vec<_> = row.select(&cell_sel).collect();
        if cells.len() < 4 {
            return Err(Error::listing(format!(
                "expected at least 4 columns in doctor row, found {}",
                cells.len()
            )));
        }

        let first_name = cell_text(&cells[0]);
        let last_name = cell_text(&cells[1]);
        let availability = cell_text(&cells[2]);

        let href = cells[3]
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| {
                Error::listing(format!(
                    "no detail link found for doctor: {} {}",
                    first_name, last_name
                ))
            })?;

        let doctor_id = doctor_id_from_href(href).ok_or_else(|| {
            Error::listing(format!("could not extract doctor code from URL: {}", href))
        })?;

        doctors.push(Doctor::new(doctor_id, first_name, last_name, availability));
    }

    Ok(doctors)
}

/// Extract practice locations from a detail page.
///
/// Locations appear as `<b>Comune: NAME</b>` fragments; duplicates are
/// dropped, page order is preserved.
fn parse_locations(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let bold_sel = Selector::parse("b").expect("static selector");

    let mut locations: Vec<String> = Vec::new();

    for tag in document.select(&bold_sel) {
        let text = tag.text().collect::<String>();
        let text = text.trim();
        if let Some(location) = text.strip_prefix("Comune:") {
            let location = location.trim();
            if !location.is_empty() && !locations.iter().any(|l| l == location) {
                locations.push(location.to_string());
            }
        }
    }

    locations
}

fn cell_text(cell: &scraper::ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn doctor_id_from_href(href: &str) -> Option<String> {
    let code = href.split("codMedicoMg=").nth(1)?;
    let code = code.split('&').next().unwrap_or(code);
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}
