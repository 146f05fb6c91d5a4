use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::ExtractionError;
use crate::models::{FuelType, ListingRecord, Transmission, FUEL_LABELS, TRANSMISSION_LABELS};
use crate::scrapers::dates::DateNormalizer;

const MAX_POWER_HP: u32 = 2000;
const MILEAGE_MARKER: &str = "тыс";
const POWER_MARKER: &str = "л.с.";
/// Currency amount plus a non-breaking space and the ruble sign.
const PRICE_SUFFIX_CHARS: usize = 2;

/// Raw per-listing fragments, already scoped to one listing anchor by the
/// page parser. Everything here is plain text; no DOM types cross this
/// boundary.
#[derive(Debug, Default, Clone)]
pub struct ListingFragments {
    /// JSON-LD source text of the listing's metadata block.
    pub metadata: String,
    /// Concatenated rendered text of the whole listing anchor.
    pub header: String,
    /// Short rendered detail fragments (engine, fuel, mileage, ...).
    pub details: Vec<String>,
    pub price: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub link: Option<String>,
}

/// Structured metadata as embedded in the page. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingMeta {
    brand: BrandMeta,
    name: String,
    body_type: Option<String>,
    color: Option<String>,
    fuel_type: Option<String>,
    model_date: Option<serde_json::Value>,
    vehicle_transmission: Option<String>,
    vehicle_configuration: Option<String>,
    vehicle_engine: Option<EngineMeta>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrandMeta {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngineMeta {
    name: Option<String>,
    engine_displacement: Option<String>,
}

/// Builds one [`ListingRecord`] out of a listing's aligned fragments,
/// cross-referencing the structured metadata block with the rendered
/// text. Label vocabularies are injected at construction.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    dates: DateNormalizer,
    fuels: &'static [(&'static str, FuelType)],
    transmissions: &'static [(&'static str, Transmission)],
}

impl ListingExtractor {
    pub fn new() -> Self {
        Self {
            dates: DateNormalizer::new(),
            fuels: FUEL_LABELS,
            transmissions: TRANSMISSION_LABELS,
        }
    }

    pub fn extract(
        &self,
        fragments: &ListingFragments,
        fetched_at: NaiveDateTime,
    ) -> Result<ListingRecord, ExtractionError> {
        let meta: ListingMeta = serde_json::from_str(fragments.metadata.trim())?;

        let link = fragments
            .link
            .clone()
            .ok_or(ExtractionError::MissingFragment("link"))?;
        let price = fragments
            .price
            .as_deref()
            .ok_or(ExtractionError::MissingFragment("price"))?;
        let date = fragments
            .date
            .as_deref()
            .ok_or(ExtractionError::MissingFragment("publication date"))?;
        let location = fragments
            .location
            .clone()
            .ok_or(ExtractionError::MissingFragment("location"))?;

        let date = self.dates.normalize(date, fetched_at)?;
        let mileage = mileage_from_details(&fragments.details)?;

        let (engine_name, engine_displacement) = match meta.vehicle_engine {
            Some(engine) => (engine.name, engine.engine_displacement),
            None => (None, None),
        };

        Ok(ListingRecord {
            name: model_name(&meta.name, &meta.brand.name),
            brand: meta.brand.name,
            body_type: meta.body_type,
            color: meta.color,
            fuel_type: meta.fuel_type.as_deref().and_then(|l| lookup(self.fuels, l)),
            year: meta.model_date.as_ref().and_then(year_of),
            mileage,
            transmission: meta
                .vehicle_transmission
                .as_deref()
                .and_then(|l| lookup(self.transmissions, l)),
            power: power_from_header(&fragments.header),
            price: clean_price(price),
            vehicle_configuration: meta.vehicle_configuration,
            engine_name,
            engine_displacement,
            date,
            location,
            link,
            description: meta.description.as_deref().map(collapse_whitespace),
        })
    }
}

impl Default for ListingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<T: Copy>(table: &[(&str, T)], label: &str) -> Option<T> {
    table
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, value)| *value)
}

/// The combined name field reads "Toyota Camry, 2019"; drop the trim
/// suffix, then the brand prefix.
fn model_name(full: &str, brand: &str) -> String {
    let head = full.split(", ").next().unwrap_or(full);
    head.strip_prefix(brand)
        .map(str::trim_start)
        .unwrap_or(head)
        .to_string()
}

/// Model year arrives as either a JSON number or a string.
fn year_of(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().map(|n| n as i32),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Mileage lives in the one detail fragment carrying the "тыс" unit
/// marker; the marker expands to a "000" suffix. No marked fragment
/// means the listing simply has no mileage. A marked fragment that still
/// fails to parse is malformed and fails the listing.
fn mileage_from_details(details: &[String]) -> Result<Option<u64>, ExtractionError> {
    let Some(raw) = details.iter().find(|text| text.contains(MILEAGE_MARKER)) else {
        return Ok(None);
    };
    let digits = raw
        .replace([' ', '\u{a0}'], "")
        .replace("тыс.км", "000")
        .replace([',', '<'], "");
    digits
        .parse()
        .map(Some)
        .map_err(|_| ExtractionError::Mileage(raw.clone()))
}

/// Power hides in the comma-separated header segment that carries the
/// horsepower marker, as a parenthesized value: "2.5 л (181 л.с.)".
/// Values above the sanity bound are bogus and collapse to absent.
fn power_from_header(header: &str) -> Option<u32> {
    let segment = header.split(", ").find(|s| s.contains(POWER_MARKER))?;
    let tail = segment.rsplit('(').next().unwrap_or(segment);
    let value: u32 = tail
        .trim_end_matches(')')
        .trim_end()
        .trim_end_matches(POWER_MARKER)
        .trim()
        .parse()
        .ok()?;
    (1..=MAX_POWER_HP).contains(&value).then_some(value)
}

/// Drop the fixed currency suffix, then every space separator, keeping
/// the amount as text.
fn clean_price(raw: &str) -> String {
    let mut chars: Vec<char> = raw.chars().collect();
    chars.truncate(chars.len().saturating_sub(PRICE_SUFFIX_CHARS));
    chars
        .into_iter()
        .filter(|c| *c != ' ' && *c != '\u{a0}')
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fetched_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn camry_fragments() -> ListingFragments {
        ListingFragments {
            metadata: concat!(
                r#"{"brand":{"name":"Toyota"},"name":"Toyota Camry, 2019","#,
                r#""bodyType":"седан","color":"белый","fuelType":"бензин","#,
                r#""modelDate":2019,"vehicleTransmission":"АКПП","#,
                r#""vehicleConfiguration":"2.5 AT","#,
                r#""vehicleEngine":{"name":"2AR-FE","engineDisplacement":"2.5"},"#,
                r#""description":"Отличное  состояние.\nОдин владелец."}"#,
            )
            .to_string(),
            header: "Toyota Camry, 2019, 2.5 л (150 л.с.), бензин, АКПП, 85 тыс.км".into(),
            details: vec![
                "2.5 л (150 л.с.)".into(),
                "бензин".into(),
                "АКПП".into(),
                "85 тыс.км".into(),
            ],
            price: Some("1\u{a0}200\u{a0}000\u{a0}₽".into()),
            date: Some("15 марта".into()),
            location: Some("Владивосток".into()),
            link: Some("https://auto.drom.ru/toyota/camry/12345.html".into()),
        }
    }

    #[test]
    fn extracts_a_full_record() {
        let extractor = ListingExtractor::new();
        let record = extractor.extract(&camry_fragments(), fetched_at()).unwrap();

        assert_eq!(record.brand, "Toyota");
        assert_eq!(record.name, "Camry");
        assert_eq!(record.body_type.as_deref(), Some("седан"));
        assert_eq!(record.fuel_type, Some(FuelType::Gasoline));
        assert_eq!(record.year, Some(2019));
        assert_eq!(record.mileage, Some(85_000));
        assert_eq!(record.transmission, Some(Transmission::Automatic));
        assert_eq!(record.power, Some(150));
        assert_eq!(record.price, "1200000");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(record.location, "Владивосток");
        assert_eq!(record.engine_name.as_deref(), Some("2AR-FE"));
        assert_eq!(
            record.description.as_deref(),
            Some("Отличное состояние. Один владелец.")
        );
    }

    #[test]
    fn model_year_given_as_string_still_parses() {
        let mut fragments = camry_fragments();
        fragments.metadata = fragments.metadata.replace(r#""modelDate":2019"#, r#""modelDate":"2019""#);
        let extractor = ListingExtractor::new();
        let record = extractor.extract(&fragments, fetched_at()).unwrap();
        assert_eq!(record.year, Some(2019));
    }

    #[test]
    fn oversized_power_collapses_to_absent() {
        let mut fragments = camry_fragments();
        fragments.header = "Toyota Camry, 2019, 2.5 л (2500 л.с.), бензин".into();
        let extractor = ListingExtractor::new();
        let record = extractor.extract(&fragments, fetched_at()).unwrap();
        assert_eq!(record.power, None);
    }

    #[test]
    fn power_without_parentheses_still_parses() {
        assert_eq!(power_from_header("ВАЗ 2107, 1988, 75 л.с., бензин"), Some(75));
    }

    #[test]
    fn no_mileage_fragment_means_absent() {
        let mut fragments = camry_fragments();
        fragments.details.retain(|d| !d.contains("тыс"));
        let extractor = ListingExtractor::new();
        let record = extractor.extract(&fragments, fetched_at()).unwrap();
        assert_eq!(record.mileage, None);
    }

    #[test]
    fn garbled_mileage_fragment_fails_the_listing() {
        let mut fragments = camry_fragments();
        fragments.details = vec!["~тыс.км".into()];
        let extractor = ListingExtractor::new();
        let err = extractor.extract(&fragments, fetched_at()).unwrap_err();
        assert!(matches!(err, ExtractionError::Mileage(_)));
    }

    #[test]
    fn missing_price_fails_the_listing() {
        let mut fragments = camry_fragments();
        fragments.price = None;
        let extractor = ListingExtractor::new();
        let err = extractor.extract(&fragments, fetched_at()).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingFragment("price")));
    }

    #[test]
    fn broken_metadata_fails_the_listing() {
        let mut fragments = camry_fragments();
        fragments.metadata = "not json at all".into();
        let extractor = ListingExtractor::new();
        let err = extractor.extract(&fragments, fetched_at()).unwrap_err();
        assert!(matches!(err, ExtractionError::Metadata(_)));
    }

    #[test]
    fn unknown_fuel_label_collapses_to_absent() {
        let mut fragments = camry_fragments();
        fragments.metadata = fragments
            .metadata
            .replace(r#""fuelType":"бензин""#, r#""fuelType":"водород""#);
        let extractor = ListingExtractor::new();
        let record = extractor.extract(&fragments, fetched_at()).unwrap();
        assert_eq!(record.fuel_type, None);
    }

    #[test]
    fn date_phrase_outside_the_vocabulary_surfaces() {
        let mut fragments = camry_fragments();
        fragments.date = Some("позавчера".into());
        let extractor = ListingExtractor::new();
        let err = extractor.extract(&fragments, fetched_at()).unwrap_err();
        assert!(matches!(err, ExtractionError::Date(_)));
    }
}
