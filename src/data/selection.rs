use super::model::{EmissionRecord, TemperatureRecord};

/// Dropdown value that clears the region selection.
pub const NO_SELECTION: &str = "None";

// ---------------------------------------------------------------------------
// Selection: the (region, country) pair coming from the two dropdowns
// ---------------------------------------------------------------------------

/// Normalized selector state. Absent, empty and `"None"` are the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    region: Option<String>,
    country: Option<String>,
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != NO_SELECTION)
        .map(str::to_string)
}

impl Selection {
    pub fn new(region: Option<&str>, country: Option<&str>) -> Self {
        Selection {
            region: normalize(region),
            country: normalize(country),
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Changing the region keeps the country; callers drop it when it no
    /// longer belongs to the region (see [`Selection::retain_country_in`]).
    pub fn set_region(&mut self, region: Option<&str>) {
        self.region = normalize(region);
    }

    pub fn set_country(&mut self, country: Option<&str>) {
        self.country = normalize(country);
    }

    /// Clear the country unless it is one of `options`.
    pub fn retain_country_in(&mut self, options: &[String]) {
        if let Some(country) = &self.country {
            if !options.iter().any(|o| o == country) {
                self.country = None;
            }
        }
    }

    /// The single granularity this selection resolves to.
    ///
    /// A country always wins over a region.
    pub fn scope(&self) -> Scope<'_> {
        match (self.country.as_deref(), self.region.as_deref()) {
            (None, None) => Scope::Global,
            (None, Some(region)) => Scope::Region(region),
            (Some(country), _) => Scope::Country(country),
        }
    }
}

/// Which rows an aggregate series is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Global,
    Region(&'a str),
    Country(&'a str),
}

/// Rows carrying the region/country columns a [`Scope`] filters on.
pub trait Located {
    fn region(&self) -> &str;
    fn country(&self) -> &str;
}

impl<'a> Scope<'a> {
    pub fn matches<R: Located>(&self, row: &R) -> bool {
        match *self {
            Scope::Global => true,
            Scope::Region(region) => row.region() == region,
            Scope::Country(country) => row.country() == country,
        }
    }
}

impl Located for EmissionRecord {
    fn region(&self) -> &str {
        &self.region
    }

    fn country(&self) -> &str {
        &self.country
    }
}

impl Located for TemperatureRecord {
    fn region(&self) -> &str {
        &self.region
    }

    fn country(&self) -> &str {
        &self.country
    }
}

// ---------------------------------------------------------------------------
// Option lists for the dropdowns
// ---------------------------------------------------------------------------

/// Distinct values in first-seen order.
fn first_seen<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Countries of `region`, for the dependent country dropdown.
pub fn country_options(records: &[EmissionRecord], region: Option<&str>) -> Vec<String> {
    let Some(region) = normalize(region) else {
        return Vec::new();
    };
    first_seen(
        records
            .iter()
            .filter(|r| r.region == region)
            .map(|r| r.country.as_str()),
    )
}

/// Regions in first-seen order, followed by the clearing `"None"` entry.
pub fn region_options(records: &[EmissionRecord]) -> Vec<String> {
    let mut regions = first_seen(records.iter().map(|r| r.region.as_str()));
    regions.push(NO_SELECTION.to_string());
    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emission(country: &str, region: &str) -> EmissionRecord {
        EmissionRecord {
            country: country.into(),
            region: region.into(),
            continent: "K".into(),
            year: 2000,
            co2_emission: 1.0,
        }
    }

    #[test]
    fn none_sentinel_and_empty_are_absent() {
        assert_eq!(Selection::new(Some("None"), None), Selection::default());
        assert_eq!(Selection::new(Some(""), Some("None")), Selection::default());
        assert_eq!(Selection::default().scope(), Scope::Global);
    }

    #[test]
    fn scope_is_a_strict_partition() {
        let regions = [None, Some("None"), Some("Asia")];
        let countries = [None, Some("Japan")];
        for region in regions {
            for country in countries {
                let sel = Selection::new(region, country);
                let expected = match (country, region) {
                    (Some(c), _) => Scope::Country(c),
                    (None, Some("Asia")) => Scope::Region("Asia"),
                    (None, _) => Scope::Global,
                };
                assert_eq!(sel.scope(), expected, "{region:?} / {country:?}");
            }
        }
    }

    #[test]
    fn country_options_first_seen_without_duplicates() {
        let rows = [
            emission("Peru", "South America"),
            emission("Chile", "South America"),
            emission("Japan", "Eastern Asia"),
            emission("Peru", "South America"),
        ];
        assert_eq!(
            country_options(&rows, Some("South America")),
            vec!["Peru".to_string(), "Chile".to_string()]
        );
        assert!(country_options(&rows, Some("Atlantis")).is_empty());
        assert!(country_options(&rows, Some("None")).is_empty());
        assert!(country_options(&rows, None).is_empty());
    }

    #[test]
    fn region_options_end_with_none() {
        let rows = [emission("Peru", "South America"), emission("Japan", "Eastern Asia")];
        assert_eq!(
            region_options(&rows),
            vec!["South America", "Eastern Asia", "None"]
        );
    }

    #[test]
    fn retain_country_drops_foreign_country() {
        let mut sel = Selection::new(Some("Eastern Asia"), Some("Peru"));
        sel.retain_country_in(&["Japan".to_string()]);
        assert_eq!(sel.country(), None);
        assert_eq!(sel.scope(), Scope::Region("Eastern Asia"));
    }
}
