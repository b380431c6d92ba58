use crate::models::{Booking, BookingStatus, Lead, LeadStatus, Property};
use serde::{de, Deserialize, Deserializer};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Catalog search parameters. Every supplied predicate must hold.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    /// Minimum price, inclusive
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<f64>,
    /// Maximum price, inclusive
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<f64>,
    /// Minimum number of bedrooms
    #[serde(default, deserialize_with = "empty_as_none")]
    pub bedrooms: Option<u32>,
    /// Case-insensitive substring of the location
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location: Option<String>,
    /// Case-insensitive substring of title, location or description
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub featured: Option<bool>,
}

impl PropertyFilter {
    pub fn matches(&self, property: &Property) -> bool {
        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }
        if self.bedrooms.is_some_and(|min| property.bedrooms < min) {
            return false;
        }
        if self.featured.is_some_and(|featured| property.featured != featured) {
            return false;
        }
        if let Some(location) = &self.location {
            if !contains_ignore_case(&property.location, location) {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let hit = contains_ignore_case(&property.title, term)
                || contains_ignore_case(&property.location, term)
                || contains_ignore_case(&property.description, term);
            if !hit {
                return false;
            }
        }
        true
    }

    /// Keep matching properties, in their original order
    pub fn apply<P: Borrow<Property>>(&self, properties: Vec<P>) -> Vec<P> {
        properties
            .into_iter()
            .filter(|p| self.matches(p.borrow()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<LeadStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source: Option<String>,
}

impl LeadFilter {
    pub fn apply<L: Borrow<Lead>>(&self, leads: Vec<L>) -> Vec<L> {
        leads
            .into_iter()
            .filter(|lead| {
                let lead = lead.borrow();
                self.status.is_none_or(|status| lead.status == status)
                    && self.source.as_ref().is_none_or(|source| &lead.source == source)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn apply<B: Borrow<Booking>>(&self, bookings: Vec<B>) -> Vec<B> {
        bookings
            .into_iter()
            .filter(|booking| {
                self.status
                    .is_none_or(|status| booking.borrow().status == status)
            })
            .collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Query-string values arrive as strings; an empty one means "not set"
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(id: &str, price: f64, bedrooms: u32, location: &str) -> Property {
        Property {
            id: id.to_string(),
            title: format!("{bedrooms} bed in {location}"),
            price,
            location: location.to_string(),
            bedrooms,
            description: "Quiet street".to_string(),
            ..Property::default()
        }
    }

    fn catalog() -> Vec<Property> {
        vec![
            property("1", 85000.0, 3, "E-11, Islamabad"),
            property("2", 65000.0, 2, "F-10, Islamabad"),
            property("3", 35000.0, 1, "G-9, Islamabad"),
            property("4", 90000.0, 2, "DHA, Lahore"),
            property("5", 95000.0, 4, "Bahria, Rawalpindi"),
            property("6", 50000.0, 2, "Gulberg, Lahore"),
        ]
    }

    fn filter_from(query: &str) -> PropertyFilter {
        let value: serde_json::Value = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect::<serde_json::Map<_, _>>()
            .into();
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn price_and_bedroom_predicates_combine_with_and() {
        let filter = filter_from("minPrice=50000&maxPrice=90000&bedrooms=2");
        let ids: Vec<_> = filter
            .apply(catalog())
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec!["1", "2", "4", "6"]);
    }

    #[test]
    fn empty_parameters_do_not_filter() {
        let filter = filter_from("minPrice=&maxPrice=&bedrooms=&location=");
        assert_eq!(filter.apply(catalog()).len(), 6);
    }

    #[test]
    fn location_and_search_are_case_insensitive() {
        let filter = filter_from("location=lahore");
        assert_eq!(filter.apply(catalog()).len(), 2);

        let filter = filter_from("search=QUIET");
        assert_eq!(filter.apply(catalog()).len(), 6);

        let filter = filter_from("search=rawalpindi&bedrooms=4");
        let hits = filter.apply(catalog());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "5");
    }

    #[test]
    fn unparseable_number_is_an_error() {
        let value = serde_json::json!({"minPrice": "cheap"});
        assert!(serde_json::from_value::<PropertyFilter>(value).is_err());
    }

    #[test]
    fn lead_filter_matches_status_and_source() {
        let leads = vec![
            Lead {
                id: "a".into(),
                source: "chatbot".into(),
                ..Lead::default()
            },
            Lead {
                id: "b".into(),
                source: "website".into(),
                status: LeadStatus::Contacted,
                ..Lead::default()
            },
        ];

        let filter = LeadFilter {
            status: Some(LeadStatus::New),
            source: None,
        };
        assert_eq!(filter.apply(leads.clone())[0].id, "a");

        let filter = LeadFilter {
            status: None,
            source: Some("website".into()),
        };
        assert_eq!(filter.apply(leads)[0].id, "b");
    }
}
