//! Per-country activation statistics.

use serde::{Deserialize, Serialize};

/// Activations from one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryActivations {
    pub country: String,
    pub activations_count: u64,
}

/// Activation totals for one promo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoStats {
    pub activations_count: u64,
    pub countries: Vec<CountryActivations>,
}

impl PromoStats {
    /// Builds stats from raw `(country, count)` rows.
    ///
    /// Countries are ordered case-insensitively; zero counts are dropped.
    pub fn from_counts(counts: impl IntoIterator<Item = (String, u64)>) -> Self {
        let mut countries: Vec<CountryActivations> = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(country, activations_count)| CountryActivations {
                country,
                activations_count,
            })
            .collect();
        countries.sort_by(|a, b| {
            a.country
                .to_lowercase()
                .cmp(&b.country.to_lowercase())
                .then_with(|| a.country.cmp(&b.country))
        });

        let activations_count = countries.iter().map(|c| c.activations_count).sum();
        Self {
            activations_count,
            countries,
        }
    }
}
