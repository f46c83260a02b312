use phonenumber::Mode;
use serde::{Deserialize, Serialize};

/// Per-user identity hints used only to route alternative-data lookups.
///
/// The engine never validates these against a registry and never stores
/// them; they are forwarded to providers as-is after normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityHints {
    /// MSISDN for mobile-money and telecom lookups.
    pub phone_number: Option<String>,
    /// National id for employment/education registry lookups.
    pub national_id: Option<String>,
}

impl IdentityHints {
    /// Returns hints with the phone number normalized to E.164, dropping it
    /// if it does not parse as a valid number for the given region.
    pub fn normalized(&self, region: &str) -> Self {
        let phone_number = self.phone_number.as_deref().and_then(|raw| {
            let (valid, normalized) = validate_msisdn(raw, region);
            if valid {
                Some(normalized)
            } else {
                tracing::warn!("Skipping invalid phone hint for provider routing: {}", raw);
                None
            }
        });

        Self {
            phone_number,
            national_id: self
                .national_id
                .as_deref()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
        }
    }
}

/// Validate and normalize an MSISDN for the configured region.
///
/// Uses the phonenumber library (port of Google's libphonenumber) to:
/// - Parse the number with the region as fallback country
/// - Validate it
/// - Return the normalized E.164 form (+233241234567)
///
/// Returns: (is_valid, normalized_phone_or_error_msg)
pub fn validate_msisdn(raw: &str, region: &str) -> (bool, String) {
    // Skip empty or very short strings
    if raw.trim().is_empty() || raw.len() < 8 {
        return (false, "Phone too short".to_string());
    }

    let country: phonenumber::country::Id = match region.parse() {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Unknown phone region '{}', cannot validate", region);
            return (false, format!("Unknown region: {}", region));
        }
    };

    match phonenumber::parse(Some(country), raw) {
        Ok(number) => {
            if phonenumber::is_valid(&number) {
                let formatted = number.format().mode(Mode::E164).to_string();
                tracing::debug!("✓ Valid MSISDN: {} → {}", raw, formatted);
                (true, formatted)
            } else {
                tracing::warn!("❌ Invalid phone number for region {}: {}", region, raw);
                (false, "Invalid phone number for region".to_string())
            }
        }
        Err(e) => {
            tracing::warn!("❌ Failed to parse phone '{}': {:?}", raw, e);
            (false, format!("Parse error: {:?}", e))
        }
    }
}
