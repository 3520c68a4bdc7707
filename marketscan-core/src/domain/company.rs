//! Company metadata — sector and industry classification for report grouping.

use serde::{Deserialize, Serialize};

/// Listing metadata for a symbol.
///
/// Sector and industry are optional: symbols with no classification still
/// participate in the price-based report passes, they just never appear in the
/// grouped leader sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub symbol: String,
    pub company_name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
}
