//! Organization records consumed by the ranker

use serde::{Deserialize, Serialize};

/// A candidate peer organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerOrganization {
    pub id: String,
    pub name: String,
    pub industry: String,
    /// Employee count
    pub size: u32,
    pub funding_type: String,
    pub carrier: String,
    pub plan_type: String,
    pub network: String,
    pub pepm_actual: f64,
    pub pepm_target: f64,
    pub savings: f64,
    /// Last 12 months of PEPM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparkline_data: Option<Vec<f64>>,
}

/// The organization peers are compared against
///
/// Every attribute is optional; a missing attribute simply never matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceOrganization {
    pub id: Option<String>,
    pub name: Option<String>,
    pub industry: Option<String>,
    pub size: Option<u32>,
    pub funding_type: Option<String>,
    pub carrier: Option<String>,
    pub plan_type: Option<String>,
    pub network: Option<String>,
    pub pepm_actual: Option<f64>,
}

impl From<&PeerOrganization> for ReferenceOrganization {
    fn from(org: &PeerOrganization) -> Self {
        Self {
            id: Some(org.id.clone()),
            name: Some(org.name.clone()),
            industry: Some(org.industry.clone()),
            size: Some(org.size),
            funding_type: Some(org.funding_type.clone()),
            carrier: Some(org.carrier.clone()),
            plan_type: Some(org.plan_type.clone()),
            network: Some(org.network.clone()),
            pepm_actual: Some(org.pepm_actual),
        }
    }
}
