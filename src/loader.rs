//! CSV ingestion of period records and peer rosters
//!
//! Periods: `id,parentId,month,totalClaims,memberMonths,adminFees,stopLossRecovery,targetPepm`
//! (`parentId`, `adminFees` and `stopLossRecovery` may be empty).
//!
//! Peers: `id,name,industry,size,fundingType,carrier,planType,network,pepmActual,pepmTarget,savings,sparkline`
//! where `sparkline` is an optional `;`-separated series.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::debug;

use crate::error::LoadError;
use crate::grid::PeriodRecord;
use crate::peers::{PeerOrganization, ReferenceOrganization};

/// Raw CSV row of a period file
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeriodCsvRow {
    id: String,
    #[serde(default)]
    parent_id: Option<String>,
    month: String,
    total_claims: f64,
    member_months: f64,
    #[serde(default)]
    admin_fees: Option<f64>,
    #[serde(default)]
    stop_loss_recovery: Option<f64>,
    target_pepm: f64,
}

impl PeriodCsvRow {
    fn to_record(self, row: usize) -> Result<PeriodRecord, LoadError> {
        let invalid = |message: String| LoadError::InvalidRecord { row, message };

        if self.id.trim().is_empty() {
            return Err(invalid("empty id".to_string()));
        }
        for (field, value) in [
            ("totalClaims", self.total_claims),
            ("memberMonths", self.member_months),
            ("targetPepm", self.target_pepm),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be a finite number", field)));
            }
        }
        if self.member_months < 0.0 {
            return Err(invalid(format!("memberMonths cannot be negative ({})", self.member_months)));
        }

        Ok(PeriodRecord {
            id: self.id.trim().to_string(),
            parent_id: self.parent_id.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            month: self.month,
            total_claims: self.total_claims,
            member_months: self.member_months,
            admin_fees: self.admin_fees.unwrap_or(0.0),
            stop_loss_recovery: self.stop_loss_recovery.unwrap_or(0.0),
            target_pepm: self.target_pepm,
        })
    }
}

/// Raw CSV row of a peer roster
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeerCsvRow {
    id: String,
    name: String,
    industry: String,
    size: u32,
    funding_type: String,
    carrier: String,
    plan_type: String,
    network: String,
    pepm_actual: f64,
    pepm_target: f64,
    savings: f64,
    #[serde(default)]
    sparkline: Option<String>,
}

impl PeerCsvRow {
    fn to_peer(self, row: usize) -> Result<PeerOrganization, LoadError> {
        let sparkline_data = match self.sparkline.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(series) => Some(
                series
                    .split(';')
                    .map(|v| v.trim().parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| LoadError::InvalidRecord {
                        row,
                        message: format!("sparkline: {}", e),
                    })?,
            ),
        };

        Ok(PeerOrganization {
            id: self.id,
            name: self.name,
            industry: self.industry,
            size: self.size,
            funding_type: self.funding_type,
            carrier: self.carrier,
            plan_type: self.plan_type,
            network: self.network,
            pepm_actual: self.pepm_actual,
            pepm_target: self.pepm_target,
            savings: self.savings,
            sparkline_data,
        })
    }
}

/// Read period records; ids must be unique
pub fn read_periods<R: Read>(reader: R) -> Result<Vec<PeriodRecord>, LoadError> {
    let mut reader = Reader::from_reader(reader);
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for (i, result) in reader.deserialize().enumerate() {
        let row: PeriodCsvRow = result?;
        let record = row.to_record(i + 1)?;
        if !seen.insert(record.id.clone()) {
            return Err(LoadError::InvalidRecord {
                row: i + 1,
                message: format!("duplicate id {}", record.id),
            });
        }
        records.push(record);
    }

    debug!("read {} period records", records.len());
    Ok(records)
}

/// Load period records from a CSV file
pub fn load_periods<P: AsRef<Path>>(path: P) -> Result<Vec<PeriodRecord>, LoadError> {
    read_periods(std::fs::File::open(path)?)
}

pub fn read_peers<R: Read>(reader: R) -> Result<Vec<PeerOrganization>, LoadError> {
    let mut reader = Reader::from_reader(reader);
    let mut peers = Vec::new();

    for (i, result) in reader.deserialize().enumerate() {
        let row: PeerCsvRow = result?;
        peers.push(row.to_peer(i + 1)?);
    }

    debug!("read {} peer organizations", peers.len());
    Ok(peers)
}

/// Load a peer roster from a CSV file
pub fn load_peers<P: AsRef<Path>>(path: P) -> Result<Vec<PeerOrganization>, LoadError> {
    read_peers(std::fs::File::open(path)?)
}

/// Split a roster into the reference organization and its candidates
pub fn split_reference(
    roster: &[PeerOrganization],
    reference_id: &str,
) -> Result<(ReferenceOrganization, Vec<PeerOrganization>), LoadError> {
    let reference = roster
        .iter()
        .find(|org| org.id == reference_id)
        .map(ReferenceOrganization::from)
        .ok_or_else(|| LoadError::UnknownOrganization(reference_id.to_string()))?;
    let candidates = roster.iter().filter(|org| org.id != reference_id).cloned().collect();
    Ok((reference, candidates))
}
