use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::database::models::PostOffice;
use crate::database::store::Store;
use crate::database::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fixture YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Duplicate pincode in fixture: {0}")]
    DuplicatePincode(String),

    #[error("Post office {pincode} references unknown division {division}")]
    UnknownDivision { pincode: String, division: String },

    #[error("Division cycle involving post office {0}")]
    Cycle(String),

    #[error("Post office {0} has an empty pincode or name")]
    Incomplete(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixturePostOffice {
    pub pincode: String,
    pub name: String,
    #[serde(default)]
    pub contact_no: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub division_pincode: Option<String>,
}

impl From<FixturePostOffice> for PostOffice {
    fn from(f: FixturePostOffice) -> Self {
        PostOffice {
            pincode: f.pincode,
            name: f.name,
            contact_no: f.contact_no,
            address: f.address,
            division_pincode: f.division_pincode,
        }
    }
}

/// A post-office hierarchy to import
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub post_offices: Vec<FixturePostOffice>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: usize,
    pub updated: usize,
}

impl Fixture {
    pub fn parse(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Post offices ordered so every division precedes its members.
    ///
    /// Divisions may be listed in the file or already exist in the store;
    /// `known` holds the pincodes that exist outside the file.
    pub fn ordered(&self, known: &HashSet<String>) -> Result<Vec<FixturePostOffice>, FixtureError> {
        let mut by_pincode: HashMap<&str, &FixturePostOffice> = HashMap::new();
        for office in &self.post_offices {
            if office.pincode.trim().is_empty() || office.name.trim().is_empty() {
                return Err(FixtureError::Incomplete(office.pincode.clone()));
            }
            if by_pincode.insert(&office.pincode, office).is_some() {
                return Err(FixtureError::DuplicatePincode(office.pincode.clone()));
            }
        }

        for office in &self.post_offices {
            if let Some(division) = &office.division_pincode {
                if !by_pincode.contains_key(division.as_str()) && !known.contains(division) {
                    return Err(FixtureError::UnknownDivision {
                        pincode: office.pincode.clone(),
                        division: division.clone(),
                    });
                }
            }
        }

        let mut placed: HashSet<&str> = HashSet::new();
        let mut ordered = Vec::with_capacity(self.post_offices.len());
        while ordered.len() < self.post_offices.len() {
            let before = ordered.len();
            for office in &self.post_offices {
                if placed.contains(office.pincode.as_str()) {
                    continue;
                }
                let ready = match &office.division_pincode {
                    None => true,
                    Some(d) => placed.contains(d.as_str()) || !by_pincode.contains_key(d.as_str()),
                };
                if ready {
                    placed.insert(&office.pincode);
                    ordered.push(office.clone());
                }
            }
            if ordered.len() == before {
                let stuck = self
                    .post_offices
                    .iter()
                    .find(|o| !placed.contains(o.pincode.as_str()))
                    .map(|o| o.pincode.clone())
                    .unwrap_or_default();
                return Err(FixtureError::Cycle(stuck));
            }
        }
        Ok(ordered)
    }
}

async fn existing_pincodes(store: &dyn Store) -> Result<HashSet<String>, FixtureError> {
    let offices = store
        .list_post_offices(crate::database::store::PostOfficeFilter::All)
        .await?;
    Ok(offices.into_iter().map(|po| po.pincode).collect())
}

/// Validate a fixture against the store without writing
pub async fn check(store: &dyn Store, fixture: &Fixture) -> Result<usize, FixtureError> {
    let known = existing_pincodes(store).await?;
    Ok(fixture.ordered(&known)?.len())
}

/// Insert new post offices and overwrite existing ones, divisions first
pub async fn load(store: &dyn Store, fixture: &Fixture) -> Result<LoadReport, FixtureError> {
    let known = existing_pincodes(store).await?;
    let mut report = LoadReport::default();

    for office in fixture.ordered(&known)? {
        let pincode = office.pincode.clone();
        let office = PostOffice::from(office);
        if known.contains(&pincode) {
            store.update_post_office(&office).await?;
            report.updated += 1;
        } else {
            store.insert_post_office(&office).await?;
            report.inserted += 1;
        }
        tracing::debug!(pincode = %pincode, "Loaded post office");
    }

    tracing::info!(inserted = report.inserted, updated = report.updated, "Fixture loaded");
    Ok(report)
}
