//! Dataset ingestion: the JSON seed files read once at startup.

use std::fs;
use std::path::Path;

use alimapa_core::model::{HousesFile, SchoolSeed};
use tracing::info;

use crate::StoreError;

/// Read the school dataset: a JSON array of seed records.
pub fn load_schools_file(path: &Path) -> Result<Vec<SchoolSeed>, StoreError> {
    let raw = read(path)?;
    let seeds: Vec<SchoolSeed> = serde_json::from_str(&raw).map_err(|source| StoreError::Seed {
        path: path.to_path_buf(),
        source,
    })?;
    info!(count = seeds.len(), path = %path.display(), "read school dataset");
    Ok(seeds)
}

/// Read the houses dataset: `{"houses": [...], "agents": [...]}`.
pub fn load_houses_file(path: &Path) -> Result<HousesFile, StoreError> {
    let raw = read(path)?;
    let file: HousesFile = serde_json::from_str(&raw).map_err(|source| StoreError::Seed {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        houses = file.houses.len(),
        agents = file.agents.len(),
        path = %path.display(),
        "read houses dataset"
    );
    Ok(file)
}

fn read(path: &Path) -> Result<String, StoreError> {
    if !path.exists() {
        return Err(StoreError::DatasetNotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_a_school_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "schools.json",
            r#"[
                {"name": "CEIP La Huerta", "address": "Calle Mayor 5", "lat": "38.3452", "lng": "-0.4815"},
                {"name": "CEIP El Palmeral"}
            ]"#,
        );
        let seeds = load_schools_file(&path).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].lat, Some(38.3452));
        assert!(!seeds[1].has_coords());
    }

    #[test]
    fn loads_houses_and_agents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "houses.json",
            r#"{
                "houses": [
                    {"address": "Calle del Teatro 9", "lat": 38.345, "lng": -0.49,
                     "price": 850, "warrantyMonths": 2, "requireInsurance": true,
                     "agentId": 1, "priority": "HIGH"}
                ],
                "agents": [
                    {"name": "Inmo Levante", "agency": "Levante SL", "phone": "966 111 222"}
                ]
            }"#,
        );
        let file = load_houses_file(&path).unwrap();
        assert_eq!(file.houses.len(), 1);
        assert_eq!(file.agents.len(), 1);
        assert_eq!(file.houses[0].agent_id, 1);
    }

    #[test]
    fn agents_section_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "houses.json", r#"{"houses": []}"#);
        let file = load_houses_file(&path).unwrap();
        assert!(file.agents.is_empty());
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let err = load_schools_file(Path::new("/nonexistent/schools.json")).unwrap_err();
        assert!(matches!(err, StoreError::DatasetNotFound(_)));
    }

    #[test]
    fn malformed_json_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "schools.json", "[{\"name\": ");
        let err = load_schools_file(&path).unwrap_err();
        match err {
            StoreError::Seed { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Seed error, got {other:?}"),
        }
    }
}
