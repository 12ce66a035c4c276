use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::Error;

/// Reads every row of a CSV table. Rows that fail to deserialize are
/// skipped with a warning; the count of skipped rows is returned alongside.
pub fn deserialize_csv_file<T>(path: &Path) -> Result<(Vec<T>, usize), Error>
where
    T: DeserializeOwned,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    Ok(deserialize_csv_reader(file, &path.display().to_string()))
}

pub fn deserialize_csv_reader<T, R>(reader: R, source: &str) -> (Vec<T>, usize)
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rows = Vec::new();
    let mut rejected = 0;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    for (line, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                rejected += 1;
                log::warn!("Skipping row {} of {source}: {e}", line + 2);
            }
        }
    }
    rows.shrink_to_fit();
    (rows, rejected)
}

/// Strips whitespace and stray quotes around identifiers.
pub(super) fn normalize_id(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

pub(super) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let id = normalize_id(&raw);
    if id.is_empty() {
        Err(serde::de::Error::custom("empty identifier"))
    } else {
        Ok(id)
    }
}

/// Splits a comma separated id list, dropping empty entries.
pub(super) fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_id)
        .filter(|id| !id.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::ExistingRoadRecord;

    #[test]
    fn bad_rows_are_counted_not_fatal() {
        let data = "FromID,ToID,Distance(km),Current Capacity(vehicles/hour),Condition(1-10)\n\
                    1,2,8.5,3000,7\n\
                    1,3,abc,3000,7\n\
                    \" 2 \",3,4.0,2000,6\n";
        let (rows, rejected): (Vec<ExistingRoadRecord>, usize) =
            deserialize_csv_reader(data.as_bytes(), "roads");
        assert_eq!(rows.len(), 2);
        assert_eq!(rejected, 1);
        assert_eq!(rows[1].from_id, "2");
    }

    #[test]
    fn id_lists_are_normalized() {
        assert_eq!(split_ids(" 1, \"2\" ,,3 "), vec!["1", "2", "3"]);
    }
}
