//! Municipality names that appear in more than one region
//!
//! Rows are ordered by count descending, then name ascending. Region codes
//! inside a row are comma-joined in ascending order.

use super::region::non_negative;
use super::DuplicateName;
use crate::record::Record;
use crate::store::{SqliteEndpoint, StoreError};
use std::cmp::Reverse;
use std::collections::HashMap;

pub fn duplicate_names_client(records: &[Record]) -> Vec<DuplicateName> {
    let mut groups: HashMap<&str, Vec<&str>> = HashMap::new();
    for record in records {
        groups
            .entry(record.name.as_str())
            .or_default()
            .push(record.region_code.as_str());
    }

    let mut out: Vec<DuplicateName> = groups
        .into_iter()
        .filter(|(_, codes)| codes.len() > 1)
        .map(|(name, mut codes)| {
            codes.sort_unstable();
            DuplicateName {
                name: name.to_string(),
                region_codes: codes.join(","),
                count: codes.len() as u64,
            }
        })
        .collect();

    out.sort_by(|a, b| (Reverse(a.count), &a.name).cmp(&(Reverse(b.count), &b.name)));
    out
}

pub fn duplicate_names_server(endpoint: &SqliteEndpoint) -> Result<Vec<DuplicateName>, StoreError> {
    let sql = format!(
        "SELECT name, region_codes, qty FROM (
             SELECT name,
                    GROUP_CONCAT(region_code, ',' ORDER BY region_code) AS region_codes,
                    COUNT(*) AS qty
             FROM {}
             GROUP BY name
         ) AS homonyms
         WHERE qty > 1
         ORDER BY qty DESC, name",
        endpoint.table()
    );

    let mut stmt = endpoint.connection().prepare(&sql)?;
    let mut rows = stmt.query([])?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let count: i64 = row.get(2)?;
        out.push(DuplicateName {
            name: row.get(0)?,
            region_codes: row.get(1)?,
            count: non_negative(count)?,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load, LoadStrategy};

    fn persisted(records: &[Record]) -> SqliteEndpoint {
        let mut endpoint = SqliteEndpoint::open_in_memory("municipios").unwrap();
        endpoint.prepare_schema().unwrap();
        load(&mut endpoint, records, LoadStrategy::BulkCollection).unwrap();
        endpoint
    }

    #[test]
    fn test_rio_claro_example() {
        let records = vec![
            Record::new(1, "Rio Claro", "SP", [0; 4]),
            Record::new(2, "Rio Claro", "MG", [0; 4]),
            Record::new(3, "Curitiba", "PR", [0; 4]),
        ];
        let expected = vec![DuplicateName {
            name: "Rio Claro".to_string(),
            region_codes: "MG,SP".to_string(),
            count: 2,
        }];

        assert_eq!(duplicate_names_client(&records), expected);
        assert_eq!(duplicate_names_server(&persisted(&records)).unwrap(), expected);
    }

    #[test]
    fn test_ordering_count_then_name() {
        let records = vec![
            Record::new(1, "Bom Jesus", "PI", [0; 4]),
            Record::new(2, "Bom Jesus", "RS", [0; 4]),
            Record::new(3, "Bom Jesus", "SC", [0; 4]),
            Record::new(4, "Vitória", "ES", [0; 4]),
            Record::new(5, "Bonito", "MS", [0; 4]),
            Record::new(6, "Bonito", "PA", [0; 4]),
            Record::new(7, "Aurora", "CE", [0; 4]),
            Record::new(8, "Aurora", "SC", [0; 4]),
        ];

        let client = duplicate_names_client(&records);
        let names: Vec<&str> = client.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Bom Jesus", "Aurora", "Bonito"]);
        assert_eq!(client[0].region_codes, "PI,RS,SC");

        assert_eq!(duplicate_names_server(&persisted(&records)).unwrap(), client);
    }

    #[test]
    fn test_no_duplicates() {
        let records = vec![Record::new(1, "Curitiba", "PR", [0; 4])];
        assert!(duplicate_names_client(&records).is_empty());
        assert!(duplicate_names_server(&persisted(&records)).unwrap().is_empty());
    }
}
