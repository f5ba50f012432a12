use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use trip_relay_types::Record;

use crate::SourceErr;

/// Read newline-delimited JSON objects, one row per line. Blank lines are ignored.
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, SourceErr> {
    let path = path.as_ref();
    log::info!("Loading rows from {}", path.display());
    let rows = parse_rows(BufReader::new(File::open(path)?))?;
    log::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Like [`load_rows`], from any reader. Line numbers in errors start from 1.
pub fn parse_rows<R: BufRead>(reader: R) -> Result<Vec<Record>, SourceErr> {
    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|source| SourceErr::Parse {
            line: i + 1,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod test {
    use super::*;
    use trip_relay_types::Value;

    #[test]
    fn test_parse_rows() {
        let input = r#"{"trip_id":"A1","fare":12.5,"vendor":1}

{"trip_id":"B2","fare":null}
"#;
        let rows = parse_rows(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].field_names().collect::<Vec<_>>(),
            ["trip_id", "fare", "vendor"]
        );
        assert_eq!(rows[1].get("fare"), Some(&Value::Null));
    }

    #[test]
    fn test_parse_error_names_line() {
        let input = "{\"trip_id\":\"A1\"}\n{\"trip_id\":\n";
        match parse_rows(input.as_bytes()) {
            Err(SourceErr::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            load_rows("/definitely/not/here.ndjson"),
            Err(SourceErr::Io(_))
        ));
    }
}
