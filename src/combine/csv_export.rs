//! CSV export of the combination registry
//!
//! One header line `CMB_ID,COUNT,<source names...>` followed by one line
//! per combination, ordered by identifier.

use log::debug;
use std::fs::File;
use std::io::Write;

use crate::combine::registry::CombinationRegistry;
use crate::errors::{CombineError, CombineResult};
use crate::utils::string_utils;

/// Writes the registry as a table, one column per source
pub struct CsvExporter<W: Write> {
    writer: csv::Writer<W>,
    names: Vec<String>,
}

impl CsvExporter<File> {
    /// Opens (truncating) the CSV file at `path`
    ///
    /// Source names are the file stems of `input_paths`.
    pub fn create(path: &str, input_paths: &[String]) -> CombineResult<Self> {
        let file = File::create(path).map_err(|e| CombineError::Resource(
            format!("cannot open {} for writing the output CSV file: {}", path, e)))?;
        let names = input_paths.iter().map(|p| string_utils::file_stem(p)).collect();
        Ok(CsvExporter::new(file, names))
    }
}

impl<W: Write> CsvExporter<W> {
    pub fn new(writer: W, names: Vec<String>) -> Self {
        CsvExporter {
            writer: csv::Writer::from_writer(writer),
            names,
        }
    }

    /// Writes the header and every record, returning the number of records
    pub fn export(mut self, registry: &CombinationRegistry) -> CombineResult<usize> {
        let mut header = Vec::with_capacity(self.names.len() + 2);
        header.push("CMB_ID");
        header.push("COUNT");
        header.extend(self.names.iter().map(String::as_str));
        self.writer.write_record(&header)?;

        let records = registry.records_by_identifier();
        for record in &records {
            let mut row = Vec::with_capacity(self.names.len() + 2);
            row.push(record.identifier.to_string());
            row.push(record.count.to_string());
            row.extend(record.key.fields().map(str::to_string));
            self.writer.write_record(&row)?;
        }

        self.writer.flush()?;
        debug!("Wrote {} combinations for {} sources", records.len(), self.names.len());
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export_to_string(registry: &CombinationRegistry, names: &[&str]) -> String {
        let mut out = Vec::new();
        let exporter = CsvExporter::new(&mut out, names.iter().map(|n| n.to_string()).collect());
        exporter.export(registry).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn table_lists_records_by_identifier() {
        let mut registry = CombinationRegistry::new(0);
        for key in ["1,5", "1,5", "2,5"] {
            registry.lookup_or_insert(key).unwrap();
        }

        assert_eq!(export_to_string(&registry, &["A", "B"]), "CMB_ID,COUNT,A,B\n0,2,1,5\n1,1,2,5\n");
    }

    #[test]
    fn names_with_separators_are_quoted() {
        let mut registry = CombinationRegistry::new(7);
        registry.lookup_or_insert("3,").unwrap();

        assert_eq!(export_to_string(&registry, &["land,use"]), "CMB_ID,COUNT,\"land,use\"\n7,1,3\n");
    }

    #[test]
    fn parsed_table_matches_the_registry() {
        let mut registry = CombinationRegistry::new(1);
        for key in ["0,-1,3", "4,4,4", "0,-1,3", "9,0,0"] {
            registry.lookup_or_insert(key).unwrap();
        }

        let text = export_to_string(&registry, &["x", "y", "z"]);
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let mut rows = 0;
        for result in reader.records() {
            let row = result.unwrap();
            assert_eq!(row.len(), 5);
            let key = format!("{},{},{}", &row[2], &row[3], &row[4]);
            let record = registry.get(&key).unwrap();
            assert_eq!(row[0].parse::<u32>().unwrap(), record.identifier);
            assert_eq!(row[1].parse::<u64>().unwrap(), record.count);
            rows += 1;
        }
        assert_eq!(rows, registry.len());
    }
}
