//! Line oriented renderers for search results and user reports.
//!
//! `json` and `csv` flatten multi valued attributes into a single string, so the
//! individual values can not be recovered from the text. Use `json1` or the raw
//! data when the list structure matters.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::v1::{AttrValue, AttributeRecord, UserCheckReport};

pub const JSON_LIST_SEPARATOR: &str = ";";
pub const CSV_LIST_SEPARATOR: &str = "|";
pub const DEFAULT_CSV_SEPARATOR: &str = "\t";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Hand back the structured data untouched.
    Raw,
    /// Every attribute of every record merged into one json object.
    Json1,
    /// One json object per record.
    #[default]
    Json,
    /// One line per record, attributes sorted by name.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" | "raw" => Ok(OutputFormat::Raw),
            "json1" => Ok(OutputFormat::Json1),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "unknown output format '{}', expected one of default, json1, json, csv",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Raw => write!(f, "default"),
            OutputFormat::Json1 => write!(f, "json1"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

fn attr_to_json(value: &AttrValue) -> Value {
    match value {
        AttrValue::Single(v) => Value::String(v.clone()),
        AttrValue::Multi(vs) => Value::Array(vs.iter().cloned().map(Value::String).collect()),
    }
}

fn record_to_json_line(record: &AttributeRecord) -> String {
    let obj: Map<String, Value> = record
        .attrs
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.join(JSON_LIST_SEPARATOR))))
        .collect();
    Value::Object(obj).to_string()
}

fn record_to_csv_line(record: &AttributeRecord, sep: &str) -> String {
    // attrs is ordered by name already. Records are not aligned to a common
    // set of columns.
    record
        .attrs
        .values()
        .map(|v| v.join(CSV_LIST_SEPARATOR))
        .collect::<Vec<_>>()
        .join(sep)
}

/// Render search results. `None` means the caller should use the records as they are,
/// which is the case for the raw format and for an empty result.
pub fn render_records(
    records: &[AttributeRecord],
    format: OutputFormat,
    sep: &str,
) -> Option<String> {
    if records.is_empty() {
        return None;
    }

    match format {
        OutputFormat::Raw => None,
        OutputFormat::Json1 => {
            let mut obj = Map::new();
            for record in records {
                for (k, v) in record.attrs.iter() {
                    obj.insert(k.clone(), attr_to_json(v));
                }
            }
            Some(format!("{}\n", Value::Object(obj)))
        }
        OutputFormat::Json => Some(
            records
                .iter()
                .map(|r| format!("{}\n", record_to_json_line(r)))
                .collect(),
        ),
        OutputFormat::Csv => Some(
            records
                .iter()
                .map(|r| format!("{}\n", record_to_csv_line(r, sep)))
                .collect(),
        ),
    }
}

/// Render a user report. Both json formats give a single object with the facts in
/// check order, csv gives the values in check order on one line.
pub fn render_report(report: &UserCheckReport, format: OutputFormat, sep: &str) -> Option<String> {
    match format {
        OutputFormat::Raw => None,
        OutputFormat::Json | OutputFormat::Json1 => Some(format!(
            "{}\n",
            serde_json::to_string(report).unwrap_or_else(|_| format!("{:?}", report))
        )),
        OutputFormat::Csv => Some(format!(
            "{}\n",
            report
                .facts
                .iter()
                .map(|f| f.value.to_string())
                .collect::<Vec<_>>()
                .join(sep)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{render_records, render_report, OutputFormat, DEFAULT_CSV_SEPARATOR};
    use crate::v1::{AttributeRecord, UserCheckReport};
    use serde_json::Value;
    use std::str::FromStr;

    fn fixture() -> Vec<AttributeRecord> {
        vec![
            AttributeRecord::new("CN=jdoe,OU=Users,DC=example,DC=com")
                .with_attr("sAMAccountName", "jdoe")
                .with_attr("mail", "jdoe@example.com")
                .with_attr("memberOf", vec!["CN=admins", "CN=sales"]),
            AttributeRecord::new("CN=asmith,OU=Users,DC=example,DC=com")
                .with_attr("sAMAccountName", "asmith")
                .with_attr("cn", "Anna Smith"),
        ]
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::from_str("default"), Ok(OutputFormat::Raw));
        assert_eq!(OutputFormat::from_str("JSON"), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("json1"), Ok(OutputFormat::Json1));
        assert_eq!(OutputFormat::from_str("csv"), Ok(OutputFormat::Csv));
        assert!(OutputFormat::from_str("xml").is_err());
        assert_eq!(OutputFormat::default().to_string(), "json");
    }

    #[test]
    fn test_raw_and_empty_are_not_rendered() {
        let records = fixture();
        assert_eq!(render_records(&records, OutputFormat::Raw, "\t"), None);
        assert_eq!(render_records(&[], OutputFormat::Json, "\t"), None);
        assert_eq!(render_records(&[], OutputFormat::Csv, "\t"), None);
    }

    #[test]
    fn test_json_lines_reparse() {
        let records = fixture();
        let text = render_records(&records, OutputFormat::Json, "\t").expect("no text");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), records.len());

        for (line, record) in lines.iter().zip(records.iter()) {
            let v: Value = serde_json::from_str(line).expect("invalid json");
            let obj = v.as_object().expect("not an object");
            let keys: Vec<&String> = obj.keys().collect();
            let expect: Vec<&String> = record.attrs.keys().collect();
            assert_eq!(keys, expect);
            for (k, av) in record.attrs.iter() {
                assert_eq!(obj[k].as_str(), Some(av.join(";").as_str()));
            }
        }
        // The list is only recoverable as the joined string.
        let first: Value = serde_json::from_str(lines[0]).expect("invalid json");
        assert_eq!(first["memberOf"], Value::String("CN=admins;CN=sales".to_string()));
    }

    #[test]
    fn test_csv_sorts_keys_per_record() {
        let records = fixture();
        let text =
            render_records(&records, OutputFormat::Csv, DEFAULT_CSV_SEPARATOR).expect("no text");
        // Columns differ between the rows, this is accepted as is.
        assert_eq!(
            text,
            "jdoe@example.com\tCN=admins|CN=sales\tjdoe\nAnna Smith\tasmith\n"
        );

        let text = render_records(&records[1..], OutputFormat::Csv, ",").expect("no text");
        assert_eq!(text, "Anna Smith,asmith\n");
    }

    #[test]
    fn test_json1_merges_records() {
        let records = fixture();
        let text = render_records(&records[..1], OutputFormat::Json1, "\t").expect("no text");
        let v: Value = serde_json::from_str(text.trim_end()).expect("invalid json");
        assert_eq!(v["sAMAccountName"], Value::String("jdoe".to_string()));
        assert_eq!(v["memberOf"][1], Value::String("CN=sales".to_string()));

        // Later records override earlier ones on key collision.
        let text = render_records(&records, OutputFormat::Json1, "\t").expect("no text");
        let v: Value = serde_json::from_str(text.trim_end()).expect("invalid json");
        assert_eq!(v["sAMAccountName"], Value::String("asmith".to_string()));
        assert_eq!(v["mail"], Value::String("jdoe@example.com".to_string()));
    }

    #[test]
    fn test_render_report() {
        let mut report = UserCheckReport::new("jdoe");
        report.push("is_disabled", false);
        report.push("password_changed_in_days", Some(100));
        report.push("membership_admins", None::<bool>);

        assert_eq!(render_report(&report, OutputFormat::Raw, "\t"), None);
        assert_eq!(
            render_report(&report, OutputFormat::Json, "\t").as_deref(),
            Some("{\"is_disabled\":false,\"password_changed_in_days\":100,\"membership_admins\":null}\n")
        );
        assert_eq!(
            render_report(&report, OutputFormat::Csv, ",").as_deref(),
            Some("false,100,none\n")
        );
    }
}
