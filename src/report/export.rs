//! Machine-readable export

use std::borrow::Cow;

use crate::experiment::ExperimentMatrix;
use crate::extract::CounterMap;

/// Render the matrix as CSV.
///
/// Columns are `config_id`, `status`, one column per axis, then every
/// metric of the counter map in map order. A metric that is unavailable
/// for a run is an empty cell, never zero.
#[must_use]
pub fn to_csv(matrix: &ExperimentMatrix, map: &CounterMap) -> String {
    let metrics = map.metric_names();

    let mut header: Vec<Cow<'_, str>> = vec!["config_id".into(), "status".into()];
    header.extend(matrix.axes().iter().map(|a| Cow::Borrowed(a.as_str())));
    header.extend(metrics.iter().map(|m| Cow::Borrowed(*m)));

    let mut out = String::new();
    push_record(&mut out, &header);

    for result in matrix.results() {
        let config = result.configuration();
        let mut record: Vec<Cow<'_, str>> =
            vec![result.id().into(), result.status().label().into()];
        record.extend(
            matrix
                .axes()
                .iter()
                .map(|axis| Cow::Borrowed(config.value(axis).unwrap_or_default())),
        );
        record.extend(metrics.iter().map(|m| {
            if result.is_succeeded() {
                result
                    .metric(m)
                    .map_or(Cow::Borrowed(""), |v| Cow::Owned(v.to_string()))
            } else {
                Cow::Borrowed("")
            }
        }));
        push_record(&mut out, &record);
    }
    out
}

fn push_record(out: &mut String, fields: &[Cow<'_, str>]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(field));
    }
    out.push('\n');
}

/// Quote a field that contains a delimiter, a quote or a line break.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_field_untouched() {
        assert_eq!(escape("width=4__threads=2"), "width=4__threads=2");
    }

    #[test]
    fn test_escape_quotes_and_commas() {
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_push_record_joins_with_commas() {
        let mut out = String::new();
        push_record(&mut out, &["a".into(), "".into(), "c,d".into()]);
        assert_eq!(out, "a,,\"c,d\"\n");
    }
}
