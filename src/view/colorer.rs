use crate::model::RowData;
use ratatui::style::Color;

fn cell<'a>(headers: &[String], row: &'a RowData, column: &str) -> Option<&'a str> {
    let index = headers.iter().position(|header| header == column)?;
    row.columns.get(index).map(String::as_str)
}

pub fn default(_headers: &[String], _row: &RowData) -> Color {
    Color::Reset
}

pub fn pod(headers: &[String], row: &RowData) -> Color {
    match cell(headers, row, "STATUS") {
        Some("Running") => ready_color(cell(headers, row, "READY")),
        Some("Completed" | "Succeeded") => Color::DarkGray,
        Some("Pending" | "ContainerCreating" | "PodInitializing" | "Terminating") => Color::Yellow,
        Some(_) => Color::Red,
        None => Color::Reset,
    }
}

/// Workloads are yellow while fewer replicas are ready than desired.
pub fn workload(headers: &[String], row: &RowData) -> Color {
    ready_color(cell(headers, row, "READY"))
}

fn ready_color(ready: Option<&str>) -> Color {
    let Some((current, desired)) = ready.and_then(|value| value.split_once('/')) else {
        return Color::Green;
    };
    match (current.trim().parse::<u32>(), desired.trim().parse::<u32>()) {
        (Ok(current), Ok(desired)) if current < desired => Color::Yellow,
        _ => Color::Green,
    }
}

pub fn file(_headers: &[String], _row: &RowData) -> Color {
    Color::Cyan
}

/// Wildcard verbs stand out.
pub fn policy(headers: &[String], row: &RowData) -> Color {
    match cell(headers, row, "VERBS") {
        Some(verbs) if verbs.split(',').any(|verb| verb.trim() == "*") => Color::Red,
        _ => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::{pod, policy, workload};
    use crate::model::RowData;
    use ratatui::style::Color;

    fn row(columns: &[&str]) -> RowData {
        RowData {
            name: "x".to_string(),
            columns: columns.iter().map(|value| value.to_string()).collect(),
            ..RowData::default()
        }
    }

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn pod_status_colors() {
        let headers = headers(&["NAME", "READY", "STATUS"]);
        assert_eq!(pod(&headers, &row(&["p", "1/1", "Running"])), Color::Green);
        assert_eq!(pod(&headers, &row(&["p", "0/1", "Running"])), Color::Yellow);
        assert_eq!(pod(&headers, &row(&["p", "0/1", "Completed"])), Color::DarkGray);
        assert_eq!(pod(&headers, &row(&["p", "0/1", "CrashLoopBackOff"])), Color::Red);
    }

    #[test]
    fn workload_flags_missing_replicas() {
        let headers = headers(&["NAME", "READY"]);
        assert_eq!(workload(&headers, &row(&["d", "2/3"])), Color::Yellow);
        assert_eq!(workload(&headers, &row(&["d", "3/3"])), Color::Green);
    }

    #[test]
    fn policy_flags_wildcards() {
        let headers = headers(&["NAME", "VERBS"]);
        assert_eq!(policy(&headers, &row(&["pods", "get, *"])), Color::Red);
        assert_eq!(policy(&headers, &row(&["pods", "get,list"])), Color::Reset);
    }
}
