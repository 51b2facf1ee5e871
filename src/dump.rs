//! Screen dumps: the visible table or a text page saved under the per-cluster dump directory.

use crate::model::TableData;
use crate::view::ViewError;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn save_table(dir: &Path, title: &str, table: &TableData) -> Result<PathBuf, ViewError> {
    let mut out = String::new();
    push_record(&mut out, table.headers.iter().map(String::as_str));
    for row in table.visible_rows() {
        push_record(&mut out, row.columns.iter().map(String::as_str));
    }
    write(dir, title, "csv", &out)
}

pub fn save_text(dir: &Path, title: &str, content: &str) -> Result<PathBuf, ViewError> {
    write(dir, title, "log", content)
}

fn write(dir: &Path, title: &str, extension: &str, content: &str) -> Result<PathBuf, ViewError> {
    fs::create_dir_all(dir).map_err(|source| ViewError::Io {
        operation: "creating dump directory",
        path: dir.to_path_buf(),
        source,
    })?;
    let stamp = Local::now().timestamp_nanos_opt().unwrap_or_default();
    let path = dir.join(format!("{}-{stamp}.{extension}", file_stem(title)));
    fs::write(&path, content).map_err(|source| ViewError::Io {
        operation: "writing dump",
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "saved screen dump");
    Ok(path)
}

fn file_stem(title: &str) -> String {
    let stem = title
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '-' })
        .collect::<String>()
        .trim_matches('-')
        .to_ascii_lowercase();
    if stem.is_empty() { "dump".to_string() } else { stem }
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let record = fields.map(quote).collect::<Vec<_>>().join(",");
    out.push_str(&record);
    out.push('\n');
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{file_stem, save_table, save_text};
    use crate::model::{RowData, TableData};
    use chrono::Local;
    use std::fs;

    #[test]
    fn table_dump_adds_one_csv_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("c1");
        let mut table = TableData::default();
        table.set_rows(
            vec!["NAME".to_string(), "LABELS".to_string()],
            vec![RowData {
                name: "p1".to_string(),
                columns: vec!["p1".to_string(), "a=1,b=\"2\"".to_string()],
                ..RowData::default()
            }],
            Local::now(),
        );

        let path = save_table(&dir, "Pods", &table).unwrap();
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("csv"));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "NAME,LABELS\np1,\"a=1,b=\"\"2\"\"\"\n"
        );
    }

    #[test]
    fn text_dump_keeps_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = save_text(tmp.path(), "Logs(fred/nginx)", "line 1\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "line 1\n");
        assert!(
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("logs-fred-nginx-"))
        );
    }

    #[test]
    fn stems_are_path_safe() {
        assert_eq!(file_stem("YAML(kube-system/coredns)"), "yaml-kube-system-coredns");
        assert_eq!(file_stem("///"), "dump");
    }
}
