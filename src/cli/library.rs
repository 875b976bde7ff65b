//! `docent library` handlers.

use std::path::{Path, PathBuf};

use crate::library::{
    search, Author, FileUploadStore, UploadForm, UploadRecord, UploadStore, UploadStoreConfig,
};

use super::{AddArgs, ListArgs};

fn open_store(path: Option<PathBuf>) -> FileUploadStore {
    match path {
        Some(path) => FileUploadStore::new(UploadStoreConfig::new(path)),
        None => FileUploadStore::new_default(),
    }
}

/// Handle `docent library list`.
pub fn handle_list(store: Option<PathBuf>, args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(store);
    let records = store.list()?;
    let matches = search(&records, args.query.as_deref().unwrap_or_default());
    if matches.is_empty() {
        println!("No uploads found in {}", store.path().display());
        return Ok(());
    }
    for record in matches {
        println!("{}", describe(record));
    }
    Ok(())
}

/// Handle `docent library add`.
pub fn handle_add(store: Option<PathBuf>, args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(store);
    let pdf = std::fs::read(&args.pdf)
        .map_err(|e| format!("Cannot read {}: {e}", args.pdf.display()))?;

    let form = UploadForm::builder()
        .maybe_title(args.title)
        .authors(args.authors.iter().map(|raw| parse_author(raw)).collect())
        .maybe_publisher(args.publisher)
        .maybe_year(args.year)
        .topic(args.topic)
        .build();
    let record = form.into_record_now(&file_name(&args.pdf), &pdf)?;
    let line = describe(&record);
    store.insert(record)?;
    println!("Added {line}");
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// "Ada King Lovelace" → name "Ada King", surname "Lovelace".
fn parse_author(raw: &str) -> Author {
    match raw.trim().rsplit_once(' ') {
        Some((name, surname)) => Author::new(name.trim(), surname),
        None => Author::new(raw.trim(), ""),
    }
}

fn describe(record: &UploadRecord) -> String {
    let authors: Vec<String> = record.authors.iter().map(Author::full_name).collect();
    let mut line = format!("{}  {} [{}]", record.uploaded_at, record.title, record.topic);
    if !authors.is_empty() {
        line.push_str(&format!(" by {}", authors.join(", ")));
    }
    line
}
