//! `docent explain` handler.

use std::path::Path;

use crate::config::DocentConfig;
use crate::job::JobClient;
use crate::progress::{FinalOutcome, ProgressState};
use crate::types::{AgentStatus, CapturedRegion, Sender, TranscriptEntry};

use super::ExplainArgs;

/// Run one job to completion, streaming the transcript to stdout.
///
/// Returns the status the job settled in.
pub async fn handle_explain(args: ExplainArgs) -> Result<AgentStatus, Box<dyn std::error::Error>> {
    let mut config = DocentConfig::from_env();
    if let Some(url) = args.api_url {
        config = config.with_api_base_url(url);
    }
    if let Some(url) = args.ws_url {
        config = config.with_ws_base_url(url);
    }

    let region = read_region(&args.image)?;
    let mut client = JobClient::new(config)?;
    client.capture_region(region);
    client.start(&args.prompt).await?;

    let mut printed = 0;
    print_new_entries(client.progress(), &mut printed);
    while let Some(snapshot) = client.next_update().await {
        print_new_entries(&snapshot.progress, &mut printed);
    }

    let progress = client.progress();
    match progress.outcome() {
        FinalOutcome::Video(url) => println!("Video: {url}"),
        FinalOutcome::GenerationFailed(error) => eprintln!("Video generation failed: {error}"),
        FinalOutcome::CodeOnly(_) | FinalOutcome::Empty => {}
    }
    if let Some(code) = &progress.final_code {
        println!("\n{code}");
    }
    if let Some(error) = &progress.error_message {
        eprintln!("❌ {error}");
    }
    Ok(client.status())
}

fn read_region(path: &Path) -> Result<CapturedRegion, Box<dyn std::error::Error>> {
    let png = std::fs::read(path)
        .map_err(|e| format!("Cannot read image {}: {e}", path.display()))?;
    Ok(CapturedRegion::from_png(&png)?)
}

fn print_new_entries(progress: &ProgressState, printed: &mut usize) {
    for entry in progress.transcript.iter().skip(*printed) {
        println!("{}", format_entry(entry));
    }
    *printed = progress.transcript.len();
}

fn format_entry(entry: &TranscriptEntry) -> String {
    match entry.sender {
        Sender::User => format!("> {}", entry.text),
        Sender::Agent => match entry.kind {
            Some(kind) => format!("[{kind}] {}", entry.text),
            None => entry.text.clone(),
        },
    }
}
